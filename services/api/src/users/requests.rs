use ghusers_db::users::models::{ListOptions, User};
use serde::Deserialize;

/// Raw `/users` query string. Numbers stay strings so malformed values fall
/// back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersParams {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub orderby: Option<String>,
    pub order: Option<String>,
}

impl ListUsersParams {
    pub fn into_options(self) -> ListOptions {
        ListOptions {
            limit: self.limit.and_then(|v| v.trim().parse().ok()),
            page: self.page.and_then(|v| v.trim().parse().ok()),
            order_by: self.orderby,
            order_direction: self.order,
        }
    }
}

/// Partial update. Empty strings leave the stored value untouched;
/// `site_admin` is always applied and defaults to `false`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub login: String,
    pub node_id: String,
    pub avatar_url: String,
    pub url: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub user_view_type: String,
    pub site_admin: bool,
}

impl UpdateUserRequest {
    pub fn apply(&self, user: &mut User) {
        let fields = [
            (&mut user.login, &self.login),
            (&mut user.node_id, &self.node_id),
            (&mut user.avatar_url, &self.avatar_url),
            (&mut user.url, &self.url),
            (&mut user.html_url, &self.html_url),
            (&mut user.user_type, &self.user_type),
            (&mut user.user_view_type, &self.user_view_type),
        ];
        for (target, value) in fields {
            if !value.is_empty() {
                target.clone_from(value);
            }
        }
        user.site_admin = self.site_admin;
    }
}
