use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mirrored GitHub user as stored in `github_users`.
///
/// Timestamps are owned by the store; a user mapped straight from the
/// upstream API carries `None` until it has been written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(rename = "type", default)]
    pub user_type: String,
    #[serde(default)]
    pub user_view_type: String,
    #[serde(default)]
    pub site_admin: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const DEFAULT_LIST_PAGE: i64 = 1;

/// Columns the list endpoint may sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    Login,
    NodeId,
    Type,
    UserViewType,
    SiteAdmin,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Login => "login",
            Self::NodeId => "node_id",
            Self::Type => "\"type\"",
            Self::UserViewType => "user_view_type",
            Self::SiteAdmin => "site_admin",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    /// Unknown or empty names fall back to the primary key.
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "login" => Self::Login,
            "node_id" => Self::NodeId,
            "type" => Self::Type,
            "user_view_type" => Self::UserViewType,
            "site_admin" => Self::SiteAdmin,
            "created_at" => Self::CreatedAt,
            "updated_at" => Self::UpdatedAt,
            _ => Self::Id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Caller-supplied list parameters, all optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOptions {
    pub limit: Option<i64>,
    pub page: Option<i64>,
    pub order_by: Option<String>,
    pub order_direction: Option<String>,
}

impl ListOptions {
    pub fn normalize(&self) -> ListQuery {
        ListQuery {
            limit: self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIST_LIMIT),
            page: self.page.filter(|p| *p > 0).unwrap_or(DEFAULT_LIST_PAGE),
            order_by: self
                .order_by
                .as_deref()
                .map(SortColumn::from_param)
                .unwrap_or_default(),
            direction: self
                .order_direction
                .as_deref()
                .map(SortDirection::from_param)
                .unwrap_or_default(),
        }
    }
}

/// Validated list parameters handed to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: i64,
    pub page: i64,
    pub order_by: SortColumn,
    pub direction: SortDirection,
}

impl ListQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        ListOptions::default().normalize()
    }
}
