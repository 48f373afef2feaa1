use ghusers_db::users::models::User;
use serde::{Deserialize, Serialize};

/// A user record from the GitHub REST API (`/users`, `/users/{login}`).
///
/// Link templates the mirror does not store (`followers_url`, `repos_url`, ...)
/// are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub gravatar_id: String,
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
}

impl From<GitHubUser> for User {
    fn from(gh: GitHubUser) -> Self {
        User {
            id: gh.id,
            login: gh.login,
            node_id: gh.node_id,
            avatar_url: gh.avatar_url,
            url: gh.url,
            html_url: gh.html_url,
            user_type: gh.user_type,
            user_view_type: gh.user_view_type,
            site_admin: gh.site_admin,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_api_payload() {
        let json = r#"{
            "login": "octocat",
            "id": 583231,
            "node_id": "MDQ6VXNlcjU4MzIzMQ==",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
            "gravatar_id": "",
            "url": "https://api.github.com/users/octocat",
            "html_url": "https://github.com/octocat",
            "followers_url": "https://api.github.com/users/octocat/followers",
            "repos_url": "https://api.github.com/users/octocat/repos",
            "type": "User",
            "user_view_type": "public",
            "site_admin": false
        }"#;
        let user: GitHubUser = serde_json::from_str(json).expect("should deserialize");
        assert_eq!(user.id, 583231);
        assert_eq!(user.login, "octocat");
        assert_eq!(user.user_type, "User");
        assert!(!user.site_admin);
    }

    #[test]
    fn deserialize_minimal() {
        let user: GitHubUser =
            serde_json::from_str(r#"{"id": 1, "login": "mojombo"}"#).expect("should deserialize");
        assert_eq!(user.login, "mojombo");
        assert!(user.node_id.is_empty());
        assert!(user.user_view_type.is_empty());
    }

    #[test]
    fn maps_into_stored_user_without_timestamps() {
        let gh = GitHubUser {
            id: 2,
            login: "defunkt".to_string(),
            node_id: "MDQ6VXNlcjI=".to_string(),
            avatar_url: "a".to_string(),
            gravatar_id: String::new(),
            url: "u".to_string(),
            html_url: "h".to_string(),
            user_type: "User".to_string(),
            user_view_type: "public".to_string(),
            site_admin: true,
        };
        let user = User::from(gh);
        assert_eq!(user.id, 2);
        assert_eq!(user.node_id, "MDQ6VXNlcjI=");
        assert_eq!(user.user_view_type, "public");
        assert!(user.site_admin);
        assert!(user.created_at.is_none());
    }
}
