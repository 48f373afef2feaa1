use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use ghusers_common::error::{GhUsersError, GhUsersResult};
use ghusers_db::users::models::User;
use ghusers_db::users::repositories::UserSink;
use ghusers_github::{GitHubClientError, GitHubUser, UserSource};
use reqwest::StatusCode;

pub fn github_user(id: i64) -> GitHubUser {
    GitHubUser {
        id,
        login: format!("user{id}"),
        node_id: format!("N{id}"),
        avatar_url: String::new(),
        gravatar_id: String::new(),
        url: String::new(),
        html_url: String::new(),
        user_type: "User".to_string(),
        user_view_type: "public".to_string(),
        site_admin: false,
    }
}

pub fn github_users(ids: std::ops::RangeInclusive<i64>) -> Vec<GitHubUser> {
    ids.map(github_user).collect()
}

/// Replays canned page responses in order, then returns empty pages.
pub struct ScriptedSource {
    pages: Mutex<VecDeque<Result<Vec<GitHubUser>, GitHubClientError>>>,
    always_fail: bool,
    calls: Mutex<Vec<i64>>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<Result<Vec<GitHubUser>, GitHubClientError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            always_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing() -> Self {
        Self {
            always_fail: true,
            ..Self::new(Vec::new())
        }
    }

    /// `since` value of every fetch, in call order.
    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserSource for ScriptedSource {
    async fn fetch_users_since(
        &self,
        since: i64,
        _per_page: u32,
    ) -> Result<Vec<GitHubUser>, GitHubClientError> {
        self.calls.lock().unwrap().push(since);
        if self.always_fail {
            return Err(GitHubClientError::Throttled {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            });
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_user(&self, login: &str) -> Result<GitHubUser, GitHubClientError> {
        Err(GitHubClientError::NotFound(login.to_string()))
    }
}

/// Records every upserted id; ids in `failing` are rejected.
#[derive(Default)]
pub struct RecordingSink {
    upserted: Mutex<Vec<i64>>,
    failing: HashSet<i64>,
}

impl RecordingSink {
    pub fn failing_on(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            upserted: Mutex::new(Vec::new()),
            failing: ids.into_iter().collect(),
        }
    }

    pub fn upserted(&self) -> Vec<i64> {
        let mut ids = self.upserted.lock().unwrap().clone();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl UserSink for RecordingSink {
    async fn upsert(&self, user: &User) -> GhUsersResult<()> {
        if self.failing.contains(&user.id) {
            return Err(GhUsersError::Database(format!("rejected {}", user.id)));
        }
        self.upserted.lock().unwrap().push(user.id);
        Ok(())
    }
}
