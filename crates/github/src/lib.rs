pub mod client;
pub mod models;
pub mod rate_limit;
pub mod source;

pub use client::{GitHubClient, GitHubClientError};
pub use models::GitHubUser;
pub use rate_limit::RateLimiter;
pub use source::UserSource;
