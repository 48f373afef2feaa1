use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub username: String,
}
