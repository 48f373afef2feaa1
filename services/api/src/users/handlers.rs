use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use ghusers_common::error::GhUsersError;
use ghusers_db::users::models::User;

use crate::error::ApiError;
use crate::users::requests::{ListUsersParams, UpdateUserRequest};
use crate::users::responses::DeleteUserResponse;
use crate::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list(&params.into_options()).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state.users.get(&username).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(patch) = body.map_err(|e| {
        ApiError(GhUsersError::Validation(format!("invalid request payload: {}", e.body_text())))
    })?;
    let user = state.users.update(&username, &patch).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    state.users.delete(&username).await?;
    Ok(Json(DeleteUserResponse { username }))
}
