use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::MsgResponse,
        jwt::AuthUser,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    store::find_by_username,
};

use super::dto::{ProfileResponse, UpdatePasswordRequest, UserListResponse};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/users", get(list_users))
        .route("/users/:username", delete(delete_user))
        .route("/users/:username/password", put(update_password))
}

/// The store is re-read on every call, so a record can vanish between token
/// issuance and lookup; that surfaces as 404.
#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let users = state.store.load_all().await?;
    let user = find_by_username(&users, &username).ok_or_else(|| {
        warn!(username = %username, "profile for vanished user");
        ApiError::UserNotFound
    })?;

    Ok(Json(ProfileResponse {
        username: user.username.clone(),
    }))
}

/// Any verifiable token grants the full dump, hashed passwords included.
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_subject): AuthUser,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = state.store.load_all().await?;
    Ok(Json(UserListResponse { users }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<MsgResponse>, ApiError> {
    if subject != username {
        warn!(subject = %subject, target = %username, "cross-account delete refused");
        return Err(ApiError::Forbidden("You can only delete your own account"));
    }

    let _guard = state.write_lock.lock().await;
    let mut users = state.store.load_all().await?;
    let before = users.len();
    users.retain(|u| u.username != username);
    if users.len() == before {
        return Err(ApiError::UserNotFound);
    }
    state.store.save_all(&users).await?;

    info!(username = %username, "user deleted");
    Ok(Json(MsgResponse {
        msg: format!("User '{}' deleted successfully", username),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(username): Path<String>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MsgResponse>, ApiError> {
    if subject != username {
        warn!(subject = %subject, target = %username, "cross-account password update refused");
        return Err(ApiError::Forbidden("You can only update your own password"));
    }

    let _guard = state.write_lock.lock().await;
    let mut users = state.store.load_all().await?;
    let user = users
        .iter_mut()
        .find(|u| u.username == username)
        .ok_or(ApiError::UserNotFound)?;

    if !verify_password(&payload.old_password, &user.hashed_password) {
        warn!(username = %username, "old password mismatch");
        return Err(ApiError::WrongOldPassword);
    }

    user.hashed_password = hash_password(&payload.new_password)?;
    state.store.save_all(&users).await?;

    info!(username = %username, "password updated");
    Ok(Json(MsgResponse {
        msg: "Password updated successfully".into(),
    }))
}
