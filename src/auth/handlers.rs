use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, MsgResponse, RegisterRequest, TokenResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    store::{find_by_username, UserRecord},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MsgResponse>, ApiError> {
    let _guard = state.write_lock.lock().await;

    let mut users = state.store.load_all().await?;
    if find_by_username(&users, &payload.username).is_some() {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::UserExists);
    }

    let hashed_password = hash_password(&payload.password)?;
    users.push(UserRecord {
        username: payload.username.clone(),
        hashed_password,
    });
    state.store.save_all(&users).await?;

    info!(username = %payload.username, "user registered");
    Ok(Json(MsgResponse {
        msg: "User created successfully".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let users = state.store.load_all().await?;
    let user = find_by_username(&users, &payload.username).ok_or_else(|| {
        warn!(username = %payload.username, "login unknown username");
        ApiError::InvalidCredentials
    })?;

    if !verify_password(&payload.password, &user.hashed_password) {
        warn!(username = %payload.username, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(&user.username)?;

    info!(username = %user.username, "user logged in");
    Ok(Json(TokenResponse { access_token }))
}
