use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};

use crate::{
    auth::{
        dto::{JwtResponse, PublicUser, RefreshTokenRequest, SignInRequest, SignUpRequest},
        error::AuthError,
        extractors::AuthUser,
        services::{is_valid_email, Registration},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignUpRequest>,
) -> Response {
    payload.email = payload.email.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!("invalid email");
        return (StatusCode::BAD_REQUEST, "Invalid email").into_response();
    }
    if payload.password.is_empty() {
        warn!("empty password");
        return (StatusCode::BAD_REQUEST, "Password must not be empty").into_response();
    }

    match state.auth.register_user(payload).await {
        Ok(Registration::Created(_)) => {
            (StatusCode::OK, "User registered successfully").into_response()
        }
        Ok(Registration::AlreadyExists) => {
            (StatusCode::BAD_REQUEST, "User already exists").into_response()
        }
        Err(e) => {
            error!(error = %e, "signup failed");
            e.into_response()
        }
    }
}

#[instrument(skip(state, payload), fields(email = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<JwtResponse>, AuthError> {
    state.auth.login(payload).await.map(Json)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<JwtResponse>, AuthError> {
    state.auth.refresh(payload).await.map(Json)
}

#[instrument(skip(state, user), fields(email = %user.email))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PublicUser>, AuthError> {
    state
        .auth
        .users()
        .find_by_email(&user.email)
        .await?
        .map(|u| Json(PublicUser::from(u)))
        .ok_or(AuthError::UserNotFound)
}
