use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::service::{self, SignupRequest};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::{AppForm, AppJson};
use crate::models::user::UserView;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserView,
}

/// OAuth2 password-flow form: the email travels as `username`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserView,
}

/// POST /auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<Json<SignupResponse>, AppError> {
    let user = service::signup(state.store.as_ref(), request).await?;
    Ok(Json(SignupResponse {
        message: "User created successfully".to_string(),
        user: UserView::from(&user),
    }))
}

/// POST /auth/token
pub async fn handle_login(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let (access_token, user) = service::login(
        state.store.as_ref(),
        &state.tokens,
        &form.username,
        &form.password,
    )
    .await?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user: UserView::from(&user),
    }))
}

/// GET /auth/me
pub async fn handle_me(CurrentUser(user): CurrentUser) -> Json<UserView> {
    Json(UserView::from(&user))
}
