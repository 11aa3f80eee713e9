use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{dummy_hash, hash_password, verify_password};
use crate::auth::token::TokenIssuer;
use crate::errors::AppError;
use crate::models::user::{User, UserRole};
use crate::store::{constraints, Store};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub full_name: String,
    pub company_code: String,
    pub role: UserRole,
    pub password: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AppError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::Validation("Invalid email address".to_string())),
    }
}

async fn hash_off_thread(password: String) -> Result<String, AppError> {
    Ok(tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(anyhow::Error::from)??)
}

async fn verify_off_thread(password: String, hash: String) -> Result<bool, AppError> {
    Ok(
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(anyhow::Error::from)?,
    )
}

/// Registers a user under the tenant owning `company_code`.
pub async fn signup(store: &dyn Store, request: SignupRequest) -> Result<User, AppError> {
    let email = normalize_email(&request.email);
    validate_email(&email)?;
    let full_name = request.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(AppError::Validation("full_name cannot be empty".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::Validation("password cannot be empty".to_string()));
    }

    if store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let company = store
        .find_company_by_code(request.company_code.trim())
        .await?
        .ok_or_else(|| AppError::Validation("Invalid company code".to_string()))?;

    let user = User {
        id: Uuid::new_v4(),
        email,
        full_name,
        company_id: company.id,
        company_code: company.code,
        role: request.role,
        password_hash: hash_off_thread(request.password).await?,
        is_active: true,
        created_at: Utc::now(),
    };

    // The email check above can race with a concurrent signup.
    store.insert_user(&user).await.map_err(|e| {
        if e.violates(constraints::USER_EMAIL) {
            AppError::Conflict("Email already registered".to_string())
        } else {
            AppError::Store(e)
        }
    })?;

    info!("Registered {} user {}", user.role.as_str(), user.id);
    Ok(user)
}

/// Checks credentials and issues a bearer token.
/// Unknown email and wrong password fail identically.
pub async fn login(
    store: &dyn Store,
    tokens: &TokenIssuer,
    email: &str,
    password: &str,
) -> Result<(String, User), AppError> {
    let user = store.find_user_by_email(&normalize_email(email)).await?;

    let hash = user
        .as_ref()
        .map(|u| u.password_hash.clone())
        .unwrap_or_else(|| dummy_hash().to_string());
    let verified = verify_off_thread(password.to_string(), hash).await?;

    let user = match user {
        Some(user) if verified && user.is_active => user,
        _ => return Err(AppError::InvalidCredentials),
    };

    let token = tokens.issue(&user.email, user.role)?;
    Ok((token, user))
}

/// Resolves a bearer token to a live, active user.
pub async fn current_caller(
    store: &dyn Store,
    tokens: &TokenIssuer,
    token: &str,
) -> Result<User, AppError> {
    let claims = tokens.verify(token)?;
    match store.find_user_by_email(&claims.sub).await? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AppError::Unauthorized),
    }
}
