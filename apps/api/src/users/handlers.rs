use axum::{extract::State, Json};

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::state::AppState;
use crate::users::service::{self, RecruiterView};

/// GET /users/recruiters/
pub async fn handle_list_recruiters(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<RecruiterView>>, AppError> {
    Ok(Json(
        service::list_recruiters(state.store.as_ref(), &caller).await?,
    ))
}

/// GET /users/recruiters/top
pub async fn handle_top_recruiters(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<RecruiterView>>, AppError> {
    Ok(Json(
        service::top_recruiters(state.store.as_ref(), &caller).await?,
    ))
}
