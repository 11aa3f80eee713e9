use axum::{extract::State, http::StatusCode, Json};

use crate::companies::service::{register_company, RegisterCompanyRequest};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::company::Company;
use crate::state::AppState;

/// POST /company/register
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterCompanyRequest>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let company = register_company(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(company)))
}
