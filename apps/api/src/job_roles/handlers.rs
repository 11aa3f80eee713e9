use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::job_roles::service::{self, CreateJobRoleRequest, UpdateJobRoleRequest};
use crate::models::job_role::JobRole;
use crate::state::AppState;
use crate::store::parse_id;

/// POST /job-roles/
pub async fn handle_create(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    AppJson(request): AppJson<CreateJobRoleRequest>,
) -> Result<(StatusCode, Json<JobRole>), AppError> {
    let role = service::create_job_role(state.store.as_ref(), &caller, request).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// GET /job-roles/
pub async fn handle_list(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<JobRole>>, AppError> {
    Ok(Json(
        service::list_job_roles(state.store.as_ref(), &caller).await?,
    ))
}

/// GET /job-roles/top/
pub async fn handle_top(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<JobRole>>, AppError> {
    Ok(Json(
        service::top_job_roles(state.store.as_ref(), &caller).await?,
    ))
}

/// GET /job-roles/:id
pub async fn handle_get(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<JobRole>, AppError> {
    let id = parse_id(&id, "job role")?;
    Ok(Json(
        service::get_job_role(state.store.as_ref(), &caller, id).await?,
    ))
}

/// PUT /job-roles/:id
pub async fn handle_update(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateJobRoleRequest>,
) -> Result<Json<JobRole>, AppError> {
    let id = parse_id(&id, "job role")?;
    Ok(Json(
        service::update_job_role(state.store.as_ref(), &caller, id, request).await?,
    ))
}

/// DELETE /job-roles/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "job role")?;
    service::delete_job_role(state.store.as_ref(), &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
