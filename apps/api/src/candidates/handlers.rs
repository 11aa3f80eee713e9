use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;

use crate::auth::CurrentUser;
use crate::candidates::intake::{CvUpload, Intake};
use crate::candidates::service::{self, StatusUpdate};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::candidate::Candidate;
use crate::state::AppState;
use crate::store::parse_id;

fn bad_multipart(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {e}"))
}

fn missing(field: &str) -> AppError {
    AppError::Validation(format!("Missing form field '{field}'"))
}

/// Reads `{job_role_id, job_description, file}` out of the form.
async fn read_upload(mut multipart: Multipart) -> Result<CvUpload, AppError> {
    let mut job_role_id = None;
    let mut job_description = None;
    let mut file: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_role_id" => {
                job_role_id = Some(field.text().await.map_err(bad_multipart)?);
            }
            "job_description" => {
                job_description = Some(field.text().await.map_err(bad_multipart)?);
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("cv").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((file_name, content_type, bytes));
            }
            _ => {}
        }
    }

    let job_role_id = job_role_id.ok_or_else(|| missing("job_role_id"))?;
    let (file_name, content_type, bytes) = file.ok_or_else(|| missing("file"))?;
    Ok(CvUpload {
        job_role_id: parse_id(job_role_id.trim(), "job role")?,
        job_description: job_description.ok_or_else(|| missing("job_description"))?,
        file_name,
        content_type,
        bytes,
    })
}

/// POST /candidates/candidates/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    let upload = read_upload(multipart?).await?;
    let intake = Intake {
        store: state.store.as_ref(),
        storage: state.storage.as_ref(),
        evaluator: state.evaluator.as_ref(),
        ai_timeout: state.config.ai_timeout,
    };
    let candidate = intake.upload(&caller, upload).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// GET /candidates/recruiter
pub async fn handle_list_own(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<Candidate>>, AppError> {
    Ok(Json(
        service::list_for_recruiter(state.store.as_ref(), &caller).await?,
    ))
}

/// GET /candidates/candidates/company
pub async fn handle_list_company(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<Candidate>>, AppError> {
    Ok(Json(
        service::list_for_company(state.store.as_ref(), &caller).await?,
    ))
}

/// GET /candidates/:id
pub async fn handle_get(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Candidate>, AppError> {
    let id = parse_id(&id, "candidate")?;
    Ok(Json(
        service::get_candidate(state.store.as_ref(), &caller, id).await?,
    ))
}

/// PATCH /candidates/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    AppJson(update): AppJson<StatusUpdate>,
) -> Result<Json<Candidate>, AppError> {
    let id = parse_id(&id, "candidate")?;
    Ok(Json(
        service::update_status(state.store.as_ref(), &caller, id, update.status).await?,
    ))
}
