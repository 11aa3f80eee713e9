pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::{auth, candidates, companies, job_roles, users};

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Tenants and identity
        .route(
            "/company/register",
            post(companies::handlers::handle_register),
        )
        .route("/auth/signup", post(auth::handlers::handle_signup))
        .route("/auth/token", post(auth::handlers::handle_login))
        .route("/auth/me", get(auth::handlers::handle_me))
        // Job roles
        .route(
            "/job-roles",
            get(job_roles::handlers::handle_list).post(job_roles::handlers::handle_create),
        )
        .route(
            "/job-roles/",
            get(job_roles::handlers::handle_list).post(job_roles::handlers::handle_create),
        )
        .route("/job-roles/top", get(job_roles::handlers::handle_top))
        .route("/job-roles/top/", get(job_roles::handlers::handle_top))
        .route(
            "/job-roles/:id",
            get(job_roles::handlers::handle_get)
                .put(job_roles::handlers::handle_update)
                .delete(job_roles::handlers::handle_delete),
        )
        // Candidates
        .route(
            "/candidates/candidates/upload",
            post(candidates::handlers::handle_upload)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/candidates/candidates/company",
            get(candidates::handlers::handle_list_company),
        )
        .route(
            "/candidates/recruiter",
            get(candidates::handlers::handle_list_own),
        )
        .route("/candidates/:id", get(candidates::handlers::handle_get))
        .route(
            "/candidates/:id/status",
            patch(candidates::handlers::handle_update_status),
        )
        // Users
        .route(
            "/users/recruiters",
            get(users::handlers::handle_list_recruiters),
        )
        .route(
            "/users/recruiters/",
            get(users::handlers::handle_list_recruiters),
        )
        .route(
            "/users/recruiters/top",
            get(users::handlers::handle_top_recruiters),
        )
        .with_state(state)
}
