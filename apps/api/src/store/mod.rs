//! Document store adapter: the only gateway through which services read or
//! mutate persisted records.
//!
//! Production uses [`postgres::PgStore`]; tests use an in-memory store that
//! enforces the same unique constraints. `AppState` carries an `Arc<dyn Store>`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::company::Company;
use crate::models::job_role::{JobRole, JobRoleCounter};
use crate::models::user::{User, UserRole};

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Unique constraint names, shared by the SQL schema and the in-memory store.
pub mod constraints {
    pub const COMPANY_WEBSITE: &str = "companies_website_key";
    pub const COMPANY_CODE: &str = "companies_code_key";
    pub const USER_EMAIL: &str = "users_email_key";
    pub const JOB_ROLE_TITLE: &str = "job_roles_company_id_title_key";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StoreError::UniqueViolation {
                    constraint: db.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        StoreError::Database(e)
    }
}

impl StoreError {
    pub fn violates(&self, name: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == name)
    }
}

/// Candidate counts for one recruiter, grouped by status.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StatusCount {
    pub recruiter_id: Uuid,
    pub status: CandidateStatus,
    pub count: i64,
}

#[async_trait]
pub trait Store: Send + Sync {
    // ── companies ───────────────────────────────────────────────────────────
    async fn company_website_exists(&self, website: &str) -> Result<bool, StoreError>;
    async fn company_code_exists(&self, code: &str) -> Result<bool, StoreError>;
    async fn insert_company(&self, company: &Company) -> Result<(), StoreError>;
    async fn find_company_by_code(&self, code: &str) -> Result<Option<Company>, StoreError>;

    // ── users ───────────────────────────────────────────────────────────────
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Users of one tenant with the given role, in signup order.
    async fn list_users_by_role(
        &self,
        company_id: Uuid,
        role: UserRole,
    ) -> Result<Vec<User>, StoreError>;

    // ── job roles ───────────────────────────────────────────────────────────
    async fn insert_job_role(&self, job_role: &JobRole) -> Result<(), StoreError>;
    /// All roles of a tenant in creation order.
    async fn list_job_roles(&self, company_id: Uuid) -> Result<Vec<JobRole>, StoreError>;
    /// Roles of a tenant by `applications_count` descending, ties in creation order.
    async fn top_job_roles(&self, company_id: Uuid, limit: i64)
        -> Result<Vec<JobRole>, StoreError>;
    async fn find_job_role(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<JobRole>, StoreError>;
    /// Overwrites the editable fields of a role within its tenant.
    /// Returns false when no row matched.
    async fn update_job_role(&self, job_role: &JobRole) -> Result<bool, StoreError>;
    async fn delete_job_role(&self, id: Uuid, company_id: Uuid) -> Result<bool, StoreError>;
    /// Atomically adds `delta` to a counter, clamping at zero.
    async fn adjust_job_role_counter(
        &self,
        id: Uuid,
        counter: JobRoleCounter,
        delta: i32,
    ) -> Result<(), StoreError>;

    // ── candidates ──────────────────────────────────────────────────────────
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<(), StoreError>;
    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>, StoreError>;
    async fn list_candidates_by_recruiter(
        &self,
        recruiter_id: Uuid,
    ) -> Result<Vec<Candidate>, StoreError>;
    async fn list_candidates_for_job_roles(
        &self,
        job_role_ids: &[Uuid],
    ) -> Result<Vec<Candidate>, StoreError>;
    /// Moves a candidate from `from` to `to`. Returns false when the stored
    /// status is no longer `from` (or the candidate is gone).
    async fn update_candidate_status(
        &self,
        id: Uuid,
        from: CandidateStatus,
        to: CandidateStatus,
    ) -> Result<bool, StoreError>;
    async fn count_candidates_by_recruiter(
        &self,
        recruiter_ids: &[Uuid],
    ) -> Result<Vec<StatusCount>, StoreError>;
}

/// Parses an external string identifier. `what` names the resource in the error.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation(format!("Invalid {what} ID")))
}
