use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::job_role::JobRoleCounter;
use crate::models::user::{User, UserRole};
use crate::policy::{authorize, Action};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: CandidateStatus,
}

fn not_found() -> AppError {
    AppError::NotFound("Candidate not found".to_string())
}

/// A candidate belongs to the tenant owning its job role.
async fn in_caller_tenant(
    store: &dyn Store,
    caller: &User,
    candidate: &Candidate,
) -> Result<bool, AppError> {
    Ok(store
        .find_job_role(candidate.job_role_id, caller.company_id)
        .await?
        .is_some())
}

pub async fn list_for_recruiter(store: &dyn Store, caller: &User) -> Result<Vec<Candidate>, AppError> {
    authorize(caller, Action::ListOwnCandidates)?;
    Ok(store.list_candidates_by_recruiter(caller.id).await?)
}

/// Every candidate uploaded against any of the caller's tenant job roles.
pub async fn list_for_company(store: &dyn Store, caller: &User) -> Result<Vec<Candidate>, AppError> {
    authorize(caller, Action::ListCompanyCandidates)?;
    let role_ids: Vec<Uuid> = store
        .list_job_roles(caller.company_id)
        .await?
        .into_iter()
        .map(|role| role.id)
        .collect();
    Ok(store.list_candidates_for_job_roles(&role_ids).await?)
}

pub async fn get_candidate(store: &dyn Store, caller: &User, id: Uuid) -> Result<Candidate, AppError> {
    let candidate = store.find_candidate(id).await?.ok_or_else(not_found)?;

    if caller.role == UserRole::Recruiter && candidate.recruiter_id == caller.id {
        return Ok(candidate);
    }
    if !in_caller_tenant(store, caller, &candidate).await? {
        return Err(not_found());
    }
    if caller.role == UserRole::Recruiter {
        return Err(AppError::Forbidden(
            "You don't have permission to view this candidate".to_string(),
        ));
    }
    Ok(candidate)
}

/// Moves a candidate through review. Entering or leaving the
/// shortlisted/selected set adjusts the job role's `shortlisted_count`.
pub async fn update_status(
    store: &dyn Store,
    caller: &User,
    id: Uuid,
    status: CandidateStatus,
) -> Result<Candidate, AppError> {
    authorize(caller, Action::ReviewCandidate)?;

    let mut candidate = store.find_candidate(id).await?.ok_or_else(not_found)?;
    if !in_caller_tenant(store, caller, &candidate).await? {
        return Err(not_found());
    }
    if candidate.status == status {
        return Ok(candidate);
    }

    if !store
        .update_candidate_status(id, candidate.status, status)
        .await?
    {
        // A concurrent review moved it first; report what is stored now.
        return store.find_candidate(id).await?.ok_or_else(not_found);
    }

    let delta = match (candidate.status.is_shortlisted(), status.is_shortlisted()) {
        (false, true) => 1,
        (true, false) => -1,
        _ => 0,
    };
    if delta != 0 {
        if let Err(e) = store
            .adjust_job_role_counter(candidate.job_role_id, JobRoleCounter::Shortlisted, delta)
            .await
        {
            warn!(
                "Could not adjust shortlisted_count on {}: {e}",
                candidate.job_role_id
            );
        }
    }

    info!(
        "Candidate {id} moved from {:?} to {status:?} by {}",
        candidate.status, caller.id
    );
    candidate.status = status;
    Ok(candidate)
}
