//! Role gate for mutating and listing operations.
//!
//! Failing this gate is `Forbidden`, which is distinct from an unresolved
//! caller (`Unauthorized`) and from cross-tenant access (reported as `NotFound`
//! by the services themselves).

use crate::errors::AppError;
use crate::models::user::{User, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateJobRole,
    UpdateJobRole,
    DeleteJobRole,
    UploadCv,
    ListOwnCandidates,
    ListCompanyCandidates,
    ReviewCandidate,
}

impl Action {
    pub fn required_role(self) -> UserRole {
        match self {
            Action::CreateJobRole
            | Action::UpdateJobRole
            | Action::DeleteJobRole
            | Action::ListCompanyCandidates
            | Action::ReviewCandidate => UserRole::HiringManager,
            Action::UploadCv | Action::ListOwnCandidates => UserRole::Recruiter,
        }
    }

    fn denial(self) -> &'static str {
        match self {
            Action::CreateJobRole => "Only hiring managers can create job roles",
            Action::UpdateJobRole => "Only hiring managers can update job roles",
            Action::DeleteJobRole => "Only hiring managers can delete job roles",
            Action::UploadCv => "Only recruiters can upload CVs",
            Action::ListOwnCandidates => "Only recruiters can view their candidates",
            Action::ListCompanyCandidates => "Only hiring managers can view all candidates",
            Action::ReviewCandidate => "Only hiring managers can review candidates",
        }
    }
}

pub fn authorize(caller: &User, action: Action) -> Result<(), AppError> {
    if caller.role == action.required_role() {
        Ok(())
    } else {
        Err(AppError::Forbidden(action.denial().to_string()))
    }
}
