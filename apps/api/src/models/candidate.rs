use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Uploaded,
    Pending,
    Rejected,
    Selected,
    Shortlisted,
}

impl CandidateStatus {
    /// Whether a candidate in this state counts toward a role's shortlist.
    /// Selection happens from the shortlist, so selected candidates count too.
    pub fn is_shortlisted(&self) -> bool {
        matches!(self, CandidateStatus::Shortlisted | CandidateStatus::Selected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub candidate_name: String,
    pub degree: String,
    pub course: String,
    /// CGPA or percentage, kept verbatim.
    pub cgpa: String,
    pub ats_score: i32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub feedback: String,
    pub detailed_feedback: String,
    pub cv_url: String,
    pub recruiter_id: Uuid,
    pub job_role_id: Uuid,
    /// Title of the job role at upload time.
    pub job_role_title: String,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,
}
