//! CV upload pipeline: validate → relay to object storage → AI verdict →
//! persist exactly one candidate record.
//!
//! The AI step never fails the upload. A timeout, transport error or
//! malformed answer yields a `pending` record instead.

use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::{Assessment, CvEvaluator, EvaluationError, Verdict};
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::job_role::{JobRole, JobRoleCounter};
use crate::models::user::User;
use crate::policy::{authorize, Action};
use crate::storage::{cv_object_key, ObjectStorage};
use crate::store::Store;

pub const ALLOWED_CV_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const PENDING: &str = "Pending";
const PENDING_FEEDBACK: &str = "Pending AI analysis";
const NOT_ELIGIBLE: &str = "Not Eligible";
const NOT_SPECIFIED: &str = "Not specified";

/// Collaborators the pipeline talks to.
pub struct Intake<'a> {
    pub store: &'a dyn Store,
    pub storage: &'a dyn ObjectStorage,
    pub evaluator: &'a dyn CvEvaluator,
    pub ai_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CvUpload {
    pub job_role_id: Uuid,
    pub job_description: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Fields fixed before the AI verdict is known.
struct Provenance<'a> {
    file_name: &'a str,
    cv_url: String,
    recruiter_id: Uuid,
    job_role: &'a JobRole,
}

fn validate(upload: &CvUpload) -> Result<(), AppError> {
    let content_type = upload
        .content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ALLOWED_CV_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::Validation(
            "Invalid file type. Only PDF, DOC, and DOCX files are allowed.".to_string(),
        ));
    }
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("Empty file uploaded".to_string()));
    }
    if upload.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn build_candidate(outcome: Result<Verdict, EvaluationError>, p: Provenance<'_>) -> Candidate {
    let base = |candidate_name: String, status: CandidateStatus| Candidate {
        id: Uuid::new_v4(),
        candidate_name,
        degree: String::new(),
        course: String::new(),
        cgpa: String::new(),
        ats_score: 0,
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        feedback: String::new(),
        detailed_feedback: String::new(),
        cv_url: p.cv_url.clone(),
        recruiter_id: p.recruiter_id,
        job_role_id: p.job_role.id,
        job_role_title: p.job_role.title.clone(),
        status,
        created_at: Utc::now(),
    };

    match outcome {
        Ok(Verdict::Eligible(Assessment {
            candidate_name,
            degree,
            course,
            cgpa,
            ats_score,
            strengths,
            weaknesses,
            feedback,
            detailed_feedback,
        })) => Candidate {
            degree: degree.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            course: course.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            cgpa: cgpa.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            ats_score,
            strengths,
            weaknesses,
            feedback,
            detailed_feedback,
            ..base(candidate_name, CandidateStatus::Uploaded)
        },
        Ok(Verdict::Ineligible {
            candidate_name,
            reason,
        }) => {
            let note = format!("Not eligible: {reason}");
            Candidate {
                degree: NOT_ELIGIBLE.to_string(),
                course: NOT_ELIGIBLE.to_string(),
                cgpa: "N/A".to_string(),
                feedback: note.clone(),
                detailed_feedback: note,
                ..base(candidate_name, CandidateStatus::Rejected)
            }
        }
        Err(e) => {
            warn!("AI evaluation failed for {}, storing as pending: {e}", p.cv_url);
            Candidate {
                degree: PENDING.to_string(),
                course: PENDING.to_string(),
                cgpa: PENDING.to_string(),
                feedback: PENDING_FEEDBACK.to_string(),
                detailed_feedback: PENDING_FEEDBACK.to_string(),
                ..base(p.file_name.to_string(), CandidateStatus::Pending)
            }
        }
    }
}

impl Intake<'_> {
    pub async fn upload(&self, caller: &User, upload: CvUpload) -> Result<Candidate, AppError> {
        authorize(caller, Action::UploadCv)?;
        validate(&upload)?;

        // Checked before the relay so a bad role id leaves no orphaned object.
        let job_role = self
            .store
            .find_job_role(upload.job_role_id, caller.company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job role not found".to_string()))?;

        let key = cv_object_key(&upload.file_name, Utc::now());
        let cv_url = self
            .storage
            .put(&key, upload.bytes.clone(), &upload.content_type)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let outcome = match tokio::time::timeout(
            self.ai_timeout,
            self.evaluator.evaluate(&cv_url, &upload.job_description),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(EvaluationError::Timeout(self.ai_timeout)),
        };

        let candidate = build_candidate(
            outcome,
            Provenance {
                file_name: &upload.file_name,
                cv_url,
                recruiter_id: caller.id,
                job_role: &job_role,
            },
        );
        self.store.insert_candidate(&candidate).await?;

        if let Err(e) = self
            .store
            .adjust_job_role_counter(job_role.id, JobRoleCounter::Applications, 1)
            .await
        {
            warn!("Could not bump applications_count on {}: {e}", job_role.id);
        }

        info!(
            "Stored candidate {} for job role {} with status {:?}",
            candidate.id, job_role.id, candidate.status
        );
        Ok(candidate)
    }
}
