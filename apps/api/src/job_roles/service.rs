use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::job_roles::fields::{deserialize_deadline, deserialize_optional_deadline, SkillsInput};
use crate::models::job_role::{JobRole, JobRoleStatus};
use crate::models::user::User;
use crate::policy::{authorize, Action};
use crate::store::{constraints, Store, StoreError};

/// Size of the "most in-demand roles" view.
pub const TOP_ROLES_LIMIT: i64 = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRoleRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub employment_type: String,
    pub department: String,
    pub location: String,
    pub education: String,
    pub skills: SkillsInput,
    pub experience: String,
    #[serde(deserialize_with = "deserialize_deadline")]
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub requirements: Option<String>,
}

/// Partial update: absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobRoleRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub employment_type: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub education: Option<String>,
    pub skills: Option<SkillsInput>,
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_deadline")]
    pub deadline: Option<DateTime<Utc>>,
    pub requirements: Option<String>,
    pub status: Option<JobRoleStatus>,
}

fn not_found() -> AppError {
    AppError::NotFound("Job role not found".to_string())
}

fn title_conflict(title: &str) -> AppError {
    AppError::Conflict(format!(
        "A job role with title '{title}' already exists for your company. \
         Please use a different title."
    ))
}

fn map_title_violation(e: StoreError, title: &str) -> AppError {
    if e.violates(constraints::JOB_ROLE_TITLE) {
        title_conflict(title)
    } else {
        AppError::Store(e)
    }
}

fn require_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    Ok(title.to_string())
}

pub async fn create_job_role(
    store: &dyn Store,
    caller: &User,
    request: CreateJobRoleRequest,
) -> Result<JobRole, AppError> {
    authorize(caller, Action::CreateJobRole)?;
    let title = require_title(&request.title)?;

    let now = Utc::now();
    let job_role = JobRole {
        id: Uuid::new_v4(),
        company_id: caller.company_id,
        title,
        description: request.description,
        employment_type: request.employment_type,
        department: request.department,
        location: request.location,
        education: request.education,
        skills: request.skills.normalize(),
        experience: request.experience,
        deadline: request.deadline,
        requirements: request.requirements,
        status: JobRoleStatus::Active,
        applications_count: 0,
        shortlisted_count: 0,
        created_at: now,
        updated_at: now,
    };

    store
        .insert_job_role(&job_role)
        .await
        .map_err(|e| map_title_violation(e, &job_role.title))?;

    info!("Created job role {} for company {}", job_role.id, job_role.company_id);
    Ok(job_role)
}

pub async fn list_job_roles(store: &dyn Store, caller: &User) -> Result<Vec<JobRole>, AppError> {
    Ok(store.list_job_roles(caller.company_id).await?)
}

/// The caller's tenant roles with the most applications, highest first.
pub async fn top_job_roles(store: &dyn Store, caller: &User) -> Result<Vec<JobRole>, AppError> {
    Ok(store
        .top_job_roles(caller.company_id, TOP_ROLES_LIMIT)
        .await?)
}

pub async fn get_job_role(store: &dyn Store, caller: &User, id: Uuid) -> Result<JobRole, AppError> {
    store
        .find_job_role(id, caller.company_id)
        .await?
        .ok_or_else(not_found)
}

pub async fn update_job_role(
    store: &dyn Store,
    caller: &User,
    id: Uuid,
    request: UpdateJobRoleRequest,
) -> Result<JobRole, AppError> {
    authorize(caller, Action::UpdateJobRole)?;

    let mut job_role = store
        .find_job_role(id, caller.company_id)
        .await?
        .ok_or_else(not_found)?;

    if let Some(title) = request.title {
        job_role.title = require_title(&title)?;
    }
    if let Some(description) = request.description {
        job_role.description = description;
    }
    if let Some(employment_type) = request.employment_type {
        job_role.employment_type = employment_type;
    }
    if let Some(department) = request.department {
        job_role.department = department;
    }
    if let Some(location) = request.location {
        job_role.location = location;
    }
    if let Some(education) = request.education {
        job_role.education = education;
    }
    if let Some(skills) = request.skills {
        job_role.skills = skills.normalize();
    }
    if let Some(experience) = request.experience {
        job_role.experience = experience;
    }
    if let Some(deadline) = request.deadline {
        job_role.deadline = deadline;
    }
    if let Some(requirements) = request.requirements {
        job_role.requirements = Some(requirements);
    }
    if let Some(status) = request.status {
        job_role.status = status;
    }
    job_role.updated_at = Utc::now();

    let updated = store
        .update_job_role(&job_role)
        .await
        .map_err(|e| map_title_violation(e, &job_role.title))?;
    if !updated {
        return Err(not_found());
    }

    info!("Updated job role {id}");
    Ok(job_role)
}

pub async fn delete_job_role(store: &dyn Store, caller: &User, id: Uuid) -> Result<(), AppError> {
    authorize(caller, Action::DeleteJobRole)?;
    if !store.delete_job_role(id, caller.company_id).await? {
        return Err(not_found());
    }
    info!("Deleted job role {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job_role::JobRoleCounter;
    use crate::models::user::UserRole;
    use crate::store::memory::MemoryStore;
    use crate::testing::{job_role_request, seed_company, seed_user};

    #[tokio::test]
    async fn test_create_initializes_counters_and_status() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "https://acme.io").await;
        let manager = seed_user(&store, &company, UserRole::HiringManager, "hm@acme.io").await;

        let mut request = job_role_request("Backend Engineer");
        request.skills = SkillsInput::Text("Rust, Postgres".to_string());
        let role = create_job_role(&store, &manager, request).await.unwrap();

        assert_eq!(role.company_id, company.id);
        assert_eq!(role.status, JobRoleStatus::Active);
        assert_eq!(role.applications_count, 0);
        assert_eq!(role.shortlisted_count, 0);
        assert_eq!(role.skills, vec!["Rust", "Postgres"]);
    }

    #[tokio::test]
    async fn test_only_hiring_managers_create() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "https://acme.io").await;
        let recruiter = seed_user(&store, &company, UserRole::Recruiter, "r@acme.io").await;

        let err = create_job_role(&store, &recruiter, job_role_request("SRE"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_duplicate_title_conflicts_and_first_is_unchanged() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "https://acme.io").await;
        let manager = seed_user(&store, &company, UserRole::HiringManager, "hm@acme.io").await;

        let first = create_job_role(&store, &manager, job_role_request("SRE"))
            .await
            .unwrap();
        let mut second = job_role_request("SRE");
        second.description = "different".to_string();
        let err = create_job_role(&store, &manager, second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let fetched = get_job_role(&store, &manager, first.id).await.unwrap();
        assert_eq!(fetched.description, first.description);
        assert_eq!(list_job_roles(&store, &manager).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_title_allowed_in_other_tenant() {
        let store = MemoryStore::new();
        let acme = seed_company(&store, "https://acme.io").await;
        let globex = seed_company(&store, "https://globex.io").await;
        let acme_hm = seed_user(&store, &acme, UserRole::HiringManager, "hm@acme.io").await;
        let globex_hm = seed_user(&store, &globex, UserRole::HiringManager, "hm@globex.io").await;

        create_job_role(&store, &acme_hm, job_role_request("SRE")).await.unwrap();
        create_job_role(&store, &globex_hm, job_role_request("SRE")).await.unwrap();
    }

    #[tokio::test]
    async fn test_top_returns_three_by_applications_desc() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "https://acme.io").await;
        let manager = seed_user(&store, &company, UserRole::HiringManager, "hm@acme.io").await;

        for (i, count) in [9, 1, 5, 0, 3].into_iter().enumerate() {
            let role = create_job_role(&store, &manager, job_role_request(&format!("Role {i}")))
                .await
                .unwrap();
            store
                .adjust_job_role_counter(role.id, JobRoleCounter::Applications, count)
                .await
                .unwrap();
        }

        let top = top_job_roles(&store, &manager).await.unwrap();
        let counts: Vec<i32> = top.iter().map(|r| r.applications_count).collect();
        assert_eq!(counts, vec![9, 5, 3]);
    }

    #[tokio::test]
    async fn test_cross_tenant_access_is_not_found() {
        let store = MemoryStore::new();
        let acme = seed_company(&store, "https://acme.io").await;
        let globex = seed_company(&store, "https://globex.io").await;
        let acme_hm = seed_user(&store, &acme, UserRole::HiringManager, "hm@acme.io").await;
        let outsider = seed_user(&store, &globex, UserRole::HiringManager, "hm@globex.io").await;

        let role = create_job_role(&store, &acme_hm, job_role_request("SRE"))
            .await
            .unwrap();

        assert!(matches!(
            get_job_role(&store, &outsider, role.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            update_job_role(&store, &outsider, role.id, UpdateJobRoleRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            delete_job_role(&store, &outsider, role.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(get_job_role(&store, &acme_hm, role.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_partial_update_touches_only_given_fields() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "https://acme.io").await;
        let manager = seed_user(&store, &company, UserRole::HiringManager, "hm@acme.io").await;
        let role = create_job_role(&store, &manager, job_role_request("SRE"))
            .await
            .unwrap();

        let update = UpdateJobRoleRequest {
            location: Some("Remote".to_string()),
            status: Some(JobRoleStatus::Closed),
            ..Default::default()
        };
        let updated = update_job_role(&store, &manager, role.id, update).await.unwrap();

        assert_eq!(updated.location, "Remote");
        assert_eq!(updated.status, JobRoleStatus::Closed);
        assert_eq!(updated.title, role.title);
        assert_eq!(updated.description, role.description);
        assert_eq!(updated.skills, role.skills);
        assert!(updated.updated_at >= role.updated_at);
    }

    #[tokio::test]
    async fn test_rename_onto_existing_title_conflicts() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "https://acme.io").await;
        let manager = seed_user(&store, &company, UserRole::HiringManager, "hm@acme.io").await;
        create_job_role(&store, &manager, job_role_request("SRE")).await.unwrap();
        let other = create_job_role(&store, &manager, job_role_request("QA")).await.unwrap();

        let update = UpdateJobRoleRequest {
            title: Some("SRE".to_string()),
            ..Default::default()
        };
        let err = update_job_role(&store, &manager, other.id, update).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_recruiter_cannot_update_or_delete() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "https://acme.io").await;
        let manager = seed_user(&store, &company, UserRole::HiringManager, "hm@acme.io").await;
        let recruiter = seed_user(&store, &company, UserRole::Recruiter, "r@acme.io").await;
        let role = create_job_role(&store, &manager, job_role_request("SRE"))
            .await
            .unwrap();

        assert!(matches!(
            update_job_role(&store, &recruiter, role.id, UpdateJobRoleRequest::default()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            delete_job_role(&store, &recruiter, role.id).await,
            Err(AppError::Forbidden(_))
        ));
        delete_job_role(&store, &manager, role.id).await.unwrap();
        assert!(matches!(
            get_job_role(&store, &manager, role.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
