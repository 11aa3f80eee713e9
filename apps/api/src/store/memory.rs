//! In-memory `Store` for tests. Rows are kept in insertion order, and the
//! unique constraints match the SQL schema.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::company::Company;
use crate::models::job_role::{JobRole, JobRoleCounter};
use crate::models::user::{User, UserRole};
use crate::store::{constraints, StatusCount, Store, StoreError};

#[derive(Default)]
struct Tables {
    companies: Vec<Company>,
    users: Vec<User>,
    job_roles: Vec<JobRole>,
    candidates: Vec<Candidate>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    yield_on_lookup: AtomicBool,
}

fn unique(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn company_count(&self) -> usize {
        self.tables.lock().unwrap().companies.len()
    }

    pub fn candidate_count(&self) -> usize {
        self.tables.lock().unwrap().candidates.len()
    }

    /// Removes a user, simulating an account deleted after a token was issued.
    pub fn remove_user(&self, email: &str) {
        self.tables.lock().unwrap().users.retain(|u| u.email != email);
    }

    /// Makes every job role lookup yield to the scheduler first, so
    /// concurrent service calls interleave at that point.
    pub fn interleave_lookups(&self) {
        self.yield_on_lookup.store(true, Ordering::SeqCst);
    }

    pub fn job_role(&self, id: Uuid) -> Option<JobRole> {
        self.tables
            .lock()
            .unwrap()
            .job_roles
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn company_website_exists(&self, website: &str) -> Result<bool, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.companies.iter().any(|c| c.website == website))
    }

    async fn company_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.companies.iter().any(|c| c.code == code))
    }

    async fn insert_company(&self, company: &Company) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.companies.iter().any(|c| c.website == company.website) {
            return Err(unique(constraints::COMPANY_WEBSITE));
        }
        if tables.companies.iter().any(|c| c.code == company.code) {
            return Err(unique(constraints::COMPANY_CODE));
        }
        tables.companies.push(company.clone());
        Ok(())
    }

    async fn find_company_by_code(&self, code: &str) -> Result<Option<Company>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.companies.iter().find(|c| c.code == code).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(unique(constraints::USER_EMAIL));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users_by_role(
        &self,
        company_id: Uuid,
        role: UserRole,
    ) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .filter(|u| u.company_id == company_id && u.role == role)
            .cloned()
            .collect())
    }

    async fn insert_job_role(&self, job_role: &JobRole) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .job_roles
            .iter()
            .any(|r| r.company_id == job_role.company_id && r.title == job_role.title)
        {
            return Err(unique(constraints::JOB_ROLE_TITLE));
        }
        tables.job_roles.push(job_role.clone());
        Ok(())
    }

    async fn list_job_roles(&self, company_id: Uuid) -> Result<Vec<JobRole>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .job_roles
            .iter()
            .filter(|r| r.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn top_job_roles(
        &self,
        company_id: Uuid,
        limit: i64,
    ) -> Result<Vec<JobRole>, StoreError> {
        let mut roles = self.list_job_roles(company_id).await?;
        // Stable sort keeps insertion order among equal counts.
        roles.sort_by(|a, b| b.applications_count.cmp(&a.applications_count));
        roles.truncate(limit.max(0) as usize);
        Ok(roles)
    }

    async fn find_job_role(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<JobRole>, StoreError> {
        if self.yield_on_lookup.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .job_roles
            .iter()
            .find(|r| r.id == id && r.company_id == company_id)
            .cloned())
    }

    async fn update_job_role(&self, job_role: &JobRole) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.job_roles.iter().any(|r| {
            r.id != job_role.id && r.company_id == job_role.company_id && r.title == job_role.title
        }) {
            return Err(unique(constraints::JOB_ROLE_TITLE));
        }
        let Some(existing) = tables
            .job_roles
            .iter_mut()
            .find(|r| r.id == job_role.id && r.company_id == job_role.company_id)
        else {
            return Ok(false);
        };
        // Counters and creation time are not editable through this path.
        let applications_count = existing.applications_count;
        let shortlisted_count = existing.shortlisted_count;
        let created_at = existing.created_at;
        *existing = job_role.clone();
        existing.applications_count = applications_count;
        existing.shortlisted_count = shortlisted_count;
        existing.created_at = created_at;
        Ok(true)
    }

    async fn delete_job_role(&self, id: Uuid, company_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.job_roles.len();
        tables
            .job_roles
            .retain(|r| !(r.id == id && r.company_id == company_id));
        Ok(tables.job_roles.len() < before)
    }

    async fn adjust_job_role_counter(
        &self,
        id: Uuid,
        counter: JobRoleCounter,
        delta: i32,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(role) = tables.job_roles.iter_mut().find(|r| r.id == id) {
            let value = match counter {
                JobRoleCounter::Applications => &mut role.applications_count,
                JobRoleCounter::Shortlisted => &mut role.shortlisted_count,
            };
            *value = (*value + delta).max(0);
        }
        Ok(())
    }

    async fn insert_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        self.tables.lock().unwrap().candidates.push(candidate.clone());
        Ok(())
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn list_candidates_by_recruiter(
        &self,
        recruiter_id: Uuid,
    ) -> Result<Vec<Candidate>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .candidates
            .iter()
            .filter(|c| c.recruiter_id == recruiter_id)
            .cloned()
            .collect())
    }

    async fn list_candidates_for_job_roles(
        &self,
        job_role_ids: &[Uuid],
    ) -> Result<Vec<Candidate>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .candidates
            .iter()
            .filter(|c| job_role_ids.contains(&c.job_role_id))
            .cloned()
            .collect())
    }

    async fn update_candidate_status(
        &self,
        id: Uuid,
        from: CandidateStatus,
        to: CandidateStatus,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        match tables
            .candidates
            .iter_mut()
            .find(|c| c.id == id && c.status == from)
        {
            Some(candidate) => {
                candidate.status = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_candidates_by_recruiter(
        &self,
        recruiter_ids: &[Uuid],
    ) -> Result<Vec<StatusCount>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut counts: Vec<StatusCount> = Vec::new();
        for candidate in tables
            .candidates
            .iter()
            .filter(|c| recruiter_ids.contains(&c.recruiter_id))
        {
            match counts
                .iter_mut()
                .find(|s| s.recruiter_id == candidate.recruiter_id && s.status == candidate.status)
            {
                Some(entry) => entry.count += 1,
                None => counts.push(StatusCount {
                    recruiter_id: candidate.recruiter_id,
                    status: candidate.status,
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }
}
