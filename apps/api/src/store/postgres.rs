use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::company::Company;
use crate::models::job_role::{JobRole, JobRoleCounter};
use crate::models::user::{User, UserRole};
use crate::store::{StatusCount, Store, StoreError};

/// PostgreSQL-backed store over a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn company_website_exists(&self, website: &str) -> Result<bool, StoreError> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM companies WHERE website = $1)")
                .bind(website)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn company_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM companies WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn insert_company(&self, company: &Company) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, name, description, website, code, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.description)
        .bind(&company.website)
        .bind(&company.code)
        .bind(company.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_company_by_code(&self, code: &str) -> Result<Option<Company>, StoreError> {
        Ok(
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, full_name, company_id, company_code, role,
                 password_hash, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.company_id)
        .bind(&user.company_code)
        .bind(user.role)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_users_by_role(
        &self,
        company_id: Uuid,
        role: UserRole,
    ) -> Result<Vec<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE company_id = $1 AND role = $2 ORDER BY created_at, id",
        )
        .bind(company_id)
        .bind(role)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_job_role(&self, job_role: &JobRole) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO job_roles
                (id, company_id, title, description, employment_type, department,
                 location, education, skills, experience, deadline, requirements,
                 status, applications_count, shortlisted_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(job_role.id)
        .bind(job_role.company_id)
        .bind(&job_role.title)
        .bind(&job_role.description)
        .bind(&job_role.employment_type)
        .bind(&job_role.department)
        .bind(&job_role.location)
        .bind(&job_role.education)
        .bind(&job_role.skills)
        .bind(&job_role.experience)
        .bind(job_role.deadline)
        .bind(&job_role.requirements)
        .bind(job_role.status)
        .bind(job_role.applications_count)
        .bind(job_role.shortlisted_count)
        .bind(job_role.created_at)
        .bind(job_role.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_job_roles(&self, company_id: Uuid) -> Result<Vec<JobRole>, StoreError> {
        Ok(sqlx::query_as::<_, JobRole>(
            "SELECT * FROM job_roles WHERE company_id = $1 ORDER BY created_at, id",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn top_job_roles(
        &self,
        company_id: Uuid,
        limit: i64,
    ) -> Result<Vec<JobRole>, StoreError> {
        Ok(sqlx::query_as::<_, JobRole>(
            r#"
            SELECT * FROM job_roles
            WHERE company_id = $1
            ORDER BY applications_count DESC, created_at, id
            LIMIT $2
            "#,
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_job_role(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<JobRole>, StoreError> {
        Ok(sqlx::query_as::<_, JobRole>(
            "SELECT * FROM job_roles WHERE id = $1 AND company_id = $2",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_job_role(&self, job_role: &JobRole) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE job_roles SET
                title = $3, description = $4, employment_type = $5, department = $6,
                location = $7, education = $8, skills = $9, experience = $10,
                deadline = $11, requirements = $12, status = $13, updated_at = $14
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(job_role.id)
        .bind(job_role.company_id)
        .bind(&job_role.title)
        .bind(&job_role.description)
        .bind(&job_role.employment_type)
        .bind(&job_role.department)
        .bind(&job_role.location)
        .bind(&job_role.education)
        .bind(&job_role.skills)
        .bind(&job_role.experience)
        .bind(job_role.deadline)
        .bind(&job_role.requirements)
        .bind(job_role.status)
        .bind(job_role.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_job_role(&self, id: Uuid, company_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM job_roles WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn adjust_job_role_counter(
        &self,
        id: Uuid,
        counter: JobRoleCounter,
        delta: i32,
    ) -> Result<(), StoreError> {
        // Single-statement update; concurrent uploads never lose an increment.
        let column = counter.column();
        let sql = format!("UPDATE job_roles SET {column} = GREATEST({column} + $2, 0) WHERE id = $1");
        sqlx::query(&sql)
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_candidate(&self, candidate: &Candidate) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO candidates
                (id, candidate_name, degree, course, cgpa, ats_score, strengths,
                 weaknesses, feedback, detailed_feedback, cv_url, recruiter_id,
                 job_role_id, job_role_title, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(candidate.id)
        .bind(&candidate.candidate_name)
        .bind(&candidate.degree)
        .bind(&candidate.course)
        .bind(&candidate.cgpa)
        .bind(candidate.ats_score)
        .bind(&candidate.strengths)
        .bind(&candidate.weaknesses)
        .bind(&candidate.feedback)
        .bind(&candidate.detailed_feedback)
        .bind(&candidate.cv_url)
        .bind(candidate.recruiter_id)
        .bind(candidate.job_role_id)
        .bind(&candidate.job_role_title)
        .bind(candidate.status)
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>, StoreError> {
        Ok(
            sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_candidates_by_recruiter(
        &self,
        recruiter_id: Uuid,
    ) -> Result<Vec<Candidate>, StoreError> {
        Ok(sqlx::query_as::<_, Candidate>(
            "SELECT * FROM candidates WHERE recruiter_id = $1 ORDER BY created_at, id",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_candidates_for_job_roles(
        &self,
        job_role_ids: &[Uuid],
    ) -> Result<Vec<Candidate>, StoreError> {
        if job_role_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(sqlx::query_as::<_, Candidate>(
            "SELECT * FROM candidates WHERE job_role_id = ANY($1) ORDER BY created_at, id",
        )
        .bind(job_role_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_candidate_status(
        &self,
        id: Uuid,
        from: CandidateStatus,
        to: CandidateStatus,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE candidates SET status = $3 WHERE id = $1 AND status = $2")
                .bind(id)
                .bind(from)
                .bind(to)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_candidates_by_recruiter(
        &self,
        recruiter_ids: &[Uuid],
    ) -> Result<Vec<StatusCount>, StoreError> {
        if recruiter_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT recruiter_id, status, COUNT(*) AS count
            FROM candidates
            WHERE recruiter_id = ANY($1)
            GROUP BY recruiter_id, status
            "#,
        )
        .bind(recruiter_ids)
        .fetch_all(&self.pool)
        .await?)
    }
}
