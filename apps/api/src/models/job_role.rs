use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum JobRoleStatus {
    #[default]
    Active,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRole {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub employment_type: String,
    pub department: String,
    pub location: String,
    pub education: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub deadline: DateTime<Utc>,
    pub requirements: Option<String>,
    pub status: JobRoleStatus,
    pub applications_count: i32,
    pub shortlisted_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized counters on a job role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobRoleCounter {
    Applications,
    Shortlisted,
}

impl JobRoleCounter {
    pub fn column(&self) -> &'static str {
        match self {
            JobRoleCounter::Applications => "applications_count",
            JobRoleCounter::Shortlisted => "shortlisted_count",
        }
    }
}
