use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant. `website` and `code` are each unique across all companies,
/// and `code` never changes once issued.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub website: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}
