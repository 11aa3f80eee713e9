//! Fixtures and doubles shared by unit tests.

use std::collections::HashMap;
use std::future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::auth::token::TokenIssuer;
use crate::codegen::{generate_code, DEFAULT_CODE_LENGTH};
use crate::config::Config;
use crate::evaluation::{Assessment, CvEvaluator, EvaluationError, Verdict};
use crate::job_roles::fields::SkillsInput;
use crate::job_roles::service::{create_job_role, CreateJobRoleRequest};
use crate::models::company::Company;
use crate::models::job_role::JobRole;
use crate::models::user::{User, UserRole};
use crate::state::AppState;
use crate::storage::{ObjectStorage, StorageError};
use crate::store::memory::MemoryStore;
use crate::store::Store;

pub const TEST_SECRET: &str = "test-secret";

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(TEST_SECRET, Duration::minutes(60))
}

/// Free-standing user; not persisted anywhere.
pub fn user_with_role(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", role.as_str()),
        full_name: "Test User".to_string(),
        company_id: Uuid::new_v4(),
        company_code: "TESTCODE".to_string(),
        role,
        password_hash: String::new(),
        is_active: true,
        created_at: Utc::now(),
    }
}

pub async fn seed_company(store: &MemoryStore, website: &str) -> Company {
    let company = Company {
        id: Uuid::new_v4(),
        name: website.trim_start_matches("https://").to_string(),
        description: "Seeded tenant".to_string(),
        website: website.to_string(),
        code: generate_code(DEFAULT_CODE_LENGTH),
        created_at: Utc::now(),
    };
    store.insert_company(&company).await.unwrap();
    company
}

/// Persists a user directly, skipping password hashing.
pub async fn seed_user(store: &MemoryStore, company: &Company, role: UserRole, email: &str) -> User {
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        full_name: email.split('@').next().unwrap_or(email).to_string(),
        company_id: company.id,
        company_code: company.code.clone(),
        role,
        password_hash: String::new(),
        is_active: true,
        created_at: Utc::now(),
    };
    store.insert_user(&user).await.unwrap();
    user
}

pub fn job_role_request(title: &str) -> CreateJobRoleRequest {
    CreateJobRoleRequest {
        title: title.to_string(),
        description: format!("{title} wanted"),
        employment_type: "Full-time".to_string(),
        department: "Engineering".to_string(),
        location: "Berlin".to_string(),
        education: "B.Sc. Computer Science".to_string(),
        skills: SkillsInput::List(vec!["Rust".to_string(), "Docker".to_string()]),
        experience: "3+ years".to_string(),
        deadline: Utc.with_ymd_and_hms(2030, 1, 31, 0, 0, 0).unwrap(),
        requirements: None,
    }
}

pub async fn seed_job_role(store: &MemoryStore, manager: &User, title: &str) -> JobRole {
    create_job_role(store, manager, job_role_request(title))
        .await
        .unwrap()
}

pub fn assessment(name: &str, ats_score: i32) -> Assessment {
    Assessment {
        candidate_name: name.to_string(),
        degree: None,
        course: Some("Computer Science".to_string()),
        cgpa: Some("8.1".to_string()),
        ats_score,
        strengths: vec!["Rust".to_string(), "Docker".to_string()],
        weaknesses: vec!["No Kafka".to_string(), "Short tenure".to_string()],
        feedback: "Solid fit.".to_string(),
        detailed_feedback: "Meets every listed requirement.".to_string(),
    }
}

/// Object storage double that counts uploads.
#[derive(Default)]
pub struct RecordingStorage {
    puts: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingStorage {
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn put(&self, key: &str, _body: Bytes, _content_type: &str) -> Result<String, StorageError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(StorageError("bucket unavailable".to_string()));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(format!("http://minio.test/cvs/{key}"))
    }
}

enum Behaviour {
    Answer(Verdict),
    Fail(Box<dyn Fn() -> EvaluationError + Send + Sync>),
    Hang,
}

/// Evaluator double with a canned outcome.
pub struct StubEvaluator {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl StubEvaluator {
    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn verdict(verdict: Verdict) -> Self {
        Self::with(Behaviour::Answer(verdict))
    }

    pub fn error(make: impl Fn() -> EvaluationError + Send + Sync + 'static) -> Self {
        Self::with(Behaviour::Fail(Box::new(make)))
    }

    /// Never answers.
    pub fn hang() -> Self {
        Self::with(Behaviour::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CvEvaluator for StubEvaluator {
    async fn evaluate(&self, _cv_url: &str, _job_description: &str) -> Result<Verdict, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Answer(verdict) => Ok(verdict.clone()),
            Behaviour::Fail(make) => Err(make()),
            Behaviour::Hang => future::pending().await,
        }
    }
}

pub fn test_config() -> Config {
    let vars = HashMap::from([
        ("DATABASE_URL", "postgres://localhost/cvalign_test"),
        ("JWT_SECRET", TEST_SECRET),
        ("S3_BUCKET", "cvs"),
        ("S3_ENDPOINT", "http://minio.test"),
        ("AWS_ACCESS_KEY_ID", "test"),
        ("AWS_SECRET_ACCESS_KEY", "test"),
        ("AI_EVALUATOR_URL", "http://ai.test/evaluate"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

/// Router state over an in-memory store. The store handle is returned for seeding.
pub fn test_state(evaluator: StubEvaluator) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        storage: Arc::new(RecordingStorage::default()),
        evaluator: Arc::new(evaluator),
        tokens: token_issuer(),
        config: test_config(),
    };
    (state, store)
}
