use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

/// Which AI collaborator judges uploaded CVs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluatorBackend {
    /// Dedicated AI server taking multipart `{cv, jd}`.
    Remote { url: String },
    /// Hosted completion API fed with locally extracted CV text.
    Llm { api_key: String },
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_public_url: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub evaluator: EvaluatorBackend,
    pub ai_timeout: Duration,
    pub download_timeout: Duration,
    pub max_upload_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let s3_endpoint = env.require("S3_ENDPOINT")?;
        let evaluator = match env.or("EVALUATOR_BACKEND", "remote").as_str() {
            "remote" => EvaluatorBackend::Remote {
                url: env.require("AI_EVALUATOR_URL")?,
            },
            "llm" => EvaluatorBackend::Llm {
                api_key: env.require("ANTHROPIC_API_KEY")?,
            },
            other => bail!("EVALUATOR_BACKEND must be 'remote' or 'llm', got '{other}'"),
        };

        let cors_allowed_origins = match env.get("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Config {
            database_url: env.require("DATABASE_URL")?,
            jwt_secret: env.require("JWT_SECRET")?,
            token_ttl: chrono::Duration::minutes(env.parse_or("TOKEN_TTL_MINUTES", 60)?),
            s3_bucket: env.require("S3_BUCKET")?,
            s3_public_url: env.or("S3_PUBLIC_URL", &s3_endpoint),
            s3_endpoint,
            s3_region: env.or("S3_REGION", "us-east-1"),
            aws_access_key_id: env.require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: env.require("AWS_SECRET_ACCESS_KEY")?,
            evaluator,
            ai_timeout: Duration::from_secs(env.parse_or("AI_TIMEOUT_SECS", 60)?),
            download_timeout: Duration::from_secs(env.parse_or("DOWNLOAD_TIMEOUT_SECS", 30)?),
            max_upload_bytes: env.parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            cors_allowed_origins,
            port: env.parse_or("PORT", 8080)?,
            rust_log: env.or("RUST_LOG", "info"),
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
            None => Ok(default),
        }
    }
}
