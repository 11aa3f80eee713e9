mod auth;
mod candidates;
mod codegen;
mod companies;
mod config;
mod db;
mod errors;
mod evaluation;
mod extract;
mod job_roles;
mod llm_client;
mod models;
mod policy;
mod routes;
mod state;
mod storage;
mod store;
#[cfg(test)]
mod testing;
mod users;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::token::TokenIssuer;
use crate::config::{Config, EvaluatorBackend};
use crate::db::create_pool;
use crate::evaluation::llm::LlmEvaluator;
use crate::evaluation::remote::RemoteEvaluator;
use crate::evaluation::CvEvaluator;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::s3::S3Storage;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvalign API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let pool = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let storage = S3Storage::from_config(&config).await;
    info!("Object storage initialized (bucket: {})", config.s3_bucket);

    let evaluator = build_evaluator(&config)?;

    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        storage: Arc::new(storage),
        evaluator,
        tokens: TokenIssuer::new(&config.jwt_secret, config.token_ttl),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_allowed_origins)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_evaluator(config: &Config) -> Result<Arc<dyn CvEvaluator>> {
    let evaluator: Arc<dyn CvEvaluator> = match &config.evaluator {
        EvaluatorBackend::Remote { url } => {
            info!("CV evaluator: remote AI server at {url}");
            Arc::new(RemoteEvaluator::new(
                url.clone(),
                config.download_timeout,
                config.ai_timeout,
            )?)
        }
        EvaluatorBackend::Llm { api_key } => {
            let llm = LlmClient::new(api_key.clone(), config.ai_timeout)?;
            info!("CV evaluator: hosted completion API (model: {})", llm_client::MODEL);
            Arc::new(LlmEvaluator::new(llm, config.download_timeout)?)
        }
    };
    Ok(evaluator)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}
