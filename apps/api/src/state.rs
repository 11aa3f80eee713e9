use std::sync::Arc;

use crate::auth::token::TokenIssuer;
use crate::config::Config;
use crate::evaluation::CvEvaluator;
use crate::storage::ObjectStorage;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub storage: Arc<dyn ObjectStorage>,
    /// Remote AI server or hosted completion API, chosen by EVALUATOR_BACKEND.
    pub evaluator: Arc<dyn CvEvaluator>,
    pub tokens: TokenIssuer,
    pub config: Config,
}
