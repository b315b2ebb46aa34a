use std::sync::Arc;

use crate::builder::store::SessionStore;
use crate::parsing::parser::ResumeParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Résumé parser. Wraps the completion provider when a credential is set.
    pub parser: Arc<ResumeParser>,
    pub sessions: SessionStore,
}
