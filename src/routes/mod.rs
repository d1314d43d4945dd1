use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{audit::AuditQueue, store::ReadingStore};

mod health;
mod readings;
mod recommendations;

// ---

/// Shared per-request state: the injected store and the audit queue sender.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub audit: AuditQueue,
}

pub fn router(store: Arc<dyn ReadingStore>, audit: AuditQueue) -> Router {
    // ---
    Router::new()
        .merge(recommendations::router())
        .merge(readings::router())
        .merge(health::router())
        .with_state(AppState { store, audit })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
