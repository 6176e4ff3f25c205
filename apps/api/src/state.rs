use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::previews::PreviewStore;
use crate::store::UserStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// User documents and sessions. `PgUserStore` in production.
    pub store: Arc<dyn UserStore>,
    /// File-backed cache of rendered preview images.
    pub previews: PreviewStore,
    pub llm: LlmClient,
    pub config: Config,
}
