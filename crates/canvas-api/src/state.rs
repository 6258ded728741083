//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. Services are generic over the store/transport ports, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use canvas_core::store::block::BlockStore;
use canvas_core::store::project::ProjectStore;
use canvas_core::webhook::WebhookService;
use canvas_infra::config::{load_config, resolve_data_dir};
use canvas_infra::http::transport::HttpWebhookTransport;
use canvas_infra::sqlite::pool::DatabasePool;
use canvas_infra::sqlite::state::SqliteStateStore;
use canvas_types::config::CanvasConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteProjectStore = ProjectStore<SqliteStateStore>;
pub type ConcreteBlockStore = BlockStore<SqliteStateStore>;
pub type ConcreteWebhookService = WebhookService<HttpWebhookTransport>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: CanvasConfig,
    pub project_store: Arc<ConcreteProjectStore>,
    pub block_store: Arc<ConcreteBlockStore>,
    pub webhook: ConcreteWebhookService,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: connect to the DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("canvas.db").display()
        );
        let pool = DatabasePool::new(&db_url).await?;

        let project_store =
            Arc::new(ProjectStore::load(SqliteStateStore::new(pool.clone())).await?);
        let block_store = Arc::new(BlockStore::load(SqliteStateStore::new(pool.clone())).await?);

        let webhook = WebhookService::with_default_timeout(
            HttpWebhookTransport::new(),
            Duration::from_millis(config.webhook.default_timeout_ms),
        );

        Ok(Self {
            config,
            project_store,
            block_store,
            webhook,
            data_dir,
        })
    }
}
