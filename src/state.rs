//! Application State
//!
//! Everything a command needs: the config service, the shared key-value
//! store, and the tool catalog. Built once at startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use writedeck_core::KeyValueStore;
use writedeck_llm::{build_http_client, HttpBackend, StreamConsumer};
use writedeck_tools::{ToolCatalog, ToolDefinition};

use crate::models::settings::AppConfig;
use crate::services::history::HistoryStore;
use crate::services::session::ToolSession;
use crate::storage::{ApiKeyStore, ConfigService, FileStore};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{ensure_writedeck_dir, store_dir_in};

/// Application state shared by the CLI commands
pub struct AppState {
    data_dir: PathBuf,
    /// Configuration service for app settings
    config: ConfigService,
    /// Key-value store holding histories and the API key
    store: Arc<dyn KeyValueStore>,
    catalog: ToolCatalog,
}

impl AppState {
    /// Initialize all services under `data_dir`
    pub fn initialize(data_dir: &Path) -> AppResult<Self> {
        let config = ConfigService::open(data_dir)?;
        let store = FileStore::open(store_dir_in(data_dir))?;
        tracing::debug!(dir = %data_dir.display(), "state initialized");

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config,
            store: Arc::new(store),
            catalog: ToolCatalog::builtin(),
        })
    }

    /// Initialize under `$WRITEDECK_HOME` or `~/.writedeck/`
    pub fn from_env() -> AppResult<Self> {
        let dir = ensure_writedeck_dir()?;
        Self::initialize(&dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &AppConfig {
        self.config.get_config()
    }

    pub fn config_service_mut(&mut self) -> &mut ConfigService {
        &mut self.config
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub fn api_keys(&self) -> ApiKeyStore {
        ApiKeyStore::new(self.store())
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn tool(&self, id: &str) -> AppResult<&ToolDefinition> {
        Ok(self.catalog.get(id)?)
    }

    /// History of a catalog tool
    pub fn history(&self, tool_id: &str) -> AppResult<HistoryStore> {
        let tool = self.tool(tool_id)?;
        Ok(HistoryStore::for_tool(self.store(), &tool.id))
    }

    /// Stream consumer posting to the configured base URL
    pub fn consumer(&self) -> AppResult<StreamConsumer> {
        let config = self.config();
        let proxy = config.proxy_config().map_err(AppError::config)?;
        let client = build_http_client(
            proxy.as_ref(),
            Duration::from_secs(config.connect_timeout_secs),
        )?;
        let backend = HttpBackend::new(client, &config.base_url)?;
        Ok(StreamConsumer::new(Arc::new(backend)))
    }

    /// Open a session for `tool_id`, restoring its latest run. Model-aware
    /// tools fall back to the configured default model.
    pub fn open_session(
        &self,
        tool_id: &str,
        consumer: StreamConsumer,
        model: Option<String>,
    ) -> AppResult<ToolSession> {
        let tool = self.tool(tool_id)?.clone();
        let model = if tool.model_aware {
            model.or_else(|| Some(self.config().default_model.clone()))
        } else {
            None
        };
        let history = HistoryStore::for_tool(self.store(), &tool.id);
        Ok(ToolSession::open(tool, history, self.api_keys(), consumer)?.with_model(model))
    }
}
