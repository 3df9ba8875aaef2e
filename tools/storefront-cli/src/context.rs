//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use storefront_api::{AdminSession, ApiClient};
use storefront_cache::FileStore;
use storefront_commerce::cart::CartStore;

use crate::config::CliConfig;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration, environment overrides applied.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit or discovered config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(resolve(&cwd, path)),
            None => CliConfig::discover(&cwd),
        };
        let config = match &config_path {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        let config = config.with_env(|key| std::env::var(key).ok());

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Directory relative storage paths are resolved against: the config
    /// file's directory, or the working directory without one.
    pub fn base_dir(&self) -> &Path {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(&self.cwd)
    }

    /// Open the slot store.
    pub fn store(&self) -> Result<Arc<FileStore>> {
        let dir = self.config.storage_dir(self.base_dir());
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open storage directory: {}", dir.display()))?;
        Ok(Arc::new(store))
    }

    /// Backend client.
    pub fn api(&self) -> Result<ApiClient> {
        let api = &self.config.api;
        let client = ApiClient::new(
            &api.base_url,
            Duration::from_millis(api.timeout_ms),
            api.max_retries,
        )
        .context("Failed to create HTTP client")?;
        Ok(client.with_currency(self.config.currency()?))
    }

    /// The persisted cart.
    pub fn cart(&self) -> Result<Arc<CartStore<Arc<FileStore>>>> {
        Ok(Arc::new(CartStore::new(
            self.store()?,
            self.config.storage.cart_slot.clone(),
            self.config.currency()?,
        )))
    }

    /// Admin session over the token slot.
    pub fn admin(&self) -> Result<AdminSession<Arc<FileStore>>> {
        Ok(AdminSession::new(
            self.api()?,
            self.store()?,
            self.config.storage.token_slot.clone(),
        ))
    }
}

fn resolve(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
