//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storefront_commerce::Currency;

/// File names searched for, in order, in each directory walking up.
pub const CONFIG_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "STOREFRONT_API_URL";

/// Overrides `store.payment_key`.
pub const ENV_PAYMENT_KEY: &str = "STOREFRONT_PAYMENT_KEY";

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Backend connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Client-local persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Storefront identity.
    #[serde(default)]
    pub store: StoreConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Find the nearest config file at or above `start`.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start.ancestors().find_map(|dir| {
            CONFIG_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|path| path.is_file())
        })
    }

    /// Apply environment overrides.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(key) = lookup(ENV_PAYMENT_KEY).filter(|v| !v.trim().is_empty()) {
            self.store.payment_key = Some(key);
        }
        self
    }

    /// Parsed store currency.
    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.store.currency)
            .with_context(|| format!("Invalid store.currency: {}", self.store.currency))
    }

    /// Storage directory, relative paths resolved against `base`.
    pub fn storage_dir(&self, base: &Path) -> PathBuf {
        if self.storage.dir.is_absolute() {
            self.storage.dir.clone()
        } else {
            base.join(&self.storage.dir)
        }
    }

    /// Check the configuration, returning `(errors, warnings)`.
    pub fn check(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let url = self.api.base_url.trim();
        if url.is_empty() {
            errors.push("api.base_url is required".to_string());
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(format!("api.base_url must be an http(s) URL: {url}"));
        }
        if self.api.timeout_ms == 0 {
            errors.push("api.timeout_ms must be greater than 0".to_string());
        }
        if self.api.max_retries > 10 {
            warnings.push(format!(
                "api.max_retries = {} is unusually high",
                self.api.max_retries
            ));
        }

        for (key, name) in [
            ("storage.cart_slot", &self.storage.cart_slot),
            ("storage.token_slot", &self.storage.token_slot),
        ] {
            if let Err(e) = storefront_cache::validate_key(name) {
                errors.push(format!("{key}: {e}"));
            }
        }
        if self.storage.cart_slot == self.storage.token_slot {
            errors.push("storage.cart_slot and storage.token_slot must differ".to_string());
        }

        if Currency::from_code(&self.store.currency).is_err() {
            errors.push(format!("store.currency '{}' is not supported", self.store.currency));
        }
        if self.store.payment_key.is_none() {
            warnings.push(format!(
                "store.payment_key is not set; checkout cannot open the payment widget (or set {ENV_PAYMENT_KEY})"
            ));
        }

        (errors, warnings)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// API root, e.g. `http://localhost:8000/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries for idempotent reads.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_max_retries() -> u32 {
    2
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Client-local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory holding one file per slot.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_cart_slot")]
    pub cart_slot: String,

    #[serde(default = "default_token_slot")]
    pub token_slot: String,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".storefront")
}

fn default_cart_slot() -> String {
    "cart".to_string()
}

fn default_token_slot() -> String {
    "admin_token".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            cart_slot: default_cart_slot(),
            token_slot: default_token_slot(),
        }
    }
}

/// Storefront identity shown in the payment widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// ISO code of the currency backend amounts are in.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Public payment widget key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_key: Option<String>,
}

fn default_store_name() -> String {
    "Everything Store".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            currency: default_currency(),
            payment_key: None,
        }
    }
}

/// Generate a default storefront.toml config file.
pub fn generate_default_config(base_url: &str) -> String {
    format!(
        r#"# Storefront client configuration

[api]
base_url = "{base_url}"
timeout_ms = 15000
max_retries = 2

[storage]
dir = ".storefront"
cart_slot = "cart"
token_slot = "admin_token"

[store]
name = "Everything Store"
currency = "INR"
# payment_key = "rzp_test_..."
"#
    )
}
