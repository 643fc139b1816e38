//! # CLI Configuration
//!
//! File locations and options for a replay run, read from the environment
//! (with `.env` support).

use picker_core::{Catalog, DiscountFormat, PickerConfig};
use std::path::PathBuf;

const DEFAULT_PRODUCT_PATH: &str = "config/product.json";

/// Replay configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Product JSON file
    pub product_path: PathBuf,
    /// Picker TOML file
    pub picker_config_path: Option<PathBuf>,
    /// Command script, stdin when unset
    pub script_path: Option<PathBuf>,
    /// Page URL the picker runs on
    pub page_url: Option<String>,
    /// Initial value of the product form's variant field
    pub variant_id: Option<String>,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl CliConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            product_path: non_empty("PICKER_PRODUCT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PRODUCT_PATH)),
            picker_config_path: non_empty("PICKER_CONFIG").map(PathBuf::from),
            script_path: non_empty("PICKER_SCRIPT").map(PathBuf::from),
            page_url: non_empty("PICKER_PAGE_URL"),
            variant_id: non_empty("PICKER_VARIANT"),
            log_json: non_empty("LOG_FORMAT").is_some_and(|format| format.eq_ignore_ascii_case("json")),
        }
    }

    /// Read and validate the product catalog
    pub fn load_catalog(&self) -> anyhow::Result<Catalog> {
        let json = std::fs::read_to_string(&self.product_path).map_err(|e| {
            anyhow::anyhow!("Failed to read {}: {}", self.product_path.display(), e)
        })?;
        let catalog = Catalog::from_json(&json)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", self.product_path.display(), e))?;
        tracing::info!(
            "Loaded product '{}' with {} variants from {}",
            catalog.handle(),
            catalog.variants().count(),
            self.product_path.display()
        );
        Ok(catalog)
    }

    /// Read the picker config, or fall back to key `main` with percent badges
    pub fn load_picker_config(&self) -> anyhow::Result<PickerConfig> {
        let Some(path) = &self.picker_config_path else {
            tracing::info!("No picker config given, using key 'main' with percent badges");
            return Ok(PickerConfig::new("main", DiscountFormat::Percent));
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        PickerConfig::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
