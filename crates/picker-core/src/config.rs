//! # Picker Configuration
//!
//! Per-instance settings. Themes render them as attributes on the picker
//! element; headless hosts load them from TOML:
//!
//! ```toml
//! key = "main"
//! discount_format = "percent"
//! currency = "EUR"
//! main_product = true
//! ```

use crate::discount::DiscountFormat;
use crate::error::{PickerError, PickerResult};
use serde::{Deserialize, Serialize};

/// Configuration for one plan picker instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerConfig {
    /// Unique instance key
    pub key: String,

    /// Discount badge style
    #[serde(deserialize_with = "deserialize_discount_format")]
    pub discount_format: DiscountFormat,

    /// Shop's active currency (ISO 4217); USD when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Picker belongs to the page's main product (enables URL sync)
    #[serde(default)]
    pub main_product: bool,
}

fn deserialize_discount_format<'de, D>(deserializer: D) -> Result<DiscountFormat, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl PickerConfig {
    pub fn new(key: impl Into<String>, discount_format: DiscountFormat) -> Self {
        Self {
            key: key.into(),
            discount_format,
            currency: None,
            main_product: false,
        }
    }

    /// Build from raw attribute values, validating the discount format
    pub fn from_attributes(key: &str, discount_format: &str) -> PickerResult<Self> {
        let config = Self::new(key, discount_format.parse()?);
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML document
    pub fn from_toml(toml_str: &str) -> PickerResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: set the active currency
    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    /// Builder: flag as the page's main product
    pub fn as_main_product(mut self) -> Self {
        self.main_product = true;
        self
    }

    pub fn validate(&self) -> PickerResult<()> {
        if self.key.trim().is_empty() {
            return Err(PickerError::Configuration(
                "Plan picker key is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml() {
        let config = PickerConfig::from_toml(
            r#"
            key = "main"
            discount_format = "absolute"
            currency = "EUR"
            main_product = true
            "#,
        )
        .unwrap();

        assert_eq!(config.key, "main");
        assert_eq!(config.discount_format, DiscountFormat::Absolute);
        assert_eq!(config.currency.as_deref(), Some("EUR"));
        assert!(config.main_product);
    }

    #[test]
    fn test_defaults() {
        let config = PickerConfig::from_toml("key = \"quick-add\"\ndiscount_format = \"percent\"").unwrap();
        assert_eq!(config.currency, None);
        assert!(!config.main_product);
    }

    #[test]
    fn test_invalid_discount_format() {
        let err = PickerConfig::from_toml("key = \"main\"\ndiscount_format = \"both\"").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Invalid discount format"));

        assert!(matches!(
            PickerConfig::from_attributes("main", ""),
            Err(PickerError::InvalidDiscountFormat { .. })
        ));
    }

    #[test]
    fn test_key_required() {
        assert!(PickerConfig::from_attributes("  ", "percent").is_err());
        assert!(PickerConfig::from_toml("discount_format = \"percent\"").is_err());
    }
}
