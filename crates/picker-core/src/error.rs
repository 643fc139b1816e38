//! # Picker Error Types
//!
//! Typed error handling for the plan picker.
//! All picker operations return `Result<T, PickerError>`.

use thiserror::Error;

/// Core error type for all picker operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    /// Configuration errors (missing inputs, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Another instance already uses this key
    #[error("Key needs to be unique, key '{key}' is already registered")]
    DuplicateKey { key: String },

    /// Discount format is neither `percent` nor `absolute`
    #[error("Invalid discount format: '{value}'")]
    InvalidDiscountFormat { value: String },

    /// Product JSON is structurally unusable
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// An id from the host could not be parsed into its typed form
    #[error("Invalid {kind} id '{value}'")]
    InvalidId { kind: &'static str, value: String },

    /// Variant not found in catalog
    #[error("Variant with id '{variant_id}' not found")]
    VariantNotFound { variant_id: u64 },

    /// Selling plan group not found in catalog
    #[error("Selling plan group with id '{group_id}' not found")]
    GroupNotFound { group_id: String },

    /// Selling plan not found in its group
    #[error("Selling plan with id {plan_id} not found")]
    PlanNotFound { plan_id: u64 },

    /// Group exists but is not offered for the current variant
    #[error("Selling plan group '{group_id}' is not available for the current variant")]
    GroupUnavailable { group_id: String },

    /// The variant carries no allocation for the selling plan
    #[error("Variant '{variant_id}' has no allocation for selling plan {plan_id}")]
    AllocationNotFound { variant_id: u64, plan_id: u64 },

    /// No way to learn the current variant
    #[error("Failed to get variant id: {0}")]
    VariantSource(String),

    /// Page URL could not be parsed
    #[error("Invalid page URL '{0}'")]
    InvalidUrl(String),

    /// No instance registered under this key
    #[error("No plan picker registered with key '{key}'")]
    UnknownKey { key: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// How an error is surfaced to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTier {
    /// Construction must abort
    Configuration,
    /// The failing operation is abandoned, the widget survives
    Lookup,
    /// The widget keeps running in a degraded mode
    Structural,
}

impl PickerError {
    /// Returns the tier this error belongs to
    pub fn tier(&self) -> ErrorTier {
        match self {
            PickerError::Configuration(_)
            | PickerError::DuplicateKey { .. }
            | PickerError::InvalidDiscountFormat { .. }
            | PickerError::InvalidCatalog(_)
            | PickerError::Serialization(_) => ErrorTier::Configuration,
            PickerError::InvalidId { .. }
            | PickerError::VariantNotFound { .. }
            | PickerError::GroupNotFound { .. }
            | PickerError::PlanNotFound { .. }
            | PickerError::AllocationNotFound { .. }
            | PickerError::GroupUnavailable { .. }
            | PickerError::InvalidUrl(_)
            | PickerError::UnknownKey { .. } => ErrorTier::Lookup,
            PickerError::VariantSource(_) => ErrorTier::Structural,
        }
    }

    /// Returns true if construction has to abort on this error
    pub fn is_configuration(&self) -> bool {
        self.tier() == ErrorTier::Configuration
    }

    /// Returns true for "id was well-formed but nothing matched"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PickerError::VariantNotFound { .. }
                | PickerError::GroupNotFound { .. }
                | PickerError::PlanNotFound { .. }
                | PickerError::AllocationNotFound { .. }
                | PickerError::UnknownKey { .. }
        )
    }
}

impl From<serde_json::Error> for PickerError {
    fn from(err: serde_json::Error) -> Self {
        PickerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PickerError {
    fn from(err: toml::de::Error) -> Self {
        PickerError::Configuration(err.to_string())
    }
}

/// Result type alias for picker operations
pub type PickerResult<T> = Result<T, PickerError>;
