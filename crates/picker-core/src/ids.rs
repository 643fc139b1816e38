//! # Typed Identifiers
//!
//! Ids arriving from the host page (form values, URL parameters, JS numbers)
//! are parsed here once. Everything past this boundary works with typed ids.

use crate::error::{PickerError, PickerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse a non-negative integral id from a host value
fn parse_numeric(kind: &'static str, raw: &str) -> PickerResult<u64> {
    raw.trim().parse::<u64>().map_err(|_| PickerError::InvalidId {
        kind,
        value: raw.to_string(),
    })
}

/// Accept a JS number only if it is a whole, non-negative, finite value
fn numeric_from_f64(kind: &'static str, raw: f64) -> PickerResult<u64> {
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 && raw <= u64::MAX as f64 {
        Ok(raw as u64)
    } else {
        Err(PickerError::InvalidId {
            kind,
            value: raw.to_string(),
        })
    }
}

/// Product variant id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub u64);

impl VariantId {
    pub fn parse(raw: &str) -> PickerResult<Self> {
        parse_numeric("variant", raw).map(Self)
    }

    pub fn from_f64(raw: f64) -> PickerResult<Self> {
        numeric_from_f64("variant", raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Selling plan id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellingPlanId(pub u64);

impl SellingPlanId {
    pub fn parse(raw: &str) -> PickerResult<Self> {
        parse_numeric("selling plan", raw).map(Self)
    }

    pub fn from_f64(raw: f64) -> PickerResult<Self> {
        numeric_from_f64("selling plan", raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Selling plan group id (Shopify uses opaque string ids for groups)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellingPlanGroupId(String);

impl SellingPlanGroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn parse(raw: &str) -> PickerResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PickerError::InvalidId {
                kind: "selling plan group",
                value: raw.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SellingPlanGroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl FromStr for VariantId {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for SellingPlanId {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for SellingPlanGroupId {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SellingPlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SellingPlanGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_values() {
        assert_eq!(VariantId::parse("39772").unwrap(), VariantId(39772));
        assert_eq!(VariantId::parse(" 12 ").unwrap(), VariantId(12));
        assert_eq!(SellingPlanId::parse("690").unwrap(), SellingPlanId(690));

        let err = VariantId::parse("12abc").unwrap_err();
        assert!(matches!(err, PickerError::InvalidId { kind: "variant", .. }));
        assert!(SellingPlanId::parse("").is_err());
        assert!(SellingPlanGroupId::parse("   ").is_err());
    }

    #[test]
    fn test_from_js_number() {
        assert_eq!(VariantId::from_f64(11.0).unwrap(), VariantId(11));
        assert!(VariantId::from_f64(11.5).is_err());
        assert!(VariantId::from_f64(-1.0).is_err());
        assert!(SellingPlanId::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_json_shape() {
        let id: VariantId = serde_json::from_str("123").unwrap();
        assert_eq!(id, VariantId(123));
        let group: SellingPlanGroupId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(group.as_str(), "abc");
        assert!(serde_json::from_str::<VariantId>("\"123\"").is_err());
    }
}
