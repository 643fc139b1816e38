//! # Discount Calculator
//!
//! Turns a selling plan's first price adjustment into the discount badge
//! shown next to each subscription option.
//!
//! | kind | percent | absolute |
//! |------|---------|----------|
//! | percentage | `value` | `round(price * value / 100)` |
//! | fixed_amount | `round(value / price * 100)` | `value` |
//! | price | `round((price - value) / price * 100)` | `price - value` |
//!
//! Rounding is half away from zero. A zero variant price yields 0%.

use crate::catalog::{AdjustmentKind, PriceAdjustment};
use crate::error::PickerError;
use crate::money::MoneyFormatter;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the discount badge is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountFormat {
    /// "15%"
    Percent,
    /// "$3.00"
    Absolute,
}

impl DiscountFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountFormat::Percent => "percent",
            DiscountFormat::Absolute => "absolute",
        }
    }
}

impl FromStr for DiscountFormat {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percent" => Ok(DiscountFormat::Percent),
            "absolute" => Ok(DiscountFormat::Absolute),
            other => Err(PickerError::InvalidDiscountFormat {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for DiscountFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discount of one selling plan relative to the variant price
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Discount {
    /// Whole percent off
    pub percent: i64,
    /// Amount off in minor units
    pub absolute: i64,
    /// Badge text, empty when there is no discount
    pub text: String,
}

impl Discount {
    /// Compute the discount amounts for a variant price and adjustment
    pub fn amounts(variant_price: i64, adjustment: &PriceAdjustment) -> (i64, i64) {
        let price = variant_price as f64;
        let value = adjustment.value;
        let share_of_price = |off: f64| {
            if variant_price == 0 {
                0
            } else {
                (off / price * 100.0).round() as i64
            }
        };

        match adjustment.kind {
            AdjustmentKind::Percentage => {
                (value.round() as i64, (price * value / 100.0).round() as i64)
            }
            AdjustmentKind::FixedAmount => (share_of_price(value), value.round() as i64),
            AdjustmentKind::Price => (
                share_of_price(price - value),
                variant_price - value.round() as i64,
            ),
        }
    }

    /// Compute the discount and its badge text
    pub fn calculate(
        variant_price: i64,
        adjustment: &PriceAdjustment,
        format: DiscountFormat,
        money: &MoneyFormatter,
    ) -> Self {
        let (percent, absolute) = Self::amounts(variant_price, adjustment);
        let text = if percent == 0 {
            String::new()
        } else {
            match format {
                DiscountFormat::Percent => format!("{percent}%"),
                DiscountFormat::Absolute => money.format(absolute),
            }
        };
        Self {
            percent,
            absolute,
            text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> MoneyFormatter {
        MoneyFormatter::default()
    }

    #[test]
    fn test_percentage() {
        let adjustment = PriceAdjustment::percentage(15.0);

        let percent = Discount::calculate(2000, &adjustment, DiscountFormat::Percent, &usd());
        assert_eq!(percent.percent, 15);
        assert_eq!(percent.absolute, 300);
        assert_eq!(percent.text, "15%");

        let absolute = Discount::calculate(2000, &adjustment, DiscountFormat::Absolute, &usd());
        assert_eq!(absolute.text, "$3.00");
    }

    #[test]
    fn test_fixed_amount() {
        let discount = Discount::calculate(
            1999,
            &PriceAdjustment::fixed_amount(500),
            DiscountFormat::Percent,
            &usd(),
        );
        assert_eq!(discount.absolute, 500);
        assert_eq!(discount.percent, 25);
        assert_eq!(discount.text, "25%");
    }

    #[test]
    fn test_target_price() {
        let (percent, absolute) = Discount::amounts(2000, &PriceAdjustment::price(1500));
        assert_eq!(percent, 25);
        assert_eq!(absolute, 500);

        // Target above list price is a surcharge
        let (percent, absolute) = Discount::amounts(2000, &PriceAdjustment::price(2100));
        assert_eq!(percent, -5);
        assert_eq!(absolute, -100);
    }

    #[test]
    fn test_zero_price_is_zero_percent() {
        for adjustment in [PriceAdjustment::fixed_amount(500), PriceAdjustment::price(0)] {
            let discount = Discount::calculate(0, &adjustment, DiscountFormat::Percent, &usd());
            assert_eq!(discount.percent, 0);
            assert!(discount.is_empty());
        }
    }

    #[test]
    fn test_no_discount_has_empty_text() {
        let discount = Discount::calculate(
            2000,
            &PriceAdjustment::percentage(0.0),
            DiscountFormat::Absolute,
            &usd(),
        );
        assert_eq!(discount.text, "");
    }

    #[test]
    fn test_discount_format_parse() {
        assert_eq!("percent".parse::<DiscountFormat>().unwrap(), DiscountFormat::Percent);
        assert_eq!("absolute".parse::<DiscountFormat>().unwrap(), DiscountFormat::Absolute);
        assert!(matches!(
            "Percent".parse::<DiscountFormat>(),
            Err(PickerError::InvalidDiscountFormat { .. })
        ));
    }
}
