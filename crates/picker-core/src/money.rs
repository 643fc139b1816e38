//! # Money Formatting
//!
//! Currency handling for price and discount displays.
//! Amounts are integer minor units (cents); output follows en-US conventions.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    NZD,
    CHF,
    MXN,
    SEK,
    DKK,
    NOK,
    INR,
    KRW,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::NZD => "NZD",
            Currency::CHF => "CHF",
            Currency::MXN => "MXN",
            Currency::SEK => "SEK",
            Currency::DKK => "DKK",
            Currency::NOK => "NOK",
            Currency::INR => "INR",
            Currency::KRW => "KRW",
        }
    }

    /// Look up a currency by ISO code (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        let currency = match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Currency::USD,
            "EUR" => Currency::EUR,
            "GBP" => Currency::GBP,
            "JPY" => Currency::JPY,
            "CAD" => Currency::CAD,
            "AUD" => Currency::AUD,
            "NZD" => Currency::NZD,
            "CHF" => Currency::CHF,
            "MXN" => Currency::MXN,
            "SEK" => Currency::SEK,
            "DKK" => Currency::DKK,
            "NOK" => Currency::NOK,
            "INR" => Currency::INR,
            "KRW" => Currency::KRW,
            _ => return None,
        };
        Some(currency)
    }

    /// Returns the number of decimal places shown for this currency
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY | Currency::KRW => 0,
            _ => 2,
        }
    }

    /// en-US display symbol; `None` means the ISO code is shown instead
    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Currency::USD => Some("$"),
            Currency::EUR => Some("€"),
            Currency::GBP => Some("£"),
            Currency::JPY => Some("¥"),
            Currency::CAD => Some("CA$"),
            Currency::AUD => Some("A$"),
            Currency::NZD => Some("NZ$"),
            Currency::MXN => Some("MX$"),
            Currency::INR => Some("₹"),
            Currency::KRW => Some("₩"),
            Currency::CHF | Currency::SEK | Currency::DKK | Currency::NOK => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats minor-unit amounts in the shop's active currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoneyFormatter {
    currency: Currency,
}

impl MoneyFormatter {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    /// Build from the shop's active currency code, falling back to USD
    pub fn for_code(code: Option<&str>) -> Self {
        match code {
            Some(code) if !code.trim().is_empty() => match Currency::from_code(code) {
                Some(currency) => Self::new(currency),
                None => {
                    warn!(code, "Unsupported currency, formatting prices as USD");
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Format an amount given in minor units (e.g. 1999 -> "$19.99")
    pub fn format(&self, minor_units: i64) -> String {
        let sign = if minor_units < 0 { "-" } else { "" };
        let abs = minor_units.unsigned_abs();

        let number = if self.currency.decimal_places() == 0 {
            // Round half away from zero to whole units
            group_thousands((abs + 50) / 100)
        } else {
            format!("{}.{:02}", group_thousands(abs / 100), abs % 100)
        };

        match self.currency.symbol() {
            Some(symbol) => format!("{sign}{symbol}{number}"),
            None => format!("{sign}{}\u{a0}{number}", self.currency.as_str()),
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        let money = MoneyFormatter::default();
        assert_eq!(money.format(300), "$3.00");
        assert_eq!(money.format(1999), "$19.99");
        assert_eq!(money.format(5), "$0.05");
        assert_eq!(money.format(123_456_789), "$1,234,567.89");
        assert_eq!(money.format(-250), "-$2.50");
    }

    #[test]
    fn test_format_other_currencies() {
        assert_eq!(MoneyFormatter::new(Currency::EUR).format(1999), "€19.99");
        assert_eq!(MoneyFormatter::new(Currency::JPY).format(100_050), "¥1,001");
        assert_eq!(MoneyFormatter::new(Currency::CHF).format(300), "CHF\u{a0}3.00");
    }

    #[test]
    fn test_currency_fallback() {
        assert_eq!(MoneyFormatter::for_code(None).currency(), Currency::USD);
        assert_eq!(MoneyFormatter::for_code(Some("")).currency(), Currency::USD);
        assert_eq!(MoneyFormatter::for_code(Some("xyz")).currency(), Currency::USD);
        assert_eq!(MoneyFormatter::for_code(Some("gbp")).currency(), Currency::GBP);
    }
}
