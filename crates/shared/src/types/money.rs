//! Currency rounding, zero tolerance and display formatting.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal`; report values are rounded to
//! 2 decimal places at every accumulation step with Banker's Rounding.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Decimal places kept on every report amount.
pub const REPORT_DECIMAL_PLACES: u32 = 2;

/// Rounds a report amount to 2 decimal places using Banker's Rounding.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(REPORT_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

/// Formats an amount with thousands separators and 2 decimals, e.g. `1,234.50`.
#[must_use]
pub fn format_amount(value: Decimal) -> String {
    let rounded = round2(value);
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

/// Where the currency symbol goes relative to the amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    /// `$ 1,234.50`
    #[default]
    Before,
    /// `1,234.50 $`
    After,
}

/// A currency as stored with the company data: ISO 4217 code, display
/// symbol and position, and rounding unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code, e.g. `USD`.
    pub code: String,
    /// Display symbol, e.g. `$`.
    pub symbol: String,
    /// Symbol position.
    pub position: SymbolPosition,
    /// Smallest representable unit; amounts below half of it are zero.
    pub rounding: Decimal,
}

impl Currency {
    /// Creates a currency. The code is uppercased; a non-positive rounding
    /// unit is replaced by `0.01`.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        symbol: impl Into<String>,
        position: SymbolPosition,
        rounding: Decimal,
    ) -> Self {
        let rounding = if rounding > Decimal::ZERO {
            rounding
        } else {
            Decimal::new(1, REPORT_DECIMAL_PLACES)
        };
        Self {
            code: code.into().trim().to_uppercase(),
            symbol: symbol.into(),
            position,
            rounding,
        }
    }

    /// US Dollar, the default currency.
    #[must_use]
    pub fn usd() -> Self {
        Self::new("USD", "$", SymbolPosition::Before, Decimal::new(1, 2))
    }

    /// Returns true if `amount` rounds to zero in this currency.
    ///
    /// An amount is zero when `|amount| / rounding` rounds (half away from
    /// zero) to 0, so `0.004` is zero in USD while `0.005` is not.
    #[must_use]
    pub fn is_zero(&self, amount: Decimal) -> bool {
        if self.rounding <= Decimal::ZERO {
            return round2(amount).is_zero();
        }
        (amount / self.rounding)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .is_zero()
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

/// Company currency display settings carried on report payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyFormat {
    /// ISO 4217 code of the company currency.
    pub currency: String,
    /// Symbol printed next to amounts.
    pub symbol: String,
    /// Symbol position.
    pub position: SymbolPosition,
}

impl MoneyFormat {
    /// Creates the format of a currency.
    #[must_use]
    pub fn new(currency: &Currency) -> Self {
        Self {
            currency: currency.code.clone(),
            symbol: currency.symbol.clone(),
            position: currency.position,
        }
    }

    /// Formats an amount, e.g. `$ 1,234.50` or `1,234.50 $`.
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        let value = format_amount(amount);
        match self.position {
            SymbolPosition::Before => format!("{} {value}", self.symbol),
            SymbolPosition::After => format!("{value} {}", self.symbol),
        }
    }
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self::new(&Currency::default())
    }
}

impl From<&Currency> for MoneyFormat {
    fn from(currency: &Currency) -> Self {
        Self::new(currency)
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
