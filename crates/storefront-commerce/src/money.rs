//! Money type for representing monetary values.
//!
//! Amounts are exact decimals (`rust_decimal::Decimal`). Discounted unit
//! prices routinely carry more than two fractional digits, so rounding to the
//! currency's precision happens only when a value is displayed or handed to
//! the payment widget, never while accumulating.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CommerceError;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Result<Self, CommerceError> {
        match code.trim().to_uppercase().as_str() {
            "INR" => Ok(Currency::INR),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "CAD" => Ok(Currency::CAD),
            "AUD" => Ok(Currency::AUD),
            _ => Err(CommerceError::UnknownCurrency(code.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Exact amount in major units (e.g., rupees).
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Amount rounded to the currency's precision (half away from zero).
    pub fn rounded(&self) -> Decimal {
        let places = self.currency.decimal_places();
        let mut value = self
            .amount
            .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(places);
        value
    }

    /// Amount in the currency's smallest unit (e.g., paise), as payment
    /// gateways expect it.
    ///
    /// Returns `None` if the value does not fit in an `i64`.
    pub fn minor_units(&self) -> Option<i64> {
        let scale = Decimal::from(10_i64.pow(self.currency.decimal_places()));
        self.rounded().checked_mul(scale)?.to_i64()
    }

    /// Format as a display string (e.g., "₹49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.rounded())
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        self.rounded().to_string()
    }

    /// Add another Money value, returning `None` if currencies don't match
    /// or the sum overflows.
    pub fn checked_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        Some(Money::new(
            self.amount.checked_add(other.amount)?,
            self.currency,
        ))
    }

    /// Multiply by a quantity.
    pub fn times(&self, quantity: i64) -> Option<Money> {
        Some(Money::new(
            self.amount.checked_mul(Decimal::from(quantity))?,
            self.currency,
        ))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Apply a percentage discount: `price × (1 − percent/100)`.
///
/// `percent` is clamped to `0..=100`. Returns `None` for a negative price or
/// when the arithmetic overflows. The result keeps full precision; callers
/// round only for display.
pub fn discounted(price: Decimal, percent: Decimal) -> Option<Decimal> {
    if price < Decimal::ZERO {
        return None;
    }
    let percent = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let factor = Decimal::ONE.checked_sub(percent.checked_div(Decimal::ONE_HUNDRED)?)?;
    price.checked_mul(factor)
}
