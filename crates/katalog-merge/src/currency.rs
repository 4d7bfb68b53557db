//! TRY to USD price conversion.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Outcome of converting one price text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceConversion {
    /// The formatted USD amount.
    Converted(String),
    /// Input that is not a number, carried through unchanged.
    Unparsed(String),
}

impl PriceConversion {
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Converted(t) | Self::Unparsed(t) => t,
        }
    }
}

/// Converts a TRY price text to USD at `rate`, rounded to 2 places.
///
/// Accepts surrounding whitespace, plain decimals and scientific notation.
#[must_use]
pub fn convert_price(text: &str, rate: Decimal) -> PriceConversion {
    let Some(amount) = parse_amount(text) else {
        return PriceConversion::Unparsed(text.to_owned());
    };
    match amount.checked_mul(rate) {
        Some(usd) => PriceConversion::Converted(format_usd(
            usd.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        )),
        None => PriceConversion::Unparsed(text.to_owned()),
    }
}

/// Shortest decimal form with at least one fractional digit.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let amount = amount.normalize();
    if amount.scale() == 0 {
        format!("{amount}.0")
    } else {
        amount.to_string()
    }
}

fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}
