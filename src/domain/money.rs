use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};

/// A currency-agnostic amount parsed from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(pub Decimal);

impl Money {
    pub const TARGET_DECIMALS: u32 = 4; // input precision
    pub const DISPLAY_DECIMALS: u32 = 2;

    /// Tolerance used when comparing split totals and checking conservation.
    pub const EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

    /// Largest amount (or custom share) a single expense may carry.
    pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0); // 1e12

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Parses a plain decimal string (`12`, `-3.5`, `0.12345`), rounding
    /// half to even once past four decimal places.
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();

        if s.is_empty() || s.contains(['e', 'E']) {
            return None;
        }
        let value = Decimal::from_str(s).ok()?;
        Some(Self(value.round_dp_with_strategy(
            Self::TARGET_DECIMALS,
            RoundingStrategy::MidpointNearestEven,
        )))
    }

    /// True when both amounts agree within [`Money::EPSILON`].
    pub fn approx_eq(a: Decimal, b: Decimal) -> bool {
        a.checked_sub(b)
            .is_some_and(|diff| diff.abs() <= Self::EPSILON)
    }

    /// The value as presented: two decimals, half to even, never negative zero.
    pub fn rounded(value: Decimal) -> Decimal {
        let rounded =
            value.round_dp_with_strategy(Self::DISPLAY_DECIMALS, RoundingStrategy::MidpointNearestEven);
        if rounded.is_zero() {
            Decimal::ZERO
        } else {
            rounded
        }
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut rounded = Self::rounded(self.0);
        rounded.rescale(Self::DISPLAY_DECIMALS);
        write!(f, "{}", rounded)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_decimal_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid Money format: {}", s)))
    }
}
