use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{MemberId, Money};

/// A member's net position against the household pool.
///
/// Positive means the member owes the pool, negative means the pool owes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub member_id: MemberId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl Balance {
    /// Decided on the presented (rounded) amount, so the status always
    /// agrees with the printed figure.
    pub fn owes(&self) -> bool {
        !Money::rounded(self.amount).is_sign_negative()
    }
}
