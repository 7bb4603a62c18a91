use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::MemberId;

#[derive(Debug, Clone, PartialEq)]
pub enum Split {
    Equal,
    Custom { shares: BTreeMap<MemberId, Decimal> },
}

impl Split {
    pub fn kind(&self) -> &'static str {
        match self {
            Split::Equal => "equal",
            Split::Custom { .. } => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub payer: MemberId,
    pub participants: BTreeSet<MemberId>,
    pub split: Split,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// What `member` owes for this expense. Zero for non-participants and for
    /// participants missing from a custom share table.
    pub fn share_of(&self, member: &MemberId) -> Decimal {
        if !self.participants.contains(member) {
            return Decimal::ZERO;
        }
        match &self.split {
            Split::Equal => self.amount / Decimal::from(self.participants.len()),
            Split::Custom { shares } => shares.get(member).copied().unwrap_or(Decimal::ZERO),
        }
    }
}

impl core::fmt::Display for Expense {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "expense={},payer={},amount={},split={},participants={}",
            self.id,
            self.payer,
            self.amount,
            self.split.kind(),
            self.participants.len()
        )
    }
}
