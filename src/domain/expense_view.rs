use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Expense, Household, MemberId, Money};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantShare {
    pub member_id: MemberId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub share: Decimal,
}

/// An accepted expense as listed for the household: display names resolved,
/// every participant's share spelled out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseView {
    pub id: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payer: MemberId,
    pub payer_name: String,
    pub split_type: &'static str,
    pub participants: Vec<ParticipantShare>,
    pub created_at: DateTime<Utc>,
}

fn display_name(household: &Household, id: &MemberId) -> String {
    household
        .member(id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

impl ExpenseView {
    pub fn new(expense: &Expense, household: &Household) -> Self {
        Self {
            id: expense.id.clone(),
            description: expense.description.clone(),
            amount: Money::rounded(expense.amount),
            payer: expense.payer.clone(),
            payer_name: display_name(household, &expense.payer),
            split_type: expense.split.kind(),
            participants: expense
                .participants
                .iter()
                .map(|p| ParticipantShare {
                    member_id: p.clone(),
                    name: display_name(household, p),
                    share: Money::rounded(expense.share_of(p)),
                })
                .collect(),
            created_at: expense.created_at,
        }
    }
}
