//! Property-based tests for balance computation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::balance::{compute_balances, is_conserved, net_total, validate_split};
use crate::domain::{Expense, Member, MemberId, Split};

const MEMBERS: [&str; 5] = ["ana", "bo", "cy", "dee", "eli"];

fn members() -> Vec<Member> {
    MEMBERS
        .iter()
        .map(|id| Member::new(*id, id.to_uppercase(), format!("{id}@example.com")))
        .collect()
}

/// Amounts from 0.01 to 100,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn participants() -> impl Strategy<Value = BTreeSet<MemberId>> {
    proptest::sample::subsequence(MEMBERS.to_vec(), 1..=MEMBERS.len())
        .prop_map(|ids| ids.into_iter().map(MemberId::from).collect())
}

fn equal_expense() -> impl Strategy<Value = Expense> {
    (
        positive_amount(),
        proptest::sample::select(MEMBERS.to_vec()),
        participants(),
    )
        .prop_map(|(amount, payer, participants)| Expense {
            id: String::new(),
            description: "equal".to_string(),
            amount,
            payer: MemberId::from(payer),
            participants,
            split: Split::Equal,
            created_at: Utc::now(),
        })
}

/// Custom splits built from per-participant cents so they always sum exactly.
fn custom_expense() -> impl Strategy<Value = Expense> {
    (
        proptest::sample::select(MEMBERS.to_vec()),
        participants().prop_flat_map(|participants| {
            let n = participants.len();
            (
                Just(participants),
                proptest::collection::vec(0i64..1_000_000i64, n),
            )
        }),
    )
        .prop_filter_map("zero total", |(payer, (participants, cents))| {
            let shares: BTreeMap<MemberId, Decimal> = participants
                .iter()
                .cloned()
                .zip(cents.into_iter().map(|c| Decimal::new(c, 2)))
                .collect();
            let amount: Decimal = shares.values().sum();
            (amount > Decimal::ZERO).then(|| Expense {
                id: String::new(),
                description: "custom".to_string(),
                amount,
                payer: MemberId::from(payer),
                participants,
                split: Split::Custom { shares },
                created_at: Utc::now(),
            })
        })
}

fn expense() -> impl Strategy<Value = Expense> {
    prop_oneof![equal_expense(), custom_expense()]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Money is neither created nor destroyed, whatever the mix of splits.
    #[test]
    fn prop_balances_net_to_zero(expenses in proptest::collection::vec(expense(), 0..30)) {
        let balances = compute_balances(&expenses, &members());
        prop_assert!(
            is_conserved(&balances),
            "net total drifted to {:?}",
            net_total(&balances)
        );
    }

    #[test]
    fn prop_generated_custom_splits_validate(expense in custom_expense()) {
        prop_assert!(validate_split(expense.amount, &expense.participants, &expense.split).is_ok());
    }

    #[test]
    fn prop_computation_is_repeatable(expenses in proptest::collection::vec(expense(), 0..10)) {
        let members = members();
        prop_assert_eq!(
            compute_balances(&expenses, &members),
            compute_balances(&expenses, &members)
        );
    }

    /// Every member is reported exactly once, in roster order.
    #[test]
    fn prop_every_member_reported(expenses in proptest::collection::vec(expense(), 0..10)) {
        let balances = compute_balances(&expenses, &members());
        let reported: Vec<&str> = balances.iter().map(|b| b.member_id.as_str()).collect();
        prop_assert_eq!(reported, MEMBERS.to_vec());
    }
}
