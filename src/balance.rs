//! Expense splitting and balance computation.
//!
//! Everything in here is pure: callers hand in a snapshot of expenses and
//! members and get a fresh result back. Nothing is mutated, so the functions
//! are safe to call from any number of tasks at once.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::domain::{Balance, Error, Expense, Household, Member, MemberId, Money, Split};

/// Checks an expense's split before it is accepted.
///
/// Custom shares are summed over `participants` only; a participant missing
/// from the table counts as zero and entries for non-participants are ignored.
pub fn validate_split(
    amount: Decimal,
    participants: &BTreeSet<MemberId>,
    split: &Split,
) -> Result<(), Error> {
    if amount <= Decimal::ZERO || amount > Money::MAX_AMOUNT {
        return Err(Error::InvalidAmount(amount));
    }
    if participants.is_empty() {
        return Err(Error::InvalidParticipants(
            "at least one participant is required".to_string(),
        ));
    }

    if let Split::Custom { shares } = split {
        let owed: Vec<Decimal> = participants
            .iter()
            .map(|p| shares.get(p).copied().unwrap_or(Decimal::ZERO))
            .collect();
        let total = owed
            .iter()
            .try_fold(Decimal::ZERO, |acc, share| acc.checked_add(*share))
            .ok_or(Error::InvalidSplit {
                amount,
                total: Decimal::MAX,
            })?;

        if owed
            .iter()
            .any(|share| *share < Decimal::ZERO || *share > Money::MAX_AMOUNT)
        {
            tracing::debug!(%amount, %total, "custom split carries an out-of-range share");
            return Err(Error::InvalidSplit { amount, total });
        }
        if !Money::approx_eq(total, amount) {
            return Err(Error::InvalidSplit { amount, total });
        }
    }

    Ok(())
}

/// Submission-time check: a valid split, and a payer and participants that
/// all belong to `household`.
pub fn validate_expense(expense: &Expense, household: &Household) -> Result<(), Error> {
    validate_split(expense.amount, &expense.participants, &expense.split)?;

    if !household.has_member(&expense.payer) {
        return Err(Error::InvalidParticipants(format!(
            "payer {} is not a member of household {}",
            expense.payer, household.id
        )));
    }
    if let Some(outsider) = expense
        .participants
        .iter()
        .find(|p| !household.has_member(p))
    {
        return Err(Error::InvalidParticipants(format!(
            "participant {} is not a member of household {}",
            outsider, household.id
        )));
    }

    Ok(())
}

/// Net balance per member over `expenses`.
///
/// The payer is credited the full amount and every participant (the payer
/// included, if they take part) is debited their share. The result lists
/// every entry of `members` in the given order; members who never appear in
/// an expense end at zero.
///
/// An expense whose postings would overflow a running balance is skipped as
/// a whole, so the result stays conserved.
pub fn compute_balances(expenses: &[Expense], members: &[Member]) -> Vec<Balance> {
    let mut totals: HashMap<&MemberId, Decimal> =
        members.iter().map(|m| (&m.id, Decimal::ZERO)).collect();

    for expense in expenses {
        match post_expense(&totals, expense) {
            Some(staged) => {
                for (member, value) in staged {
                    if let Some(total) = totals.get_mut(member) {
                        *total = value;
                    }
                }
            }
            None => tracing::error!(
                expense = %expense.id,
                amount = %expense.amount,
                "balance overflow, skipping expense"
            ),
        }
    }

    members
        .iter()
        .map(|m| Balance {
            member_id: m.id.clone(),
            name: m.name.clone(),
            amount: totals.get(&m.id).copied().unwrap_or(Decimal::ZERO),
        })
        .collect()
}

/// The new totals one expense would leave behind, or `None` on overflow.
fn post_expense<'e>(
    totals: &HashMap<&MemberId, Decimal>,
    expense: &'e Expense,
) -> Option<HashMap<&'e MemberId, Decimal>> {
    let mut staged: HashMap<&'e MemberId, Decimal> = HashMap::new();

    let postings = std::iter::once((&expense.payer, -expense.amount)).chain(
        expense
            .participants
            .iter()
            .map(|p| (p, expense.share_of(p))),
    );
    for (member, delta) in postings {
        let Some(current) = staged.get(member).or_else(|| totals.get(member)).copied() else {
            tracing::warn!(
                expense = %expense.id,
                %member,
                "not a household member, skipping posting"
            );
            continue;
        };
        staged.insert(member, current.checked_add(delta)?);
    }

    Some(staged)
}

/// Balances for a household, or nothing at all when there is no household.
pub fn household_balances(household: Option<&Household>, expenses: &[Expense]) -> Vec<Balance> {
    match household {
        Some(household) => compute_balances(expenses, &household.members),
        None => Vec::new(),
    }
}

/// Sum of all balances, `None` if it does not fit in a `Decimal`.
pub fn net_total(balances: &[Balance]) -> Option<Decimal> {
    balances
        .iter()
        .try_fold(Decimal::ZERO, |acc, b| acc.checked_add(b.amount))
}

/// Every unit debited to a participant is credited to exactly one payer, so a
/// household's balances always net out to zero.
pub fn is_conserved(balances: &[Balance]) -> bool {
    net_total(balances).is_some_and(|net| Money::approx_eq(net, Decimal::ZERO))
}
