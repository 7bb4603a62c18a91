use crate::balance::{compute_balances, household_balances, is_conserved, net_total, validate_expense};
use crate::domain::{
    Balance, DeadLetterQueue, Error, Expense, ExpenseStream, ExpenseView, Household, MemberId,
    OutputRepository,
};
use crate::output_repository::Report;

use futures::StreamExt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSummary {
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug)]
pub struct Engine<I, O, D>
where
    I: ExpenseStream,
    O: OutputRepository,
    D: DeadLetterQueue,
{
    household: Household,
    ingestion: I,
    output_repository: O,
    dlq: D,
    // Last computed snapshot; dropped whenever a new expense is accepted.
    cached: Option<Vec<Balance>>,
}

impl<I, O, D> Engine<I, O, D>
where
    I: ExpenseStream,
    O: OutputRepository,
    D: DeadLetterQueue,
{
    pub fn new(household: Household, ingestion: I, output_repository: O, dlq: D) -> Self {
        Self {
            household,
            ingestion,
            output_repository,
            dlq,
            cached: None,
        }
    }

    #[cfg(test)]
    pub fn into_output_repository(self) -> O {
        self.output_repository
    }

    pub async fn process(&mut self) -> Result<ProcessSummary, Error> {
        let mut res = self.ingestion.stream();
        let mut summary = ProcessSummary::default();

        while let Some(expense) = res.next().await {
            match expense.and_then(|expense| self.apply_expense(expense)) {
                Ok(()) => summary.accepted += 1,
                Err(e) => {
                    summary.rejected += 1;
                    self.dlq.report(&e);
                }
            }
        }

        tracing::info!(
            household = %self.household.id,
            accepted = summary.accepted,
            rejected = summary.rejected,
            "finished processing expenses"
        );
        Ok(summary)
    }

    fn apply_expense(&mut self, expense: Expense) -> Result<(), Error> {
        validate_expense(&expense, &self.household)?;

        let description = expense.to_string();
        self.output_repository.record_expense(expense)?;
        self.cached = None;
        tracing::debug!(%description, "expense accepted");

        Ok(())
    }

    /// Balances over every accepted expense, one entry per household member.
    pub fn balances(&mut self) -> &[Balance] {
        let household = &self.household;
        let output_repository = &self.output_repository;
        self.cached.get_or_insert_with(|| {
            let balances = compute_balances(output_repository.expenses(), &household.members);
            if !is_conserved(&balances) {
                tracing::error!(
                    household = %household.id,
                    net = ?net_total(&balances),
                    "household balances do not net to zero"
                );
            }
            balances
        })
    }

    /// The balance view for `member`: the whole household's balances when
    /// they belong to it, nothing otherwise.
    pub fn balances_for(&mut self, member: &MemberId) -> Vec<Balance> {
        if !self.household.has_member(member) {
            tracing::debug!(%member, household = %self.household.id, "member has no household");
            return household_balances(None, self.output_repository.expenses());
        }
        self.balances().to_vec()
    }

    /// Accepted expenses in acceptance order, with names and shares resolved.
    /// Like balances, a member outside the household sees nothing.
    pub fn expense_views(&self, member: Option<&MemberId>) -> Vec<ExpenseView> {
        if member.is_some_and(|m| !self.household.has_member(m)) {
            return Vec::new();
        }
        self.output_repository
            .expenses()
            .iter()
            .map(|e| ExpenseView::new(e, &self.household))
            .collect()
    }

    pub fn flush(&mut self, report: Report, member: Option<&MemberId>) -> Result<(), Error> {
        match report {
            Report::Balances => {
                let balances = match member {
                    Some(member) => self.balances_for(member),
                    None => self.balances().to_vec(),
                };
                self.output_repository.flush_balances(&balances)
            }
            Report::Expenses => {
                let views = self.expense_views(member);
                self.output_repository.flush_expenses(&views)
            }
        }
    }
}
