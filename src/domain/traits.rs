use futures::Stream;

use crate::domain::{Balance, Error, Expense, ExpenseView};

pub trait ExpenseStream {
    type ExpStream: Stream<Item = Result<Expense, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::ExpStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

pub trait OutputRepository {
    /// Stores an accepted expense. Ids are unique within a household.
    fn record_expense(&mut self, expense: Expense) -> Result<(), Error>;

    fn expenses(&self) -> &[Expense];

    fn flush_balances(&mut self, balances: &[Balance]) -> Result<(), Error>;

    fn flush_expenses(&mut self, expenses: &[ExpenseView]) -> Result<(), Error>;
}
