pub mod balance;
pub mod error;
pub mod expense;
pub mod expense_view;
pub mod household;
pub mod member;
pub mod money;
pub mod traits;

pub use balance::Balance;
pub use error::Error;
pub use expense::{Expense, Split};
pub use expense_view::ExpenseView;
pub use household::Household;
pub use member::{Member, MemberId};
pub use money::Money;
pub use traits::{DeadLetterQueue, ExpenseStream, OutputRepository};
