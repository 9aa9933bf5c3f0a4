//! Expense domain types shared by the cache, the stores and the services.

pub mod category;
pub mod common;
pub mod expense;
pub mod period;

pub use category::{ExpenseCategory, UnknownCategory};
pub use common::{Displayable, ExpenseId, Identifiable, OwnerId};
pub use expense::{Expense, ExpensePatch, InsertExpense, NewExpense};
pub use period::MonthKey;
