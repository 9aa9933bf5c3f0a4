//! Remote store capability consumed by the ledger cache, plus two bundled adapters.

pub mod json_backend;
pub mod memory;

use async_trait::async_trait;

use crate::domain::{Expense, ExpenseId, ExpensePatch, InsertExpense, OwnerId};
use crate::errors::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable per-user expense collection. The store is the sole source of truth:
/// it assigns ids and timestamps, and decides the listing order.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Inserts a new row and returns it with store-assigned fields populated.
    async fn insert(&self, record: InsertExpense) -> StoreResult<Expense>;

    /// Applies a partial update to the row with `id` and returns the updated row.
    async fn update_by_id(&self, id: ExpenseId, patch: ExpensePatch) -> StoreResult<Expense>;

    async fn delete_by_id(&self, id: ExpenseId) -> StoreResult<()>;

    /// All rows owned by `owner`, ordered by `date` descending.
    async fn list_by_owner(&self, owner: OwnerId) -> StoreResult<Vec<Expense>>;
}

pub use json_backend::JsonFileStore;
pub use memory::{ExpenseTable, InMemoryStore};
