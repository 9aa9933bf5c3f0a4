use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{expense::validate_amount, Expense, ExpenseId, ExpensePatch, InsertExpense, OwnerId};
use crate::errors::StoreError;
use crate::storage::{ExpenseStore, StoreResult};

/// Row storage shared by the bundled stores.
///
/// Rows are kept in insertion order; listing sorts a copy so ties on `date`
/// come back newest insertion first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseTable {
    rows: Vec<Expense>,
}

impl ExpenseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn insert(&mut self, record: InsertExpense) -> StoreResult<Expense> {
        check_amount(record.expense.amount)?;
        let expense = record.into_expense(Uuid::new_v4(), Utc::now());
        self.rows.push(expense.clone());
        Ok(expense)
    }

    pub fn update(&mut self, id: ExpenseId, patch: &ExpensePatch) -> StoreResult<Expense> {
        if let Some(amount) = patch.amount {
            check_amount(amount)?;
        }
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(StoreError::NotFound(id))?;
        patch.apply_to(row);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    pub fn delete(&mut self, id: ExpenseId) -> StoreResult<()> {
        let index = self
            .rows
            .iter()
            .position(|row| row.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.rows.remove(index);
        Ok(())
    }

    pub fn list_by_owner(&self, owner: OwnerId) -> Vec<Expense> {
        let mut rows: Vec<Expense> = self
            .rows
            .iter()
            .rev()
            .filter(|row| row.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows
    }
}

fn check_amount(amount: f64) -> StoreResult<()> {
    validate_amount(amount).map_err(|err| StoreError::Rejected(err.to_string()))
}

/// Process-local store, useful for tests and offline sessions.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    table: Mutex<ExpenseTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: ExpenseTable) -> Self {
        Self {
            table: Mutex::new(table),
        }
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    fn table(&self) -> MutexGuard<'_, ExpenseTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ExpenseStore for InMemoryStore {
    async fn insert(&self, record: InsertExpense) -> StoreResult<Expense> {
        self.table().insert(record)
    }

    async fn update_by_id(&self, id: ExpenseId, patch: ExpensePatch) -> StoreResult<Expense> {
        self.table().update(id, &patch)
    }

    async fn delete_by_id(&self, id: ExpenseId) -> StoreResult<()> {
        self.table().delete(id)
    }

    async fn list_by_owner(&self, owner: OwnerId) -> StoreResult<Vec<Expense>> {
        Ok(self.table().list_by_owner(owner))
    }
}
