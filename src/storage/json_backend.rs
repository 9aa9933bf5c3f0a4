use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Expense, ExpenseId, ExpensePatch, InsertExpense, OwnerId};
use crate::errors::StoreError;
use crate::storage::{ExpenseStore, ExpenseTable, StoreResult};
use crate::utils::persistence::{load_json_from_path, save_json_to_path, PersistenceError};

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Io(io) => StoreError::Io(io.to_string()),
            PersistenceError::Serde(serde) => StoreError::Serialization(serde.to_string()),
        }
    }
}

/// Filesystem-backed store keeping every row in one JSON document.
///
/// Each mutation rewrites the document atomically; a failed write leaves both the
/// file and the in-memory table untouched.
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<ExpenseTable>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file starts an empty table.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let table = load_json_from_path::<ExpenseTable>(&path)?.unwrap_or_default();
        tracing::debug!(path = %path.display(), rows = table.len(), "opened json expense store");
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut ExpenseTable) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut table = self.table.lock().await;
        let mut staged = table.clone();
        let result = apply(&mut staged)?;
        save_json_to_path(&staged, &self.path)?;
        *table = staged;
        Ok(result)
    }
}

#[async_trait]
impl ExpenseStore for JsonFileStore {
    async fn insert(&self, record: InsertExpense) -> StoreResult<Expense> {
        self.mutate(|table| table.insert(record)).await
    }

    async fn update_by_id(&self, id: ExpenseId, patch: ExpensePatch) -> StoreResult<Expense> {
        self.mutate(|table| table.update(id, &patch)).await
    }

    async fn delete_by_id(&self, id: ExpenseId) -> StoreResult<()> {
        self.mutate(|table| table.delete(id)).await
    }

    async fn list_by_owner(&self, owner: OwnerId) -> StoreResult<Vec<Expense>> {
        Ok(self.table.lock().await.list_by_owner(owner))
    }
}
