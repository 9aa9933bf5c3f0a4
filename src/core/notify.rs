//! Notification collaborator fed by the ledger cache.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which ledger operation a notification refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Load,
}

impl OperationKind {
    pub fn success_message(self) -> &'static str {
        match self {
            OperationKind::Create => "Expense added successfully",
            OperationKind::Update => "Expense updated",
            OperationKind::Delete => "Expense deleted",
            OperationKind::Load => "Expenses loaded",
        }
    }

    pub fn failure_message(self, detail: &str) -> String {
        let action = match self {
            OperationKind::Create => "add expense",
            OperationKind::Update => "update expense",
            OperationKind::Delete => "delete expense",
            OperationKind::Load => "load expenses",
        };
        format!("Failed to {action}: {detail}")
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Load => "load",
        };
        f.write_str(label)
    }
}

/// Receives user-visible outcomes of ledger operations (toasts, banners, logs).
pub trait Notifier: Send + Sync {
    fn notify_success(&self, kind: OperationKind);
    fn notify_failure(&self, kind: OperationKind, message: &str);
}

/// Default notifier that reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, kind: OperationKind) {
        tracing::info!(operation = %kind, "{}", kind.success_message());
    }

    fn notify_failure(&self, kind: OperationKind, message: &str) {
        tracing::warn!(operation = %kind, "{}", kind.failure_message(message));
    }
}
