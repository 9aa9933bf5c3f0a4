#![doc(test(attr(deny(warnings))))]

//! Expense Ledger keeps a signed-in user's expenses in a consistent in-memory
//! snapshot, mediates every create/update/delete against a remote store, and
//! derives the dashboard, calendar and map statistics from that snapshot.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::core::{LedgerCache, LedgerSnapshot, LoadOutcome};
pub use crate::errors::{LedgerError, LedgerResult, StoreError};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Ledger tracing initialized.");
    });
}
