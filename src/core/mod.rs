pub mod ledger_cache;
pub mod notify;
pub mod services;
pub mod time;

pub use ledger_cache::{LedgerCache, LedgerSnapshot, LoadOutcome};
pub use notify::{Notifier, OperationKind, TracingNotifier};
pub use time::{Clock, FixedClock, SystemClock};
