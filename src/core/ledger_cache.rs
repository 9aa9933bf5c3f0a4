//! Invalidate-and-refetch cache over the current user's expenses.
//!
//! The cache owns one ordered snapshot per session. Mutations never patch that
//! snapshot locally: a store-acknowledged mutation marks it stale and reloads it
//! from the store before the mutation's future resolves.
//!
//! Overlapping loads are resolved last-issued-wins. Every load takes a sequence
//! number from a monotonic counter before contacting the store, and its result is
//! applied only if no newer load was issued in the meantime. Signing out advances
//! the same counter, so results still in flight for the old session are dropped.
//! A mutation whose own reload was superseded resolves once the newer load has
//! settled, so its write is visible (or the failure recorded) when it returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::core::notify::{Notifier, OperationKind};
use crate::core::services::{DashboardSummary, SummaryService};
use crate::core::time::Clock;
use crate::domain::{Expense, ExpenseId, ExpensePatch, InsertExpense, NewExpense, OwnerId};
use crate::errors::{LedgerError, LedgerResult, StoreError};
use crate::storage::{ExpenseStore, StoreResult};

/// Immutable view of the ledger as of one applied load.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    owner: Option<OwnerId>,
    expenses: Arc<[Expense]>,
    sequence: u64,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::empty(None, 0)
    }
}

impl LedgerSnapshot {
    fn empty(owner: Option<OwnerId>, sequence: u64) -> Self {
        Self {
            owner,
            expenses: Arc::from(Vec::new()),
            sequence,
        }
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    /// Expenses ordered by date, newest first.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Sequence number of the load that produced this snapshot.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}

/// Result of a load that completed without a store error.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The fetched rows replaced the held snapshot.
    Applied(LedgerSnapshot),
    /// A newer load was issued (or the session ended) before this one settled.
    Superseded,
}

impl LoadOutcome {
    pub fn applied(self) -> Option<LedgerSnapshot> {
        match self {
            LoadOutcome::Applied(snapshot) => Some(snapshot),
            LoadOutcome::Superseded => None,
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    snapshot: LedgerSnapshot,
    owner: Option<OwnerId>,
    latest_issued: u64,
    session: u64,
    loading: bool,
    stale: bool,
    last_error: Option<LedgerError>,
}

pub struct LedgerCache {
    store: Arc<dyn ExpenseStore>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CacheState>,
    publisher: watch::Sender<LedgerSnapshot>,
    /// Ticks whenever a load settles or the session changes.
    settled: watch::Sender<u64>,
}

impl LedgerCache {
    pub fn new(store: Arc<dyn ExpenseStore>, notifier: Arc<dyn Notifier>) -> Self {
        let (publisher, _) = watch::channel(LedgerSnapshot::default());
        let (settled, _) = watch::channel(0);
        Self {
            store,
            notifier,
            state: Mutex::new(CacheState::default()),
            publisher,
            settled,
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state().snapshot.clone()
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.state().snapshot.expenses().to_vec()
    }

    /// True while the most recently issued load has not settled.
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn is_stale(&self) -> bool {
        self.state().stale
    }

    pub fn last_error(&self) -> Option<LedgerError> {
        self.state().last_error.clone()
    }

    /// Owner whose ledger is currently held.
    pub fn owner(&self) -> Option<OwnerId> {
        self.state().owner
    }

    /// Receives every snapshot that gets applied from now on.
    pub fn subscribe(&self) -> watch::Receiver<LedgerSnapshot> {
        self.publisher.subscribe()
    }

    /// Dashboard statistics over the held snapshot.
    pub fn dashboard(&self, clock: &dyn Clock, config: &LedgerConfig) -> DashboardSummary {
        let snapshot = self.snapshot();
        SummaryService::dashboard(snapshot.expenses(), clock.today(), config)
    }

    /// Marks the held snapshot as out of date. The data stays readable.
    pub fn invalidate(&self) {
        self.state().stale = true;
    }

    /// Ends the session: drops the snapshot and discards every in-flight result.
    pub fn sign_out(&self) {
        let mut state = self.state();
        state.latest_issued += 1;
        state.session += 1;
        state.owner = None;
        state.loading = false;
        state.stale = false;
        state.last_error = None;
        state.snapshot = LedgerSnapshot::empty(None, state.latest_issued);
        self.publisher.send_replace(state.snapshot.clone());
        drop(state);
        self.mark_settled();
        info!("ledger session signed out");
    }

    /// Fetches the owner's expenses and replaces the held snapshot.
    ///
    /// Without an owner the store is not contacted and an empty snapshot is applied.
    pub async fn load(&self, owner: Option<OwnerId>) -> LedgerResult<LoadOutcome> {
        let Some(owner) = owner else {
            return Ok(LoadOutcome::Applied(self.apply_unauthenticated()));
        };
        let (_, outcome) = self.fetch(owner).await;
        outcome
    }

    async fn fetch(&self, owner: OwnerId) -> (u64, LedgerResult<LoadOutcome>) {
        let sequence = self.begin_load(owner);
        let fetched = self.store.list_by_owner(owner).await;
        let outcome = match self.finish_load(owner, sequence, fetched) {
            Ok(snapshot) => Ok(LoadOutcome::Applied(snapshot)),
            Err(LedgerError::StaleRequestDiscarded) => {
                debug!(sequence, "discarding superseded ledger load");
                Ok(LoadOutcome::Superseded)
            }
            Err(err) => {
                warn!(sequence, error = %err, "ledger load failed");
                self.notifier
                    .notify_failure(OperationKind::Load, &err.to_string());
                Err(err)
            }
        };
        (sequence, outcome)
    }

    /// Creates an expense for `owner`, then reloads the ledger.
    pub async fn create(&self, owner: Option<OwnerId>, input: NewExpense) -> LedgerResult<Expense> {
        let kind = OperationKind::Create;
        let prepared = Self::authorize(owner).and_then(|owner| Ok((owner, input.validate()?)));
        let (owner, input) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => return Err(self.reject(kind, err)),
        };
        let session = self.session();
        let outcome = self.store.insert(InsertExpense::new(owner, input)).await;
        self.settle(kind, owner, session, outcome).await
    }

    /// Applies a partial update to expense `id`, then reloads the ledger.
    pub async fn update(
        &self,
        owner: Option<OwnerId>,
        id: ExpenseId,
        patch: ExpensePatch,
    ) -> LedgerResult<Expense> {
        let kind = OperationKind::Update;
        let prepared = Self::authorize(owner).and_then(|owner| Ok((owner, patch.validate()?)));
        let (owner, patch) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => return Err(self.reject(kind, err)),
        };
        let session = self.session();
        let outcome = self.store.update_by_id(id, patch).await;
        self.settle(kind, owner, session, outcome).await
    }

    /// Deletes expense `id`, then reloads the ledger.
    pub async fn delete(&self, owner: Option<OwnerId>, id: ExpenseId) -> LedgerResult<()> {
        let kind = OperationKind::Delete;
        let owner = match Self::authorize(owner) {
            Ok(owner) => owner,
            Err(err) => return Err(self.reject(kind, err)),
        };
        let session = self.session();
        let outcome = self.store.delete_by_id(id).await;
        self.settle(kind, owner, session, outcome).await
    }

    fn authorize(owner: Option<OwnerId>) -> LedgerResult<OwnerId> {
        owner.ok_or(LedgerError::NotAuthenticated)
    }

    async fn settle<T>(
        &self,
        kind: OperationKind,
        owner: OwnerId,
        session: u64,
        outcome: StoreResult<T>,
    ) -> LedgerResult<T> {
        let value = outcome.map_err(|err: StoreError| self.reject(kind, err.into()))?;
        if self.session() != session {
            debug!(operation = %kind, "session ended before mutation settled; skipping reload");
            return Ok(value);
        }
        self.invalidate();
        // The write is durable even if the reload fails; that failure is recorded
        // in `last_error` and notified as a load failure.
        match self.fetch(owner).await {
            (_, Ok(LoadOutcome::Applied(_))) => {}
            (sequence, Ok(LoadOutcome::Superseded)) => {
                self.await_newer_load(sequence, session).await;
            }
            (_, Err(err)) => {
                debug!(operation = %kind, error = %err, "reload after mutation failed");
            }
        }
        if self.session() != session {
            debug!(operation = %kind, "session ended during reload; dropping notification");
            return Ok(value);
        }
        self.notifier.notify_success(kind);
        Ok(value)
    }

    /// Waits until a load issued after `sequence` has settled, or the session ends.
    async fn await_newer_load(&self, sequence: u64, session: u64) {
        let mut settled = self.settled.subscribe();
        while !self.caught_up(sequence, session) {
            if settled.changed().await.is_err() {
                return;
            }
        }
    }

    fn caught_up(&self, sequence: u64, session: u64) -> bool {
        let state = self.state();
        state.session != session || !state.loading || state.snapshot.sequence() > sequence
    }

    fn mark_settled(&self) {
        self.settled.send_modify(|ticks| *ticks = ticks.wrapping_add(1));
    }

    fn reject(&self, kind: OperationKind, err: LedgerError) -> LedgerError {
        warn!(operation = %kind, error = %err, "ledger mutation failed");
        if err.is_user_visible() {
            self.notifier.notify_failure(kind, &err.to_string());
        }
        err
    }

    fn begin_load(&self, owner: OwnerId) -> u64 {
        let mut state = self.state();
        state.latest_issued += 1;
        let sequence = state.latest_issued;
        if state.owner != Some(owner) {
            state.owner = Some(owner);
            state.stale = false;
            state.last_error = None;
            state.snapshot = LedgerSnapshot::empty(Some(owner), sequence);
            self.publisher.send_replace(state.snapshot.clone());
        }
        state.loading = true;
        debug!(sequence, %owner, "issuing ledger load");
        sequence
    }

    fn finish_load(
        &self,
        owner: OwnerId,
        sequence: u64,
        fetched: StoreResult<Vec<Expense>>,
    ) -> LedgerResult<LedgerSnapshot> {
        let mut state = self.state();
        if state.latest_issued != sequence || state.owner != Some(owner) {
            return Err(LedgerError::StaleRequestDiscarded);
        }
        state.loading = false;
        self.mark_settled();
        match fetched {
            Ok(rows) => {
                let snapshot = LedgerSnapshot {
                    owner: Some(owner),
                    expenses: Arc::from(rows),
                    sequence,
                };
                state.snapshot = snapshot.clone();
                state.stale = false;
                state.last_error = None;
                self.publisher.send_replace(snapshot.clone());
                info!(sequence, expenses = snapshot.len(), "ledger snapshot applied");
                Ok(snapshot)
            }
            Err(err) => {
                let err = LedgerError::from(err);
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn apply_unauthenticated(&self) -> LedgerSnapshot {
        let mut state = self.state();
        state.latest_issued += 1;
        state.owner = None;
        state.loading = false;
        state.stale = false;
        state.last_error = None;
        state.snapshot = LedgerSnapshot::empty(None, state.latest_issued);
        self.publisher.send_replace(state.snapshot.clone());
        self.mark_settled();
        state.snapshot.clone()
    }

    fn session(&self) -> u64 {
        self.state().session
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
