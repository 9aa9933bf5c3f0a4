#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use expense_ledger::{
    core::{LedgerCache, Notifier, OperationKind},
    domain::{Expense, ExpenseCategory, ExpenseId, ExpensePatch, InsertExpense, NewExpense, OwnerId},
    errors::StoreError,
    storage::{ExpenseStore, InMemoryStore, StoreResult},
};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn spend(amount: f64, category: ExpenseCategory, on: NaiveDate) -> NewExpense {
    NewExpense::new(amount, category, on)
}

/// Builds a stored row directly, bypassing any store.
pub fn stored(owner: OwnerId, amount: f64, category: ExpenseCategory, on: NaiveDate) -> Expense {
    InsertExpense::new(owner, spend(amount, category, on)).into_expense(Uuid::new_v4(), chrono::Utc::now())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Success(OperationKind),
    Failure(OperationKind, String),
}

/// Notifier that keeps every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("lock notifier").clone()
    }

    pub fn failures(&self) -> Vec<OperationKind> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Notification::Failure(kind, _) => Some(kind),
                Notification::Success(_) => None,
            })
            .collect()
    }

    pub fn successes(&self) -> Vec<OperationKind> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Notification::Success(kind) => Some(kind),
                Notification::Failure(..) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, kind: OperationKind) {
        self.events
            .lock()
            .expect("lock notifier")
            .push(Notification::Success(kind));
    }

    fn notify_failure(&self, kind: OperationKind, message: &str) {
        self.events
            .lock()
            .expect("lock notifier")
            .push(Notification::Failure(kind, message.to_string()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCall {
    Insert,
    Update,
    Delete,
    List,
}

/// In-memory store that counts calls and fails the calls it has been told to fail.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    inner: InMemoryStore,
    failures: Mutex<VecDeque<(StoreCall, StoreError)>>,
    calls: Mutex<Vec<StoreCall>>,
}

impl ScriptedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a failure for the next call of the given kind.
    pub fn fail_next(&self, call: StoreCall, err: StoreError) {
        self.failures
            .lock()
            .expect("lock failures")
            .push_back((call, err));
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("lock calls").clone()
    }

    pub fn count(&self, call: StoreCall) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }

    pub fn rows(&self) -> usize {
        self.inner.len()
    }

    fn record(&self, call: StoreCall) -> StoreResult<()> {
        self.calls.lock().expect("lock calls").push(call);
        let mut failures = self.failures.lock().expect("lock failures");
        match failures.iter().position(|(kind, _)| *kind == call) {
            Some(index) => {
                let (_, err) = failures.remove(index).expect("queued failure");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExpenseStore for ScriptedStore {
    async fn insert(&self, record: InsertExpense) -> StoreResult<Expense> {
        self.record(StoreCall::Insert)?;
        self.inner.insert(record).await
    }

    async fn update_by_id(&self, id: ExpenseId, patch: ExpensePatch) -> StoreResult<Expense> {
        self.record(StoreCall::Update)?;
        self.inner.update_by_id(id, patch).await
    }

    async fn delete_by_id(&self, id: ExpenseId) -> StoreResult<()> {
        self.record(StoreCall::Delete)?;
        self.inner.delete_by_id(id).await
    }

    async fn list_by_owner(&self, owner: OwnerId) -> StoreResult<Vec<Expense>> {
        self.record(StoreCall::List)?;
        self.inner.list_by_owner(owner).await
    }
}

/// A `list_by_owner` call parked until the test answers it.
pub struct PendingList {
    pub owner: OwnerId,
    responder: oneshot::Sender<StoreResult<Vec<Expense>>>,
}

impl PendingList {
    pub fn respond(self, result: StoreResult<Vec<Expense>>) {
        let _ = self.responder.send(result);
    }
}

/// Store whose listings block until the test responds, so completion order is scripted.
/// Mutations go straight to an in-memory table.
pub struct GatedStore {
    inner: InMemoryStore,
    requests: mpsc::UnboundedSender<PendingList>,
    listings: AtomicUsize,
}

impl GatedStore {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<PendingList>) {
        let (requests, receiver) = mpsc::unbounded_channel();
        let store = Arc::new(Self {
            inner: InMemoryStore::new(),
            requests,
            listings: AtomicUsize::new(0),
        });
        (store, receiver)
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    /// What an answered listing would return right now.
    pub async fn stored_for(&self, owner: OwnerId) -> Vec<Expense> {
        self.inner
            .list_by_owner(owner)
            .await
            .expect("in-memory listing")
    }
}

#[async_trait]
impl ExpenseStore for GatedStore {
    async fn insert(&self, record: InsertExpense) -> StoreResult<Expense> {
        self.inner.insert(record).await
    }

    async fn update_by_id(&self, id: ExpenseId, patch: ExpensePatch) -> StoreResult<Expense> {
        self.inner.update_by_id(id, patch).await
    }

    async fn delete_by_id(&self, id: ExpenseId) -> StoreResult<()> {
        self.inner.delete_by_id(id).await
    }

    async fn list_by_owner(&self, owner: OwnerId) -> StoreResult<Vec<Expense>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        let (responder, response) = oneshot::channel();
        self.requests
            .send(PendingList { owner, responder })
            .map_err(|_| StoreError::Network("test harness went away".into()))?;
        response
            .await
            .map_err(|_| StoreError::Network("listing was never answered".into()))?
    }
}

/// A mutation parked before it reaches the table.
pub struct PendingMutation {
    pub call: StoreCall,
    release: oneshot::Sender<()>,
}

impl PendingMutation {
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

/// Scripted store whose inserts, updates and deletes wait for the test to release them.
/// Listings answer immediately.
pub struct HoldingStore {
    inner: ScriptedStore,
    mutations: mpsc::UnboundedSender<PendingMutation>,
}

impl HoldingStore {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<PendingMutation>) {
        let (mutations, receiver) = mpsc::unbounded_channel();
        let store = Arc::new(Self {
            inner: ScriptedStore::default(),
            mutations,
        });
        (store, receiver)
    }

    pub fn count(&self, call: StoreCall) -> usize {
        self.inner.count(call)
    }

    pub fn rows(&self) -> usize {
        self.inner.rows()
    }

    async fn hold(&self, call: StoreCall) -> StoreResult<()> {
        let (release, released) = oneshot::channel();
        self.mutations
            .send(PendingMutation { call, release })
            .map_err(|_| StoreError::Network("test harness went away".into()))?;
        released
            .await
            .map_err(|_| StoreError::Network("mutation was never released".into()))
    }
}

#[async_trait]
impl ExpenseStore for HoldingStore {
    async fn insert(&self, record: InsertExpense) -> StoreResult<Expense> {
        self.hold(StoreCall::Insert).await?;
        self.inner.insert(record).await
    }

    async fn update_by_id(&self, id: ExpenseId, patch: ExpensePatch) -> StoreResult<Expense> {
        self.hold(StoreCall::Update).await?;
        self.inner.update_by_id(id, patch).await
    }

    async fn delete_by_id(&self, id: ExpenseId) -> StoreResult<()> {
        self.hold(StoreCall::Delete).await?;
        self.inner.delete_by_id(id).await
    }

    async fn list_by_owner(&self, owner: OwnerId) -> StoreResult<Vec<Expense>> {
        self.inner.list_by_owner(owner).await
    }
}

/// Cache over a scripted store with a recording notifier.
pub fn scripted_cache() -> (Arc<LedgerCache>, Arc<ScriptedStore>, Arc<RecordingNotifier>) {
    let store = ScriptedStore::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let cache = Arc::new(LedgerCache::new(store.clone(), notifier.clone()));
    (cache, store, notifier)
}

/// Cache over a gated store; the receiver yields each parked listing.
pub fn gated_cache() -> (
    Arc<LedgerCache>,
    mpsc::UnboundedReceiver<PendingList>,
    Arc<RecordingNotifier>,
) {
    let (cache, _store, requests, notifier) = gated_cache_with_store();
    (cache, requests, notifier)
}

pub fn gated_cache_with_store() -> (
    Arc<LedgerCache>,
    Arc<GatedStore>,
    mpsc::UnboundedReceiver<PendingList>,
    Arc<RecordingNotifier>,
) {
    let (store, requests) = GatedStore::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let cache = Arc::new(LedgerCache::new(store.clone(), notifier.clone()));
    (cache, store, requests, notifier)
}

/// Cache over a holding store; the receiver yields each parked mutation.
pub fn holding_cache() -> (
    Arc<LedgerCache>,
    Arc<HoldingStore>,
    mpsc::UnboundedReceiver<PendingMutation>,
    Arc<RecordingNotifier>,
) {
    let (store, mutations) = HoldingStore::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let cache = Arc::new(LedgerCache::new(store.clone(), notifier.clone()));
    (cache, store, mutations, notifier)
}
