//! Pending synchronous transactions, keyed by command.
//!
//! A transaction is resolved exactly once. Removal from the [`Registry`] is
//! the point at which a resolver wins: the receive path removes with
//! [`Registry::unregister`], the deadline timer with [`Registry::expire`],
//! and shutdown with [`Registry::cancel_all`]. Whoever removes the entry
//! resolves it; everyone else finds it gone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::frame::CommandKey;
use crate::error::{Error, Result};

/// Sender half of a waiting call.
pub type ReplySender = oneshot::Sender<Result<Bytes>>;

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    /// Registered and waiting.
    Pending,
    /// A response was delivered.
    Resolved,
    /// The device or transport reported an error.
    Failed,
    /// The deadline passed.
    TimedOut,
    /// The client shut down.
    Cancelled,
}

#[derive(Debug)]
struct Slot {
    state: TransactionState,
    reply: Option<ReplySender>,
    timer: Option<JoinHandle<()>>,
}

/// Correlation state of one synchronous call.
#[derive(Debug)]
pub struct Transaction {
    id: u64,
    key: CommandKey,
    timeout: Duration,
    deadline: Instant,
    slot: Mutex<Slot>,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl Transaction {
    /// Creates a pending transaction whose deadline is `timeout` from now.
    #[must_use]
    pub fn new(key: CommandKey, timeout: Duration, reply: ReplySender) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            key,
            timeout,
            deadline: Instant::now() + timeout,
            slot: Mutex::new(Slot {
                state: TransactionState::Pending,
                reply: Some(reply),
                timer: None,
            }),
        })
    }

    /// Returns the process-unique id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the correlation key.
    #[must_use]
    pub const fn key(&self) -> CommandKey {
        self.key
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.lock().state
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the error reported when the deadline passes.
    #[must_use]
    pub fn timeout_error(&self) -> Error {
        Error::Timeout {
            subsystem: self.key.subsystem,
            command: self.key.command,
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Delivers the outcome to the waiting call.
    ///
    /// Returns false if the transaction was already resolved.
    pub fn resolve(&self, outcome: Result<Bytes>) -> bool {
        let mut slot = self.lock();
        if slot.state != TransactionState::Pending {
            return false;
        }

        slot.state = match &outcome {
            Ok(_) => TransactionState::Resolved,
            Err(Error::Timeout { .. }) => TransactionState::TimedOut,
            Err(Error::Cancelled) => TransactionState::Cancelled,
            Err(_) => TransactionState::Failed,
        };

        if let Some(timer) = slot.timer.take() {
            if slot.state != TransactionState::TimedOut {
                timer.abort();
            }
        }
        if let Some(reply) = slot.reply.take() {
            // The caller may have given up waiting.
            let _ = reply.send(outcome);
        }
        true
    }

    fn arm(&self, timer: JoinHandle<()>) {
        let mut slot = self.lock();
        if slot.state == TransactionState::Pending {
            slot.timer = Some(timer);
        } else {
            timer.abort();
        }
    }
}

/// Table of pending transactions.
#[derive(Debug, Default)]
pub struct Registry {
    pending: Mutex<HashMap<CommandKey, Arc<Transaction>>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CommandKey, Arc<Transaction>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a transaction under its key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTransaction`] if another transaction with the
    /// same key is still pending.
    pub fn register(&self, txn: Arc<Transaction>) -> Result<()> {
        let mut pending = self.lock();
        let key = txn.key();
        if pending.contains_key(&key) {
            return Err(Error::DuplicateTransaction { key });
        }
        pending.insert(key, txn);
        Ok(())
    }

    /// Removes and returns the transaction pending under `key`.
    pub fn unregister(&self, key: &CommandKey) -> Option<Arc<Transaction>> {
        self.lock().remove(key)
    }

    /// Returns the transaction pending under `key` without removing it.
    #[must_use]
    pub fn get(&self, key: &CommandKey) -> Option<Arc<Transaction>> {
        self.lock().get(key).cloned()
    }

    /// Removes the transaction under `key` only if it is the one with `id`.
    pub fn expire(&self, key: &CommandKey, id: u64) -> Option<Arc<Transaction>> {
        let mut pending = self.lock();
        if pending.get(key).is_some_and(|txn| txn.id() == id) {
            pending.remove(key)
        } else {
            None
        }
    }

    /// Resolves every pending transaction as cancelled.
    ///
    /// Returns the number of transactions cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.lock().drain().map(|(_, txn)| txn).collect();
        drained
            .iter()
            .filter(|txn| txn.resolve(Err(Error::Cancelled)))
            .count()
    }

    /// Returns the number of pending transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Starts the deadline timer of a registered transaction.
    ///
    /// When the deadline passes the timer removes the transaction, if it is
    /// still pending, and resolves it with a timeout error.
    pub fn arm_deadline(self: &Arc<Self>, txn: &Arc<Transaction>) {
        let registry = Arc::clone(self);
        let key = txn.key();
        let id = txn.id();
        let deadline = txn.deadline();

        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(txn) = registry.expire(&key, id) {
                tracing::debug!("request {key} timed out");
                txn.resolve(Err(txn.timeout_error()));
            }
        });
        txn.arm(timer);
    }
}
