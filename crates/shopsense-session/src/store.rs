//! Persisted usage preferences.
//!
//! The counter lives outside the session (browser sync storage, a file, or
//! plain memory); [`PrefStore`] is the seam. Writes are last-write-wins
//! across concurrent sessions, and readers can observe changes through the
//! watch channel.

use std::future::Future;

use shopsense_core::UsageState;
use thiserror::Error;
use tokio::sync::watch;

/// Errors from the backing preference storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
}

/// Access to the persisted usage state.
pub trait PrefStore: Send + Sync {
    /// Loads the current usage state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backing storage cannot
    /// be read. Callers are expected to fail open on this.
    fn load(&self) -> impl Future<Output = Result<UsageState, StoreError>> + Send;

    /// Persists a new used-count. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the write does not land.
    fn save_used(&self, used: u32) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Subscribes to state changes made through this store.
    fn subscribe(&self) -> watch::Receiver<UsageState>;
}

impl<S: PrefStore> PrefStore for std::sync::Arc<S> {
    fn load(&self) -> impl Future<Output = Result<UsageState, StoreError>> + Send {
        (**self).load()
    }

    fn save_used(&self, used: u32) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).save_used(used)
    }

    fn subscribe(&self) -> watch::Receiver<UsageState> {
        (**self).subscribe()
    }
}

/// In-memory [`PrefStore`], the default backing for the CLI and tests.
pub struct MemoryPrefStore {
    tx: watch::Sender<UsageState>,
}

impl MemoryPrefStore {
    #[must_use]
    pub fn new(initial: UsageState) -> Self {
        let (tx, _) = watch::channel(initial);
        MemoryPrefStore { tx }
    }

    /// Current state without going through the async trait surface.
    #[must_use]
    pub fn current(&self) -> UsageState {
        *self.tx.borrow()
    }
}

impl Default for MemoryPrefStore {
    fn default() -> Self {
        Self::new(UsageState::default())
    }
}

impl PrefStore for MemoryPrefStore {
    async fn load(&self) -> Result<UsageState, StoreError> {
        Ok(*self.tx.borrow())
    }

    async fn save_used(&self, used: u32) -> Result<(), StoreError> {
        self.tx.send_modify(|state| state.used = used);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<UsageState> {
        self.tx.subscribe()
    }
}
