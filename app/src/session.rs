//! Session lifecycle: load, run, flush, shut down.

use crate::persistence::load_state;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::TodoAction;
use crate::TodoStore;
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::environment::IdGenerator;
use tasklist_core::kv::{KeyValueStore, KvError};
use tasklist_runtime::Store;
use tracing::{info, warn};

/// How long `close` waits for in-flight actions
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A store loaded from persisted state
pub struct Session {
    store: TodoStore,
}

impl Session {
    /// Load persisted state from `kv` and build the store around it
    ///
    /// # Errors
    ///
    /// Returns the key-value error if a slot cannot be read.
    pub fn open(kv: Arc<dyn KeyValueStore>, ids: Arc<dyn IdGenerator>) -> Result<Self, KvError> {
        let state = load_state(kv.as_ref())?;
        let env = TodoEnvironment::new(ids, kv);
        Ok(Self {
            store: Store::new(state, TodoReducer::new(), env),
        })
    }

    /// The running store
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Write every slot once more, then stop accepting actions
    ///
    /// # Errors
    ///
    /// Returns the store error if the flush is rejected or in-flight
    /// actions outlive [`SHUTDOWN_TIMEOUT`].
    pub async fn close(self) -> Result<(), tasklist_runtime::StoreError> {
        info!("Flushing state before exit");
        self.store.send(TodoAction::Flush).await?;
        if let Some(warning) = self.store.state(|state| state.last_warning.clone()).await {
            warn!(%warning, "Final flush incomplete");
        }
        self.store.shutdown(SHUTDOWN_TIMEOUT).await
    }
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never fires.
pub async fn termination_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(error) => {
                warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use tasklist_testing::{FailingStore, InMemoryStore, SequentialIds};

    #[tokio::test]
    async fn open_loads_and_close_flushes() {
        let kv = Arc::new(InMemoryStore::with_values([("newItemText", "\"draft\"")]));
        let session = Session::open(kv.clone(), Arc::new(SequentialIds::new())).unwrap();

        let draft = session.store().state(|s| s.draft_text.clone()).await;
        assert_eq!(draft, "draft");

        session.close().await.unwrap();
        assert!(kv.contains("todoItems"));
        assert!(kv.contains("showCompleted"));
        assert_eq!(kv.get_string("newItemText").as_deref(), Some("\"draft\""));
    }

    #[tokio::test]
    async fn close_succeeds_when_writes_fail() {
        let kv = Arc::new(FailingStore::new());
        let session = Session::open(kv.clone(), Arc::new(SequentialIds::new())).unwrap();

        session.close().await.unwrap();
        assert_eq!(kv.attempts(), 3);
    }

    #[tokio::test]
    async fn earlier_warning_does_not_outlive_successful_flush() {
        let kv = Arc::new(InMemoryStore::new());
        let session = Session::open(kv.clone(), Arc::new(SequentialIds::new())).unwrap();
        let store = session.store().clone();

        store.send(TodoAction::delete_at([3])).await.unwrap();
        assert!(store.state(|s| s.last_warning.is_some()).await);

        session.close().await.unwrap();
        assert_eq!(kv.writes(), 3);
        assert_eq!(store.state(|s| s.last_warning.clone()).await, None);
    }

    #[tokio::test]
    async fn failed_flush_leaves_warning() {
        let kv = Arc::new(FailingStore::new());
        let session = Session::open(kv, Arc::new(SequentialIds::new())).unwrap();
        let store = session.store().clone();

        session.close().await.unwrap();
        let warning = store.state(|s| s.last_warning.clone()).await.unwrap();
        assert!(warning.starts_with("Could not save"));
    }

    #[tokio::test]
    async fn store_rejects_actions_after_close() {
        let kv = Arc::new(InMemoryStore::new());
        let session = Session::open(kv, Arc::new(SequentialIds::new())).unwrap();
        let store = session.store().clone();

        session.close().await.unwrap();
        assert!(store.send(TodoAction::AddItem).await.is_err());
    }
}
