//! # Tasklist Testing
//!
//! Testing utilities and helpers for the tasklist reducer architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Helpers that execute effect descriptions outside a Store
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_testing::{mocks::InMemoryStore, SequentialIds};
//!
//! #[tokio::test]
//! async fn add_persists_items() {
//!     let kv = Arc::new(InMemoryStore::new());
//!     let env = TodoEnvironment::new(Arc::new(SequentialIds::new()), kv.clone());
//!     let store = Store::new(TodoState::default(), TodoReducer::new(), env);
//!
//!     store.send(TodoAction::SetDraftText { text: "Buy milk".into() }).await?;
//!     store.send(TodoAction::AddItem).await?;
//!
//!     assert!(kv.contains("todoItems"));
//! }
//! ```

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};
    use tasklist_core::Uuid;
    use tasklist_core::environment::IdGenerator;
    use tasklist_core::kv::{KeyValueStore, KvError};

    /// Deterministic id generator for tests
    ///
    /// Produces `00000000-0000-0000-0000-000000000001`, `...0002`, and so on.
    ///
    /// # Example
    ///
    /// ```
    /// use tasklist_testing::mocks::SequentialIds;
    /// use tasklist_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIds::new();
    /// assert_eq!(ids.next_id().as_u128(), 1);
    /// assert_eq!(ids.next_id().as_u128(), 2);
    /// ```
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Create a generator whose first id is `1`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }

        /// The id that was handed out `n`-th (1-based)
        #[must_use]
        pub const fn nth(n: u64) -> Uuid {
            Uuid::from_u128(n as u128)
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> Uuid {
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            Self::nth(n)
        }
    }

    /// In-memory key-value store
    ///
    /// Counts successful writes so tests can assert when persistence happened.
    #[derive(Debug, Default)]
    pub struct InMemoryStore {
        values: Mutex<HashMap<String, Vec<u8>>>,
        writes: AtomicUsize,
    }

    impl InMemoryStore {
        /// Create an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store pre-populated with UTF-8 values
        #[must_use]
        pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
            let values = values
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.as_bytes().to_vec()))
                .collect();
            Self {
                values: Mutex::new(values),
                writes: AtomicUsize::new(0),
            }
        }

        /// Returns `true` if a value is stored under `key`
        #[must_use]
        pub fn contains(&self, key: &str) -> bool {
            self.values
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(key)
        }

        /// The value under `key` decoded as UTF-8 (lossy)
        #[must_use]
        pub fn get_string(&self, key: &str) -> Option<String> {
            self.values
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        }

        /// Number of successful `set` calls so far
        #[must_use]
        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStore for InMemoryStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
            Ok(self
                .values
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .cloned())
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
            self.values
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.to_string(), value.to_vec());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Key-value store whose writes always fail
    ///
    /// Reads report an empty store. Attempted writes are counted.
    #[derive(Debug, Default)]
    pub struct FailingStore {
        attempts: AtomicUsize,
    }

    impl FailingStore {
        /// Create a failing store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of `set` calls attempted so far
        #[must_use]
        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, KvError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &[u8]) -> Result<(), KvError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(KvError::Unavailable(format!("write to {key} refused")))
        }
    }
}

/// Helpers for executing effect descriptions without a Store
pub mod helpers {
    use tasklist_core::effect::Effect;

    /// Execute effects in order and collect the actions they feed back
    ///
    /// Mirrors the Store's execution order but does not reduce the returned
    /// actions, so tests can inspect them.
    pub async fn run_effects<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut pending: Vec<Effect<A>> = effects.into_iter().collect();
        pending.reverse();
        let mut feedback = Vec::new();

        while let Some(effect) = pending.pop() {
            match effect {
                Effect::None => {},
                Effect::Sequential(effects) => pending.extend(effects.into_iter().rev()),
                Effect::Future(fut) => {
                    if let Some(action) = fut.await {
                        feedback.push(action);
                    }
                },
            }
        }

        feedback
    }

    /// Blocking variant of [`run_effects`] for synchronous tests
    pub fn block_on_effects<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        futures::executor::block_on(run_effects(effects))
    }
}

// Re-export commonly used items
pub use mocks::{FailingStore, InMemoryStore, SequentialIds};
