//! # Tasklist Runtime
//!
//! Runtime implementation for the tasklist reducer architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that owns state and executes effects
//! - **Effect Executor**: Runs effect descriptions in order and feeds actions back to the reducer
//! - **Change Notification**: A revision counter observers watch to know when to re-read state
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action; returns once the reducer ran and every effect finished
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

/// Metric names and descriptions emitted by the Store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for in-flight actions to complete
        #[error("Shutdown timed out with {0} actions still in flight")]
        ShutdownTimeout(usize),
    }
}

pub use error::StoreError;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tasklist_core::effect::Effect;
use tasklist_core::reducer::Reducer;
use tokio::sync::RwLock;

/// Decrements the in-flight counter when a `send` finishes, even on panic
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store implementation
pub mod store {
    use super::{Arc, AtomicUsize, Effect, InFlightGuard, Ordering, Reducer, RwLock, StoreError};
    use crate::metrics as names;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use tokio::sync::watch;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for shared access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    /// 5. Change notification (revision counter)
    ///
    /// # Execution Model
    ///
    /// `send()` is synchronous from the caller's point of view: it reduces the
    /// action, awaits every returned effect in order, reduces any actions
    /// those effects feed back, and only then returns. Nothing is spawned, so
    /// once `send()` returns all side effects of the action have happened.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(TodoState::default(), TodoReducer::new(), env);
    ///
    /// store.send(TodoAction::AddItem).await?;
    /// ```
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        shutdown: Arc<AtomicBool>,
        in_flight: Arc<AtomicUsize>,
        /// Incremented after every reduction; observers re-read state on change.
        revision: Arc<watch::Sender<u64>>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                shutdown: Arc::clone(&self.shutdown),
                in_flight: Arc::clone(&self.in_flight),
                revision: Arc::clone(&self.revision),
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// # Arguments
        ///
        /// - `initial_state`: The starting state for the store
        /// - `reducer`: The reducer implementation (business logic)
        /// - `environment`: Injected dependencies
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (revision, _) = watch::channel(0);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                shutdown: Arc::new(AtomicBool::new(false)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                revision: Arc::new(revision),
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Releases the lock and bumps the revision
        /// 4. Awaits the returned effects in order
        /// 5. Repeats for every action the effects produced
        ///
        /// Feedback actions are queued and reduced after the effects of the
        /// action that produced them have finished.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            // Counted before the flag check so `shutdown` never misses this send
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            let _guard = InFlightGuard(Arc::clone(&self.in_flight));

            if self.shutdown.load(Ordering::SeqCst) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!(names::SHUTDOWN_REJECTED).increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            let mut queue = VecDeque::from([action]);
            let mut reductions = 0_usize;

            while let Some(action) = queue.pop_front() {
                metrics::counter!(names::ACTIONS_TOTAL).increment(1);

                let effects = {
                    let mut state = self.state.write().await;
                    tracing::trace!("Acquired write lock on state");
                    self.reducer.reduce(&mut *state, action, &self.environment)
                };
                reductions += 1;
                self.revision.send_modify(|revision| *revision += 1);

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                self.execute_effects(effects, &mut queue).await;
            }

            tracing::debug!(reductions, "Action processing completed");
            Ok(())
        }

        /// Execute effects in order, collecting feedback actions into `feedback`
        async fn execute_effects<I>(&self, effects: I, feedback: &mut VecDeque<A>)
        where
            I: IntoIterator<Item = Effect<A>>,
        {
            let mut pending: VecDeque<Effect<A>> = effects.into_iter().collect();

            while let Some(effect) = pending.pop_front() {
                match effect {
                    Effect::None => {
                        tracing::trace!("Executing Effect::None (no-op)");
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "none").increment(1);
                    },
                    Effect::Sequential(effects) => {
                        tracing::trace!("Expanding Effect::Sequential with {} effects", effects.len());
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "sequential")
                            .increment(1);
                        for effect in effects.into_iter().rev() {
                            pending.push_front(effect);
                        }
                    },
                    Effect::Future(fut) => {
                        tracing::trace!("Executing Effect::Future");
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "future").increment(1);
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, queueing for reducer");
                            feedback.push_back(action);
                        }
                    },
                }
            }
        }

        /// Read current state via a closure
        ///
        /// Access state through a closure to ensure the lock is released promptly:
        ///
        /// ```ignore
        /// let count = store.state(|s| s.items.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to change notifications
        ///
        /// The receiver holds a revision number that increases after every
        /// reduction. Use [`watch::Receiver::changed`] or
        /// [`watch::Receiver::has_changed`] to learn when to re-read state.
        #[must_use]
        pub fn subscribe(&self) -> watch::Receiver<u64> {
            self.revision.subscribe()
        }

        /// Current revision number
        #[must_use]
        pub fn revision(&self) -> u64 {
            *self.revision.borrow()
        }

        /// Returns `true` once [`Store::shutdown`] has been called
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new actions)
        /// 2. Waits for in-flight `send()` calls to complete (with timeout)
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
        /// every in-flight action finished.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::SeqCst);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.in_flight.load(Ordering::SeqCst);

                if pending == 0 {
                    tracing::info!("No actions in flight, shutdown complete");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending, "Shutdown timeout: {} actions still in flight", pending);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tasklist_core::{smallvec, SmallVec};

    #[derive(Debug, Clone, Default)]
    struct TestState {
        log: Vec<String>,
    }

    #[derive(Debug, Clone)]
    enum TestAction {
        Record(String),
        RecordTwiceViaFeedback(String),
        Chain,
        Stall(Duration),
    }

    #[derive(Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Record(entry) => {
                    state.log.push(entry);
                    smallvec![Effect::None]
                },
                TestAction::RecordTwiceViaFeedback(entry) => {
                    state.log.push(entry.clone());
                    smallvec![Effect::future(async move {
                        Some(TestAction::Record(format!("{entry}-again")))
                    })]
                },
                TestAction::Chain => {
                    smallvec![Effect::chain(vec![
                        Effect::future(async { Some(TestAction::Record("first".to_string())) }),
                        Effect::chain(vec![Effect::future(async {
                            Some(TestAction::Record("second".to_string()))
                        })]),
                        Effect::future(async { Some(TestAction::Record("third".to_string())) }),
                    ])]
                },
                TestAction::Stall(duration) => {
                    smallvec![Effect::future(async move {
                        tokio::time::sleep(duration).await;
                        None
                    })]
                },
            }
        }
    }

    fn store() -> Store<TestState, TestAction, (), TestReducer> {
        Store::new(TestState::default(), TestReducer, ())
    }

    #[tokio::test]
    async fn feedback_actions_are_reduced_before_send_returns() {
        let store = store();

        let result = store
            .send(TestAction::RecordTwiceViaFeedback("milk".to_string()))
            .await;

        assert!(result.is_ok());
        let log = store.state(|s| s.log.clone()).await;
        assert_eq!(log, vec!["milk".to_string(), "milk-again".to_string()]);
    }

    #[tokio::test]
    async fn sequential_effects_run_in_order() {
        let store = store();

        let _ = store.send(TestAction::Chain).await;

        let log = store.state(|s| s.log.clone()).await;
        assert_eq!(log, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn revision_increments_for_every_reduction() {
        let store = store();
        let mut changes = store.subscribe();
        assert_eq!(store.revision(), 0);

        let _ = store.send(TestAction::Record("a".to_string())).await;
        assert!(changes.has_changed().unwrap_or(false));
        assert_eq!(*changes.borrow_and_update(), 1);

        // Original action plus one feedback action
        let _ = store
            .send(TestAction::RecordTwiceViaFeedback("b".to_string()))
            .await;
        assert_eq!(*changes.borrow_and_update(), 3);
        assert_eq!(store.revision(), 3);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_actions() {
        let store = store();
        let _ = store.send(TestAction::Record("before".to_string())).await;

        let result = store.shutdown(Duration::from_secs(1)).await;
        assert!(result.is_ok());
        assert!(store.is_shutting_down());

        let rejected = store.send(TestAction::Record("after".to_string())).await;
        assert!(matches!(rejected, Err(StoreError::ShutdownInProgress)));
        let log = store.state(|s| s.log.clone()).await;
        assert_eq!(log, vec!["before"]);
    }

    #[tokio::test]
    async fn rejected_sends_are_not_left_in_flight() {
        let store = store();
        assert!(store.shutdown(Duration::from_secs(1)).await.is_ok());

        for _ in 0..3 {
            let rejected = store.send(TestAction::Record("late".to_string())).await;
            assert!(matches!(rejected, Err(StoreError::ShutdownInProgress)));
        }

        // A second shutdown with no grace period sees nothing pending
        assert!(store.shutdown(Duration::ZERO).await.is_ok());
    }

    #[tokio::test]
    async fn shutdown_waits_for_in_flight_actions() {
        let store = store();
        let sender = store.clone();
        let handle = tokio::spawn(async move {
            sender
                .send(TestAction::Stall(Duration::from_millis(50)))
                .await
        });

        // Let the spawned send start
        tokio::time::sleep(Duration::from_millis(10)).await;
        let result = store.shutdown(Duration::from_secs(5)).await;
        assert!(result.is_ok());
        assert!(matches!(handle.await, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn shutdown_times_out_on_stalled_action() {
        let store = store();
        let sender = store.clone();
        let handle = tokio::spawn(async move {
            sender.send(TestAction::Stall(Duration::from_secs(2))).await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        let result = store.shutdown(Duration::from_millis(30)).await;
        assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));
        handle.abort();
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = store();
        let other = store.clone();

        let _ = other.send(TestAction::Record("shared".to_string())).await;

        let log = store.state(|s| s.log.clone()).await;
        assert_eq!(log, vec!["shared"]);
    }
}
