//! # Authflow Runtime
//!
//! Runtime implementation for the authflow architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back
//!   into the reducer
//! - **Retry**: Exponential backoff for chained remote steps
//!
//! ## Example
//!
//! ```ignore
//! use authflow_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```
//!
//! ## Hard failures
//!
//! Recoverable failures travel through the action feedback loop. An
//! [`InvariantViolation`](authflow_core::invariant::InvariantViolation)
//! produced by an effect poisons the store: it is logged at error level and
//! every subsequent `send` fails with [`StoreError::Invariant`]. This is the
//! only failure mode that escapes the reducer boundary.

use authflow_core::effect::Effect;
use authflow_core::invariant::InvariantViolation;
use authflow_core::reducer::Reducer;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};

/// Retry logic with exponential backoff
pub mod retry;

/// Error types for the Store runtime
pub mod error {
    use authflow_core::invariant::InvariantViolation;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,

        /// The store observed a broken programming invariant
        ///
        /// The store is poisoned; no further actions are accepted. This is
        /// the hard failure required for unrecoverable contract mismatches
        /// (e.g. an undeclared remote status code).
        #[error(transparent)]
        Invariant(#[from] InvariantViolation),
    }
}

pub use error::StoreError;

/// The Store - runtime coordinator for a reducer
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (transition logic)
/// 3. Environment (injected dependencies)
/// 4. Effect execution (with action feedback loop)
///
/// # Concurrency
///
/// The reducer executes synchronously while holding a write lock, so
/// concurrent `send` calls serialize at the reducer - a single logical
/// event loop. Effects execute in spawned tasks and may complete in any
/// order; actions they produce re-enter through `send`.
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    shutdown: Arc<AtomicBool>,
    violation: Arc<Mutex<Option<InvariantViolation>>>,
    pending_effects: Arc<AtomicUsize>,
    /// Action broadcast channel for observing actions produced by effects.
    ///
    /// All actions produced by effects (e.g., from `Effect::Future`) are
    /// broadcast to observers. This enables request-response patterns in
    /// hosts and tests.
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            shutdown: Arc::clone(&self.shutdown),
            violation: Arc::clone(&self.violation),
            pending_effects: Arc::clone(&self.pending_effects),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Sync + Clone + std::fmt::Debug + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Action broadcast capacity defaults to 16; increase with
    /// [`Store::with_broadcast_capacity`] if observers frequently lag.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new Store with custom action broadcast capacity
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            shutdown: Arc::new(AtomicBool::new(false)),
            violation: Arc::new(Mutex::new(None)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
            action_broadcast,
        }
    }

    /// Read the current state through a projection function
    pub async fn state<F, T>(&self, project: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        project(&state)
    }

    /// The invariant violation that poisoned this store, if any
    #[must_use]
    pub fn violation(&self) -> Option<InvariantViolation> {
        self.violation.lock().ok().and_then(|guard| guard.clone())
    }

    /// Send an action to the store
    ///
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Executes returned effects asynchronously
    /// 4. Effects may produce more actions (feedback loop)
    ///
    /// `send` returns after starting effect execution, not completion; use
    /// [`Store::wait_idle`] or [`Store::send_and_wait_for`] to observe effect
    /// results.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ShutdownInProgress`] if the store is shutting down
    /// - [`StoreError::Invariant`] if the store was poisoned by a broken
    ///   invariant
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<(), StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            if let Some(violation) = self.violation() {
                tracing::warn!("Rejected action: store is poisoned");
                return Err(StoreError::Invariant(violation));
            }
            tracing::warn!("Rejected action: store is shutting down");
            return Err(StoreError::ShutdownInProgress);
        }

        tracing::debug!(?action, "Processing action");
        metrics::counter!("store.actions.total").increment(1);

        let effects = {
            let mut state = self.state.write().await;

            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());

            effects
        };

        for effect in effects {
            self.spawn_effect(effect);
        }

        Ok(())
    }

    /// Send an action and wait for a matching result action
    ///
    /// Designed for request-response patterns: subscribes to the action
    /// broadcast BEFORE sending (avoiding race conditions), sends the
    /// initial action, then waits for an effect-produced action matching the
    /// predicate.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action within the timeout
    /// - [`StoreError::ChannelClosed`]: broadcast channel closed
    /// - any error from [`Store::send`]
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        // Subscribe BEFORE sending to avoid race condition
        let mut rx = self.action_broadcast.subscribe();

        self.send(action).await?;

        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Slow consumer; if the terminal action was dropped
                        // the timeout catches it.
                        tracing::warn!(skipped, "Action observer lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout)?
    }

    /// Subscribe to all actions produced by effects
    ///
    /// Initial actions sent via [`Store::send`] are not broadcast, only the
    /// actions that effects feed back.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Wait until no effects are in flight
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when the
    /// timeout expires.
    pub async fn wait_idle(&self, timeout: Duration) -> Result<(), StoreError> {
        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(10);

        loop {
            if self.pending_effects.load(Ordering::Acquire) == 0 {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(StoreError::Timeout);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Initiate graceful shutdown of the store
    ///
    /// Sets the shutdown flag (rejecting new actions), then waits for
    /// pending effects to complete.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before
    /// all pending effects complete.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        metrics::counter!("store.shutdown.initiated").increment(1);

        self.shutdown.store(true, Ordering::Release);

        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(10);

        loop {
            let pending = self.pending_effects.load(Ordering::Acquire);

            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
                return Ok(());
            }

            if start.elapsed() >= timeout {
                tracing::error!(pending_effects = pending, "Shutdown timed out");
                return Err(StoreError::ShutdownTimeout(pending));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    fn spawn_effect(&self, effect: Effect<A>) {
        if matches!(effect, Effect::None) {
            return;
        }

        self.pending_effects.fetch_add(1, Ordering::AcqRel);
        let store = self.clone();

        tokio::spawn(async move {
            store.run_effect(effect).await;
            store.pending_effects.fetch_sub(1, Ordering::AcqRel);
        });
    }

    /// Execute a single effect tree.
    ///
    /// Boxed so that `Sequential`/`Parallel` nesting can recurse.
    fn run_effect<'a>(&'a self, effect: Effect<A>) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Parallel(effects) => {
                    for nested in effects {
                        self.spawn_effect(nested);
                    }
                },
                Effect::Sequential(effects) => {
                    for nested in effects {
                        self.run_effect(nested).await;
                    }
                },
                Effect::Future(future) => match future.await {
                    Ok(Some(action)) => {
                        // Broadcast first so request-response observers see
                        // every feedback action, then re-enter the reducer.
                        let _ = self.action_broadcast.send(action.clone());

                        if let Err(error) = self.send(action).await {
                            tracing::warn!(%error, "Feedback action rejected");
                        }
                    },
                    Ok(None) => {},
                    Err(violation) => self.poison(violation),
                },
            }
        })
    }

    /// Record an invariant violation and halt the store.
    fn poison(&self, violation: InvariantViolation) {
        tracing::error!(%violation, "Invariant violation - poisoning store");
        metrics::counter!("store.invariant_violations.total").increment(1);

        if let Ok(mut guard) = self.violation.lock() {
            guard.get_or_insert(violation);
        }
        self.shutdown.store(true, Ordering::Release);
    }
}
