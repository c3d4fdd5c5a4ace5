//! Lifecycle controller for one remote call kind.
//!
//! An [`AsyncTask`] wraps whatever future the caller hands to
//! [`AsyncTask::run`] and exposes the call's progress as a [`TaskState`].
//! Failures are captured into the state and never returned to the caller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Observable state of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskState<T> {
    /// Result of the most recent successful settlement, kept across failures.
    pub data: Option<T>,
    /// Whether a call is in flight.
    pub loading: bool,
    /// Message of the most recent failure; cleared when a new call starts.
    pub error: Option<String>,
}

impl<T> Default for TaskState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Coarse phase derived from a [`TaskState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    /// No call has been issued.
    Idle,
    /// A call is in flight.
    Pending,
    /// The last settlement succeeded.
    Succeeded,
    /// The last settlement failed.
    Failed,
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// How settlements of overlapping calls are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlePolicy {
    /// Every settlement is applied; the one that settles last wins, even if
    /// it was issued first. The first settlement clears `loading`.
    #[default]
    LastSettled,
    /// Settlements from calls older than the newest issued call are discarded.
    LatestIssued,
}

struct Inner<T> {
    state: watch::Sender<TaskState<T>>,
    issued: AtomicU64,
    policy: SettlePolicy,
}

/// Controller for one action's remote call lifecycle.
///
/// Cloning is cheap and clones share state, so a clone can be moved into a
/// spawned future while another is kept for observation.
///
/// # Examples
///
/// ```
/// use der_microgrid::task::{AsyncTask, TaskPhase};
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let task: AsyncTask<u32> = AsyncTask::new();
/// let call = task.run(async { Err::<u32, _>("timeout") });
/// assert_eq!(task.phase(), TaskPhase::Pending);
/// call.await;
/// let state = task.state();
/// assert_eq!(state.error.as_deref(), Some("timeout"));
/// assert_eq!(task.phase(), TaskPhase::Failed);
/// # });
/// ```
pub struct AsyncTask<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for AsyncTask<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for AsyncTask<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AsyncTask<T> {
    /// Creates an idle task with [`SettlePolicy::LastSettled`].
    pub fn new() -> Self {
        Self::with_policy(SettlePolicy::default())
    }

    /// Creates an idle task with the given settle policy.
    pub fn with_policy(policy: SettlePolicy) -> Self {
        let (state, _) = watch::channel(TaskState::default());
        Self {
            inner: Arc::new(Inner {
                state,
                issued: AtomicU64::new(0),
                policy,
            }),
        }
    }

    /// Settle policy this task was created with.
    pub fn policy(&self) -> SettlePolicy {
        self.inner.policy
    }

    /// Number of calls issued through [`AsyncTask::run`].
    pub fn generation(&self) -> u64 {
        self.inner.issued.load(Ordering::SeqCst)
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<TaskState<T>> {
        self.inner.state.subscribe()
    }

    /// Current phase.
    pub fn phase(&self) -> TaskPhase {
        let state = self.inner.state.borrow();
        if state.loading {
            TaskPhase::Pending
        } else if state.error.is_some() {
            TaskPhase::Failed
        } else if self.generation() == 0 {
            TaskPhase::Idle
        } else {
            TaskPhase::Succeeded
        }
    }

    /// Whether a call is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Issues `call` and returns the future that records its outcome.
    ///
    /// Issuing happens here, before anything is awaited: the call takes the
    /// next generation, the task is marked loading and any previous error is
    /// cleared. Awaiting the returned future drives `call`; on `Ok` the
    /// value replaces `data`, on `Err` the error's `Display` text is stored
    /// and `data` is left as it was. The error is never returned.
    ///
    /// Concurrent calls are not rejected or queued. Under
    /// [`SettlePolicy::LastSettled`] whichever settles last determines the
    /// final state. Under [`SettlePolicy::LatestIssued`] only the most
    /// recently issued call may settle, regardless of await order.
    pub fn run<F, E>(&self, call: F) -> impl Future<Output = ()> + use<T, F, E>
    where
        F: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let generation = self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        let inner = Arc::clone(&self.inner);

        async move {
            let outcome = call.await;
            if inner.is_stale(generation) {
                return;
            }
            inner.state.send_modify(|s| {
                match outcome {
                    Ok(value) => {
                        s.data = Some(value);
                        s.error = None;
                    }
                    Err(err) => s.error = Some(err.to_string()),
                }
                s.loading = false;
            });
        }
    }
}

impl<T> Inner<T> {
    fn is_stale(&self, generation: u64) -> bool {
        self.policy == SettlePolicy::LatestIssued
            && generation != self.issued.load(Ordering::SeqCst)
    }
}

impl<T: Clone> AsyncTask<T> {
    /// Snapshot of the current state.
    pub fn state(&self) -> TaskState<T> {
        self.inner.state.borrow().clone()
    }

    /// Result of the most recent successful settlement.
    pub fn data(&self) -> Option<T> {
        self.inner.state.borrow().data.clone()
    }

    /// Message of the most recent failure, if the task is failed.
    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }
}

impl<T> fmt::Debug for AsyncTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTask")
            .field("phase", &self.phase())
            .field("generation", &self.generation())
            .field("policy", &self.inner.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tokio::sync::oneshot;

    use super::*;

    type Reply = Result<Value, String>;

    /// A call that settles when the returned sender fires.
    fn gated() -> (oneshot::Sender<Reply>, impl Future<Output = Reply>) {
        let (tx, rx) = oneshot::channel::<Reply>();
        let fut = async move { rx.await.unwrap_or_else(|_| Err("dropped".to_string())) };
        (tx, fut)
    }

    #[tokio::test]
    async fn starts_idle() {
        let task: AsyncTask<Value> = AsyncTask::new();
        assert_eq!(task.phase(), TaskPhase::Idle);
        assert_eq!(task.state(), TaskState::default());
        assert_eq!(task.generation(), 0);
    }

    #[tokio::test]
    async fn success_stores_data_and_clears_loading() {
        let task = AsyncTask::new();
        task.run(async { Ok::<_, String>(json!({"x": 1})) }).await;

        let s = task.state();
        assert_eq!(s.data, Some(json!({"x": 1})));
        assert_eq!(s.error, None);
        assert!(!s.loading);
        assert_eq!(task.phase(), TaskPhase::Succeeded);
    }

    #[tokio::test]
    async fn failure_keeps_prior_data() {
        let task = AsyncTask::new();
        task.run(async { Ok::<_, String>(json!({"x": 1})) }).await;
        task.run(async { Err::<Value, _>("timeout".to_string()) }).await;

        let s = task.state();
        assert_eq!(s.error.as_deref(), Some("timeout"));
        assert!(!s.loading);
        assert_eq!(s.data, Some(json!({"x": 1})));
        assert_eq!(task.phase(), TaskPhase::Failed);
    }

    #[tokio::test]
    async fn failure_on_fresh_task_leaves_data_empty() {
        let task: AsyncTask<Value> = AsyncTask::new();
        task.run(async { Err::<Value, _>("timeout") }).await;
        assert_eq!(task.data(), None);
        assert_eq!(task.error().as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn pending_clears_error_but_keeps_data() {
        let task = AsyncTask::new();
        task.run(async { Ok::<_, String>(json!(1)) }).await;
        task.run(async { Err::<Value, _>("boom".to_string()) }).await;

        let (tx, call) = gated();
        let pending = task.run(call);

        let s = task.state();
        assert!(s.loading);
        assert_eq!(s.error, None);
        assert_eq!(s.data, Some(json!(1)));
        assert_eq!(task.phase(), TaskPhase::Pending);

        tx.send(Ok(json!(2))).expect("call should be waiting");
        pending.await;
        assert_eq!(task.data(), Some(json!(2)));
    }

    #[tokio::test]
    async fn issuing_is_immediate_and_spawnable() {
        let task: AsyncTask<Value> = AsyncTask::new();
        let (tx, call) = gated();

        let handle = tokio::spawn(task.run(call));
        assert_eq!(task.generation(), 1);
        assert!(task.is_loading());

        tx.send(Ok(json!("done"))).expect("call should be waiting");
        handle.await.expect("settle should not panic");
        assert_eq!(task.phase(), TaskPhase::Succeeded);
    }

    #[tokio::test]
    async fn last_settled_wins_when_second_issued_settles_first() {
        let task = AsyncTask::new();
        let (first_tx, first) = gated();
        let (second_tx, second) = gated();

        let mut rx = task.subscribe();

        let run_first = task.run(first);
        let run_second = task.run(second);
        let settle = async {
            tokio::task::yield_now().await;
            second_tx.send(Ok(json!("second"))).expect("second call should be waiting");
            rx.wait_for(|s| s.data.is_some()).await.expect("task should be alive");
            first_tx.send(Ok(json!("first"))).expect("first call should be waiting");
        };
        tokio::join!(run_first, run_second, settle);

        assert_eq!(task.data(), Some(json!("first")));
        assert!(!task.is_loading());
        assert_eq!(task.generation(), 2);
    }

    #[tokio::test]
    async fn first_settlement_clears_loading_under_last_settled() {
        let task = AsyncTask::new();
        let (first_tx, first) = gated();
        let (second_tx, second) = gated();

        let a = tokio::spawn(task.run(first));
        let b = tokio::spawn(task.run(second));

        second_tx.send(Ok(json!("second"))).expect("second call should be waiting");
        b.await.expect("second settle should not panic");
        assert!(!task.is_loading(), "loading cleared though first call is outstanding");

        first_tx.send(Err("late failure".to_string())).expect("first call should be waiting");
        a.await.expect("first settle should not panic");
        assert_eq!(task.error().as_deref(), Some("late failure"));
        assert_eq!(task.data(), Some(json!("second")));
    }

    #[tokio::test]
    async fn latest_issued_discards_stale_settlement() {
        let task = AsyncTask::with_policy(SettlePolicy::LatestIssued);
        let (first_tx, first) = gated();
        let (second_tx, second) = gated();

        let mut rx = task.subscribe();

        let run_first = task.run(first);
        let run_second = task.run(second);
        let settle = async {
            tokio::task::yield_now().await;
            second_tx.send(Ok(json!("second"))).expect("second call should be waiting");
            rx.wait_for(|s| s.data.is_some()).await.expect("task should be alive");
            first_tx.send(Ok(json!("first"))).expect("first call should be waiting");
        };
        tokio::join!(run_first, run_second, settle);

        assert_eq!(task.data(), Some(json!("second")));
        assert!(!task.is_loading());
    }

    #[tokio::test]
    async fn latest_issued_follows_issue_order_not_await_order() {
        let task = AsyncTask::with_policy(SettlePolicy::LatestIssued);
        let older = task.run(async { Ok::<_, String>(json!("older")) });
        let newer = task.run(async { Ok::<_, String>(json!("newer")) });

        newer.await;
        older.await;

        assert_eq!(task.data(), Some(json!("newer")));
        assert!(!task.is_loading());
    }

    #[tokio::test]
    async fn last_settled_follows_await_order() {
        let task = AsyncTask::new();
        let older = task.run(async { Ok::<_, String>(json!("older")) });
        let newer = task.run(async { Ok::<_, String>(json!("newer")) });

        newer.await;
        older.await;

        assert_eq!(task.data(), Some(json!("older")));
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let task = AsyncTask::new();
        let mut rx = task.subscribe();
        task.run(async { Ok::<_, String>(json!(5)) }).await;

        assert!(rx.has_changed().expect("task should be alive"));
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.data, Some(json!(5)));
    }
}
