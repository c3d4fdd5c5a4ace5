//! Wires the profile snapshot, the gateway, and one task per action.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::gateway::types::{BreakdownRequest, ScheduleRequest, SimulateRequest};
use crate::gateway::{Action, GatewayError, RemoteGateway};
use crate::profile::{ProfileEdit, ProfileSnapshot};
use crate::task::{AsyncTask, SettlePolicy};

/// Operator session state.
///
/// The snapshot is replaced on every edit. Triggering an action serializes
/// the request from the snapshot current at that moment, so edits made
/// while a call is in flight do not reach it.
pub struct Dashboard {
    snapshot: ProfileSnapshot,
    gateway: Arc<dyn RemoteGateway>,
    simulation: AsyncTask<Value>,
    schedule: AsyncTask<Value>,
    breakdown: AsyncTask<Value>,
}

impl Dashboard {
    /// Creates a dashboard with idle, last-settled-wins tasks.
    pub fn new(snapshot: ProfileSnapshot, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self::with_policy(snapshot, gateway, SettlePolicy::default())
    }

    /// Creates a dashboard whose three tasks use `policy`.
    pub fn with_policy(
        snapshot: ProfileSnapshot,
        gateway: Arc<dyn RemoteGateway>,
        policy: SettlePolicy,
    ) -> Self {
        Self {
            snapshot,
            gateway,
            simulation: AsyncTask::with_policy(policy),
            schedule: AsyncTask::with_policy(policy),
            breakdown: AsyncTask::with_policy(policy),
        }
    }

    /// Current inputs.
    pub fn snapshot(&self) -> &ProfileSnapshot {
        &self.snapshot
    }

    /// Replaces the inputs with the result of applying `edit`.
    pub fn edit(&mut self, edit: ProfileEdit) {
        self.snapshot = self.snapshot.apply(edit);
    }

    /// Task tracking `action`.
    pub fn task(&self, action: Action) -> &AsyncTask<Value> {
        match action {
            Action::Simulate => &self.simulation,
            Action::OptimizeSchedule => &self.schedule,
            Action::Breakdown => &self.breakdown,
        }
    }

    /// Starts a dispatch simulation with the current inputs.
    pub fn simulate(&self) -> impl Future<Output = ()> + Send + 'static {
        self.dispatch(Action::Simulate)
    }

    /// Starts a schedule optimization with the current inputs.
    pub fn optimize_schedule(&self) -> impl Future<Output = ()> + Send + 'static {
        self.dispatch(Action::OptimizeSchedule)
    }

    /// Starts a contribution breakdown with the current inputs.
    pub fn breakdown(&self) -> impl Future<Output = ()> + Send + 'static {
        self.dispatch(Action::Breakdown)
    }

    /// Spawns `action` on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn trigger(&self, action: Action) -> JoinHandle<()> {
        tokio::spawn(self.dispatch(action))
    }

    /// Captures the request for `action` now and returns the call.
    ///
    /// The task turns pending and takes its generation before this returns,
    /// so issue order is trigger order whatever order the futures are
    /// awaited in. The returned future owns everything it needs; the
    /// outcome lands in [`Dashboard::task`] for `action`.
    pub fn dispatch(&self, action: Action) -> impl Future<Output = ()> + Send + 'static {
        let payload = request_payload(action, &self.snapshot);
        let gateway = Arc::clone(&self.gateway);
        let function = action.function_name();
        info!(%action, function, "triggering remote call");

        let call = async move {
            let result = match payload {
                Ok(body) => gateway.call(function, body).await,
                Err(err) => Err(err),
            };
            match &result {
                Ok(_) => info!(%action, function, "remote call settled"),
                Err(err) => warn!(%action, function, error = %err, "remote call failed"),
            }
            result
        };
        self.task(action).run(call)
    }
}

/// Serializes the request body for `action` from `snapshot`.
///
/// # Errors
///
/// Returns `GatewayError::Encode` if serialization fails.
pub fn request_payload(action: Action, snapshot: &ProfileSnapshot) -> Result<Value, GatewayError> {
    match action {
        Action::Simulate => encode(&SimulateRequest::from_snapshot(snapshot)),
        Action::OptimizeSchedule => encode(&ScheduleRequest::from_snapshot(snapshot)),
        Action::Breakdown => encode(&BreakdownRequest::from_snapshot(snapshot)),
    }
}

fn encode(body: &impl Serialize) -> Result<Value, GatewayError> {
    serde_json::to_value(body).map_err(GatewayError::Encode)
}
