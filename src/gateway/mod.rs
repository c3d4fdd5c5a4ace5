//! Named remote function invocation.
//!
//! The dispatch simulation, schedule optimization, and contribution
//! breakdown run remotely. This module only knows their names and the JSON
//! they exchange; see [`types`] for the wire shapes.

mod http;
pub mod types;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpGateway;

/// The three remote actions the dashboard can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Hour-by-hour dispatch simulation.
    Simulate,
    /// Battery schedule optimization.
    OptimizeSchedule,
    /// Per-source energy contribution breakdown.
    Breakdown,
}

impl Action {
    /// All actions in trigger order.
    pub const ALL: [Action; 3] = [Self::Simulate, Self::OptimizeSchedule, Self::Breakdown];

    /// Remote function name this action invokes.
    pub fn function_name(self) -> &'static str {
        match self {
            Self::Simulate => "der_microgrid_sim",
            Self::OptimizeSchedule => "der_schedule_opt",
            Self::Breakdown => "der_component_contrib",
        }
    }

    /// Short name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Simulate => "simulate",
            Self::OptimizeSchedule => "schedule",
            Self::Breakdown => "breakdown",
        }
    }

    /// Parses a command-line action name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure of a remote function call.
///
/// `Display` yields the message shown to the operator.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP client could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request never produced a response.
    #[error("request to `{function}` failed: {source}")]
    Transport {
        function: String,
        #[source]
        source: reqwest::Error,
    },
    /// The remote function answered with a non-success status.
    #[error("{message}")]
    Remote { status: u16, message: String },
    /// The payload could not be serialized.
    #[error("could not encode payload: {0}")]
    Encode(#[source] serde_json::Error),
    /// A success response did not carry valid JSON.
    #[error("invalid JSON from `{function}`: {source}")]
    Decode {
        function: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Invokes named remote functions.
///
/// Implementations perform no retries, no timeout, and no payload
/// validation.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Calls `function` with `payload` and returns its JSON result.
    async fn call(&self, function: &str, payload: Value) -> Result<Value, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_names_match_remote_endpoints() {
        assert_eq!(Action::Simulate.function_name(), "der_microgrid_sim");
        assert_eq!(Action::OptimizeSchedule.function_name(), "der_schedule_opt");
        assert_eq!(Action::Breakdown.function_name(), "der_component_contrib");
    }

    #[test]
    fn action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("optimize"), None);
    }

    #[test]
    fn remote_error_displays_bare_message() {
        let err = GatewayError::Remote {
            status: 504,
            message: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "timeout");
    }
}
