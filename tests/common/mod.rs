//! Shared test fixtures for integration tests.
//!
//! [`StubHost`] serves `POST /.netlify/functions/{name}` on an ephemeral
//! local port, records every request body, and answers from a per-function
//! reply table that tests can change between calls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use der_microgrid::config::GatewayConfig;

/// Path prefix the stub mounts functions under.
pub const FUNCTIONS_PATH: &str = "/.netlify/functions";

/// Canned answer for one function.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, Value),
    Text(u16, String),
}

#[derive(Default)]
struct Shared {
    calls: Mutex<Vec<(String, Value)>>,
    replies: Mutex<HashMap<String, Reply>>,
}

/// Local remote-function host for tests. Stops when dropped.
pub struct StubHost {
    pub base_url: String,
    shared: Arc<Shared>,
    server: JoinHandle<()>,
}

impl StubHost {
    /// Binds `127.0.0.1:0` and starts serving.
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let app = Router::new()
            .route("/.netlify/functions/{name}", post(invoke))
            .with_state(Arc::clone(&shared));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("stub host should bind");
        let addr = listener.local_addr().expect("stub host should have an address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            shared,
            server,
        }
    }

    /// Starts a host that answers every dashboard function successfully.
    pub async fn with_default_replies() -> Self {
        let host = Self::start().await;
        host.reply("der_microgrid_sim", Reply::Json(200, simulate_result()));
        host.reply("der_schedule_opt", Reply::Json(200, schedule_result()));
        host.reply("der_component_contrib", Reply::Json(200, breakdown_result()));
        host
    }

    /// Sets the answer for `function`.
    pub fn reply(&self, function: &str, reply: Reply) {
        self.shared
            .replies
            .lock()
            .expect("reply table lock")
            .insert(function.to_string(), reply);
    }

    /// Every `(function, body)` received so far, in arrival order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.shared.calls.lock().expect("call log lock").clone()
    }

    /// Bodies received for `function`.
    pub fn bodies_for(&self, function: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(f, _)| f == function)
            .map(|(_, body)| body)
            .collect()
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url.clone(),
            functions_path: FUNCTIONS_PATH.to_string(),
        }
    }
}

impl Drop for StubHost {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn invoke(
    State(shared): State<Arc<Shared>>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    shared
        .calls
        .lock()
        .expect("call log lock")
        .push((name.clone(), body));
    let reply = shared.replies.lock().expect("reply table lock").get(&name).cloned();
    match reply {
        Some(Reply::Json(status, value)) => (status_code(status), Json(value)).into_response(),
        Some(Reply::Text(status, text)) => (status_code(status), text).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("function {name} not found") })),
        )
            .into_response(),
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).expect("valid status code")
}

/// A two-hour simulation result.
pub fn simulate_result() -> Value {
    json!({
        "dispatch": [
            { "t": 0, "soc": 0.5, "charge": 0.0, "discharge": 10.0 },
            { "t": 1, "soc": 0.45, "charge": 0.0, "discharge": 5.0 }
        ],
        "energy_balance_cost": 12.75,
        "unmet_load_kWh": 0.0,
        "curtailment_kWh": 3.5
    })
}

/// A three-hour schedule plan.
pub fn schedule_result() -> Value {
    json!({
        "plan": [
            { "t": 0, "amount": 20.0 },
            { "t": 1, "amount": 0.0 },
            { "t": 2, "amount": -15.0 }
        ]
    })
}

pub fn breakdown_result() -> Value {
    json!({
        "contribution": {
            "solar_kWh": 180.0,
            "wind_kWh": 290.0,
            "battery_kWh": 40.0,
            "grid_kWh": 900.0
        }
    })
}
