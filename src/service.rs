//! Request Service
//!
//! Entry point for the HTTP layer: takes one JSON request, runs it against
//! a fresh device connection and produces the JSON response.
//!
//! ## Request
//! ```json
//! { "host": "10.0.0.1", "username": "api", "password": "...",
//!   "port": 8728, "tls": false, "action": "log", "limit": 20 }
//! ```
//!
//! ## Response
//! - success: `{ "success": true, "data": ... }`
//! - failure: `{ "success": false, "error": "..." }` with a non-2xx status

use serde::Serialize;
use serde_json::Value;

use crate::config::{Config, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};
use crate::error::{Result, RosgateError};
use crate::network::Connection;
use crate::registry::{Action, Params, Plan};

/// One validated device request
#[derive(Clone)]
pub struct DeviceRequest {
    pub host: String,
    pub username: String,
    pub password: String,
    pub config: Config,
    pub action: String,

    /// Every request field, so actions see their own parameters
    pub params: Params,
}

impl std::fmt::Debug for DeviceRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRequest")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("config", &self.config)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

impl DeviceRequest {
    /// Parse a raw JSON request body
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_params(Params::from_value(value))
    }

    /// Extract connection fields; missing credentials are rejected here
    pub fn from_params(params: Params) -> Result<Self> {
        let host = params.text("host");
        let username = params.text("username");
        let password = params.raw_text("password");

        if host.is_empty() || username.is_empty() || password.is_empty() {
            return Err(RosgateError::Validation(
                "host, username and password are required".to_string(),
            ));
        }

        let port = match params.int("port") {
            0 => DEFAULT_PORT,
            p => u16::try_from(p)
                .map_err(|_| RosgateError::Validation(format!("invalid port {p}")))?,
        };
        let timeout_secs = match params.int("timeout") {
            t if t <= 0 => DEFAULT_TIMEOUT_SECS,
            t => t as u64,
        };

        let config = Config::builder()
            .port(port)
            .timeout_secs(timeout_secs)
            .tls(params.flag("tls")?.unwrap_or(false))
            .tls_verify(params.flag("tls_verify")?.unwrap_or(true))
            .build();

        let action = match params.text("action") {
            a if a.is_empty() => Action::TestConnection.name().to_string(),
            a => a,
        };

        Ok(Self {
            host,
            username,
            password,
            config,
            action,
            params,
        })
    }

    /// Validate the action before any socket is opened
    pub fn plan(&self) -> Result<Plan> {
        Plan::from_name(&self.action, &self.params)
    }
}

/// Run one request: plan, connect, log in, execute, disconnect
pub fn execute(request: &DeviceRequest) -> Result<Value> {
    let plan = request.plan()?;

    let mut conn = Connection::connect(&request.host, &request.config)?;
    conn.login(&request.username, &request.password)?;
    let result = plan.execute(&mut conn);
    conn.disconnect();

    result
}

// =============================================================================
// Responses
// =============================================================================

/// JSON body returned to the HTTP layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Success { success: bool, data: Value },
    Failure { success: bool, error: String },
}

/// Status plus body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ServiceResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            status: 200,
            body: ResponseBody::Success {
                success: true,
                data,
            },
        }
    }

    pub fn error(err: &RosgateError) -> Self {
        Self {
            status: err.status_code(),
            body: ResponseBody::Failure {
                success: false,
                error: err.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.body, ResponseBody::Success { .. })
    }

    /// Body serialized for the wire
    pub fn body_json(&self) -> String {
        serde_json::to_string(&self.body)
            .unwrap_or_else(|_| r#"{"success":false,"error":"serialization failed"}"#.to_string())
    }
}

/// Handle a raw JSON request body end to end
pub fn handle(body: &str) -> ServiceResponse {
    respond(DeviceRequest::from_json(body))
}

/// Handle an already parsed request object
pub fn handle_value(value: Value) -> ServiceResponse {
    respond(DeviceRequest::from_params(Params::from_value(value)))
}

fn respond(request: Result<DeviceRequest>) -> ServiceResponse {
    let outcome = request.and_then(|request| {
        tracing::debug!("Handling {:?}", request);
        execute(&request)
    });

    match outcome {
        Ok(data) => ServiceResponse::ok(data),
        Err(e) => {
            tracing::warn!("Request failed ({:?}): {}", e.kind(), e);
            ServiceResponse::error(&e)
        }
    }
}
