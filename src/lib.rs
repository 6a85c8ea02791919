//! # rosgate
//!
//! A RouterOS API client for ISP administration backends:
//! - Variable-length word codec and sentence framing
//! - Plain TCP or TLS connections with bounded timeouts
//! - Single-step login and request/reply command dispatch
//! - A fixed registry of actions behind a read-only safety policy
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 HTTP layer (collaborator)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ JSON request
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Service                                │
//! │        (credentials check, plan, connect, respond)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Registry   │ ───────▶ │ Connection  │
//!   │  (Plans)    │   cmd    │ (Dispatch)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Protocol   │
//!                           │ (Sentences) │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod registry;
pub mod service;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, Result, RosgateError};
pub use config::Config;
pub use network::{CommandExecutor, Connection, ConnectionState};
pub use registry::{Action, Params, Plan};
pub use service::{DeviceRequest, ServiceResponse};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rosgate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
