//! Command Registry
//!
//! Maps named actions to raw command sentences and enforces the safety
//! policy.
//!
//! ## Flow
//! ```text
//!   action name + params
//!          │
//!          ▼
//!   Plan::from_name ──── validation / whitelist (no I/O)
//!          │
//!          ▼
//!   Plan::execute ────── CommandExecutor::cmd, one round per sentence
//! ```

mod action;
mod params;
mod plan;
mod safety;

pub use action::Action;
pub use params::Params;
pub use plan::{Plan, SecretRef, DEFAULT_PPP_SERVICE};
pub use safety::{
    argument_words, check_run_command, check_secret_name, READ_VERBS, RUN_WHITELIST,
};
