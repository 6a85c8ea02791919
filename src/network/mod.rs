//! Network Module
//!
//! Device connections and command dispatch.
//!
//! ## Model
//! - One blocking connection per request, never shared
//! - Strict request/reply: one command in flight at a time
//! - Every read and write bounded by the configured timeout

mod connection;
mod dispatcher;
mod transport;

pub use connection::{Connection, ConnectionState};
pub use dispatcher::CommandExecutor;
