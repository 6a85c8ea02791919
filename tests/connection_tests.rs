//! Tests for Connection and the command dispatcher
//!
//! These tests verify:
//! - Login handshake success and failure
//! - Reply collection until `!done`
//! - `!trap` handling mid-stream
//! - Teardown on every error path
//! - Timeouts and refused connections

mod common;

use std::net::TcpListener;

use common::{login_ok, round, MockDevice};
use rosgate::{Config, Connection, ConnectionState, ErrorKind, RosgateError};

// =============================================================================
// Helper Functions
// =============================================================================

fn config(port: u16) -> Config {
    Config::builder().port(port).timeout_secs(2).build()
}

fn connect(device: &MockDevice) -> Connection {
    Connection::connect("127.0.0.1", &config(device.port())).unwrap()
}

// =============================================================================
// Login Tests
// =============================================================================

#[test]
fn test_login_success() {
    let mut device = MockDevice::spawn(vec![login_ok()]);
    let mut conn = connect(&device);
    assert_eq!(conn.state(), ConnectionState::Connected);
    assert!(!conn.is_tls());

    conn.login("admin", "secret").unwrap();
    assert!(conn.is_authenticated());
    assert_eq!(conn.state(), ConnectionState::Authenticated);

    conn.disconnect();
    assert_eq!(
        device.received(),
        vec![vec!["/login", "=name=admin", "=password=secret"]]
    );
}

#[test]
fn test_login_trap_is_authentication_error() {
    let mut device = MockDevice::spawn(vec![round(&[&["!trap", "=message=bad credentials"]])]);
    let mut conn = connect(&device);

    let err = conn.login("admin", "wrong").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(err.to_string().contains("bad credentials"));
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(!conn.is_connected());

    assert_eq!(device.received().len(), 1);
}

#[test]
fn test_login_closed_stream_is_authentication_error() {
    let mut device = MockDevice::spawn_then_close(vec![round(&[])]);
    let mut conn = connect(&device);

    let err = conn.login("admin", "pw").unwrap_err();
    assert!(matches!(err, RosgateError::Authentication(_)));
    device.received();
}

#[test]
fn test_login_unexpected_reply() {
    let mut device = MockDevice::spawn(vec![round(&[&["!re", "=ret=abc"]])]);
    let mut conn = connect(&device);

    let err = conn.login("admin", "pw").unwrap_err();
    assert!(matches!(err, RosgateError::Authentication(_)));
    assert!(!conn.is_connected());
    device.received();
}

#[test]
fn test_login_twice_refused() {
    let mut device = MockDevice::spawn(vec![login_ok()]);
    let mut conn = connect(&device);

    conn.login("admin", "pw").unwrap();
    assert!(matches!(conn.login("admin", "pw"), Err(RosgateError::Authentication(_))));
    conn.disconnect();
    assert_eq!(device.received().len(), 1);
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_cmd_collects_rows() {
    let mut device = MockDevice::spawn(vec![
        login_ok(),
        round(&[&["!re", "=name=eth1"], &["!re", "=name=eth2"], &["!done"]]),
    ]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();

    let rows = conn.cmd(&["/interface/print"]).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "eth1");
    assert_eq!(rows[1]["name"], "eth2");
    assert_eq!(rows[0].len(), 1);
    assert_eq!(conn.state(), ConnectionState::Authenticated);

    conn.disconnect();
    assert_eq!(device.received()[1], vec!["/interface/print"]);
}

#[test]
fn test_cmd_trap_mid_stream() {
    let mut device = MockDevice::spawn(vec![
        login_ok(),
        round(&[&["!re", "=name=eth1"], &["!trap", "=message=timeout"]]),
    ]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();

    let err = conn.cmd(&["/interface/print"]).unwrap_err();
    match err {
        RosgateError::Protocol(message) => assert_eq!(message, "timeout"),
        other => panic!("expected protocol error, got {other:?}"),
    }
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    device.received();
}

#[test]
fn test_cmd_trap_without_message() {
    let mut device = MockDevice::spawn(vec![login_ok(), round(&[&["!trap"]])]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();

    let err = conn.cmd(&["/ppp/secret/add"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("unknown device error"));
    device.received();
}

#[test]
fn test_cmd_fatal() {
    let mut device = MockDevice::spawn(vec![login_ok(), round(&[&["!fatal", "session terminated"]])]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();

    let err = conn.cmd(&["/log/print"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("session terminated"));
    device.received();
}

#[test]
fn test_cmd_before_login_sends_nothing() {
    let mut device = MockDevice::spawn(vec![]);
    let mut conn = connect(&device);

    let err = conn.cmd(&["/interface/print"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);

    conn.disconnect();
    assert!(device.received().is_empty());
}

#[test]
fn test_cmd_after_disconnect_refused() {
    let mut device = MockDevice::spawn(vec![login_ok()]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();
    conn.disconnect();
    conn.disconnect();

    assert!(conn.cmd(&["/interface/print"]).is_err());
    assert_eq!(device.received().len(), 1);
}

#[test]
fn test_cmd_skips_empty_sentences() {
    let mut device = MockDevice::spawn(vec![
        login_ok(),
        round(&[&["!re", "=name=a"], &[], &["!re", "=name=b"], &["!done"]]),
    ]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();

    let rows = conn.cmd(&["/interface/print"]).unwrap();
    assert_eq!(rows.len(), 2);
    conn.disconnect();
    device.received();
}

#[test]
fn test_cmd_stream_end_returns_rows_so_far() {
    let mut device = MockDevice::spawn_then_close(vec![
        login_ok(),
        round(&[&["!re", "=name=eth1"]]),
    ]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();

    let rows = conn.cmd(&["/interface/print"]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "eth1");
    device.received();
}

#[test]
fn test_cmd_after_stream_end_is_refused() {
    let mut device = MockDevice::spawn_then_close(vec![
        login_ok(),
        round(&[&["!re", "=name=eth1"]]),
    ]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();

    let rows = conn.cmd(&["/interface/print"]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(!conn.is_connected());

    let err = conn.cmd(&["/system/resource/print"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(device.received().len(), 2);
}

#[test]
fn test_cmd_keeps_rows_with_unknown_marker() {
    let mut device = MockDevice::spawn(vec![
        login_ok(),
        round(&[&["!foo", "=a=1"], &["!re", "=a=2"], &["!done"]]),
    ]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();

    let rows = conn.cmd(&["/interface/print"]).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["a"], "1");
    assert_eq!(rows[0].len(), 1);
    assert_eq!(rows[1]["a"], "2");
    assert_eq!(conn.state(), ConnectionState::Authenticated);

    conn.disconnect();
    device.received();
}

#[test]
fn test_sequential_commands_on_one_connection() {
    let mut device = MockDevice::spawn(vec![
        login_ok(),
        round(&[&["!re", "=name=core"], &["!done"]]),
        round(&[&["!re", "=version=7.14", "=cpu-load=2"], &["!done"]]),
    ]);
    let mut conn = connect(&device);
    conn.login("admin", "pw").unwrap();

    let identity = conn.cmd(&["/system/identity/print"]).unwrap();
    let resource = conn.cmd(&["/system/resource/print"]).unwrap();
    assert_eq!(identity[0]["name"], "core");
    assert_eq!(resource[0]["cpu-load"], "2");

    conn.disconnect();
    let received = device.received();
    assert_eq!(received.len(), 3);
    assert_eq!(received[2], vec!["/system/resource/print"]);
}

// =============================================================================
// Transport Tests
// =============================================================================

#[test]
fn test_read_timeout_is_connection_error() {
    let mut device = MockDevice::spawn(vec![round(&[])]);
    let cfg = Config::builder().port(device.port()).timeout_secs(1).build();
    let mut conn = Connection::connect("127.0.0.1", &cfg).unwrap();

    let err = conn.login("admin", "pw").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.to_string().contains("timed out"));
    assert!(!conn.is_connected());
    device.received();
}

#[test]
fn test_refused_connection() {
    let port = {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = match Connection::connect("127.0.0.1", &config(port)) {
        Ok(_) => panic!("connect to a closed port succeeded"),
        Err(e) => e,
    };
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.to_string().contains(&port.to_string()));
}

#[test]
fn test_tls_against_plain_device_fails_at_connect() {
    let mut device = MockDevice::spawn(vec![]);
    let cfg = Config::builder()
        .port(device.port())
        .timeout_secs(1)
        .tls(true)
        .tls_verify(false)
        .build();

    let err = match Connection::connect("127.0.0.1", &cfg) {
        Ok(_) => panic!("TLS handshake with a plain socket succeeded"),
        Err(e) => e,
    };
    assert_eq!(err.kind(), ErrorKind::Connection);
    device.received();
}
