//! Command Dispatcher
//!
//! Login handshake and the request/reply loop for one command.

use crate::error::{Result, RosgateError};
use crate::protocol::{parse_attributes, reply_message, Attributes, ReplyMarker};

use super::connection::{Connection, ConnectionState};

/// Something that can run one raw command sentence and return its rows
///
/// Implemented by [`Connection`]; the action registry only sees this trait.
pub trait CommandExecutor {
    fn cmd(&mut self, words: &[String]) -> Result<Vec<Attributes>>;
}

impl Connection {
    /// Single-step credential login
    ///
    /// The connection is closed if the device does not answer `!done`.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if self.state() != ConnectionState::Connected {
            return Err(RosgateError::Authentication(format!(
                "cannot log in from state {:?}",
                self.state()
            )));
        }

        let name = format!("=name={username}");
        let pass = format!("=password={password}");
        tracing::debug!("Logging in to {} as {}", self.peer_addr(), username);

        let result = self.login_round(&name, &pass);
        let result = self.or_disconnect(result);
        if result.is_ok() {
            self.set_state(ConnectionState::Authenticated);
        }
        result
    }

    fn login_round(&mut self, name: &str, pass: &str) -> Result<()> {
        self.send(&["/login", name, pass])?;

        let reply = self.receive()?.ok_or_else(|| {
            RosgateError::Authentication("connection closed by device".to_string())
        })?;

        match ReplyMarker::of(&reply) {
            ReplyMarker::Done => Ok(()),
            ReplyMarker::Trap | ReplyMarker::Fatal => Err(RosgateError::Authentication(
                reply_message(&reply).unwrap_or_else(|| "rejected by device".to_string()),
            )),
            _ => Err(RosgateError::Authentication(
                "invalid reply from device".to_string(),
            )),
        }
    }

    /// Send one command and collect its `!re` rows until `!done`
    ///
    /// A `!trap` aborts with the device message; rows read before it are
    /// discarded. If the device ends the stream, the rows so far are returned
    /// and the connection is closed.
    pub fn cmd<S: AsRef<str>>(&mut self, words: &[S]) -> Result<Vec<Attributes>> {
        if !self.is_connected() {
            return Err(RosgateError::Connection("not connected".to_string()));
        }
        if self.state() != ConnectionState::Authenticated {
            return Err(RosgateError::Authentication(
                "command issued on a connection that is not logged in".to_string(),
            ));
        }

        let path = words.first().map(|w| w.as_ref().to_string()).unwrap_or_default();
        tracing::debug!("Executing {} on {}", path, self.peer_addr());
        if tracing::enabled!(tracing::Level::TRACE) {
            let shown: Vec<&str> = words.iter().map(|w| redact(w.as_ref())).collect();
            tracing::trace!(words = ?shown, "sending sentence");
        }

        self.set_state(ConnectionState::Executing);
        let result = self.command_round(words);
        let result = self.or_disconnect(result);
        if let Ok(rows) = &result {
            if self.is_connected() {
                self.set_state(ConnectionState::Authenticated);
            }
            tracing::debug!("{} returned {} rows", path, rows.len());
        }
        result
    }

    fn command_round<S: AsRef<str>>(&mut self, words: &[S]) -> Result<Vec<Attributes>> {
        let words: Vec<&[u8]> = words.iter().map(|w| w.as_ref().as_bytes()).collect();
        self.send(&words)?;

        let mut rows = Vec::new();
        loop {
            let Some(sentence) = self.receive()? else {
                // Rows already read still count; the session itself is gone.
                tracing::debug!("{} closed the stream mid-command", self.peer_addr());
                self.disconnect();
                break;
            };
            if sentence.is_empty() {
                continue;
            }

            match ReplyMarker::of(&sentence) {
                ReplyMarker::Done => break,
                ReplyMarker::Trap => {
                    return Err(RosgateError::Protocol(
                        reply_message(&sentence)
                            .unwrap_or_else(|| "unknown device error".to_string()),
                    ))
                }
                ReplyMarker::Fatal => {
                    return Err(RosgateError::Protocol(format!(
                        "fatal: {}",
                        reply_message(&sentence)
                            .unwrap_or_else(|| "connection closed by device".to_string())
                    )))
                }
                ReplyMarker::Re => rows.push(parse_attributes(&sentence)),
                ReplyMarker::Other => {
                    tracing::warn!(
                        "Unexpected reply marker {:?} from {}",
                        sentence.to_strings().first(),
                        self.peer_addr()
                    );
                    rows.push(parse_attributes(&sentence));
                }
            }
        }

        Ok(rows)
    }
}

impl CommandExecutor for Connection {
    fn cmd(&mut self, words: &[String]) -> Result<Vec<Attributes>> {
        Connection::cmd(self, words)
    }
}

/// Hide credential values in traced sentences
fn redact(word: &str) -> &str {
    if word.starts_with("=password=") {
        "=password=***"
    } else {
        word
    }
}
