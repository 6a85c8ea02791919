//! Scripted mock device
//!
//! Accepts one connection on an ephemeral loopback port, records every
//! sentence it receives and answers each with a canned list of replies.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rosgate::config::DEFAULT_MAX_WORD_LEN;
use rosgate::protocol::{read_sentence, write_sentence};

/// Replies sent in answer to one received sentence
pub type Round = Vec<Vec<String>>;

/// Build a round from string slices
pub fn round(replies: &[&[&str]]) -> Round {
    replies
        .iter()
        .map(|s| s.iter().map(|w| w.to_string()).collect())
        .collect()
}

/// Reply to a successful login
pub fn login_ok() -> Round {
    round(&[&["!done"]])
}

pub struct MockDevice {
    port: u16,
    received: Arc<Mutex<Vec<Vec<String>>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockDevice {
    /// Answer `rounds` in order, then keep reading until the client hangs up
    pub fn spawn(rounds: Vec<Round>) -> Self {
        Self::start(rounds, false)
    }

    /// Answer `rounds` in order, then close the socket
    pub fn spawn_then_close(rounds: Vec<Round>) -> Self {
        Self::start(rounds, true)
    }

    fn start(rounds: Vec<Round>, close_after: bool) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        listener.set_nonblocking(true).unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);

        let handle = thread::spawn(move || {
            serve(listener, rounds, close_after, received_clone);
        });

        Self {
            port,
            received,
            handle: Some(handle),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the device thread and return every sentence it received
    pub fn received(&mut self) -> Vec<Vec<String>> {
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
        self.received.lock().unwrap().clone()
    }
}

fn serve(
    listener: TcpListener,
    rounds: Vec<Round>,
    close_after: bool,
    received: Arc<Mutex<Vec<Vec<String>>>>,
) {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut stream = loop {
        match listener.accept() {
            Ok((stream, _)) => break stream,
            Err(_) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
            Err(_) => return,
        }
    };
    stream.set_nonblocking(false).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let mut rounds = rounds.into_iter();
    loop {
        let sentence = match read_sentence(&mut stream, DEFAULT_MAX_WORD_LEN) {
            Ok(Some(sentence)) => sentence,
            _ => return,
        };
        received.lock().unwrap().push(sentence.to_strings());

        match rounds.next() {
            Some(replies) => {
                for reply in replies {
                    if write_sentence(&mut stream, &reply).is_err() {
                        return;
                    }
                }
            }
            None => continue,
        }

        if close_after && rounds.len() == 0 {
            return;
        }
    }
}
