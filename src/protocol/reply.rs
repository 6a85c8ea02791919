//! Reply classification
//!
//! Device replies start with a marker word; data travels as `=key=value`
//! attribute words.

use std::collections::BTreeMap;

use super::sentence::Sentence;

/// Key/value data of one sentence
pub type Attributes = BTreeMap<String, String>;

/// Reply markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMarker {
    /// Command finished
    Done,

    /// Command failed, `message` attribute explains
    Trap,

    /// One data row
    Re,

    /// Device is closing the connection
    Fatal,

    /// Anything else, including a missing marker
    Other,
}

impl ReplyMarker {
    /// Classify the first word of a sentence
    pub fn of(sentence: &Sentence) -> Self {
        match sentence.first() {
            Some(b"!done") => ReplyMarker::Done,
            Some(b"!trap") => ReplyMarker::Trap,
            Some(b"!re") => ReplyMarker::Re,
            Some(b"!fatal") => ReplyMarker::Fatal,
            _ => ReplyMarker::Other,
        }
    }
}

/// Split one `=key=value` word
///
/// The value keeps any further `=` characters.
pub fn parse_attribute(word: &[u8]) -> Option<(String, String)> {
    let rest = word.strip_prefix(b"=")?;
    let split = rest.iter().position(|&b| b == b'=')?;
    let key = String::from_utf8_lossy(&rest[..split]).into_owned();
    let value = String::from_utf8_lossy(&rest[split + 1..]).into_owned();
    Some((key, value))
}

/// Collect the attribute words of a sentence
pub fn parse_attributes(sentence: &Sentence) -> Attributes {
    sentence
        .words()
        .iter()
        .filter_map(|w| parse_attribute(w))
        .collect()
}

/// Error text of a `!trap` or `!fatal` reply
///
/// `!fatal` carries its reason as a bare word instead of an attribute.
pub fn reply_message(sentence: &Sentence) -> Option<String> {
    if let Some(message) = parse_attributes(sentence).remove("message") {
        return Some(message);
    }
    sentence
        .words()
        .iter()
        .skip(1)
        .find(|w| !w.starts_with(b"="))
        .map(|w| String::from_utf8_lossy(w).into_owned())
}
