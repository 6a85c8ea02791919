//! Protocol Module
//!
//! Defines the RouterOS API wire protocol.
//!
//! ## Words
//! ```text
//! ┌──────────────┬─────────────────────────────┐
//! │ Len (1..5)   │         Bytes               │
//! └──────────────┴─────────────────────────────┘
//! ```
//!
//! ## Sentences
//! ```text
//! ┌────────┬────────┬─────┬────────┬──────────────┐
//! │ Word 1 │ Word 2 │ ... │ Word n │ 0x00 (end)   │
//! └────────┴────────┴─────┴────────┴──────────────┘
//! ```
//!
//! ### Reply Markers
//! - `!done`: command finished
//! - `!trap`: command failed (`=message=...`)
//! - `!re`: one data row of `=key=value` attributes
//! - `!fatal`: device is closing the connection

mod codec;
mod reply;
mod sentence;

pub use codec::{decode_length, encode_length, put_length, MAX_LENGTH_PREFIX};
pub use reply::{parse_attribute, parse_attributes, reply_message, Attributes, ReplyMarker};
pub use sentence::{encode_sentence, read_sentence, read_word, write_sentence, Sentence, Word};
