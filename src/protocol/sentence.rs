//! Sentence framing
//!
//! A sentence is a run of length-prefixed words closed by a zero-length word.
//! Readers return `None` when the stream ends, which is distinct from an
//! empty sentence (a bare terminator).

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};

use super::codec::{decode_length, put_length, read_or_eof, MAX_LENGTH_PREFIX};
use crate::error::{Result, RosgateError};

/// One protocol word
pub type Word = Vec<u8>;

/// An ordered sequence of words, without its terminator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    words: Vec<Word>,
}

impl Sentence {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Build a sentence from text words
    pub fn from_strs<S: AsRef<str>>(words: &[S]) -> Self {
        Self {
            words: words.iter().map(|w| w.as_ref().as_bytes().to_vec()).collect(),
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// First word, the reply marker for device replies
    pub fn first(&self) -> Option<&[u8]> {
        self.words.first().map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words as lossy UTF-8, for logging and tests
    pub fn to_strings(&self) -> Vec<String> {
        self.words
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode words plus terminator into one buffer
pub fn encode_sentence<W: AsRef<[u8]>>(words: &[W]) -> Result<BytesMut> {
    let body: usize = words.iter().map(|w| w.as_ref().len() + MAX_LENGTH_PREFIX).sum();
    let mut buf = BytesMut::with_capacity(body + 1);

    for word in words {
        let word = word.as_ref();
        let len = u32::try_from(word.len()).map_err(|_| {
            RosgateError::Protocol(format!("word too long: {} bytes", word.len()))
        })?;
        put_length(&mut buf, len);
        buf.put_slice(word);
    }
    put_length(&mut buf, 0);

    Ok(buf)
}

/// Write a complete sentence and flush
pub fn write_sentence<W: Write, T: AsRef<[u8]>>(writer: &mut W, words: &[T]) -> Result<()> {
    let buf = encode_sentence(words)?;
    writer
        .write_all(&buf)
        .and_then(|_| writer.flush())
        .map_err(|e| RosgateError::from_io("writing to device", e))
}

// =============================================================================
// Decoding
// =============================================================================

/// Read one word
///
/// Returns `Some(vec![])` for the terminator and `None` at end-of-stream.
pub fn read_word<R: Read>(reader: &mut R, max_len: u32) -> Result<Option<Word>> {
    let len = match decode_length(reader)? {
        Some(len) => len,
        None => return Ok(None),
    };

    if len > max_len {
        return Err(RosgateError::Protocol(format!(
            "word too large: {} bytes (max {})",
            len, max_len
        )));
    }

    let mut word = vec![0u8; len as usize];
    if len > 0 && !read_or_eof(reader, &mut word)? {
        return Ok(None);
    }

    Ok(Some(word))
}

/// Read words until a terminator
pub fn read_sentence<R: Read>(reader: &mut R, max_len: u32) -> Result<Option<Sentence>> {
    let mut words = Vec::new();

    loop {
        match read_word(reader, max_len)? {
            None => return Ok(None),
            Some(word) if word.is_empty() => return Ok(Some(Sentence::new(words))),
            Some(word) => words.push(word),
        }
    }
}
