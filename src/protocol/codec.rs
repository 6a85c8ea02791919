//! Word length codec
//!
//! Every word on the wire is prefixed by its length in a tiered
//! variable-length encoding. The high bits of the first byte say how many
//! bytes follow.
//!
//! ## Wire Format
//! ```text
//! 0x00000000 - 0x0000007F   0xxxxxxx
//! 0x00000080 - 0x00003FFF   10xxxxxx xxxxxxxx
//! 0x00004000 - 0x001FFFFF   110xxxxx xxxxxxxx xxxxxxxx
//! 0x00200000 - 0x0FFFFFFF   1110xxxx xxxxxxxx xxxxxxxx xxxxxxxx
//! 0x10000000 - 0xFFFFFFFF   11110000 xxxxxxxx xxxxxxxx xxxxxxxx xxxxxxxx
//! ```

use std::io::{ErrorKind, Read};

use bytes::{BufMut, BytesMut};

use crate::error::{Result, RosgateError};

/// Largest number of bytes a length prefix can take
pub const MAX_LENGTH_PREFIX: usize = 5;

// =============================================================================
// Encoding
// =============================================================================

/// Append the length prefix for `len` to `buf`
pub fn put_length(buf: &mut BytesMut, len: u32) {
    match len {
        0..=0x7F => buf.put_u8(len as u8),
        0x80..=0x3FFF => buf.put_u16((len | 0x8000) as u16),
        0x4000..=0x1F_FFFF => {
            let v = len | 0xC0_0000;
            buf.put_u8((v >> 16) as u8);
            buf.put_u16(v as u16);
        }
        0x20_0000..=0x0FFF_FFFF => buf.put_u32(len | 0xE000_0000),
        _ => {
            buf.put_u8(0xF0);
            buf.put_u32(len);
        }
    }
}

/// Encode `len` as a standalone length prefix
pub fn encode_length(len: u32) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(MAX_LENGTH_PREFIX);
    put_length(&mut buf, len);
    buf.to_vec()
}

// =============================================================================
// Decoding
// =============================================================================

/// Number of bytes that follow a leading length byte
fn continuation_len(first: u8) -> Result<usize> {
    match first {
        0x00..=0x7F => Ok(0),
        0x80..=0xBF => Ok(1),
        0xC0..=0xDF => Ok(2),
        0xE0..=0xEF => Ok(3),
        0xF0 => Ok(4),
        _ => Err(RosgateError::Protocol(format!(
            "invalid length prefix: 0x{:02x}",
            first
        ))),
    }
}

/// Read one length prefix from `reader`
///
/// Returns `Ok(None)` if the stream ends before the prefix is complete.
/// Timeouts surface as connection errors.
pub fn decode_length<R: Read>(reader: &mut R) -> Result<Option<u32>> {
    let mut first = [0u8; 1];
    if !read_or_eof(reader, &mut first)? {
        return Ok(None);
    }

    let extra = continuation_len(first[0])?;
    let mut rest = [0u8; 4];
    if extra > 0 && !read_or_eof(reader, &mut rest[..extra])? {
        return Ok(None);
    }

    let len = match extra {
        0 => u32::from(first[0]),
        1 => (u32::from(first[0] & 0x3F) << 8) | u32::from(rest[0]),
        2 => {
            (u32::from(first[0] & 0x1F) << 16)
                | (u32::from(rest[0]) << 8)
                | u32::from(rest[1])
        }
        3 => {
            (u32::from(first[0] & 0x0F) << 24)
                | (u32::from(rest[0]) << 16)
                | (u32::from(rest[1]) << 8)
                | u32::from(rest[2])
        }
        _ => u32::from_be_bytes(rest),
    };

    Ok(Some(len))
}

/// Fill `buf` completely, reporting a clean end-of-stream as `false`
pub(crate) fn read_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(RosgateError::from_io("reading from device", e)),
    }
}
