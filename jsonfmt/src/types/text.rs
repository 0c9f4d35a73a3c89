//! String literal encoding.
//!
//! Text is scanned once. Runs of bytes that need no escaping are copied with a single
//! `put_slice`; multi-byte UTF-8 sequences always fall in such runs and are never decoded.

use crate::{descriptor::TextView, Addr, Context, Encoder};
use bytes::BufMut;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Escape character for every byte value (`0` means the byte is copied as-is, `u` means the
/// byte is written as `\u00XX`).
const ESCAPES: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut byte = 0;
    while byte < 0x20 {
        table[byte] = b'u';
        byte += 1;
    }
    table[b'\n' as usize] = b'n';
    table[b'\r' as usize] = b'r';
    table[b'\t' as usize] = b't';
    table[b'"' as usize] = b'"';
    table[b'\\' as usize] = b'\\';
    table
};

/// Appends `text` to `buf` as a quoted JSON string literal.
pub fn escape(buf: &mut dyn BufMut, text: &str) {
    let bytes = text.as_bytes();
    buf.put_u8(b'"');
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let escape = ESCAPES[byte as usize];
        if escape == 0 {
            continue;
        }
        if start < i {
            buf.put_slice(&bytes[start..i]);
        }
        if escape == b'u' {
            buf.put_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[(byte >> 4) as usize],
                HEX[(byte & 0xF) as usize],
            ]);
        } else {
            buf.put_slice(&[b'\\', escape]);
        }
        start = i + 1;
    }
    if start < bytes.len() {
        buf.put_slice(&bytes[start..]);
    }
    buf.put_u8(b'"');
}

/// Encodes text reached through a [TextView] as a JSON string.
pub struct Text {
    view: TextView,
}

impl Text {
    pub fn new(view: TextView) -> Self {
        Self { view }
    }
}

impl Encoder for Text {
    #[inline]
    fn encode(&self, _: Context<'_>, buf: &mut dyn BufMut, value: Addr<'_>) {
        escape(buf, (self.view)(value));
    }
}
