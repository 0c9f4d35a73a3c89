//! Key-ordered mapping encoding.

use crate::{descriptor::MapVisit, Addr, Context, Encoder};
use bytes::BufMut;
use std::sync::Arc;

/// How a mapping key becomes a JSON object member name.
pub enum Key {
    /// The key encoder already produces a JSON string.
    Text(Arc<dyn Encoder>),
    /// The key encoder produces a JSON number, which is wrapped in quotes.
    Int(Arc<dyn Encoder>),
}

/// Encodes a mapping as a JSON object, in the order its entries are visited.
pub struct Map {
    key: Key,
    value: Arc<dyn Encoder>,
    visit: MapVisit,
}

impl Map {
    pub fn new(key: Key, value: Arc<dyn Encoder>, visit: MapVisit) -> Self {
        Self { key, value, visit }
    }
}

impl Encoder for Map {
    fn encode(&self, ctx: Context<'_>, buf: &mut dyn BufMut, value: Addr<'_>) {
        buf.put_u8(b'{');
        let mut first = true;
        (self.visit)(value, &mut |key, value| {
            if !first {
                buf.put_u8(b',');
            }
            first = false;
            match &self.key {
                Key::Text(encoder) => encoder.encode(ctx, buf, key),
                Key::Int(encoder) => {
                    buf.put_u8(b'"');
                    encoder.encode(ctx, buf, key);
                    buf.put_u8(b'"');
                }
            }
            buf.put_u8(b':');
            self.value.encode(ctx, buf, value);
        });
        buf.put_u8(b'}');
    }
}
