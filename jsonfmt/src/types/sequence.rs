//! Sequence encoding.

use crate::{descriptor::SequenceVisit, Addr, Context, Encoder};
use bytes::BufMut;
use std::sync::Arc;

/// Encodes a homogeneous sequence as a JSON array, preserving element order.
pub struct Sequence {
    element: Arc<dyn Encoder>,
    visit: SequenceVisit,
}

impl Sequence {
    pub fn new(element: Arc<dyn Encoder>, visit: SequenceVisit) -> Self {
        Self { element, visit }
    }
}

impl Encoder for Sequence {
    fn encode(&self, ctx: Context<'_>, buf: &mut dyn BufMut, value: Addr<'_>) {
        buf.put_u8(b'[');
        let mut first = true;
        (self.visit)(value, &mut |item| {
            if !first {
                buf.put_u8(b',');
            }
            first = false;
            self.element.encode(ctx, buf, item);
        });
        buf.put_u8(b']');
    }
}
