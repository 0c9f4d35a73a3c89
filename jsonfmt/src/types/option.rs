//! Nullable value encoding.

use crate::{descriptor::OptionView, Addr, Context, Encoder};
use bytes::BufMut;
use std::sync::Arc;

/// Encodes an absent value as `null` and a present one with the inner encoder.
pub struct Nullable {
    inner: Arc<dyn Encoder>,
    view: OptionView,
}

impl Nullable {
    pub fn new(inner: Arc<dyn Encoder>, view: OptionView) -> Self {
        Self { inner, view }
    }
}

impl Encoder for Nullable {
    fn encode(&self, ctx: Context<'_>, buf: &mut dyn BufMut, value: Addr<'_>) {
        match (self.view)(value) {
            Some(inner) => self.inner.encode(ctx, buf, inner),
            None => buf.put_slice(b"null"),
        }
    }
}
