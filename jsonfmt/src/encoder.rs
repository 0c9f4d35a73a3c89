//! Core encoder traits

use crate::{Addr, Context};
use bytes::{BufMut, BytesMut};

/// Encodes values of exactly one resolved type as a JSON fragment.
///
/// Encoders are immutable once built and hold no per-call state, so a single instance may be
/// shared across threads and used concurrently as long as every call supplies its own buffer.
pub trait Encoder: Send + Sync {
    /// Appends the JSON encoding of `value` to `buf`.
    ///
    /// Bytes already present in `buf` are never modified. `value` must reference a value of the
    /// type this encoder was resolved for; anything else panics.
    fn encode(&self, ctx: Context<'_>, buf: &mut dyn BufMut, value: Addr<'_>);
}

/// Extension trait providing ergonomic encode methods.
pub trait EncoderExt: Encoder {
    /// Encodes `value` into a new `BytesMut` buffer.
    ///
    /// (Provided method).
    fn encode_to_bytes(&self, ctx: Context<'_>, value: Addr<'_>) -> BytesMut {
        let mut buf = BytesMut::new();
        self.encode(ctx, &mut buf, value);
        buf
    }
}

// Automatically implement `EncoderExt` for all encoders, including trait objects.
impl<E: Encoder + ?Sized> EncoderExt for E {}
