//! Encode typed values as JSON fragments with encoders specialized once per type.
//!
//! # Overview
//!
//! Encoding is split into two phases:
//! - _Resolution_ inspects a type's [Descriptor] once and builds an [Encoder] specialized for
//!   that type. The [Registry] caches the result, so resolution cost is paid once per type.
//! - _Encoding_ runs the cached encoder against live values, appending text to a caller-owned
//!   buffer. Nothing on this path inspects type information or allocates beyond the buffer's
//!   own growth.
//!
//! Output is always a JSON fragment (a number, a string, or an object, array or `null` for
//! composite types), never a complete document wrapper. Callers compose fragments by writing
//! punctuation around encoder calls.
//!
//! # Supported Types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `isize`, `u8`, `u16`, `u32`, `u64`, `usize`
//! - Text: `String`, `&'static str`, `Box<str>`, `Arc<str>`
//! - Composites: `Vec<T>`, `Box<[T]>`, `[T; N]`, `Option<T>`, `BTreeMap<K, V>` (with text or
//!   integer keys), and user records declared with [record!]
//!
//! Anything else resolves to [Error::UnsupportedType] unless an extension [Resolve] registered
//! through [Config] claims it.
//!
//! # Example
//!
//! ```
//! use msgfmt_jsonfmt::{encoder_of, record, Addr, Context, Describe, Descriptor, Encoder};
//!
//! struct Request {
//!     id: u64,
//!     path: String,
//!     retries: Option<u8>,
//! }
//!
//! impl Describe for Request {
//!     fn describe() -> Descriptor {
//!         record!(Request { id, path, retries })
//!     }
//! }
//!
//! // Resolve once...
//! let encoder = encoder_of::<Request>().unwrap();
//!
//! // ...encode many times, reusing the same buffer
//! let mut buf = Vec::new();
//! for id in 0..3 {
//!     buf.clear();
//!     let request = Request { id, path: "/\"q\"".into(), retries: None };
//!     encoder.encode(Context::none(), &mut buf, Addr::of(&request));
//! }
//! assert_eq!(buf, br#"{"id":2,"path":"/\"q\"","retries":null}"#);
//! ```

pub mod addr;
pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod types;

// Re-export main types and traits
pub use addr::{Addr, Context};
pub use descriptor::{Describe, Descriptor, Field, Shape, Width};
pub use encoder::{Encoder, EncoderExt};
pub use error::Error;
pub use registry::{Config, Registry};
pub use resolver::Resolve;
pub use types::{int::Decimal, text::escape};

use std::sync::{Arc, LazyLock};

/// The process-wide registry backing [encoder_for] and [encoder_of].
static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::default);

/// Returns the process-wide [Registry].
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Returns the process-wide encoder for `descriptor`, resolving it on first use.
pub fn encoder_for(descriptor: &Descriptor) -> Result<Arc<dyn Encoder>, Error> {
    GLOBAL.encoder_for(descriptor)
}

/// Returns the process-wide encoder for `T`, resolving it on first use.
pub fn encoder_of<T: Describe>() -> Result<Arc<dyn Encoder>, Error> {
    GLOBAL.encoder_of::<T>()
}
