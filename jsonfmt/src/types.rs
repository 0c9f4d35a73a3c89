//! Encoder implementations for each supported shape.
//!
//! - [int] and [text] form the primitive tier: they read a value directly and never recurse.
//! - [record], [sequence], [map] and [option] form the composite tier: they write JSON
//!   punctuation around calls to child encoders, passing the [crate::Context] through unchanged.

pub mod int;
pub mod map;
pub mod option;
pub mod record;
pub mod sequence;
pub mod text;
