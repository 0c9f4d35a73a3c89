//! Error types for encoder resolution

use thiserror::Error;

/// Error type for encoder resolution.
///
/// Errors are only ever returned while resolving an [crate::Encoder]. Once an encoder exists,
/// encoding a value with it cannot fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported type: {0}")]
    UnsupportedType(&'static str),
    #[error("width mismatch for {name}: declared {expected} bits, stored in {found} bits")]
    WidthMismatch {
        name: &'static str,
        expected: u32,
        found: u32,
    },
    #[error("unsupported key for {map}: {key} is neither text nor an integer")]
    UnsupportedKey {
        map: &'static str,
        key: &'static str,
    },
    #[error("descriptor mismatch: {expected} describes itself as {found}")]
    DescriptorMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("duplicate field in {record}: {field}")]
    DuplicateField {
        record: &'static str,
        field: &'static str,
    },
}
