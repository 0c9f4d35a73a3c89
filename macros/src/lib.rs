//! Procedural macros shared by msgfmt tests.

pub use msgfmt_proc_macros::test_traced;

// Hidden from docs because these are needed for the proc macros to use 3rd
// party crates.
#[doc(hidden)]
pub use ::tracing;
#[doc(hidden)]
pub use ::tracing_subscriber;
