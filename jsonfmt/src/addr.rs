//! Borrowed value references and the context threaded through encoders.

use std::{
    any::{type_name, Any},
    fmt,
};

/// A borrowed, type-erased reference to a value.
///
/// An [Addr] carries no shape information: the [crate::Encoder] it is handed to decides how
/// to interpret it. The reference only needs to live for a single `encode` call and is never
/// retained.
#[derive(Clone, Copy)]
pub struct Addr<'a>(&'a (dyn Any + 'static));

impl<'a> Addr<'a> {
    /// Creates a reference to `value`.
    #[inline]
    pub fn of<T: Any>(value: &'a T) -> Self {
        Self(value)
    }

    /// Returns the referenced value as a `T`.
    ///
    /// Panics if the referenced value is not a `T`. Handing an encoder a value of a type other
    /// than the one it was resolved for is a caller bug.
    #[inline]
    pub fn get<T: Any>(self) -> &'a T {
        match self.0.downcast_ref::<T>() {
            Some(value) => value,
            None => panic!("value is not a {}", type_name::<T>()),
        }
    }

    /// Returns the referenced value as a `T`, if it is one.
    #[inline]
    pub fn try_get<T: Any>(self) -> Option<&'a T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Addr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Addr").field(&self.0.type_id()).finish()
    }
}

/// Call-scoped metadata threaded unchanged through nested encode calls.
///
/// Encoders in this crate never inspect the context. Collaborators (for example a structured
/// logger driving the encoders) use it to carry their own per-call state down to custom
/// encoders.
#[derive(Clone, Copy, Default)]
pub struct Context<'a>(Option<&'a (dyn Any + 'static)>);

impl<'a> Context<'a> {
    /// An empty context.
    pub const fn none() -> Self {
        Self(None)
    }

    /// A context carrying `value`.
    pub fn new<T: Any>(value: &'a T) -> Self {
        Self(Some(value))
    }

    /// Returns the carried value if there is one and it is a `T`.
    pub fn get<T: Any>(&self) -> Option<&'a T> {
        self.0.and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns true if no value is carried.
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => f.debug_tuple("Context").field(&value.type_id()).finish(),
            None => f.write_str("Context(None)"),
        }
    }
}
