//! Selecting an [Encoder] for a [Descriptor].
//!
//! Resolution is tiered:
//! 1. [Primitives] claims integers and text.
//! 2. [Composites] claims records, sequences, mappings and optional values, resolving every
//!    child through the [Registry] (and therefore its cache).
//! 3. Extension resolvers, in registration order, may claim anything left (typically
//!    [Shape::Opaque] descriptors).
//!
//! A descriptor no tier claims fails with [Error::UnsupportedType].

use crate::{
    descriptor::{Shape, Width},
    types::{
        int::Int,
        map::{Key, Map},
        option::Nullable,
        record::Record,
        sequence::Sequence,
        text::Text,
    },
    Descriptor, Encoder, Error, Registry,
};
use std::{collections::HashSet, sync::Arc};

/// A source of encoders for some set of descriptors.
pub trait Resolve: Send + Sync {
    /// Builds an encoder for `descriptor`.
    ///
    /// Returns `Ok(None)` if this resolver does not handle the descriptor. Encoders for nested
    /// descriptors should be obtained from `registry` so they are shared and cached.
    fn resolve(
        &self,
        registry: &Registry,
        descriptor: &Descriptor,
    ) -> Result<Option<Arc<dyn Encoder>>, Error>;
}

/// Resolves integers and text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Primitives;

impl Primitives {
    fn int(descriptor: &Descriptor, width: Width, signed: bool) -> Result<Arc<dyn Encoder>, Error> {
        // Native widths alias to a fixed width, so verify the value really is stored that wide
        let found = (descriptor.size() * 8) as u32;
        if found != width.bits() {
            return Err(Error::WidthMismatch {
                name: descriptor.name(),
                expected: width.bits(),
                found,
            });
        }

        let encoder: Arc<dyn Encoder> = match (width, signed) {
            (Width::W8, true) => Arc::new(Int::<i8>::new()),
            (Width::W16, true) => Arc::new(Int::<i16>::new()),
            (Width::W32, true) => Arc::new(Int::<i32>::new()),
            (Width::W64, true) => Arc::new(Int::<i64>::new()),
            (Width::Native, true) => Arc::new(Int::<isize>::new()),
            (Width::W8, false) => Arc::new(Int::<u8>::new()),
            (Width::W16, false) => Arc::new(Int::<u16>::new()),
            (Width::W32, false) => Arc::new(Int::<u32>::new()),
            (Width::W64, false) => Arc::new(Int::<u64>::new()),
            (Width::Native, false) => Arc::new(Int::<usize>::new()),
        };
        Ok(encoder)
    }
}

impl Resolve for Primitives {
    fn resolve(
        &self,
        _: &Registry,
        descriptor: &Descriptor,
    ) -> Result<Option<Arc<dyn Encoder>>, Error> {
        match descriptor.shape() {
            Shape::Int { width, signed } => Self::int(descriptor, *width, *signed).map(Some),
            Shape::Text(view) => Ok(Some(Arc::new(Text::new(*view)))),
            _ => Ok(None),
        }
    }
}

/// Resolves records, sequences, mappings and optional values.
#[derive(Clone, Copy, Debug, Default)]
pub struct Composites;

impl Resolve for Composites {
    fn resolve(
        &self,
        registry: &Registry,
        descriptor: &Descriptor,
    ) -> Result<Option<Arc<dyn Encoder>>, Error> {
        let encoder: Arc<dyn Encoder> = match descriptor.shape() {
            Shape::Record(fields) => {
                let mut names = HashSet::with_capacity(fields.len());
                if let Some(field) = fields.iter().find(|field| !names.insert(field.name())) {
                    return Err(Error::DuplicateField {
                        record: descriptor.name(),
                        field: field.name(),
                    });
                }
                let fields = fields
                    .iter()
                    .map(|field| {
                        let encoder = registry.encoder_for(field.descriptor())?;
                        Ok((field.name(), field.accessor(), encoder))
                    })
                    .collect::<Result<Vec<_>, Error>>()?;
                Arc::new(Record::new(fields))
            }
            Shape::Sequence { element, visit } => {
                Arc::new(Sequence::new(registry.encoder_for(element)?, *visit))
            }
            Shape::Map { key, value, visit } => {
                let key = match key.shape() {
                    Shape::Text(_) => Key::Text(registry.encoder_for(key)?),
                    Shape::Int { .. } => Key::Int(registry.encoder_for(key)?),
                    _ => {
                        return Err(Error::UnsupportedKey {
                            map: descriptor.name(),
                            key: key.name(),
                        })
                    }
                };
                Arc::new(Map::new(key, registry.encoder_for(value)?, *visit))
            }
            Shape::Option { inner, view } => {
                Arc::new(Nullable::new(registry.encoder_for(inner)?, *view))
            }
            _ => return Ok(None),
        };
        Ok(Some(encoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, Addr, Config, Context, Describe, EncoderExt};
    use std::collections::BTreeMap;

    fn encode(encoder: &Arc<dyn Encoder>, value: Addr<'_>) -> String {
        String::from_utf8(encoder.encode_to_bytes(Context::none(), value).to_vec()).unwrap()
    }

    #[test]
    fn test_primitives() {
        let registry = Registry::default();
        let encoder = Primitives
            .resolve(&registry, &i8::describe())
            .unwrap()
            .unwrap();
        assert_eq!(encode(&encoder, Addr::of(&-1i8)), "-1");

        let encoder = Primitives
            .resolve(&registry, &usize::describe())
            .unwrap()
            .unwrap();
        assert_eq!(encode(&encoder, Addr::of(&usize::MAX)), usize::MAX.to_string());

        let encoder = Primitives
            .resolve(&registry, &String::describe())
            .unwrap()
            .unwrap();
        assert_eq!(encode(&encoder, Addr::of(&"hello".to_string())), "\"hello\"");
    }

    #[test]
    fn test_primitives_decline_composites() {
        let registry = Registry::default();
        assert!(Primitives
            .resolve(&registry, &<Vec<u8>>::describe())
            .unwrap()
            .is_none());
        assert!(Primitives
            .resolve(&registry, &f64::describe())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_width_mismatch() {
        let registry = Registry::default();
        let descriptor = Descriptor::int::<u8>(Width::W32, false);
        let result = Primitives.resolve(&registry, &descriptor);
        assert_eq!(
            result.err(),
            Some(Error::WidthMismatch {
                name: "u8",
                expected: 32,
                found: 8,
            })
        );
    }

    #[test]
    fn test_composites_decline_primitives() {
        let registry = Registry::default();
        assert!(Composites
            .resolve(&registry, &u32::describe())
            .unwrap()
            .is_none());
        assert!(Composites
            .resolve(&registry, &bool::describe())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_composites_cache_children() {
        let registry = Registry::default();
        let encoder = Composites
            .resolve(&registry, &<Vec<Option<u32>>>::describe())
            .unwrap()
            .unwrap();
        assert_eq!(
            encode(&encoder, Addr::of(&vec![Some(1u32), None])),
            "[1,null]"
        );

        // Children went through the registry
        assert!(registry.contains(&<Option<u32>>::describe()));
        assert!(registry.contains(&u32::describe()));
        assert!(!registry.contains(&<Vec<Option<u32>>>::describe()));
    }

    #[test]
    fn test_unsupported_key() {
        let registry = Registry::new(Config::default());
        let result = Composites.resolve(&registry, &<BTreeMap<Vec<u8>, u8>>::describe());
        assert!(matches!(
            result,
            Err(Error::UnsupportedKey { key, .. }) if key == <Vec<u8>>::describe().name()
        ));
    }

    struct Point {
        x: i32,
        y: i32,
    }

    impl Describe for Point {
        fn describe() -> Descriptor {
            record!(Point { x, y, x })
        }
    }

    #[test]
    fn test_duplicate_field() {
        let registry = Registry::default();
        let result = Composites.resolve(&registry, &Point::describe());
        assert_eq!(
            result.err(),
            Some(Error::DuplicateField {
                record: Point::describe().name(),
                field: "x",
            })
        );
    }

    #[test]
    fn test_unsupported_child() {
        let registry = Registry::default();
        let result = Composites.resolve(&registry, &<Vec<f32>>::describe());
        assert!(matches!(result, Err(Error::UnsupportedType("f32"))));
    }
}
