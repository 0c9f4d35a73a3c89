//! Record encoding.

use crate::{descriptor::Accessor, types::text::escape, Addr, Context, Encoder};
use bytes::BufMut;
use std::sync::Arc;

struct Slot {
    /// `{"name":` for the first field, `,"name":` for the rest.
    prefix: Vec<u8>,
    accessor: Accessor,
    encoder: Arc<dyn Encoder>,
}

/// Encodes a record as a JSON object with one member per field, in declaration order.
pub struct Record {
    slots: Vec<Slot>,
}

impl Record {
    /// Creates a record encoder from `(name, accessor, encoder)` triples.
    ///
    /// Field names are escaped once, here, rather than on every encode.
    pub fn new(fields: impl IntoIterator<Item = (&'static str, Accessor, Arc<dyn Encoder>)>) -> Self {
        let slots = fields
            .into_iter()
            .enumerate()
            .map(|(i, (name, accessor, encoder))| {
                let mut prefix = Vec::with_capacity(name.len() + 4);
                prefix.put_u8(if i == 0 { b'{' } else { b',' });
                escape(&mut prefix, name);
                prefix.put_u8(b':');
                Slot {
                    prefix,
                    accessor,
                    encoder,
                }
            })
            .collect();
        Self { slots }
    }
}

impl Encoder for Record {
    fn encode(&self, ctx: Context<'_>, buf: &mut dyn BufMut, value: Addr<'_>) {
        if self.slots.is_empty() {
            buf.put_slice(b"{}");
            return;
        }
        for slot in &self.slots {
            buf.put_slice(&slot.prefix);
            slot.encoder.encode(ctx, buf, (slot.accessor)(value));
        }
        buf.put_u8(b'}');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::{int::Int, text::Text},
        EncoderExt,
    };

    struct User {
        id: u32,
        name: String,
    }

    fn user_encoder() -> Record {
        let id: Accessor = |addr| Addr::of(&addr.get::<User>().id);
        let name: Accessor = |addr| Addr::of(&addr.get::<User>().name);
        let fields: Vec<(&'static str, Accessor, Arc<dyn Encoder>)> = vec![
            ("id", id, Arc::new(Int::<u32>::new()) as Arc<dyn Encoder>),
            (
                "name",
                name,
                Arc::new(Text::new(|addr| addr.get::<String>().as_str())) as Arc<dyn Encoder>,
            ),
        ];
        Record::new(fields)
    }

    #[test]
    fn test_record() {
        let user = User {
            id: 7,
            name: "ada\n".into(),
        };
        let encoded = user_encoder().encode_to_bytes(Context::none(), Addr::of(&user));
        assert_eq!(&encoded[..], br#"{"id":7,"name":"ada\n"}"#);
    }

    #[test]
    fn test_empty_record() {
        let encoded = Record::new(Vec::new()).encode_to_bytes(Context::none(), Addr::of(&()));
        assert_eq!(&encoded[..], b"{}");
    }

    #[test]
    fn test_escaped_field_name() {
        let identity: Accessor = |addr| addr;
        let encoder = Record::new(vec![(
            "a\"b",
            identity,
            Arc::new(Int::<u8>::new()) as Arc<dyn Encoder>,
        )]);
        let encoded = encoder.encode_to_bytes(Context::none(), Addr::of(&1u8));
        assert_eq!(&encoded[..], br#"{"a\"b":1}"#);
    }
}
