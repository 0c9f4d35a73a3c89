#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use msgfmt_jsonfmt::{encoder_of, record, Addr, Context, Describe, Descriptor, Encoder};
use std::collections::BTreeMap;

#[derive(Arbitrary, Debug)]
struct Entry {
    level: i8,
    code: u16,
    offset: i32,
    sequence: u64,
    index: isize,
    message: String,
    tags: Vec<String>,
    counters: BTreeMap<u32, i64>,
    labels: BTreeMap<String, u8>,
    parent: Option<usize>,
}

impl Describe for Entry {
    fn describe() -> Descriptor {
        record!(Entry {
            level,
            code,
            offset,
            sequence,
            index,
            message,
            tags,
            counters,
            labels,
            parent,
        })
    }
}

#[derive(Arbitrary, Debug)]
enum FuzzInput {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    Entry(Entry),
}

fn encode<T: Describe>(value: &T) -> Vec<u8> {
    let encoder = encoder_of::<T>().expect("type is supported");
    let mut buf = Vec::new();
    encoder.encode(Context::none(), &mut buf, Addr::of(value));

    // Encoding the same value again appends identical bytes
    let len = buf.len();
    encoder.encode(Context::none(), &mut buf, Addr::of(value));
    assert_eq!(buf[..len], buf[len..]);
    buf.truncate(len);
    buf
}

fn check_int<T: Describe + ToString>(value: T) {
    assert_eq!(encode(&value), value.to_string().into_bytes());
}

fn check_entry(entry: Entry) {
    let encoded = encode(&entry);
    let parsed: serde_json::Value =
        serde_json::from_slice(&encoded).expect("encoded entry is not valid JSON");
    assert_eq!(parsed["level"], entry.level);
    assert_eq!(parsed["code"], entry.code);
    assert_eq!(parsed["offset"], entry.offset);
    assert_eq!(parsed["sequence"], entry.sequence);
    assert_eq!(parsed["index"], entry.index as i64);
    assert_eq!(parsed["message"], entry.message);
    assert_eq!(parsed["tags"], serde_json::json!(entry.tags));
    assert_eq!(parsed["labels"], serde_json::json!(entry.labels));
    let counters = parsed["counters"].as_object().expect("counters is an object");
    assert_eq!(counters.len(), entry.counters.len());
    for (key, value) in &entry.counters {
        assert_eq!(counters[&key.to_string()], *value);
    }
    match entry.parent {
        Some(parent) => assert_eq!(parsed["parent"], parent as u64),
        None => assert!(parsed["parent"].is_null()),
    }
}

fuzz_target!(|input: FuzzInput| {
    match input {
        FuzzInput::I8(v) => check_int(v),
        FuzzInput::I16(v) => check_int(v),
        FuzzInput::I32(v) => check_int(v),
        FuzzInput::I64(v) => check_int(v),
        FuzzInput::Isize(v) => check_int(v),
        FuzzInput::U8(v) => check_int(v),
        FuzzInput::U16(v) => check_int(v),
        FuzzInput::U32(v) => check_int(v),
        FuzzInput::U64(v) => check_int(v),
        FuzzInput::Usize(v) => check_int(v),
        FuzzInput::Entry(entry) => check_entry(entry),
    }
});
