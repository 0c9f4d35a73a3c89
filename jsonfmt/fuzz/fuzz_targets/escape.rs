#![no_main]

use libfuzzer_sys::fuzz_target;
use msgfmt_jsonfmt::escape;

fuzz_target!(|text: &str| {
    let mut buf = Vec::new();
    escape(&mut buf, text);

    // Output is a single valid JSON string that decodes back to the input
    let decoded: String =
        serde_json::from_slice(&buf).expect("escaped text is not a valid JSON string");
    assert_eq!(decoded, text);

    // No raw control bytes survive
    assert!(buf.iter().all(|&byte| byte >= 0x20));
});
