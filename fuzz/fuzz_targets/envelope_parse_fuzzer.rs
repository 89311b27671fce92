//! Fuzz target for storage envelope detection
//!
//! Feeds arbitrary text, and envelope-shaped JSON with arbitrary field
//! contents, to the envelope parser.
//!
//! # Invariants
//!
//! - `parse` never panics on any input
//! - `is_encrypted` agrees with `parse`
//! - Anything `parse` accepts survives `format` → `parse` unchanged

#![no_main]

use accounted_crypto::{format, is_encrypted, parse};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Input {
    /// Raw stored text
    Text(String),
    /// Envelope-shaped JSON
    Shaped { encrypted: bool, data: String, iv: String, note: Option<String> },
}

impl Input {
    fn stored(&self) -> String {
        match self {
            Input::Text(text) => text.clone(),
            Input::Shaped { encrypted, data, iv, note } => {
                let mut object =
                    format!("{{\"encrypted\":{encrypted},\"data\":{data:?},\"iv\":{iv:?}");
                if let Some(note) = note {
                    object.push_str(&format!(",\"note\":{note:?}"));
                }
                object.push('}');
                object
            },
        }
    }
}

fuzz_target!(|input: Input| {
    let stored = input.stored();

    // INVARIANT 1: parse never panics
    let parsed = parse(&stored);

    // INVARIANT 2: predicate agrees with parse
    assert_eq!(is_encrypted(&stored), parsed.is_some());

    // INVARIANT 3: accepted envelopes re-encode losslessly
    if let Some(parts) = parsed {
        let reparsed = parse(&format(&parts.ciphertext, &parts.nonce));
        assert_eq!(reparsed, Some(parts), "format/parse must round-trip");
    }
});
