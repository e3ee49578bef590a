#![no_main]

use libfuzzer_sys::fuzz_target;

use tally_token::{Token, TokenSnapshot};

// Fuzz snapshot decoding and restore with arbitrary bytes.
// Must never panic, only return errors for malformed input.
fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = TokenSnapshot::from_bytes(data) {
        let _ = snapshot.verify();
        let _ = Token::restore(snapshot);
    }
});
