#![no_main]
use libfuzzer_sys::fuzz_target;

// Editor-Pfad: JSON -> Value -> encode -> decode muss fuer jedes gueltige
// JSON-Dokument durchlaufen.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(value) = losfmt::json::parse(text) {
            if let Ok(encoded) = losfmt::encode(&value) {
                let _ = losfmt::decode(&encoded.encoded);
            }
        }
    }
});
