#![no_main]
use libfuzzer_sys::fuzz_target;

// Cursor-Sicherheit: beliebige Oktettfolgen duerfen weder panicken noch
// den Cursor ueber das Pufferende treiben.
fuzz_target!(|data: &[u8]| {
    let options = losfmt::DecodeOptions::default();
    if let Ok(decoded) = losfmt::decode_octets(data, &options) {
        // Jeder dekodierte Baum muss sich JSON-rendern und re-encodieren lassen.
        let _ = losfmt::json::to_json_string(&decoded.value);
        let _ = losfmt::encode(&decoded.value);
    }
});
