#![no_main]
use libfuzzer_sys::fuzz_target;

use losfmt::cursor::{ByteCursor, ByteWriter};
use losfmt::varint;

fuzz_target!(|data: &[u8]| {
    // Decode beliebiger Oktette, dann Re-Encode des Ergebnisses.
    let mut c = ByteCursor::new(data);
    if let Ok(n) = varint::read(&mut c) {
        let mut w = ByteWriter::new();
        varint::write(&mut w, n);
        let bytes = w.into_vec();
        let mut c2 = ByteCursor::new(&bytes);
        assert_eq!(varint::read(&mut c2).unwrap(), n);
        assert_eq!(c2.position(), bytes.len());
    }
});
