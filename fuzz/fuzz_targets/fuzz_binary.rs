#![no_main]

use libfuzzer_sys::fuzz_target;
use stellar_txrep::core::binary::{from_bytes, to_bytes};
use stellar_txrep::TransactionEnvelope;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode to the same bytes
    if let Ok(mut env) = from_bytes::<TransactionEnvelope>(data) {
        let bytes = to_bytes(&mut env).expect("decoded envelope re-encodes");
        assert_eq!(&bytes[..], data);
    }
});
