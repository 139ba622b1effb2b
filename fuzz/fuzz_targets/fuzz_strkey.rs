#![no_main]

use libfuzzer_sys::fuzz_target;
use stellar_txrep::encoding::strkey;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Accepted strkeys are canonical
    if let Ok(key) = strkey::decode(text) {
        assert_eq!(key.encode(), text);
    }
});
