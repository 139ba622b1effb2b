#![no_main]

use libfuzzer_sys::fuzz_target;
use stellar_txrep::TransactionEnvelope;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Whatever scans must print and scan back to itself
    if let Ok(env) = TransactionEnvelope::from_txrep(text) {
        let printed = env.to_txrep().expect("scanned envelope prints");
        let again = TransactionEnvelope::from_txrep(&printed).expect("printed txrep scans");
        assert_eq!(again, env);
    }
});
