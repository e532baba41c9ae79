#![no_main]

use libfuzzer_sys::fuzz_target;
use rtc_sdp::Candidate;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(c) = Candidate::from_sdp_string(text) {
        let again = Candidate::from_sdp_string(&c.to_sdp_string()).unwrap();
        assert_eq!(again.addr(), c.addr());
    }
});
