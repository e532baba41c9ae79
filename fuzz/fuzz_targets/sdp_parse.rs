#![no_main]

use libfuzzer_sys::fuzz_target;
use rtc_sdp::{Description, SdpType};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(desc) = Description::parse(text, SdpType::Offer) else {
        return;
    };

    // Anything we accept, we must be able to regenerate and accept again.
    let again = Description::parse(&desc.to_string(), SdpType::Offer).unwrap();
    assert_eq!(again.media_count(), desc.media_count());
    assert_eq!(again.candidates().len(), desc.candidates().len());
    let _ = desc.generate_data_sdp("\n");
});
