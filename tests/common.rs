#![allow(unused)]
use std::sync::Once;

use rtc_sdp::{Description, SdpConfig, SdpType};

pub fn init_log() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    static START: Once = Once::new();

    START.call_once(|| {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(env_filter)
            .init();
    });
}

/// Parse with a fixed session id so generated text is predictable.
pub fn parse(sdp: &str, typ: SdpType) -> Description {
    let config = SdpConfig::new().set_session_id("1234");
    Description::parse_with(sdp, typ, &config).expect("parse sdp")
}

/// Reparse generated text, the way a remote peer would see it.
pub fn reparse(desc: &Description) -> Description {
    Description::parse(&desc.to_string(), desc.typ()).expect("reparse sdp")
}

/// Join lines with CRLF, including after the last one.
pub fn sdp(lines: &[&str]) -> String {
    let mut s = lines.join("\r\n");
    s.push_str("\r\n");
    s
}

pub const CHROME_OFFER: &[&str] = &[
    "v=0",
    "o=- 4611731400430051336 2 IN IP4 127.0.0.1",
    "s=-",
    "t=0 0",
    "a=group:BUNDLE 0 1 2",
    "a=extmap-allow-mixed",
    "a=msid-semantic: WMS 5d3a5d0e",
    "m=audio 9 UDP/TLS/RTP/SAVPF 111 63 9 0 8 13 110 126",
    "c=IN IP4 0.0.0.0",
    "a=rtcp:9 IN IP4 0.0.0.0",
    "a=candidate:3684617590 1 udp 2122260223 10.217.229.219 50028 typ host generation 0 network-id 1 network-cost 900",
    "a=candidate:387183333 1 udp 1686052607 113.185.55.72 31267 typ srflx raddr 10.217.229.219 rport 50028 generation 0 network-id 1 network-cost 900",
    "a=ice-ufrag:S5hk",
    "a=ice-pwd:0zV/Yu3y8aDzbHgqWhnVQhqP",
    "a=ice-options:trickle",
    "a=fingerprint:sha-256 8C:64:ED:03:76:D0:3D:B4:C1:5A:C3:7D:35:DB:A8:94:6E:92:6B:85:08:A8:8D:C3:76:36:F8:2F:DF:12:6F:2C",
    "a=setup:actpass",
    "a=mid:0",
    "a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level",
    "a=sendrecv",
    "a=msid:5d3a5d0e 1a2b3c4d",
    "a=rtcp-mux",
    "a=rtpmap:111 opus/48000/2",
    "a=rtcp-fb:111 transport-cc",
    "a=fmtp:111 minptime=10;useinbandfec=1",
    "a=rtpmap:63 red/48000/2",
    "a=fmtp:63 111/111",
    "a=rtpmap:9 G722/8000",
    "a=rtpmap:0 PCMU/8000",
    "a=rtpmap:8 PCMA/8000",
    "a=rtpmap:13 CN/8000",
    "a=rtpmap:110 telephone-event/48000",
    "a=rtpmap:126 telephone-event/8000",
    "a=ssrc:3948621874 cname:Yh0BtLTcMSRSb0Nz",
    "m=video 9 UDP/TLS/RTP/SAVPF 96 97 102 103",
    "c=IN IP4 0.0.0.0",
    "a=rtcp:9 IN IP4 0.0.0.0",
    "a=ice-ufrag:S5hk",
    "a=ice-pwd:0zV/Yu3y8aDzbHgqWhnVQhqP",
    "a=ice-options:trickle",
    "a=fingerprint:sha-256 8C:64:ED:03:76:D0:3D:B4:C1:5A:C3:7D:35:DB:A8:94:6E:92:6B:85:08:A8:8D:C3:76:36:F8:2F:DF:12:6F:2C",
    "a=setup:actpass",
    "a=mid:1",
    "a=extmap:2 http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time",
    "a=recvonly",
    "a=rtcp-mux",
    "a=rtcp-rsize",
    "a=rtpmap:96 VP8/90000",
    "a=rtcp-fb:96 goog-remb",
    "a=rtcp-fb:96 transport-cc",
    "a=rtcp-fb:96 ccm fir",
    "a=rtcp-fb:96 nack",
    "a=rtcp-fb:96 nack pli",
    "a=rtpmap:97 rtx/90000",
    "a=fmtp:97 apt=96",
    "a=rtpmap:102 H264/90000",
    "a=rtcp-fb:102 goog-remb",
    "a=rtcp-fb:102 nack",
    "a=rtcp-fb:102 nack pli",
    "a=fmtp:102 level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42001f",
    "a=rtpmap:103 rtx/90000",
    "a=fmtp:103 apt=102",
    "m=application 9 UDP/DTLS/SCTP webrtc-datachannel",
    "c=IN IP4 0.0.0.0",
    "a=ice-ufrag:S5hk",
    "a=ice-pwd:0zV/Yu3y8aDzbHgqWhnVQhqP",
    "a=ice-options:trickle",
    "a=fingerprint:sha-256 8C:64:ED:03:76:D0:3D:B4:C1:5A:C3:7D:35:DB:A8:94:6E:92:6B:85:08:A8:8D:C3:76:36:F8:2F:DF:12:6F:2C",
    "a=setup:actpass",
    "a=mid:2",
    "a=sctp-port:5000",
    "a=max-message-size:262144",
];

pub const FIREFOX_OFFER: &[&str] = &[
    "v=0",
    "o=mozilla...THIS_IS_SDPARTA-99.0 3947254735486406453 0 IN IP4 0.0.0.0",
    "s=-",
    "t=0 0",
    "a=fingerprint:sha-256 2A:7C:E3:9F:11:D0:C5:6B:0E:3F:8A:94:DE:71:0B:3C:55:8E:A2:19:F4:60:7D:E8:13:C9:2B:AA:5F:03:E6:41",
    "a=group:BUNDLE 0 1",
    "a=ice-options:trickle",
    "a=msid-semantic:WMS *",
    "m=audio 9 UDP/TLS/RTP/SAVPF 109 9 0 8 101",
    "c=IN IP4 0.0.0.0",
    "a=sendrecv",
    "a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level",
    "a=fmtp:109 maxplaybackrate=48000;stereo=1;useinbandfec=1",
    "a=fmtp:101 0-15",
    "a=ice-pwd:d64ef3ef7fb0ca6e6e6a6e2a1b6dbb82",
    "a=ice-ufrag:5a2b5a8e",
    "a=mid:0",
    "a=msid:{b3c1e7d2-6a2f-4c0e-9d41-2f5f7a4c0e11} {7c9e0a44-2d8b-4f5e-a1c3-9b6d2e8f4a07}",
    "a=rtcp-mux",
    "a=rtpmap:109 opus/48000/2",
    "a=rtpmap:9 G722/8000/1",
    "a=rtpmap:0 PCMU/8000",
    "a=rtpmap:8 PCMA/8000",
    "a=rtpmap:101 telephone-event/8000",
    "a=setup:actpass",
    "a=ssrc:2422347340 cname:{0f0d8f36-88a3-4d6e-bd4b-7e1c3a2f9d55}",
    "m=application 9 UDP/DTLS/SCTP webrtc-datachannel",
    "c=IN IP4 0.0.0.0",
    "a=sendrecv",
    "a=ice-pwd:d64ef3ef7fb0ca6e6e6a6e2a1b6dbb82",
    "a=ice-ufrag:5a2b5a8e",
    "a=mid:1",
    "a=setup:actpass",
    "a=sctp-port:5000",
    "a=max-message-size:1073741823",
];
