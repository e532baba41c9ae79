//! Session descriptions for WebRTC in Rust.
//!
//! This crate models the SDP documents two WebRTC peers exchange during
//! offer/answer negotiation. It parses browser generated SDP into a
//! [`Description`], lets you inspect and edit it, and generates the
//! canonical WebRTC SDP text again. It does no network talking, ICE or DTLS.
//! Those belong to the layers that consume the description.
//!
//! # Usage
//!
//! ## Answering
//!
//! Parse the remote offer, compose an answer from its sections and send
//! the answer back over whatever signaling channel you use.
//!
//! ```
//! use rtc_sdp::{Description, SdpType};
//!
//! let offer = "v=0\r\n\
//!     o=- 4611731400430051336 2 IN IP4 127.0.0.1\r\n\
//!     s=-\r\n\
//!     t=0 0\r\n\
//!     a=group:BUNDLE 0\r\n\
//!     m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n\
//!     c=IN IP4 0.0.0.0\r\n\
//!     a=ice-ufrag:EsAw\r\n\
//!     a=ice-pwd:bP+XJMM09aR8AiX1jdukzR6Y\r\n\
//!     a=fingerprint:sha-256 DA:39:A3:EE:5E:6B:4B:0D:32:55:BF:EF:95:60:18:90:AF:D8:07:09\r\n\
//!     a=setup:actpass\r\n\
//!     a=mid:0\r\n\
//!     a=sctp-port:5000\r\n";
//!
//! let offer = Description::parse(offer, SdpType::Offer).unwrap();
//! assert_eq!(offer.sctp_port(), Some(5000));
//!
//! let mut answer = Description::new(SdpType::Answer);
//! answer.add_media(&offer).unwrap();
//! answer.set_ice_credentials("Hq2r", "nLx0uXwqUPGTZ7qUqz9gEi1X");
//!
//! let sdp = answer.to_string();
//! assert!(sdp.contains("a=setup:passive\r\n"));
//! assert!(sdp.contains("a=mid:0\r\n"));
//! ```
//!
//! ## Offering
//!
//! ```
//! use rtc_sdp::{Candidate, Description, Direction, Protocol, Pt, SdpType};
//!
//! let mut offer = Description::new(SdpType::Offer);
//! offer.set_ice_credentials("EsAw", "bP+XJMM09aR8AiX1jdukzR6Y");
//!
//! let audio = offer.add_audio_media();
//! audio.add_opus_codec(Pt::from(111)).unwrap();
//!
//! let video = offer.add_video_media(Some(Direction::SendRecv));
//! video.add_h264_codec(Pt::from(102)).unwrap();
//!
//! let addr = "1.2.3.4:5000".parse().unwrap();
//! offer.add_candidate(Candidate::host(addr, Protocol::Udp).unwrap());
//! offer.end_candidates();
//!
//! // Send to the remote peer.
//! let sdp = offer.to_string();
//! # assert!(sdp.contains("a=group:BUNDLE 0 1\r\n"));
//! ```
//!
//! ## Trickle ICE
//!
//! Candidates gathered after the description was sent travel on their
//! own. [`Description::extract_candidates()`] takes what has been buffered
//! so far, and [`Candidate`] serializes as the browser's
//! `RTCIceCandidateInit`.
//!
//! # Line endings
//!
//! Parsing accepts CRLF and LF. [`Description::generate_sdp()`] takes the
//! terminator to use, while `Display` always uses CRLF.
//!
//! # Logging
//!
//! The crate logs through [`tracing`]. With the `pii` feature enabled,
//! candidate addresses and ICE credentials are redacted in logs from
//! `debug` level and up.

#![forbid(unsafe_code)]
#![allow(clippy::new_without_default)]
#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod candidate;
pub use candidate::{Candidate, CandidateKind, Protocol};

mod config;
pub use config::SdpConfig;

mod error;
pub use error::{ParseReason, SdpError};

mod sdp;
pub use sdp::{normalize_format, Data, Description, Direction, Media, Pt, Role, RtpMap, SdpType};

mod util;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn description_is_send_sync() {
        fn is_send<T: Send>(_t: T) {}
        fn is_sync<T: Sync>(_t: T) {}
        is_send(Description::new(SdpType::Offer));
        is_sync(Description::new(SdpType::Offer));
    }

    #[test]
    fn error_is_send_sync() {
        fn is_send_sync<T: Send + Sync + 'static>(_t: T) {}
        is_send_sync(SdpError::MissingField("sctp-port"));
    }
}
