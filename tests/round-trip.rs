use rtc_sdp::{Candidate, Description, Direction, Protocol, Pt, RtpMap, SdpError, SdpType};

mod common;
use common::{init_log, parse, reparse, sdp, CHROME_OFFER, FIREFOX_OFFER};

fn formats(d: &Description) -> Vec<Vec<RtpMap>> {
    d.media_iter()
        .map(|m| m.formats().cloned().collect())
        .collect()
}

fn built_offer() -> Description {
    let mut offer = Description::new(SdpType::Offer);
    offer.set_ice_credentials("EsAw", "bP+XJMM09aR8AiX1jdukzR6Y");
    offer.set_fingerprint("8C:64:ED:03:76:D0:3D:B4");

    let audio = offer.add_audio_media();
    audio.add_opus_codec(Pt::from(111)).unwrap();
    audio.add_audio_codec(Pt::from(0), "PCMU", 8000, None).unwrap();

    let video = offer.add_video_media(Some(Direction::SendOnly));
    video.add_h264_codec(Pt::from(102)).unwrap();
    video.add_vp8_codec(Pt::from(96)).unwrap();
    video.set_bitrate(2500);

    offer.set_data_mid("data");
    offer.set_sctp_port(5000);
    offer.set_max_message_size(262_144);

    for port in [5000, 5001, 5002] {
        let addr = format!("192.168.1.3:{port}").parse().unwrap();
        offer.add_candidate(Candidate::host(addr, Protocol::Udp).unwrap());
    }
    offer
}

#[test]
pub fn built_offer_survives_reparse() {
    init_log();

    let offer = built_offer();
    let parsed = reparse(&offer);

    assert_eq!(parsed.media_count(), 2);
    assert_eq!(formats(&parsed), formats(&offer));
    assert_eq!(parsed.candidates(), offer.candidates());
    assert_eq!(parsed.ice_ufrag(), Some("EsAw"));
    assert_eq!(parsed.ice_pwd(), Some("bP+XJMM09aR8AiX1jdukzR6Y"));
    assert_eq!(parsed.fingerprint(), Some("8C:64:ED:03:76:D0:3D:B4"));
    assert_eq!(parsed.session_id(), offer.session_id());
    assert_eq!(parsed.media(1).unwrap().bitrate(), Some(2500));
    assert_eq!(parsed.media(1).unwrap().direction(), Direction::SendOnly);
    assert_eq!(parsed.data_mid(), Some("data"));
    assert_eq!(parsed.sctp_port(), Some(5000));
    assert_eq!(parsed.max_message_size(), Some(262_144));
    assert!(!parsed.ended());

    // Generation is stable once parsed.
    assert_eq!(reparse(&parsed).to_string(), parsed.to_string());
}

#[test]
pub fn chrome_offer_round_trip() {
    init_log();

    let offer = parse(&sdp(CHROME_OFFER), SdpType::Offer);
    assert_eq!(reparse(&offer), offer);
}

#[test]
pub fn firefox_offer_round_trip() {
    init_log();

    let offer = parse(&sdp(FIREFOX_OFFER), SdpType::Offer);
    assert_eq!(reparse(&offer), offer);
}

#[test]
pub fn lf_and_crlf_parse_the_same() {
    init_log();

    let crlf = parse(&sdp(CHROME_OFFER), SdpType::Offer);
    let lf = parse(&CHROME_OFFER.join("\n"), SdpType::Offer);
    assert_eq!(crlf, lf);
}

#[test]
pub fn end_candidates_idempotent() {
    init_log();

    let mut once = built_offer();
    once.end_candidates();
    let mut twice = once.clone();
    twice.end_candidates();

    assert!(twice.ended());
    assert_eq!(once, twice);
    assert_eq!(once.to_string(), twice.to_string());
}

#[test]
pub fn drain_exhaustion() {
    init_log();

    let mut offer = built_offer();
    offer.end_candidates();

    assert_eq!(offer.extract_candidates().len(), 3);
    assert!(offer.extract_candidates().is_empty());
    assert!(offer.ended());
}

#[test]
pub fn media_in_insertion_order() {
    init_log();

    let mut d = Description::new(SdpType::Offer);
    d.add_audio_media();
    d.add_video_media(None);

    assert_eq!(d.media(0).unwrap().typ(), "audio");
    assert_eq!(d.media(1).unwrap().typ(), "video");

    let text = d.generate_sdp("\n");
    let audio = text.find("m=audio ").unwrap();
    let video = text.find("m=video ").unwrap();
    assert!(audio < video);
}

#[test]
pub fn h264_codec_default() {
    init_log();

    let mut d = Description::new(SdpType::Offer);
    let video = d.add_video_media(None);
    video.add_h264_codec(Pt::from(96)).unwrap();

    let map = video.format(Pt::from(96)).unwrap();
    assert_eq!(map.format, "H264");
    assert_eq!(map.clock_rate, 90_000);
    assert_eq!(map.pt, Pt::from(96));
    assert!(!map.format_params.is_empty());
}

#[test]
pub fn format_removal() {
    init_log();

    let mut d = Description::new(SdpType::Offer);
    let video = d.add_video_media(None);
    video.add_vp8_codec(Pt::from(97)).unwrap();
    video.remove_format("vp8");

    assert!(matches!(
        video.format(Pt::from(97)),
        Err(SdpError::NotFound(_))
    ));
    assert!(!d.generate_sdp("\n").contains("a=rtpmap:97"));
}

#[test]
pub fn direction_exclusivity() {
    init_log();

    let mut d = Description::new(SdpType::Offer);
    let video = d.add_video_media(None);
    video.set_direction(Direction::SendOnly);
    assert_eq!(video.direction(), Direction::SendOnly);

    let text = d.generate_sdp("\n");
    let indicators = text
        .lines()
        .filter(|l| ["a=sendrecv", "a=sendonly", "a=recvonly", "a=inactive"].contains(l))
        .collect::<Vec<_>>();
    assert_eq!(indicators, vec!["a=sendonly"]);
}

#[test]
pub fn scenario_video_offer() {
    init_log();

    let mut d = Description::parse("", SdpType::Offer).unwrap();
    let video = d.add_video_media(Some(Direction::SendRecv));
    video.add_vp8_codec(Pt::from(96)).unwrap();

    let text = d.generate_sdp("\n");
    let lines: Vec<_> = text.lines().collect();

    let mline = lines.iter().find(|l| l.starts_with("m=video")).unwrap();
    assert!(mline.split(' ').skip(3).any(|pt| pt == "96"));
    assert!(lines.contains(&"a=rtpmap:96 VP8/90000"));
    assert!(lines.contains(&"a=sendrecv"));
}

#[test]
pub fn scenario_data_only() {
    init_log();

    let mut d = Description::new(SdpType::Offer);
    d.set_sctp_port(5000);
    d.set_max_message_size(65536);
    d.set_data_mid("data0");

    let text = d.generate_data_sdp("\n").unwrap();
    assert!(text.contains("a=sctp-port:5000\n"));
    assert!(text.contains("a=max-message-size:65536\n"));
    assert!(text.contains("a=mid:data0\n"));

    let mut d = Description::new(SdpType::Offer);
    d.set_max_message_size(65536);
    d.set_data_mid("data0");
    assert_eq!(
        d.generate_data_sdp("\n"),
        Err(SdpError::MissingField("sctp-port"))
    );
}

#[test]
pub fn data_sdp_reparses() {
    init_log();

    let mut d = built_offer();
    d.end_candidates();
    let text = d.generate_data_sdp("\r\n").unwrap();
    let parsed = Description::parse(&text, SdpType::Offer).unwrap();

    assert!(parsed.has_media());
    assert_eq!(parsed.media_count(), 0);
    assert_eq!(parsed.data_mid(), Some("data"));
    assert_eq!(parsed.sctp_port(), Some(5000));
    assert_eq!(parsed.ice_ufrag(), Some("EsAw"));
    assert_eq!(parsed.candidates().len(), 3);
    assert!(parsed.ended());
}
