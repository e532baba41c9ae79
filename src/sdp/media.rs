use std::fmt;
use std::ops::Deref;

use crate::SdpError;

/// Profile used for every generated audio/video m-line.
pub(crate) const RTP_PROTO: &str = "UDP/TLS/RTP/SAVPF";

// The canonical H264 format parameters, constrained baseline level 3.1.
const H264_FMTP: &str = "profile-level-id=42e01f;packetization-mode=1;level-asymmetry-allowed=1";

const VIDEO_CLOCK_RATE: u32 = 90_000;

// negative-ack, picture-loss-indication, receiver-estimated-max-bitrate and
// transport-wide congestion control.
const VIDEO_FEEDBACK: &[&str] = &["nack", "nack pli", "goog-remb", "transport-cc"];

/// Payload type, selecting a codec within one media section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pt(u8);

impl Deref for Pt {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u8> for Pt {
    fn from(v: u8) -> Self {
        Pt(v)
    }
}

impl fmt::Display for Pt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Send only direction.
    SendOnly,
    /// Receive only direction.
    RecvOnly,
    /// Bi-directional.
    SendRecv,
    /// Disabled direction.
    Inactive,
    /// No direction indicator present.
    Unknown,
}

impl Direction {
    /// Change the direction to the opposite.
    ///
    /// `SendRecv`, `Inactive` and `Unknown` are left unchanged.
    pub fn invert(&self) -> Self {
        match self {
            Direction::SendOnly => Direction::RecvOnly,
            Direction::RecvOnly => Direction::SendOnly,
            _ => *self,
        }
    }

    /// The attribute token, `None` for `Unknown`.
    pub fn as_attribute(&self) -> Option<&'static str> {
        match self {
            Direction::SendOnly => Some("sendonly"),
            Direction::RecvOnly => Some("recvonly"),
            Direction::SendRecv => Some("sendrecv"),
            Direction::Inactive => Some("inactive"),
            Direction::Unknown => None,
        }
    }
}

impl From<&str> for Direction {
    fn from(v: &str) -> Self {
        use Direction::*;
        match v {
            "sendonly" => SendOnly,
            "recvonly" => RecvOnly,
            "sendrecv" => SendRecv,
            "inactive" => Inactive,
            _ => Unknown,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_attribute().unwrap_or("unknown"))
    }
}

/// Normalised form of a codec name.
///
/// All format name comparisons (parsing, lookup and removal) go through this.
pub fn normalize_format(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn format_matches(a: &str, b: &str) -> bool {
    normalize_format(a) == normalize_format(b)
}

/// One codec entry of a media section, the `a=rtpmap` line and its
/// associated `a=rtcp-fb` and `a=fmtp` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpMap {
    /// Payload type, unique within the section.
    pub pt: Pt,
    /// Codec name, i.e. `H264`, `VP8` or `opus`.
    pub format: String,
    /// Clock rate in Hz.
    pub clock_rate: u32,
    /// Encoding parameters, for audio the channel count.
    pub encoding_params: Option<String>,
    /// RTCP feedback capabilities, `nack pli`, `transport-cc`...
    pub feedback: Vec<String>,
    /// Format specific parameters, one entry per `a=fmtp` line.
    pub format_params: Vec<String>,
}

impl RtpMap {
    /// Creates a codec entry without feedback or format parameters.
    pub fn new(pt: Pt, format: impl Into<String>, clock_rate: u32) -> Self {
        RtpMap {
            pt,
            format: format.into(),
            clock_rate,
            encoding_params: None,
            feedback: vec![],
            format_params: vec![],
        }
    }

    /// Whether the format name matches, ignoring case.
    pub fn is_format(&self, name: &str) -> bool {
        format_matches(&self.format, name)
    }

    /// Append a feedback capability. Duplicates are kept.
    pub fn add_fb(&mut self, fb: impl Into<String>) {
        self.feedback.push(fb.into());
    }

    /// Remove every feedback capability exactly matching `fb`.
    pub fn remove_fb(&mut self, fb: &str) {
        self.feedback.retain(|f| f != fb);
    }

    /// Append a format parameter string.
    pub fn add_fmtp(&mut self, fmtp: impl Into<String>) {
        self.format_params.push(fmtp.into());
    }

    /// The `a=rtpmap` value, e.g. `111 opus/48000/2`.
    pub fn rtpmap_value(&self) -> String {
        let mut s = format!("{} {}/{}", self.pt, self.format, self.clock_rate);
        if let Some(e) = &self.encoding_params {
            s.push('/');
            s.push_str(e);
        }
        s
    }
}

/// One audio/video media section.
///
/// SCTP application sections are not represented by this type, they become
/// the description's [`Data`][super::Data] block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub(crate) typ: String,
    pub(crate) proto: String,
    pub(crate) mid: String,
    pub(crate) attributes: Vec<String>,
    pub(crate) bitrate: Option<u32>,
    pub(crate) direction: Direction,
    // m-line port 0, a rejected section.
    pub(crate) disabled: bool,
    // Payload types in m-line order, including static types without rtpmap.
    pub(crate) pts: Vec<Pt>,
    pub(crate) rtp_maps: Vec<RtpMap>,
}

impl Media {
    /// Creates an empty media section of the given type ("audio", "video"...).
    pub fn new(typ: impl Into<String>, mid: impl Into<String>) -> Self {
        Media {
            typ: typ.into(),
            proto: RTP_PROTO.to_string(),
            mid: mid.into(),
            attributes: vec![],
            bitrate: None,
            direction: Direction::Unknown,
            disabled: false,
            pts: vec![],
            rtp_maps: vec![],
        }
    }

    /// The media type token.
    pub fn typ(&self) -> &str {
        &self.typ
    }

    /// Transport protocol from the m-line.
    pub fn proto(&self) -> &str {
        &self.proto
    }

    /// The media identifier.
    pub fn mid(&self) -> &str {
        &self.mid
    }

    /// Verbatim attributes (without `a=`) in their original order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Append a verbatim attribute, value without `a=`.
    pub fn add_attribute(&mut self, attr: impl Into<String>) {
        self.attributes.push(attr.into());
    }

    /// Payload types in m-line order.
    pub fn payload_types(&self) -> &[Pt] {
        &self.pts
    }

    /// The codec entries in the order they were declared.
    pub fn formats(&self) -> impl Iterator<Item = &RtpMap> {
        self.rtp_maps.iter()
    }

    /// Look up the codec entry for a payload type.
    pub fn format(&self, pt: Pt) -> Result<&RtpMap, SdpError> {
        self.rtp_maps
            .iter()
            .find(|r| r.pt == pt)
            .ok_or_else(|| SdpError::NotFound(format!("format for payload type {pt}")))
    }

    /// Mutable access to the codec entry for a payload type.
    pub fn format_mut(&mut self, pt: Pt) -> Result<&mut RtpMap, SdpError> {
        self.rtp_maps
            .iter_mut()
            .find(|r| r.pt == pt)
            .ok_or_else(|| SdpError::NotFound(format!("format for payload type {pt}")))
    }

    /// Look up the first codec entry by name, ignoring case.
    pub fn format_by_name(&self, name: &str) -> Result<&RtpMap, SdpError> {
        self.rtp_maps
            .iter()
            .find(|r| r.is_format(name))
            .ok_or_else(|| SdpError::NotFound(format!("format {name}")))
    }

    /// Mutable access to the first codec entry by name, ignoring case.
    pub fn format_by_name_mut(&mut self, name: &str) -> Result<&mut RtpMap, SdpError> {
        self.rtp_maps
            .iter_mut()
            .find(|r| r.is_format(name))
            .ok_or_else(|| SdpError::NotFound(format!("format {name}")))
    }

    /// Remove every codec entry with a matching name, ignoring case.
    ///
    /// Removing a name that is not present is not an error.
    pub fn remove_format(&mut self, name: &str) {
        let removed: Vec<Pt> = self
            .rtp_maps
            .iter()
            .filter(|r| r.is_format(name))
            .map(|r| r.pt)
            .collect();

        if removed.is_empty() {
            return;
        }

        trace!("Remove format {} from mid {}: {:?}", name, self.mid, removed);
        self.rtp_maps.retain(|r| !removed.contains(&r.pt));
        self.pts.retain(|pt| !removed.contains(pt));
    }

    /// Insert a codec entry. The payload type must not already be in use.
    pub fn add_format(&mut self, rtp_map: RtpMap) -> Result<&mut RtpMap, SdpError> {
        let pt = rtp_map.pt;
        if self.pts.contains(&pt) {
            return Err(SdpError::Duplicate(format!(
                "payload type {pt} in mid {}",
                self.mid
            )));
        }
        self.pts.push(pt);
        self.rtp_maps.push(rtp_map);
        let idx = self.rtp_maps.len() - 1;
        Ok(&mut self.rtp_maps[idx])
    }

    /// Add a video codec with clock rate 90000 and the default feedback set.
    pub fn add_video_codec(&mut self, pt: Pt, codec: &str) -> Result<&mut RtpMap, SdpError> {
        let mut map = RtpMap::new(pt, codec, VIDEO_CLOCK_RATE);
        for fb in VIDEO_FEEDBACK {
            map.add_fb(*fb);
        }
        self.add_format(map)
    }

    /// Add H264 with the canonical constrained baseline parameters.
    pub fn add_h264_codec(&mut self, pt: Pt) -> Result<&mut RtpMap, SdpError> {
        let map = self.add_video_codec(pt, "H264")?;
        map.add_fmtp(H264_FMTP);
        Ok(map)
    }

    /// Add VP8.
    pub fn add_vp8_codec(&mut self, pt: Pt) -> Result<&mut RtpMap, SdpError> {
        self.add_video_codec(pt, "VP8")
    }

    /// Add VP9.
    pub fn add_vp9_codec(&mut self, pt: Pt) -> Result<&mut RtpMap, SdpError> {
        self.add_video_codec(pt, "VP9")
    }

    /// Add an audio codec.
    pub fn add_audio_codec(
        &mut self,
        pt: Pt,
        codec: &str,
        clock_rate: u32,
        channels: Option<u8>,
    ) -> Result<&mut RtpMap, SdpError> {
        let mut map = RtpMap::new(pt, codec, clock_rate);
        map.encoding_params = channels.map(|c| c.to_string());
        self.add_format(map)
    }

    /// Add stereo opus at 48kHz with in-band FEC.
    pub fn add_opus_codec(&mut self, pt: Pt) -> Result<&mut RtpMap, SdpError> {
        let map = self.add_audio_codec(pt, "opus", 48_000, Some(2))?;
        map.add_fb("transport-cc");
        map.add_fmtp("minptime=10;useinbandfec=1");
        Ok(map)
    }

    /// Bandwidth cap (`b=AS`) in kbps, `None` when unbounded.
    pub fn bitrate(&self) -> Option<u32> {
        self.bitrate
    }

    /// Set the bandwidth cap in kbps.
    pub fn set_bitrate(&mut self, kbps: u32) {
        self.bitrate = Some(kbps);
    }

    /// Remove the bandwidth cap.
    pub fn clear_bitrate(&mut self) {
        self.bitrate = None;
    }

    /// The direction, `Unknown` if no indicator is set.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Replace any direction indicator with `dir`.
    pub fn set_direction(&mut self, dir: Direction) {
        self.direction = dir;
    }

    /// Whether the section was rejected (m-line port 0).
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Mark the section rejected. It is generated with port 0.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Merge a section with the same mid from another description.
    ///
    /// Codec entries for payload types not present locally are added,
    /// missing verbatim attributes appended. Direction and bitrate are only
    /// taken when not set locally.
    pub(crate) fn merge(&mut self, other: &Media) {
        for r in &other.rtp_maps {
            if !self.pts.contains(&r.pt) {
                self.pts.push(r.pt);
                self.rtp_maps.push(r.clone());
            }
        }
        for pt in &other.pts {
            if !self.pts.contains(pt) {
                self.pts.push(*pt);
            }
        }
        for a in &other.attributes {
            if !self.attributes.contains(a) {
                self.attributes.push(a.clone());
            }
        }
        if self.direction == Direction::Unknown {
            self.direction = other.direction;
        }
        if self.bitrate.is_none() {
            self.bitrate = other.bitrate;
        }
    }
}
