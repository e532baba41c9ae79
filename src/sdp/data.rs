use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::candidate::{Candidate, CandidateQueue};
use crate::{SdpConfig, SdpError};

use super::media::{Direction, Media};
use super::reader;

/// Kind of description in the offer/answer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SdpType {
    /// Not yet known, see [`Description::hint_type()`].
    #[default]
    Unspecified,
    /// An offer.
    Offer,
    /// A final answer.
    Answer,
    /// A provisional answer.
    PrAnswer,
}

impl SdpType {
    /// Whether this is an answer or provisional answer.
    pub fn is_answer(&self) -> bool {
        matches!(self, SdpType::Answer | SdpType::PrAnswer)
    }

    /// The lowercase token, `"unspec"` for [`SdpType::Unspecified`].
    pub fn as_str(&self) -> &'static str {
        match self {
            SdpType::Unspecified => "unspec",
            SdpType::Offer => "offer",
            SdpType::Answer => "answer",
            SdpType::PrAnswer => "pranswer",
        }
    }
}

impl From<&str> for SdpType {
    /// Unknown tokens become [`SdpType::Unspecified`].
    fn from(v: &str) -> Self {
        match v {
            "offer" => SdpType::Offer,
            "answer" => SdpType::Answer,
            "pranswer" => SdpType::PrAnswer,
            _ => SdpType::Unspecified,
        }
    }
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DTLS setup role, the `a=setup` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Either side may take the client role. Used in offers.
    ActPass,
    /// Wait for the remote side to start the DTLS handshake.
    Passive,
    /// Start the DTLS handshake.
    Active,
}

impl Role {
    /// The `a=setup` token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ActPass => "actpass",
            Role::Passive => "passive",
            Role::Active => "active",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The SCTP application section carrying data channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    /// The media identifier of the section.
    pub mid: String,
    /// SCTP port from `a=sctp-port` (or the legacy m-line format).
    pub sctp_port: Option<u16>,
    /// `a=max-message-size`.
    pub max_message_size: Option<usize>,
    /// Verbatim attributes (without `a=`) not otherwise understood.
    pub attributes: Vec<String>,
    // m-line position. None renders after all media sections.
    pub(crate) index: Option<usize>,
}

impl Data {
    fn new(mid: impl Into<String>) -> Self {
        Data {
            mid: mid.into(),
            sctp_port: None,
            max_message_size: None,
            attributes: vec![],
            index: None,
        }
    }
}

/// A session description.
///
/// Holds session level transport parameters, at most one [`Data`] block
/// and any number of [`Media`] sections, in m-line order. Parsing and
/// generation are lossless for everything the model captures.
///
/// ```
/// use rtc_sdp::{Description, Direction, Pt, SdpType};
///
/// let mut offer = Description::new(SdpType::Offer);
/// offer.set_data_mid("data");
/// offer.set_sctp_port(5000);
///
/// let video = offer.add_video_media(Some(Direction::SendRecv));
/// video.add_h264_codec(Pt::from(96)).unwrap();
///
/// let sdp = offer.to_string();
/// let parsed = Description::parse(&sdp, SdpType::Offer).unwrap();
/// assert_eq!(parsed.sctp_port(), Some(5000));
/// assert_eq!(parsed.media_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub(crate) typ: SdpType,
    pub(crate) role: Role,
    pub(crate) answer_role: Role,
    pub(crate) session_id: String,
    pub(crate) ice_ufrag: Option<String>,
    pub(crate) ice_pwd: Option<String>,
    pub(crate) fingerprint: Option<String>,
    // Verbatim session level attributes, without a=.
    pub(crate) attributes: Vec<String>,
    pub(crate) data: Option<Data>,
    // Keyed by m-line index.
    pub(crate) media: BTreeMap<usize, Media>,
    pub(crate) candidates: CandidateQueue,
}

impl Description {
    /// Creates an empty description with a random session id.
    pub fn new(typ: SdpType) -> Self {
        Self::with_config(typ, &SdpConfig::default())
    }

    /// Creates an empty description following the given policy.
    pub fn with_config(typ: SdpType, config: &SdpConfig) -> Self {
        Description {
            typ,
            role: initial_role(typ, config.answer_role),
            answer_role: config.answer_role,
            session_id: config.new_session_id(),
            ice_ufrag: None,
            ice_pwd: None,
            fingerprint: None,
            attributes: vec![],
            data: None,
            media: BTreeMap::new(),
            candidates: CandidateQueue::default(),
        }
    }

    /// Parse an SDP text.
    ///
    /// Accepts CRLF or LF line endings. Either the whole text is accepted or
    /// an error is returned naming the offending line.
    pub fn parse(sdp: &str, typ: impl Into<SdpType>) -> Result<Self, SdpError> {
        Self::parse_with(sdp, typ, &SdpConfig::default())
    }

    /// Parse an SDP text following the given policy.
    pub fn parse_with(
        sdp: &str,
        typ: impl Into<SdpType>,
        config: &SdpConfig,
    ) -> Result<Self, SdpError> {
        let desc = reader::read(sdp, typ.into(), config)?;
        debug!(
            "Parsed {} sdp, session {}: {} media, data: {}",
            desc.typ,
            desc.session_id,
            desc.media.len(),
            desc.data.is_some()
        );
        Ok(desc)
    }

    /// The kind of description.
    pub fn typ(&self) -> SdpType {
        self.typ
    }

    /// Same as [`SdpType::as_str()`] for this description.
    pub fn type_string(&self) -> &'static str {
        self.typ.as_str()
    }

    /// The resolved DTLS role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Same as [`Role::as_str()`] for this description.
    pub fn role_string(&self) -> &'static str {
        self.role.as_str()
    }

    /// The `o=` session id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Fix the type of an [`SdpType::Unspecified`] description.
    ///
    /// An answer still at [`Role::ActPass`] takes the configured answer role.
    /// Descriptions with a known type are left alone.
    pub fn hint_type(&mut self, typ: SdpType) {
        if self.typ != SdpType::Unspecified {
            return;
        }
        self.typ = typ;
        if typ.is_answer() && self.role == Role::ActPass {
            self.role = self.answer_role;
        }
        trace!("Hinted sdp type {} role {}", self.typ, self.role);
    }

    /// Set the DTLS role.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// ICE username fragment.
    pub fn ice_ufrag(&self) -> Option<&str> {
        self.ice_ufrag.as_deref()
    }

    /// ICE password.
    pub fn ice_pwd(&self) -> Option<&str> {
        self.ice_pwd.as_deref()
    }

    /// Set the ICE credentials.
    pub fn set_ice_credentials(&mut self, ufrag: impl Into<String>, pwd: impl Into<String>) {
        self.ice_ufrag = Some(ufrag.into());
        self.ice_pwd = Some(pwd.into());
    }

    /// The sha-256 certificate fingerprint, uppercase colon separated hex.
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    /// Set the sha-256 certificate fingerprint.
    pub fn set_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.fingerprint = Some(fingerprint.into().to_ascii_uppercase());
    }

    /// Verbatim session level attributes, without `a=`.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Append a verbatim session level attribute, value without `a=`.
    pub fn add_attribute(&mut self, attr: impl Into<String>) {
        self.attributes.push(attr.into());
    }

    /// The data block, if any.
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Mid of the data block.
    pub fn data_mid(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.mid.as_str())
    }

    /// SCTP port of the data block.
    pub fn sctp_port(&self) -> Option<u16> {
        self.data.as_ref().and_then(|d| d.sctp_port)
    }

    /// Max message size of the data block.
    pub fn max_message_size(&self) -> Option<usize> {
        self.data.as_ref().and_then(|d| d.max_message_size)
    }

    /// Set the data block mid, creating the block if needed.
    pub fn set_data_mid(&mut self, mid: impl Into<String>) {
        self.data_mut().mid = mid.into();
    }

    /// Set the SCTP port, creating the data block if needed.
    pub fn set_sctp_port(&mut self, port: u16) {
        self.data_mut().sctp_port = Some(port);
    }

    /// Set the max message size, creating the data block if needed.
    pub fn set_max_message_size(&mut self, size: usize) {
        self.data_mut().max_message_size = Some(size);
    }

    fn data_mut(&mut self) -> &mut Data {
        // The same default as a parsed section without a=mid.
        let mid = self.unique_mid(self.next_index());
        self.data.get_or_insert_with(|| Data::new(mid))
    }

    /// Add a local candidate.
    ///
    /// A candidate without mid is associated with the bundle mid.
    pub fn add_candidate(&mut self, mut candidate: Candidate) {
        if let Some(mid) = self.bundle_mid() {
            candidate.set_mid_if_none(&mid);
        }
        debug!("Add candidate: {:?}", candidate);
        self.candidates.push(candidate);
    }

    /// Mark gathering complete. Emits `a=end-of-candidates`.
    pub fn end_candidates(&mut self) {
        self.candidates.close();
    }

    /// Whether gathering is complete.
    pub fn ended(&self) -> bool {
        self.candidates.is_closed()
    }

    /// The buffered candidates in arrival order.
    pub fn candidates(&self) -> &[Candidate] {
        self.candidates.as_slice()
    }

    /// Take all buffered candidates, leaving none behind.
    ///
    /// Does not change [`Description::ended()`].
    pub fn extract_candidates(&mut self) -> Vec<Candidate> {
        self.candidates.drain()
    }

    /// Whether any section exists, audio/video or data.
    pub fn has_media(&self) -> bool {
        !self.media.is_empty() || self.data.is_some()
    }

    /// Number of audio/video sections.
    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    /// Media section by position among the media sections.
    pub fn media(&self, index: usize) -> Result<&Media, SdpError> {
        self.media
            .values()
            .nth(index)
            .ok_or_else(|| SdpError::NotFound(format!("media at index {index}")))
    }

    /// Mutable media section by position among the media sections.
    pub fn media_mut(&mut self, index: usize) -> Result<&mut Media, SdpError> {
        self.media
            .values_mut()
            .nth(index)
            .ok_or_else(|| SdpError::NotFound(format!("media at index {index}")))
    }

    /// Media section by mid.
    pub fn media_by_mid(&self, mid: &str) -> Option<&Media> {
        self.media.values().find(|m| m.mid == mid)
    }

    /// Mutable media section by mid.
    pub fn media_by_mid_mut(&mut self, mid: &str) -> Option<&mut Media> {
        self.media.values_mut().find(|m| m.mid == mid)
    }

    /// All media sections in m-line order.
    pub fn media_iter(&self) -> impl Iterator<Item = &Media> {
        self.media.values()
    }

    /// Append an audio section with direction sendrecv.
    pub fn add_audio_media(&mut self) -> &mut Media {
        self.push_media("audio", Direction::SendRecv)
    }

    /// Append a video section, `None` meaning recvonly.
    pub fn add_video_media(&mut self, dir: Option<Direction>) -> &mut Media {
        self.push_media("video", dir.unwrap_or(Direction::RecvOnly))
    }

    fn push_media(&mut self, typ: &str, dir: Direction) -> &mut Media {
        let index = self.next_index();
        let mut media = Media::new(typ, self.unique_mid(index));
        media.set_direction(dir);
        media.add_attribute("rtcp-mux");
        debug!("Add {} media, mid {}", typ, media.mid);
        self.media.entry(index).or_insert(media)
    }

    /// Copy the media sections of another description into this one.
    ///
    /// Sections whose mid already exists are merged, the rest appended in
    /// order. The data block is copied when this description has none. On
    /// error nothing is changed.
    pub fn add_media(&mut self, other: &Description) -> Result<(), SdpError> {
        let data_mid = self.data_mid();
        if let Some(m) = other.media.values().find(|m| Some(m.mid.as_str()) == data_mid) {
            return Err(SdpError::Duplicate(format!(
                "mid {} used by the data section",
                m.mid
            )));
        }
        if let (None, Some(d)) = (&self.data, &other.data) {
            if self.media_by_mid(&d.mid).is_some() {
                return Err(SdpError::Duplicate(format!(
                    "mid {} used by a media section",
                    d.mid
                )));
            }
        }

        for m in other.media.values() {
            if let Some(existing) = self.media_by_mid_mut(&m.mid) {
                trace!("Merge media mid {}", m.mid);
                existing.merge(m);
            } else {
                let index = self.next_index();
                trace!("Append media mid {} at {}", m.mid, index);
                self.media.insert(index, m.clone());
            }
        }

        if self.data.is_none() {
            if let Some(d) = &other.data {
                let mut d = d.clone();
                d.index = Some(self.next_index());
                self.data = Some(d);
            }
        }

        Ok(())
    }

    /// The mid all sections are bundled on, the first section's mid.
    pub fn bundle_mid(&self) -> Option<String> {
        self.sections().next().map(|s| s.mid().to_string())
    }

    /// All sections, media and data, in m-line order.
    pub(crate) fn sections(&self) -> impl Iterator<Item = Section<'_>> {
        let mut all: Vec<_> = self
            .media
            .iter()
            .map(|(i, m)| (*i, Section::Media(m)))
            .collect();
        if let Some(d) = &self.data {
            all.push((d.index.unwrap_or(usize::MAX), Section::Data(d)));
        }
        all.sort_by_key(|(i, _)| *i);
        all.into_iter().map(|(_, s)| s)
    }

    fn next_index(&self) -> usize {
        let media = self.media.keys().next_back().map(|i| i + 1).unwrap_or(0);
        let data = self
            .data
            .as_ref()
            .and_then(|d| d.index)
            .map(|i| i + 1)
            .unwrap_or(0);
        media.max(data)
    }

    fn unique_mid(&self, index: usize) -> String {
        let taken = |mid: &str| {
            self.media_by_mid(mid).is_some() || self.data_mid() == Some(mid)
        };
        (index..)
            .map(|i| i.to_string())
            .find(|m| !taken(m))
            .unwrap_or_default()
    }
}

/// A borrowed m-line section.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Section<'a> {
    Media(&'a Media),
    Data(&'a Data),
}

impl Section<'_> {
    pub fn mid(&self) -> &str {
        match self {
            Section::Media(m) => &m.mid,
            Section::Data(d) => &d.mid,
        }
    }
}

pub(crate) fn initial_role(typ: SdpType, answer_role: Role) -> Role {
    if typ.is_answer() {
        answer_role
    } else {
        Role::ActPass
    }
}

impl FromStr for Description {
    type Err = SdpError;

    /// Parse with type [`SdpType::Unspecified`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Description::parse(s, SdpType::Unspecified)
    }
}
