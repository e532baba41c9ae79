//! Assembly of classified lines into a [`Description`].
//!
//! The text is first split into a session prologue and one block per m-line.
//! Blocks are then folded into a fresh description, and the cross section
//! checks run at the end. Nothing is returned unless every check passes.

use crate::candidate::Candidate;
use crate::error::ParseReason;
use crate::util::Pii;
use crate::{SdpConfig, SdpError};

use super::data::{Data, Description, Role, SdpType};
use super::media::{Direction, Media, Pt, RtpMap};
use super::parser::{parse_line, Attr, Line, MediaLine};

/// m-line protos that make a section the data block.
const SCTP_PROTOS: &[&str] = &["UDP/DTLS/SCTP", "TCP/DTLS/SCTP", "DTLS/SCTP"];

/// Proto of the pre RFC 8841 form `m=application 9 DTLS/SCTP 5000`.
const LEGACY_SCTP_PROTO: &str = "DTLS/SCTP";

struct Document<'a> {
    session: Vec<(&'a str, Line)>,
    sections: Vec<Block<'a>>,
}

struct Block<'a> {
    line: &'a str,
    m: MediaLine,
    lines: Vec<(&'a str, Line)>,
}

fn tokenize(sdp: &str) -> Result<Document<'_>, SdpError> {
    let mut doc = Document {
        session: vec![],
        sections: vec![],
    };

    // lines() strips both \n and \r\n.
    for line in sdp.lines().map(str::trim_end) {
        if line.is_empty() {
            continue;
        }

        match parse_line(line)? {
            Line::Media(m) => doc.sections.push(Block {
                line,
                m,
                lines: vec![],
            }),
            l => match doc.sections.last_mut() {
                Some(b) => b.lines.push((line, l)),
                None => doc.session.push((line, l)),
            },
        }
    }

    Ok(doc)
}

pub(crate) fn read(sdp: &str, typ: SdpType, config: &SdpConfig) -> Result<Description, SdpError> {
    let doc = tokenize(sdp)?;

    let mut reader = Reader {
        desc: Description::with_config(typ, config),
        role: None,
        groups: vec![],
        mids: vec![],
        candidates: vec![],
        ended: false,
        session_sctp_port: None,
        session_max_message_size: None,
    };

    for (line, l) in doc.session {
        reader.session_line(line, l)?;
    }

    for (index, block) in doc.sections.into_iter().enumerate() {
        if SCTP_PROTOS.contains(&block.m.proto.as_str()) {
            reader.data_section(index, block)?;
        } else {
            reader.media_section(index, block)?;
        }
    }

    reader.finish()
}

struct Reader<'a> {
    desc: Description,
    role: Option<Role>,
    // (line, semantics, mids)
    groups: Vec<(&'a str, String, Vec<String>)>,
    // Every section mid with the line that established it.
    mids: Vec<(&'a str, String)>,
    // In text order. The bundle mid is assigned once all sections are known.
    candidates: Vec<Candidate>,
    ended: bool,
    // Session level values for the data section, with their lines.
    session_sctp_port: Option<(&'a str, u16)>,
    session_max_message_size: Option<(&'a str, usize)>,
}

/// fmtp/rtcp-fb seen before the rtpmap of its payload type.
enum Pending {
    Fmtp(String),
    Fb(String),
}

impl Pending {
    fn apply(self, map: &mut RtpMap) {
        match self {
            Pending::Fmtp(v) => map.add_fmtp(v),
            Pending::Fb(v) => map.add_fb(v),
        }
    }
}

impl<'a> Reader<'a> {
    fn session_line(&mut self, line: &'a str, l: Line) -> Result<(), SdpError> {
        let attr = match l {
            Line::Origin(id) => {
                self.desc.session_id = id;
                return Ok(());
            }
            Line::Attr(a) => a,
            _ => return Ok(()),
        };

        let Some(attr) = self.transport_attr(line, attr)? else {
            return Ok(());
        };

        match attr {
            Attr::Mid(_) => {
                return Err(SdpError::malformed(line, "a=mid outside media section"));
            }
            Attr::RtpMap(RtpMap { pt, .. })
            | Attr::Fmtp { pt, .. }
            | Attr::RtcpFb { pt, .. } => {
                return Err(SdpError::parse(
                    line,
                    ParseReason::UndeclaredPayloadType(*pt),
                ));
            }
            Attr::SctpPort(p) => self.session_sctp_port = Some((line, p)),
            Attr::MaxMessageSize(s) => self.session_max_message_size = Some((line, s)),
            Attr::Unused(v) => self.desc.attributes.push(v),
            _ => self.desc.attributes.push(attribute_value(line)),
        }

        Ok(())
    }

    /// Attributes that apply to the whole transport regardless of where they appear.
    ///
    /// Returns the attribute back if it is section specific.
    fn transport_attr(&mut self, line: &'a str, attr: Attr) -> Result<Option<Attr>, SdpError> {
        match attr {
            Attr::IceUfrag(v) => self.desc.ice_ufrag = Some(v),
            Attr::IcePwd(v) => self.desc.ice_pwd = Some(v),
            Attr::Fingerprint { hash_func, digest } => {
                if hash_func.eq_ignore_ascii_case("sha-256") {
                    self.desc.fingerprint = Some(digest);
                } else {
                    warn!("Unsupported fingerprint hash {}, keeping verbatim", hash_func);
                    let v = format!("fingerprint:{} {}", hash_func, digest);
                    if !self.desc.attributes.contains(&v) {
                        self.desc.attributes.push(v);
                    }
                }
            }
            Attr::Setup(r) => self.role = Some(r),
            Attr::Group { semantics, mids } => self.groups.push((line, semantics, mids)),
            Attr::Candidate(c) => self.candidates.push(c),
            Attr::HostnameCandidate(host) => {
                debug!("Skip candidate with unresolved hostname: {}", Pii(host));
            }
            Attr::EndOfCandidates => self.ended = true,
            Attr::Generated => {}
            other => return Ok(Some(other)),
        }
        Ok(None)
    }

    fn media_section(&mut self, index: usize, block: Block<'a>) -> Result<(), SdpError> {
        let mut media = Media::new(block.m.typ, "");
        media.proto = block.m.proto;
        media.disabled = block.m.port == 0;

        for f in &block.m.fmts {
            let pt = f
                .parse::<u8>()
                .map(Pt::from)
                .map_err(|_| SdpError::malformed(block.line, format!("bad payload type: {f}")))?;
            if media.pts.contains(&pt) {
                return Err(SdpError::parse(
                    block.line,
                    ParseReason::DuplicatePayloadType(*pt),
                ));
            }
            media.pts.push(pt);
        }

        let mut mid_line = None;
        let mut pending: Vec<(&str, Pt, Pending)> = vec![];

        for (line, l) in block.lines {
            let attr = match l {
                Line::Attr(a) => a,
                Line::Bandwidth { typ, kbps } => {
                    if typ == "AS" {
                        media.bitrate = Some(kbps);
                    }
                    continue;
                }
                _ => continue,
            };

            let Some(attr) = self.transport_attr(line, attr)? else {
                continue;
            };

            match attr {
                Attr::Mid(m) => {
                    if mid_line.is_some() {
                        return Err(SdpError::malformed(line, "more than one a=mid"));
                    }
                    mid_line = Some(line);
                    media.mid = m;
                }
                Attr::RtpMap(r) => {
                    declared(&media, line, r.pt)?;
                    if media.format(r.pt).is_ok() {
                        return Err(SdpError::parse(
                            line,
                            ParseReason::DuplicatePayloadType(*r.pt),
                        ));
                    }
                    media.rtp_maps.push(r);
                }
                Attr::Fmtp { pt, value } => {
                    declared(&media, line, pt)?;
                    match media.format_mut(pt) {
                        Ok(r) => r.add_fmtp(value),
                        Err(_) => pending.push((line, pt, Pending::Fmtp(value))),
                    }
                }
                Attr::RtcpFb { pt, value } => {
                    declared(&media, line, pt)?;
                    match media.format_mut(pt) {
                        Ok(r) => r.add_fb(value),
                        Err(_) => pending.push((line, pt, Pending::Fb(value))),
                    }
                }
                Attr::Direction(d) => {
                    if media.direction != Direction::Unknown {
                        return Err(SdpError::parse(line, ParseReason::ConflictingDirection));
                    }
                    media.direction = d;
                }
                Attr::Unused(v) => media.attributes.push(v),
                _ => media.attributes.push(attribute_value(line)),
            }
        }

        for (line, pt, p) in pending {
            match media.format_mut(pt) {
                Ok(r) => p.apply(r),
                Err(_) => {
                    // Static payload types have no rtpmap.
                    trace!("No rtpmap for payload type {}, keeping verbatim", pt);
                    media.attributes.push(attribute_value(line));
                }
            }
        }

        if media.mid.is_empty() {
            media.mid = index.to_string();
        }

        self.register_mid(mid_line.unwrap_or(block.line), &media.mid)?;

        trace!(
            "Read {} section mid {} with {} formats",
            media.typ,
            media.mid,
            media.rtp_maps.len()
        );
        self.desc.media.insert(index, media);

        Ok(())
    }

    fn data_section(&mut self, index: usize, block: Block<'a>) -> Result<(), SdpError> {
        if self.desc.data.is_some() {
            return Err(SdpError::parse(
                block.line,
                ParseReason::DuplicateDataSection,
            ));
        }

        let mut data = Data {
            mid: String::new(),
            sctp_port: None,
            max_message_size: None,
            attributes: vec![],
            index: Some(index),
        };

        if block.m.proto == LEGACY_SCTP_PROTO {
            // m=application 9 DTLS/SCTP 5000
            data.sctp_port = block.m.fmts.first().and_then(|f| f.parse().ok());
        }

        let mut mid_line = None;

        for (line, l) in block.lines {
            let Line::Attr(attr) = l else {
                continue;
            };

            let Some(attr) = self.transport_attr(line, attr)? else {
                continue;
            };

            match attr {
                Attr::Mid(m) => {
                    if mid_line.is_some() {
                        return Err(SdpError::malformed(line, "more than one a=mid"));
                    }
                    mid_line = Some(line);
                    data.mid = m;
                }
                Attr::SctpPort(p) => data.sctp_port = Some(p),
                Attr::MaxMessageSize(s) => data.max_message_size = Some(s),
                _ => {
                    trace!("Keep data section attribute verbatim: {}", line);
                    data.attributes.push(attribute_value(line));
                }
            }
        }

        if data.mid.is_empty() {
            data.mid = index.to_string();
        }

        self.register_mid(mid_line.unwrap_or(block.line), &data.mid)?;
        self.desc.data = Some(data);

        Ok(())
    }

    fn register_mid(&mut self, line: &'a str, mid: &str) -> Result<(), SdpError> {
        if self.mids.iter().any(|(_, m)| m == mid) {
            return Err(SdpError::parse(line, ParseReason::DuplicateMid(mid.into())));
        }
        self.mids.push((line, mid.into()));
        Ok(())
    }

    fn finish(mut self) -> Result<Description, SdpError> {
        for (line, semantics, mids) in &self.groups {
            for mid in mids {
                if !self.mids.iter().any(|(_, m)| m == mid) {
                    return Err(SdpError::parse(
                        line,
                        ParseReason::DanglingBundleMid(mid.clone()),
                    ));
                }
            }
            // BUNDLE is regenerated from the sections.
            if semantics != "BUNDLE" {
                self.desc.attributes.push(attribute_value(line));
            }
        }

        // Only an existing data section takes session level values.
        if let Some((line, p)) = self.session_sctp_port {
            match &mut self.desc.data {
                Some(d) if d.sctp_port.is_none() => d.sctp_port = Some(p),
                _ => self.desc.attributes.push(attribute_value(line)),
            }
        }
        if let Some((line, s)) = self.session_max_message_size {
            match &mut self.desc.data {
                Some(d) if d.max_message_size.is_none() => d.max_message_size = Some(s),
                _ => self.desc.attributes.push(attribute_value(line)),
            }
        }

        if let Some(role) = self.role {
            self.desc.role = role;
        }

        let bundle_mid = self
            .groups
            .iter()
            .find(|(_, semantics, _)| semantics == "BUNDLE")
            .and_then(|(_, _, mids)| mids.first().cloned())
            .or_else(|| self.mids.first().map(|(_, m)| m.clone()));

        for mut c in self.candidates {
            if let Some(mid) = &bundle_mid {
                c.set_mid_if_none(mid);
            }
            self.desc.candidates.push(c);
        }
        if self.ended {
            self.desc.candidates.close();
        }

        Ok(self.desc)
    }
}

fn declared(media: &Media, line: &str, pt: Pt) -> Result<(), SdpError> {
    if media.pts.contains(&pt) {
        Ok(())
    } else {
        Err(SdpError::parse(line, ParseReason::UndeclaredPayloadType(*pt)))
    }
}

/// The line without its `a=` prefix.
fn attribute_value(line: &str) -> String {
    line.strip_prefix("a=").unwrap_or(line).to_string()
}
