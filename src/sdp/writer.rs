use std::fmt;

use crate::SdpError;

use super::data::{Data, Description, Section, SdpType};
use super::media::Media;

/// m-line port for sections in use. The real port comes from ICE.
const DISCARD_PORT: u16 = 9;

const DATA_PROTO: &str = "UDP/DTLS/SCTP";
const DATA_FMT: &str = "webrtc-datachannel";

impl Description {
    /// Generate the SDP text using `eol` as line terminator.
    ///
    /// Every line, including the last, ends with `eol`.
    pub fn generate_sdp(&self, eol: &str) -> String {
        SdpText { desc: self, eol }.to_string()
    }

    /// Generate an SDP text with only the data section.
    ///
    /// Transport attributes are placed inside the section. Fails with
    /// [`SdpError::MissingField`] when no SCTP port is set.
    pub fn generate_data_sdp(&self, eol: &str) -> Result<String, SdpError> {
        let data = self
            .data
            .as_ref()
            .filter(|d| d.sctp_port.is_some())
            .ok_or(SdpError::MissingField("sctp-port"))?;

        Ok(DataSdpText {
            desc: self,
            data,
            eol,
        }
        .to_string())
    }

    fn write_sdp(&self, w: &mut Writer<'_, '_>) -> fmt::Result {
        self.write_prologue(w)?;

        let mids: Vec<_> = self.sections().map(|s| s.mid().to_string()).collect();
        if !mids.is_empty() {
            w.line(format_args!("a=group:BUNDLE {}", mids.join(" ")))?;
        }
        w.line(format_args!("a=msid-semantic: WMS"))?;
        w.line(format_args!("a=setup:{}", self.role))?;
        self.write_transport(w)?;
        for a in &self.attributes {
            w.line(format_args!("a={}", a))?;
        }

        for (pos, section) in self.sections().enumerate() {
            // RFC 8843: only offers mark sections bundle-only, never the first.
            let bundle_only = pos > 0 && self.typ == SdpType::Offer;
            match section {
                Section::Media(m) => write_media(w, m, bundle_only)?,
                Section::Data(d) => {
                    write_data_mline(w, d, bundle_only)?;
                    write_data_attributes(w, d)?;
                }
            }
        }

        self.write_candidates(w)
    }

    fn write_data_sdp(&self, w: &mut Writer<'_, '_>, data: &Data) -> fmt::Result {
        self.write_prologue(w)?;
        write_data_mline(w, data, false)?;
        w.line(format_args!("a=setup:{}", self.role))?;
        self.write_transport(w)?;
        write_data_attributes(w, data)?;
        self.write_candidates(w)
    }

    fn write_prologue(&self, w: &mut Writer<'_, '_>) -> fmt::Result {
        w.line(format_args!("v=0"))?;
        w.line(format_args!("o=- {} 0 IN IP4 127.0.0.1", self.session_id))?;
        w.line(format_args!("s=-"))?;
        w.line(format_args!("t=0 0"))
    }

    fn write_transport(&self, w: &mut Writer<'_, '_>) -> fmt::Result {
        if let Some(ufrag) = &self.ice_ufrag {
            w.line(format_args!("a=ice-ufrag:{}", ufrag))?;
        }
        if let Some(pwd) = &self.ice_pwd {
            w.line(format_args!("a=ice-pwd:{}", pwd))?;
        }
        if !self.ended() {
            w.line(format_args!("a=ice-options:trickle"))?;
        }
        if let Some(fp) = &self.fingerprint {
            w.line(format_args!("a=fingerprint:sha-256 {}", fp))?;
        }
        Ok(())
    }

    fn write_candidates(&self, w: &mut Writer<'_, '_>) -> fmt::Result {
        for c in self.candidates() {
            w.line(format_args!("a={}", c.to_sdp_string()))?;
        }
        if self.ended() {
            w.line(format_args!("a=end-of-candidates"))?;
        }
        Ok(())
    }
}

fn write_media(w: &mut Writer<'_, '_>, m: &Media, bundle_only: bool) -> fmt::Result {
    let port = if m.disabled { 0 } else { DISCARD_PORT };
    let pts: String = m.pts.iter().map(|pt| format!(" {}", pt)).collect();
    w.line(format_args!("m={} {} {}{}", m.typ, port, m.proto, pts))?;
    w.line(format_args!("c=IN IP4 0.0.0.0"))?;
    if let Some(kbps) = m.bitrate {
        w.line(format_args!("b=AS:{}", kbps))?;
    }
    if bundle_only {
        w.line(format_args!("a=bundle-only"))?;
    }
    w.line(format_args!("a=mid:{}", m.mid))?;
    if let Some(dir) = m.direction.as_attribute() {
        w.line(format_args!("a={}", dir))?;
    }
    for a in &m.attributes {
        w.line(format_args!("a={}", a))?;
    }
    for r in &m.rtp_maps {
        w.line(format_args!("a=rtpmap:{}", r.rtpmap_value()))?;
        for fb in &r.feedback {
            w.line(format_args!("a=rtcp-fb:{} {}", r.pt, fb))?;
        }
        for p in &r.format_params {
            w.line(format_args!("a=fmtp:{} {}", r.pt, p))?;
        }
    }
    Ok(())
}

fn write_data_mline(w: &mut Writer<'_, '_>, d: &Data, bundle_only: bool) -> fmt::Result {
    w.line(format_args!(
        "m=application {} {} {}",
        DISCARD_PORT, DATA_PROTO, DATA_FMT
    ))?;
    w.line(format_args!("c=IN IP4 0.0.0.0"))?;
    if bundle_only {
        w.line(format_args!("a=bundle-only"))?;
    }
    w.line(format_args!("a=mid:{}", d.mid))
}

fn write_data_attributes(w: &mut Writer<'_, '_>, d: &Data) -> fmt::Result {
    if let Some(port) = d.sctp_port {
        w.line(format_args!("a=sctp-port:{}", port))?;
    }
    if let Some(size) = d.max_message_size {
        w.line(format_args!("a=max-message-size:{}", size))?;
    }
    for a in &d.attributes {
        w.line(format_args!("a={}", a))?;
    }
    Ok(())
}

/// Writes lines terminated by `eol`.
struct Writer<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    eol: &'a str,
}

impl Writer<'_, '_> {
    fn line(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.f.write_fmt(args)?;
        self.f.write_str(self.eol)
    }
}

struct SdpText<'a> {
    desc: &'a Description,
    eol: &'a str,
}

impl fmt::Display for SdpText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.desc.write_sdp(&mut Writer { f, eol: self.eol })
    }
}

struct DataSdpText<'a> {
    desc: &'a Description,
    data: &'a Data,
    eol: &'a str,
}

impl fmt::Display for DataSdpText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.desc
            .write_data_sdp(&mut Writer { f, eol: self.eol }, self.data)
    }
}

impl fmt::Display for Description {
    /// The SDP text with CRLF line endings.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_sdp(&mut Writer { f, eol: "\r\n" })
    }
}
