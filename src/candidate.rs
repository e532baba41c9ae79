use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::sdp::parse_candidate;
use crate::util::Pii;
use crate::SdpError;

/// ICE candidates are network addresses used to connect to a peer.
///
/// The description treats candidates as opaque values it advertises. This
/// type keeps enough structure to render an `a=candidate` line and to tie
/// the candidate to the media section (mid) it was gathered for.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Groups similar candidates for the freezing algorithm.
    ///
    /// Same type, base IP, transport and STUN/TURN server give the same foundation.
    foundation: String, // 1-32 "ice chars", ALPHA / DIGIT / "+" / "/"

    /// 1 for RTP, 2 for RTCP when not multiplexed.
    component_id: u16,

    /// Transport protocol.
    proto: Protocol,

    /// Priority, communicated by the remote or calculated locally.
    prio: u32, // 1-10 digits

    /// Transport address.
    addr: SocketAddr,

    /// Type of candidate.
    kind: CandidateKind, // host/srflx/prflx/relay

    /// Related address.
    ///
    /// For server reflexive candidates the address behind the NAT, for relay
    /// candidates the mapped address selected by the TURN server.
    raddr: Option<SocketAddr>,

    /// Trailing `<name> <value>` pairs in the order they were given, for instance
    /// `generation 0`, `ufrag EsAw` or `tcptype active`.
    extensions: Vec<(String, String)>,

    /// The media section this candidate belongs to.
    mid: Option<String>,
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Candidate({}={}/{}",
            self.kind,
            Pii(self.addr),
            self.proto
        )?;
        if let Some(raddr) = self.raddr {
            write!(f, " raddr={}", Pii(raddr))?;
        }
        write!(f, " prio={}", self.prio)?;
        if let Some(mid) = &self.mid {
            write!(f, " mid={mid}")?;
        }
        write!(f, ")")
    }
}

impl Candidate {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn parsed(
        foundation: String,
        component_id: u16,
        proto: Protocol,
        prio: u32,
        addr: SocketAddr,
        kind: CandidateKind,
        raddr: Option<SocketAddr>,
        extensions: Vec<(String, String)>,
    ) -> Self {
        Candidate {
            foundation,
            component_id,
            proto,
            prio,
            addr,
            kind,
            raddr,
            extensions,
            mid: None,
        }
    }

    fn local(
        addr: SocketAddr,
        proto: Protocol,
        kind: CandidateKind,
        raddr: Option<SocketAddr>,
    ) -> Result<Self, SdpError> {
        if !is_valid_ip(addr.ip()) {
            return Err(SdpError::BadCandidate(format!(
                "invalid ip {}",
                Pii(addr.ip())
            )));
        }

        let component_id = 1;

        Ok(Candidate {
            foundation: calculate_foundation(kind, addr.ip(), proto),
            component_id,
            proto,
            prio: calculate_prio(kind, addr.ip(), component_id),
            addr,
            kind,
            raddr,
            extensions: vec![],
            mid: None,
        })
    }

    /// Creates a host ICE candidate.
    ///
    /// Host candidates are local sockets directly on the host.
    pub fn host(addr: SocketAddr, proto: Protocol) -> Result<Self, SdpError> {
        Candidate::local(addr, proto, CandidateKind::Host, None)
    }

    /// Creates a server reflexive ICE candidate.
    ///
    /// Server reflexive candidates are addresses seen by a STUN server.
    /// `base` is the local socket the binding request was sent from.
    pub fn server_reflexive(
        addr: SocketAddr,
        base: SocketAddr,
        proto: Protocol,
    ) -> Result<Self, SdpError> {
        Candidate::local(addr, proto, CandidateKind::ServerReflexive, Some(base))
    }

    /// Creates a relayed ICE candidate.
    ///
    /// `mapped` is the address the TURN server relays from.
    pub fn relayed(
        addr: SocketAddr,
        mapped: SocketAddr,
        proto: Protocol,
    ) -> Result<Self, SdpError> {
        Candidate::local(addr, proto, CandidateKind::Relayed, Some(mapped))
    }

    /// Parse a candidate attribute value.
    ///
    /// Accepts `candidate:...` with or without a leading `a=`.
    pub fn from_sdp_string(s: &str) -> Result<Self, SdpError> {
        let s = s.trim();
        parse_candidate(s.strip_prefix("a=").unwrap_or(s))
    }

    /// The candidate foundation.
    pub fn foundation(&self) -> &str {
        &self.foundation
    }

    /// The component id, 1 for RTP.
    pub fn component_id(&self) -> u16 {
        self.component_id
    }

    /// Candidate priority.
    pub fn prio(&self) -> u32 {
        self.prio
    }

    /// Transport address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Related address, if any.
    pub fn raddr(&self) -> Option<SocketAddr> {
        self.raddr
    }

    /// Transport protocol.
    pub fn proto(&self) -> Protocol {
        self.proto
    }

    /// Type of candidate.
    pub fn kind(&self) -> CandidateKind {
        self.kind
    }

    /// The ICE ufrag this candidate was gathered for, if advertised.
    pub fn ufrag(&self) -> Option<&str> {
        self.extension("ufrag")
    }

    /// Set or replace the advertised ICE ufrag.
    pub fn set_ufrag(&mut self, ufrag: &str) {
        self.set_extension("ufrag", ufrag);
    }

    /// Value of a trailing extension pair such as `generation`.
    pub fn extension(&self, name: &str) -> Option<&str> {
        self.extensions
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace a trailing extension pair.
    pub fn set_extension(&mut self, name: &str, value: &str) {
        if let Some(e) = self.extensions.iter_mut().find(|(k, _)| k == name) {
            e.1 = value.to_string();
        } else {
            self.extensions.push((name.to_string(), value.to_string()));
        }
    }

    /// The media section (mid) the candidate is associated with.
    pub fn mid(&self) -> Option<&str> {
        self.mid.as_deref()
    }

    /// Associate the candidate with a media section.
    pub fn set_mid(&mut self, mid: impl Into<String>) {
        self.mid = Some(mid.into());
    }

    pub(crate) fn set_mid_if_none(&mut self, mid: &str) {
        if self.mid.is_none() {
            self.mid = Some(mid.to_string());
        }
    }

    /// Generates a candidate attribute string, without the `a=` prefix.
    pub fn to_sdp_string(&self) -> String {
        let mut s = format!(
            "candidate:{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component_id,
            self.proto,
            self.prio,
            self.addr.ip(),
            self.addr.port(),
            self.kind
        );
        if let Some(raddr) = &self.raddr {
            s.push_str(&format!(" raddr {} rport {}", raddr.ip(), raddr.port()));
        }
        for (k, v) in &self.extensions {
            s.push_str(&format!(" {k} {v}"));
        }
        s
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sdp_string())
    }
}

impl FromStr for Candidate {
    type Err = SdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Candidate::from_sdp_string(s)
    }
}

/// Type of candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// Host (local network interface)
    Host,
    /// Prflx (Peer reflexive)
    PeerReflexive,
    /// Srflx (STUN)
    ServerReflexive,
    /// Relay (TURN)
    Relayed,
}

impl CandidateKind {
    // RFC 8445 5.1.2.2, recommended type preferences.
    fn type_preference(&self) -> u32 {
        match self {
            CandidateKind::Host => 126,
            CandidateKind::PeerReflexive => 110,
            CandidateKind::ServerReflexive => 100,
            CandidateKind::Relayed => 0,
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            CandidateKind::Host => "host",
            CandidateKind::PeerReflexive => "prflx",
            CandidateKind::ServerReflexive => "srflx",
            CandidateKind::Relayed => "relay",
        };
        write!(f, "{x}")
    }
}

/// Transport protocol of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// UDP
    Udp,
    /// TCP (RFC 6544)
    Tcp,
}

impl TryFrom<&str> for Protocol {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "udp" => Ok(Protocol::Udp),
            "tcp" => Ok(Protocol::Tcp),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            Protocol::Udp => "udp",
            Protocol::Tcp => "tcp",
        };
        write!(f, "{x}")
    }
}

fn calculate_prio(kind: CandidateKind, ip: IpAddr, component_id: u16) -> u32 {
    // Prefer IPv6 over IPv4 when everything else is equal.
    let local_preference: u32 = if ip.is_ipv6() { 65_535 } else { 65_534 };

    (kind.type_preference() << 24) + (local_preference << 8) + (256 - component_id as u32)
}

fn calculate_foundation(kind: CandidateKind, ip: IpAddr, proto: Protocol) -> String {
    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    ip.hash(&mut hasher);
    proto.hash(&mut hasher);
    // Foundations are limited to 32 ice chars, a u32 renders in at most 10.
    (hasher.finish() as u32).to_string()
}

fn is_valid_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v) => !v.is_broadcast() && !v.is_multicast() && !v.is_unspecified(),
        IpAddr::V6(v) => !v.is_multicast() && !v.is_unspecified(),
    }
}

/// Serialize [Candidate] into the browser's `RTCIceCandidateInit`.
///
/// e.g. serde_json would produce:
/// ```json
/// {
///  "candidate": "candidate:1 1 udp 2113937151 1.2.3.4 1234 typ host",
///  "sdpMid": "0",
///  "usernameFragment": null
/// }
/// ```
impl Serialize for Candidate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut o = serializer.serialize_struct("CandidateInfo", 3)?;
        o.serialize_field("candidate", &self.to_sdp_string())?;
        o.serialize_field("sdpMid", &self.mid)?;
        o.serialize_field("usernameFragment", &self.ufrag())?;
        o.end()
    }
}

impl<'de> Deserialize<'de> for Candidate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CandidateInfo {
            candidate: String,
            sdp_mid: Option<String>,
            username_fragment: Option<String>,
        }

        let CandidateInfo {
            candidate,
            sdp_mid,
            username_fragment,
        } = CandidateInfo::deserialize(deserializer)?;

        let mut candidate =
            Candidate::from_sdp_string(&candidate).map_err(serde::de::Error::custom)?;

        if let Some(ufrag) = username_fragment {
            candidate.set_ufrag(&ufrag);
        }
        candidate.mid = sdp_mid;

        Ok(candidate)
    }
}

/// Ordered candidates with a closed flag.
///
/// Draining hands out everything buffered so far and never reopens a
/// closed queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CandidateQueue {
    buf: Vec<Candidate>,
    closed: bool,
}

impl CandidateQueue {
    pub fn push(&mut self, c: Candidate) {
        self.buf.push(c);
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn drain(&mut self) -> Vec<Candidate> {
        std::mem::take(&mut self.buf)
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.buf
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn host_prio_and_render() {
        let c = Candidate::host("1.2.3.4:5000".parse().unwrap(), Protocol::Udp).unwrap();
        assert_eq!(c.prio(), (126 << 24) + (65_534 << 8) + 255);
        let s = c.to_sdp_string();
        assert!(s.starts_with("candidate:"));
        assert!(s.ends_with(" udp 2130706175 1.2.3.4 5000 typ host"));
    }

    #[test]
    fn unspecified_addr_is_rejected() {
        let r = Candidate::host("0.0.0.0:5000".parse().unwrap(), Protocol::Udp);
        assert!(matches!(r, Err(SdpError::BadCandidate(_))));
    }

    #[test]
    fn srflx_renders_raddr() {
        let c = Candidate::server_reflexive(
            "8.8.8.8:3478".parse().unwrap(),
            "192.168.0.2:5000".parse().unwrap(),
            Protocol::Udp,
        )
        .unwrap();
        assert!(c
            .to_sdp_string()
            .ends_with("typ srflx raddr 192.168.0.2 rport 5000"));
    }

    #[test]
    fn ufrag_is_an_extension() {
        let mut c = Candidate::from_sdp_string(
            "candidate:1 1 udp 2113929471 203.0.113.100 10100 typ host generation 0",
        )
        .unwrap();
        assert_eq!(c.ufrag(), None);
        c.set_ufrag("EsAw");
        assert_eq!(c.ufrag(), Some("EsAw"));
        assert_eq!(c.extension("generation"), Some("0"));
        assert!(c.to_sdp_string().ends_with("generation 0 ufrag EsAw"));
    }

    #[test]
    fn queue_drain_keeps_closed() {
        let c = Candidate::host("1.2.3.4:5000".parse().unwrap(), Protocol::Udp).unwrap();
        let mut q = CandidateQueue::default();
        q.push(c.clone());
        q.close();
        assert_eq!(q.drain(), vec![c]);
        assert!(q.drain().is_empty());
        assert!(q.is_closed());
    }

    #[test]
    fn serialize_deserialize() {
        let mut c = Candidate::from_sdp_string(
            "a=candidate:1 1 UDP 2113929471 203.0.113.100 10100 typ host",
        )
        .unwrap();
        c.set_mid("0");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(
            json,
            "{\"candidate\":\"candidate:1 1 udp 2113929471 203.0.113.100 10100 typ host\",\
            \"sdpMid\":\"0\",\"usernameFragment\":null}"
        );
        let c2: Candidate = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }
}
