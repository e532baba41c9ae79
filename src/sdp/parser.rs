use combine::error::*;
use combine::parser::char::*;
use combine::stream::StreamErrorFor;
use combine::*;
use combine::{ParseError, Parser, Stream};
use std::net::{IpAddr, SocketAddr};

use crate::candidate::{Candidate, CandidateKind, Protocol};
use crate::SdpError;

use super::data::Role;
use super::media::{Direction, Pt, RtpMap};

/// One classified SDP line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line {
    /// `m=<media> <port> <proto> <fmt> ...`
    Media(MediaLine),
    /// `o=` line, we only keep the session id.
    Origin(String),
    /// `b=<bwtype>:<bandwidth>`
    Bandwidth { typ: String, kbps: u32 },
    /// `a=` line.
    Attr(Attr),
    /// Any other `<type>=<value>` line (v, s, t, c ...). Regenerated canonically.
    Other(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MediaLine {
    pub typ: String,
    pub port: u16,
    pub proto: String,
    pub fmts: Vec<String>,
}

/// Attributes (`a=` lines) we interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Attr {
    IceUfrag(String),
    IcePwd(String),
    Fingerprint { hash_func: String, digest: String },
    Setup(Role),
    Group { semantics: String, mids: Vec<String> },
    Mid(String),
    RtpMap(RtpMap),
    Fmtp { pt: Pt, value: String },
    RtcpFb { pt: Pt, value: String },
    Direction(Direction),
    SctpPort(u16),
    MaxMessageSize(usize),
    Candidate(Candidate),
    /// A candidate with a hostname (mDNS) address. Resolving it is the ICE agent's job.
    HostnameCandidate(String),
    EndOfCandidates,
    /// Attributes the generator writes itself (`bundle-only`, `ice-options`...).
    Generated,
    /// Anything else, kept verbatim without `a=`.
    Unused(String),
}

/// Classify a single SDP line, terminator already stripped.
pub(crate) fn parse_line(line: &str) -> Result<Line, SdpError> {
    let (typ, value) = full(line, "expected <type>=<value>", line, sdp_line())?;

    let parsed = match typ {
        'm' => Line::Media(full(line, "m-line", &value, media_line())?),
        'o' => Line::Origin(full(line, "o-line", &value, originator())?),
        'b' => {
            let (typ, kbps) = full(line, "b-line", &value, bandwidth())?;
            Line::Bandwidth { typ, kbps }
        }
        'a' => Line::Attr(parse_attribute(line, &value)?),
        c => Line::Other(c),
    };

    Ok(parsed)
}

fn parse_attribute(line: &str, value: &str) -> Result<Attr, SdpError> {
    let (key, val) = match value.split_once(':') {
        Some((k, v)) => (k, Some(v)),
        None => (value, None),
    };

    // Attributes with a value.
    let with_value = |what: &'static str| {
        val.ok_or_else(|| SdpError::malformed(line, format!("a={what} without value")))
    };

    let attr = match key {
        "ice-ufrag" => Attr::IceUfrag(full(line, key, with_value("ice-ufrag")?, any_value())?),
        "ice-pwd" => Attr::IcePwd(full(line, key, with_value("ice-pwd")?, any_value())?),
        "fingerprint" => {
            let (hash_func, bytes) = full(line, key, with_value("fingerprint")?, fingerprint())?;
            Attr::Fingerprint {
                hash_func,
                digest: format_digest(&bytes),
            }
        }
        "setup" => Attr::Setup(full(line, key, with_value("setup")?, setup())?),
        "group" => {
            let (semantics, mids) = full(line, key, with_value("group")?, group())?;
            Attr::Group { semantics, mids }
        }
        "mid" => Attr::Mid(full(line, key, with_value("mid")?, not_sp())?),
        "rtpmap" => Attr::RtpMap(full(line, key, with_value("rtpmap")?, rtpmap())?),
        "fmtp" => {
            let (pt, value) = full(line, key, with_value("fmtp")?, pt_value())?;
            Attr::Fmtp { pt, value }
        }
        "rtcp-fb" => {
            let v = with_value("rtcp-fb")?;
            if v.starts_with('*') {
                // a=rtcp-fb:* nack applies to all payload types.
                Attr::Unused(value.to_string())
            } else {
                let (pt, value) = full(line, key, v, pt_value())?;
                Attr::RtcpFb { pt, value }
            }
        }
        "sendrecv" | "sendonly" | "recvonly" | "inactive" => {
            if val.is_some() {
                return Err(SdpError::malformed(line, "direction with value"));
            }
            Attr::Direction(Direction::from(key))
        }
        "sctp-port" => Attr::SctpPort(full(line, key, with_value("sctp-port")?, number())?),
        "max-message-size" => {
            Attr::MaxMessageSize(full(line, key, with_value("max-message-size")?, number())?)
        }
        "candidate" => match full(line, key, value, candidate_fields())?.into_candidate() {
            Ok(c) => Attr::Candidate(c),
            Err(RawCandidateError::Hostname(host)) => Attr::HostnameCandidate(host),
            Err(RawCandidateError::Invalid(msg)) => return Err(SdpError::malformed(line, msg)),
        },
        "end-of-candidates" => Attr::EndOfCandidates,
        "bundle-only" | "msid-semantic" | "ice-options" | "sctpmap" => Attr::Generated,
        _ => Attr::Unused(value.to_string()),
    };

    Ok(attr)
}

/// Run `parser` over the complete `input`, naming `what` in the error.
fn full<'a, P>(line: &str, what: &str, input: &'a str, parser: P) -> Result<P::Output, SdpError>
where
    P: Parser<&'a str>,
{
    (parser, eof())
        .map(|(v, _)| v)
        .parse(input)
        .map(|(v, _)| v)
        .map_err(|e| SdpError::malformed(line, format!("{what}: {e}")))
}

fn format_digest(bytes: &[u8]) -> String {
    let hex: Vec<_> = bytes.iter().map(|b| format!("{b:02X}")).collect();
    hex.join(":")
}

/// Parse a candidate string into a [Candidate].
///
/// Does not parse an `a=` prefix or trailing newline.
pub(crate) fn parse_candidate(s: &str) -> Result<Candidate, SdpError> {
    full(s, "candidate", s, candidate_fields())?
        .into_candidate()
        .map_err(|e| match e {
            RawCandidateError::Hostname(h) => {
                SdpError::malformed(s, format!("unresolved hostname {h}"))
            }
            RawCandidateError::Invalid(msg) => SdpError::malformed(s, msg),
        })
}

// /////////////////////////////////////////////////// Line grammar

/// `<type>=<value>`, where type is a single letter.
fn sdp_line<Input>() -> impl Parser<Input, Output = (char, String)>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (letter(), token('='), many(satisfy(|c| c != '\r' && c != '\n')))
        .map(|(typ, _, value)| (typ, value))
}

/// The m= line value
// m=audio 9 UDP/TLS/RTP/SAVPF 111
// m=video 9 UDP/TLS/RTP/SAVPF 96 97 125 107 100 101
// m=application 9 DTLS/SCTP 5000
// m=application 9 UDP/DTLS/SCTP webrtc-datachannel
fn media_line<Input>() -> impl Parser<Input, Output = MediaLine>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        not_sp(), // type: audio, video etc.
        token(' '),
        number::<Input, u16>(), // port: just set to 9 or something
        optional((token('/'), many1::<String, _, _>(digit()))), // <port>/<number of ports>
        token(' '),
        not_sp(), // proto
        many::<Vec<_>, _, _>((skip_many1(token(' ')), not_sp()).map(|(_, f)| f)),
    )
        .map(|(typ, _, port, _, _, proto, fmts)| MediaLine {
            typ,
            port,
            proto,
            fmts,
        })
}

/// `o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>`
fn originator<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // o=- 6564425948916445306 2 IN IP4 127.0.0.1
    (not_sp(), token(' '), not_sp(), token(' '), any_value()).map(|(_, _, sess, _, _)| sess)
}

/// `<bwtype>:<bandwidth>`
fn bandwidth<Input>() -> impl Parser<Input, Output = (String, u32)>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (many1(satisfy(|c| c != ':')), token(':'), number()).map(|(typ, _, val)| (typ, val))
}

// a=fingerprint:sha-256 45:AD:5C:82:F8:BE:B5:2A:D1:74:A6:16:D0:50:CD:86:9C:97:9D:BD:06:8C:C9:85:C9:CD:AB:2B:A8:56:03:CD
// "sha-1" / "sha-224" / "sha-256" / "sha-384" / "sha-512" / "md5" / "md2"
fn fingerprint<Input>() -> impl Parser<Input, Output = (String, Vec<u8>)>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let hex_byte = count_min_max(2, 2, hex_digit()).and_then(|x: String| {
        u8::from_str_radix(&x, 16).map_err(StreamErrorFor::<Input>::message_format)
    });

    (not_sp(), token(' '), sep_by1(hex_byte, token(':'))).map(|(hash_func, _, bytes)| {
        (hash_func, bytes)
    })
}

// a=setup:actpass
fn setup<Input>() -> impl Parser<Input, Output = Role>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    choice((
        attempt(string("actpass").map(|_| Role::ActPass)),
        attempt(string("active").map(|_| Role::Active)),
        attempt(string("passive").map(|_| Role::Passive)),
    ))
}

// a=group:BUNDLE 0 1 2
// a=group:LS 1 2
fn group<Input>() -> impl Parser<Input, Output = (String, Vec<String>)>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        not_sp(),
        many::<Vec<_>, _, _>((skip_many1(token(' ')), not_sp()).map(|(_, m)| m)),
    )
}

fn pt<Input>() -> impl Parser<Input, Output = Pt>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    number::<Input, u8>().map(Pt::from)
}

// a=rtpmap:111 opus/48000/2
// a=rtpmap:96 VP8/90000
fn rtpmap<Input>() -> impl Parser<Input, Output = RtpMap>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        pt(),
        token(' '),
        many1::<String, _, _>(satisfy(|c| c != '/' && c != ' ')),
        token('/'),
        number::<Input, u32>(),
        optional((token('/'), any_value()).map(|(_, e)| e)),
    )
        .map(|(pt, _, format, _, clock_rate, encoding_params)| {
            let mut map = RtpMap::new(pt, format, clock_rate);
            map.encoding_params = encoding_params;
            map
        })
}

// a=fmtp:111 minptime=10;useinbandfec=1
// a=rtcp-fb:96 nack pli
fn pt_value<Input>() -> impl Parser<Input, Output = (Pt, String)>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (pt(), skip_many1(token(' ')), any_value()).map(|(pt, _, v)| (pt, v))
}

/// Candidate fields as they appear on the wire, before address resolution.
#[derive(Debug)]
struct RawCandidate {
    foundation: String,
    component_id: u16,
    proto: Protocol,
    prio: u32,
    addr: String,
    port: u16,
    kind: CandidateKind,
    extensions: Vec<(String, String)>,
}

enum RawCandidateError {
    Hostname(String),
    Invalid(String),
}

impl RawCandidate {
    fn into_candidate(mut self) -> Result<Candidate, RawCandidateError> {
        let ip = match self.addr.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) if is_hostname(&self.addr) => {
                return Err(RawCandidateError::Hostname(self.addr));
            }
            Err(_) => {
                return Err(RawCandidateError::Invalid(format!(
                    "invalid candidate address: {}",
                    self.addr
                )));
            }
        };

        let raddr = self.take_extension("raddr");
        let rport = self.take_extension("rport");

        let raddr = match (raddr, rport) {
            (Some(a), Some(p)) => {
                let a = a.parse::<IpAddr>().map_err(|_| {
                    RawCandidateError::Invalid(format!("invalid candidate raddr: {a}"))
                })?;
                let p = p.parse::<u16>().map_err(|_| {
                    RawCandidateError::Invalid(format!("invalid candidate rport: {p}"))
                })?;
                Some(SocketAddr::from((a, p)))
            }
            (None, None) => None,
            _ => {
                return Err(RawCandidateError::Invalid(
                    "candidate raddr without rport".into(),
                ))
            }
        };

        Ok(Candidate::parsed(
            self.foundation,
            self.component_id,
            self.proto,
            self.prio, // remote candidates calculate prio on their side
            SocketAddr::from((ip, self.port)),
            self.kind,
            raddr,
            self.extensions,
        ))
    }

    fn take_extension(&mut self, name: &str) -> Option<String> {
        let idx = self.extensions.iter().position(|(k, _)| k == name)?;
        Some(self.extensions.remove(idx).1)
    }
}

fn is_hostname(s: &str) -> bool {
    s.contains('.')
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Parser for candidate, without attribute prefix (a=).
fn candidate_fields<Input>() -> impl Parser<Input, Output = RawCandidate>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // candidate:1 1 udp 2113929471 203.0.113.100 10100 typ host
    // candidate:1 1 udp 1845494015 198.51.100.100 11100 typ srflx raddr 203.0.113.100 rport 10100
    // candidate:3684617590 1 udp 2122260223 10.217.229.219 50028 typ host generation 0 network-id 1 network-cost 900
    // candidate:2501718406 1 tcp 1518280447 10.217.229.219 9 typ host tcptype active generation 0 network-id 1
    let kind = choice((
        string("host").map(|_| CandidateKind::Host),
        string("prflx").map(|_| CandidateKind::PeerReflexive),
        string("srflx").map(|_| CandidateKind::ServerReflexive),
        string("relay").map(|_| CandidateKind::Relayed),
    ));

    let proto = not_sp().and_then(|s| {
        Protocol::try_from(s.as_str()).map_err(|_| {
            StreamErrorFor::<Input>::message_format(format!("invalid protocol: {}", s))
        })
    });

    let extension = (token(' '), not_sp(), token(' '), not_sp()).map(|(_, k, _, v)| (k, v));

    (
        string("candidate:"),
        not_sp(),
        token(' '),
        number::<Input, u16>(),
        token(' '),
        proto,
        token(' '),
        number::<Input, u32>(),
        token(' '),
        not_sp(),
        token(' '),
        number::<Input, u16>(),
        string(" typ "),
        kind,
        many::<Vec<_>, _, _>(attempt(extension)),
    )
        .map(
            |(
                _,
                foundation,
                _,
                component_id,
                _,
                proto,
                _,
                prio,
                _,
                addr,
                _,
                port,
                _,
                kind,
                extensions,
            )| RawCandidate {
                foundation,
                component_id,
                proto,
                prio,
                addr,
                port,
                kind,
                extensions,
            },
        )
}

fn number<Input, N>() -> impl Parser<Input, Output = N>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
    N: std::str::FromStr,
    N::Err: std::fmt::Display,
{
    many1::<String, _, _>(digit())
        .and_then(|s| s.parse::<N>().map_err(StreamErrorFor::<Input>::message_format))
}

fn not_sp<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many1(satisfy(|c| c != ' ' && c != '\r' && c != '\n'))
}

fn any_value<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many1(satisfy(|c| c != '\r' && c != '\n'))
}
