use thiserror::Error;

/// Errors from parsing, querying and generating session descriptions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SdpError {
    /// Malformed or structurally invalid SDP.
    ///
    /// `line` is the offending line without its terminator. Parsing is
    /// all-or-nothing, no partially populated description is returned.
    #[error("SDP parse: {reason} (line: {line:?})")]
    Parse {
        /// The offending line.
        line: String,
        /// Why the line was rejected.
        reason: ParseReason,
    },

    /// Lookup miss on a format or media section.
    #[error("SDP not found: {0}")]
    NotFound(String),

    /// A field required at generation time is not set.
    #[error("SDP missing field: {0}")]
    MissingField(&'static str),

    /// Duplicate payload type or mid.
    #[error("SDP duplicate: {0}")]
    Duplicate(String),

    /// A candidate that cannot be advertised.
    #[error("Bad candidate: {0}")]
    BadCandidate(String),
}

/// The distinct kinds of [`SdpError::Parse`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseReason {
    /// The line does not follow the expected syntax.
    #[error("malformed line: {0}")]
    Malformed(String),

    /// An `a=group` line names a mid with no matching section.
    #[error("group references unknown mid {0:?}")]
    DanglingBundleMid(String),

    /// A payload type is declared twice within one section.
    #[error("duplicate payload type {0}")]
    DuplicatePayloadType(u8),

    /// An rtpmap/fmtp/rtcp-fb line names a payload type not on the m-line.
    #[error("payload type {0} not declared on the m-line")]
    UndeclaredPayloadType(u8),

    /// Two sections share a mid.
    #[error("duplicate mid {0:?}")]
    DuplicateMid(String),

    /// More than one SCTP application section.
    #[error("more than one data section")]
    DuplicateDataSection,

    /// More than one of sendrecv, sendonly, recvonly, inactive.
    #[error("more than one direction attribute")]
    ConflictingDirection,
}

impl SdpError {
    pub(crate) fn parse(line: &str, reason: ParseReason) -> Self {
        SdpError::Parse {
            line: line.to_string(),
            reason,
        }
    }

    pub(crate) fn malformed(line: &str, msg: impl Into<String>) -> Self {
        SdpError::parse(line, ParseReason::Malformed(msg.into()))
    }

    /// The parse reason, if this is a parse error.
    pub fn parse_reason(&self) -> Option<&ParseReason> {
        match self {
            SdpError::Parse { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
