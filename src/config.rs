use crate::sdp::Role;

/// Policy inputs for creating and parsing a [`Description`][crate::Description].
///
/// ```
/// use rtc_sdp::{Description, Role, SdpConfig, SdpType};
///
/// let config = SdpConfig::new()
///     .set_answer_role(Role::Active)
///     .set_session_id("4242");
///
/// let answer = Description::with_config(SdpType::Answer, &config);
/// assert_eq!(answer.role(), Role::Active);
/// assert_eq!(answer.session_id(), "4242");
/// ```
///
/// Configs implement [`Clone`] to help create many descriptions with the same policy.
#[derive(Debug, Clone)]
pub struct SdpConfig {
    pub(crate) answer_role: Role,
    pub(crate) session_id: Option<String>,
}

impl SdpConfig {
    /// Creates a new default config.
    pub fn new() -> Self {
        SdpConfig::default()
    }

    /// The DTLS role an answer takes when nothing else says otherwise.
    ///
    /// Defaults to [`Role::Passive`].
    pub fn answer_role(&self) -> Role {
        self.answer_role
    }

    /// Set the DTLS role for answers lacking an `a=setup` line.
    ///
    /// This is the outcome of the caller's DTLS negotiation policy. An offer
    /// lacking `a=setup` always resolves to [`Role::ActPass`]. Setting
    /// [`Role::ActPass`] here leaves such answers unresolved.
    pub fn set_answer_role(mut self, role: Role) -> Self {
        self.answer_role = role;
        self
    }

    /// The fixed session id, if set.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Use a fixed session id instead of a random one.
    ///
    /// Applies to new descriptions and to parsed ones without an `o=` line.
    pub fn set_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub(crate) fn new_session_id(&self) -> String {
        match &self.session_id {
            Some(id) => id.clone(),
            // RFC 3264: representable by a 64-bit signed integer, less than 2^62 - 1.
            None => fastrand::u64(..(1 << 62) - 1).to_string(),
        }
    }
}

impl Default for SdpConfig {
    fn default() -> Self {
        Self {
            answer_role: Role::Passive,
            session_id: None,
        }
    }
}
