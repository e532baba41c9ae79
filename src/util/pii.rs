//! Redaction of peer identifying values in logs.
//!
//! Candidate addresses and ICE credentials tell a reader where a peer lives
//! on the network and how to talk to it. Wrap them in [`Pii`] before handing
//! them to `debug!`, `info!` or `warn!`. With the `pii` feature enabled the
//! wrapped value is rendered as `{REDACTED}`, otherwise it is shown as is.
//!
//! Trace level logs are not expected to be enabled in production and may
//! print raw values.

use core::fmt;
use core::ops::Deref;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pii<T>(pub T);

impl<T: fmt::Display> fmt::Display for Pii<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if cfg!(feature = "pii") {
            f.write_str("{REDACTED}")
        } else {
            self.0.fmt(f)
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Pii<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if cfg!(feature = "pii") {
            f.write_str("{REDACTED}")
        } else {
            self.0.fmt(f)
        }
    }
}

impl<T> Deref for Pii<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::net::SocketAddr;

    #[test]
    fn candidate_addr() {
        let addr: SocketAddr = "192.168.1.20:50000".parse().unwrap();
        let shown = Pii(addr).to_string();

        if cfg!(feature = "pii") {
            assert_eq!(shown, "{REDACTED}");
        } else {
            assert_eq!(shown, "192.168.1.20:50000");
        }
    }

    #[test]
    fn ice_pwd_debug() {
        let shown = format!("{:?}", Pii("0zV/Yu3y8aDzbHgqWhnVQhqP"));

        if cfg!(feature = "pii") {
            assert_eq!(shown, "{REDACTED}");
        } else {
            assert_eq!(shown, "\"0zV/Yu3y8aDzbHgqWhnVQhqP\"");
        }
    }
}
