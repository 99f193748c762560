//! TLS policy for outgoing requests.
//!
//! Scripts routinely target development servers with self-signed
//! certificates, so the runner uses [`TlsConfig::insecure`].

use serde::{Deserialize, Serialize};

/// Certificate checks applied by the HTTP transport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TlsConfig {
    /// Accept self-signed, expired or otherwise invalid certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Accept certificates whose hostname does not match.
    #[serde(default)]
    pub accept_invalid_hostnames: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsConfig {
    /// Full certificate verification.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accept_invalid_certs: false,
            accept_invalid_hostnames: false,
        }
    }

    /// Accepts any certificate and any hostname.
    #[must_use]
    pub const fn insecure() -> Self {
        Self {
            accept_invalid_certs: true,
            accept_invalid_hostnames: true,
        }
    }

    /// Lists the relaxed checks in this policy.
    #[must_use]
    pub fn security_warnings(&self) -> Vec<TlsSecurityWarning> {
        let mut warnings = vec![];

        if self.accept_invalid_certs {
            warnings.push(TlsSecurityWarning::AcceptingInvalidCertificates);
        }

        if self.accept_invalid_hostnames {
            warnings.push(TlsSecurityWarning::AcceptingInvalidHostnames);
        }

        warnings
    }
}

/// A relaxed certificate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsSecurityWarning {
    /// Invalid certificates are accepted.
    AcceptingInvalidCertificates,
    /// Mismatched hostnames are accepted.
    AcceptingInvalidHostnames,
}

impl TlsSecurityWarning {
    /// Log-friendly description.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::AcceptingInvalidCertificates => {
                "accepting invalid certificates; connections may be intercepted"
            }
            Self::AcceptingInvalidHostnames => {
                "accepting invalid hostnames; the server identity is not verified"
            }
        }
    }
}
