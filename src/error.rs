//! Error types.

use crate::dns::LookupError;
use std::net::IpAddr;

/// Error enumerates the outcomes of a permission check that aren't "allowed", plus the
/// configuration failures that prevent a check from ever running.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when the `A` query for `domain` could not be completed: the resolver was
    /// unreachable, timed out, answered with a non-success response code, or sent something
    /// unparseable.
    ///
    /// Callers may treat this as transient and ask again later.
    #[error("failed to resolve DNS for {domain}: {source}")]
    ResolutionFailure {
        domain: String,
        #[source]
        source: LookupError,
    },

    /// Returned when the query succeeded but none of the resolved addresses equal the
    /// configured [`Policy::target_address`][crate::permission::Policy::target_address].
    ///
    /// This is a policy decision, not a fault.
    #[error("domain {domain} does not resolve to allowed IP {target}")]
    PermissionDenied { domain: String, target: String },

    /// Returned when the configuration is malformed. Only produced before a
    /// [`PermissionByDns`][crate::permission::PermissionByDns] is constructed.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl Error {
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::PermissionDenied { .. })
    }

    #[must_use]
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Error::ResolutionFailure { .. })
    }
}

/// Configuration errors, raised by [`Config`][crate::config::Config] loading.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Returned when the config file can't be read.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when the config isn't valid JSON, is missing a required field, or contains a
    /// key that isn't recognized.
    #[error("invalid config: {0}")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when `targetip` is present but empty.
    #[error("targetip must not be empty")]
    MissingTargetAddress,

    /// Returned when `targetip` isn't an IPv4 address literal.
    #[error("targetip \"{0}\" is not an IPv4 address")]
    InvalidTargetAddress(String),

    /// Returned when the [`Config::api_bind_addr`][`crate::config::Config::api_bind_addr`] is
    /// not a loopback address, or an address within a private network space. Only the local
    /// TLS terminator is expected to ask for permission.
    #[error("API bind address ({0}) must be a loopback or private IP")]
    InsecureAPIBind(IpAddr),
}
