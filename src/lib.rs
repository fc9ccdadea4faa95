//! DNS Gate
//!
//! A permission check for [on-demand TLS] certificate issuance: a certificate may be issued for
//! a domain only if that domain's `A` records, as answered by a chosen resolver, include one
//! configured target address. Point a wildcard of customer domains at your edge and only the
//! ones that actually resolve to it get certificates.
//!
//! The decision lives in [`permission`]; [`dns`] performs the single lookup it needs, and
//! [`api`] exposes it as an HTTP "ask" endpoint.
//!
//! [on-demand TLS]: https://caddyserver.com/docs/automatic-https#on-demand-tls
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod dns;
pub mod error;
pub mod permission;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use dns::UdpResolverClient;
pub use error::{ConfigError, Error};
pub use permission::{CertificatePermission, DynPermission, PermissionByDns, Policy};
