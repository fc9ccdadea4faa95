//! On-demand certificate permission by DNS.
//!
//! A domain may receive a certificate iff one of its `A` records, as answered by the policy's
//! resolver, is exactly the policy's target address. Comparison is on the address text; there
//! is no CIDR, prefix, or IPv6 matching.
//!
//! | Lookup                     | Result                         |
//! |----------------------------|--------------------------------|
//! | fails                      | [`Error::ResolutionFailure`]   |
//! | contains the target        | `Ok(())`                       |
//! | empty, or lacks the target | [`Error::PermissionDenied`]    |

use crate::dns::ResolverClient;
use crate::error::Error;
use std::sync::Arc;
use tracing::{debug, error};

/// Resolver queried when the policy doesn't name one.
pub const DEFAULT_RESOLVER: &str = "1.1.1.1";

/// `DynPermission` is a type alias for a [`CertificatePermission`] shared between concurrent
/// callers through an [`Arc`]. No lock is needed: checks never mutate the permission.
pub type DynPermission = Arc<dyn CertificatePermission + Send + Sync>;

/// The capability a certificate issuer consults before issuing for `domain`.
#[async_trait::async_trait]
pub trait CertificatePermission {
    /// Returns `Ok(())` if a certificate may be issued for `domain`.
    async fn certificate_allowed(&self, domain: &str) -> Result<(), Error>;
}

/// The address a domain must resolve to, and where to ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    target_address: String,
    resolver_address: Option<String>,
    default_resolver: String,
}

impl Policy {
    pub fn new(target_address: impl Into<String>) -> Self {
        Self {
            target_address: target_address.into(),
            resolver_address: None,
            default_resolver: DEFAULT_RESOLVER.to_string(),
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver_address: impl Into<String>) -> Self {
        self.resolver_address = Some(resolver_address.into());
        self
    }

    /// Replace the resolver used when none is configured.
    #[must_use]
    pub fn with_default_resolver(mut self, default_resolver: impl Into<String>) -> Self {
        self.default_resolver = default_resolver.into();
        self
    }

    #[must_use]
    pub fn target_address(&self) -> &str {
        &self.target_address
    }

    #[must_use]
    pub fn resolver_address(&self) -> Option<&str> {
        self.resolver_address.as_deref()
    }

    /// The configured resolver, or the default if it's unset or empty.
    #[must_use]
    pub fn effective_resolver(&self) -> &str {
        match self.resolver_address.as_deref() {
            Some(resolver) if !resolver.is_empty() => resolver,
            _ => &self.default_resolver,
        }
    }
}

/// Grants permission to domains whose `A` records include the [`Policy`] target address.
#[derive(Debug, Clone)]
pub struct PermissionByDns<C> {
    policy: Policy,
    client: C,
}

impl<C: ResolverClient> PermissionByDns<C> {
    pub fn new(policy: Policy, client: C) -> Self {
        Self { policy, client }
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

#[async_trait::async_trait]
impl<C> CertificatePermission for PermissionByDns<C>
where
    C: ResolverClient + Send + Sync,
{
    async fn certificate_allowed(&self, domain: &str) -> Result<(), Error> {
        let target = self.policy.target_address();
        let resolver = self.policy.effective_resolver();
        debug!(domain, target, resolver, "checking permission for certificate");

        let addrs = match self.client.lookup_a(domain, resolver).await {
            Ok(addrs) => addrs,
            Err(err) => {
                error!(domain, resolver, "DNS lookup failed: {err}");
                return Err(Error::ResolutionFailure {
                    domain: domain.to_string(),
                    source: err,
                });
            }
        };

        for ip in &addrs {
            debug!(domain, ip = ip.as_str(), "found DNS A record");
            if ip == target {
                debug!(domain, ip = ip.as_str(), "domain resolves to allowed IP");
                return Ok(());
            }
        }

        debug!(domain, target, "domain does not resolve to allowed IP");
        Err(Error::PermissionDenied {
            domain: domain.to_string(),
            target: target.to_string(),
        })
    }
}
