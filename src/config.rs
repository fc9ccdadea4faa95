use crate::error::ConfigError;
use crate::permission::Policy;
use ipnetwork::IpNetwork;
use lazy_static::lazy_static;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

/// DNS Gate configuration, loaded from JSON. Unrecognized keys are rejected.
#[serde_as]
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The only address a domain may resolve to for a certificate to be allowed.
    pub targetip: String,
    /// Resolver host or IP to query on port 53. Defaults to
    /// [`DEFAULT_RESOLVER`][crate::permission::DEFAULT_RESOLVER].
    #[serde(default)]
    pub resolver: Option<String>,
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
}

lazy_static! {
    // NOTE(XXX): Once the "ip" feature has stabilized we can use Ipv6Addr.is_unique_local[0].
    //            Presently this feature is unstable so we home-roll. See also RFC 4193[1].
    // [0]: https://doc.rust-lang.org/std/net/struct.Ipv6Addr.html#method.is_unique_local
    // [1]: https://www.rfc-editor.org/rfc/rfc4193.html
    static ref IPV6_UNIQUE_LOCAL_NETWORK: IpNetwork = IpNetwork::from_str("fc00::/7").unwrap();
}

impl Config {
    /// Load and validate a [`Config`] from the JSON file at `p`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IO`] if the file can't be read, and otherwise the same errors as
    /// [`Config::try_from_str`].
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Parse and validate a [`Config`] from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidJSON`] for malformed JSON, missing fields or unknown keys,
    /// [`ConfigError::MissingTargetAddress`] or [`ConfigError::InvalidTargetAddress`] for a bad
    /// `targetip`, and [`ConfigError::InsecureAPIBind`] for a public `api_bind_addr`.
    pub fn try_from_str(s: &str) -> Result<Self, ConfigError> {
        let conf: Config = serde_json::from_str(s)?;
        conf.validate()?;
        Ok(conf)
    }

    /// The permission [`Policy`] described by this config.
    #[must_use]
    pub fn policy(&self) -> Policy {
        let policy = Policy::new(self.targetip.clone());
        match &self.resolver {
            Some(resolver) => policy.with_resolver(resolver.clone()),
            None => policy,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.target_is_ipv4()?;
        self.bind_addr_is_secure()
    }

    fn target_is_ipv4(&self) -> Result<(), ConfigError> {
        if self.targetip.is_empty() {
            return Err(ConfigError::MissingTargetAddress);
        }
        match Ipv4Addr::from_str(&self.targetip) {
            Ok(_) => Ok(()),
            Err(_) => Err(ConfigError::InvalidTargetAddress(self.targetip.clone())),
        }
    }

    fn bind_addr_is_secure(&self) -> Result<(), ConfigError> {
        match self.api_bind_addr {
            SocketAddr::V4(v4_addr) => {
                let ip = v4_addr.ip();
                if !ip.is_loopback() && !ip.is_private() {
                    return Err(ConfigError::InsecureAPIBind(IpAddr::V4(*ip)));
                }
                Ok(())
            }
            SocketAddr::V6(v6_addr) => {
                let ip = v6_addr.ip();
                if !ip.is_loopback() && !IPV6_UNIQUE_LOCAL_NETWORK.contains(IpAddr::V6(*ip)) {
                    return Err(ConfigError::InsecureAPIBind(IpAddr::V6(*ip)));
                }
                Ok(())
            }
        }
    }
}
