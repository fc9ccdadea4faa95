use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::pin::pin;
use tokio::net::UdpSocket;
use tracing::debug;
use trust_dns_client::client::{AsyncClient, ClientHandle};
use trust_dns_client::error::ClientError;
use trust_dns_client::op::ResponseCode;
use trust_dns_client::rr::{DNSClass, Name, RData, RecordType};
use trust_dns_client::udp::UdpClientStream;
use trust_dns_proto::error::ProtoError;

/// The port DNS resolvers are queried on.
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Errors from a single `A` query. The underlying causes are carried through for diagnostics
/// but aren't meant to be told apart by callers.
#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("invalid resolver address \"{0}\": {1}")]
    ResolverAddress(String, #[source] std::io::Error),

    #[error("resolver \"{0}\" has no addresses")]
    NoResolverAddress(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Proto(#[from] ProtoError),

    #[error("resolver returned {0}")]
    ResponseCode(ResponseCode),

    #[error("DNS exchange closed before a response arrived")]
    ExchangeClosed,
}

/// An async trait describing a single `A` record lookup for a domain against one resolver.
#[async_trait::async_trait]
pub trait ResolverClient {
    /// Query `resolver` for the `A` records of `domain`, returning the addresses in answer order.
    async fn lookup_a(&self, domain: &str, resolver: &str) -> Result<Vec<String>, LookupError>;
}

/// A [`ResolverClient`] that sends one UDP query per lookup and keeps no state between lookups.
#[derive(Debug, Clone, Copy)]
#[allow(clippy::module_name_repetitions)]
pub struct UdpResolverClient {
    port: u16,
}

impl Default for UdpResolverClient {
    fn default() -> Self {
        Self {
            port: DEFAULT_DNS_PORT,
        }
    }
}

impl UdpResolverClient {
    /// A client that queries resolvers on `port` instead of [`DEFAULT_DNS_PORT`].
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self { port }
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    async fn resolver_addr(&self, resolver: &str) -> Result<SocketAddr, LookupError> {
        let mut addrs = tokio::net::lookup_host((resolver, self.port))
            .await
            .map_err(|err| LookupError::ResolverAddress(resolver.to_string(), err))?;
        addrs
            .next()
            .ok_or_else(|| LookupError::NoResolverAddress(resolver.to_string()))
    }
}

#[async_trait::async_trait]
impl ResolverClient for UdpResolverClient {
    async fn lookup_a(&self, domain: &str, resolver: &str) -> Result<Vec<String>, LookupError> {
        let addr = self.resolver_addr(resolver).await?;
        lookup_a_at(domain, addr).await
    }
}

/// Send a single `A` query for `domain` to the resolver at `addr`.
///
/// The client's background exchange is polled on the caller's task and dropped along with the
/// client when this returns, so dropping the returned future aborts the query and closes the
/// socket.
///
/// # Errors
///
/// Returns a [`LookupError`] if `domain` can't be encoded as a DNS name, the exchange fails or
/// times out, or the response code isn't `NOERROR`.
pub async fn lookup_a_at(domain: &str, addr: SocketAddr) -> Result<Vec<String>, LookupError> {
    let name = fqdn(domain)?;
    let stream = UdpClientStream::<UdpSocket>::new(addr);
    let (mut client, background) = AsyncClient::connect(stream).await?;

    let query = client.query(name, DNSClass::IN, RecordType::A);
    let response = drive(query, background).await??;

    if response.response_code() != ResponseCode::NoError {
        return Err(LookupError::ResponseCode(response.response_code()));
    }

    let addrs: Vec<Ipv4Addr> = response
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            Some(RData::A(ip)) => Some(*ip),
            _ => None,
        })
        .collect();
    debug!("{addr} answered {} A record(s) for {domain}", addrs.len());
    Ok(addrs.iter().map(ToString::to_string).collect())
}

// Polls the query alongside the exchange that services it until the query completes.
async fn drive<Q, B>(query: Q, background: B) -> Result<Q::Output, LookupError>
where
    Q: Future,
    B: Future<Output = Result<(), ProtoError>>,
{
    let mut query = pin!(query);
    let mut background = pin!(background);
    tokio::select! {
        biased;
        response = &mut query => Ok(response),
        res = &mut background => match res {
            Err(err) => Err(err.into()),
            Ok(()) => Err(LookupError::ExchangeClosed),
        },
    }
}

fn fqdn(domain: &str) -> Result<Name, LookupError> {
    let name = if domain.ends_with('.') {
        Name::from_utf8(domain)?
    } else {
        Name::from_utf8(format!("{domain}."))?
    };
    Ok(name)
}
