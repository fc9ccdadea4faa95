//! Lookups and permission checks against a local authoritative server.

use dnsgate::dns::{lookup_a_at, ResolverClient, UdpResolverClient};
use dnsgate::{CertificatePermission, PermissionByDns, Policy};
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use trust_dns_server::authority::MessageResponseBuilder;
use trust_dns_server::client::op::{Header, ResponseCode};
use trust_dns_server::client::rr::rdata::TXT;
use trust_dns_server::client::rr::{LowerName, Name, RData, Record};
use trust_dns_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use trust_dns_server::ServerFuture;

const TARGET: &str = "203.0.113.9";

/// Answers from a fixed zone. Unknown names are NXDOMAIN, `servfail.test.` is SERVFAIL.
#[derive(Clone, Default)]
struct Zone {
    records: HashMap<LowerName, Vec<RData>>,
}

impl Zone {
    fn with(mut self, name: &str, rdata: Vec<RData>) -> Self {
        self.records.insert(lower(name), rdata);
        self
    }
}

fn lower(name: &str) -> LowerName {
    LowerName::from(Name::from_str(name).unwrap())
}

fn a(ip: &str) -> RData {
    RData::A(Ipv4Addr::from_str(ip).unwrap())
}

#[async_trait::async_trait]
impl RequestHandler for Zone {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let name = request.query().name();
        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);

        let response = if *name == lower("servfail.test.") {
            header.set_response_code(ResponseCode::ServFail);
            response_handle
                .send_response(builder.build_no_records(header))
                .await
        } else if let Some(rdata) = self.records.get(name) {
            let records: Vec<Record> = rdata
                .iter()
                .map(|rd| Record::from_rdata(name.into(), 60, rd.clone()))
                .collect();
            response_handle
                .send_response(builder.build(header, records.iter(), &[], &[], &[]))
                .await
        } else {
            header.set_response_code(ResponseCode::NXDomain);
            response_handle
                .send_response(builder.build_no_records(header))
                .await
        };

        response.unwrap_or_else(|_| {
            let mut header = Header::new();
            header.set_response_code(ResponseCode::ServFail);
            header.into()
        })
    }
}

async fn serve(zone: Zone) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let mut server = ServerFuture::new(zone);
    server.register_socket(socket);
    tokio::spawn(server.block_until_done());
    addr
}

fn zone() -> Zone {
    Zone::default()
        .with("allowed.test.", vec![a(TARGET)])
        .with("multi.test.", vec![a("198.51.100.1"), a(TARGET)])
        .with("elsewhere.test.", vec![a("198.51.100.1")])
        .with(
            "alias.test.",
            vec![RData::CNAME(Name::from_str("allowed.test.").unwrap()), a(TARGET)],
        )
        .with(
            "txt-only.test.",
            vec![RData::TXT(TXT::new(vec!["hello".to_string()]))],
        )
}

fn permission(addr: SocketAddr) -> PermissionByDns<UdpResolverClient> {
    let policy = Policy::new(TARGET).with_resolver(addr.ip().to_string());
    PermissionByDns::new(policy, UdpResolverClient::with_port(addr.port()))
}

#[tokio::test]
async fn returns_a_records_in_answer_order() {
    let addr = serve(zone()).await;
    let addrs = lookup_a_at("multi.test", addr).await.unwrap();
    assert_eq!(addrs, vec!["198.51.100.1".to_string(), TARGET.to_string()]);
}

#[tokio::test]
async fn trailing_dot_is_the_same_query() {
    let addr = serve(zone()).await;
    let relative = lookup_a_at("allowed.test", addr).await.unwrap();
    let absolute = lookup_a_at("allowed.test.", addr).await.unwrap();
    assert_eq!(relative, absolute);
}

#[tokio::test]
async fn skips_non_address_answers() {
    let addr = serve(zone()).await;
    assert_eq!(
        lookup_a_at("alias.test", addr).await.unwrap(),
        vec![TARGET.to_string()]
    );
    assert!(lookup_a_at("txt-only.test", addr).await.unwrap().is_empty());
}

#[tokio::test]
async fn error_response_codes_fail() {
    let addr = serve(zone()).await;
    assert!(lookup_a_at("missing.test", addr).await.is_err());
    assert!(lookup_a_at("servfail.test", addr).await.is_err());
}

#[tokio::test]
async fn client_resolves_resolver_host_name() {
    let addr = serve(zone()).await;
    let client = UdpResolverClient::with_port(addr.port());
    let addrs = client.lookup_a("allowed.test", "localhost").await;
    // localhost may resolve to ::1 first on some hosts, where nothing is listening.
    if let Ok(addrs) = addrs {
        assert_eq!(addrs, vec![TARGET.to_string()]);
    }
}

#[tokio::test]
async fn permission_decisions() {
    let addr = serve(zone()).await;
    let p = permission(addr);

    assert!(p.certificate_allowed("allowed.test").await.is_ok());
    assert!(p.certificate_allowed("multi.test").await.is_ok());
    assert!(p.certificate_allowed("alias.test").await.is_ok());

    let err = p.certificate_allowed("elsewhere.test").await.unwrap_err();
    assert!(err.is_permission_denied());
    let err = p.certificate_allowed("txt-only.test").await.unwrap_err();
    assert!(err.is_permission_denied());

    let err = p.certificate_allowed("missing.test").await.unwrap_err();
    assert!(err.is_resolution_failure());
    let err = p.certificate_allowed("servfail.test").await.unwrap_err();
    assert!(err.is_resolution_failure());
}

#[tokio::test]
async fn concurrent_checks_are_independent() {
    let addr = serve(zone()).await;
    let p = Arc::new(permission(addr));

    let handles: Vec<_> = ["allowed.test", "elsewhere.test"]
        .iter()
        .cycle()
        .take(20)
        .map(|&domain| {
            let p = p.clone();
            tokio::spawn(async move { (domain, p.certificate_allowed(domain).await) })
        })
        .collect();

    for handle in handles {
        let (domain, res) = handle.await.unwrap();
        match domain {
            "allowed.test" => assert!(res.is_ok()),
            _ => assert!(res.unwrap_err().is_permission_denied()),
        }
    }
}

#[tokio::test]
async fn silent_resolver_is_resolution_failure() {
    // Bound but never read: queries go unanswered until the client gives up.
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let p = permission(silent.local_addr().unwrap());
    let err = p.certificate_allowed("allowed.test").await.unwrap_err();
    assert!(err.is_resolution_failure());
}

#[tokio::test]
async fn dropping_the_check_cancels_the_query() {
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let p = permission(silent.local_addr().unwrap());
    let res = tokio::time::timeout(
        Duration::from_millis(100),
        p.certificate_allowed("allowed.test"),
    )
    .await;
    assert!(res.is_err());
}
