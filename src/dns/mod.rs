//! DNS `A` record lookups against a chosen resolver.
//!
//! Each lookup is exactly one UDP query to one resolver: no caching, no retries, and no
//! timeout beyond the trust-dns client default. The domain is sent fully qualified, so
//! `example.com` and `example.com.` issue the same query.
//!
//! Only `A` answers are returned. Any other record type in the answer section (e.g. the `CNAME`
//! a recursive resolver includes while following an alias) is skipped:
//!
//! ```bash
//! ❯ dig @1.1.1.1 +short www.example.com A
//! www.example.com-v4.edgesuite.net.
//! 93.184.216.34
//! ```
//!
//! yields just `["93.184.216.34"]`.

pub mod client;

pub use client::{lookup_a_at, LookupError, ResolverClient, UdpResolverClient, DEFAULT_DNS_PORT};
