//! HTTP API a TLS terminator asks before issuing an on-demand certificate.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/ask?domain=<name>` (GET)
//!
//!   Checks whether a certificate may be issued for `domain` using the configured
//!   [`CertificatePermission`][crate::permission::CertificatePermission].
//!
//!   ```bash
//!   ❯ curl -i 'http://127.0.0.1:5555/ask?domain=www.example.com'
//!   HTTP/1.1 200 OK
//!   {"domain":"www.example.com"}
//!   ```
//!
//!   | Outcome                                            | Status                        |
//!   |----------------------------------------------------|-------------------------------|
//!   | allowed                                            | 200 (OK)                      |
//!   | [`PermissionDenied`][crate::error::Error::PermissionDenied]   | 403 (Forbidden)    |
//!   | [`ResolutionFailure`][crate::error::Error::ResolutionFailure] | 503 (Unavailable)  |
//!   | missing or empty `domain`                          | 400 (Bad Request)             |
//!   | check exceeded `api_timeout`                       | 408 (Request Timeout)         |
//!
//!   Errors carry a JSON body of the form `{"error": "..."}`. Anything but a 200 should be
//!   treated as a refusal; a 503 or 408 may be retried later.
//!
//!   Caddy, for example, is pointed at it with:
//!
//!   ```text
//!   on_demand_tls {
//!       ask http://127.0.0.1:5555/ask
//!   }
//!   ```
//!   (Caddy appends the `domain` query parameter itself.)

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
