//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `Transport` is the only I/O seam of the crate. `UreqTransport` is the
//! blocking default: it builds a fresh `ureq::Agent` for every call, so no
//! connection or handle outlives the request that opened it, and it returns
//! 4xx/5xx answers as data so the client can normalize them.

use tracing::debug;
use ureq::tls::TlsConfig;
use ureq::RequestBuilder;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP exchange.
///
/// Implementations must return `Ok` for every response that carries a
/// status line, whatever the status, and `Err(ApiError::Transport)` only
/// when no response was obtained.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Largest response body read before the exchange fails as a transport
/// error. ureq's own default is 10 MB.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Blocking transport backed by `ureq`.
///
/// No timeout is configured and nothing is retried. Bodies larger than
/// `MAX_BODY_BYTES` are reported as `ApiError::Transport`.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport {
    accept_invalid_certs: bool,
}

impl UreqTransport {
    pub fn new(accept_invalid_certs: bool) -> Self {
        Self { accept_invalid_certs }
    }

    fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(self.accept_invalid_certs)
                    .build(),
            )
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let agent = self.agent();

        let result = match request.method {
            HttpMethod::Get => with_headers(agent.get(&request.url), &request.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(agent.post(&request.url), &request.headers);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()?;
        debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, headers, body })
    }
}

/// Copy request headers onto a ureq builder. `content-length` is left to
/// ureq, which derives it from the body it sends.
fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
