//! Case operations of the Signifyd v2 API.
//!
//! # Design
//! Every operation runs the same pipeline: build an `HttpRequest`, hand it to
//! the `Transport`, normalize the `HttpResponse` into a `CaseResponse`. The
//! build and parse steps are public too, so a host that performs its own I/O
//! can use the client without the bundled transport.

use std::fmt::Display;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::status;
use crate::transport::{Transport, UreqTransport};
use crate::types::{CaseResponse, FullCaseData};

const APPLICATION_JSON: &str = "application/json";

/// Synchronous client for the Signifyd case endpoints.
///
/// Holds only the immutable configuration and a transport; calls share no
/// mutable state, so one client may serve many threads when its transport is
/// `Sync`.
#[derive(Debug, Clone)]
pub struct SignifydClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl SignifydClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.accept_invalid_certs());
        Self { config, transport }
    }

    /// Client configured from `SIGNIFYD_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }
}

impl<T: Transport> SignifydClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get_case_by_case_id(&self, case_id: impl Display) -> Result<CaseResponse, ApiError> {
        self.send(self.build_get(&format!("cases/{case_id}")))
    }

    pub fn get_case_by_order_id(&self, order_id: impl Display) -> Result<CaseResponse, ApiError> {
        self.send(self.build_get(&format!("orders/{order_id}/case")))
    }

    pub fn get_case_entries_by_case_id(&self, case_id: impl Display) -> Result<CaseResponse, ApiError> {
        self.send(self.build_get(&format!("cases/{case_id}/entries")))
    }

    pub fn get_case_entries_by_order_id(&self, order_id: impl Display) -> Result<CaseResponse, ApiError> {
        self.send(self.build_get(&format!("orders/{order_id}/case/entries")))
    }

    pub fn get_case_analysis_by_order_id(&self, order_id: impl Display) -> Result<CaseResponse, ApiError> {
        self.send(self.build_get(&format!("orders/{order_id}/case/analysis")))
    }

    pub fn get_case_analysis_by_case_id(&self, case_id: impl Display) -> Result<CaseResponse, ApiError> {
        self.send(self.build_get(&format!("cases/{case_id}/analysis")))
    }

    /// Fetch case, analysis and entries one after another.
    ///
    /// A sub-request answered with an HTTP error or an undecodable body
    /// contributes `None` and clears the combined flag; nothing is retried.
    /// Only a transport error aborts the whole call.
    pub fn get_full_case_data_by_case_id(&self, case_id: impl Display) -> Result<FullCaseData, ApiError> {
        let basic = self.get_case_by_case_id(&case_id)?;
        let analysis = self.get_case_analysis_by_case_id(&case_id)?;
        let entries = self.get_case_entries_by_case_id(&case_id)?;
        let data = FullCaseData::merge(basic, analysis, entries);
        debug!(%case_id, success = data.success, "fetched full case data");
        Ok(data)
    }

    /// Submit `data` as a new case.
    pub fn create_case<D: Serialize + ?Sized>(&self, data: &D) -> Result<CaseResponse, ApiError> {
        self.send(self.build_create_case(data)?)
    }

    /// GET request for `path`, relative to the base URL.
    pub fn build_get(&self, path: &str) -> HttpRequest {
        self.build_request(path, Some(APPLICATION_JSON), None)
    }

    /// POST request creating a case from `data`.
    pub fn build_create_case<D: Serialize + ?Sized>(&self, data: &D) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(data).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let accept = self.config.accept_on_create().then_some(APPLICATION_JSON);
        Ok(self.build_request("cases", accept, Some(body)))
    }

    /// Normalize a raw response.
    ///
    /// Statuses up to 201 are successful and their body is decoded; an empty
    /// body decodes to `None`. A body that is not JSON leaves `body` empty,
    /// clears `success` and is described in `decode_error`. Other statuses
    /// keep only the raw text.
    pub fn parse_response(&self, response: HttpResponse) -> CaseResponse {
        let status_message = status::message(response.status);
        let mut success = status::is_success(response.status);
        let mut body = None;
        let mut decode_error = None;

        if success {
            match decode_body(&response.body) {
                Ok(decoded) => body = decoded,
                Err(e) => {
                    debug!(status = response.status, error = %e, "response body is not valid JSON");
                    success = false;
                    decode_error = Some(e.to_string());
                }
            }
        } else {
            debug!(status = response.status, message = status_message, "request was not successful");
        }

        CaseResponse {
            status_code: response.status,
            status_message: status_message.to_string(),
            success,
            body,
            raw_body: response.body,
            decode_error,
        }
    }

    fn build_request(&self, path: &str, accept: Option<&str>, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("authorization".to_string(), self.basic_auth())];
        if let Some(accept) = accept {
            headers.push(("accept".to_string(), accept.to_string()));
        }
        let method = match &body {
            Some(body) => {
                headers.push(("content-type".to_string(), APPLICATION_JSON.to_string()));
                headers.push(("content-length".to_string(), body.len().to_string()));
                HttpMethod::Post
            }
            None => HttpMethod::Get,
        };

        HttpRequest {
            method,
            url: format!("{}/{}", self.config.base_url(), path.trim_start_matches('/')),
            headers,
            body,
        }
    }

    /// API key as username, empty password.
    fn basic_auth(&self) -> String {
        let credentials = format!("{}:", self.config.api_key());
        format!("Basic {}", STANDARD.encode(credentials))
    }

    fn send(&self, request: HttpRequest) -> Result<CaseResponse, ApiError> {
        let response = self.transport.execute(&request)?;
        Ok(self.parse_response(response))
    }
}

fn decode_body(raw: &str) -> Result<Option<Value>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw).map(Some)
}
