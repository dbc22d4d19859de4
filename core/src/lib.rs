//! Blocking client for the Signifyd fraud-review case API.
//!
//! # Overview
//! Retrieves and creates cases (fraud reviews of e-commerce orders) over
//! HTTPS with Basic authentication, and normalizes every answer into a
//! `CaseResponse`: status code, dictionary message, success flag, decoded
//! JSON body and raw text.
//!
//! # Design
//! - `SignifydClient` holds an immutable `ClientConfig` and a `Transport`;
//!   no state is carried between calls.
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`),
//!   so the build and parse steps are testable without a network.
//! - HTTP error statuses are results, not errors. `ApiError` is reserved for
//!   configuration, serialization and transport failures; a body that does not
//!   decode is reported through `CaseResponse::decode_error`.
//!
//! ```no_run
//! use signifyd_core::{ClientConfig, SignifydClient};
//!
//! let client = SignifydClient::new(ClientConfig::new("my-api-key")?);
//! let case = client.get_case_by_order_id("ORDER-1001")?;
//! if case.success {
//!     println!("{}", case.raw_body);
//! } else {
//!     eprintln!("{}: {}", case.status_code, case.status_message);
//! }
//! # Ok::<(), signifyd_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod status;
pub mod transport;
pub mod types;

pub use client::SignifydClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{CaseResponse, FullCaseData};
