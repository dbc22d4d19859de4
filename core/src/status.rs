//! Status dictionary for Signifyd API responses.
//!
//! The messages are part of the client's public contract and must not be
//! reworded. Every 5xx code shares the 500 message.

pub const OK: &str = "OK — Everything worked as expected.";
pub const CREATED: &str = "CREATED — The resource requested was successfully created.";
pub const PROCESSING: &str = "Case is still processing.";
pub const BAD_REQUEST: &str = "Bad Request — Often missing a required parameter.";
pub const UNAUTHORIZED: &str = "Unauthorized — No valid API key provided.";
pub const REQUEST_FAILED: &str = "Request Failed — Parameters were valid but request failed.";
pub const NOT_FOUND: &str = "Not Found — The requested item doesn't exist.";
pub const SERVER_ERROR: &str = "Server errors — something went wrong on the provider's end.";
pub const UNKNOWN: &str = "Unknown status code.";

/// Highest status code still counted as a successful exchange.
pub const SUCCESS_THRESHOLD: u16 = 201;

/// Human-readable description of `status`.
pub fn message(status: u16) -> &'static str {
    match status {
        200 => OK,
        201 => CREATED,
        202 => PROCESSING,
        400 => BAD_REQUEST,
        401 => UNAUTHORIZED,
        402 => REQUEST_FAILED,
        404 => NOT_FOUND,
        s if s >= 500 => SERVER_ERROR,
        _ => UNKNOWN,
    }
}

/// Whether `status` counts as success: anything up to and including 201.
pub fn is_success(status: u16) -> bool {
    status <= SUCCESS_THRESHOLD
}
