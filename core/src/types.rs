//! Normalized results returned by the case client.
//!
//! # Design
//! Case payloads change per endpoint and per provider release, so bodies are
//! kept as a `serde_json::Value` tree rather than a fixed schema. The serde
//! field names match the keys hosts already consume (`caseBasic`,
//! `isSuccessful`, ...), so a result can be forwarded as JSON unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform result of one API request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    #[serde(rename = "statusMessage")]
    pub status_message: String,

    /// True when `status_code <= 201` and the body, if any, decoded.
    #[serde(rename = "isSuccessful")]
    pub success: bool,

    /// Decoded JSON body. `None` when the request was not successful, the
    /// body could not be decoded, or the successful response carried none.
    #[serde(rename = "responseObject")]
    pub body: Option<Value>,

    /// Response text exactly as received, kept for every status.
    #[serde(rename = "fullResponse")]
    pub raw_body: String,

    /// Why a body sent with a successful status could not be decoded.
    #[serde(rename = "decodeError", default, skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

/// Case, analysis and entries of one case fetched back to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullCaseData {
    #[serde(rename = "caseBasic")]
    pub case_basic: Option<Value>,

    #[serde(rename = "caseAnalysis")]
    pub case_analysis: Option<Value>,

    #[serde(rename = "caseEntries")]
    pub case_entries: Option<Value>,

    /// True only when all three fetches succeeded.
    #[serde(rename = "isSuccessful")]
    pub success: bool,
}

impl FullCaseData {
    pub(crate) fn merge(basic: CaseResponse, analysis: CaseResponse, entries: CaseResponse) -> Self {
        Self {
            success: basic.success && analysis.success && entries.success,
            case_basic: basic.body,
            case_analysis: analysis.body,
            case_entries: entries.body,
        }
    }
}
