#![warn(missing_docs)]
//! # image-compare-contract
//!
//! ## Purpose
//! Defines the `/compare` HTTP contract shared by the browser client and the
//! remote comparison service.
//!
//! ## Responsibilities
//! - Name the two multipart fields carrying the selected images.
//! - Parse success and error response bodies.
//! - Normalize every response into one [`ComparisonOutcome`].
//!
//! ## Data flow
//! HTTP status + raw body -> [`interpret_response`] -> [`ComparisonOutcome`]
//! -> result rendering.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs so outcomes can outlive the transient
//! response buffers they were decoded from.
//!
//! ## Error model
//! Body-level problems surface as [`ContractError`] from the parse helpers.
//! [`interpret_response`] never fails: it folds every error into
//! [`ComparisonOutcome::Failure`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verdict text the service returns when both uploads hash identically.
pub const IDENTICAL_VERDICT: &str = "Images are identical.";

/// Verdict text the service returns for any other pair.
pub const DIFFERENT_VERDICT: &str = "Images are different or forged.";

/// Failure message used when an error response carries no usable `error` field.
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

/// Failure message used when a transport failure carries no message.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing.";

/// One of the two image inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    /// Left-hand image, sent as `image1`.
    First,
    /// Right-hand image, sent as `image2`.
    Second,
}

impl ImageSlot {
    /// Both slots in submission order.
    pub const ALL: [ImageSlot; 2] = [ImageSlot::First, ImageSlot::Second];

    /// Multipart field name carrying this slot's file.
    pub fn field_name(self) -> &'static str {
        match self {
            ImageSlot::First => "image1",
            ImageSlot::Second => "image2",
        }
    }

    /// 1-based slot number used in element identifiers.
    pub fn index(self) -> u8 {
        match self {
            ImageSlot::First => 1,
            ImageSlot::Second => 2,
        }
    }
}

/// Raw JSON body returned by `/compare`.
///
/// Every field is optional on the wire; [`parse_success_body`] enforces which
/// ones a success must carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareResponseBody {
    /// Human-readable verdict.
    #[serde(default)]
    pub result: Option<String>,
    /// MD5 digest of the first upload.
    #[serde(default)]
    pub hash1: Option<String>,
    /// MD5 digest of the second upload.
    #[serde(default)]
    pub hash2: Option<String>,
    /// Structural similarity index.
    #[serde(default)]
    pub ssim_index: Option<f64>,
    /// Matched ORB keypoint count.
    #[serde(default)]
    pub orb_matches: Option<f64>,
    /// Server-signaled failure message.
    #[serde(default)]
    pub error: Option<String>,
}

/// Successful comparison payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    /// Verdict text exactly as the service sent it.
    pub verdict: String,
    /// MD5 digest of the first upload.
    pub hash1: String,
    /// MD5 digest of the second upload.
    pub hash2: String,
    /// Structural similarity index, when the service computed one.
    pub ssim_index: Option<f64>,
    /// Matched ORB keypoint count, when the service computed one.
    pub orb_matches: Option<f64>,
}

impl ComparisonReport {
    /// Returns `true` when the verdict text is exactly [`IDENTICAL_VERDICT`].
    pub fn is_identical(&self) -> bool {
        self.verdict == IDENTICAL_VERDICT
    }
}

/// Normalized result of one comparison attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOutcome {
    /// The service produced a verdict.
    Success(ComparisonReport),
    /// Validation, transport, or server-side failure.
    Failure {
        /// User-facing failure text.
        message: String,
    },
}

impl ComparisonOutcome {
    /// Builds a failure outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Returns `true` for [`ComparisonOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Returns `true` for 2xx statuses.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Parses a 2xx response body into a report.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON.
/// Returns [`ContractError::ServerSignaled`] when the body carries a non-empty
/// `error` field.
/// Returns [`ContractError::InvalidContract`] when `result`, `hash1`, or
/// `hash2` is missing.
pub fn parse_success_body(raw: &str) -> Result<ComparisonReport, ContractError> {
    let body: CompareResponseBody = serde_json::from_str(raw)?;

    if let Some(message) = body.error.filter(|message| !message.is_empty()) {
        return Err(ContractError::ServerSignaled(message));
    }

    let verdict = body
        .result
        .ok_or_else(|| ContractError::InvalidContract("result is missing".to_string()))?;
    let hash1 = body
        .hash1
        .ok_or_else(|| ContractError::InvalidContract("hash1 is missing".to_string()))?;
    let hash2 = body
        .hash2
        .ok_or_else(|| ContractError::InvalidContract("hash2 is missing".to_string()))?;

    Ok(ComparisonReport {
        verdict,
        hash1,
        hash2,
        ssim_index: body.ssim_index,
        orb_matches: body.orb_matches,
    })
}

/// Extracts the failure message from a non-2xx response body.
///
/// Falls back to [`UNKNOWN_SERVER_ERROR`] when the body is not JSON or the
/// `error` field is absent or empty.
pub fn parse_error_body(raw: &str) -> String {
    serde_json::from_str::<CompareResponseBody>(raw)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string())
}

/// Folds an HTTP status and body into a [`ComparisonOutcome`].
pub fn interpret_response(status: u16, body: &str) -> ComparisonOutcome {
    if !is_success_status(status) {
        return ComparisonOutcome::failure(parse_error_body(body));
    }

    match parse_success_body(body) {
        Ok(report) => ComparisonOutcome::Success(report),
        Err(ContractError::ServerSignaled(message)) => ComparisonOutcome::failure(message),
        Err(error) => ComparisonOutcome::failure(error.to_string()),
    }
}

/// Response contract errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Body is not valid JSON for the contract.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
    /// Service reported a logical failure despite a 2xx status.
    #[error("{0}")]
    ServerSignaled(String),
    /// Body is JSON but lacks mandatory success fields.
    #[error("malformed comparison response: {0}")]
    InvalidContract(String),
}
