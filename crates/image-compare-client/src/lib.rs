#![warn(missing_docs)]
//! # image-compare-client
//!
//! ## Purpose
//! Builds comparison requests from the two image selections and sends them to
//! the comparison service.
//!
//! ## Responsibilities
//! - Hold the two-slot image selection and validate it before any network use.
//! - Apply the optional upload policy (file types, combined size).
//! - Validate the configured `/compare` endpoint.
//! - Execute the multipart POST through an injectable transport.
//! - Normalize transport and server failures into a single outcome.
//!
//! ## Data flow
//! File inputs -> [`ImageSelection`] -> [`ImageSelection::into_request`] ->
//! [`ComparisonClient::compare`] via [`ComparisonTransport`] ->
//! [`ComparisonOutcome`].
//!
//! ## Ownership and lifetimes
//! Requests own their file handles. Browser handles are reference-counted JS
//! objects, so moving them into a request never copies image bytes.
//!
//! ## Error model
//! Local validation failures are [`ValidationError`]. Transport failures are
//! [`TransportError`] values that [`ComparisonClient::compare`] folds into
//! [`ComparisonOutcome::Failure`]; `compare` itself never fails.
//!
//! ## Example
//! ```rust
//! use image_compare_client::{ImageSelection, InMemoryImage, SelectionPolicy};
//! use image_compare_contract::ImageSlot;
//!
//! let mut selection = ImageSelection::new();
//! selection.set(ImageSlot::First, Some(InMemoryImage::new("a.png", vec![1, 2, 3])));
//! assert!(!selection.is_complete());
//! assert!(selection.into_request(&SelectionPolicy::permissive()).is_err());
//! ```

use std::future::Future;

use image_compare_contract::{
    ComparisonOutcome, GENERIC_FAILURE_MESSAGE, ImageSlot, interpret_response,
};
use thiserror::Error;
use url::Url;

/// Required endpoint path suffix.
pub const REQUIRED_COMPARE_PATH: &str = "/compare";

/// Default endpoint, relative to the page origin.
pub const DEFAULT_COMPARE_ENDPOINT: &str = "/compare";

/// Extensions the comparison service accepts.
pub const SERVER_ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Combined upload limit enforced by the comparison service.
pub const SERVER_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// A user-selected image file.
pub trait ImageSource {
    /// File name as reported by the picker.
    fn file_name(&self) -> String;

    /// File size in bytes.
    fn byte_len(&self) -> u64;
}

/// Owned image bytes with a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryImage {
    /// File name including extension.
    pub name: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl InMemoryImage {
    /// Creates an in-memory image.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl ImageSource for InMemoryImage {
    fn file_name(&self) -> String {
        self.name.clone()
    }

    fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Client-side upload rules applied while building a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionPolicy {
    /// Lowercase extensions to accept; `None` accepts any file.
    pub allowed_extensions: Option<Vec<String>>,
    /// Combined size limit for both files; `None` disables the check.
    pub max_total_bytes: Option<u64>,
}

impl SelectionPolicy {
    /// Only requires both slots to be populated.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Mirrors the comparison service's own upload rules.
    pub fn server_defaults() -> Self {
        Self {
            allowed_extensions: Some(
                SERVER_ALLOWED_EXTENSIONS
                    .iter()
                    .map(|extension| extension.to_string())
                    .collect(),
            ),
            max_total_bytes: Some(SERVER_MAX_UPLOAD_BYTES),
        }
    }

    fn accepts_name(&self, file_name: &str) -> bool {
        let Some(allowed) = &self.allowed_extensions else {
            return true;
        };

        match file_name.rsplit_once('.') {
            Some((_, extension)) => {
                let extension = extension.to_ascii_lowercase();
                allowed.iter().any(|candidate| *candidate == extension)
            }
            None => false,
        }
    }
}

/// The pair of user-chosen files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection<F> {
    first: Option<F>,
    second: Option<F>,
}

impl<F> Default for ImageSelection<F> {
    fn default() -> Self {
        Self {
            first: None,
            second: None,
        }
    }
}

impl<F: ImageSource> ImageSelection<F> {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a selection from both slots at once.
    pub fn from_slots(first: Option<F>, second: Option<F>) -> Self {
        Self { first, second }
    }

    /// Replaces one slot; `None` clears it.
    pub fn set(&mut self, slot: ImageSlot, file: Option<F>) {
        match slot {
            ImageSlot::First => self.first = file,
            ImageSlot::Second => self.second = file,
        }
    }

    /// Returns the file in one slot.
    pub fn get(&self, slot: ImageSlot) -> Option<&F> {
        match slot {
            ImageSlot::First => self.first.as_ref(),
            ImageSlot::Second => self.second.as_ref(),
        }
    }

    /// Returns `true` when both slots hold a file.
    pub fn is_complete(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    /// Validates the selection and turns it into a request.
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingSelection`] when either slot is empty.
    /// Returns [`ValidationError::UnsupportedType`] or
    /// [`ValidationError::PayloadTooLarge`] when `policy` rejects the files.
    pub fn into_request(
        self,
        policy: &SelectionPolicy,
    ) -> Result<ComparisonRequest<F>, ValidationError> {
        let (Some(first), Some(second)) = (self.first, self.second) else {
            return Err(ValidationError::MissingSelection);
        };

        for (slot, file) in [(ImageSlot::First, &first), (ImageSlot::Second, &second)] {
            let file_name = file.file_name();
            if !policy.accepts_name(&file_name) {
                return Err(ValidationError::UnsupportedType { slot, file_name });
            }
        }

        if let Some(limit) = policy.max_total_bytes {
            let total = first.byte_len().saturating_add(second.byte_len());
            if total > limit {
                return Err(ValidationError::PayloadTooLarge { total, limit });
            }
        }

        Ok(ComparisonRequest { first, second })
    }
}

/// Multipart payload with exactly two image parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRequest<F> {
    first: F,
    second: F,
}

impl<F: ImageSource> ComparisonRequest<F> {
    /// Returns `(field_name, file)` pairs in slot order.
    pub fn parts(&self) -> [(&'static str, &F); 2] {
        [
            (ImageSlot::First.field_name(), &self.first),
            (ImageSlot::Second.field_name(), &self.second),
        ]
    }

    /// Combined size of both parts in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.first.byte_len().saturating_add(self.second.byte_len())
    }
}

/// Status and body of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// Abstract transport performing the multipart POST.
///
/// Implementations run on the single UI thread, so the returned future is not
/// required to be `Send`.
pub trait ComparisonTransport {
    /// File handle type carried in requests.
    type File: ImageSource;

    /// Posts `request` as `multipart/form-data` to `endpoint`.
    fn post_multipart(
        &self,
        endpoint: &str,
        request: &ComparisonRequest<Self::File>,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>>;
}

/// Comparison client bound to one validated endpoint.
#[derive(Debug, Clone)]
pub struct ComparisonClient<T> {
    endpoint: String,
    transport: T,
}

impl<T: ComparisonTransport> ComparisonClient<T> {
    /// Creates a client for a validated endpoint.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidEndpoint`] when [`validate_compare_endpoint`]
    /// rejects `endpoint`.
    pub fn new(endpoint: impl Into<String>, transport: T) -> Result<Self, ClientError> {
        let endpoint = endpoint.into();
        validate_compare_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Sends one comparison and normalizes the result.
    ///
    /// This is the only suspension point of a submission.
    pub async fn compare(&self, request: &ComparisonRequest<T::File>) -> ComparisonOutcome {
        log::info!(
            "comparison | dispatch | endpoint={} bytes={}",
            self.endpoint,
            request.total_bytes()
        );

        match self.transport.post_multipart(&self.endpoint, request).await {
            Ok(response) => {
                log::info!("comparison | response | status={}", response.status);
                let outcome = interpret_response(response.status, &response.body);
                if let ComparisonOutcome::Failure { message } = &outcome {
                    log::warn!("comparison | failed | {message}");
                }
                outcome
            }
            Err(error) => {
                log::error!("comparison | transport_error | {error}");
                ComparisonOutcome::failure(error.user_message())
            }
        }
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// Validates a comparison endpoint.
///
/// Relative paths must start with a single `/`; absolute URLs must use
/// `http` or `https`. The path must end with [`REQUIRED_COMPARE_PATH`] and
/// carry no query or fragment.
///
/// # Errors
/// Returns [`ClientError::InvalidEndpoint`] describing the first violation.
pub fn validate_compare_endpoint(endpoint: &str) -> Result<(), ClientError> {
    let parsed = if endpoint.starts_with('/') && !endpoint.starts_with("//") {
        let base = Url::parse("http://origin.invalid/")
            .map_err(|error| ClientError::InvalidEndpoint(error.to_string()))?;
        base.join(endpoint)
    } else {
        Url::parse(endpoint)
    }
    .map_err(|error| ClientError::InvalidEndpoint(format!("invalid compare url: {error}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ClientError::InvalidEndpoint(
            "compare endpoint must use http or https".to_string(),
        ));
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ClientError::InvalidEndpoint(
            "compare endpoint must not carry a query or fragment".to_string(),
        ));
    }

    if !parsed.path().ends_with(REQUIRED_COMPARE_PATH) {
        return Err(ClientError::InvalidEndpoint(format!(
            "compare endpoint path must end with {REQUIRED_COMPARE_PATH}"
        )));
    }

    Ok(())
}

/// Locally detected selection problems. Never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or both slots are empty.
    #[error("Please select both images.")]
    MissingSelection,
    /// A file's extension is outside the policy's allow-list.
    #[error("Invalid file type.")]
    UnsupportedType {
        /// Offending slot.
        slot: ImageSlot,
        /// Offending file name.
        file_name: String,
    },
    /// Both files together exceed the policy's size limit.
    #[error("Selected images exceed the {} MB upload limit.", .limit / (1024 * 1024))]
    PayloadTooLarge {
        /// Combined size in bytes.
        total: u64,
        /// Configured limit in bytes.
        limit: u64,
    },
}

/// Network-level failures raised by a [`ComparisonTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection, DNS, CORS, or body-read failure.
    #[error("{0}")]
    Network(String),
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,
    /// No transport is available in this environment.
    #[error("comparison service unavailable")]
    Unavailable,
}

impl TransportError {
    /// Message shown to the user, never blank.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

/// Client construction errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Endpoint violates the compare contract.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for endpoint policy and selection rules.

    use super::*;

    #[test]
    fn validates_expected_endpoint_policy() {
        validate_compare_endpoint("/compare").expect("relative endpoint should pass");
        validate_compare_endpoint("http://localhost:5000/compare")
            .expect("absolute endpoint should pass");
        assert!(validate_compare_endpoint("/upload").is_err());
        assert!(validate_compare_endpoint("ftp://host/compare").is_err());
        assert!(validate_compare_endpoint("/compare?debug=1").is_err());
        assert!(validate_compare_endpoint("//cdn.example/compare").is_err());
    }

    #[test]
    fn blank_network_error_uses_generic_message() {
        assert_eq!(
            TransportError::Network(String::new()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            TransportError::Network("connection refused".to_string()).user_message(),
            "connection refused"
        );
    }

    #[test]
    fn server_policy_matches_extensions_case_insensitively() {
        let policy = SelectionPolicy::server_defaults();
        assert!(policy.accepts_name("HOLIDAY.JPG"));
        assert!(!policy.accepts_name("notes.txt"));
        assert!(!policy.accepts_name("no-extension"));
        assert!(SelectionPolicy::permissive().accepts_name("no-extension"));
    }
}
