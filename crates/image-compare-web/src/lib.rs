#![warn(missing_docs)]
//! # image-compare-web
//!
//! ## Purpose
//! Orchestrates image selection, previews, submission, and result rendering
//! for the image comparison page.
//!
//! ## Responsibilities
//! - Resolve runtime configuration (endpoint, upload policy, element ids).
//! - Run the submission workflow: validate, lock the submit control, compare,
//!   render, unlock.
//! - Read selected files into previews without blocking the UI loop.
//! - Bind the workflow to the browser DOM on `wasm32` targets.
//!
//! ## Data flow
//! `change` event -> [`PreviewController`] -> preview surface.
//! `submit` event -> [`SubmissionController`] -> comparison client ->
//! [`image_compare_ui::render_outcome`] -> result surface.
//!
//! ## Ownership and lifetimes
//! Controllers own their client, reader, and surfaces; DOM handles are
//! resolved once at startup and injected, never looked up per event.
//!
//! ## Error model
//! Configuration problems are [`ConfigError`]. Every submission error is
//! converted to a rendered failure; [`SubmissionController::submit`] reports
//! what happened through [`SubmitDisposition`] instead of `Result`.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::str::FromStr;

use image_compare_client::{
    ClientError, ComparisonClient, ComparisonTransport, DEFAULT_COMPARE_ENDPOINT, ImageSelection,
    ImageSource, SelectionPolicy, ValidationError, validate_compare_endpoint,
};
use image_compare_contract::{ComparisonOutcome, ImageSlot};
use image_compare_ui::{
    MetricsUpdate, PhaseState, PreviewSurface, ResultSurface, SubmissionPhase, render_loading,
    render_outcome,
};
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod browser;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("IMAGE_COMPARE_VERSION");

/// Notice shown in a slot whose file could not be read for preview.
pub const PREVIEW_UNAVAILABLE_NOTICE: &str = "Preview unavailable";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Stable DOM identifiers the page must provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    /// Upload form.
    pub form: String,
    /// Submit control.
    pub submit: String,
    /// Result text area.
    pub result: String,
    /// Metrics display area.
    pub metrics: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            form: "upload-form".to_string(),
            submit: "submit-button".to_string(),
            result: "result".to_string(),
            metrics: "metrics".to_string(),
        }
    }
}

impl ElementIds {
    /// File input for `slot`.
    pub fn input(&self, slot: ImageSlot) -> String {
        format!("image{}", slot.index())
    }

    /// Preview image for `slot`.
    pub fn preview(&self, slot: ImageSlot) -> String {
        format!("preview{}", slot.index())
    }

    /// Placeholder icon for `slot`.
    pub fn placeholder_icon(&self, slot: ImageSlot) -> String {
        format!("plus-icon{}", slot.index())
    }

    /// Placeholder text for `slot`.
    pub fn placeholder_text(&self, slot: ImageSlot) -> String {
        format!("text{}", slot.index())
    }
}

/// Named upload policies selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPolicy {
    /// Only both slots are required.
    #[default]
    Permissive,
    /// Mirror the service's type and size rules before sending.
    Server,
}

impl UploadPolicy {
    /// Selection rules for this policy.
    pub fn selection_policy(self) -> SelectionPolicy {
        match self {
            UploadPolicy::Permissive => SelectionPolicy::permissive(),
            UploadPolicy::Server => SelectionPolicy::server_defaults(),
        }
    }

    /// Configuration name.
    pub fn name(self) -> &'static str {
        match self {
            UploadPolicy::Permissive => "permissive",
            UploadPolicy::Server => "server",
        }
    }
}

impl FromStr for UploadPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "permissive" => Ok(UploadPolicy::Permissive),
            "server" => Ok(UploadPolicy::Server),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Comparison endpoint, absolute or relative to the page.
    pub endpoint: String,
    /// Client-side upload policy.
    pub upload_policy: UploadPolicy,
    /// DOM identifiers.
    pub ids: ElementIds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_COMPARE_ENDPOINT.to_string(),
            upload_policy: UploadPolicy::default(),
            ids: ElementIds::default(),
        }
    }
}

impl AppConfig {
    /// Builds configuration from a key lookup.
    ///
    /// Keys are `endpoint` and `upload-policy`; missing keys keep defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEndpoint`] for an endpoint the client
    /// would reject and [`ConfigError::UnknownPolicy`] for an unknown policy.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("endpoint").filter(|value| !value.trim().is_empty()) {
            let endpoint = endpoint.trim().to_string();
            validate_compare_endpoint(&endpoint)?;
            config.endpoint = endpoint;
        }

        if let Some(policy) = lookup("upload-policy") {
            config.upload_policy = policy.parse()?;
        }

        Ok(config)
    }
}

/// Reads configuration from `IMAGE_COMPARE_*` environment variables.
///
/// `endpoint` maps to `IMAGE_COMPARE_ENDPOINT`, `upload-policy` to
/// `IMAGE_COMPARE_UPLOAD_POLICY`.
///
/// # Errors
/// Same as [`AppConfig::from_lookup`].
pub fn config_from_env() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| {
        let name = format!(
            "IMAGE_COMPARE_{}",
            key.replace('-', "_").to_ascii_uppercase()
        );
        std::env::var(name).ok()
    })
}

/// What a submit event resulted in.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitDisposition {
    /// Selection failed validation; nothing was sent.
    Invalid(ValidationError),
    /// The comparison ran and this outcome was rendered.
    Completed(ComparisonOutcome),
    /// A comparison was already in flight; the event was ignored.
    Busy,
}

/// Drives one submission at a time from submit event to rendered outcome.
pub struct SubmissionController<T, S> {
    client: ComparisonClient<T>,
    surface: S,
    policy: SelectionPolicy,
    phase: RefCell<SubmissionPhase>,
}

impl<T, S> SubmissionController<T, S>
where
    T: ComparisonTransport,
    S: ResultSurface,
{
    /// Creates a controller writing to `surface`.
    pub fn new(client: ComparisonClient<T>, surface: S, policy: SelectionPolicy) -> Self {
        Self {
            client,
            surface,
            policy,
            phase: RefCell::new(SubmissionPhase::new()),
        }
    }

    /// Handles one submit event for the current selection.
    ///
    /// The submit control stays disabled from dispatch until the outcome is
    /// rendered and is re-enabled exactly once, even if the comparison panics.
    pub async fn submit(&self, selection: ImageSelection<T::File>) -> SubmitDisposition {
        if !self.phase.borrow().submit_enabled() {
            log::warn!("submission | ignored | comparison already in flight");
            return SubmitDisposition::Busy;
        }

        let request = match selection.into_request(&self.policy) {
            Ok(request) => request,
            Err(error) => {
                log::warn!("submission | invalid | {error}");
                self.phase.borrow_mut().reject();
                self.surface
                    .apply_plan(&render_outcome(&ComparisonOutcome::failure(error.to_string())));
                return SubmitDisposition::Invalid(error);
            }
        };

        if let Err(error) = self.phase.borrow_mut().begin() {
            log::warn!("submission | ignored | {error}");
            return SubmitDisposition::Busy;
        }

        let lock = SubmitLock::engage(&self.surface, &self.phase);
        self.surface.show_result(&render_loading());
        self.surface.apply_metrics(&MetricsUpdate::Clear);

        let outcome = self.client.compare(&request).await;

        self.surface.apply_plan(&render_outcome(&outcome));
        self.phase.borrow_mut().complete(outcome.clone());
        drop(lock);

        log::info!("submission | completed | success={}", outcome.is_success());
        SubmitDisposition::Completed(outcome)
    }

    /// Returns the current phase.
    pub fn phase(&self) -> PhaseState {
        self.phase.borrow().state().clone()
    }

    /// Returns the result surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Returns the comparison client.
    pub fn client(&self) -> &ComparisonClient<T> {
        &self.client
    }
}

/// Keeps the submit control disabled while alive.
struct SubmitLock<'a, S: ResultSurface> {
    surface: &'a S,
    phase: &'a RefCell<SubmissionPhase>,
}

impl<'a, S: ResultSurface> SubmitLock<'a, S> {
    fn engage(surface: &'a S, phase: &'a RefCell<SubmissionPhase>) -> Self {
        surface.set_submit_enabled(false);
        Self { surface, phase }
    }
}

impl<S: ResultSurface> Drop for SubmitLock<'_, S> {
    fn drop(&mut self) {
        if let Ok(mut phase) = self.phase.try_borrow_mut() {
            phase.abandon();
        }
        self.surface.set_submit_enabled(true);
    }
}

/// Asynchronous file-to-data-URL reader used for previews.
pub trait PreviewReader {
    /// File handle type.
    type File: ImageSource;

    /// Reads `file` into a `data:` URL.
    fn read_data_url(
        &self,
        file: &Self::File,
    ) -> impl Future<Output = Result<String, PreviewError>>;
}

/// Result of handling one file-input change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewUpdate {
    /// The new file is previewed.
    Shown,
    /// The input was cleared; the previous preview is left in place.
    SelectionCleared,
    /// The file could not be read; the placeholder shows a notice.
    Unavailable(String),
    /// A later change on the same slot replaced this read; nothing was shown.
    Superseded,
}

/// Keeps each slot's preview in step with its file input.
///
/// Each change bumps the slot's generation; a read that finishes after a newer
/// change on the same slot is dropped.
pub struct PreviewController<R, S> {
    reader: R,
    surface: S,
    generations: [Cell<u64>; 2],
}

impl<R, S> PreviewController<R, S>
where
    R: PreviewReader,
    S: PreviewSurface,
{
    /// Creates a controller writing to `surface`.
    pub fn new(reader: R, surface: S) -> Self {
        Self {
            reader,
            surface,
            generations: [Cell::new(0), Cell::new(0)],
        }
    }

    fn generation(&self, slot: ImageSlot) -> &Cell<u64> {
        match slot {
            ImageSlot::First => &self.generations[0],
            ImageSlot::Second => &self.generations[1],
        }
    }

    /// Handles a change event on `slot`'s input.
    pub async fn on_selection_change(
        &self,
        slot: ImageSlot,
        file: Option<&R::File>,
    ) -> PreviewUpdate {
        let generation = self.generation(slot).get() + 1;
        self.generation(slot).set(generation);

        let Some(file) = file else {
            log::warn!("preview | cleared | slot={} has no file", slot.index());
            return PreviewUpdate::SelectionCleared;
        };

        log::debug!(
            "preview | read | slot={} name={} bytes={}",
            slot.index(),
            file.file_name(),
            file.byte_len()
        );

        let read = self.reader.read_data_url(file).await;
        if self.generation(slot).get() != generation {
            log::debug!("preview | superseded | slot={}", slot.index());
            return PreviewUpdate::Superseded;
        }

        match read {
            Ok(data_url) => {
                self.surface.show_preview(slot, &data_url);
                PreviewUpdate::Shown
            }
            Err(error) => {
                log::warn!("preview | unavailable | slot={} {error}", slot.index());
                self.surface.clear_preview(slot);
                self.surface.show_preview_notice(slot, PREVIEW_UNAVAILABLE_NOTICE);
                PreviewUpdate::Unavailable(error.to_string())
            }
        }
    }
}

/// Preview read failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    /// The browser could not read the file.
    #[error("file could not be read: {0}")]
    Read(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Endpoint rejected by the compare contract.
    #[error("config error: {0}")]
    InvalidEndpoint(#[from] ClientError),
    /// Unrecognized upload policy name.
    #[error("unknown upload policy: {0}")]
    UnknownPolicy(String),
}
