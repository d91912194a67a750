#![warn(missing_docs)]
//! # image-compare-ui
//!
//! ## Purpose
//! Defines the UI-facing state model and result projection for the image
//! comparison page.
//!
//! ## Responsibilities
//! - Project a [`ComparisonOutcome`] into result text, a visual
//!   classification, and a metrics panel.
//! - Track the submission phase and gate the submit control.
//! - Declare the surfaces (result area, previews) the controllers write to.
//!
//! ## Data flow
//! Controller events drive [`SubmissionPhase`]; outcomes pass through
//! [`render_outcome`] and the resulting [`RenderPlan`] is applied to a
//! [`ResultSurface`].
//!
//! ## Ownership and lifetimes
//! Rendered values own their strings so surfaces can keep them after the
//! outcome is dropped.
//!
//! ## Error model
//! Rendering is infallible. Illegal phase transitions return [`PhaseError`].

use image_compare_contract::{ComparisonOutcome, ComparisonReport, ImageSlot};
use thiserror::Error;

/// Status text shown while a comparison is in flight.
pub const LOADING_TEXT: &str = "Comparing images...";

/// Placeholder for metrics the service did not report.
pub const MISSING_METRIC: &str = "N/A";

/// Visual classification of the result area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Verdict says the images are identical.
    Success,
    /// Any other verdict.
    Mismatch,
    /// Validation, transport, or server failure.
    Error,
    /// Comparison in flight.
    Loading,
}

impl Classification {
    /// Class attribute applied to the result element.
    pub fn css_class(self) -> &'static str {
        match self {
            Classification::Success => "message success",
            Classification::Mismatch => "message mismatch",
            Classification::Error => "message error",
            Classification::Loading => "message loading",
        }
    }
}

/// Text plus classification for the result area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResult {
    /// Text content.
    pub text: String,
    /// Visual classification.
    pub classification: Classification,
}

/// One labelled metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    /// Row label.
    pub label: &'static str,
    /// Display value.
    pub value: String,
}

/// Expanded metrics for a successful comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsPanel {
    /// Rows in display order.
    pub rows: Vec<MetricRow>,
}

impl MetricsPanel {
    /// Builds the panel for one report.
    pub fn from_report(report: &ComparisonReport) -> Self {
        let ssim = report
            .ssim_index
            .map(|value| value.to_string())
            .unwrap_or_else(|| MISSING_METRIC.to_string());
        let orb = report
            .orb_matches
            .map(|value| value.to_string())
            .unwrap_or_else(|| MISSING_METRIC.to_string());

        Self {
            rows: vec![
                MetricRow {
                    label: "MD5 Hash 1",
                    value: report.hash1.clone(),
                },
                MetricRow {
                    label: "MD5 Hash 2",
                    value: report.hash2.clone(),
                },
                MetricRow {
                    label: "SSIM Index",
                    value: ssim,
                },
                MetricRow {
                    label: "ORB Matches",
                    value: orb,
                },
            ],
        }
    }

    /// Looks up a row value by label.
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

/// What to do with the metrics area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsUpdate {
    /// Replace the panel contents.
    Show(MetricsPanel),
    /// Empty the panel.
    Clear,
}

/// Full projection of one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    /// Result area content.
    pub result: RenderedResult,
    /// Metrics area change.
    pub metrics: MetricsUpdate,
}

/// Projects an outcome for display.
///
/// Success is classified by exact verdict text, not by a flag. Failures clear
/// the metrics panel so a stale report never sits beside an error.
pub fn render_outcome(outcome: &ComparisonOutcome) -> RenderPlan {
    match outcome {
        ComparisonOutcome::Success(report) => RenderPlan {
            result: RenderedResult {
                text: report.verdict.clone(),
                classification: if report.is_identical() {
                    Classification::Success
                } else {
                    Classification::Mismatch
                },
            },
            metrics: MetricsUpdate::Show(MetricsPanel::from_report(report)),
        },
        ComparisonOutcome::Failure { message } => RenderPlan {
            result: render_message_as_error(message),
            metrics: MetricsUpdate::Clear,
        },
    }
}

/// Result shown while the request is in flight.
pub fn render_loading() -> RenderedResult {
    RenderedResult {
        text: LOADING_TEXT.to_string(),
        classification: Classification::Loading,
    }
}

/// Error-classified result for an arbitrary message.
pub fn render_message_as_error(message: &str) -> RenderedResult {
    RenderedResult {
        text: message.to_string(),
        classification: Classification::Error,
    }
}

/// Result area, metrics area, and submit control.
///
/// Methods take `&self`: DOM handles mutate through shared references.
pub trait ResultSurface {
    /// Replaces the result text and classification.
    fn show_result(&self, result: &RenderedResult);

    /// Replaces or empties the metrics area.
    fn apply_metrics(&self, update: &MetricsUpdate);

    /// Enables or disables the submit control.
    fn set_submit_enabled(&self, enabled: bool);

    /// Applies a full render plan.
    fn apply_plan(&self, plan: &RenderPlan) {
        self.show_result(&plan.result);
        self.apply_metrics(&plan.metrics);
    }
}

/// Per-slot preview image and placeholder.
pub trait PreviewSurface {
    /// Shows `data_url` in the slot's preview and hides its placeholder.
    fn show_preview(&self, slot: ImageSlot, data_url: &str);

    /// Hides the slot's preview image so nothing stale stays on screen.
    fn clear_preview(&self, slot: ImageSlot);

    /// Leaves the placeholder visible with a non-fatal notice.
    fn show_preview_notice(&self, slot: ImageSlot, notice: &str);
}

/// Submission lifecycle states.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseState {
    /// Nothing submitted yet, or the last attempt failed validation.
    Idle,
    /// A request is in flight.
    Submitting,
    /// The last request resolved with this outcome.
    Displayed(ComparisonOutcome),
}

/// Submission state machine with explicit legal transitions.
#[derive(Debug, Clone)]
pub struct SubmissionPhase {
    state: PhaseState,
}

impl SubmissionPhase {
    /// Creates a machine in `Idle`.
    pub fn new() -> Self {
        Self {
            state: PhaseState::Idle,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &PhaseState {
        &self.state
    }

    /// Enters `Submitting`.
    ///
    /// # Errors
    /// Returns [`PhaseError::Busy`] when a request is already in flight.
    pub fn begin(&mut self) -> Result<(), PhaseError> {
        if self.state == PhaseState::Submitting {
            return Err(PhaseError::Busy);
        }
        self.state = PhaseState::Submitting;
        Ok(())
    }

    /// Records the resolved outcome.
    pub fn complete(&mut self, outcome: ComparisonOutcome) {
        self.state = PhaseState::Displayed(outcome);
    }

    /// Returns to `Idle` after a selection failed validation.
    ///
    /// Ignored while a request is in flight.
    pub fn reject(&mut self) {
        if self.state != PhaseState::Submitting {
            self.state = PhaseState::Idle;
        }
    }

    /// Returns to `Idle` after an interrupted submission.
    ///
    /// Has no effect once an outcome is displayed.
    pub fn abandon(&mut self) {
        if self.state == PhaseState::Submitting {
            self.state = PhaseState::Idle;
        }
    }

    /// Returns `true` when the submit control may be enabled.
    pub fn submit_enabled(&self) -> bool {
        self.state != PhaseState::Submitting
    }
}

impl Default for SubmissionPhase {
    fn default() -> Self {
        Self::new()
    }
}

/// Illegal phase transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhaseError {
    /// A submission is already in flight.
    #[error("a comparison is already in progress")]
    Busy,
}

#[cfg(test)]
mod tests {
    //! Unit tests for phase gates.

    use super::*;

    #[test]
    fn submit_gate_closes_only_while_submitting() {
        let mut phase = SubmissionPhase::new();
        assert!(phase.submit_enabled());

        phase.begin().expect("idle phase should accept submission");
        assert!(!phase.submit_enabled());
        assert_eq!(phase.begin(), Err(PhaseError::Busy));

        phase.complete(ComparisonOutcome::failure("boom"));
        assert!(phase.submit_enabled());
        phase.begin().expect("displayed phase should accept submission");
    }

    #[test]
    fn abandon_keeps_displayed_outcome() {
        let mut phase = SubmissionPhase::new();
        phase.complete(ComparisonOutcome::failure("kept"));
        phase.abandon();
        assert_eq!(
            phase.state(),
            &PhaseState::Displayed(ComparisonOutcome::failure("kept"))
        );
    }
}
