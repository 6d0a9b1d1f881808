//! Whole-model validation for the finite-element IR.
//!
//! [`checker::ModelChecker`] walks a finished [`meca_core::Model`] once and
//! collects every problem as a severity-tagged [`checker::Diagnostic`];
//! [`report::ValidationReport`] summarizes them and tells emitters which
//! analyses must be skipped. Nothing in the model is repaired.

pub mod checker;
pub mod report;

pub use checker::{Diagnostic, ModelChecker, Severity};
pub use report::{ReportSummary, ValidationReport};

/// Errors raised while exporting a validation report.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
