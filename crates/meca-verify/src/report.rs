//! Validation report with summary statistics and diagnostics.

use std::fmt;

use serde::Serialize;
use tracing::info;

use meca_core::entity::analysis::Analysis;
use meca_core::reference::{Identifiable, Reference};
use meca_core::Model;

use crate::checker::{Diagnostic, ModelChecker, Severity};
use crate::VerifyError;

/// Summary statistics for a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub analyses: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

/// The complete validation report of one model.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub model: String,
    pub summary: ReportSummary,
    pub diagnostics: Vec<Diagnostic>,
    /// Analyses an emitter must skip, in declaration order.
    pub invalid_analyses: Vec<Reference<Analysis>>,
}

impl ValidationReport {
    /// Run the checker over `model` and summarize the result.
    pub fn build(model: &Model) -> Self {
        let diagnostics = ModelChecker::analyze(model);

        let mut invalid_analyses = Vec::new();
        for analysis in model.analyses() {
            let current = analysis.reference();
            let invalidated = diagnostics
                .iter()
                .any(|d| d.severity != Severity::Info && d.analysis == Some(current));
            if invalidated {
                invalid_analyses.push(current);
            }
        }

        let count = |severity| diagnostics.iter().filter(|d| d.severity == severity).count();
        let analyses = model.analyses().count();
        let summary = ReportSummary {
            analyses,
            valid: analyses - invalid_analyses.len(),
            invalid: invalid_analyses.len(),
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            infos: count(Severity::Info),
        };
        info!(
            model = %model.name,
            analyses = summary.analyses,
            invalid = summary.invalid,
            errors = summary.errors,
            warnings = summary.warnings,
            "model validated"
        );

        Self {
            model: model.name.clone(),
            summary,
            diagnostics,
            invalid_analyses,
        }
    }

    pub fn is_valid(&self, analysis: &Reference<Analysis>) -> bool {
        !self.invalid_analyses.contains(analysis)
    }

    /// True when any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Analyses that an emitter may translate.
    pub fn valid_analyses<'m>(&'m self, model: &'m Model) -> impl Iterator<Item = &'m Analysis> + 'm {
        model
            .analyses()
            .filter(move |analysis| self.is_valid(&analysis.reference()))
    }

    pub fn to_json(&self) -> Result<String, VerifyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Validation Report ({}) ===", self.model)?;
        writeln!(
            f,
            "Analyses: {} | Valid: {} | Invalid: {} | Errors: {} | Warnings: {} | Infos: {}",
            self.summary.analyses,
            self.summary.valid,
            self.summary.invalid,
            self.summary.errors,
            self.summary.warnings,
            self.summary.infos,
        )?;

        if self.diagnostics.is_empty() {
            writeln!(f, "No diagnostics.")?;
        } else {
            writeln!(f, "--- Diagnostics ---")?;
            for diag in &self.diagnostics {
                writeln!(f, "[{}] {}: {}", diag.severity, diag.context, diag.message)?;
                if let Some(ref s) = diag.suggestion {
                    writeln!(f, "  Suggestion: {s}")?;
                }
            }
        }
        for analysis in &self.invalid_analyses {
            writeln!(f, "Skipped: {analysis}")?;
        }
        Ok(())
    }
}
