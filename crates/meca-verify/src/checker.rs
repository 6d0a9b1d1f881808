//! Model checking pass: gathers every validation problem in one walk.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use meca_core::entity::analysis::Analysis;
use meca_core::reference::{Identifiable, Reference};
use meca_core::{Model, ModelError};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// A problem found on one entity of the model.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// The entity the problem was found on.
    pub context: String,
    /// Analysis made invalid by this problem, if any.
    pub analysis: Option<Reference<Analysis>>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            context: context.into(),
            analysis: None,
            suggestion: None,
        }
    }

    fn from_error(error: &ModelError, context: impl Into<String>) -> Self {
        let severity = match error {
            ModelError::MissingReference { .. } | ModelError::UnsupportedFeature(_) => {
                Severity::Warning
            }
            _ => Severity::Error,
        };
        let mut diagnostic = Self::new(severity, error.to_string(), context);
        diagnostic.suggestion = suggest_for_error(error);
        diagnostic
    }

    fn invalidating(mut self, analysis: Reference<Analysis>) -> Self {
        self.analysis = Some(analysis);
        self
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

fn suggest_for_error(error: &ModelError) -> Option<String> {
    match error {
        ModelError::MissingReference { .. } => {
            Some("Define the referenced entity or remove the reference".into())
        }
        ModelError::NodeNotFound(_) => Some("Define the node in the mesh".into()),
        ModelError::InvalidNature(_) => Some("Assign at least one nature to the material".into()),
        _ => None,
    }
}

/// Whole-model checker.
pub struct ModelChecker;

impl ModelChecker {
    /// Check the registry, every entity and every analysis of `model`.
    ///
    /// Diagnostics come out grouped by entity family, analyses last and in
    /// declaration order.
    pub fn analyze(model: &Model) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let context = format!("model {}", model.name);
        for error in model.registry_errors() {
            diagnostics.push(Diagnostic::from_error(&error, context.as_str()));
        }

        Self::check_constraints(model, &mut diagnostics);
        Self::check_materials(model, &mut diagnostics);
        Self::check_element_sets(model, &mut diagnostics);
        for analysis in model.analyses() {
            Self::check_analysis(model, analysis, &mut diagnostics);
        }

        for diagnostic in &diagnostics {
            if diagnostic.severity != Severity::Info {
                warn!(
                    severity = %diagnostic.severity,
                    context = %diagnostic.context,
                    "{}",
                    diagnostic.message
                );
            }
        }
        diagnostics
    }

    fn check_constraints(model: &Model, diagnostics: &mut Vec<Diagnostic>) {
        for constraint in model.constraints() {
            let context = constraint.reference().to_string();
            if let Err(errors) = constraint.validate(model) {
                for error in &errors {
                    diagnostics.push(Diagnostic::from_error(error, context.as_str()));
                }
                continue;
            }
            match constraint.is_ineffective(model) {
                Ok(true) => diagnostics.push(Diagnostic::new(
                    Severity::Info,
                    format!("{} constraint has no participating node, not emitted", constraint.kind()),
                    context,
                )),
                Ok(false) => {}
                Err(error) => diagnostics.push(Diagnostic::from_error(&error, context)),
            }
        }
    }

    fn check_materials(model: &Model, diagnostics: &mut Vec<Diagnostic>) {
        for material in model.materials() {
            if let Err(error) = material.validate() {
                diagnostics.push(Diagnostic::from_error(&error, material.reference().to_string()));
            }
        }
    }

    fn check_element_sets(model: &Model, diagnostics: &mut Vec<Diagnostic>) {
        for element_set in model.element_sets() {
            if let Err(errors) = element_set.validate(model) {
                let context = element_set.reference().to_string();
                for error in &errors {
                    diagnostics.push(Diagnostic::from_error(error, context.as_str()));
                }
            }
        }
    }

    fn check_analysis(model: &Model, analysis: &Analysis, diagnostics: &mut Vec<Diagnostic>) {
        let current = analysis.reference();
        let context = if analysis.label.is_empty() {
            current.to_string()
        } else {
            format!("{current} ({})", analysis.label)
        };
        let required = analysis.required_references();

        for reference in analysis.constraint_set_references() {
            if model.find(reference).is_none() {
                diagnostics.push(
                    Diagnostic::new(
                        Severity::Warning,
                        format!("missing constraint set reference: {reference}"),
                        context.as_str(),
                    )
                    .invalidating(current),
                );
            }
        }
        for reference in analysis.load_set_references() {
            if model.find(reference).is_none() {
                diagnostics.push(
                    Diagnostic::new(
                        Severity::Warning,
                        format!("missing load set reference: {reference}"),
                        context.as_str(),
                    )
                    .invalidating(current),
                );
            }
        }
        for reference in analysis.objective_references() {
            let is_required = required.iter().any(|(_, held)| held == reference);
            if !is_required && model.find(reference).is_none() {
                diagnostics.push(
                    Diagnostic::new(
                        Severity::Warning,
                        format!("missing objective reference: {reference}"),
                        context.as_str(),
                    )
                    .invalidating(current),
                );
            }
        }
        for (role, reference) in &required {
            if model.find(reference).is_none() {
                diagnostics.push(
                    Diagnostic::new(
                        Severity::Error,
                        format!("{} analysis cannot find {role}: {reference}", analysis.kind()),
                        context.as_str(),
                    )
                    .invalidating(current)
                    .with_suggestion(format!("Define the {role} objective")),
                );
            }
        }

        if let Some(common) = model.common_constraint_set() {
            if analysis.contains_constraint_set(&common) {
                diagnostics.push(Diagnostic::new(
                    Severity::Info,
                    format!("common constraint set {common} is listed explicitly"),
                    context.as_str(),
                ));
            }
        }
        if let Some(common) = model.common_load_set() {
            if analysis.contains_load_set(&common) {
                diagnostics.push(Diagnostic::new(
                    Severity::Info,
                    format!("common load set {common} is listed explicitly"),
                    context.as_str(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meca_core::dof::Dofs;
    use meca_core::entity::analysis::AnalysisKind;
    use meca_core::entity::constraint::{
        Constraint, ConstraintKind, ConstraintSet, ConstraintSetType, Rbe3,
        SinglePointConstraint,
    };
    use meca_core::entity::element::{ElementKind, ElementSet};
    use meca_core::entity::material::Material;
    use meca_core::entity::objective::ObjectiveType;
    use meca_core::reference::Identity;

    fn count(diagnostics: &[Diagnostic], severity: Severity) -> usize {
        diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    #[test]
    fn clean_model_has_no_diagnostics() {
        let mut model = Model::new("clean");
        let node = model.mesh.add_node(1, [0.0; 3]);
        let mut single = SinglePointConstraint::with_dofs(Dofs::ALL, 0.0);
        single.add_node(node);
        let spc = model.add(Constraint::spc(Identity::original(1), single)).unwrap();
        let set = model
            .add(ConstraintSet::new(Identity::original(1), ConstraintSetType::Spc))
            .unwrap();
        model.add_constraint_into_constraint_set(spc, set);
        let mut analysis = Analysis::new(Identity::original(1), AnalysisKind::LinearMecaStat);
        analysis.add_constraint_set(set);
        model.add(analysis).unwrap();

        assert!(ModelChecker::analyze(&model).is_empty());
    }

    #[test]
    fn missing_set_is_warning_missing_search_is_error() {
        let mut model = Model::new("modal");
        let mut analysis = Analysis::new(
            Identity::original(1),
            AnalysisKind::LinearModal {
                frequency_search: Reference::original(ObjectiveType::FrequencyBand, 9),
            },
        );
        analysis.add_constraint_set(Reference::original(ConstraintSetType::Spc, 4));
        let current = model.add(analysis).unwrap();

        let diagnostics = ModelChecker::analyze(&model);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(count(&diagnostics, Severity::Warning), 1);
        assert_eq!(count(&diagnostics, Severity::Error), 1);
        assert!(diagnostics.iter().all(|d| d.analysis == Some(current)));
        assert!(diagnostics[1].message.contains("frequency search"));
    }

    #[test]
    fn required_objective_listed_explicitly_reported_once() {
        let mut model = Model::new("modal");
        let search = Reference::original(ObjectiveType::FrequencyBand, 9);
        let mut analysis = Analysis::new(
            Identity::original(1),
            AnalysisKind::LinearModal {
                frequency_search: search,
            },
        );
        analysis.add_objective(search);
        model.add(analysis).unwrap();

        let diagnostics = ModelChecker::analyze(&model);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn entity_problems_do_not_invalidate_analyses() {
        let mut model = Model::new("entities");
        model.add(Material::new(Identity::original(1))).unwrap();
        model
            .add(ElementSet::new(
                Identity::original(2),
                ElementKind::Shell {
                    thickness: 1.0,
                    additional_mass: 0.0,
                },
            ))
            .unwrap();

        let diagnostics = ModelChecker::analyze(&model);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.analysis.is_none()));
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert!(diagnostics[0].message.contains("no nature"));
        assert_eq!(diagnostics[1].severity, Severity::Warning);
    }

    #[test]
    fn ineffective_constraint_is_info() {
        let mut model = Model::new("empty");
        model
            .add(Constraint::spc(
                Identity::original(1),
                SinglePointConstraint::with_dofs(Dofs::ALL, 0.0),
            ))
            .unwrap();

        let diagnostics = ModelChecker::analyze(&model);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Info);
        assert!(diagnostics[0].message.contains("not emitted"));
    }

    #[test]
    fn rbe3_without_slaves_is_emitted() {
        let mut model = Model::new("rbe3");
        let master = model.mesh.add_node(1, [0.0; 3]);
        model
            .add(Constraint::new(
                Identity::original(1),
                ConstraintKind::Rbe3(Rbe3::new(master, Dofs::ALL)),
            ))
            .unwrap();

        let diagnostics = ModelChecker::analyze(&model);
        assert_eq!(count(&diagnostics, Severity::Info), 0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn undefined_node_is_error() {
        let mut model = Model::new("nodes");
        model.mesh.find_or_reserve_node(12);
        let diagnostics = ModelChecker::analyze(&model);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].context, "model nodes");
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Error.to_string(), "ERROR");
        assert_eq!(Severity::Warning.to_string(), "WARN");
        assert_eq!(Severity::Info.to_string(), "INFO");
    }
}
