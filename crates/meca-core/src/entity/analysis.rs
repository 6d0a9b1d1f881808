//! Analyses: one solver run selecting load sets, constraint sets and
//! objectives out of the model.
//!
//! Aggregation queries resolve references through the [`Model`] and merge in
//! the model's common sets. Unresolved references are skipped here and
//! reported by [`Analysis::validate`].

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::constraint::{Constraint, ConstraintSet, ConstraintType};
use super::loading::{LoadSet, Loading};
use super::objective::Objective;
use super::{display_by_name, identifiable};
use crate::dof::Dofs;
use crate::error::{ModelError, Result};
use crate::mesh::NodePosition;
use crate::model::Model;
use crate::reference::{Family, Identifiable, Identity, Reference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnalysisType {
    LinearMecaStat,
    NonLinearMecaStat,
    LinearModal,
    LinearDynaModalFreq,
    LinearDynaDirectFreq,
}

impl AnalysisType {
    pub fn name(self) -> &'static str {
        match self {
            AnalysisType::LinearMecaStat => "LINEAR_MECA_STAT",
            AnalysisType::NonLinearMecaStat => "NONLINEAR_MECA_STAT",
            AnalysisType::LinearModal => "LINEAR_MODAL",
            AnalysisType::LinearDynaModalFreq => "LINEAR_DYNA_MODAL_FREQ",
            AnalysisType::LinearDynaDirectFreq => "LINEAR_DYNA_DIRECT_FREQ",
        }
    }
}

display_by_name!(AnalysisType);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisKind {
    LinearMecaStat,
    NonLinearMecaStat {
        strategy: Reference<Objective>,
    },
    LinearModal {
        frequency_search: Reference<Objective>,
    },
    LinearDynaModalFreq {
        frequency_search: Reference<Objective>,
        modal_damping: Reference<Objective>,
        frequency_excitation: Reference<Objective>,
        residual_vector: bool,
    },
    LinearDynaDirectFreq {
        frequency_excitation: Reference<Objective>,
    },
}

/// An entry of [`Analysis::boundary_conditions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCondition<'m> {
    Constraint(&'m Constraint),
    Loading(&'m Loading),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub identity: Identity,
    pub label: String,
    load_sets: Vec<Reference<LoadSet>>,
    constraint_sets: Vec<Reference<ConstraintSet>>,
    objectives: Vec<Reference<Objective>>,
    boundary_dofs: BTreeMap<NodePosition, Dofs>,
    pub analysis: AnalysisKind,
}

identifiable!(Analysis, AnalysisType, "Analysis", |this| match this.analysis {
    AnalysisKind::LinearMecaStat => AnalysisType::LinearMecaStat,
    AnalysisKind::NonLinearMecaStat { .. } => AnalysisType::NonLinearMecaStat,
    AnalysisKind::LinearModal { .. } => AnalysisType::LinearModal,
    AnalysisKind::LinearDynaModalFreq { .. } => AnalysisType::LinearDynaModalFreq,
    AnalysisKind::LinearDynaDirectFreq { .. } => AnalysisType::LinearDynaDirectFreq,
});

/// Push `reference` unless an identity-equal one is already present.
fn add_unique<T: Family>(list: &mut Vec<Reference<T>>, reference: Reference<T>) {
    if !list.contains(&reference) {
        list.push(reference);
    }
}

impl Analysis {
    pub fn new(identity: Identity, analysis: AnalysisKind) -> Self {
        Self {
            identity,
            label: String::new(),
            load_sets: Vec::new(),
            constraint_sets: Vec::new(),
            objectives: Vec::new(),
            boundary_dofs: BTreeMap::new(),
            analysis,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn add_load_set(&mut self, reference: Reference<LoadSet>) {
        add_unique(&mut self.load_sets, reference);
    }

    pub fn remove_load_set(&mut self, reference: &Reference<LoadSet>) {
        self.load_sets.retain(|held| held != reference);
    }

    pub fn contains_load_set(&self, reference: &Reference<LoadSet>) -> bool {
        self.load_sets.contains(reference)
    }

    pub fn add_constraint_set(&mut self, reference: Reference<ConstraintSet>) {
        add_unique(&mut self.constraint_sets, reference);
    }

    pub fn remove_constraint_set(&mut self, reference: &Reference<ConstraintSet>) {
        self.constraint_sets.retain(|held| held != reference);
    }

    pub fn contains_constraint_set(&self, reference: &Reference<ConstraintSet>) -> bool {
        self.constraint_sets.contains(reference)
    }

    pub fn add_objective(&mut self, reference: Reference<Objective>) {
        add_unique(&mut self.objectives, reference);
    }

    pub fn remove_objective(&mut self, reference: &Reference<Objective>) {
        self.objectives.retain(|held| held != reference);
    }

    pub fn contains_objective(&self, reference: &Reference<Objective>) -> bool {
        self.objectives.contains(reference)
    }

    pub fn load_set_references(&self) -> &[Reference<LoadSet>] {
        &self.load_sets
    }

    pub fn constraint_set_references(&self) -> &[Reference<ConstraintSet>] {
        &self.constraint_sets
    }

    pub fn objective_references(&self) -> &[Reference<Objective>] {
        &self.objectives
    }

    /// The common load set followed by every explicitly referenced set that
    /// resolves.
    pub fn load_sets<'m>(&self, model: &'m Model) -> Vec<&'m LoadSet> {
        let mut seen = HashSet::new();
        model
            .common_load_set()
            .into_iter()
            .chain(self.load_sets.iter().copied())
            .filter_map(|reference| model.find(&reference))
            .filter(|set| seen.insert(set.reference()))
            .collect()
    }

    /// The common constraint set followed by every explicitly referenced set
    /// that resolves.
    pub fn constraint_sets<'m>(&self, model: &'m Model) -> Vec<&'m ConstraintSet> {
        let mut seen = HashSet::new();
        model
            .common_constraint_set()
            .into_iter()
            .chain(self.constraint_sets.iter().copied())
            .filter_map(|reference| model.find(&reference))
            .filter(|set| seen.insert(set.reference()))
            .collect()
    }

    pub fn objectives<'m>(&self, model: &'m Model) -> Vec<&'m Objective> {
        self.objectives
            .iter()
            .filter_map(|reference| model.find(reference))
            .collect()
    }

    pub fn assertions<'m>(&self, model: &'m Model) -> Vec<&'m Objective> {
        self.objectives(model)
            .into_iter()
            .filter(|objective| objective.is_assertion())
            .collect()
    }

    /// Every constraint reachable from the analysis, each once.
    pub fn constraints<'m>(&self, model: &'m Model) -> Vec<&'m Constraint> {
        let mut seen = HashSet::new();
        self.constraint_sets(model)
            .into_iter()
            .flat_map(|set| set.constraints(model))
            .filter(|constraint| seen.insert(constraint.reference()))
            .collect()
    }

    /// Every loading reachable from the analysis, each once.
    pub fn loadings<'m>(&self, model: &'m Model) -> Vec<&'m Loading> {
        let mut seen = HashSet::new();
        self.load_sets(model)
            .into_iter()
            .flat_map(|set| set.loadings(model))
            .filter(|loading| seen.insert(loading.reference()))
            .collect()
    }

    /// Constraints then loadings, in set order.
    pub fn boundary_conditions<'m>(&self, model: &'m Model) -> Vec<BoundaryCondition<'m>> {
        self.constraints(model)
            .into_iter()
            .map(BoundaryCondition::Constraint)
            .chain(self.loadings(model).into_iter().map(BoundaryCondition::Loading))
            .collect()
    }

    /// True when a reachable set is SPC-like or holds an SPC or LMPC.
    pub fn has_spc(&self, model: &Model) -> bool {
        self.constraint_sets(model).into_iter().any(|set| {
            set.kind.is_spc_like()
                || set.constraints(model).iter().any(|constraint| {
                    matches!(constraint.kind(), ConstraintType::Spc | ConstraintType::Lmpc)
                })
        })
    }

    /// Mark `dofs` at `position` as imposed by this analysis only.
    pub fn add_boundary_dofs(&mut self, position: NodePosition, dofs: Dofs) {
        *self.boundary_dofs.entry(position).or_default() += dofs;
    }

    pub fn find_boundary_dofs(&self, position: NodePosition) -> Dofs {
        self.boundary_dofs.get(&position).copied().unwrap_or_default()
    }

    pub fn boundary_node_positions(&self) -> BTreeSet<NodePosition> {
        self.boundary_dofs.keys().copied().collect()
    }

    /// Objectives the variant cannot run without, labelled by role.
    pub fn required_references(&self) -> Vec<(&'static str, Reference<Objective>)> {
        match &self.analysis {
            AnalysisKind::LinearMecaStat => Vec::new(),
            AnalysisKind::NonLinearMecaStat { strategy } => vec![("strategy", *strategy)],
            AnalysisKind::LinearModal { frequency_search } => {
                vec![("frequency search", *frequency_search)]
            }
            AnalysisKind::LinearDynaModalFreq {
                frequency_search,
                modal_damping,
                frequency_excitation,
                ..
            } => vec![
                ("frequency search", *frequency_search),
                ("modal damping", *modal_damping),
                ("frequency excitation", *frequency_excitation),
            ],
            AnalysisKind::LinearDynaDirectFreq {
                frequency_excitation,
            } => vec![("frequency excitation", *frequency_excitation)],
        }
    }

    fn require_role<'m>(&self, model: &'m Model, role: &str) -> Result<&'m Objective> {
        let (_, reference) = self
            .required_references()
            .into_iter()
            .find(|(name, _)| *name == role)
            .ok_or_else(|| {
                ModelError::UnsupportedFeature(format!(
                    "{} analysis has no {role}",
                    self.kind()
                ))
            })?;
        model.require(&reference)
    }

    pub fn frequency_search<'m>(&self, model: &'m Model) -> Result<&'m Objective> {
        self.require_role(model, "frequency search")
    }

    pub fn modal_damping<'m>(&self, model: &'m Model) -> Result<&'m Objective> {
        self.require_role(model, "modal damping")
    }

    pub fn strategy<'m>(&self, model: &'m Model) -> Result<&'m Objective> {
        self.require_role(model, "strategy")
    }

    /// Frequencies of the excitation target of a frequency response analysis.
    pub fn excitation_frequencies(&self, model: &Model) -> Result<Vec<f64>> {
        self.require_role(model, "frequency excitation")?
            .frequencies(model)
    }

    pub fn residual_vector(&self) -> bool {
        matches!(
            self.analysis,
            AnalysisKind::LinearDynaModalFreq {
                residual_vector: true,
                ..
            }
        )
    }

    /// Every referenced set, objective and required objective resolves.
    pub fn validate(&self, model: &Model) -> std::result::Result<(), Vec<ModelError>> {
        let mut errors = Vec::new();
        for reference in &self.constraint_sets {
            if model.find(reference).is_none() {
                errors.push(ModelError::missing(reference));
            }
        }
        for reference in &self.load_sets {
            if model.find(reference).is_none() {
                errors.push(ModelError::missing(reference));
            }
        }
        for reference in &self.objectives {
            if model.find(reference).is_none() {
                errors.push(ModelError::missing(reference));
            }
        }
        for (_, reference) in self.required_references() {
            if model.find(&reference).is_none() && !self.objectives.contains(&reference) {
                errors.push(ModelError::missing(&reference));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
