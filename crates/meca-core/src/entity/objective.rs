//! Objectives: post-solve assertions and analysis parameters.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::value::NamedValue;
use super::{display_by_name, identifiable};
use crate::config::ModelConfiguration;
use crate::dof::{Dof, Dofs};
use crate::error::{ModelError, Result};
use crate::mesh::NodePosition;
use crate::model::Model;
use crate::reference::{Identifiable, Identity, Reference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectiveType {
    NodalDisplacementAssertion,
    NodalComplexDisplacementAssertion,
    FrequencyAssertion,
    FrequencyTarget,
    FrequencyBand,
    ModalDamping,
    NonLinearStrategy,
}

impl ObjectiveType {
    pub fn name(self) -> &'static str {
        match self {
            ObjectiveType::NodalDisplacementAssertion => "NODAL_DISPLACEMENT_ASSERTION",
            ObjectiveType::NodalComplexDisplacementAssertion => {
                "NODAL_COMPLEX_DISPLACEMENT_ASSERTION"
            }
            ObjectiveType::FrequencyAssertion => "FREQUENCY_ASSERTION",
            ObjectiveType::FrequencyTarget => "FREQUENCY_TARGET",
            ObjectiveType::FrequencyBand => "FREQUENCY_BAND",
            ObjectiveType::ModalDamping => "MODAL_DAMPING",
            ObjectiveType::NonLinearStrategy => "NONLINEAR_STRATEGY",
        }
    }

    pub fn is_assertion(self) -> bool {
        matches!(
            self,
            ObjectiveType::NodalDisplacementAssertion
                | ObjectiveType::NodalComplexDisplacementAssertion
                | ObjectiveType::FrequencyAssertion
        )
    }
}

display_by_name!(ObjectiveType);

/// Frequencies given either as a range value or as an explicit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrequencyValues {
    Range(Reference<NamedValue>),
    List(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveKind {
    NodalDisplacementAssertion {
        tolerance: f64,
        node_position: NodePosition,
        dof: Dof,
        value: f64,
        instant: f64,
    },
    NodalComplexDisplacementAssertion {
        tolerance: f64,
        node_position: NodePosition,
        dof: Dof,
        real: f64,
        imaginary: f64,
        frequency: f64,
    },
    FrequencyAssertion {
        tolerance: f64,
        number: u32,
        cycles: f64,
        generalized_mass: f64,
        generalized_stiffness: f64,
    },
    FrequencyTarget(FrequencyValues),
    /// Eigenvalue search window; blank bounds fall back to model cutoffs.
    FrequencyBand {
        lower: Option<f64>,
        upper: Option<f64>,
        num_max: Option<u32>,
        norm: String,
    },
    ModalDamping {
        function_table: Reference<NamedValue>,
    },
    NonLinearStrategy {
        number_of_increments: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub identity: Identity,
    pub objective: ObjectiveKind,
}

identifiable!(Objective, ObjectiveType, "Objective", |this| match this.objective {
    ObjectiveKind::NodalDisplacementAssertion { .. } => ObjectiveType::NodalDisplacementAssertion,
    ObjectiveKind::NodalComplexDisplacementAssertion { .. } => {
        ObjectiveType::NodalComplexDisplacementAssertion
    }
    ObjectiveKind::FrequencyAssertion { .. } => ObjectiveType::FrequencyAssertion,
    ObjectiveKind::FrequencyTarget(_) => ObjectiveType::FrequencyTarget,
    ObjectiveKind::FrequencyBand { .. } => ObjectiveType::FrequencyBand,
    ObjectiveKind::ModalDamping { .. } => ObjectiveType::ModalDamping,
    ObjectiveKind::NonLinearStrategy { .. } => ObjectiveType::NonLinearStrategy,
});

impl Objective {
    pub fn new(identity: Identity, objective: ObjectiveKind) -> Self {
        Self {
            identity,
            objective,
        }
    }

    pub fn is_assertion(&self) -> bool {
        self.kind().is_assertion()
    }

    pub fn tolerance(&self) -> Option<f64> {
        match &self.objective {
            ObjectiveKind::NodalDisplacementAssertion { tolerance, .. }
            | ObjectiveKind::NodalComplexDisplacementAssertion { tolerance, .. }
            | ObjectiveKind::FrequencyAssertion { tolerance, .. } => Some(*tolerance),
            _ => None,
        }
    }

    pub fn node_positions(&self) -> BTreeSet<NodePosition> {
        match &self.objective {
            ObjectiveKind::NodalDisplacementAssertion { node_position, .. }
            | ObjectiveKind::NodalComplexDisplacementAssertion { node_position, .. } => {
                BTreeSet::from([*node_position])
            }
            _ => BTreeSet::new(),
        }
    }

    /// The asserted DOF at the asserted node; nothing elsewhere.
    pub fn dofs_for_node(&self, position: NodePosition) -> Dofs {
        match &self.objective {
            ObjectiveKind::NodalDisplacementAssertion {
                node_position, dof, ..
            }
            | ObjectiveKind::NodalComplexDisplacementAssertion {
                node_position, dof, ..
            } if *node_position == position => Dofs::from(*dof),
            _ => Dofs::NONE,
        }
    }

    /// Lower search bound, falling back to the configured cutoff.
    pub fn lower_frequency(&self, config: &ModelConfiguration) -> Option<f64> {
        let ObjectiveKind::FrequencyBand { lower, .. } = &self.objective else {
            return None;
        };
        lower.or_else(|| {
            let cutoff = config.parameters.lower_cutoff_frequency;
            if let Some(value) = cutoff {
                trace!(cutoff = value, "lower band bound taken from model parameters");
            }
            cutoff
        })
    }

    /// Upper search bound, falling back to the configured cutoff.
    pub fn upper_frequency(&self, config: &ModelConfiguration) -> Option<f64> {
        let ObjectiveKind::FrequencyBand { upper, .. } = &self.objective else {
            return None;
        };
        upper.or_else(|| {
            let cutoff = config.parameters.upper_cutoff_frequency;
            if let Some(value) = cutoff {
                trace!(cutoff = value, "upper band bound taken from model parameters");
            }
            cutoff
        })
    }

    /// Explicit frequencies of a frequency target, resolving range values.
    pub fn frequencies(&self, model: &Model) -> Result<Vec<f64>> {
        match &self.objective {
            ObjectiveKind::FrequencyTarget(FrequencyValues::List(values)) => Ok(values.clone()),
            ObjectiveKind::FrequencyTarget(FrequencyValues::Range(range)) => {
                Ok(model.require(range)?.values())
            }
            _ => Err(ModelError::UnsupportedFeature(format!(
                "{} does not carry frequencies",
                self.reference()
            ))),
        }
    }

    /// Named values this objective depends on.
    pub fn value_references(&self) -> Vec<Reference<NamedValue>> {
        match &self.objective {
            ObjectiveKind::FrequencyTarget(FrequencyValues::Range(range)) => vec![*range],
            ObjectiveKind::ModalDamping { function_table } => vec![*function_table],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::value::{ValueKind, ValueType};

    fn band(lower: Option<f64>, upper: Option<f64>) -> Objective {
        Objective::new(
            Identity::original(1),
            ObjectiveKind::FrequencyBand {
                lower,
                upper,
                num_max: Some(10),
                norm: "MASS".into(),
            },
        )
    }

    #[test]
    fn frequency_band_uses_cutoffs_for_blank_bounds() {
        let mut config = ModelConfiguration::default();
        config.parameters.lower_cutoff_frequency = Some(0.5);
        config.parameters.upper_cutoff_frequency = Some(200.0);

        let blank = band(None, None);
        assert_eq!(blank.lower_frequency(&config), Some(0.5));
        assert_eq!(blank.upper_frequency(&config), Some(200.0));

        let explicit = band(Some(1.0), Some(50.0));
        assert_eq!(explicit.lower_frequency(&config), Some(1.0));
        assert_eq!(explicit.upper_frequency(&config), Some(50.0));

        assert_eq!(blank.lower_frequency(&ModelConfiguration::default()), None);
    }

    #[test]
    fn nodal_assertion() {
        let assertion = Objective::new(
            Identity::original(2),
            ObjectiveKind::NodalDisplacementAssertion {
                tolerance: 1e-4,
                node_position: 5,
                dof: Dof::Dz,
                value: -0.25,
                instant: 0.0,
            },
        );
        assert!(assertion.is_assertion());
        assert_eq!(assertion.tolerance(), Some(1e-4));
        assert_eq!(assertion.dofs_for_node(5), Dofs::from(Dof::Dz));
        assert_eq!(assertion.dofs_for_node(4), Dofs::NONE);
        assert_eq!(assertion.node_positions().into_iter().collect::<Vec<_>>(), vec![5]);
        assert!(!band(None, None).is_assertion());
    }

    #[test]
    fn frequency_target_resolves_range() {
        let mut model = Model::new("modal");
        let range = model
            .add(NamedValue::new(
                Identity::original(7),
                ValueKind::StepRange {
                    start: 1.0,
                    step: 1.0,
                    count: 4,
                },
            ))
            .unwrap();
        let target = Objective::new(
            Identity::original(3),
            ObjectiveKind::FrequencyTarget(FrequencyValues::Range(range)),
        );
        assert_eq!(target.frequencies(&model).unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(target.kind(), ObjectiveType::FrequencyTarget);

        let dangling = Objective::new(
            Identity::original(4),
            ObjectiveKind::FrequencyTarget(FrequencyValues::Range(Reference::original(
                ValueType::StepRange,
                99,
            ))),
        );
        assert!(dangling.frequencies(&model).unwrap_err().is_missing_reference());
        assert!(band(None, None).frequencies(&model).is_err());
    }
}
