//! Model construction API used by format readers.
//!
//! The `ModelBuilder` wraps a [`Model`] with shortcuts for the entities a bulk
//! data reader creates most often. Node ids may be used before the node is
//! defined; they are reserved and must be defined by the time [`build`] runs.
//!
//! # Example
//!
//! ```rust
//! use meca_core::builder::ModelBuilder;
//! use meca_core::dof::Dofs;
//! use meca_core::entity::constraint::ConstraintSetType;
//!
//! let mut builder = ModelBuilder::new("plate");
//! let spc = builder.spc(1, &[10, 11], Dofs::ALL, 0.0).unwrap();
//! let set = builder.constraint_set(1, ConstraintSetType::Spc).unwrap();
//! builder.add_constraint_into_set(spc, set);
//! builder.node(10, [0.0, 0.0, 0.0]);
//! builder.node(11, [1.0, 0.0, 0.0]);
//! builder.linear_static(1, "clamped plate", &[set], &[]).unwrap();
//!
//! let model = builder.build().unwrap();
//! assert_eq!(model.analyses().count(), 1);
//! ```
//!
//! [`build`]: ModelBuilder::build

use crate::config::ModelConfiguration;
use crate::dof::Dofs;
use crate::entity::analysis::{Analysis, AnalysisKind};
use crate::entity::constraint::{Constraint, ConstraintSet, ConstraintSetType, SinglePointConstraint};
use crate::entity::loading::{LoadSet, LoadSetType, Loading};
use crate::error::{ModelError, Result};
use crate::mesh::{NodeId, NodePosition};
use crate::model::{Model, Stored};
use crate::reference::{Identity, OriginalId, Reference};

/// A builder for assembling a [`Model`] from source-format records.
pub struct ModelBuilder {
    model: Model,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            model: Model::new(name),
        }
    }

    pub fn with_configuration(mut self, configuration: ModelConfiguration) -> Self {
        self.model.configuration = configuration;
        self
    }

    /// Define a node.
    pub fn node(&mut self, id: NodeId, coords: [f64; 3]) -> NodePosition {
        self.model.mesh.add_node(id, coords)
    }

    /// Add any entity.
    pub fn add<T: Stored>(&mut self, entity: T) -> Result<Reference<T>> {
        self.model.add(entity)
    }

    /// SPC fixing `dofs` to `value` on the given nodes.
    pub fn spc(
        &mut self,
        original_id: OriginalId,
        node_ids: &[NodeId],
        dofs: Dofs,
        value: f64,
    ) -> Result<Reference<Constraint>> {
        let mut spc = SinglePointConstraint::with_dofs(dofs, value);
        for id in node_ids {
            spc.add_node(self.model.mesh.find_or_reserve_node(*id));
        }
        self.model
            .add(Constraint::spc(Identity::original(original_id), spc))
    }

    pub fn constraint_set(
        &mut self,
        original_id: OriginalId,
        kind: ConstraintSetType,
    ) -> Result<Reference<ConstraintSet>> {
        self.model
            .add(ConstraintSet::new(Identity::original(original_id), kind))
    }

    pub fn add_constraint_into_set(
        &mut self,
        constraint: Reference<Constraint>,
        set: Reference<ConstraintSet>,
    ) {
        self.model.add_constraint_into_constraint_set(constraint, set);
    }

    /// Nodal force at a node, given by id.
    pub fn nodal_force(
        &mut self,
        original_id: OriginalId,
        node_id: NodeId,
        force: [f64; 3],
    ) -> Result<Reference<Loading>> {
        let position = self.model.mesh.find_or_reserve_node(node_id);
        self.model
            .add(Loading::nodal_force(Identity::original(original_id), position, force))
    }

    pub fn load_set(&mut self, original_id: OriginalId, kind: LoadSetType) -> Result<Reference<LoadSet>> {
        self.model.add(LoadSet::new(Identity::original(original_id), kind))
    }

    pub fn add_loading_into_set(&mut self, loading: Reference<Loading>, set: Reference<LoadSet>) {
        self.model.add_loading_into_load_set(loading, set);
    }

    /// Linear static analysis over the given sets.
    pub fn linear_static(
        &mut self,
        original_id: OriginalId,
        label: &str,
        constraint_sets: &[Reference<ConstraintSet>],
        load_sets: &[Reference<LoadSet>],
    ) -> Result<Reference<Analysis>> {
        self.analysis(
            original_id,
            label,
            AnalysisKind::LinearMecaStat,
            constraint_sets,
            load_sets,
        )
    }

    pub fn analysis(
        &mut self,
        original_id: OriginalId,
        label: &str,
        kind: AnalysisKind,
        constraint_sets: &[Reference<ConstraintSet>],
        load_sets: &[Reference<LoadSet>],
    ) -> Result<Reference<Analysis>> {
        let mut analysis = Analysis::new(Identity::original(original_id), kind).with_label(label);
        for set in constraint_sets {
            analysis.add_constraint_set(*set);
        }
        for set in load_sets {
            analysis.add_load_set(*set);
        }
        self.model.add(analysis)
    }

    /// Access the model under construction.
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// Validate and return the finished model.
    pub fn build(self) -> std::result::Result<Model, Vec<ModelError>> {
        self.model.validate()?;
        Ok(self.model)
    }

    /// Return the model without validation (for testing or incremental construction).
    pub fn into_model(self) -> Model {
        self.model
    }
}
