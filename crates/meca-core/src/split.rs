//! Splitting a single-point constraint at one node.
//!
//! When a boundary-processing pass takes over some DOFs of an SPC at a node,
//! the SPC is retired for that node and its DOFs are redistributed:
//!
//! * the DOFs that stay fixed move to a new single-node SPC that joins every
//!   set owning the original;
//! * with several analyses, the removed DOFs move to a new SPC in a dedicated
//!   set, attached to every other analysis that used one of those sets.
//!
//! Planning reads the model only; all mutations happen afterwards.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dof::{Dof, Dofs};
use crate::entity::analysis::Analysis;
use crate::entity::constraint::{
    Constraint, ConstraintSet, ConstraintSetType, SinglePointConstraint, SpcValue,
};
use crate::error::{ModelError, Result};
use crate::mesh::NodePosition;
use crate::model::Model;
use crate::reference::{Identifiable, Identity, Reference};

/// What [`Model::remove_spc_node_dofs`] created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOutcome {
    /// SPC holding the DOFs that stay fixed, if any remain.
    pub remaining_spc: Option<Reference<Constraint>>,
    /// Dedicated set and SPC carrying the removed DOFs for other analyses.
    pub transferred: Option<(Reference<ConstraintSet>, Reference<Constraint>)>,
    /// Analyses the dedicated set was attached to, in declaration order.
    pub attached_to: Vec<Reference<Analysis>>,
}

struct SplitPlan {
    current: Reference<Analysis>,
    remaining: Vec<(Dof, SpcValue)>,
    removed: Vec<(Dof, SpcValue)>,
    owners: BTreeSet<Reference<ConstraintSet>>,
    transfer: bool,
    attach_to: Vec<Reference<Analysis>>,
}

fn single_node_spc(position: NodePosition, values: &[(Dof, SpcValue)]) -> Constraint {
    let mut spc = SinglePointConstraint::new();
    spc.add_node(position);
    for (dof, value) in values {
        spc.set_dof(*dof, *value);
    }
    Constraint::spc(Identity::synthesized(), spc)
}

impl Model {
    /// Remove `dofs_to_remove` of `spc` at `node_position` from the view of
    /// `analysis`.
    ///
    /// Fails without touching the model when `spc` is not an SPC, does not
    /// hold the node, or does not fix every DOF in `dofs_to_remove`. An empty
    /// `dofs_to_remove` changes nothing.
    pub fn remove_spc_node_dofs(
        &mut self,
        analysis: &Reference<Analysis>,
        spc: &Reference<Constraint>,
        node_position: NodePosition,
        dofs_to_remove: Dofs,
    ) -> Result<SplitOutcome> {
        let plan = self.plan_split(analysis, spc, node_position, dofs_to_remove)?;
        if dofs_to_remove.is_empty() {
            debug!(spc = %spc, node_position, "nothing to remove");
            return Ok(SplitOutcome::default());
        }

        let remaining_spc = if plan.remaining.is_empty() {
            None
        } else {
            let created = self.add_synthesized(single_node_spc(node_position, &plan.remaining));
            let dofs: Dofs = plan.remaining.iter().map(|(dof, _)| *dof).collect();
            debug!(
                spc = %created,
                node_position,
                dofs = %dofs,
                "created SPC for remaining DOFs"
            );
            for set in &plan.owners {
                self.add_constraint_into_constraint_set(created, *set);
            }
            Some(created)
        };

        let mut attached_to = Vec::new();
        let transferred = if plan.transfer {
            let set = self.add_synthesized(ConstraintSet::new(
                Identity::synthesized(),
                ConstraintSetType::Spc,
            ));
            let created = self.add_synthesized(single_node_spc(node_position, &plan.removed));
            self.add_constraint_into_constraint_set(created, set);
            debug!(
                spc = %created,
                node_position,
                dofs = %dofs_to_remove,
                "created SPC for other analyses"
            );
            for other in plan.attach_to {
                if let Some(found) = self.find_mut(&other) {
                    found.add_constraint_set(set);
                    attached_to.push(other);
                }
            }
            Some((set, created))
        } else {
            None
        };

        self.remove_constraint_node(spc, node_position)?;
        debug!(
            analysis = %plan.current,
            spc = %spc,
            node_position,
            "retired SPC at node"
        );

        Ok(SplitOutcome {
            remaining_spc,
            transferred,
            attached_to,
        })
    }

    fn plan_split(
        &self,
        analysis: &Reference<Analysis>,
        spc: &Reference<Constraint>,
        node_position: NodePosition,
        dofs_to_remove: Dofs,
    ) -> Result<SplitPlan> {
        let current = self.require(analysis)?.reference();
        let constraint = self.require(spc)?;
        let single = constraint.as_spc().ok_or_else(|| {
            ModelError::UnsupportedFeature(format!(
                "splitting {} constraint {spc}",
                constraint.kind()
            ))
        })?;
        if !single.node_positions(&self.mesh).contains(&node_position) {
            return Err(ModelError::InvalidDofConfiguration(format!(
                "node position {node_position} is not constrained by {spc}"
            )));
        }
        let existing = single.dofs();
        if !existing.contains_all(dofs_to_remove) {
            return Err(ModelError::InvalidDofConfiguration(format!(
                "cannot remove {dofs_to_remove} from {spc}, which only fixes {existing}"
            )));
        }

        let values_for = |dofs: Dofs| -> Vec<(Dof, SpcValue)> {
            dofs.iter()
                .filter_map(|dof| single.value_for(dof).map(|value| (dof, value)))
                .collect()
        };
        let remaining = values_for(existing - dofs_to_remove);
        let removed = values_for(dofs_to_remove);

        let owners = self.constraint_sets_by_constraint(spc);
        let transfer =
            self.count::<Analysis>() >= 2 && self.configuration.split_shared_boundaries;
        let attach_to = if transfer {
            self.analyses()
                .filter(|other| other.reference() != current)
                .filter(|other| {
                    other
                        .constraint_sets(self)
                        .iter()
                        .any(|set| owners.contains(&set.reference()))
                })
                .map(Identifiable::reference)
                .collect()
        } else {
            Vec::new()
        };

        Ok(SplitPlan {
            current,
            remaining,
            removed,
            owners,
            transfer,
            attach_to,
        })
    }
}
