//! Contact targets: node lines, surfaces and bodies named by contact constraints.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{display_by_name, identifiable};
use crate::error::{ModelError, Result};
use crate::mesh::{NodeId, NodePosition};
use crate::model::Model;
use crate::reference::{Identity, Reference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetType {
    BoundaryNodeLine,
    BoundaryNodeSurface,
    ContactBody,
    BoundarySurface,
    BoundaryElementFace,
}

impl TargetType {
    pub fn name(self) -> &'static str {
        match self {
            TargetType::BoundaryNodeLine => "BOUNDARY_NODE_LINE",
            TargetType::BoundaryNodeSurface => "BOUNDARY_NODE_SURFACE",
            TargetType::ContactBody => "CONTACT_BODY",
            TargetType::BoundarySurface => "BOUNDARY_SURFACE",
            TargetType::BoundaryElementFace => "BOUNDARY_ELEMENT_FACE",
        }
    }
}

display_by_name!(TargetType);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TargetKind {
    /// Ordered node ids along a contact line.
    BoundaryNodeLine { node_ids: Vec<NodeId> },
    BoundaryNodeSurface { node_ids: Vec<NodeId> },
    /// A body whose boundary is a [`TargetKind::BoundarySurface`].
    ContactBody { boundary: Reference<Target> },
    BoundarySurface { node_positions: BTreeSet<NodePosition> },
    BoundaryElementFace { node_positions: BTreeSet<NodePosition> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub identity: Identity,
    pub target: TargetKind,
}

identifiable!(Target, TargetType, "Target", |this| match this.target {
    TargetKind::BoundaryNodeLine { .. } => TargetType::BoundaryNodeLine,
    TargetKind::BoundaryNodeSurface { .. } => TargetType::BoundaryNodeSurface,
    TargetKind::ContactBody { .. } => TargetType::ContactBody,
    TargetKind::BoundarySurface { .. } => TargetType::BoundarySurface,
    TargetKind::BoundaryElementFace { .. } => TargetType::BoundaryElementFace,
});

impl Target {
    pub fn new(identity: Identity, target: TargetKind) -> Self {
        Self { identity, target }
    }

    /// Node positions covered by this target. A contact body answers for its
    /// boundary surface.
    pub fn node_positions(&self, model: &Model) -> Result<BTreeSet<NodePosition>> {
        match &self.target {
            TargetKind::BoundaryNodeLine { node_ids } | TargetKind::BoundaryNodeSurface { node_ids } => {
                node_ids
                    .iter()
                    .map(|id| model.mesh.require_node_position(*id))
                    .collect()
            }
            TargetKind::ContactBody { boundary } => {
                let surface = model.require(boundary)?;
                match &surface.target {
                    TargetKind::BoundarySurface { node_positions } => Ok(node_positions.clone()),
                    _ => Err(ModelError::UnsupportedFeature(format!(
                        "contact body boundary {boundary} is not a boundary surface"
                    ))),
                }
            }
            TargetKind::BoundarySurface { node_positions }
            | TargetKind::BoundaryElementFace { node_positions } => Ok(node_positions.clone()),
        }
    }

    /// Whether the target covers no node at all.
    pub fn is_empty(&self, model: &Model) -> Result<bool> {
        Ok(self.node_positions(model)?.is_empty())
    }
}
