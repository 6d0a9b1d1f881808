//! Loadings and load sets.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::{display_by_name, identifiable};
use crate::dof::{Dof, Dofs};
use crate::mesh::NodePosition;
use crate::model::Model;
use crate::numeric::is_zero;
use crate::reference::{Identifiable, Identity, Reference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadingType {
    NodalForce,
    Gravity,
}

impl LoadingType {
    pub fn name(self) -> &'static str {
        match self {
            LoadingType::NodalForce => "NODAL_FORCE",
            LoadingType::Gravity => "GRAVITY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadSetType {
    Load,
    Dload,
    ExciteId,
    /// The model-wide set merged into every analysis.
    All,
}

impl LoadSetType {
    pub fn name(self) -> &'static str {
        match self {
            LoadSetType::Load => "LOAD",
            LoadSetType::Dload => "DLOAD",
            LoadSetType::ExciteId => "EXCITEID",
            LoadSetType::All => "ALL",
        }
    }
}

display_by_name!(LoadingType, LoadSetType);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoadingKind {
    NodalForce {
        node_position: NodePosition,
        force: [f64; 3],
        moment: [f64; 3],
    },
    Gravity {
        acceleration: f64,
        direction: [f64; 3],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loading {
    pub identity: Identity,
    pub loading: LoadingKind,
}

identifiable!(Loading, LoadingType, "Loading", |this| match this.loading {
    LoadingKind::NodalForce { .. } => LoadingType::NodalForce,
    LoadingKind::Gravity { .. } => LoadingType::Gravity,
});

impl Loading {
    pub fn new(identity: Identity, loading: LoadingKind) -> Self {
        Self { identity, loading }
    }

    pub fn nodal_force(identity: Identity, node_position: NodePosition, force: [f64; 3]) -> Self {
        Self::new(
            identity,
            LoadingKind::NodalForce {
                node_position,
                force,
                moment: [0.0; 3],
            },
        )
    }

    pub fn node_positions(&self) -> BTreeSet<NodePosition> {
        match &self.loading {
            LoadingKind::NodalForce { node_position, .. } => BTreeSet::from([*node_position]),
            LoadingKind::Gravity { .. } => BTreeSet::new(),
        }
    }

    /// DOFs loaded at `position`: translations for force components,
    /// rotations for moment components.
    pub fn dofs_for_node(&self, position: NodePosition) -> Dofs {
        match &self.loading {
            LoadingKind::NodalForce {
                node_position,
                force,
                moment,
            } if *node_position == position => force
                .iter()
                .chain(moment.iter())
                .zip(Dof::ALL)
                .filter(|(component, _)| !is_zero(**component))
                .map(|(_, dof)| dof)
                .collect(),
            _ => Dofs::NONE,
        }
    }

    pub fn is_ineffective(&self) -> bool {
        match &self.loading {
            LoadingKind::NodalForce { force, moment, .. } => {
                force.iter().chain(moment.iter()).all(|component| is_zero(*component))
            }
            LoadingKind::Gravity { acceleration, .. } => is_zero(*acceleration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSet {
    pub identity: Identity,
    pub kind: LoadSetType,
    nested: Vec<Reference<LoadSet>>,
}

identifiable!(LoadSet, LoadSetType, "LoadSet", |this| this.kind);

impl LoadSet {
    pub fn new(identity: Identity, kind: LoadSetType) -> Self {
        Self {
            identity,
            kind,
            nested: Vec::new(),
        }
    }

    pub fn add_nested(&mut self, set: Reference<LoadSet>) {
        if !self.nested.contains(&set) {
            self.nested.push(set);
        }
    }

    pub fn nested(&self) -> &[Reference<LoadSet>] {
        &self.nested
    }

    /// Direct members plus the members of every nested set, each loading once.
    pub fn loadings<'m>(&self, model: &'m Model) -> Vec<&'m Loading> {
        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut pending = vec![self.reference()];
        while let Some(set) = pending.pop() {
            if !visited.insert(set) {
                continue;
            }
            for loading in model.loadings_by_load_set(&set) {
                if seen.insert(loading.reference()) {
                    result.push(loading);
                }
            }
            if let Some(found) = model.find(&set) {
                pending.extend(found.nested.iter().rev().copied());
            }
        }
        result
    }

    pub fn loadings_by_type<'m>(&self, model: &'m Model, kind: LoadingType) -> Vec<&'m Loading> {
        self.loadings(model)
            .into_iter()
            .filter(|loading| loading.kind() == kind)
            .collect()
    }

    pub fn len(&self, model: &Model) -> usize {
        self.loadings(model).len()
    }

    pub fn is_empty(&self, model: &Model) -> bool {
        self.loadings(model).is_empty()
    }
}
