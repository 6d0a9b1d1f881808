//! Constraints and constraint sets.
//!
//! A constraint fixes or couples DOFs at a set of node positions. Sets group
//! constraints (by reference, through the model's membership index) and may
//! nest other sets.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::target::{Target, TargetType};
use super::value::NamedValue;
use super::{display_by_name, identifiable};
use crate::dof::{Dof, DofCoefs, Dofs};
use crate::error::{ModelError, Result};
use crate::mesh::{Mesh, NodePosition};
use crate::model::Model;
use crate::numeric::is_zero;
use crate::reference::{Identifiable, Identity, Reference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    QuasiRigid,
    Rigid,
    Spc,
    Rbe3,
    Gap,
    Lmpc,
    Slide,
    SurfaceContact,
    ZoneContact,
    SurfaceSlideContact,
}

impl ConstraintType {
    pub fn name(self) -> &'static str {
        match self {
            ConstraintType::QuasiRigid => "QUASI_RIGID",
            ConstraintType::Rigid => "RIGID",
            ConstraintType::Spc => "SPC",
            ConstraintType::Rbe3 => "RBE3",
            ConstraintType::Gap => "GAP",
            ConstraintType::Lmpc => "LMPC",
            ConstraintType::Slide => "SLIDE",
            ConstraintType::SurfaceContact => "SURFACE_CONTACT",
            ConstraintType::ZoneContact => "ZONE_CONTACT",
            ConstraintType::SurfaceSlideContact => "SURFACE_SLIDE_CONTACT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintSetType {
    Spc,
    Mpc,
    Spcd,
    Contact,
    /// The model-wide set merged into every analysis.
    All,
}

impl ConstraintSetType {
    pub fn name(self) -> &'static str {
        match self {
            ConstraintSetType::Spc => "SPC",
            ConstraintSetType::Mpc => "MPC",
            ConstraintSetType::Spcd => "SPCD",
            ConstraintSetType::Contact => "CONTACT",
            ConstraintSetType::All => "ALL",
        }
    }

    /// Set kinds that always carry single-point or multi-point conditions.
    pub fn is_spc_like(self) -> bool {
        matches!(
            self,
            ConstraintSetType::Spc | ConstraintSetType::Spcd | ConstraintSetType::Mpc
        )
    }
}

display_by_name!(ConstraintType, ConstraintSetType);

/// A prescribed DOF value: a literal or a reference to a named value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpcValue {
    Value(f64),
    Reference(Reference<NamedValue>),
}

impl From<f64> for SpcValue {
    fn from(value: f64) -> Self {
        SpcValue::Value(value)
    }
}

/// Prescribed values on up to six DOFs, applied to explicit nodes and,
/// optionally, every node of a mesh node group.
///
/// Group members dropped from this constraint are recorded in `excluded`;
/// the mesh group itself is shared and never edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SinglePointConstraint {
    values: [Option<SpcValue>; 6],
    node_positions: BTreeSet<NodePosition>,
    group: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    excluded: BTreeSet<NodePosition>,
}

impl SinglePointConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constraint scoped to the named mesh node group.
    pub fn on_group(name: impl Into<String>) -> Self {
        Self {
            group: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_dofs(dofs: Dofs, value: impl Into<SpcValue>) -> Self {
        let mut spc = Self::new();
        spc.set_dofs(dofs, value);
        spc
    }

    pub fn set_dof(&mut self, dof: Dof, value: impl Into<SpcValue>) {
        self.values[dof.position()] = Some(value.into());
    }

    pub fn set_dofs(&mut self, dofs: Dofs, value: impl Into<SpcValue>) {
        let value = value.into();
        for dof in dofs {
            self.values[dof.position()] = Some(value);
        }
    }

    pub fn add_node(&mut self, position: NodePosition) {
        self.excluded.remove(&position);
        self.node_positions.insert(position);
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn explicit_node_positions(&self) -> &BTreeSet<NodePosition> {
        &self.node_positions
    }

    /// Group members this constraint no longer covers.
    pub fn excluded_node_positions(&self) -> &BTreeSet<NodePosition> {
        &self.excluded
    }

    /// Explicit nodes plus the current members of the scoping group, minus
    /// the excluded ones.
    pub fn node_positions(&self, mesh: &Mesh) -> BTreeSet<NodePosition> {
        let mut positions = self.node_positions.clone();
        if let Some(group) = self.group.as_deref().and_then(|name| mesh.find_node_group(name)) {
            positions.extend(
                group
                    .iter()
                    .copied()
                    .filter(|position| !self.excluded.contains(position)),
            );
        }
        positions
    }

    /// DOFs carrying a prescribed value.
    pub fn dofs(&self) -> Dofs {
        Dof::ALL
            .into_iter()
            .filter(|dof| self.values[dof.position()].is_some())
            .collect()
    }

    pub fn value_for(&self, dof: Dof) -> Option<SpcValue> {
        self.values[dof.position()]
    }

    /// Literal value for `dof`; fails when the DOF is free or prescribed by reference.
    pub fn double_for(&self, dof: Dof) -> Result<f64> {
        match self.value_for(dof) {
            Some(SpcValue::Value(value)) => Ok(value),
            Some(SpcValue::Reference(reference)) => Err(ModelError::InvalidDofConfiguration(
                format!("{dof} is prescribed by {reference}, not by a value"),
            )),
            None => Err(ModelError::InvalidDofConfiguration(format!(
                "{dof} is free in this SPC"
            ))),
        }
    }

    pub fn has_references(&self) -> bool {
        self.values
            .iter()
            .any(|value| matches!(value, Some(SpcValue::Reference(_))))
    }

    fn remove_node(&mut self, position: NodePosition) {
        self.node_positions.remove(&position);
        if self.group.is_some() {
            self.excluded.insert(position);
        }
    }
}

/// `sum(coef * dof) = coef_impo` across several nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearMultiplePointConstraint {
    pub coef_impo: f64,
    coefs: BTreeMap<NodePosition, DofCoefs>,
}

impl LinearMultiplePointConstraint {
    pub fn new(coef_impo: f64) -> Self {
        Self {
            coef_impo,
            coefs: BTreeMap::new(),
        }
    }

    /// Add coefficients for a node, accumulating onto any previous ones.
    pub fn add_participation(&mut self, position: NodePosition, coefs: DofCoefs) {
        *self.coefs.entry(position).or_default() += coefs;
    }

    pub fn coefs_for_node(&self, position: NodePosition) -> DofCoefs {
        self.coefs.get(&position).copied().unwrap_or_default()
    }

    /// Node positions ordered by their coefficient vectors.
    pub fn sort_node_positions_by_coefs(&self) -> Vec<NodePosition> {
        let mut positions: Vec<NodePosition> = self.coefs.keys().copied().collect();
        positions.sort_by_key(|position| self.coefs[position]);
        positions
    }
}

/// One master node rigidly driving a set of slaves on `dofs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomogeneousConstraint {
    pub dofs: Dofs,
    pub master: Option<NodePosition>,
    pub slaves: BTreeSet<NodePosition>,
}

impl HomogeneousConstraint {
    pub fn new(dofs: Dofs, master: Option<NodePosition>) -> Self {
        Self {
            dofs,
            master,
            slaves: BTreeSet::new(),
        }
    }

    pub fn add_slave(&mut self, position: NodePosition) {
        self.slaves.insert(position);
    }

    pub fn require_master(&self) -> Result<NodePosition> {
        self.master.ok_or_else(|| {
            ModelError::UnsupportedFeature("automatic master resolution".to_string())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rbe3Slave {
    pub dofs: Dofs,
    pub coef: f64,
}

/// Interpolation element distributing the master's motion over weighted slaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rbe3 {
    pub master: NodePosition,
    pub master_dofs: Dofs,
    slaves: BTreeMap<NodePosition, Rbe3Slave>,
}

impl Rbe3 {
    pub fn new(master: NodePosition, master_dofs: Dofs) -> Self {
        Self {
            master,
            master_dofs,
            slaves: BTreeMap::new(),
        }
    }

    /// Add a slave; DOFs default to all six and the weight to one.
    pub fn add_slave(&mut self, position: NodePosition, dofs: Option<Dofs>, coef: Option<f64>) {
        self.slaves.insert(
            position,
            Rbe3Slave {
                dofs: dofs.unwrap_or(Dofs::ALL),
                coef: coef.unwrap_or(1.0),
            },
        );
    }

    pub fn slaves(&self) -> impl Iterator<Item = (NodePosition, Rbe3Slave)> + '_ {
        self.slaves.iter().map(|(position, slave)| (*position, *slave))
    }

    /// Weight of a node: one for the master, the slave coefficient otherwise.
    pub fn coef_for_node(&self, position: NodePosition) -> f64 {
        if position == self.master {
            1.0
        } else {
            self.slaves.get(&position).map_or(0.0, |slave| slave.coef)
        }
    }
}

/// Gaps whose direction runs from each constrained node to a direction node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapTwoNodes {
    pub initial_opening: f64,
    direction_nodes: BTreeMap<NodePosition, NodePosition>,
}

impl GapTwoNodes {
    pub fn new(initial_opening: f64) -> Self {
        Self {
            initial_opening,
            direction_nodes: BTreeMap::new(),
        }
    }

    pub fn add_gap(&mut self, constrained: NodePosition, direction_node: NodePosition) {
        self.direction_nodes.insert(constrained, direction_node);
    }

    pub fn direction(&self, mesh: &Mesh, constrained: NodePosition) -> Result<Option<[f64; 3]>> {
        let Some(direction_node) = self.direction_nodes.get(&constrained) else {
            return Ok(None);
        };
        let from = mesh.coords(constrained)?;
        let to = mesh.coords(*direction_node)?;
        Ok(Some([to[0] - from[0], to[1] - from[1], to[2] - from[2]]))
    }
}

/// Gaps with an explicit direction per constrained node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapNodeDirection {
    pub initial_opening: f64,
    directions: BTreeMap<NodePosition, [f64; 3]>,
}

impl GapNodeDirection {
    pub fn new(initial_opening: f64) -> Self {
        Self {
            initial_opening,
            directions: BTreeMap::new(),
        }
    }

    pub fn add_gap(&mut self, constrained: NodePosition, direction: [f64; 3]) {
        self.directions.insert(constrained, direction);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactPair {
    pub master: Reference<Target>,
    pub slave: Reference<Target>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideContact {
    pub friction: Option<SpcValue>,
    pub master: Reference<Target>,
    pub slave: Reference<Target>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Spc(SinglePointConstraint),
    Lmpc(LinearMultiplePointConstraint),
    Rigid(HomogeneousConstraint),
    QuasiRigid(HomogeneousConstraint),
    Rbe3(Rbe3),
    GapTwoNodes(GapTwoNodes),
    GapNodeDirection(GapNodeDirection),
    Slide(SlideContact),
    SurfaceContact(ContactPair),
    ZoneContact(ContactPair),
    SurfaceSlideContact(ContactPair),
}

impl ConstraintKind {
    pub fn tag(&self) -> ConstraintType {
        match self {
            ConstraintKind::Spc(_) => ConstraintType::Spc,
            ConstraintKind::Lmpc(_) => ConstraintType::Lmpc,
            ConstraintKind::Rigid(_) => ConstraintType::Rigid,
            ConstraintKind::QuasiRigid(_) => ConstraintType::QuasiRigid,
            ConstraintKind::Rbe3(_) => ConstraintType::Rbe3,
            ConstraintKind::GapTwoNodes(_) | ConstraintKind::GapNodeDirection(_) => {
                ConstraintType::Gap
            }
            ConstraintKind::Slide(_) => ConstraintType::Slide,
            ConstraintKind::SurfaceContact(_) => ConstraintType::SurfaceContact,
            ConstraintKind::ZoneContact(_) => ConstraintType::ZoneContact,
            ConstraintKind::SurfaceSlideContact(_) => ConstraintType::SurfaceSlideContact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub identity: Identity,
    pub constraint: ConstraintKind,
}

identifiable!(Constraint, ConstraintType, "Constraint", |this| this.constraint.tag());

/// DOFs along which a direction vector has a non-zero component.
fn translations_along(direction: [f64; 3]) -> Dofs {
    [Dof::Dx, Dof::Dy, Dof::Dz]
        .into_iter()
        .zip(direction)
        .filter(|(_, component)| !is_zero(*component))
        .map(|(dof, _)| dof)
        .collect()
}

impl Constraint {
    pub fn new(identity: Identity, constraint: ConstraintKind) -> Self {
        Self {
            identity,
            constraint,
        }
    }

    pub fn spc(identity: Identity, spc: SinglePointConstraint) -> Self {
        Self::new(identity, ConstraintKind::Spc(spc))
    }

    pub fn as_spc(&self) -> Option<&SinglePointConstraint> {
        match &self.constraint {
            ConstraintKind::Spc(spc) => Some(spc),
            _ => None,
        }
    }

    pub fn as_spc_mut(&mut self) -> Option<&mut SinglePointConstraint> {
        match &mut self.constraint {
            ConstraintKind::Spc(spc) => Some(spc),
            _ => None,
        }
    }

    /// Master and slave targets of a contact constraint.
    pub fn contact_targets(&self) -> Option<(Reference<Target>, Reference<Target>)> {
        match &self.constraint {
            ConstraintKind::Slide(slide) => Some((slide.master, slide.slave)),
            ConstraintKind::SurfaceContact(pair)
            | ConstraintKind::ZoneContact(pair)
            | ConstraintKind::SurfaceSlideContact(pair) => Some((pair.master, pair.slave)),
            _ => None,
        }
    }

    /// Target type each contact variant expects on both sides.
    fn expected_target_type(&self) -> Option<TargetType> {
        match &self.constraint {
            ConstraintKind::Slide(_) => Some(TargetType::BoundaryNodeLine),
            ConstraintKind::SurfaceContact(_) => Some(TargetType::BoundaryNodeSurface),
            ConstraintKind::ZoneContact(_) => Some(TargetType::ContactBody),
            ConstraintKind::SurfaceSlideContact(_) => Some(TargetType::BoundaryElementFace),
            _ => None,
        }
    }

    pub fn is_contact(&self) -> bool {
        matches!(
            self.constraint,
            ConstraintKind::GapTwoNodes(_)
                | ConstraintKind::GapNodeDirection(_)
                | ConstraintKind::Slide(_)
                | ConstraintKind::SurfaceContact(_)
                | ConstraintKind::ZoneContact(_)
                | ConstraintKind::SurfaceSlideContact(_)
        )
    }

    /// Quasi-rigid constraint acting on all six DOFs.
    pub fn is_completely_rigid(&self) -> bool {
        match &self.constraint {
            ConstraintKind::Rigid(_) => true,
            ConstraintKind::QuasiRigid(homogeneous) => homogeneous.dofs == Dofs::ALL,
            _ => false,
        }
    }

    /// Whether some prescribed value is a function of another entity.
    pub fn has_functions(&self) -> bool {
        match &self.constraint {
            ConstraintKind::Spc(spc) => spc.has_references(),
            ConstraintKind::Slide(slide) => matches!(slide.friction, Some(SpcValue::Reference(_))),
            _ => false,
        }
    }

    pub fn node_positions(&self, model: &Model) -> Result<BTreeSet<NodePosition>> {
        let positions = match &self.constraint {
            ConstraintKind::Spc(spc) => spc.node_positions(&model.mesh),
            ConstraintKind::Lmpc(lmpc) => lmpc.coefs.keys().copied().collect(),
            ConstraintKind::Rigid(homogeneous) | ConstraintKind::QuasiRigid(homogeneous) => homogeneous
                .master
                .into_iter()
                .chain(homogeneous.slaves.iter().copied())
                .collect(),
            ConstraintKind::Rbe3(rbe3) => std::iter::once(rbe3.master)
                .chain(rbe3.slaves.keys().copied())
                .collect(),
            ConstraintKind::GapTwoNodes(gap) => gap.direction_nodes.keys().copied().collect(),
            ConstraintKind::GapNodeDirection(gap) => gap.directions.keys().copied().collect(),
            ConstraintKind::Slide(_)
            | ConstraintKind::SurfaceContact(_)
            | ConstraintKind::ZoneContact(_)
            | ConstraintKind::SurfaceSlideContact(_) => {
                let mut positions = BTreeSet::new();
                if let Some((master, slave)) = self.contact_targets() {
                    positions.extend(model.require(&master)?.node_positions(model)?);
                    positions.extend(model.require(&slave)?.node_positions(model)?);
                }
                positions
            }
        };
        Ok(positions)
    }

    /// DOFs this constraint acts on at `position`; empty for non-members.
    pub fn dofs_for_node(&self, model: &Model, position: NodePosition) -> Result<Dofs> {
        let dofs = match &self.constraint {
            ConstraintKind::Spc(spc) => {
                if spc.node_positions(&model.mesh).contains(&position) {
                    spc.dofs()
                } else {
                    Dofs::NONE
                }
            }
            ConstraintKind::Lmpc(lmpc) => lmpc
                .coefs
                .get(&position)
                .map_or(Dofs::NONE, DofCoefs::dofs),
            ConstraintKind::Rigid(homogeneous) | ConstraintKind::QuasiRigid(homogeneous) => {
                if homogeneous.master == Some(position) || homogeneous.slaves.contains(&position) {
                    homogeneous.dofs
                } else {
                    Dofs::NONE
                }
            }
            ConstraintKind::Rbe3(rbe3) => {
                if position == rbe3.master {
                    rbe3.master_dofs
                } else {
                    rbe3.slaves.get(&position).map_or(Dofs::NONE, |slave| slave.dofs)
                }
            }
            ConstraintKind::GapTwoNodes(gap) => gap
                .direction(&model.mesh, position)?
                .map_or(Dofs::NONE, translations_along),
            ConstraintKind::GapNodeDirection(gap) => gap
                .directions
                .get(&position)
                .map_or(Dofs::NONE, |direction| translations_along(*direction)),
            ConstraintKind::Slide(_)
            | ConstraintKind::SurfaceContact(_)
            | ConstraintKind::ZoneContact(_)
            | ConstraintKind::SurfaceSlideContact(_) => {
                if self.node_positions(model)?.contains(&position) {
                    Dofs::TRANSLATIONS
                } else {
                    Dofs::NONE
                }
            }
        };
        Ok(dofs)
    }

    /// Drop a node from this constraint only. A group-scoped SPC excludes the
    /// node and leaves the mesh group alone.
    pub fn remove_node(&mut self, position: NodePosition) -> Result<()> {
        let kind = self.kind();
        match &mut self.constraint {
            ConstraintKind::Spc(spc) => spc.remove_node(position),
            ConstraintKind::Lmpc(lmpc) => {
                lmpc.coefs.remove(&position);
            }
            ConstraintKind::GapTwoNodes(gap) => {
                gap.direction_nodes.remove(&position);
            }
            ConstraintKind::GapNodeDirection(gap) => {
                gap.directions.remove(&position);
            }
            _ => {
                return Err(ModelError::UnsupportedFeature(format!(
                    "removing a node from a {kind} constraint"
                )))
            }
        }
        Ok(())
    }

    /// A constraint with no participating node must not be emitted.
    pub fn is_ineffective(&self, model: &Model) -> Result<bool> {
        match &self.constraint {
            ConstraintKind::Rigid(homogeneous) | ConstraintKind::QuasiRigid(homogeneous) => {
                Ok(homogeneous.master.is_none() && homogeneous.slaves.is_empty())
            }
            ConstraintKind::Slide(_)
            | ConstraintKind::SurfaceContact(_)
            | ConstraintKind::ZoneContact(_)
            | ConstraintKind::SurfaceSlideContact(_) => {
                let Some((master, slave)) = self.contact_targets() else {
                    return Ok(true);
                };
                Ok(model.require(&master)?.is_empty(model)? || model.require(&slave)?.is_empty(model)?)
            }
            _ => Ok(self.node_positions(model)?.is_empty()),
        }
    }

    /// Every referenced value and contact target resolves to the expected type.
    pub fn validate(&self, model: &Model) -> std::result::Result<(), Vec<ModelError>> {
        let mut errors = Vec::new();

        if let ConstraintKind::Spc(spc) = &self.constraint {
            for value in spc.values.iter().flatten() {
                if let SpcValue::Reference(reference) = value {
                    if model.find(reference).is_none() {
                        errors.push(ModelError::missing(reference));
                    }
                }
            }
        }
        if let ConstraintKind::Slide(SlideContact {
            friction: Some(SpcValue::Reference(reference)),
            ..
        }) = &self.constraint
        {
            if model.find(reference).is_none() {
                errors.push(ModelError::missing(reference));
            }
        }

        if let (Some((master, slave)), Some(expected)) =
            (self.contact_targets(), self.expected_target_type())
        {
            for target in [master, slave] {
                match model.find(&target) {
                    None => errors.push(ModelError::missing(&target)),
                    Some(found) if found.kind() != expected => {
                        errors.push(ModelError::UnsupportedFeature(format!(
                            "{} {} expects a {expected} target, found {}",
                            self.kind(),
                            self.reference(),
                            found.kind()
                        )))
                    }
                    Some(_) => {}
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A named group of constraints, optionally nesting other sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub identity: Identity,
    pub kind: ConstraintSetType,
    nested: Vec<Reference<ConstraintSet>>,
}

identifiable!(ConstraintSet, ConstraintSetType, "ConstraintSet", |this| this.kind);

impl ConstraintSet {
    pub fn new(identity: Identity, kind: ConstraintSetType) -> Self {
        Self {
            identity,
            kind,
            nested: Vec::new(),
        }
    }

    pub fn add_nested(&mut self, set: Reference<ConstraintSet>) {
        if !self.nested.contains(&set) {
            self.nested.push(set);
        }
    }

    pub fn nested(&self) -> &[Reference<ConstraintSet>] {
        &self.nested
    }

    /// Direct members plus the members of every nested set, each constraint
    /// once. Unresolved references are skipped.
    pub fn constraints<'m>(&self, model: &'m Model) -> Vec<&'m Constraint> {
        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut pending = vec![self.reference()];
        while let Some(set) = pending.pop() {
            if !visited.insert(set) {
                continue;
            }
            for constraint in model.constraints_by_constraint_set(&set) {
                if seen.insert(constraint.reference()) {
                    result.push(constraint);
                }
            }
            if let Some(found) = model.find(&set) {
                pending.extend(found.nested.iter().rev().copied());
            }
        }
        result
    }

    pub fn constraints_by_type<'m>(
        &self,
        model: &'m Model,
        kind: ConstraintType,
    ) -> Vec<&'m Constraint> {
        self.constraints(model)
            .into_iter()
            .filter(|constraint| constraint.kind() == kind)
            .collect()
    }

    pub fn len(&self, model: &Model) -> usize {
        self.constraints(model).len()
    }

    pub fn is_empty(&self, model: &Model) -> bool {
        self.constraints(model).is_empty()
    }

    pub fn has_functions(&self, model: &Model) -> bool {
        self.constraints(model)
            .iter()
            .any(|constraint| constraint.has_functions())
    }

    pub fn has_contacts(&self, model: &Model) -> bool {
        self.constraints(model)
            .iter()
            .any(|constraint| constraint.is_contact())
    }
}
