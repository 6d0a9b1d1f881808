//! The model registry: owns every entity of one translation run.
//!
//! Entities live in one arena per family, keyed by the dense id assigned at
//! insertion. Cross references are value-typed [`Reference`]s resolved through
//! [`Model::find`]; dangling references resolve to `None`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::config::ModelConfiguration;
use crate::entity::analysis::Analysis;
use crate::entity::constraint::{Constraint, ConstraintSet, ConstraintSetType};
use crate::entity::element::ElementSet;
use crate::entity::loading::{LoadSet, LoadSetType, Loading};
use crate::entity::material::Material;
use crate::entity::objective::Objective;
use crate::entity::target::{Target, TargetKind};
use crate::entity::value::NamedValue;
use crate::error::{ModelError, Result};
use crate::mesh::{Mesh, NodePosition};
use crate::reference::{EntityId, Identifiable, Identity, OriginalId, Reference};

/// Arena holding one entity family in declaration order.
#[derive(Debug, Clone)]
pub struct Store<T: Identifiable> {
    entities: HashMap<EntityId, T>,
    order: Vec<EntityId>,
    /// Index: (type tag, original id) -> entity id
    by_original_id: HashMap<(T::Kind, OriginalId), EntityId>,
}

impl<T: Identifiable> Default for Store<T> {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
            order: Vec::new(),
            by_original_id: HashMap::new(),
        }
    }
}

impl<T: Identifiable> Store<T> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    fn insert(&mut self, id: EntityId, entity: T) {
        if let Some(original_id) = entity.original_id() {
            self.by_original_id.insert((entity.kind(), original_id), id);
        }
        self.order.push(id);
        self.entities.insert(id, entity);
    }

    fn contains_original(&self, kind: T::Kind, original_id: OriginalId) -> bool {
        self.by_original_id.contains_key(&(kind, original_id))
    }

    /// Original id first, then internal id with a matching type tag.
    fn resolve(&self, reference: &Reference<T>) -> Option<EntityId> {
        if let Some(original_id) = reference.original_id {
            if let Some(id) = self.by_original_id.get(&(reference.kind, original_id)) {
                return Some(*id);
            }
        }
        reference.id.filter(|id| {
            self.entities.get(id).is_some_and(|entity| {
                entity.kind() == reference.kind
                    && entity
                        .original_id()
                        .map_or(true, |original_id| Some(original_id) == reference.original_id)
            })
        })
    }

    fn find(&self, reference: &Reference<T>) -> Option<&T> {
        self.resolve(reference).and_then(|id| self.entities.get(&id))
    }

    fn find_mut(&mut self, reference: &Reference<T>) -> Option<&mut T> {
        let id = self.resolve(reference)?;
        self.entities.get_mut(&id)
    }
}

/// An entity family stored in the [`Model`].
pub trait Stored: Identifiable {
    fn store(model: &Model) -> &Store<Self>;

    fn store_mut(model: &mut Model) -> &mut Store<Self>;
}

macro_rules! stored {
    ($($entity:ty => $field:ident),+ $(,)?) => {
        $(
            impl Stored for $entity {
                fn store(model: &Model) -> &Store<Self> {
                    &model.$field
                }

                fn store_mut(model: &mut Model) -> &mut Store<Self> {
                    &mut model.$field
                }
            }
        )+
    };
}

/// Registry of one finite-element model.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub mesh: Mesh,
    pub configuration: ModelConfiguration,
    next_id: EntityId,
    analyses: Store<Analysis>,
    constraints: Store<Constraint>,
    constraint_sets: Store<ConstraintSet>,
    loadings: Store<Loading>,
    load_sets: Store<LoadSet>,
    objectives: Store<Objective>,
    element_sets: Store<ElementSet>,
    materials: Store<Material>,
    values: Store<NamedValue>,
    targets: Store<Target>,
    /// Index: constraint set -> member constraints
    constraint_membership: BTreeMap<Reference<ConstraintSet>, Vec<Reference<Constraint>>>,
    /// Index: constraint -> sets holding it directly
    constraint_owners: BTreeMap<Reference<Constraint>, BTreeSet<Reference<ConstraintSet>>>,
    /// Index: load set -> member loadings
    loading_membership: BTreeMap<Reference<LoadSet>, Vec<Reference<Loading>>>,
    common_constraint_set: Option<Reference<ConstraintSet>>,
    common_load_set: Option<Reference<LoadSet>>,
}

stored!(
    Analysis => analyses,
    Constraint => constraints,
    ConstraintSet => constraint_sets,
    Loading => loadings,
    LoadSet => load_sets,
    Objective => objectives,
    ElementSet => element_sets,
    Material => materials,
    NamedValue => values,
    Target => targets,
);

/// Read-only dump of the finished graph.
#[derive(Serialize)]
struct ModelSnapshot<'a> {
    name: &'a str,
    configuration: &'a ModelConfiguration,
    mesh: &'a Mesh,
    analyses: Vec<&'a Analysis>,
    constraints: Vec<&'a Constraint>,
    constraint_sets: Vec<&'a ConstraintSet>,
    loadings: Vec<&'a Loading>,
    load_sets: Vec<&'a LoadSet>,
    objectives: Vec<&'a Objective>,
    element_sets: Vec<&'a ElementSet>,
    materials: Vec<&'a Material>,
    values: Vec<&'a NamedValue>,
    targets: Vec<&'a Target>,
    constraint_membership: Vec<(Reference<ConstraintSet>, &'a [Reference<Constraint>])>,
    loading_membership: Vec<(Reference<LoadSet>, &'a [Reference<Loading>])>,
    common_constraint_set: Option<Reference<ConstraintSet>>,
    common_load_set: Option<Reference<LoadSet>>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: Mesh::new(),
            configuration: ModelConfiguration::default(),
            next_id: 1,
            analyses: Store::default(),
            constraints: Store::default(),
            constraint_sets: Store::default(),
            loadings: Store::default(),
            load_sets: Store::default(),
            objectives: Store::default(),
            element_sets: Store::default(),
            materials: Store::default(),
            values: Store::default(),
            targets: Store::default(),
            constraint_membership: BTreeMap::new(),
            constraint_owners: BTreeMap::new(),
            loading_membership: BTreeMap::new(),
            common_constraint_set: None,
            common_load_set: None,
        }
    }

    pub fn with_configuration(mut self, configuration: ModelConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Store an entity under a fresh id and return a reference to it.
    ///
    /// Fails when another entity of the same family and type already carries
    /// the same original id.
    pub fn add<T: Stored>(&mut self, entity: T) -> Result<Reference<T>> {
        if let Some(original_id) = entity.original_id() {
            let kind = entity.kind();
            if T::store(self).contains_original(kind, original_id) {
                return Err(ModelError::DuplicateOriginalId {
                    family: T::NAME,
                    kind: kind.to_string(),
                    original_id,
                });
            }
        }
        Ok(self.insert(entity))
    }

    /// Store an entity created by the translator itself. Any original id is
    /// dropped so the insertion cannot collide.
    pub(crate) fn add_synthesized<T: Stored>(&mut self, mut entity: T) -> Reference<T> {
        entity.identity_mut().original_id = None;
        self.insert(entity)
    }

    fn insert<T: Stored>(&mut self, mut entity: T) -> Reference<T> {
        let id = self.next_id;
        self.next_id += 1;
        entity.identity_mut().id = Some(id);
        let reference = entity.reference();
        T::store_mut(self).insert(id, entity);
        reference
    }

    pub fn find<T: Stored>(&self, reference: &Reference<T>) -> Option<&T> {
        T::store(self).find(reference)
    }

    pub fn find_mut<T: Stored>(&mut self, reference: &Reference<T>) -> Option<&mut T> {
        T::store_mut(self).find_mut(reference)
    }

    /// Resolve a reference that must be present.
    pub fn require<T: Stored>(&self, reference: &Reference<T>) -> Result<&T> {
        self.find(reference)
            .ok_or_else(|| ModelError::missing(reference))
    }

    /// Every entity of a family in declaration order.
    pub fn entities<T: Stored>(&self) -> impl Iterator<Item = &T> {
        T::store(self).iter()
    }

    pub fn count<T: Stored>(&self) -> usize {
        T::store(self).len()
    }

    pub fn analyses(&self) -> impl Iterator<Item = &Analysis> {
        self.analyses.iter()
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn constraint_sets(&self) -> impl Iterator<Item = &ConstraintSet> {
        self.constraint_sets.iter()
    }

    pub fn loadings(&self) -> impl Iterator<Item = &Loading> {
        self.loadings.iter()
    }

    pub fn load_sets(&self) -> impl Iterator<Item = &LoadSet> {
        self.load_sets.iter()
    }

    pub fn objectives(&self) -> impl Iterator<Item = &Objective> {
        self.objectives.iter()
    }

    pub fn element_sets(&self) -> impl Iterator<Item = &ElementSet> {
        self.element_sets.iter()
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    /// The reference as stored on its target, or unchanged when dangling.
    fn canonical<T: Stored>(&self, reference: Reference<T>) -> Reference<T> {
        self.find(&reference)
            .map(Identifiable::reference)
            .unwrap_or(reference)
    }

    /// Record `constraint` as a member of `set`. Either side may still be a
    /// forward reference.
    pub fn add_constraint_into_constraint_set(
        &mut self,
        constraint: Reference<Constraint>,
        set: Reference<ConstraintSet>,
    ) {
        let constraint = self.canonical(constraint);
        let set = self.canonical(set);
        let members = self.constraint_membership.entry(set).or_default();
        if !members.contains(&constraint) {
            members.push(constraint);
        }
        self.constraint_owners.entry(constraint).or_default().insert(set);
    }

    pub fn add_loading_into_load_set(&mut self, loading: Reference<Loading>, set: Reference<LoadSet>) {
        let loading = self.canonical(loading);
        let set = self.canonical(set);
        let members = self.loading_membership.entry(set).or_default();
        if !members.contains(&loading) {
            members.push(loading);
        }
    }

    /// Direct members of `set` that resolve, in insertion order.
    pub fn constraints_by_constraint_set(&self, set: &Reference<ConstraintSet>) -> Vec<&Constraint> {
        let mut seen = BTreeSet::new();
        self.constraint_membership
            .get(&self.canonical(*set))
            .into_iter()
            .flatten()
            .filter_map(|member| self.find(member))
            .filter(|constraint| seen.insert(constraint.reference()))
            .collect()
    }

    /// Direct members of `set` that resolve, in insertion order.
    pub fn loadings_by_load_set(&self, set: &Reference<LoadSet>) -> Vec<&Loading> {
        let target = self.canonical(*set);
        let mut seen = BTreeSet::new();
        self.loading_membership
            .iter()
            .filter(|(key, _)| self.canonical(**key) == target)
            .flat_map(|(_, members)| members.iter())
            .filter_map(|member| self.find(member))
            .filter(|loading| seen.insert(loading.reference()))
            .collect()
    }

    /// Every set holding `constraint`, directly or through nesting.
    pub fn constraint_sets_by_constraint(
        &self,
        constraint: &Reference<Constraint>,
    ) -> BTreeSet<Reference<ConstraintSet>> {
        let mut owners = BTreeSet::new();
        let mut pending: Vec<Reference<ConstraintSet>> = self
            .constraint_owners
            .get(&self.canonical(*constraint))
            .into_iter()
            .flatten()
            .map(|set| self.canonical(*set))
            .collect();
        if pending.is_empty() {
            return owners;
        }

        // Index: nested set -> sets nesting it
        let mut parents: BTreeMap<Reference<ConstraintSet>, Vec<Reference<ConstraintSet>>> =
            BTreeMap::new();
        for set in self.constraint_sets.iter() {
            for nested in set.nested() {
                parents
                    .entry(self.canonical(*nested))
                    .or_default()
                    .push(set.reference());
            }
        }

        while let Some(set) = pending.pop() {
            if owners.insert(set) {
                if let Some(nesting) = parents.get(&set) {
                    pending.extend(nesting.iter().copied());
                }
            }
        }
        owners
    }

    pub fn common_constraint_set(&self) -> Option<Reference<ConstraintSet>> {
        self.common_constraint_set
    }

    pub fn common_load_set(&self) -> Option<Reference<LoadSet>> {
        self.common_load_set
    }

    /// Add a constraint to the set every analysis implicitly includes,
    /// creating that set on first use.
    pub fn add_into_common_constraint_set(
        &mut self,
        constraint: Reference<Constraint>,
    ) -> Reference<ConstraintSet> {
        let set = match self.common_constraint_set {
            Some(set) => set,
            None => {
                let set = self.add_synthesized(ConstraintSet::new(
                    Identity::synthesized(),
                    ConstraintSetType::All,
                ));
                self.common_constraint_set = Some(set);
                set
            }
        };
        self.add_constraint_into_constraint_set(constraint, set);
        set
    }

    /// Add a loading to the set every analysis implicitly includes,
    /// creating that set on first use.
    pub fn add_into_common_load_set(&mut self, loading: Reference<Loading>) -> Reference<LoadSet> {
        let set = match self.common_load_set {
            Some(set) => set,
            None => {
                let set = self.add_synthesized(LoadSet::new(Identity::synthesized(), LoadSetType::All));
                self.common_load_set = Some(set);
                set
            }
        };
        self.add_loading_into_load_set(loading, set);
        set
    }

    /// Drop a node from one constraint. Shared mesh groups and every other
    /// constraint are left as they are.
    pub fn remove_constraint_node(
        &mut self,
        constraint: &Reference<Constraint>,
        position: NodePosition,
    ) -> Result<()> {
        self.find_mut(constraint)
            .ok_or_else(|| ModelError::missing(constraint))?
            .remove_node(position)
    }

    /// Problems owned by the registry itself: undefined nodes, dangling set
    /// memberships and nesting, unresolved values and contact boundaries.
    pub fn registry_errors(&self) -> Vec<ModelError> {
        let mut errors = Vec::new();

        for node in self.mesh.reserved_nodes() {
            errors.push(ModelError::NodeNotFound(node.id));
        }

        for (set, members) in &self.constraint_membership {
            if self.find(set).is_none() {
                errors.push(ModelError::missing(set));
            }
            for member in members {
                if self.find(member).is_none() {
                    errors.push(ModelError::missing(member));
                }
            }
        }
        for (set, members) in &self.loading_membership {
            if self.find(set).is_none() {
                errors.push(ModelError::missing(set));
            }
            for member in members {
                if self.find(member).is_none() {
                    errors.push(ModelError::missing(member));
                }
            }
        }

        for set in self.constraint_sets.iter() {
            for nested in set.nested() {
                if self.find(nested).is_none() {
                    errors.push(ModelError::missing(nested));
                }
            }
        }
        for set in self.load_sets.iter() {
            for nested in set.nested() {
                if self.find(nested).is_none() {
                    errors.push(ModelError::missing(nested));
                }
            }
        }

        for objective in self.objectives.iter() {
            for value in objective.value_references() {
                if self.find(&value).is_none() {
                    errors.push(ModelError::missing(&value));
                }
            }
        }
        for target in self.targets.iter() {
            if let TargetKind::ContactBody { boundary } = &target.target {
                if self.find(boundary).is_none() {
                    errors.push(ModelError::missing(boundary));
                }
            }
        }
        errors
    }

    /// Check every reference in the model, gathering all problems.
    pub fn validate(&self) -> std::result::Result<(), Vec<ModelError>> {
        let mut errors = self.registry_errors();
        for constraint in self.constraints.iter() {
            if let Err(found) = constraint.validate(self) {
                errors.extend(found);
            }
        }
        for material in self.materials.iter() {
            if let Err(error) = material.validate() {
                errors.push(error);
            }
        }
        for element_set in self.element_sets.iter() {
            if let Err(found) = element_set.validate(self) {
                errors.extend(found);
            }
        }
        for analysis in self.analyses.iter() {
            if let Err(found) = analysis.validate(self) {
                errors.extend(found);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Pretty-printed JSON dump of the whole model.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = ModelSnapshot {
            name: &self.name,
            configuration: &self.configuration,
            mesh: &self.mesh,
            analyses: self.analyses.iter().collect(),
            constraints: self.constraints.iter().collect(),
            constraint_sets: self.constraint_sets.iter().collect(),
            loadings: self.loadings.iter().collect(),
            load_sets: self.load_sets.iter().collect(),
            objectives: self.objectives.iter().collect(),
            element_sets: self.element_sets.iter().collect(),
            materials: self.materials.iter().collect(),
            values: self.values.iter().collect(),
            targets: self.targets.iter().collect(),
            constraint_membership: self
                .constraint_membership
                .iter()
                .map(|(set, members)| (*set, members.as_slice()))
                .collect(),
            loading_membership: self
                .loading_membership
                .iter()
                .map(|(set, members)| (*set, members.as_slice()))
                .collect(),
            common_constraint_set: self.common_constraint_set,
            common_load_set: self.common_load_set,
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dof::Dofs;
    use crate::entity::analysis::AnalysisKind;
    use crate::entity::constraint::{ConstraintType, SinglePointConstraint};

    fn spc(original_id: u32) -> Constraint {
        Constraint::spc(
            Identity::original(original_id),
            SinglePointConstraint::with_dofs(Dofs::TRANSLATIONS, 0.0),
        )
    }

    #[test]
    fn ids_are_shared_across_families() {
        let mut model = Model::new("ids");
        let constraint = model.add(spc(1)).unwrap();
        let set = model
            .add(ConstraintSet::new(Identity::original(1), ConstraintSetType::Spc))
            .unwrap();
        assert_eq!(constraint.id, Some(1));
        assert_eq!(set.id, Some(2));
        assert_eq!(model.count::<Constraint>(), 1);
        assert_eq!(model.count::<ConstraintSet>(), 1);
    }

    #[test]
    fn duplicate_original_id_is_scoped_to_type() {
        let mut model = Model::new("dup");
        model
            .add(ConstraintSet::new(Identity::original(7), ConstraintSetType::Spc))
            .unwrap();
        let err = model
            .add(ConstraintSet::new(Identity::original(7), ConstraintSetType::Spc))
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::DuplicateOriginalId {
                family: "ConstraintSet",
                original_id: 7,
                ..
            }
        ));
        assert!(model
            .add(ConstraintSet::new(Identity::original(7), ConstraintSetType::Mpc))
            .is_ok());
        assert_eq!(model.count::<ConstraintSet>(), 2);
    }

    #[test]
    fn find_by_original_then_internal_id() {
        let mut model = Model::new("find");
        let stored = model.add(spc(5)).unwrap();
        assert!(model.find(&Reference::<Constraint>::original(ConstraintType::Spc, 5)).is_some());
        assert!(model
            .find(&Reference::<Constraint>::internal(ConstraintType::Spc, stored.id.unwrap()))
            .is_some());
        assert!(model.find(&Reference::<Constraint>::original(ConstraintType::Lmpc, 5)).is_none());
        assert!(model.find(&Reference::<Constraint>::original(ConstraintType::Spc, 6)).is_none());

        let synthesized = model.add_synthesized(spc(99));
        assert_eq!(synthesized.original_id, None);
        assert!(model.find(&synthesized).is_some());

        let err = model
            .require(&Reference::<Constraint>::original(ConstraintType::Spc, 42))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing reference: Reference<Constraint>[type=SPC; original_id=42]"
        );
    }

    #[test]
    fn membership_tolerates_forward_references() {
        let mut model = Model::new("forward");
        let set = Reference::<ConstraintSet>::original(ConstraintSetType::Spc, 3);
        let constraint = Reference::<Constraint>::original(ConstraintType::Spc, 1);
        model.add_constraint_into_constraint_set(constraint, set);
        model.add_constraint_into_constraint_set(constraint, set);
        assert!(model.constraints_by_constraint_set(&set).is_empty());
        assert!(model.validate().is_err());

        model.add(spc(1)).unwrap();
        model
            .add(ConstraintSet::new(Identity::original(3), ConstraintSetType::Spc))
            .unwrap();
        assert_eq!(model.constraints_by_constraint_set(&set).len(), 1);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn owning_sets_are_transitive() {
        let mut model = Model::new("owners");
        let constraint = model.add(spc(1)).unwrap();
        let inner = model
            .add(ConstraintSet::new(Identity::original(10), ConstraintSetType::Spc))
            .unwrap();
        let mut middle_set = ConstraintSet::new(Identity::original(11), ConstraintSetType::Spc);
        middle_set.add_nested(inner);
        let middle = model.add(middle_set).unwrap();
        let mut outer_set = ConstraintSet::new(Identity::original(12), ConstraintSetType::Spc);
        outer_set.add_nested(middle);
        let outer = model.add(outer_set).unwrap();
        let unrelated = model
            .add(ConstraintSet::new(Identity::original(13), ConstraintSetType::Spc))
            .unwrap();
        model.add_constraint_into_constraint_set(constraint, inner);

        let owners = model.constraint_sets_by_constraint(&constraint);
        assert_eq!(owners, BTreeSet::from([inner, middle, outer]));
        assert!(!owners.contains(&unrelated));
    }

    #[test]
    fn owner_index_accepts_forward_references() {
        let mut model = Model::new("forward");
        let pending_constraint = Reference::original(ConstraintType::Spc, 4);
        let pending_set = Reference::original(ConstraintSetType::Spc, 40);
        model.add_constraint_into_constraint_set(pending_constraint, pending_set);

        let constraint = model.add(spc(4)).unwrap();
        let set = model
            .add(ConstraintSet::new(Identity::original(40), ConstraintSetType::Spc))
            .unwrap();
        assert_eq!(model.constraint_sets_by_constraint(&constraint), BTreeSet::from([set]));
        assert_eq!(model.constraints_by_constraint_set(&set).len(), 1);
        assert!(model
            .constraint_sets_by_constraint(&Reference::original(ConstraintType::Spc, 5))
            .is_empty());
    }

    #[test]
    fn common_sets_are_created_once() {
        let mut model = Model::new("common");
        assert!(model.common_constraint_set().is_none());
        let first = model.add(spc(1)).unwrap();
        let second = model.add(spc(2)).unwrap();
        let set = model.add_into_common_constraint_set(first);
        assert_eq!(model.add_into_common_constraint_set(second), set);
        assert_eq!(model.common_constraint_set(), Some(set));
        assert_eq!(model.constraints_by_constraint_set(&set).len(), 2);
        assert_eq!(model.find(&set).unwrap().kind, ConstraintSetType::All);

        let loading = model
            .add(Loading::nodal_force(Identity::original(1), 0, [1.0, 0.0, 0.0]))
            .unwrap();
        let load_set = model.add_into_common_load_set(loading);
        assert_eq!(model.loadings_by_load_set(&load_set).len(), 1);
    }

    #[test]
    fn remove_node_from_group_scoped_spc() {
        let mut model = Model::new("group");
        let a = model.mesh.add_node(1, [0.0; 3]);
        let b = model.mesh.add_node(2, [1.0, 0.0, 0.0]);
        model.mesh.add_node_to_group("CLAMP", a);
        model.mesh.add_node_to_group("CLAMP", b);
        let mut scoped = SinglePointConstraint::on_group("CLAMP");
        scoped.set_dofs(Dofs::ALL, 0.0);
        let constraint = model
            .add(Constraint::spc(Identity::original(1), scoped))
            .unwrap();

        let mut rotations = SinglePointConstraint::on_group("CLAMP");
        rotations.set_dofs(Dofs::ROTATIONS, 0.0);
        let sibling = model
            .add(Constraint::spc(Identity::original(2), rotations))
            .unwrap();

        model.remove_constraint_node(&constraint, a).unwrap();
        let positions = model.require(&constraint).unwrap().node_positions(&model).unwrap();
        assert_eq!(positions, BTreeSet::from([b]));
        assert!(model.mesh.find_node_group("CLAMP").unwrap().contains(&a));
        let sibling_positions = model.require(&sibling).unwrap().node_positions(&model).unwrap();
        assert_eq!(sibling_positions, BTreeSet::from([a, b]));
    }

    #[test]
    fn analyses_keep_declaration_order() {
        let mut model = Model::new("order");
        for id in [3, 1, 2] {
            model
                .add(Analysis::new(Identity::original(id), AnalysisKind::LinearMecaStat))
                .unwrap();
        }
        let order: Vec<_> = model.analyses().filter_map(|a| a.original_id()).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn validate_reports_reserved_nodes() {
        let mut model = Model::new("nodes");
        model.mesh.find_or_reserve_node(17);
        let errors = model.validate().unwrap_err();
        assert!(matches!(errors[..], [ModelError::NodeNotFound(17)]));
    }

    #[test]
    fn json_snapshot() {
        let mut model = Model::new("snapshot");
        let constraint = model.add(spc(1)).unwrap();
        let set = model
            .add(ConstraintSet::new(Identity::original(2), ConstraintSetType::Spc))
            .unwrap();
        model.add_constraint_into_constraint_set(constraint, set);
        let json = model.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "snapshot");
        assert_eq!(value["constraints"].as_array().unwrap().len(), 1);
        assert_eq!(value["constraint_membership"].as_array().unwrap().len(), 1);
    }
}
