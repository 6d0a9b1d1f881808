//! Entity identity and value-typed cross references.
//!
//! Every entity carries an [`Identity`]: the id it had in the source format
//! (if any) and the dense id the model assigned when it was added. Entities
//! point at each other through [`Reference`] values, which hold no link to
//! their target and must be resolved through [`crate::model::Model::find`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Dense id assigned by the model at insertion.
pub type EntityId = u32;

/// Id copied from the source format.
pub type OriginalId = u32;

/// A declared entity family with its closed set of type tags.
pub trait Family: 'static {
    type Kind: Copy
        + Eq
        + Ord
        + Hash
        + fmt::Debug
        + fmt::Display
        + Serialize
        + DeserializeOwned;

    /// Family name used in diagnostics and hashing.
    const NAME: &'static str;
}

/// Identity shared by every entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub original_id: Option<OriginalId>,
    pub id: Option<EntityId>,
}

impl Identity {
    /// Identity of an entity read from the source format.
    pub fn original(original_id: OriginalId) -> Self {
        Self {
            original_id: Some(original_id),
            id: None,
        }
    }

    /// Identity of an entity synthesized by the translator.
    pub fn synthesized() -> Self {
        Self::default()
    }

    /// Identity equality: original ids when both carry one, internal ids when
    /// neither does. Mixed pairs never match.
    pub fn same_as(&self, other: &Identity) -> bool {
        match (self.original_id, other.original_id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.id == other.id,
            _ => false,
        }
    }
}

/// An entity that lives in a [`crate::model::Model`] store.
pub trait Identifiable: Family + Sized {
    fn identity(&self) -> &Identity;

    fn identity_mut(&mut self) -> &mut Identity;

    fn kind(&self) -> Self::Kind;

    fn id(&self) -> Option<EntityId> {
        self.identity().id
    }

    fn original_id(&self) -> Option<OriginalId> {
        self.identity().original_id
    }

    fn reference(&self) -> Reference<Self> {
        Reference::new(self.kind(), self.original_id(), self.id())
    }

    /// Same declared kind and same identity.
    fn same_entity(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.identity().same_as(other.identity())
    }
}

/// Copyable handle naming an entity of family `T`.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Reference<T: Family> {
    pub kind: T::Kind,
    pub original_id: Option<OriginalId>,
    pub id: Option<EntityId>,
    #[serde(skip)]
    family: PhantomData<fn() -> T>,
}

impl<T: Family> Reference<T> {
    pub fn new(kind: T::Kind, original_id: Option<OriginalId>, id: Option<EntityId>) -> Self {
        Self {
            kind,
            original_id,
            id,
            family: PhantomData,
        }
    }

    /// Reference by source-format id, the way a parser names a forward target.
    pub fn original(kind: T::Kind, original_id: OriginalId) -> Self {
        Self::new(kind, Some(original_id), None)
    }

    /// Reference by model-assigned id.
    pub fn internal(kind: T::Kind, id: EntityId) -> Self {
        Self::new(kind, None, Some(id))
    }

    pub fn has_original_id(&self) -> bool {
        self.original_id.is_some()
    }

    pub fn identity(&self) -> Identity {
        Identity {
            original_id: self.original_id,
            id: self.id,
        }
    }
}

impl<T: Identifiable> From<&T> for Reference<T> {
    fn from(entity: &T) -> Self {
        entity.reference()
    }
}

impl<T: Family> Clone for Reference<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Family> Copy for Reference<T> {}

impl<T: Family> PartialEq for Reference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.identity().same_as(&other.identity())
    }
}

impl<T: Family> Eq for Reference<T> {}

impl<T: Family> PartialOrd for Reference<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Family> Ord for Reference<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| match (self.original_id, other.original_id) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => self.id.cmp(&other.id),
            })
    }
}

impl<T: Family> Hash for Reference<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        T::NAME.hash(state);
        self.kind.hash(state);
        self.original_id.hash(state);
        // Two equal references may disagree on id when original ids are set.
        if self.original_id.is_none() {
            self.id.hash(state);
        }
    }
}

impl<T: Family> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<T: Family> fmt::Display for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference<{}>[type={}; ", T::NAME, self.kind)?;
        match (self.original_id, self.id) {
            (Some(original_id), _) => write!(f, "original_id={original_id}]"),
            (None, Some(id)) => write!(f, "id={id}]"),
            (None, None) => write!(f, "id=none]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    use super::*;
    use crate::entity::constraint::{ConstraintSet, ConstraintSetType};
    use crate::entity::loading::{LoadSet, LoadSetType};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equal_original_ids_ignore_internal_ids() {
        let a = Reference::<ConstraintSet>::new(ConstraintSetType::Spc, Some(3), Some(10));
        let b = Reference::<ConstraintSet>::new(ConstraintSetType::Spc, Some(3), Some(42));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn kind_must_match() {
        let a = Reference::<ConstraintSet>::original(ConstraintSetType::Spc, 3);
        let b = Reference::<ConstraintSet>::original(ConstraintSetType::Mpc, 3);
        assert_ne!(a, b);
    }

    #[test]
    fn internal_ids_compare_without_original() {
        let a = Reference::<ConstraintSet>::internal(ConstraintSetType::Spc, 7);
        let b = Reference::<ConstraintSet>::internal(ConstraintSetType::Spc, 7);
        let c = Reference::<ConstraintSet>::new(ConstraintSetType::Spc, Some(1), Some(7));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ordering() {
        let mut refs = vec![
            Reference::<ConstraintSet>::internal(ConstraintSetType::Spc, 1),
            Reference::<ConstraintSet>::original(ConstraintSetType::Spc, 20),
            Reference::<ConstraintSet>::original(ConstraintSetType::Mpc, 1),
            Reference::<ConstraintSet>::original(ConstraintSetType::Spc, 5),
        ];
        refs.sort();
        let rendered: Vec<String> = refs.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "Reference<ConstraintSet>[type=SPC; original_id=5]",
                "Reference<ConstraintSet>[type=SPC; original_id=20]",
                "Reference<ConstraintSet>[type=SPC; id=1]",
                "Reference<ConstraintSet>[type=MPC; original_id=1]",
            ]
        );
    }

    #[test]
    fn families_hash_apart() {
        let constraint_set = Reference::<ConstraintSet>::original(ConstraintSetType::All, 1);
        let load_set = Reference::<LoadSet>::original(LoadSetType::All, 1);
        assert_ne!(hash_of(&constraint_set), hash_of(&load_set));
    }

    #[test]
    fn usable_as_set_key() {
        let mut seen = HashSet::new();
        seen.insert(Reference::<ConstraintSet>::new(ConstraintSetType::Spc, Some(3), Some(1)));
        assert!(seen.contains(&Reference::<ConstraintSet>::original(ConstraintSetType::Spc, 3)));
        assert!(!seen.contains(&Reference::<ConstraintSet>::internal(ConstraintSetType::Spc, 1)));
    }

    #[test]
    fn identity_same_as() {
        assert!(Identity::original(4).same_as(&Identity {
            original_id: Some(4),
            id: Some(99)
        }));
        assert!(!Identity::original(4).same_as(&Identity::synthesized()));
    }

    #[test]
    fn serde_round_trip() {
        let reference = Reference::<ConstraintSet>::new(ConstraintSetType::Spcd, Some(8), Some(2));
        let json = serde_json::to_string(&reference).unwrap();
        let back: Reference<ConstraintSet> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reference);
        assert_eq!(back.id, Some(2));
    }
}
