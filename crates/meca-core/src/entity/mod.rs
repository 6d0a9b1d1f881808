//! Entity families stored in a [`crate::model::Model`].
//!
//! Each family is a closed sum type: a struct carrying the shared
//! [`Identity`](crate::reference::Identity) plus an enum of variants, with a
//! fieldless type-tag enum used by references and diagnostics.

/// Implement [`Family`](crate::reference::Family) and
/// [`Identifiable`](crate::reference::Identifiable) for an entity struct with
/// an `identity` field.
macro_rules! identifiable {
    ($entity:ident, $kind:ty, $name:literal, |$this:ident| $tag:expr) => {
        impl $crate::reference::Family for $entity {
            type Kind = $kind;
            const NAME: &'static str = $name;
        }

        impl $crate::reference::Identifiable for $entity {
            fn identity(&self) -> &$crate::reference::Identity {
                &self.identity
            }

            fn identity_mut(&mut self) -> &mut $crate::reference::Identity {
                &mut self.identity
            }

            fn kind(&self) -> $kind {
                let $this = self;
                $tag
            }
        }
    };
}

pub(crate) use identifiable;

/// Display a type-tag enum through its `name()` table.
macro_rules! display_by_name {
    ($($tag:ty),+ $(,)?) => {
        $(
            impl std::fmt::Display for $tag {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.name())
                }
            }
        )+
    };
}

pub(crate) use display_by_name;

pub mod analysis;
pub mod constraint;
pub mod element;
pub mod loading;
pub mod material;
pub mod objective;
pub mod target;
pub mod value;
