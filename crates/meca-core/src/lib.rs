//! Format-independent intermediate representation of a finite-element model.
//!
//! A reader builds a [`Model`] through [`builder::ModelBuilder`], boundary
//! processing rewrites single-point constraints with
//! [`Model::remove_spc_node_dofs`], and emitters traverse the finished model
//! read-only.

pub mod builder;
pub mod config;
pub mod dof;
pub mod entity;
pub mod error;
pub mod mesh;
pub mod model;
pub mod numeric;
pub mod reference;
pub mod split;

pub use config::ModelConfiguration;
pub use dof::{Dof, DofCoefs, DofMatrix, Dofs};
pub use error::{ModelError, Result};
pub use model::Model;
pub use reference::{Identifiable, Identity, Reference};
pub use split::SplitOutcome;
