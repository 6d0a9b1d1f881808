//! Error types for the model IR.

use std::path::PathBuf;

use crate::mesh::{NodeId, NodePosition};
use crate::reference::{Family, OriginalId, Reference};

/// Errors raised while building, rewriting, or validating a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("missing reference: {reference}")]
    MissingReference { reference: String },

    #[error("invalid DOF configuration: {0}")]
    InvalidDofConfiguration(String),

    #[error("duplicate original id {original_id} for {family} of type {kind}")]
    DuplicateOriginalId {
        family: &'static str,
        kind: String,
        original_id: OriginalId,
    },

    #[error("{material} already has a {nature} nature")]
    DuplicateNature { material: String, nature: String },

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("invalid nature: {0}")]
    InvalidNature(String),

    #[error("node id {0} not found in mesh")]
    NodeNotFound(NodeId),

    #[error("node position {0} not found in mesh")]
    NodePositionNotFound(NodePosition),

    #[error("configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Build a [`ModelError::MissingReference`] carrying the reference descriptor.
    pub fn missing<T: Family>(reference: &Reference<T>) -> Self {
        ModelError::MissingReference {
            reference: reference.to_string(),
        }
    }

    /// Whether this error is a dangling-reference problem (recoverable).
    pub fn is_missing_reference(&self) -> bool {
        matches!(self, ModelError::MissingReference { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::constraint::ConstraintSet;
    use crate::entity::constraint::ConstraintSetType;

    #[test]
    fn missing_reference_carries_descriptor() {
        let reference = Reference::<ConstraintSet>::original(ConstraintSetType::Spc, 12);
        let err = ModelError::missing(&reference);
        assert!(err.is_missing_reference());
        let text = err.to_string();
        assert!(text.contains("type=SPC"));
        assert!(text.contains("original_id=12"));
    }

    #[test]
    fn error_display() {
        let err = ModelError::InvalidDofConfiguration("digit 7".into());
        assert!(err.to_string().contains("digit 7"));
        let err = ModelError::DuplicateOriginalId {
            family: "Constraint",
            kind: "SPC".into(),
            original_id: 4,
        };
        assert_eq!(err.to_string(), "duplicate original id 4 for Constraint of type SPC");
    }
}
