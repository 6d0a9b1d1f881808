//! Model-wide translation parameters, loaded from TOML.
//!
//! ```toml
//! split_shared_boundaries = true
//!
//! [parameters]
//! lower_cutoff_frequency = 0.5
//! upper_cutoff_frequency = 250.0
//! mass_over_force_multiplier = 1.0e-3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Numeric parameters that override values read from the source model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_cutoff_frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_cutoff_frequency: Option<f64>,
    /// Factor applied to densities when the source uses weight units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_over_force_multiplier: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfiguration {
    /// When false, DOFs removed from a shared SPC are not carried over to the
    /// other analyses.
    #[serde(default = "default_split_shared_boundaries")]
    pub split_shared_boundaries: bool,
    #[serde(default)]
    pub parameters: ModelParameters,
}

fn default_split_shared_boundaries() -> bool {
    true
}

impl Default for ModelConfiguration {
    fn default() -> Self {
        Self {
            split_shared_boundaries: default_split_shared_boundaries(),
            parameters: ModelParameters::default(),
        }
    }
}

impl ModelConfiguration {
    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ModelError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: ModelConfiguration = toml::from_str(toml_str)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        let toml_str = toml::to_string_pretty(self)?;
        Ok(toml_str)
    }
}
