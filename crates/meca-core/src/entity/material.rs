//! Materials and their natures (elastic, orthotropic, rigid, ...).
//!
//! The IR stores the parameters as read from the source model. Blank
//! parameters are `None`; the elastic getters complete them with the
//! isotropic relation `E = 2 (1 + nu) G`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::NamedValue;
use super::{display_by_name, identifiable};
use crate::config::ModelConfiguration;
use crate::error::{ModelError, Result};
use crate::reference::{Identifiable, Identity, Reference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    Material,
}

impl MaterialType {
    pub fn name(self) -> &'static str {
        match self {
            MaterialType::Material => "MATERIAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NatureType {
    Elastic,
    Orthotropic,
    BilinearElastic,
    NonLinearElastic,
    Rigid,
}

impl NatureType {
    pub fn name(self) -> &'static str {
        match self {
            NatureType::Elastic => "NATURE ELASTIC",
            NatureType::Orthotropic => "NATURE ORTHOTROPIC",
            NatureType::BilinearElastic => "NATURE BILINEAR ELASTIC",
            NatureType::NonLinearElastic => "NATURE NONLINEAR ELASTIC",
            NatureType::Rigid => "NATURE RIGID",
        }
    }
}

display_by_name!(MaterialType, NatureType);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticNature {
    e: Option<f64>,
    nu: Option<f64>,
    g: Option<f64>,
    rho: Option<f64>,
    pub alpha: Option<f64>,
    pub tref: Option<f64>,
    pub ge: Option<f64>,
}

impl ElasticNature {
    /// Fails when Young's and shear moduli are both blank.
    pub fn new(e: Option<f64>, nu: Option<f64>, g: Option<f64>, rho: Option<f64>) -> Result<Self> {
        if e.is_none() && g.is_none() {
            return Err(ModelError::InvalidNature(
                "E and G may not both be blank".to_string(),
            ));
        }
        Ok(Self {
            e,
            nu,
            g,
            rho,
            alpha: None,
            tref: None,
            ge: None,
        })
    }

    pub fn e(&self) -> f64 {
        match (self.e, self.nu, self.g) {
            (Some(e), _, _) => e,
            (None, Some(nu), Some(g)) => 2.0 * (1.0 + nu) * g,
            _ => 0.0,
        }
    }

    pub fn nu(&self) -> f64 {
        match (self.e, self.nu, self.g) {
            (_, Some(nu), _) => nu,
            (Some(e), None, Some(g)) => e / (2.0 * g) - 1.0,
            _ => 0.0,
        }
    }

    pub fn g(&self) -> f64 {
        match (self.e, self.nu, self.g) {
            (_, _, Some(g)) => g,
            (Some(e), Some(nu), None) => e / (2.0 * (1.0 + nu)),
            _ => 0.0,
        }
    }

    /// Mass density, scaled when the model stores weight densities.
    pub fn rho(&self, config: &ModelConfiguration) -> f64 {
        let multiplier = config.parameters.mass_over_force_multiplier.unwrap_or(1.0);
        self.rho.map_or(0.0, |rho| rho * multiplier)
    }

    /// Density exactly as read.
    pub fn rho_as_force_density(&self) -> f64 {
        self.rho.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthotropicNature {
    pub e_longitudinal: f64,
    pub e_transverse: f64,
    pub nu_longitudinal_transverse: f64,
    pub g_longitudinal_transverse: f64,
    pub g_transverse_normal: Option<f64>,
    pub g_longitudinal_normal: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidNature {
    rigidity: Option<f64>,
    lagrangian: Option<f64>,
}

impl RigidNature {
    /// Fails when both parameters are blank.
    pub fn new(rigidity: Option<f64>, lagrangian: Option<f64>) -> Result<Self> {
        if rigidity.is_none() && lagrangian.is_none() {
            return Err(ModelError::InvalidNature(
                "rigidity and lagrangian may not both be blank".to_string(),
            ));
        }
        Ok(Self {
            rigidity,
            lagrangian,
        })
    }

    pub fn rigidity(&self) -> Option<f64> {
        self.rigidity
    }

    pub fn lagrangian(&self) -> Option<f64> {
        self.lagrangian
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Nature {
    Elastic(ElasticNature),
    Orthotropic(OrthotropicNature),
    BilinearElastic {
        elastic_limit: f64,
        secondary_slope: f64,
    },
    NonLinearElastic {
        stress_strain_function: Reference<NamedValue>,
    },
    Rigid(RigidNature),
}

impl Nature {
    pub fn nature_type(&self) -> NatureType {
        match self {
            Nature::Elastic(_) => NatureType::Elastic,
            Nature::Orthotropic(_) => NatureType::Orthotropic,
            Nature::BilinearElastic { .. } => NatureType::BilinearElastic,
            Nature::NonLinearElastic { .. } => NatureType::NonLinearElastic,
            Nature::Rigid(_) => NatureType::Rigid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub identity: Identity,
    natures: BTreeMap<NatureType, Nature>,
}

identifiable!(Material, MaterialType, "Material", |_this| MaterialType::Material);

impl Material {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            natures: BTreeMap::new(),
        }
    }

    /// Attach a nature; a material holds at most one nature per type.
    pub fn add_nature(&mut self, nature: Nature) -> Result<()> {
        let nature_type = nature.nature_type();
        if self.natures.contains_key(&nature_type) {
            return Err(ModelError::DuplicateNature {
                material: self.reference().to_string(),
                nature: nature_type.to_string(),
            });
        }
        self.natures.insert(nature_type, nature);
        Ok(())
    }

    pub fn find_nature(&self, nature_type: NatureType) -> Option<&Nature> {
        self.natures.get(&nature_type)
    }

    pub fn elastic(&self) -> Option<&ElasticNature> {
        match self.find_nature(NatureType::Elastic) {
            Some(Nature::Elastic(elastic)) => Some(elastic),
            _ => None,
        }
    }

    pub fn natures(&self) -> impl Iterator<Item = &Nature> {
        self.natures.values()
    }

    pub fn validate(&self) -> Result<()> {
        if self.natures.is_empty() {
            return Err(ModelError::InvalidNature(format!(
                "{} has no nature assigned",
                self.reference()
            )));
        }
        Ok(())
    }
}
