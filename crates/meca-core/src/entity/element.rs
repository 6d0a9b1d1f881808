//! Element sets: groups of cells sharing a physical description.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::material::{Material, MaterialType};
use super::{display_by_name, identifiable};
use crate::dof::{Dof, DofMatrix, Dofs};
use crate::error::{ModelError, Result};
use crate::mesh::NodePosition;
use crate::model::Model;
use crate::numeric::is_zero;
use crate::reference::{Identifiable, Identity, OriginalId, Reference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementSetType {
    Discrete0D,
    Discrete1D,
    NodalMass,
    CircularSectionBeam,
    RectangularSectionBeam,
    ISectionBeam,
    GenericSectionBeam,
    StructuralSegment,
    Shell,
    Continuum,
    StiffnessMatrix,
    MassMatrix,
    DampingMatrix,
    RigidSet,
    Rbar,
    Rbe3,
    Lmpc,
    ScalarSpring,
    Composite,
}

impl ElementSetType {
    pub fn name(self) -> &'static str {
        match self {
            ElementSetType::Discrete0D => "DISCRETE_0D",
            ElementSetType::Discrete1D => "DISCRETE_1D",
            ElementSetType::NodalMass => "NODAL_MASS",
            ElementSetType::CircularSectionBeam => "CIRCULAR_SECTION_BEAM",
            ElementSetType::RectangularSectionBeam => "RECTANGULAR_SECTION_BEAM",
            ElementSetType::ISectionBeam => "I_SECTION_BEAM",
            ElementSetType::GenericSectionBeam => "GENERIC_SECTION_BEAM",
            ElementSetType::StructuralSegment => "STRUCTURAL_SEGMENT",
            ElementSetType::Shell => "SHELL",
            ElementSetType::Continuum => "CONTINUUM",
            ElementSetType::StiffnessMatrix => "STIFFNESS_MATRIX",
            ElementSetType::MassMatrix => "MASS_MATRIX",
            ElementSetType::DampingMatrix => "DAMPING_MATRIX",
            ElementSetType::RigidSet => "RIGIDSET",
            ElementSetType::Rbar => "RBAR",
            ElementSetType::Rbe3 => "RBE3",
            ElementSetType::Lmpc => "LMPC",
            ElementSetType::ScalarSpring => "SCALAR_SPRING",
            ElementSetType::Composite => "COMPOSITE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelType {
    PlaneStress,
    PlaneStrain,
    Axisymmetric,
    Tridimensional,
    TridimensionalSi,
}

impl ModelType {
    pub fn name(self) -> &'static str {
        match self {
            ModelType::PlaneStress => "PLANE_STRESS",
            ModelType::PlaneStrain => "PLANE_STRAIN",
            ModelType::Axisymmetric => "AXISYMMETRIC",
            ModelType::Tridimensional => "TRIDIMENSIONAL",
            ModelType::TridimensionalSi => "TRIDIMENSIONAL_SI",
        }
    }

    pub fn is_planar(self) -> bool {
        matches!(
            self,
            ModelType::PlaneStress | ModelType::PlaneStrain | ModelType::Axisymmetric
        )
    }
}

display_by_name!(ElementSetType, ModelType);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamModel {
    #[default]
    Euler,
    Timoshenko,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BeamSection {
    Circular {
        radius: f64,
    },
    Rectangular {
        width: f64,
        height: f64,
    },
    ISection {
        upper_flange_width: f64,
        lower_flange_width: f64,
        upper_flange_thickness: f64,
        lower_flange_thickness: f64,
        beam_height: f64,
        web_thickness: f64,
    },
    Generic {
        area: f64,
        moment_of_inertia_y: f64,
        moment_of_inertia_z: f64,
        torsional_constant: f64,
    },
}

impl BeamSection {
    pub fn area(&self) -> f64 {
        match *self {
            BeamSection::Circular { radius } => PI * radius * radius,
            BeamSection::Rectangular { width, height } => width * height,
            BeamSection::ISection {
                upper_flange_width,
                lower_flange_width,
                upper_flange_thickness,
                lower_flange_thickness,
                beam_height,
                web_thickness,
            } => {
                upper_flange_width * upper_flange_thickness
                    + lower_flange_width * lower_flange_thickness
                    + web_thickness
                        * (beam_height - upper_flange_thickness - lower_flange_thickness)
            }
            BeamSection::Generic { area, .. } => area,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub model: BeamModel,
    pub section: BeamSection,
    /// Non-structural mass per unit length.
    pub additional_mass: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeLayer {
    pub material: Reference<Material>,
    pub thickness: f64,
    pub orientation: f64,
}

/// Stiffness, mass and damping couplings of a discrete element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteMatrices {
    pub stiffness: DofMatrix,
    pub mass: DofMatrix,
    pub damping: DofMatrix,
}

impl DiscreteMatrices {
    pub fn new(symmetric: bool) -> Self {
        Self {
            stiffness: DofMatrix::new(symmetric),
            mass: DofMatrix::new(symmetric),
            damping: DofMatrix::new(symmetric),
        }
    }

    pub fn dofs(&self) -> Dofs {
        self.stiffness.dofs() + self.mass.dofs() + self.damping.dofs()
    }

    pub fn has_translations(&self) -> bool {
        self.stiffness.has_translations()
            || self.mass.has_translations()
            || self.damping.has_translations()
    }

    pub fn has_rotations(&self) -> bool {
        self.stiffness.has_rotations() || self.mass.has_rotations() || self.damping.has_rotations()
    }
}

/// A matrix split into 6x6 blocks per node pair. Blocks are stored with the
/// lower position first; the transposed block answers the swapped query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixElement {
    blocks: BTreeMap<NodePosition, BTreeMap<NodePosition, DofMatrix>>,
}

impl MatrixElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(
        &mut self,
        row_node: NodePosition,
        row_dof: Dof,
        col_node: NodePosition,
        col_dof: Dof,
        value: f64,
    ) {
        let (row_node, row_dof, col_node, col_dof) = if row_node > col_node {
            (col_node, col_dof, row_node, row_dof)
        } else {
            (row_node, row_dof, col_node, col_dof)
        };
        self.blocks
            .entry(row_node)
            .or_default()
            .entry(col_node)
            .or_insert_with(|| DofMatrix::new(row_node == col_node))
            .add_component(row_dof, col_dof, value);
    }

    pub fn find_component(
        &self,
        row_node: NodePosition,
        row_dof: Dof,
        col_node: NodePosition,
        col_dof: Dof,
    ) -> f64 {
        let (row_node, row_dof, col_node, col_dof) = if row_node > col_node {
            (col_node, col_dof, row_node, row_dof)
        } else {
            (row_node, row_dof, col_node, col_dof)
        };
        self.blocks
            .get(&row_node)
            .and_then(|row| row.get(&col_node))
            .map_or(0.0, |block| block.find_component(row_dof, col_dof))
    }

    pub fn node_positions(&self) -> BTreeSet<NodePosition> {
        self.blocks
            .iter()
            .flat_map(|(row, cols)| std::iter::once(*row).chain(cols.keys().copied()))
            .collect()
    }

    /// DOFs of `position` touched by a non-zero component of any block.
    pub fn dofs_for_node(&self, position: NodePosition) -> Dofs {
        let mut dofs = Dofs::NONE;
        for (row, cols) in &self.blocks {
            for (col, block) in cols {
                for ((row_dof, col_dof), _) in block.components() {
                    if *row == position {
                        dofs += row_dof;
                    }
                    if *col == position {
                        dofs += col_dof;
                    }
                }
            }
        }
        dofs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Beam(Beam),
    Shell {
        thickness: f64,
        additional_mass: f64,
    },
    Composite {
        layers: Vec<CompositeLayer>,
    },
    Continuum,
    Discrete0D(DiscreteMatrices),
    Discrete1D(DiscreteMatrices),
    StructuralSegment(DiscreteMatrices),
    NodalMass {
        mass: f64,
        inertia: [f64; 6],
        offset: [f64; 3],
    },
    StiffnessMatrix(MatrixElement),
    MassMatrix(MatrixElement),
    DampingMatrix(MatrixElement),
    RigidSet {
        master: Option<NodePosition>,
    },
    Rbar {
        master: Option<NodePosition>,
    },
    Rbe3 {
        master: Option<NodePosition>,
    },
    Lmpc {
        dofs: Dofs,
    },
    ScalarSpring {
        stiffness: f64,
        damping: f64,
        dofs: BTreeMap<NodePosition, Dofs>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSet {
    pub identity: Identity,
    pub model_type: Option<ModelType>,
    pub material: Option<Reference<Material>>,
    node_positions: BTreeSet<NodePosition>,
    pub element: ElementKind,
}

identifiable!(ElementSet, ElementSetType, "ElementSet", |this| match &this.element {
    ElementKind::Beam(beam) => match beam.section {
        BeamSection::Circular { .. } => ElementSetType::CircularSectionBeam,
        BeamSection::Rectangular { .. } => ElementSetType::RectangularSectionBeam,
        BeamSection::ISection { .. } => ElementSetType::ISectionBeam,
        BeamSection::Generic { .. } => ElementSetType::GenericSectionBeam,
    },
    ElementKind::Shell { .. } => ElementSetType::Shell,
    ElementKind::Composite { .. } => ElementSetType::Composite,
    ElementKind::Continuum => ElementSetType::Continuum,
    ElementKind::Discrete0D(_) => ElementSetType::Discrete0D,
    ElementKind::Discrete1D(_) => ElementSetType::Discrete1D,
    ElementKind::StructuralSegment(_) => ElementSetType::StructuralSegment,
    ElementKind::NodalMass { .. } => ElementSetType::NodalMass,
    ElementKind::StiffnessMatrix(_) => ElementSetType::StiffnessMatrix,
    ElementKind::MassMatrix(_) => ElementSetType::MassMatrix,
    ElementKind::DampingMatrix(_) => ElementSetType::DampingMatrix,
    ElementKind::RigidSet { .. } => ElementSetType::RigidSet,
    ElementKind::Rbar { .. } => ElementSetType::Rbar,
    ElementKind::Rbe3 { .. } => ElementSetType::Rbe3,
    ElementKind::Lmpc { .. } => ElementSetType::Lmpc,
    ElementKind::ScalarSpring { .. } => ElementSetType::ScalarSpring,
});

impl ElementSet {
    pub fn new(identity: Identity, element: ElementKind) -> Self {
        Self {
            identity,
            model_type: None,
            material: None,
            node_positions: BTreeSet::new(),
            element,
        }
    }

    pub fn assign_material(&mut self, original_id: OriginalId) {
        self.material = Some(Reference::original(MaterialType::Material, original_id));
    }

    /// Record the nodes of a cell assigned to this set.
    pub fn add_node_positions(&mut self, positions: impl IntoIterator<Item = NodePosition>) {
        self.node_positions.extend(positions);
    }

    /// Add one spring DOF at a node of a scalar spring set.
    pub fn add_spring_dof(&mut self, position: NodePosition, dof: Dof) -> Result<()> {
        let kind = self.kind();
        match &mut self.element {
            ElementKind::ScalarSpring { dofs, .. } => {
                *dofs.entry(position).or_default() += dof;
                Ok(())
            }
            _ => Err(ModelError::UnsupportedFeature(format!(
                "spring DOFs on a {kind} element set"
            ))),
        }
    }

    /// Nodes of the assigned cells, plus the nodes named by matrix blocks.
    pub fn node_positions(&self) -> BTreeSet<NodePosition> {
        let mut positions = self.node_positions.clone();
        match &self.element {
            ElementKind::StiffnessMatrix(matrix)
            | ElementKind::MassMatrix(matrix)
            | ElementKind::DampingMatrix(matrix) => positions.extend(matrix.node_positions()),
            ElementKind::ScalarSpring { dofs, .. } => positions.extend(dofs.keys().copied()),
            _ => {}
        }
        positions
    }

    pub fn is_beam(&self) -> bool {
        matches!(self.element, ElementKind::Beam(_))
    }

    pub fn is_shell(&self) -> bool {
        matches!(self.element, ElementKind::Shell { .. })
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.element, ElementKind::Composite { .. })
    }

    pub fn is_discrete(&self) -> bool {
        matches!(
            self.element,
            ElementKind::Discrete0D(_)
                | ElementKind::Discrete1D(_)
                | ElementKind::StructuralSegment(_)
                | ElementKind::NodalMass { .. }
        )
    }

    pub fn is_matrix_element(&self) -> bool {
        matches!(
            self.element,
            ElementKind::StiffnessMatrix(_)
                | ElementKind::MassMatrix(_)
                | ElementKind::DampingMatrix(_)
        )
    }

    /// Element sets whose stiffness comes from a material law.
    pub fn requires_material(&self) -> bool {
        matches!(
            self.element,
            ElementKind::Beam(_) | ElementKind::Shell { .. } | ElementKind::Continuum
        )
    }

    /// Non-structural mass expressed as an extra density.
    pub fn additional_rho(&self) -> f64 {
        match &self.element {
            ElementKind::Beam(beam) => {
                let area = beam.section.area();
                if is_zero(area) {
                    0.0
                } else {
                    beam.additional_mass / area
                }
            }
            ElementKind::Shell {
                thickness,
                additional_mass,
            } if !is_zero(*thickness) => additional_mass / thickness,
            _ => 0.0,
        }
    }

    /// DOFs the elements of this set carry at `position`; empty for nodes
    /// outside the set.
    pub fn dofs_for_node(&self, position: NodePosition) -> Dofs {
        let member = self.node_positions.contains(&position);
        match &self.element {
            ElementKind::StiffnessMatrix(matrix)
            | ElementKind::MassMatrix(matrix)
            | ElementKind::DampingMatrix(matrix) => matrix.dofs_for_node(position),
            ElementKind::ScalarSpring { dofs, .. } => dofs.get(&position).copied().unwrap_or_default(),
            _ if !member => Dofs::NONE,
            ElementKind::Beam(_)
            | ElementKind::Shell { .. }
            | ElementKind::Composite { .. }
            | ElementKind::NodalMass { .. }
            | ElementKind::RigidSet { .. }
            | ElementKind::Rbar { .. }
            | ElementKind::Rbe3 { .. } => Dofs::ALL,
            ElementKind::Continuum => match self.model_type {
                Some(model_type) if model_type.is_planar() => Dofs::from(Dof::Dx) + Dof::Dy,
                _ => Dofs::TRANSLATIONS,
            },
            ElementKind::Discrete0D(matrices)
            | ElementKind::Discrete1D(matrices)
            | ElementKind::StructuralSegment(matrices) => {
                let mut dofs = Dofs::NONE;
                if matrices.has_translations() {
                    dofs += Dofs::TRANSLATIONS;
                }
                if matrices.has_rotations() {
                    dofs += Dofs::ROTATIONS;
                }
                dofs
            }
            ElementKind::Lmpc { dofs } => *dofs,
        }
    }

    /// Materials referenced by the set and by its composite layers.
    pub fn material_references(&self) -> Vec<Reference<Material>> {
        let mut references: Vec<Reference<Material>> = self.material.into_iter().collect();
        if let ElementKind::Composite { layers } = &self.element {
            references.extend(layers.iter().map(|layer| layer.material));
        }
        references
    }

    pub fn validate(&self, model: &Model) -> std::result::Result<(), Vec<ModelError>> {
        let mut errors = Vec::new();
        if self.requires_material() && self.material.is_none() {
            errors.push(ModelError::UnsupportedFeature(format!(
                "{} {} has no material assigned",
                self.kind(),
                self.reference()
            )));
        }
        for material in self.material_references() {
            if model.find(&material).is_none() {
                errors.push(ModelError::missing(&material));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::material::{ElasticNature, Nature};

    fn beam(section: BeamSection) -> ElementSet {
        ElementSet::new(
            Identity::original(1),
            ElementKind::Beam(Beam {
                model: BeamModel::Euler,
                section,
                additional_mass: 2.0,
            }),
        )
    }

    #[test]
    fn beam_type_follows_section() {
        let circular = beam(BeamSection::Circular { radius: 1.0 });
        assert_eq!(circular.kind(), ElementSetType::CircularSectionBeam);
        assert!((circular.additional_rho() - 2.0 / PI).abs() < 1e-12);

        let rectangular = beam(BeamSection::Rectangular {
            width: 2.0,
            height: 0.5,
        });
        assert_eq!(rectangular.kind(), ElementSetType::RectangularSectionBeam);
        assert_eq!(rectangular.additional_rho(), 2.0);
        assert!(rectangular.is_beam());
        assert!(rectangular.requires_material());
    }

    #[test]
    fn i_section_area() {
        let section = BeamSection::ISection {
            upper_flange_width: 10.0,
            lower_flange_width: 10.0,
            upper_flange_thickness: 1.0,
            lower_flange_thickness: 1.0,
            beam_height: 12.0,
            web_thickness: 0.5,
        };
        assert_eq!(section.area(), 25.0);
    }

    #[test]
    fn structural_dofs() {
        let mut shell = ElementSet::new(
            Identity::original(2),
            ElementKind::Shell {
                thickness: 0.01,
                additional_mass: 0.0,
            },
        );
        shell.add_node_positions([0, 1, 2]);
        assert_eq!(shell.dofs_for_node(1), Dofs::ALL);
        assert_eq!(shell.dofs_for_node(5), Dofs::NONE);

        let mut solid = ElementSet::new(Identity::original(3), ElementKind::Continuum);
        solid.add_node_positions([0, 1, 2, 3]);
        assert_eq!(solid.dofs_for_node(3), Dofs::TRANSLATIONS);
        solid.model_type = Some(ModelType::PlaneStrain);
        assert_eq!(solid.dofs_for_node(3), Dofs::from(Dof::Dx) + Dof::Dy);
    }

    #[test]
    fn discrete_dofs_follow_matrices() {
        let mut matrices = DiscreteMatrices::new(true);
        matrices.stiffness.add_component(Dof::Rz, Dof::Rz, 1e3);
        let mut spring = ElementSet::new(Identity::original(4), ElementKind::Discrete0D(matrices));
        spring.add_node_positions([7]);
        assert!(spring.is_discrete());
        assert_eq!(spring.dofs_for_node(7), Dofs::ROTATIONS);
        assert!(!spring.requires_material());
    }

    #[test]
    fn matrix_element_blocks() {
        let mut matrix = MatrixElement::new();
        matrix.add_component(3, Dof::Dx, 1, Dof::Ry, 5.0);
        matrix.add_component(1, Dof::Dz, 1, Dof::Dx, 2.0);
        assert_eq!(matrix.find_component(1, Dof::Ry, 3, Dof::Dx), 5.0);
        assert_eq!(matrix.find_component(3, Dof::Dx, 1, Dof::Ry), 5.0);
        assert_eq!(matrix.find_component(1, Dof::Dx, 1, Dof::Dz), 2.0);
        assert_eq!(matrix.dofs_for_node(1), Dofs::from(Dof::Dx) + Dof::Dz + Dof::Ry);
        assert_eq!(matrix.dofs_for_node(3), Dofs::from(Dof::Dx));

        let set = ElementSet::new(Identity::original(5), ElementKind::StiffnessMatrix(matrix));
        assert!(set.is_matrix_element());
        assert_eq!(set.node_positions(), BTreeSet::from([1, 3]));
    }

    #[test]
    fn scalar_spring_dofs() {
        let mut spring = ElementSet::new(
            Identity::original(6),
            ElementKind::ScalarSpring {
                stiffness: 10.0,
                damping: 0.0,
                dofs: BTreeMap::new(),
            },
        );
        spring.add_spring_dof(2, Dof::Dy).unwrap();
        spring.add_spring_dof(2, Dof::Rx).unwrap();
        assert_eq!(spring.dofs_for_node(2), Dofs::from(Dof::Dy) + Dof::Rx);
        assert_eq!(spring.node_positions(), BTreeSet::from([2]));

        let mut shell = ElementSet::new(
            Identity::original(7),
            ElementKind::Shell {
                thickness: 1.0,
                additional_mass: 0.0,
            },
        );
        assert!(shell.add_spring_dof(0, Dof::Dx).is_err());
    }

    #[test]
    fn validate_checks_materials() {
        let mut model = Model::new("elements");
        let mut steel = Material::new(Identity::original(1));
        steel
            .add_nature(Nature::Elastic(
                ElasticNature::new(Some(2.1e11), Some(0.3), None, Some(7800.0)).unwrap(),
            ))
            .unwrap();
        model.add(steel).unwrap();

        let mut unassigned = beam(BeamSection::Circular { radius: 0.1 });
        assert_eq!(unassigned.validate(&model).unwrap_err().len(), 1);
        unassigned.assign_material(1);
        assert!(unassigned.validate(&model).is_ok());

        let composite = ElementSet::new(
            Identity::original(8),
            ElementKind::Composite {
                layers: vec![
                    CompositeLayer {
                        material: Reference::original(MaterialType::Material, 1),
                        thickness: 0.001,
                        orientation: 0.0,
                    },
                    CompositeLayer {
                        material: Reference::original(MaterialType::Material, 2),
                        thickness: 0.001,
                        orientation: 90.0,
                    },
                ],
            },
        );
        let errors = composite.validate(&model).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_missing_reference());
    }
}
