//! Integration tests for SPC splitting and configuration loading.

use std::collections::BTreeSet;
use std::io::Write;

use meca_core::builder::ModelBuilder;
use meca_core::entity::analysis::Analysis;
use meca_core::entity::constraint::{
    Constraint, ConstraintSet, ConstraintSetType, SinglePointConstraint,
};
use meca_core::reference::{Identifiable, Identity};
use meca_core::{Dof, Dofs, Model, ModelConfiguration, ModelError, Reference};

struct Plate {
    model: Model,
    node: usize,
    spc: Reference<Constraint>,
    cs1: Reference<ConstraintSet>,
    a1: Reference<Analysis>,
    a2: Option<Reference<Analysis>>,
}

/// DX, DY, DZ fixed to 0.0 on node 7 through set CS1 of analysis A1.
fn plate(second_analysis: bool) -> Plate {
    let mut builder = ModelBuilder::new("plate");
    let spc = builder.spc(1, &[7], Dofs::TRANSLATIONS, 0.0).unwrap();
    let cs1 = builder.constraint_set(1, ConstraintSetType::Spc).unwrap();
    builder.add_constraint_into_set(spc, cs1);
    let node = builder.node(7, [0.0, 0.0, 0.0]);
    let a1 = builder.linear_static(1, "A1", &[cs1], &[]).unwrap();
    let a2 = second_analysis.then(|| builder.linear_static(2, "A2", &[cs1], &[]).unwrap());
    Plate {
        model: builder.build().unwrap(),
        node,
        spc,
        cs1,
        a1,
        a2,
    }
}

#[test]
fn single_analysis_keeps_dx_dz_in_cs1() {
    let Plate {
        mut model,
        node,
        spc,
        cs1,
        a1,
        ..
    } = plate(false);
    let sets_before = model.count::<ConstraintSet>();

    let outcome = model
        .remove_spc_node_dofs(&a1, &spc, node, Dofs::from(Dof::Dy))
        .unwrap();

    let remaining = model.require(&outcome.remaining_spc.unwrap()).unwrap();
    let single = remaining.as_spc().unwrap();
    assert_eq!(single.dofs(), Dofs::from(Dof::Dx) + Dof::Dz);
    assert_eq!(single.double_for(Dof::Dx).unwrap(), 0.0);
    assert_eq!(single.double_for(Dof::Dz).unwrap(), 0.0);
    assert_eq!(remaining.node_positions(&model).unwrap(), BTreeSet::from([node]));

    assert!(outcome.transferred.is_none());
    assert_eq!(model.count::<ConstraintSet>(), sets_before);
    assert!(model
        .constraints_by_constraint_set(&cs1)
        .iter()
        .any(|constraint| constraint.reference() == remaining.reference()));
    assert!(!model
        .require(&spc)
        .unwrap()
        .node_positions(&model)
        .unwrap()
        .contains(&node));

    // A1 still sees DX and DZ at the node, and nothing else
    let analysis = model.require(&a1).unwrap();
    let seen = analysis
        .constraints(&model)
        .iter()
        .map(|constraint| constraint.dofs_for_node(&model, node).unwrap())
        .fold(Dofs::NONE, |acc, dofs| acc + dofs);
    assert_eq!(seen, Dofs::from(Dof::Dx) + Dof::Dz);
}

#[test]
fn second_analysis_gains_dedicated_set_with_dy() {
    let Plate {
        mut model,
        node,
        spc,
        cs1,
        a1,
        a2,
    } = plate(true);
    let a2 = a2.unwrap();

    let outcome = model
        .remove_spc_node_dofs(&a1, &spc, node, Dofs::from(Dof::Dy))
        .unwrap();

    let (set, moved) = outcome.transferred.unwrap();
    assert_eq!(outcome.attached_to, vec![a2]);
    let members = model.constraints_by_constraint_set(&set);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].reference(), moved);
    let moved = model.require(&moved).unwrap();
    assert_eq!(moved.as_spc().unwrap().dofs(), Dofs::from(Dof::Dy));
    assert_eq!(moved.as_spc().unwrap().double_for(Dof::Dy).unwrap(), 0.0);
    assert_eq!(moved.node_positions(&model).unwrap(), BTreeSet::from([node]));

    let second = model.require(&a2).unwrap();
    assert_eq!(second.constraint_set_references(), &[cs1, set]);
    assert!(!model.require(&a1).unwrap().contains_constraint_set(&set));

    // Both analyses still see the full translation block at the node
    for analysis in [a1, a2] {
        let seen = model
            .require(&analysis)
            .unwrap()
            .constraints(&model)
            .iter()
            .map(|constraint| constraint.dofs_for_node(&model, node).unwrap())
            .fold(Dofs::NONE, |acc, dofs| acc + dofs);
        let expected = if analysis == a1 {
            Dofs::from(Dof::Dx) + Dof::Dz
        } else {
            Dofs::TRANSLATIONS
        };
        assert_eq!(seen, expected);
    }
}

/// DOFs every constraint reachable from `analysis` fixes at `node`.
fn dofs_seen(model: &Model, analysis: &Reference<Analysis>, node: usize) -> Dofs {
    model
        .require(analysis)
        .unwrap()
        .constraints(model)
        .iter()
        .map(|constraint| constraint.dofs_for_node(model, node).unwrap())
        .fold(Dofs::NONE, |acc, dofs| acc + dofs)
}

struct Clamp {
    model: Model,
    a: usize,
    b: usize,
    translations: Reference<Constraint>,
    rotations: Reference<Constraint>,
    a1: Reference<Analysis>,
    a2: Reference<Analysis>,
}

/// Translation and rotation SPCs both scoped to group CLAMP{a, b}, in CS1
/// shared by A1 and A2.
fn clamp() -> Clamp {
    let mut builder = ModelBuilder::new("clamp");
    let a = builder.node(1, [0.0, 0.0, 0.0]);
    let b = builder.node(2, [1.0, 0.0, 0.0]);
    builder.model_mut().mesh.add_node_to_group("CLAMP", a);
    builder.model_mut().mesh.add_node_to_group("CLAMP", b);

    let mut on_clamp = |original_id: u32, dofs: Dofs| {
        let mut spc = SinglePointConstraint::on_group("CLAMP");
        spc.set_dofs(dofs, 0.0);
        builder
            .add(Constraint::spc(Identity::original(original_id), spc))
            .unwrap()
    };
    let translations = on_clamp(1, Dofs::TRANSLATIONS);
    let rotations = on_clamp(2, Dofs::ROTATIONS);

    let cs1 = builder.constraint_set(1, ConstraintSetType::Spc).unwrap();
    builder.add_constraint_into_set(translations, cs1);
    builder.add_constraint_into_set(rotations, cs1);
    let a1 = builder.linear_static(1, "A1", &[cs1], &[]).unwrap();
    let a2 = builder.linear_static(2, "A2", &[cs1], &[]).unwrap();
    Clamp {
        model: builder.build().unwrap(),
        a,
        b,
        translations,
        rotations,
        a1,
        a2,
    }
}

#[test]
fn group_split_leaves_sibling_spc_alone() {
    let Clamp {
        mut model,
        a,
        b,
        translations,
        rotations,
        a1,
        a2,
    } = clamp();

    model
        .remove_spc_node_dofs(&a1, &translations, a, Dofs::from(Dof::Dy))
        .unwrap();

    let sibling = model.require(&rotations).unwrap();
    assert_eq!(sibling.node_positions(&model).unwrap(), BTreeSet::from([a, b]));
    let split = model.require(&translations).unwrap();
    assert_eq!(split.node_positions(&model).unwrap(), BTreeSet::from([b]));
    assert_eq!(
        model.mesh.find_node_group("CLAMP").unwrap(),
        &BTreeSet::from([a, b])
    );

    assert_eq!(dofs_seen(&model, &a1, a), Dofs::ALL - Dof::Dy);
    assert_eq!(dofs_seen(&model, &a1, b), Dofs::ALL);
    assert_eq!(dofs_seen(&model, &a2, a), Dofs::ALL);
    assert_eq!(dofs_seen(&model, &a2, b), Dofs::ALL);
}

#[test]
fn group_split_in_single_analysis() {
    let mut builder = ModelBuilder::new("group");
    let a = builder.node(1, [0.0, 0.0, 0.0]);
    let b = builder.node(2, [1.0, 0.0, 0.0]);
    builder.model_mut().mesh.add_node_to_group("BASE", a);
    builder.model_mut().mesh.add_node_to_group("BASE", b);
    let mut scoped = SinglePointConstraint::on_group("BASE");
    scoped.set_dofs(Dofs::ALL, 0.0);
    let spc = builder
        .add(Constraint::spc(Identity::original(1), scoped))
        .unwrap();
    let cs1 = builder.constraint_set(1, ConstraintSetType::Spc).unwrap();
    builder.add_constraint_into_set(spc, cs1);
    let a1 = builder.linear_static(1, "A1", &[cs1], &[]).unwrap();
    let mut model = builder.build().unwrap();

    let outcome = model
        .remove_spc_node_dofs(&a1, &spc, b, Dofs::ROTATIONS)
        .unwrap();

    assert!(outcome.transferred.is_none());
    let remaining = model.require(&outcome.remaining_spc.unwrap()).unwrap();
    assert_eq!(remaining.node_positions(&model).unwrap(), BTreeSet::from([b]));
    assert_eq!(
        model.require(&spc).unwrap().node_positions(&model).unwrap(),
        BTreeSet::from([a])
    );
    assert_eq!(model.mesh.find_node_group("BASE").unwrap().len(), 2);
    assert_eq!(dofs_seen(&model, &a1, a), Dofs::ALL);
    assert_eq!(dofs_seen(&model, &a1, b), Dofs::TRANSLATIONS);
    assert!(model.validate().is_ok());
}

#[test]
fn split_model_still_validates() {
    let Plate {
        mut model,
        node,
        spc,
        a1,
        ..
    } = plate(true);
    model
        .remove_spc_node_dofs(&a1, &spc, node, Dofs::from(Dof::Dz))
        .unwrap();
    assert!(model.validate().is_ok());
    let json = model.to_json().unwrap();
    assert!(json.contains("\"name\": \"plate\""));
}

#[test]
fn rejected_split_reports_invalid_dofs() {
    let Plate {
        mut model,
        node,
        spc,
        a1,
        ..
    } = plate(true);
    let err = model
        .remove_spc_node_dofs(&a1, &spc, node, Dofs::ROTATIONS)
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidDofConfiguration(_)));
    assert_eq!(model.count::<Constraint>(), 1);
}

#[test]
fn configuration_file_disables_transfer() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "split_shared_boundaries = false").unwrap();
    writeln!(file, "[parameters]").unwrap();
    writeln!(file, "upper_cutoff_frequency = 120.0").unwrap();
    let configuration = ModelConfiguration::load(file.path()).unwrap();
    assert!(!configuration.split_shared_boundaries);
    assert_eq!(configuration.parameters.upper_cutoff_frequency, Some(120.0));

    let Plate {
        model,
        node,
        spc,
        a1,
        ..
    } = plate(true);
    let mut model = model.with_configuration(configuration);
    let outcome = model
        .remove_spc_node_dofs(&a1, &spc, node, Dofs::from(Dof::Dx))
        .unwrap();
    assert!(outcome.transferred.is_none());
    assert!(outcome.attached_to.is_empty());
}

#[test]
fn missing_configuration_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ModelConfiguration::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ModelError::ConfigNotFound { .. }));
}
