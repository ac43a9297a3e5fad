use globular_diagrams::prelude::*;

use crate::theory;

/// Flattening nested slice lookups equals a single combined lookup.
#[test]
fn slice_composition_law() {
    let signature = theory::signature();
    let diagram = theory::a_diagram(&signature);

    for outer_raw in 0..=2 * diagram.size() {
        let outer = Height::from_raw(outer_raw);
        let slice = diagram.slice(outer).unwrap();
        for inner_raw in 0..=2 * slice.size() {
            let inner = Height::from_raw(inner_raw);
            assert_eq!(
                slice.slice(inner).unwrap(),
                diagram.get_slice(&[outer, inner]).unwrap(),
            );
        }
    }
}

#[test]
fn source_and_target_are_the_extreme_slices() {
    let signature = theory::signature();
    let diagram = theory::p_diagram(&signature);

    assert_eq!(diagram.source(), diagram.slice(Height::Regular(0)).ok());
    assert_eq!(
        diagram.target().unwrap(),
        diagram.slice(Height::Regular(diagram.size())).unwrap()
    );
}

#[test]
fn restrict_keeps_the_right_levels() {
    let signature = theory::signature();
    let stacked = theory::stacked_e(&signature);
    assert_eq!(stacked.size(), 2);

    let upper = stacked.restrict(1..2).unwrap();
    assert_eq!(upper.size(), 1);
    assert_eq!(
        upper.source().unwrap(),
        stacked.slice(Height::Regular(1)).unwrap()
    );
    assert_eq!(
        upper.slice(Height::Singular(0)).unwrap(),
        stacked.slice(Height::Singular(1)).unwrap()
    );
}

#[test]
fn boost_and_behead() {
    let signature = theory::signature();
    let p = theory::p_diagram(&signature);

    let boosted = p.identity();
    assert_eq!(boosted.dimension(), 2);
    assert_eq!(boosted.size(), 0);
    assert_eq!(boosted.source().unwrap(), p);
    assert!(boosted.typecheck().is_ok());

    let stacked = theory::stacked_e(&signature);
    let beheaded = stacked.behead(1).unwrap();
    assert_eq!(beheaded.size(), 1);
    assert_eq!(
        beheaded.target().unwrap(),
        stacked.slice(Height::Regular(1)).unwrap()
    );
}

#[test]
fn uses_tracks_generators() {
    let signature = theory::signature();
    let a = theory::a_diagram(&signature);

    assert!(a.uses(theory::A));
    assert!(a.uses(theory::P));
    assert!(a.uses(theory::X));
    assert!(!a.uses(theory::F));
}

#[test]
fn max_generator_is_the_point_type() {
    let signature = theory::signature();
    let a = theory::a_diagram(&signature);
    assert_eq!(a.max_generator().id(), theory::A);
    assert_eq!(
        a.slice(Height::Regular(0)).unwrap().max_generator().id(),
        theory::P
    );
}

#[test]
fn vacuous_levels_normalize_away() {
    let signature = theory::signature();
    let p = theory::p_diagram(&signature);

    // Insert a vacuous level above `p` by hand.
    let vacuous = Content {
        forward: Limit::identity(0),
        backward: Limit::identity(0),
    };
    let mut data = p.data().unwrap().to_vec();
    data.push(vacuous.clone());
    let padded = Diagram::composite(p.source().unwrap(), data);
    assert!(padded.typecheck().is_ok());

    let normalization = padded.normalize_relative(&[]).unwrap();
    assert_eq!(normalization.diagram, p);

    // The embedding inserts the removed level back.
    assert_eq!(
        normalization
            .embedding
            .rewrite_forward(&normalization.diagram)
            .unwrap(),
        padded
    );
}

#[test]
fn normalization_respects_incoming_limits() {
    let signature = theory::signature();
    let p = theory::p_diagram(&signature);

    let vacuous = Content {
        forward: Limit::identity(0),
        backward: Limit::identity(0),
    };
    let mut data = p.data().unwrap().to_vec();
    data.push(vacuous);
    let padded = Diagram::composite(p.source().unwrap(), data);

    // An identity into the padded diagram pins every level.
    let identity = Limit::identity(1);
    let normalization = padded.normalize_relative(&[identity.clone()]).unwrap();
    assert_eq!(normalization.diagram, padded);
    assert_eq!(normalization.factors, vec![identity]);
}

#[test]
fn signature_removal_cascades() {
    let mut signature = theory::signature();
    let removed = signature.remove(theory::P);

    assert!(removed.contains(&theory::P));
    // Both 2-cells bound `p`, so they go with it.
    assert!(removed.contains(&theory::A));
    assert!(removed.contains(&theory::E));
    assert!(signature.generator(theory::Q).is_some());
}
