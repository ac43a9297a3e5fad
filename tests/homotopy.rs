use globular_diagrams::prelude::*;

use crate::theory;

/// Contracting two stacked copies of `e : p ⇒ p` merges them into a single
/// level: the two cells become definitionally equal after the move.
#[test]
fn contract_stacked_cells() {
    let signature = theory::signature();
    let stacked = theory::stacked_e(&signature);
    assert_eq!(stacked.size(), 2);

    // The two singular slices agree before the move, and survive it.
    assert_eq!(
        stacked.slice(Height::Singular(0)).unwrap(),
        stacked.slice(Height::Singular(1)).unwrap()
    );

    let merged = stacked
        .contract(&[Height::Singular(0)], Some(Bias::Right))
        .unwrap();
    assert_eq!(merged.size(), 1);
    assert_eq!(
        merged.slice(Height::Singular(0)).unwrap(),
        stacked.slice(Height::Singular(0)).unwrap()
    );
    assert_eq!(merged.source(), stacked.source());
    assert_eq!(merged.target().unwrap(), stacked.target().unwrap());
    assert!(merged.typecheck().is_ok());
}

/// Distinct cell types of the same dimension meeting at a point cannot be
/// unified, and the conflict is reported as a distinguishable error.
#[test]
fn incompatible_cells_do_not_unify() {
    let signature = theory::signature();
    let a = theory::object(&signature, theory::A);
    let e = theory::object(&signature, theory::E);

    let result = multi_unify(
        &[
            UnificationUpper {
                diagram: a,
                bias_left: false,
            },
            UnificationUpper {
                diagram: e,
                bias_left: false,
            },
        ],
        &[],
    );
    assert!(matches!(result, Err(Error::IncompatibleTypes)));
}

/// Expanding a level trivially and contracting it back is the identity.
#[test]
fn expansion_then_contraction_is_identity() {
    let signature = theory::signature();
    let e = theory::generator(&signature, theory::E);
    let base = theory::p_diagram(&signature);
    let diagram = attach(&base, &e, &BoundaryPath::interior(vec![Height::Singular(0)]))
        .unwrap()
        .diagram;
    assert_eq!(diagram.size(), 1);

    // Split the single level at the top of its slice: everything stays in
    // the lower half, the upper half is vacuous.
    let location = [Height::Singular(0), Height::Singular(1)];
    let expanded = diagram.expand(&location, true).unwrap();
    assert_eq!(expanded.size(), 2);

    let contracted = expanded.contract(&[Height::Singular(0)], None).unwrap();
    assert_eq!(contracted, diagram);
    assert!(contracted.typecheck().is_ok());
}

/// The expansion limit contracts the expanded diagram back onto the
/// original at the level of induced monotones.
#[test]
fn expansion_limit_monotone() {
    let signature = theory::signature();
    let e = theory::generator(&signature, theory::E);
    let base = theory::p_diagram(&signature);
    let diagram = attach(&base, &e, &BoundaryPath::interior(vec![Height::Singular(0)]))
        .unwrap()
        .diagram;

    let location = [Height::Singular(0), Height::Singular(1)];
    let limit = diagram.expansion_limit(&location, true).unwrap();
    let monotone = limit.monotone(2);
    assert_eq!(monotone.values(), &[0, 0]);
    assert_eq!(monotone.target_size(), 1);
}

/// Both homotopy moves preserve the typechecking invariant.
#[test]
fn typecheck_closure_under_homotopies() {
    let signature = theory::signature();
    let stacked = theory::stacked_e(&signature);
    assert!(stacked.typecheck().is_ok());

    let merged = stacked.contract(&[Height::Singular(0)], None).unwrap();
    assert!(merged.typecheck().is_ok());

    let expanded = stacked
        .expand(&[Height::Singular(0), Height::Singular(1)], true)
        .unwrap();
    assert!(expanded.typecheck().is_ok());

    let expanded_down = stacked
        .expand(&[Height::Singular(0), Height::Singular(0)], false)
        .unwrap();
    assert!(expanded_down.typecheck().is_ok());
}

/// A deeper contraction lifts through the enclosing level.
#[test]
fn deep_contraction_location() {
    let signature = theory::signature();
    let stacked = theory::stacked_e(&signature);

    // Wrap the stack as an identity one dimension up, then contract the
    // inner pair through the boosted level: the boosted diagram has no
    // singular levels, so the location is rejected.
    let boosted = stacked.identity();
    let result = boosted.contraction_limit(&[Height::Singular(0)], None);
    assert!(result.is_err());
}
