use globular_diagrams::prelude::*;

use crate::theory;

/// Attaching `g : x → y` to the 0-diagram `x` at the only interior point
/// yields a 1-diagram whose single singular slice has type `g`.
#[test]
fn attach_to_a_point() {
    let signature = theory::signature();
    let x = theory::object(&signature, theory::X);
    let g = theory::generator(&signature, theory::G);

    let attachment = attach(&x, &g, &BoundaryPath::interior(vec![])).unwrap();
    let diagram = attachment.diagram;

    assert_eq!(diagram.dimension(), 1);
    assert_eq!(diagram.size(), 1);
    assert_eq!(diagram.slice(Height::Regular(0)).unwrap(), x);
    assert_eq!(
        diagram.slice(Height::Singular(0)).unwrap(),
        theory::object(&signature, theory::G)
    );
    assert_eq!(
        diagram.target().unwrap(),
        theory::object(&signature, theory::Y)
    );
    assert!(diagram.typecheck().is_ok());
}

/// Sequentially attaching `f` at the source boundary and `h` at the target
/// boundary of `g`'s diagram yields the height-three composite
/// `w, f, x, g, y, h, z`.
#[test]
fn attach_at_both_boundaries() {
    let signature = theory::signature();
    let f = theory::generator(&signature, theory::F);
    let g = theory::generator(&signature, theory::G);
    let h = theory::generator(&signature, theory::H);

    let base = Diagram::from_generator(&g).unwrap();
    let with_f = attach(
        &base,
        &f,
        &BoundaryPath::at_boundary(Boundary::Source, 1, vec![]),
    )
    .unwrap()
    .diagram;
    let with_h = attach(
        &with_f,
        &h,
        &BoundaryPath::at_boundary(Boundary::Target, 1, vec![]),
    )
    .unwrap()
    .diagram;

    assert_eq!(with_h.size(), 3);
    let expected = [
        theory::W,
        theory::F,
        theory::X,
        theory::G,
        theory::Y,
        theory::H,
        theory::Z,
    ];
    let slices = with_h.slices().unwrap();
    for (slice, id) in slices.iter().zip(expected) {
        assert_eq!(slice.max_generator().id(), id);
    }
    assert!(with_h.typecheck().is_ok());
}

/// Whiskering: attaching `left : z → x` at depth two of `a`'s source
/// boundary changes only the dimension-one boundary, not the 2-cell.
#[test]
fn whiskering_at_depth_two() {
    let signature = theory::signature();
    let a = theory::a_diagram(&signature);
    let left = theory::generator(&signature, theory::LEFT);

    let whiskered = attach(
        &a,
        &left,
        &BoundaryPath::at_boundary(Boundary::Source, 2, vec![]),
    )
    .unwrap()
    .diagram;

    assert_eq!(whiskered.dimension(), 2);
    assert_eq!(whiskered.size(), 1);

    let bottom = [theory::Z, theory::LEFT, theory::X, theory::P, theory::Y];
    let slices = whiskered.slice(Height::Regular(0)).unwrap().slices().unwrap();
    for (slice, id) in slices.iter().zip(bottom) {
        assert_eq!(slice.max_generator().id(), id);
    }

    let top = [theory::Z, theory::LEFT, theory::X, theory::Q, theory::Y];
    let slices = whiskered.slice(Height::Regular(1)).unwrap().slices().unwrap();
    for (slice, id) in slices.iter().zip(top) {
        assert_eq!(slice.max_generator().id(), id);
    }

    assert!(whiskered.typecheck().is_ok());
}

/// The boundary path classifier distinguishes interior points from deep
/// boundary points.
#[test]
fn boundary_path_classification() {
    let signature = theory::signature();
    let a = theory::a_diagram(&signature);

    let interior = BoundaryPath::of(&a, &[Height::Singular(0)]).unwrap();
    assert_eq!(interior.boundary, None);
    assert_eq!(interior.depth, 0);

    let source = BoundaryPath::of(&a, &[Height::Regular(0)]).unwrap();
    assert_eq!(source.boundary, Some(Boundary::Source));
    assert_eq!(source.depth, 1);

    let deep = BoundaryPath::of(&a, &[Height::Regular(0), Height::Regular(0)]).unwrap();
    assert_eq!(deep.boundary, Some(Boundary::Source));
    assert_eq!(deep.depth, 2);

    let top = BoundaryPath::of(&a, &[Height::Regular(1), Height::Regular(1)]).unwrap();
    assert_eq!(top.boundary, Some(Boundary::Target));
    assert_eq!(top.depth, 2);
}

/// Option enumeration finds the interior match for a 2-cell and the
/// boundary matches for arrows.
#[test]
fn matches_enumeration() {
    let signature = theory::signature();
    let p = theory::p_diagram(&signature);
    let a = theory::generator(&signature, theory::A);
    let h = theory::generator(&signature, theory::H);
    let left = theory::generator(&signature, theory::LEFT);

    // `a : p ⇒ q` matches the interior of `p`'s diagram exactly once.
    let interior: Vec<BoundaryPath> = matches(&p, &a);
    assert_eq!(interior.len(), 1);
    assert_eq!(interior[0].boundary, None);

    // `h : y → z` only fits at the target boundary of `x —p→ y`.
    let at_target: Vec<BoundaryPath> = matches(&p, &h);
    assert_eq!(at_target.len(), 1);
    assert_eq!(at_target[0].boundary, Some(Boundary::Target));

    // `left : z → x` only fits at the source boundary.
    let at_source: Vec<BoundaryPath> = matches(&p, &left);
    assert_eq!(at_source.len(), 1);
    assert_eq!(at_source[0].boundary, Some(Boundary::Source));

    // Every enumerated option attaches successfully and typechecks.
    for (generator, options) in [(&a, &interior), (&h, &at_target), (&left, &at_source)] {
        for option in options.iter() {
            let attached = attach(&p, generator, option).unwrap();
            assert!(attached.diagram.typecheck().is_ok());
        }
    }
}

/// The table-driven entry point resolves generators by id.
#[test]
fn attach_through_the_signature() {
    let signature = theory::signature();
    let x = theory::object(&signature, theory::X);

    let attached =
        attach_generator(&signature, &x, theory::G, &BoundaryPath::interior(vec![])).unwrap();
    assert_eq!(attached.diagram.size(), 1);

    let missing = attach_generator(
        &signature,
        &x,
        GeneratorId(999),
        &BoundaryPath::interior(vec![]),
    );
    assert!(matches!(missing, Err(Error::UnknownGenerator(_))));
}

/// A mismatched boundary is reported, not silently ignored.
#[test]
fn mismatched_attachment_is_rejected() {
    let signature = theory::signature();
    let y = theory::object(&signature, theory::Y);
    let g = theory::generator(&signature, theory::G);

    // `g : x → y` cannot attach at the interior of the point `y`.
    let result = attach(&y, &g, &BoundaryPath::interior(vec![]));
    assert!(matches!(result, Err(Error::BoundaryMismatch)));
}
