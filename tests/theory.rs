//! A small signature to test against: points `w, x, y, z`, arrows
//! `f : w → x`, `g : x → y`, `h : y → z`, a parallel pair
//! `p, q : x → y`, a 2-cell `a : p ⇒ q` between them, and an
//! endomorphism 2-cell `e : p ⇒ p`.

use globular_diagrams::prelude::*;

pub const W: GeneratorId = GeneratorId(0);
pub const X: GeneratorId = GeneratorId(1);
pub const Y: GeneratorId = GeneratorId(2);
pub const Z: GeneratorId = GeneratorId(3);
pub const F: GeneratorId = GeneratorId(4);
pub const G: GeneratorId = GeneratorId(5);
pub const H: GeneratorId = GeneratorId(6);
pub const P: GeneratorId = GeneratorId(7);
pub const Q: GeneratorId = GeneratorId(8);
pub const A: GeneratorId = GeneratorId(9);
pub const E: GeneratorId = GeneratorId(10);
pub const LEFT: GeneratorId = GeneratorId(11);

pub fn signature() -> Signature {
    let mut signature = Signature::new();

    let w = Generator::new_base(W);
    let x = Generator::new_base(X);
    let y = Generator::new_base(Y);
    let z = Generator::new_base(Z);
    for (point, name) in [(&w, "w"), (&x, "x"), (&y, "y"), (&z, "z")] {
        signature.insert(point.clone(), name, "#000000");
    }

    let arrow = |s: &Generator, t: &Generator, id: GeneratorId| {
        Generator::new(id, Diagram::object(s.clone()), Diagram::object(t.clone()))
            .expect("points are globular")
    };
    let f = arrow(&w, &x, F);
    let g = arrow(&x, &y, G);
    let h = arrow(&y, &z, H);
    let p = arrow(&x, &y, P);
    let q = arrow(&x, &y, Q);
    let left = arrow(&z, &x, LEFT);
    for (cell, name) in [(&f, "f"), (&g, "g"), (&h, "h"), (&p, "p"), (&q, "q"), (&left, "left")] {
        signature.insert(cell.clone(), name, "#3333cc");
    }

    let p_diagram = Diagram::from_generator(&p).expect("valid generator");
    let q_diagram = Diagram::from_generator(&q).expect("valid generator");
    let a = Generator::new(A, p_diagram.clone(), q_diagram).expect("p and q are parallel");
    let e = Generator::new(E, p_diagram.clone(), p_diagram).expect("p is parallel to itself");
    signature.insert(a, "a", "#cc3333");
    signature.insert(e, "e", "#33cc33");

    signature
}

pub fn generator(signature: &Signature, id: GeneratorId) -> Generator {
    signature.generator(id).expect("fixture generator").clone()
}

pub fn object(signature: &Signature, id: GeneratorId) -> Diagram {
    Diagram::object(generator(signature, id))
}

/// The 1-diagram `x —p→ y`.
pub fn p_diagram(signature: &Signature) -> Diagram {
    Diagram::from_generator(&generator(signature, P)).expect("valid generator")
}

/// The 2-diagram presenting `a : p ⇒ q`.
pub fn a_diagram(signature: &Signature) -> Diagram {
    Diagram::from_generator(&generator(signature, A)).expect("valid generator")
}

/// Two copies of `e : p ⇒ p` stacked on top of each other: attach `e` at
/// the interior of `x —p→ y`, then again at the target boundary.
pub fn stacked_e(signature: &Signature) -> Diagram {
    let e = generator(signature, E);
    let base = p_diagram(signature);

    let first = attach(&base, &e, &BoundaryPath::interior(vec![Height::Singular(0)]))
        .expect("e matches p");
    let second = attach(
        &first.diagram,
        &e,
        &BoundaryPath::at_boundary(Boundary::Target, 1, vec![Height::Singular(0)]),
    )
    .expect("e matches the target boundary");
    second.diagram
}
