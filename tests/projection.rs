use globular_diagrams::prelude::*;

use crate::theory;

#[test]
fn points_cover_every_address() {
    let signature = theory::signature();
    let p = theory::p_diagram(&signature);

    let points: Vec<Vec<Height>> = points_of(&p, 1).unwrap().collect();
    assert_eq!(
        points,
        vec![
            vec![Height::Regular(0)],
            vec![Height::Singular(0)],
            vec![Height::Regular(1)],
        ]
    );

    // Projecting past the diagram dimension pads with the bottom height.
    let padded: Vec<Vec<Height>> = points_of(&p, 2).unwrap().collect();
    assert_eq!(padded.len(), 3);
    assert!(padded.iter().all(|point| point.len() == 2));
}

#[test]
fn edges_connect_regulars_to_singulars() {
    let signature = theory::signature();
    let p = theory::p_diagram(&signature);

    let edges: Vec<_> = edges_of(&p, 1).unwrap().collect();
    assert_eq!(edges.len(), 2);
    assert!(edges
        .iter()
        .all(|edge| edge.target == vec![Height::Singular(0)]));
    assert_eq!(edges[0].dir, 1);
    assert_eq!(edges[1].dir, -1);
}

#[test]
fn traversals_are_restartable() {
    let signature = theory::signature();
    let a = theory::a_diagram(&signature);

    let mut points = points_of(&a, 2).unwrap();
    let first_pass = points.by_ref().count();
    assert!(first_pass > 0);
    assert_eq!(points.next(), None);

    points.restart();
    assert_eq!(points.count(), first_pass);
}
