use globular_diagrams::monotone::{Bias, Monotone};

use proptest::collection::vec;
use proptest::prelude::*;

fn mono(values: &[usize], target: usize) -> Monotone {
    Monotone::new(values.to_vec(), target).unwrap()
}

/// A monotone with exactly `len` values into a small random target.
fn monotone_with_len(len: usize) -> impl Strategy<Value = Monotone> {
    (1usize..8).prop_flat_map(move |target| {
        vec(0..target, len..=len).prop_map(move |mut values| {
            values.sort_unstable();
            Monotone::new(values, target).unwrap()
        })
    })
}

fn parallel_pair() -> impl Strategy<Value = (Monotone, Monotone)> {
    (0usize..6).prop_flat_map(|len| (monotone_with_len(len), monotone_with_len(len)))
}

proptest! {
    // The defining pushout property: both legs agree after unification.
    #[test]
    fn unify_commutes((f, g) in parallel_pair()) {
        let unified = f.unify(&g, Some(Bias::Left)).unwrap();
        prop_assert_eq!(
            f.compose(&unified.first).unwrap(),
            g.compose(&unified.second).unwrap()
        );
    }

    #[test]
    fn unify_swap_symmetry((f, g) in parallel_pair()) {
        let left_right = f.unify(&g, Some(Bias::Right)).unwrap();
        let right_left = g.unify(&f, Some(Bias::Left)).unwrap();
        prop_assert_eq!(left_right.first, right_left.second);
        prop_assert_eq!(left_right.second, right_left.first);
    }

    // Unifying against the identity changes nothing: the pushout along an
    // identity leg is the other leg.
    #[test]
    fn unify_with_identity_is_trivial(f in (0usize..6).prop_flat_map(monotone_with_len)) {
        let identity = Monotone::identity(f.len());
        let unified = f.unify(&identity, None).unwrap();
        prop_assert_eq!(unified.first, Monotone::identity(f.target_size()));
        prop_assert_eq!(unified.second, f);
    }

    #[test]
    fn adjoint_is_monotone(f in (0usize..6).prop_flat_map(monotone_with_len)) {
        let adjoint = f.adjoint();
        prop_assert_eq!(adjoint.len(), f.target_size() + 1);
        prop_assert_eq!(adjoint.target_size(), f.len() + 1);
        prop_assert!(adjoint.values().windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn compose_requires_matching_sizes() {
    let f = mono(&[0, 1], 2);
    let g = mono(&[0], 1);
    assert!(f.compose(&g).is_err());
}

#[test]
fn unbiased_conflict_is_reported() {
    // Both sides must insert below the constrained position at once.
    let f = mono(&[1], 2);
    let g = mono(&[1], 3);
    assert!(f.unify(&g, None).is_err());
    assert!(f.unify(&g, Some(Bias::Left)).is_ok());
}
