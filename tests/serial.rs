use globular_diagrams::serial::{self, Store, Tag};

use crate::theory;

#[test]
fn round_trip_a_diagram() {
    let signature = theory::signature();
    let diagram = theory::a_diagram(&signature);

    let store = serial::store(&diagram);
    assert_eq!(store.entries, store.index_to_stored.len());
    assert!(store.head < store.entries);

    let loaded = serial::load(&store).unwrap();
    assert_eq!(loaded, diagram);
    assert!(loaded.typecheck().is_ok());
}

#[test]
fn round_trip_a_generator() {
    let signature = theory::signature();
    let a = theory::generator(&signature, theory::A);

    let store = serial::store_generator(&a);
    let loaded = serial::load_generator(&store).unwrap();
    assert_eq!(loaded, a);
    assert_eq!(loaded.dimension(), 2);
    assert_eq!(loaded.source(), a.source());
}

/// Structurally equal subtrees share a single arena entry.
#[test]
fn flattening_deduplicates() {
    let signature = theory::signature();
    let stacked = theory::stacked_e(&signature);
    let store = serial::store(&stacked);

    // The two levels of the stack are identical, so the arena carries the
    // content entry once; in particular there are fewer generator entries
    // than generator mentions.
    let generator_entries = store
        .index_to_stored
        .iter()
        .filter(|(_, stored)| stored.t == Tag::G && !stored.a)
        .count();
    assert_eq!(generator_entries, 4); // x, y, p, e

    let content_entries: Vec<_> = store
        .index_to_stored
        .iter()
        .filter(|(_, stored)| stored.t == Tag::C && !stored.a)
        .collect();
    let unique: std::collections::HashSet<_> =
        content_entries.iter().map(|(_, stored)| stored).collect();
    assert_eq!(content_entries.len(), unique.len());
}

#[test]
fn missing_references_are_rejected() {
    let signature = theory::signature();
    let diagram = theory::p_diagram(&signature);
    let mut store = serial::store(&diagram);

    store.head = store.entries + 7;
    assert!(serial::load(&store).is_err());
}

#[test]
fn wire_format_survives_json() {
    let signature = theory::signature();
    let diagram = theory::stacked_e(&signature);

    let store = serial::store(&diagram);
    let encoded = serde_json::to_string(&store).unwrap();
    let decoded: Store = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, store);

    let loaded = serial::load(&decoded).unwrap();
    assert_eq!(loaded, diagram);
}
