//! Generators: the atomic, named cells of a signature.
//!
//! A generator of dimension `n > 0` is defined by a pair of `(n-1)`-diagrams,
//! its source and target boundaries; a generator of dimension `0` has no
//! boundaries. Generators are immutable, shared by reference everywhere, and
//! compared by their id alone.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::diagram::Diagram;
use crate::error::Error;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GeneratorId(pub usize);

#[derive(Clone)]
pub struct Generator {
    inner: Arc<GeneratorData>,
}

#[derive(Debug)]
struct GeneratorData {
    id: GeneratorId,
    n: usize,
    source: Option<Diagram>,
    target: Option<Diagram>,
}

impl Generator {
    /// A dimension-zero generator, with no boundaries.
    pub fn new_base(id: GeneratorId) -> Self {
        Generator {
            inner: Arc::new(GeneratorData {
                id,
                n: 0,
                source: None,
                target: None,
            }),
        }
    }

    /// A generator of dimension `source.dimension() + 1`.
    ///
    /// # Errors
    ///
    /// Fails when the boundaries have unequal dimensions, or when they are
    /// not globular: the source and target must themselves agree on their
    /// own source and target boundaries.
    pub fn new(id: GeneratorId, source: Diagram, target: Diagram) -> Result<Self, Error> {
        if source.dimension() != target.dimension() {
            return Err(Error::DimensionMismatch {
                expected: source.dimension(),
                found: target.dimension(),
            });
        }

        if source.dimension() > 0 {
            let globular = source.source() == target.source()
                && source.target()? == target.target()?;
            if !globular {
                return Err(Error::BoundaryMismatch);
            }
        }

        Ok(Generator {
            inner: Arc::new(GeneratorData {
                id,
                n: source.dimension() + 1,
                source: Some(source),
                target: Some(target),
            }),
        })
    }

    pub fn id(&self) -> GeneratorId {
        self.inner.id
    }

    pub fn dimension(&self) -> usize {
        self.inner.n
    }

    pub fn source(&self) -> Option<&Diagram> {
        self.inner.source.as_ref()
    }

    pub fn target(&self) -> Option<&Diagram> {
        self.inner.target.as_ref()
    }
}

// Identity is the id: a signature assigns each id exactly one boundary pair.
impl PartialEq for Generator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.id == other.inner.id
    }
}

impl Eq for Generator {}

impl Hash for Generator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("id", &self.inner.id)
            .field("n", &self.inner.n)
            .finish()
    }
}

/// One row of the signature table, as supplied by the editor.
#[derive(Clone, Debug)]
pub struct SignatureEntry {
    pub generator: Generator,
    pub name: String,
    pub color: String,
}

/// The generator table of a project.
#[derive(Clone, Debug, Default)]
pub struct Signature {
    entries: BTreeMap<GeneratorId, SignatureEntry>,
}

impl Signature {
    pub fn new() -> Self {
        Signature::default()
    }

    pub fn insert(&mut self, generator: Generator, name: impl Into<String>, color: impl Into<String>) {
        self.entries.insert(
            generator.id(),
            SignatureEntry {
                generator,
                name: name.into(),
                color: color.into(),
            },
        );
    }

    pub fn generator(&self, id: GeneratorId) -> Option<&Generator> {
        self.entries.get(&id).map(|e| &e.generator)
    }

    pub fn entry(&self, id: GeneratorId) -> Option<&SignatureEntry> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GeneratorId, &SignatureEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove a generator, cascading to every generator whose boundaries
    /// mention it. Returns the ids actually removed.
    pub fn remove(&mut self, id: GeneratorId) -> Vec<GeneratorId> {
        let mut removed = vec![id];
        self.entries.remove(&id);

        // A removal can invalidate higher cells, which invalidate higher
        // cells in turn; iterate until stable.
        loop {
            let stale: Vec<GeneratorId> = self
                .entries
                .iter()
                .filter(|(_, e)| {
                    removed.iter().any(|r| {
                        e.generator.source().is_some_and(|s| s.uses(*r))
                            || e.generator.target().is_some_and(|t| t.uses(*r))
                    })
                })
                .map(|(id, _)| *id)
                .collect();

            if stale.is_empty() {
                break;
            }
            for id in stale {
                self.entries.remove(&id);
                removed.push(id);
            }
        }

        removed
    }
}
