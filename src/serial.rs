//! Index-addressed arena serialization.
//!
//! Flattens a diagram's object graph into the persistence wire format: an
//! arena of entries addressed by index, with `{"_l": index}` standing in
//! for any field value that is itself a stored object, a type tag per
//! entry (`D`iagram, `C`ontent, `L`imit, component `I`, `G`enerator), and
//! structural-equality deduplication. Only entries reachable from `head`
//! are emitted, so garbage drops on save. Loading is two-phase: entries
//! are resolved by index on demand, with a cycle guard — the model is
//! acyclic by dimension, so a cycle always means a corrupted store.
//!
//! The external editor owns the actual transport; the wire structs here
//! carry serde derives so it can pick an encoding.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagram::{Content, Diagram};
use crate::generator::{Generator, GeneratorId};
use crate::limit::{HigherLimit, Limit, LimitComponent, Relabel};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Tag {
    D,
    C,
    L,
    I,
    G,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Reference {
        #[serde(rename = "_l")]
        index: usize,
    },
    Number(usize),
    List(Vec<Value>),
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Stored {
    pub f: BTreeMap<String, Value>,
    pub a: bool,
    pub n: usize,
    pub t: Tag,
}

/// The persisted arena. `head` addresses the root entry.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Store {
    pub head: usize,
    pub entries: usize,
    pub index_to_stored: Vec<(usize, Stored)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("reference to missing entry {0}")]
    MissingEntry(usize),

    #[error("cyclic reference through entry {0}")]
    CyclicReference(usize),

    #[error("entry {0} is malformed")]
    MalformedEntry(usize),
}

/// Flatten a diagram into a deduplicated arena.
pub fn store(diagram: &Diagram) -> Store {
    let mut flattener = Flattener::default();
    let head = flattener.diagram(diagram);
    flattener.into_store(head)
}

/// Flatten a generator, including its boundary diagrams.
pub fn store_generator(generator: &Generator) -> Store {
    let mut flattener = Flattener::default();
    let head = flattener.generator(generator);
    flattener.into_store(head)
}

/// Rebuild the diagram rooted at `store.head`.
pub fn load(store: &Store) -> Result<Diagram, LoadError> {
    Loader::new(store)?.diagram(store.head)
}

/// Rebuild the generator rooted at `store.head`.
pub fn load_generator(store: &Store) -> Result<Generator, LoadError> {
    Loader::new(store)?.generator(store.head)
}

#[derive(Default)]
struct Flattener {
    entries: Vec<Stored>,
    memo: HashMap<Stored, usize>,
}

fn reference(index: usize) -> Value {
    Value::Reference { index }
}

impl Flattener {
    fn into_store(self, head: usize) -> Store {
        Store {
            head,
            entries: self.entries.len(),
            index_to_stored: self.entries.into_iter().enumerate().collect(),
        }
    }

    fn intern(&mut self, stored: Stored) -> usize {
        if let Some(&index) = self.memo.get(&stored) {
            return index;
        }
        let index = self.entries.len();
        self.entries.push(stored.clone());
        self.memo.insert(stored, index);
        index
    }

    fn array(&mut self, values: Vec<Value>, t: Tag, n: usize) -> usize {
        let f = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect();
        self.intern(Stored {
            f,
            a: true,
            n,
            t,
        })
    }

    fn generator(&mut self, generator: &Generator) -> usize {
        let mut f = BTreeMap::new();
        f.insert("id".to_string(), Value::Number(generator.id().0));
        if let Some(source) = generator.source() {
            let index = self.diagram(source);
            f.insert("source".to_string(), reference(index));
        }
        if let Some(target) = generator.target() {
            let index = self.diagram(target);
            f.insert("target".to_string(), reference(index));
        }
        self.intern(Stored {
            f,
            a: false,
            n: generator.dimension(),
            t: Tag::G,
        })
    }

    fn diagram(&mut self, diagram: &Diagram) -> usize {
        let mut f = BTreeMap::new();
        match diagram {
            Diagram::Object(generator) => {
                let index = self.generator(generator);
                f.insert("generator".to_string(), reference(index));
            }
            Diagram::Composite(composite) => {
                let source = self.diagram(&composite.source);
                f.insert("source".to_string(), reference(source));
                let contents: Vec<Value> = composite
                    .data
                    .iter()
                    .map(|content| reference(self.content(content)))
                    .collect();
                let data = self.array(contents, Tag::C, diagram.dimension() - 1);
                f.insert("data".to_string(), reference(data));
            }
        }
        self.intern(Stored {
            f,
            a: false,
            n: diagram.dimension(),
            t: Tag::D,
        })
    }

    fn content(&mut self, content: &Content) -> usize {
        let forward = self.limit(&content.forward);
        let backward = self.limit(&content.backward);
        let mut f = BTreeMap::new();
        f.insert("forward".to_string(), reference(forward));
        f.insert("backward".to_string(), reference(backward));
        self.intern(Stored {
            f,
            a: false,
            n: content.dimension(),
            t: Tag::C,
        })
    }

    fn limit(&mut self, limit: &Limit) -> usize {
        let mut f = BTreeMap::new();
        match limit {
            Limit::Zero(None) => {}
            Limit::Zero(Some(relabel)) => {
                let source = self.generator(&relabel.source);
                let target = self.generator(&relabel.target);
                f.insert("source".to_string(), reference(source));
                f.insert("target".to_string(), reference(target));
            }
            Limit::Higher(h) => {
                let components: Vec<Value> = h
                    .components
                    .iter()
                    .map(|c| reference(self.component(c, h.n)))
                    .collect();
                let index = self.array(components, Tag::I, h.n);
                f.insert("components".to_string(), reference(index));
            }
        }
        self.intern(Stored {
            f,
            a: false,
            n: limit.dimension(),
            t: Tag::L,
        })
    }

    fn component(&mut self, component: &LimitComponent, n: usize) -> usize {
        let source_data: Vec<Value> = component
            .source_data
            .iter()
            .map(|content| reference(self.content(content)))
            .collect();
        let sublimits: Vec<Value> = component
            .sublimits
            .iter()
            .map(|sublimit| reference(self.limit(sublimit)))
            .collect();

        let mut f = BTreeMap::new();
        f.insert("first".to_string(), Value::Number(component.first));
        let source_data = self.array(source_data, Tag::C, n.saturating_sub(1));
        f.insert("source_data".to_string(), reference(source_data));
        let target_data = self.content(&component.target_data);
        f.insert("target_data".to_string(), reference(target_data));
        let sublimits = self.array(sublimits, Tag::L, n.saturating_sub(1));
        f.insert("sublimits".to_string(), reference(sublimits));
        self.intern(Stored {
            f,
            a: false,
            n,
            t: Tag::I,
        })
    }
}

struct Loader<'a> {
    entries: BTreeMap<usize, &'a Stored>,
    diagrams: BTreeMap<usize, Diagram>,
    generators: BTreeMap<usize, Generator>,
    contents: BTreeMap<usize, Content>,
    limits: BTreeMap<usize, Limit>,
    in_progress: BTreeSet<usize>,
}

impl<'a> Loader<'a> {
    fn new(store: &'a Store) -> Result<Self, LoadError> {
        let entries: BTreeMap<usize, &Stored> = store
            .index_to_stored
            .iter()
            .map(|(index, stored)| (*index, stored))
            .collect();
        if !entries.contains_key(&store.head) {
            return Err(LoadError::MissingEntry(store.head));
        }
        Ok(Loader {
            entries,
            diagrams: BTreeMap::new(),
            generators: BTreeMap::new(),
            contents: BTreeMap::new(),
            limits: BTreeMap::new(),
            in_progress: BTreeSet::new(),
        })
    }

    fn entry(&self, index: usize) -> Result<&'a Stored, LoadError> {
        self.entries
            .get(&index)
            .copied()
            .ok_or(LoadError::MissingEntry(index))
    }

    fn enter(&mut self, index: usize) -> Result<(), LoadError> {
        if !self.in_progress.insert(index) {
            return Err(LoadError::CyclicReference(index));
        }
        Ok(())
    }

    fn field_ref(stored: &Stored, key: &str, index: usize) -> Result<usize, LoadError> {
        match stored.f.get(key) {
            Some(Value::Reference { index }) => Ok(*index),
            _ => Err(LoadError::MalformedEntry(index)),
        }
    }

    fn array_refs(&self, index: usize) -> Result<Vec<usize>, LoadError> {
        let stored = self.entry(index)?;
        if !stored.a {
            return Err(LoadError::MalformedEntry(index));
        }
        (0..stored.f.len())
            .map(|i| Self::field_ref(stored, &i.to_string(), index))
            .collect()
    }

    fn generator(&mut self, index: usize) -> Result<Generator, LoadError> {
        if let Some(generator) = self.generators.get(&index) {
            return Ok(generator.clone());
        }
        self.enter(index)?;
        let stored = self.entry(index)?;
        if stored.t != Tag::G {
            return Err(LoadError::MalformedEntry(index));
        }
        let id = match stored.f.get("id") {
            Some(Value::Number(id)) => GeneratorId(*id),
            _ => return Err(LoadError::MalformedEntry(index)),
        };
        let generator = match (stored.f.get("source"), stored.f.get("target")) {
            (None, None) => Generator::new_base(id),
            (Some(_), Some(_)) => {
                let source = self.diagram(Self::field_ref(stored, "source", index)?)?;
                let target = self.diagram(Self::field_ref(stored, "target", index)?)?;
                Generator::new(id, source, target)
                    .map_err(|_| LoadError::MalformedEntry(index))?
            }
            _ => return Err(LoadError::MalformedEntry(index)),
        };
        self.in_progress.remove(&index);
        self.generators.insert(index, generator.clone());
        Ok(generator)
    }

    fn diagram(&mut self, index: usize) -> Result<Diagram, LoadError> {
        if let Some(diagram) = self.diagrams.get(&index) {
            return Ok(diagram.clone());
        }
        self.enter(index)?;
        let stored = self.entry(index)?;
        if stored.t != Tag::D {
            return Err(LoadError::MalformedEntry(index));
        }
        let diagram = if stored.f.contains_key("generator") {
            let generator = self.generator(Self::field_ref(stored, "generator", index)?)?;
            Diagram::Object(generator)
        } else {
            let source = self.diagram(Self::field_ref(stored, "source", index)?)?;
            let data = self
                .array_refs(Self::field_ref(stored, "data", index)?)?
                .into_iter()
                .map(|i| self.content(i))
                .collect::<Result<Vec<_>, _>>()?;
            Diagram::composite(source, data)
        };
        self.in_progress.remove(&index);
        self.diagrams.insert(index, diagram.clone());
        Ok(diagram)
    }

    fn content(&mut self, index: usize) -> Result<Content, LoadError> {
        if let Some(content) = self.contents.get(&index) {
            return Ok(content.clone());
        }
        self.enter(index)?;
        let stored = self.entry(index)?;
        if stored.t != Tag::C {
            return Err(LoadError::MalformedEntry(index));
        }
        let content = Content {
            forward: self.limit(Self::field_ref(stored, "forward", index)?)?,
            backward: self.limit(Self::field_ref(stored, "backward", index)?)?,
        };
        self.in_progress.remove(&index);
        self.contents.insert(index, content.clone());
        Ok(content)
    }

    fn limit(&mut self, index: usize) -> Result<Limit, LoadError> {
        if let Some(limit) = self.limits.get(&index) {
            return Ok(limit.clone());
        }
        self.enter(index)?;
        let stored = self.entry(index)?;
        if stored.t != Tag::L {
            return Err(LoadError::MalformedEntry(index));
        }
        let limit = if stored.n == 0 {
            match (stored.f.get("source"), stored.f.get("target")) {
                (None, None) => Limit::Zero(None),
                (Some(_), Some(_)) => {
                    let source = self.generator(Self::field_ref(stored, "source", index)?)?;
                    let target = self.generator(Self::field_ref(stored, "target", index)?)?;
                    Limit::Zero(Some(Relabel { source, target }))
                }
                _ => return Err(LoadError::MalformedEntry(index)),
            }
        } else {
            let components = self
                .array_refs(Self::field_ref(stored, "components", index)?)?
                .into_iter()
                .map(|i| self.component(i))
                .collect::<Result<Vec<_>, _>>()?;
            Limit::Higher(HigherLimit {
                n: stored.n,
                components,
            })
        };
        self.in_progress.remove(&index);
        self.limits.insert(index, limit.clone());
        Ok(limit)
    }

    fn component(&mut self, index: usize) -> Result<LimitComponent, LoadError> {
        self.enter(index)?;
        let stored = self.entry(index)?;
        if stored.t != Tag::I {
            return Err(LoadError::MalformedEntry(index));
        }
        let first = match stored.f.get("first") {
            Some(Value::Number(first)) => *first,
            _ => return Err(LoadError::MalformedEntry(index)),
        };
        let source_data = self
            .array_refs(Self::field_ref(stored, "source_data", index)?)?
            .into_iter()
            .map(|i| self.content(i))
            .collect::<Result<Vec<_>, _>>()?;
        let target_data = self.content(Self::field_ref(stored, "target_data", index)?)?;
        let sublimits = self
            .array_refs(Self::field_ref(stored, "sublimits", index)?)?
            .into_iter()
            .map(|i| self.limit(i))
            .collect::<Result<Vec<_>, _>>()?;
        self.in_progress.remove(&index);
        Ok(LimitComponent {
            first,
            source_data,
            target_data,
            sublimits,
        })
    }
}
