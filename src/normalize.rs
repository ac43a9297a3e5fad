//! Relative normalization: removal of vacuous singular levels.
//!
//! A level is *vacuous* when its content is recursively the identity and no
//! incoming limit maps anything into it — a vacuum bubble inserted between
//! two regular slices and since forgotten. [`Diagram::normalize_relative`]
//! removes every such level, returning the limit embedding the normalized
//! diagram back into the original together with limits factoring each of
//! the incoming maps through that embedding, so that contraction and
//! expansion can be defined relative to normalized boundaries without
//! losing the ability to express the original incoming maps.

use std::collections::BTreeMap;

use log::trace;

use crate::diagram::{Content, Diagram};
use crate::error::Error;
use crate::limit::{HigherLimit, Limit, LimitComponent};

/// The result of [`Diagram::normalize_relative`]: the normalized diagram,
/// the insertion limit `embedding : diagram → original`, and one factor per
/// incoming limit satisfying `incoming = factor ; embedding`.
#[derive(Clone, Debug)]
pub struct Normalization {
    pub diagram: Diagram,
    pub embedding: Limit,
    pub factors: Vec<Limit>,
}

impl Diagram {
    /// Normalize with no incoming maps to preserve.
    pub fn normalize(&self) -> Result<Diagram, Error> {
        Ok(self.normalize_relative(&[])?.diagram)
    }

    /// Remove all vacuous singular levels, recursively at every dimension,
    /// relative to the `incoming` limits targeting this diagram.
    ///
    /// A level survives if its factored content is not the identity pair,
    /// or if any incoming limit maps a source level into it; levels hit
    /// only by insertion components are dropped along with the insertions.
    pub fn normalize_relative(&self, incoming: &[Limit]) -> Result<Normalization, Error> {
        let Diagram::Composite(composite) = self else {
            return Ok(Normalization {
                diagram: self.clone(),
                embedding: Limit::identity(0),
                factors: incoming.to_vec(),
            });
        };

        let n = self.dimension();
        let size = composite.data.len();
        trace!("normalizing a {n}-diagram of size {size} against {} limits", incoming.len());

        for limit in incoming {
            if limit.dimension() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    found: limit.dimension(),
                });
            }
        }
        let monotones: Vec<_> = incoming
            .iter()
            .map(|l| l.monotone(l.source_size(size)))
            .collect();

        let slices = self.slices()?;

        // Per level: the factored content, the slice embedding, and the
        // factored sublimits of every incoming height that lands there.
        let mut contents = Vec::with_capacity(size);
        let mut embeddings = Vec::with_capacity(size);
        let mut removable = Vec::with_capacity(size);
        let mut job_factors: BTreeMap<(usize, usize), Limit> = BTreeMap::new();

        for h in 0..size {
            let jobs: Vec<(usize, usize)> = monotones
                .iter()
                .enumerate()
                .flat_map(|(i, m)| {
                    (0..m.len())
                        .filter(move |&k| m.apply(k) == h)
                        .map(move |k| (i, k))
                })
                .collect();

            let mut rec_incoming = vec![
                composite.data[h].forward.clone(),
                composite.data[h].backward.clone(),
            ];
            rec_incoming.extend(jobs.iter().map(|&(i, k)| incoming[i].sublimit(k)));

            let slice = &slices[2 * h + 1];
            let rec = slice.normalize_relative(&rec_incoming)?;

            let content = Content {
                forward: rec.factors[0].clone(),
                backward: rec.factors[1].clone(),
            };
            for (pos, &job) in jobs.iter().enumerate() {
                job_factors.insert(job, rec.factors[2 + pos].clone());
            }

            removable.push(content.is_vacuous() && jobs.is_empty());
            contents.push(content);
            embeddings.push(rec.embedding);
        }

        // kept_index[h] = position of level h in the normalized diagram;
        // meaningful only for surviving levels.
        let mut kept_index = Vec::with_capacity(size);
        let mut kept = 0;
        for h in 0..size {
            kept_index.push(kept);
            if !removable[h] {
                kept += 1;
            }
        }

        let mut embedding_components = Vec::new();
        let mut normalized_data = Vec::with_capacity(kept);
        for h in 0..size {
            if removable[h] {
                embedding_components.push(LimitComponent {
                    first: kept_index[h],
                    source_data: Vec::new(),
                    target_data: composite.data[h].clone(),
                    sublimits: Vec::new(),
                });
            } else {
                if !embeddings[h].is_identity() {
                    embedding_components.push(LimitComponent {
                        first: kept_index[h],
                        source_data: vec![contents[h].clone()],
                        target_data: composite.data[h].clone(),
                        sublimits: vec![embeddings[h].clone()],
                    });
                } else {
                    debug_assert_eq!(
                        contents[h], composite.data[h],
                        "identity slice embedding must fix the level"
                    );
                }
                normalized_data.push(contents[h].clone());
            }
        }

        let factors = incoming
            .iter()
            .enumerate()
            .map(|(i, limit)| {
                let mut components = Vec::new();
                for (index, component) in limit.components().iter().enumerate() {
                    let target = limit.component_target_height(index);
                    if removable[target] {
                        debug_assert!(
                            component.is_empty(),
                            "only insertions can hit a removed level"
                        );
                        continue;
                    }
                    let sublimits: Vec<Limit> = (component.first
                        ..component.first + component.len())
                        .map(|k| job_factors[&(i, k)].clone())
                        .collect();
                    let trivial = component.len() == 1
                        && sublimits[0].is_identity()
                        && component.source_data[0] == contents[target];
                    if trivial {
                        continue;
                    }
                    components.push(LimitComponent {
                        first: component.first,
                        source_data: component.source_data.clone(),
                        target_data: contents[target].clone(),
                        sublimits,
                    });
                }
                Limit::Higher(HigherLimit { n, components })
            })
            .collect();

        Ok(Normalization {
            diagram: Diagram::composite(composite.source.clone(), normalized_data),
            embedding: Limit::Higher(HigherLimit {
                n,
                components: embedding_components,
            }),
            factors,
        })
    }
}
