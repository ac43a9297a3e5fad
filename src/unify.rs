//! Multi-way unification of diagrams: the pushout underlying contraction.
//!
//! Given several "upper" diagrams and a set of "lower" compatibility
//! constraints — pairs of limits out of a shared diagram into two of the
//! uppers — [`multi_unify`] computes a single target diagram and one limit
//! per upper into it, making every constraint commute. At dimension zero
//! this degenerates to picking the unique maximal-dimension generator
//! present; at higher dimensions the height matching is delegated to
//! [`Monotone::multi_unify`] and the slices at each target height are
//! unified recursively, glued through the regular slices they share.

use std::collections::BTreeMap;

use crate::diagram::{Content, Diagram};
use crate::error::Error;
use crate::limit::{HigherLimit, Limit, LimitComponent};
use crate::monotone::{LowerConstraint, Monotone, UpperChain};

#[derive(Clone, Debug)]
pub struct UnificationUpper {
    pub diagram: Diagram,
    pub bias_left: bool,
}

#[derive(Clone, Debug)]
pub struct UnificationLower {
    pub source: Diagram,
    pub left_index: usize,
    pub left: Limit,
    pub right_index: usize,
    pub right: Limit,
}

#[derive(Clone, Debug)]
pub struct Unification {
    /// One limit per upper diagram, into `target`.
    pub limits: Vec<Limit>,
    pub target: Diagram,
}

pub fn multi_unify(
    uppers: &[UnificationUpper],
    lowers: &[UnificationLower],
) -> Result<Unification, Error> {
    let Some(first) = uppers.first() else {
        return Err(Error::MalformedPoint);
    };
    let n = first.diagram.dimension();
    for upper in uppers {
        if upper.diagram.dimension() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: upper.diagram.dimension(),
            });
        }
    }
    for lower in lowers {
        if lower.source.dimension() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: lower.source.dimension(),
            });
        }
    }

    if n == 0 {
        return unify_objects(uppers);
    }

    let chains: Vec<UpperChain> = uppers
        .iter()
        .map(|u| UpperChain {
            size: u.diagram.size(),
            bias_left: u.bias_left,
        })
        .collect();
    let constraints: Vec<LowerConstraint> = lowers
        .iter()
        .map(|l| LowerConstraint {
            left_index: l.left_index,
            left: l.left.monotone(l.source.size()),
            right_index: l.right_index,
            right: l.right.monotone(l.source.size()),
        })
        .collect();

    let monotones = Monotone::multi_unify(&chains, &constraints)?;
    let target_size = monotones.first().map_or(0, Monotone::target_size);

    let upper_slices: Vec<Vec<Diagram>> = uppers
        .iter()
        .map(|u| u.diagram.slices())
        .collect::<Result<_, _>>()?;

    let mut contents = Vec::with_capacity(target_size);
    let mut slice_limits: BTreeMap<(usize, usize), Limit> = BTreeMap::new();

    for t in 0..target_size {
        // Every upper's preimage of t is an interval of its heights.
        let involved: Vec<(usize, usize)> = monotones
            .iter()
            .enumerate()
            .flat_map(|(u, monotone)| {
                (0..monotone.len())
                    .filter(move |&h| monotone.apply(h) == t)
                    .map(move |h| (u, h))
            })
            .collect();
        debug_assert!(!involved.is_empty(), "orderless target height");

        let position: BTreeMap<(usize, usize), usize> = involved
            .iter()
            .enumerate()
            .map(|(pos, &pair)| (pair, pos))
            .collect();

        let rec_uppers: Vec<UnificationUpper> = involved
            .iter()
            .map(|&(u, h)| UnificationUpper {
                diagram: upper_slices[u][2 * h + 1].clone(),
                bias_left: uppers[u].bias_left,
            })
            .collect();

        let mut rec_lowers = Vec::new();
        // Adjacent levels of the same upper glue through the regular slice
        // between them.
        for pair in involved.windows(2) {
            let ((u1, h1), (u2, h2)) = (pair[0], pair[1]);
            if u1 != u2 || h2 != h1 + 1 {
                continue;
            }
            let data = uppers[u1].diagram.data().expect("positive dimension");
            rec_lowers.push(UnificationLower {
                source: upper_slices[u1][2 * h2].clone(),
                left_index: position[&(u1, h1)],
                left: data[h1].backward.clone(),
                right_index: position[&(u2, h2)],
                right: data[h2].forward.clone(),
            });
        }
        // Original lower constraints restrict to the slices they relate.
        for lower in lowers {
            let left_monotone = lower.left.monotone(lower.source.size());
            let right_monotone = lower.right.monotone(lower.source.size());
            for k in 0..lower.source.size() {
                let ha = left_monotone.apply(k);
                let hb = right_monotone.apply(k);
                if monotones[lower.left_index].apply(ha) != t {
                    continue;
                }
                debug_assert_eq!(
                    monotones[lower.right_index].apply(hb),
                    t,
                    "constraint endpoints must agree after unification"
                );
                rec_lowers.push(UnificationLower {
                    source: lower.source.slice(crate::height::Height::Singular(k))?,
                    left_index: position[&(lower.left_index, ha)],
                    left: lower.left.sublimit(k),
                    right_index: position[&(lower.right_index, hb)],
                    right: lower.right.sublimit(k),
                });
            }
        }

        let rec = multi_unify(&rec_uppers, &rec_lowers)?;
        for (&pair, &pos) in &position {
            slice_limits.insert(pair, rec.limits[pos].clone());
        }

        // The cospan of the unified level, read through the first involved
        // upper's first and last levels at this height.
        let (u0, h_first) = involved[0];
        let h_last = involved
            .iter()
            .filter(|&&(u, _)| u == u0)
            .map(|&(_, h)| h)
            .max()
            .expect("u0 is involved");
        let data = uppers[u0].diagram.data().expect("positive dimension");
        contents.push(Content {
            forward: data[h_first]
                .forward
                .compose(&slice_limits[&(u0, h_first)])?,
            backward: data[h_last]
                .backward
                .compose(&slice_limits[&(u0, h_last)])?,
        });
    }

    let mut limits = Vec::with_capacity(uppers.len());
    for (u, upper) in uppers.iter().enumerate() {
        let data = upper.diagram.data().expect("positive dimension");
        let mut components = Vec::new();
        for t in 0..target_size {
            // Values are sorted: the preimage of t is the interval between
            // these two counts.
            let lo = monotones[u].values().iter().filter(|&&v| v < t).count();
            let hi = monotones[u].values().iter().filter(|&&v| v <= t).count();

            if hi <= lo {
                // This upper skips the level entirely: insert it.
                components.push(LimitComponent {
                    first: lo,
                    source_data: Vec::new(),
                    target_data: contents[t].clone(),
                    sublimits: Vec::new(),
                });
                continue;
            }
            let trivial = hi - lo == 1
                && slice_limits[&(u, lo)].is_identity()
                && data[lo] == contents[t];
            if trivial {
                continue;
            }
            components.push(LimitComponent {
                first: lo,
                source_data: data[lo..hi].to_vec(),
                target_data: contents[t].clone(),
                sublimits: (lo..hi).map(|h| slice_limits[&(u, h)].clone()).collect(),
            });
        }
        limits.push(Limit::Higher(HigherLimit { n, components }));
    }

    let source = first.diagram.source().expect("positive dimension");
    debug_assert!(
        uppers
            .iter()
            .all(|u| u.diagram.source().as_ref() == Some(&source)),
        "unified diagrams must share a source"
    );

    Ok(Unification {
        limits,
        target: Diagram::composite(source, contents),
    })
}

/// Dimension zero: all uppers are labels; the target is the unique
/// maximal-dimension label present.
fn unify_objects(uppers: &[UnificationUpper]) -> Result<Unification, Error> {
    let labels: Vec<_> = uppers
        .iter()
        .map(|u| match &u.diagram {
            Diagram::Object(g) => g.clone(),
            Diagram::Composite(_) => unreachable!("dimension checked by caller"),
        })
        .collect();

    let top = labels
        .iter()
        .map(|g| g.dimension())
        .max()
        .expect("uppers are non-empty");
    let mut candidates = labels.iter().filter(|g| g.dimension() == top);
    let chosen = candidates.next().expect("maximum is attained").clone();
    if candidates.any(|g| *g != chosen) {
        return Err(Error::IncompatibleTypes);
    }

    Ok(Unification {
        limits: labels
            .into_iter()
            .map(|g| Limit::relabel(g, chosen.clone()))
            .collect(),
        target: Diagram::Object(chosen),
    })
}
