//! Monotone height maps and their unification.
//!
//! A [`Monotone`] is a finite non-decreasing sequence of integers together
//! with a declared target size: the "which singular slice am I part of" map
//! induced by a limit. Monotones compose, dualize up to adjoint, and unify:
//! pairwise with a directional bias ([`Monotone::unify`]) or simultaneously
//! in an n-ary pushout ([`Monotone::multi_unify`]) that delegates
//! consistency resolution to the
//! [`DirectedQuotientGraph`](crate::quotient::DirectedQuotientGraph).

use crate::error::Error;
use crate::quotient::{DirectedQuotientGraph, NodeId};

/// Directional tie-break for interleaving simultaneous insertions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Bias {
    Left,
    Right,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Monotone {
    values: Vec<usize>,
    target_size: usize,
}

/// The result of a pairwise pushout: one monotone out of each target.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MonotoneUnification {
    pub first: Monotone,
    pub second: Monotone,
}

/// One chain in a simultaneous unification: the size of an upper monotone's
/// target and whether its fresh positions prefer the left of the order.
#[derive(Clone, Copy, Debug)]
pub struct UpperChain {
    pub size: usize,
    pub bias_left: bool,
}

/// A lower compatibility constraint: two parallel monotones out of a shared
/// source into the uppers at `left_index` and `right_index`.
#[derive(Clone, Debug)]
pub struct LowerConstraint {
    pub left_index: usize,
    pub left: Monotone,
    pub right_index: usize,
    pub right: Monotone,
}

impl Monotone {
    /// # Errors
    ///
    /// Fails when `values` is not non-decreasing or exceeds `target_size`.
    pub fn new(values: Vec<usize>, target_size: usize) -> Result<Self, Error> {
        let ascending = values.windows(2).all(|w| w[0] <= w[1]);
        if !ascending {
            return Err(Error::MalformedLimit {
                reason: "monotone values must be non-decreasing",
            });
        }
        if let Some(&last) = values.last() {
            if last >= target_size {
                return Err(Error::HeightOutOfBounds {
                    height: last,
                    size: target_size,
                });
            }
        }
        Ok(Monotone {
            values,
            target_size,
        })
    }

    pub fn identity(n: usize) -> Self {
        Monotone {
            values: (0..n).collect(),
            target_size: n,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }

    pub fn apply(&self, height: usize) -> usize {
        self.values[height]
    }

    /// Diagrammatic composition: `self` then `other`.
    pub fn compose(&self, other: &Monotone) -> Result<Monotone, Error> {
        if self.target_size != other.len() {
            return Err(Error::SourceLengthMismatch {
                left: self.target_size,
                right: other.len(),
            });
        }
        Ok(Monotone {
            values: self.values.iter().map(|&v| other.values[v]).collect(),
            target_size: other.target_size,
        })
    }

    /// The adjoint map on regular heights: `j ↦ #{i | f(i) < j}`, sending a
    /// map of singular heights `n → m` to a map of regular heights
    /// `m + 1 → n + 1`. This is the only sense in which a monotone inverts.
    pub fn adjoint(&self) -> Monotone {
        let mut values = Vec::with_capacity(self.target_size + 1);
        for j in 0..=self.target_size {
            values.push(self.values.iter().filter(|&&v| v < j).count());
        }
        Monotone {
            values,
            target_size: self.len() + 1,
        }
    }

    /// Pairwise pushout of `self : L → M` and `second : L → N`.
    ///
    /// Positions constrained by a shared source index must coincide in the
    /// target; runs of constraints linked by a repeated value on either
    /// side collapse into a single target element. Between constraints the
    /// unconstrained blocks of `M` and `N` are interleaved; when both sides
    /// contribute a non-empty block at the same gap ("head-to-head") the
    /// bias orders them — `Bias::Left` places `self`'s block first,
    /// `Bias::Right` places `second`'s first — and without a bias the
    /// unification fails.
    ///
    /// # Errors
    ///
    /// [`Error::SourceLengthMismatch`] when the sources differ,
    /// [`Error::NoUnification`] on an unbiased head-to-head conflict.
    pub fn unify(
        &self,
        second: &Monotone,
        bias: Option<Bias>,
    ) -> Result<MonotoneUnification, Error> {
        if self.len() != second.len() {
            return Err(Error::SourceLengthMismatch {
                left: self.len(),
                right: second.len(),
            });
        }

        let mut first_out = vec![0; self.target_size];
        let mut second_out = vec![0; second.target_size];
        let mut m = 0; // next unassigned position of M
        let mut n = 0; // next unassigned position of N
        let mut t = 0; // next fresh target element

        let mut emit_gap = |first_out: &mut Vec<usize>,
                            second_out: &mut Vec<usize>,
                            m: &mut usize,
                            n: &mut usize,
                            t: &mut usize,
                            m_end: usize,
                            n_end: usize|
         -> Result<(), Error> {
            let head_to_head = *m < m_end && *n < n_end;
            let second_first = match (head_to_head, bias) {
                (false, _) => false,
                (true, Some(Bias::Right)) => true,
                (true, Some(Bias::Left)) => false,
                (true, None) => return Err(Error::NoUnification),
            };
            if second_first {
                while *n < n_end {
                    second_out[*n] = *t;
                    *n += 1;
                    *t += 1;
                }
            }
            while *m < m_end {
                first_out[*m] = *t;
                *m += 1;
                *t += 1;
            }
            while *n < n_end {
                second_out[*n] = *t;
                *n += 1;
                *t += 1;
            }
            Ok(())
        };

        let mut i = 0;
        while i < self.len() {
            // A cluster is a maximal run of constraints linked by a
            // repeated value on either side; its two intervals collapse
            // into one target element.
            let start = i;
            while i + 1 < self.len()
                && (self.values[i + 1] == self.values[i]
                    || second.values[i + 1] == second.values[i])
            {
                i += 1;
            }
            let (mf, ml) = (self.values[start], self.values[i]);
            let (nf, nl) = (second.values[start], second.values[i]);

            emit_gap(
                &mut first_out,
                &mut second_out,
                &mut m,
                &mut n,
                &mut t,
                mf,
                nf,
            )?;

            for v in first_out.iter_mut().take(ml + 1).skip(m) {
                *v = t;
            }
            for v in second_out.iter_mut().take(nl + 1).skip(n) {
                *v = t;
            }
            m = ml + 1;
            n = nl + 1;
            t += 1;
            i += 1;
        }

        emit_gap(
            &mut first_out,
            &mut second_out,
            &mut m,
            &mut n,
            &mut t,
            self.target_size,
            second.target_size,
        )?;

        Ok(MonotoneUnification {
            first: Monotone {
                values: first_out,
                target_size: t,
            },
            second: Monotone {
                values: second_out,
                target_size: t,
            },
        })
    }

    /// Simultaneous pushout of several monotones.
    ///
    /// Builds one chain of fresh nodes per upper, quotients the nodes
    /// identified element-wise by each lower constraint, reduces the
    /// resulting reachability graph to an acyclic quotient, extracts a
    /// bias-aware linear order, and reads off each upper's embedding into
    /// that order.
    pub fn multi_unify(
        uppers: &[UpperChain],
        lowers: &[LowerConstraint],
    ) -> Result<Vec<Monotone>, Error> {
        let mut graph = DirectedQuotientGraph::new();

        let chains: Vec<Vec<NodeId>> = uppers
            .iter()
            .map(|upper| {
                let nodes: Vec<NodeId> =
                    (0..upper.size).map(|_| graph.add_node(upper.bias_left)).collect();
                for pair in nodes.windows(2) {
                    graph.add_edge(pair[0], pair[1]);
                }
                nodes
            })
            .collect();

        for lower in lowers {
            if lower.left.len() != lower.right.len() {
                return Err(Error::SourceLengthMismatch {
                    left: lower.left.len(),
                    right: lower.right.len(),
                });
            }
            for k in 0..lower.left.len() {
                let a = chains[lower.left_index][lower.left.apply(k)];
                let b = chains[lower.right_index][lower.right.apply(k)];
                graph.quotient(a, b);
            }
        }

        graph.transitive_closure();
        graph.acyclic_quotient();
        let order = graph.linear_order();
        let target_size = order.len();

        Ok(chains
            .into_iter()
            .map(|nodes| Monotone {
                values: nodes
                    .into_iter()
                    .map(|node| order[&graph.resolve(node)])
                    .collect(),
                target_size,
            })
            .collect())
    }
}
