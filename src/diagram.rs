//! Diagrams: the recursive data model for composable cells.
//!
//! An `n`-diagram is a source `(n-1)`-diagram together with an ordered
//! sequence of [`Content`]s, the singular levels; a `0`-diagram is a bare
//! [`Generator`]. A diagram of height `k` has `2k + 1` addressable slices
//! (see [`Height`]): regular slices between levels, singular slices at
//! levels. The defining invariant, checked by
//! [`Diagram::typecheck`](crate::diagram::Diagram), is that every level's
//! forward limit maps the regular slice below onto the singular slice, and
//! its backward limit maps the regular slice above onto the same singular
//! slice, recursively at every dimension.
//!
//! Diagrams are immutable value objects; every operation produces a new
//! diagram sharing untouched sub-trees with the old one.

use std::sync::Arc;

use crate::error::Error;
use crate::generator::{Generator, GeneratorId};
use crate::height::Height;
use crate::limit::{HigherLimit, Limit, LimitComponent, Subset};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Diagram {
    /// Dimension zero: a bare generator.
    Object(Generator),
    /// Dimension one and above.
    Composite(Arc<Composite>),
}

#[derive(PartialEq, Eq, Hash, Debug)]
pub struct Composite {
    pub source: Diagram,
    pub data: Vec<Content>,
}

/// One singular level: what must happen going forward from the regular
/// slice below, and backward from the regular slice above.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Content {
    pub forward: Limit,
    pub backward: Limit,
}

impl Content {
    pub fn dimension(&self) -> usize {
        self.forward.dimension()
    }

    pub fn is_vacuous(&self) -> bool {
        self.forward.is_identity() && self.backward.is_identity()
    }

    pub fn pad(&self, offsets: &[usize]) -> Content {
        Content {
            forward: self.forward.pad(offsets),
            backward: self.backward.pad(offsets),
        }
    }

    pub fn restrict_to_preimage(&self, subset: &Subset) -> Content {
        Content {
            forward: self.forward.restrict_to_preimage(subset),
            backward: self.backward.restrict_to_preimage(subset),
        }
    }

    pub fn max_generator(&self) -> Option<Generator> {
        match (self.forward.max_generator(), self.backward.max_generator()) {
            (Some(a), Some(b)) => Some(if b.dimension() >= a.dimension() { b } else { a }),
            (a, b) => a.or(b),
        }
    }

    pub(crate) fn uses(&self, id: GeneratorId) -> bool {
        self.forward.uses(id) || self.backward.uses(id)
    }
}

impl Diagram {
    pub fn object(generator: Generator) -> Self {
        Diagram::Object(generator)
    }

    pub fn composite(source: Diagram, data: Vec<Content>) -> Self {
        Diagram::Composite(Arc::new(Composite { source, data }))
    }

    /// The standard one-level diagram presenting a generator: its source
    /// boundary with a single level attaching the generator over the whole
    /// boundary.
    pub fn from_generator(generator: &Generator) -> Result<Diagram, Error> {
        match (generator.source(), generator.target()) {
            (None, None) => Ok(Diagram::Object(generator.clone())),
            (Some(source), Some(target)) => {
                let point = vec![0; source.dimension()];
                let forward = source.contract_forward_limit(generator, &point, source)?;
                let backward = target.contract_backward_limit(generator, &point, target)?;
                Ok(Diagram::composite(
                    source.clone(),
                    vec![Content { forward, backward }],
                ))
            }
            _ => Err(Error::BoundaryMismatch),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Diagram::Object(_) => 0,
            Diagram::Composite(c) => c.source.dimension() + 1,
        }
    }

    /// The number of singular levels. Zero for an object.
    pub fn size(&self) -> usize {
        match self {
            Diagram::Object(_) => 0,
            Diagram::Composite(c) => c.data.len(),
        }
    }

    pub fn data(&self) -> Option<&[Content]> {
        match self {
            Diagram::Object(_) => None,
            Diagram::Composite(c) => Some(&c.data),
        }
    }

    pub fn source(&self) -> Option<Diagram> {
        match self {
            Diagram::Object(_) => None,
            Diagram::Composite(c) => Some(c.source.clone()),
        }
    }

    pub fn target(&self) -> Result<Diagram, Error> {
        match self {
            Diagram::Object(_) => Err(Error::ZeroDimensional),
            Diagram::Composite(_) => self.slice(Height::Regular(self.size())),
        }
    }

    /// All `2k + 1` slices, from the source at the bottom to the target at
    /// the top, in one walk.
    pub fn slices(&self) -> Result<Vec<Diagram>, Error> {
        let Diagram::Composite(c) = self else {
            return Err(Error::ZeroDimensional);
        };
        let mut slices = Vec::with_capacity(2 * c.data.len() + 1);
        let mut regular = c.source.clone();
        for content in &c.data {
            let singular = content.forward.rewrite_forward(&regular)?;
            let next = content.backward.rewrite_backward(&singular)?;
            slices.push(regular);
            slices.push(singular);
            regular = next;
        }
        slices.push(regular);
        Ok(slices)
    }

    /// The slice at `height`. Out-of-range heights fail in debug builds
    /// and clamp to the nearest boundary in release builds; there is no
    /// runtime bounds guarantee outside of debug assertions.
    pub fn slice(&self, height: Height) -> Result<Diagram, Error> {
        let Diagram::Composite(c) = self else {
            return Err(Error::ZeroDimensional);
        };
        #[cfg(debug_assertions)]
        if height.to_raw() > 2 * c.data.len() {
            return Err(Error::HeightOutOfBounds {
                height: height.to_raw(),
                size: c.data.len(),
            });
        }
        let height = height.clamp(c.data.len());

        let regular_below = |h: usize| -> Result<Diagram, Error> {
            let mut regular = c.source.clone();
            for content in &c.data[..h] {
                let singular = content.forward.rewrite_forward(&regular)?;
                regular = content.backward.rewrite_backward(&singular)?;
            }
            Ok(regular)
        };

        match height {
            Height::Regular(h) => regular_below(h),
            Height::Singular(h) => c.data[h].forward.rewrite_forward(&regular_below(h)?),
        }
    }

    /// Recursive positional lookup: `d.get_slice(&[a, b])` equals
    /// `d.slice(a)?.slice(b)`.
    pub fn get_slice(&self, heights: &[Height]) -> Result<Diagram, Error> {
        let mut diagram = self.clone();
        for &height in heights {
            diagram = diagram.slice(height)?;
        }
        Ok(diagram)
    }

    /// Wrap as the identity diagram one dimension up.
    pub fn identity(&self) -> Diagram {
        Diagram::composite(self.clone(), Vec::new())
    }

    /// Copy with the data truncated to the first `k` levels.
    pub fn behead(&self, k: usize) -> Result<Diagram, Error> {
        let Diagram::Composite(c) = self else {
            return Err(Error::ZeroDimensional);
        };
        if k > c.data.len() {
            return Err(Error::HeightOutOfBounds {
                height: k,
                size: c.data.len(),
            });
        }
        Ok(Diagram::composite(c.source.clone(), c.data[..k].to_vec()))
    }

    /// The sub-diagram covering only the singular heights
    /// `range.start .. range.end`, with the appropriate new source.
    pub fn restrict(&self, range: std::ops::Range<usize>) -> Result<Diagram, Error> {
        let Diagram::Composite(c) = self else {
            return Err(Error::ZeroDimensional);
        };
        if range.end > c.data.len() || range.start > range.end {
            return Err(Error::HeightOutOfBounds {
                height: range.end,
                size: c.data.len(),
            });
        }
        let source = self.slice(Height::Regular(range.start))?;
        Ok(Diagram::composite(source, c.data[range].to_vec()))
    }

    /// Whether any part of the diagram mentions the generator `id`.
    pub fn uses(&self, id: GeneratorId) -> bool {
        match self {
            Diagram::Object(g) => g.id() == id,
            Diagram::Composite(c) => c.source.uses(id) || c.data.iter().any(|d| d.uses(id)),
        }
    }

    /// The highest-dimensional generator mentioned anywhere in the diagram:
    /// the "type of the point" after all rewrites.
    pub fn max_generator(&self) -> Generator {
        match self {
            Diagram::Object(g) => g.clone(),
            Diagram::Composite(c) => {
                let mut best = c.source.max_generator();
                for content in &c.data {
                    if let Some(candidate) = content.max_generator() {
                        if candidate.dimension() >= best.dimension() {
                            best = candidate;
                        }
                    }
                }
                best
            }
        }
    }

    /// Build the limit that collapses the embedded copy of `sub` at
    /// `point` into a single level labeled by `generator`, one coordinate
    /// per dimension; at dimension zero this is a relabeling. `sub` is the
    /// generator's source boundary (or, for the backward direction, its
    /// target boundary) and must match the region of `self` exactly, up to
    /// padding by the deeper coordinates of `point`.
    pub fn contract_forward_limit(
        &self,
        generator: &Generator,
        point: &[usize],
        sub: &Diagram,
    ) -> Result<Limit, Error> {
        self.contract_limit(generator, point, sub)
    }

    /// Dual of [`Diagram::contract_forward_limit`]: the limit whose
    /// un-application expands a single level back into `sub`. Used when
    /// attaching, where the new level's backward limit unpacks it into the
    /// generator's internal structure.
    pub fn contract_backward_limit(
        &self,
        generator: &Generator,
        point: &[usize],
        sub: &Diagram,
    ) -> Result<Limit, Error> {
        self.contract_limit(generator, point, sub)
    }

    fn contract_limit(
        &self,
        generator: &Generator,
        point: &[usize],
        sub: &Diagram,
    ) -> Result<Limit, Error> {
        if self.dimension() != sub.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.dimension(),
                found: sub.dimension(),
            });
        }

        match (self, sub) {
            (Diagram::Object(label), Diagram::Object(expected)) => {
                if label != expected {
                    return Err(Error::BoundaryMismatch);
                }
                Ok(Limit::relabel(label.clone(), generator.clone()))
            }
            (Diagram::Composite(c), Diagram::Composite(s)) => {
                let (&p, deeper) = point.split_first().ok_or(Error::MalformedPoint)?;
                let k = s.data.len();
                if p + k > c.data.len() {
                    return Err(Error::HeightOutOfBounds {
                        height: p + k,
                        size: c.data.len(),
                    });
                }
                for (j, level) in s.data.iter().enumerate() {
                    if c.data[p + j] != level.pad(deeper) {
                        return Err(Error::BoundaryMismatch);
                    }
                }

                let below = self.slice(Height::Regular(p))?;
                let above = self.slice(Height::Regular(p + k))?;
                let sub_source = s.source.clone();
                let sub_target = sub.target()?;

                let forward = below.contract_limit(generator, deeper, &sub_source)?;
                let backward = above.contract_limit(generator, deeper, &sub_target)?;

                let mut sublimits = Vec::with_capacity(k);
                for j in 0..k {
                    let slice = self.slice(Height::Singular(p + j))?;
                    let sub_slice = sub.slice(Height::Singular(j))?;
                    sublimits.push(slice.contract_limit(generator, deeper, &sub_slice)?);
                }

                Ok(Limit::Higher(HigherLimit {
                    n: self.dimension(),
                    components: vec![LimitComponent {
                        first: p,
                        source_data: c.data[p..p + k].to_vec(),
                        target_data: Content { forward, backward },
                        sublimits,
                    }],
                }))
            }
            _ => unreachable!("dimensions checked above"),
        }
    }

    /// Replace the embedded copy of `old` at `point` with `new`, padded to
    /// the same position. Used to build the far side of an attachment.
    pub(crate) fn splice_region(
        &self,
        point: &[usize],
        old: &Diagram,
        new: &Diagram,
    ) -> Result<Diagram, Error> {
        match (self, old, new) {
            (Diagram::Object(label), Diagram::Object(expected), Diagram::Object(replacement)) => {
                if label != expected {
                    return Err(Error::BoundaryMismatch);
                }
                Ok(Diagram::Object(replacement.clone()))
            }
            (Diagram::Composite(c), Diagram::Composite(o), Diagram::Composite(n)) => {
                let (&p, deeper) = point.split_first().ok_or(Error::MalformedPoint)?;
                let k = o.data.len();
                if p + k > c.data.len() {
                    return Err(Error::HeightOutOfBounds {
                        height: p + k,
                        size: c.data.len(),
                    });
                }
                for (j, level) in o.data.iter().enumerate() {
                    if c.data[p + j] != level.pad(deeper) {
                        return Err(Error::BoundaryMismatch);
                    }
                }
                let mut data = c.data[..p].to_vec();
                data.extend(n.data.iter().map(|d| d.pad(deeper)));
                data.extend_from_slice(&c.data[p + k..]);
                Ok(Diagram::composite(c.source.clone(), data))
            }
            _ => Err(Error::DimensionMismatch {
                expected: old.dimension(),
                found: new.dimension(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorId;

    fn base(id: usize) -> Generator {
        Generator::new_base(GeneratorId(id))
    }

    #[test]
    fn object_shape() {
        let x = Diagram::object(base(0));
        assert_eq!(x.dimension(), 0);
        assert_eq!(x.size(), 0);
        assert!(x.source().is_none());
    }

    #[test]
    fn generator_diagram_slices() {
        let x = Diagram::object(base(0));
        let y = Diagram::object(base(1));
        let f = Generator::new(GeneratorId(2), x.clone(), y.clone()).unwrap();
        let d = Diagram::from_generator(&f).unwrap();

        assert_eq!(d.dimension(), 1);
        assert_eq!(d.size(), 1);
        assert_eq!(d.slice(Height::Regular(0)).unwrap(), x);
        assert_eq!(
            d.slice(Height::Singular(0)).unwrap(),
            Diagram::object(f.clone())
        );
        assert_eq!(d.slice(Height::Regular(1)).unwrap(), y);
        assert_eq!(d.target().unwrap(), y);
    }

    #[test]
    fn identity_and_behead() {
        let x = Diagram::object(base(0));
        let boosted = x.identity();
        assert_eq!(boosted.dimension(), 1);
        assert_eq!(boosted.size(), 0);
        assert_eq!(boosted.behead(0).unwrap(), boosted);
    }
}
