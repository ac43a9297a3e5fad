//! Limits: structure-preserving, height-collapsing maps between diagrams.
//!
//! A limit of dimension `n ≥ 1` is a sparse ordered list of
//! [`LimitComponent`]s, each replacing a contiguous run of source levels
//! with a single target level plus one sublimit per replaced level, one
//! dimension down. A component with an empty run *inserts* a level. An
//! empty list of components is the identity. At dimension zero a limit is
//! a [`Relabel`] of the unique cell, with `None` as the identity.
//!
//! Limits do not store their source or target diagrams; applying a limit
//! with [`Limit::rewrite_forward`] produces its target from its source, and
//! [`Limit::rewrite_backward`] recovers the source from the target by
//! splicing the recorded `source_data` back in.

use std::collections::BTreeMap;

use crate::diagram::{Content, Diagram};
use crate::error::Error;
use crate::generator::Generator;
use crate::monotone::Monotone;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Limit {
    /// Dimension zero: relabel the unique cell. `None` is the identity.
    Zero(Option<Relabel>),
    /// Dimension one and above.
    Higher(HigherLimit),
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Relabel {
    pub source: Generator,
    pub target: Generator,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct HigherLimit {
    pub n: usize,
    pub components: Vec<LimitComponent>,
}

/// One component of a limit: the run `first .. first + source_data.len()`
/// of source levels collapses into the single `target_data` level, with
/// `sublimits[j]` mapping the `j`-th replaced slice into the target slice
/// one dimension down.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct LimitComponent {
    pub first: usize,
    pub source_data: Vec<Content>,
    pub target_data: Content,
    pub sublimits: Vec<Limit>,
}

/// A nested description of a subset of a diagram's singular levels:
/// nothing, everything, or a per-height selection with a deeper subset for
/// each selected level.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Subset {
    Empty,
    Full,
    Levels(BTreeMap<usize, Subset>),
}

impl LimitComponent {
    pub fn len(&self) -> usize {
        self.source_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_data.is_empty()
    }
}

impl Limit {
    pub fn identity(n: usize) -> Self {
        if n == 0 {
            Limit::Zero(None)
        } else {
            Limit::Higher(HigherLimit {
                n,
                components: Vec::new(),
            })
        }
    }

    /// The dimension-zero relabeling `source → target`, normalized to the
    /// identity when the two coincide.
    pub fn relabel(source: Generator, target: Generator) -> Self {
        if source == target {
            Limit::Zero(None)
        } else {
            Limit::Zero(Some(Relabel { source, target }))
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Limit::Zero(_) => 0,
            Limit::Higher(h) => h.n,
        }
    }

    pub fn is_identity(&self) -> bool {
        match self {
            Limit::Zero(relabel) => relabel.is_none(),
            Limit::Higher(h) => h.components.is_empty(),
        }
    }

    pub fn components(&self) -> &[LimitComponent] {
        match self {
            Limit::Zero(_) => &[],
            Limit::Higher(h) => &h.components,
        }
    }

    /// The target height of component `index`: its `first`, shifted down by
    /// the collapsing of every earlier component.
    pub fn component_target_height(&self, index: usize) -> usize {
        let components = self.components();
        let mut acc: isize = 0;
        for component in &components[..index] {
            acc += component.len() as isize - 1;
        }
        (components[index].first as isize - acc) as usize
    }

    /// The number of source levels for a target with `target_size` levels:
    /// every component trades its run for a single level.
    pub fn source_size(&self, target_size: usize) -> usize {
        let delta: isize = self
            .components()
            .iter()
            .map(|c| c.len() as isize - 1)
            .sum();
        (target_size as isize + delta) as usize
    }

    /// The induced map of singular heights for a source with `source_size`
    /// levels: heights outside every component pass through shifted,
    /// heights inside a component share the component's target height.
    pub fn monotone(&self, source_size: usize) -> Monotone {
        match self {
            Limit::Zero(_) => Monotone::identity(source_size),
            Limit::Higher(h) => {
                let mut values = Vec::with_capacity(source_size);
                let mut src = 0;
                let mut target_next = 0;
                for component in &h.components {
                    debug_assert!(component.first >= src, "components out of order");
                    while src < component.first.min(source_size) {
                        values.push(target_next);
                        target_next += 1;
                        src += 1;
                    }
                    let t = target_next;
                    target_next += 1;
                    for _ in 0..component.len().min(source_size - src) {
                        values.push(t);
                        src += 1;
                    }
                }
                while src < source_size {
                    values.push(target_next);
                    target_next += 1;
                    src += 1;
                }
                Monotone::new(values, target_next).expect("monotone by construction")
            }
        }
    }

    /// The sublimit describing how the source slice at `height` maps into
    /// its image slice: a component's recorded sublimit inside a span, the
    /// identity outside.
    pub fn sublimit(&self, height: usize) -> Limit {
        match self {
            Limit::Zero(_) => Limit::identity(0),
            Limit::Higher(h) => {
                for component in &h.components {
                    if height >= component.first && height < component.first + component.len() {
                        return component.sublimits[height - component.first].clone();
                    }
                }
                Limit::identity(h.n.saturating_sub(1))
            }
        }
    }

    /// Diagrammatic composition: `self` then `other`.
    ///
    /// Component spans are merged through the intermediate height map,
    /// sublimits compose recursively, and per-level data is rebuilt from
    /// whichever input is defined at each intermediate height. A resulting
    /// component whose only sublimit is the identity is omitted, keeping
    /// the composite in sparse normal form.
    pub fn compose(&self, other: &Limit) -> Result<Limit, Error> {
        if self.dimension() != other.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.dimension(),
                found: other.dimension(),
            });
        }
        if self.is_identity() {
            return Ok(other.clone());
        }
        if other.is_identity() {
            return Ok(self.clone());
        }

        match (self, other) {
            (Limit::Zero(Some(f)), Limit::Zero(Some(g))) => {
                debug_assert_eq!(f.target, g.source, "relabels do not chain");
                Ok(Limit::relabel(f.source.clone(), g.target.clone()))
            }
            (Limit::Higher(f), Limit::Higher(g)) => compose_higher(f, g),
            _ => unreachable!("identities handled above"),
        }
    }

    /// Apply the limit to its source diagram, producing its target:
    /// each component's span is spliced out and `target_data` spliced in.
    pub fn rewrite_forward(&self, diagram: &Diagram) -> Result<Diagram, Error> {
        match (self, diagram) {
            (Limit::Zero(None), Diagram::Object(_)) => Ok(diagram.clone()),
            (Limit::Zero(Some(relabel)), Diagram::Object(generator)) => {
                debug_assert_eq!(generator, &relabel.source, "relabel source mismatch");
                Ok(Diagram::Object(relabel.target.clone()))
            }
            (Limit::Higher(h), Diagram::Composite(_)) => {
                if h.n != diagram.dimension() {
                    return Err(Error::DimensionMismatch {
                        expected: h.n,
                        found: diagram.dimension(),
                    });
                }
                let source = diagram.source().expect("composite has a source");
                let mut data = diagram.data().expect("composite has data").to_vec();
                for component in h.components.iter().rev() {
                    let end = component.first + component.len();
                    if end > data.len() {
                        return Err(Error::HeightOutOfBounds {
                            height: end,
                            size: data.len(),
                        });
                    }
                    data.splice(
                        component.first..end,
                        std::iter::once(component.target_data.clone()),
                    );
                }
                Ok(Diagram::composite(source, data))
            }
            _ => Err(Error::DimensionMismatch {
                expected: self.dimension(),
                found: diagram.dimension(),
            }),
        }
    }

    /// Un-apply the limit to its target diagram, recovering its source:
    /// each component's `source_data` is spliced back in at the component's
    /// target height.
    pub fn rewrite_backward(&self, diagram: &Diagram) -> Result<Diagram, Error> {
        match (self, diagram) {
            (Limit::Zero(None), Diagram::Object(_)) => Ok(diagram.clone()),
            (Limit::Zero(Some(relabel)), Diagram::Object(generator)) => {
                debug_assert_eq!(generator, &relabel.target, "relabel target mismatch");
                Ok(Diagram::Object(relabel.source.clone()))
            }
            (Limit::Higher(h), Diagram::Composite(_)) => {
                if h.n != diagram.dimension() {
                    return Err(Error::DimensionMismatch {
                        expected: h.n,
                        found: diagram.dimension(),
                    });
                }
                let source = diagram.source().expect("composite has a source");
                let mut data = diagram.data().expect("composite has data").to_vec();
                let targets: Vec<usize> = (0..h.components.len())
                    .map(|i| self.component_target_height(i))
                    .collect();
                for (component, &target) in h.components.iter().zip(&targets).rev() {
                    if target >= data.len() {
                        return Err(Error::HeightOutOfBounds {
                            height: target,
                            size: data.len(),
                        });
                    }
                    data.splice(target..target + 1, component.source_data.iter().cloned());
                }
                Ok(Diagram::composite(source, data))
            }
            _ => Err(Error::DimensionMismatch {
                expected: self.dimension(),
                found: diagram.dimension(),
            }),
        }
    }

    /// Restrict to the components whose target height lies in `range`,
    /// re-expressed in the coordinates of the restricted source and target.
    pub fn preimage(&self, range: std::ops::Range<usize>) -> Limit {
        match self {
            Limit::Zero(_) => self.clone(),
            Limit::Higher(h) => {
                let mut acc: isize = 0;
                let mut source_start: Option<isize> = None;
                let mut kept = Vec::new();
                for (index, component) in h.components.iter().enumerate() {
                    let target = self.component_target_height(index);
                    if target < range.start {
                        acc += component.len() as isize - 1;
                        continue;
                    }
                    if target >= range.end {
                        break;
                    }
                    let start = *source_start.get_or_insert(range.start as isize + acc);
                    kept.push(LimitComponent {
                        first: (component.first as isize - start) as usize,
                        ..component.clone()
                    });
                }
                Limit::Higher(HigherLimit {
                    n: h.n,
                    components: kept,
                })
            }
        }
    }

    /// The source-side subset corresponding to a target-side `subset`
    /// under this limit.
    pub fn preimage_subset(&self, subset: &Subset) -> Subset {
        match (self, subset) {
            (_, Subset::Empty) => Subset::Empty,
            (_, Subset::Full) => Subset::Full,
            (Limit::Zero(_), _) => subset.clone(),
            (Limit::Higher(h), Subset::Levels(levels)) => {
                let mut out = BTreeMap::new();
                for (&target, deeper) in levels {
                    match self.component_at_target(target) {
                        Some(index) => {
                            let component = &h.components[index];
                            for (j, sublimit) in component.sublimits.iter().enumerate() {
                                out.insert(component.first + j, sublimit.preimage_subset(deeper));
                            }
                        }
                        None => {
                            let source = self.source_height_of(target);
                            out.insert(source, deeper.clone());
                        }
                    }
                }
                Subset::Levels(out)
            }
        }
    }

    /// Restrict the limit (and implicitly its source and target) to the
    /// preimage of an arbitrarily-shaped nested `subset` of its target.
    pub fn restrict_to_preimage(&self, subset: &Subset) -> Limit {
        match (self, subset) {
            (_, Subset::Full) => self.clone(),
            (_, Subset::Empty) => Limit::identity(self.dimension()),
            (Limit::Zero(_), Subset::Levels(_)) => self.clone(),
            (Limit::Higher(h), Subset::Levels(levels)) => {
                let mut components = Vec::new();
                let mut first = 0;
                for (&target, deeper) in levels {
                    match self.component_at_target(target) {
                        Some(index) => {
                            let component = &h.components[index];
                            let mut source_data = Vec::with_capacity(component.len());
                            let mut sublimits = Vec::with_capacity(component.len());
                            for (j, sublimit) in component.sublimits.iter().enumerate() {
                                let pre = sublimit.preimage_subset(deeper);
                                source_data.push(component.source_data[j].restrict_to_preimage(&pre));
                                sublimits.push(sublimit.restrict_to_preimage(deeper));
                            }
                            components.push(LimitComponent {
                                first,
                                source_data,
                                target_data: component.target_data.restrict_to_preimage(deeper),
                                sublimits,
                            });
                            first += component.len();
                        }
                        // A height outside every component passes by identity.
                        None => first += 1,
                    }
                }
                Limit::Higher(HigherLimit { n: h.n, components })
            }
        }
    }

    /// Shift component positions by `offsets[0]` at this dimension and by
    /// the remaining offsets one dimension down, re-expressing the limit in
    /// a padded context.
    pub fn pad(&self, offsets: &[usize]) -> Limit {
        match self {
            Limit::Zero(_) => self.clone(),
            Limit::Higher(h) => {
                let Some((&offset, deeper)) = offsets.split_first() else {
                    return self.clone();
                };
                Limit::Higher(HigherLimit {
                    n: h.n,
                    components: h
                        .components
                        .iter()
                        .map(|c| LimitComponent {
                            first: c.first + offset,
                            source_data: c.source_data.iter().map(|d| d.pad(deeper)).collect(),
                            target_data: c.target_data.pad(deeper),
                            sublimits: c.sublimits.iter().map(|s| s.pad(deeper)).collect(),
                        })
                        .collect(),
                })
            }
        }
    }

    /// Shift component positions by a signed `delta` at this dimension only.
    pub(crate) fn shift(&self, delta: isize) -> Limit {
        match self {
            Limit::Zero(_) => self.clone(),
            Limit::Higher(h) => Limit::Higher(HigherLimit {
                n: h.n,
                components: h
                    .components
                    .iter()
                    .map(|c| LimitComponent {
                        first: (c.first as isize + delta) as usize,
                        ..c.clone()
                    })
                    .collect(),
            }),
        }
    }

    /// Check the structural invariants of the component list: ordering,
    /// non-overlap, and sublimit arity and dimension. A violation here is a
    /// defect in the engine, not in user input.
    pub fn check_well_formed(&self) -> Result<(), Error> {
        let Limit::Higher(h) = self else {
            return Ok(());
        };
        if h.n == 0 {
            return Err(Error::MalformedLimit {
                reason: "zero-dimensional limit with components",
            });
        }
        let mut horizon = 0;
        for component in &h.components {
            if component.first < horizon {
                return Err(Error::MalformedLimit {
                    reason: "components overlap or are out of order",
                });
            }
            horizon = component.first + component.len();
            if component.sublimits.len() != component.source_data.len() {
                return Err(Error::MalformedLimit {
                    reason: "one sublimit per replaced level",
                });
            }
            for sublimit in &component.sublimits {
                if sublimit.dimension() + 1 != h.n {
                    return Err(Error::MalformedLimit {
                        reason: "sublimit dimension must drop by one",
                    });
                }
                sublimit.check_well_formed()?;
            }
        }
        Ok(())
    }

    /// The highest-dimensional generator mentioned by this limit.
    pub fn max_generator(&self) -> Option<Generator> {
        match self {
            Limit::Zero(None) => None,
            Limit::Zero(Some(relabel)) => Some(
                max_by_dimension(relabel.source.clone(), relabel.target.clone()),
            ),
            Limit::Higher(h) => {
                let mut best: Option<Generator> = None;
                for component in &h.components {
                    for candidate in component
                        .source_data
                        .iter()
                        .chain(std::iter::once(&component.target_data))
                        .filter_map(Content::max_generator)
                        .chain(component.sublimits.iter().filter_map(Limit::max_generator))
                    {
                        best = Some(match best {
                            None => candidate,
                            Some(b) => max_by_dimension(b, candidate),
                        });
                    }
                }
                best
            }
        }
    }

    pub(crate) fn uses(&self, id: crate::generator::GeneratorId) -> bool {
        match self {
            Limit::Zero(None) => false,
            Limit::Zero(Some(relabel)) => relabel.source.id() == id || relabel.target.id() == id,
            Limit::Higher(h) => h.components.iter().any(|c| {
                c.source_data.iter().any(|d| d.uses(id))
                    || c.target_data.uses(id)
                    || c.sublimits.iter().any(|s| s.uses(id))
            }),
        }
    }

    /// The component collapsing into target height `target`, if any.
    fn component_at_target(&self, target: usize) -> Option<usize> {
        (0..self.components().len()).find(|&i| self.component_target_height(i) == target)
    }

    /// The source height passing by identity to target height `target`.
    /// Meaningful only when no component collapses into `target`.
    pub(crate) fn source_height_of(&self, target: usize) -> usize {
        let mut acc: isize = 0;
        for (index, component) in self.components().iter().enumerate() {
            if self.component_target_height(index) < target {
                acc += component.len() as isize - 1;
            }
        }
        (target as isize + acc) as usize
    }
}

fn max_by_dimension(a: Generator, b: Generator) -> Generator {
    if b.dimension() >= a.dimension() {
        b
    } else {
        a
    }
}

/// Merge-walk composition of two higher limits `f ; g`, correlating `f`'s
/// component targets with `g`'s component spans through the intermediate
/// diagram's heights.
fn compose_higher(f: &HigherLimit, g: &HigherLimit) -> Result<Limit, Error> {
    let mut out: Vec<LimitComponent> = Vec::new();
    let mut fi = 0;
    let mut gi = 0;
    // Σ (len - 1) over consumed f components: the running shift between
    // source heights and intermediate heights.
    let mut acc_f: isize = 0;

    loop {
        let f_target = f
            .components
            .get(fi)
            .map(|c| c.first as isize - acc_f);
        let g_component = g.components.get(gi);

        match (f_target, g_component) {
            (None, None) => break,
            // f's component lands strictly below g's next span: it passes
            // through unchanged.
            (Some(tb), gc)
                if gc.is_none_or(|gc| tb < gc.first as isize) =>
            {
                let component = f.components[fi].clone();
                acc_f += component.len() as isize - 1;
                fi += 1;
                out.push(component);
            }
            // g's span lies strictly below f's next target: pull it back
            // along the identity region of f.
            (ft, Some(gc))
                if ft.is_none_or(|tb| (gc.first + gc.len()) as isize <= tb) =>
            {
                out.push(LimitComponent {
                    first: (gc.first as isize + acc_f) as usize,
                    source_data: gc.source_data.clone(),
                    target_data: gc.target_data.clone(),
                    sublimits: gc.sublimits.clone(),
                });
                gi += 1;
            }
            // Overlap: one or more f components collapse into g's span.
            (Some(_), Some(_)) => {
                let gc = g.components[gi].clone();
                let first = (gc.first as isize + acc_f) as usize;
                let mut source_data = Vec::new();
                let mut sublimits = Vec::new();

                for (k, b) in (gc.first..gc.first + gc.len()).enumerate() {
                    let gsub = &gc.sublimits[k];
                    let f_here = f
                        .components
                        .get(fi)
                        .is_some_and(|c| c.first as isize - acc_f == b as isize);
                    if f_here {
                        let fc = &f.components[fi];
                        debug_assert_eq!(
                            fc.target_data, gc.source_data[k],
                            "intermediate level data disagrees"
                        );
                        for (j, data) in fc.source_data.iter().enumerate() {
                            source_data.push(data.clone());
                            sublimits.push(fc.sublimits[j].compose(gsub)?);
                        }
                        acc_f += fc.len() as isize - 1;
                        fi += 1;
                    } else {
                        source_data.push(gc.source_data[k].clone());
                        sublimits.push(gsub.clone());
                    }
                }

                let trivial = source_data.len() == 1 && sublimits[0].is_identity();
                if !trivial {
                    out.push(LimitComponent {
                        first,
                        source_data,
                        target_data: gc.target_data,
                        sublimits,
                    });
                }
                gi += 1;
            }
            // `(None, Some(_))` is matched by the `(ft, Some(gc))` arm above
            // (its `ft.is_none_or` guard holds for `ft == None`), and
            // `(Some(_), None)` by the `(Some(tb), gc)` arm (its
            // `gc.is_none_or` guard holds for `gc == None`). These never reach
            // here; the arm only satisfies the exhaustiveness checker.
            (None, Some(_)) | (Some(_), None) => unreachable!(),
        }
    }

    Ok(Limit::Higher(HigherLimit {
        n: f.n,
        components: out,
    }))
}
