//! Recursive typechecking.
//!
//! The walk validates every singular level of every slice: the component
//! invariants of both limits, agreement of the cospan on the singular
//! slice, and — for levels introducing a cell of the diagram's own
//! dimension — an exact match between the collapsed region and the
//! declared boundary of that cell, up to normalization. Levels whose top
//! label lies below the diagram dimension are homotopies built by the
//! unification machinery and pass on the coarse cospan checks.
//!
//! Expected to run after every structural transformation in debug builds;
//! release builds gate on it only at coarse boundaries.

use crate::attach::embeddings;
use crate::diagram::{Content, Diagram};
use crate::error::{Error, TypecheckError};
use crate::generator::Generator;
use crate::limit::Limit;

impl Diagram {
    /// Validate the diagram invariant at every dimension.
    pub fn typecheck(&self) -> Result<(), TypecheckError> {
        let Diagram::Composite(composite) = self else {
            return Ok(());
        };
        composite.source.typecheck()?;

        let mut regular = composite.source.clone();
        for (height, content) in composite.data.iter().enumerate() {
            for limit in [&content.forward, &content.backward] {
                if let Err(Error::MalformedLimit { reason }) = limit.check_well_formed() {
                    return Err(TypecheckError::MalformedLimit { height, reason });
                }
            }

            let singular = content
                .forward
                .rewrite_forward(&regular)
                .map_err(|_| TypecheckError::RewriteFailure { height })?;
            let next = content
                .backward
                .rewrite_backward(&singular)
                .map_err(|_| TypecheckError::RewriteFailure { height })?;
            let from_above = content
                .backward
                .rewrite_forward(&next)
                .map_err(|_| TypecheckError::RewriteFailure { height })?;
            if from_above != singular {
                return Err(TypecheckError::CospanMismatch { height });
            }

            singular.typecheck()?;
            check_level(self.dimension(), &regular, &next, content, &singular, height)?;
            regular = next;
        }
        Ok(())
    }
}

/// Per-level base check. A level whose singular slice is topped by a cell
/// of the diagram's own dimension must collapse exactly that cell's
/// declared boundaries; anything topped by a lower- or higher-dimensional
/// label is a homotopy or an opaque point of a deeper slice.
fn check_level(
    dimension: usize,
    below: &Diagram,
    above: &Diagram,
    content: &Content,
    singular: &Diagram,
    height: usize,
) -> Result<(), TypecheckError> {
    let top = singular.max_generator();
    if top.dimension() != dimension {
        return Ok(());
    }
    let (Some(source_boundary), Some(target_boundary)) = (top.source(), top.target()) else {
        return Ok(());
    };
    check_side(&content.forward, below, singular, &top, source_boundary, height)?;
    check_side(&content.backward, above, singular, &top, target_boundary, height)?;
    Ok(())
}

/// Check one leg of a level's cospan: the preimage of every slice of the
/// singular diagram topped by `generator` must normalize to the declared
/// `boundary`.
fn check_side(
    limit: &Limit,
    regular: &Diagram,
    singular: &Diagram,
    generator: &Generator,
    boundary: &Diagram,
    height: usize,
) -> Result<(), TypecheckError> {
    let violation = TypecheckError::BoundaryViolation {
        height,
        id: generator.id(),
    };

    match limit {
        // A vacuous level merely carries the label from below.
        Limit::Zero(None) => Ok(()),
        Limit::Zero(Some(relabel)) => {
            let matches = relabel.target == *generator
                && Diagram::Object(relabel.source.clone()) == *boundary;
            if matches {
                Ok(())
            } else {
                Err(violation)
            }
        }
        Limit::Higher(_) => {
            for target in labelled_heights(singular, generator) {
                let span = preimage_span(limit, target);
                let region = regular
                    .restrict(span)
                    .map_err(|_| TypecheckError::RewriteFailure { height })?;

                let region = region
                    .normalize()
                    .map_err(|_| TypecheckError::RewriteFailure { height })?;
                let boundary = boundary
                    .normalize()
                    .map_err(|_| TypecheckError::RewriteFailure { height })?;
                let exact =
                    region.size() == boundary.size() && !embeddings(&region, &boundary).is_empty();
                if !exact {
                    return Err(violation);
                }
            }
            Ok(())
        }
    }
}

/// The singular heights of `diagram` whose slice is topped by `generator`.
fn labelled_heights(diagram: &Diagram, generator: &Generator) -> Vec<usize> {
    let Ok(slices) = diagram.slices() else {
        return Vec::new();
    };
    (0..diagram.size())
        .filter(|&h| slices[2 * h + 1].max_generator() == *generator)
        .collect()
}

/// The source interval collapsing into target height `target`.
fn preimage_span(limit: &Limit, target: usize) -> std::ops::Range<usize> {
    let mut start = target as isize;
    let mut len = 1usize;
    for (index, component) in limit.components().iter().enumerate() {
        let component_target = limit.component_target_height(index);
        if component_target < target {
            start += component.len() as isize - 1;
        } else if component_target == target {
            len = component.len();
        }
    }
    let start = start as usize;
    start..start + len
}

impl Limit {
    /// Leaf-level check for a limit whose target is provably atomic: it
    /// must be the identity up to normalization, insert a level that
    /// normalizes away, or match exactly the declared boundary of the
    /// unique top generator of its target — the source boundary when
    /// `forward`, the target boundary otherwise.
    pub fn typecheck_base_case(&self, source: &Diagram, forward: bool) -> Result<bool, Error> {
        if self.is_identity() {
            return Ok(true);
        }
        match self {
            Limit::Zero(Some(relabel)) => {
                Ok(relabel.target.dimension() > relabel.source.dimension())
            }
            Limit::Zero(None) => Ok(true),
            Limit::Higher(h) => {
                if h.components.len() != 1 {
                    return Ok(false);
                }
                let target = self.rewrite_forward(source)?;
                if source.normalize()? == target.normalize()? {
                    return Ok(true);
                }

                // An attached cell sits one dimension above the slices the
                // limit maps between.
                let top = target.max_generator();
                if top.dimension() != self.dimension() + 1 {
                    return Ok(false);
                }
                let boundary = if forward { top.source() } else { top.target() };
                let Some(boundary) = boundary else {
                    return Ok(false);
                };

                for t in labelled_heights(&target, &top) {
                    let span = preimage_span(self, t);
                    let region = source.restrict(span)?.normalize()?;
                    let boundary = boundary.normalize()?;
                    if region.size() != boundary.size() || embeddings(&region, &boundary).is_empty()
                    {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}
