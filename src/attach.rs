//! Attachment: inserting a generator at a located boundary path, and the
//! enumeration of legal attachment options.
//!
//! An interior attachment records the rewrite as a new singular level one
//! dimension up: the forward limit collapses the matched copy of the
//! generator's source boundary into a single generator-labeled level, and
//! the backward limit unpacks that level into the generator's target
//! boundary. Boundary attachments prepend or append a level at the stated
//! depth, padding the surrounding diagram one level down per depth.

use log::debug;

use crate::boundary::{Boundary, BoundaryPath};
use crate::diagram::{Content, Diagram};
use crate::error::Error;
use crate::generator::{Generator, GeneratorId, Signature};
use crate::height::Height;

/// The result of an attachment: the new diagram, plus the rewritten slice
/// on the far side of the attachment for the caller's UI state.
#[derive(Clone, Debug)]
pub struct Attachment {
    pub diagram: Diagram,
    pub slice: Diagram,
}

/// Attach `generator` to `diagram` at `path`.
pub fn attach(
    diagram: &Diagram,
    generator: &Generator,
    path: &BoundaryPath,
) -> Result<Attachment, Error> {
    debug!("attaching {generator:?} at depth {} of a {}-diagram", path.depth, diagram.dimension());
    match path.boundary {
        None => attach_interior(diagram, generator, &path.point_coordinates()),
        Some(boundary) => {
            attach_boundary(diagram, generator, boundary, path.depth, &path.point_coordinates())
        }
    }
}

/// Table-driven attachment, as invoked by the editor.
pub fn attach_generator(
    signature: &Signature,
    diagram: &Diagram,
    id: GeneratorId,
    path: &BoundaryPath,
) -> Result<Attachment, Error> {
    let generator = signature.generator(id).ok_or(Error::UnknownGenerator(id))?;
    attach(diagram, generator, path)
}

fn attach_interior(
    diagram: &Diagram,
    generator: &Generator,
    point: &[usize],
) -> Result<Attachment, Error> {
    if generator.dimension() != diagram.dimension() + 1 {
        return Err(Error::DimensionMismatch {
            expected: diagram.dimension() + 1,
            found: generator.dimension(),
        });
    }
    let source_boundary = generator.source().expect("positive dimension");
    let target_boundary = generator.target().expect("positive dimension");

    let forward = diagram.contract_forward_limit(generator, point, source_boundary)?;
    let rewritten = diagram.splice_region(point, source_boundary, target_boundary)?;
    let backward = rewritten.contract_backward_limit(generator, point, target_boundary)?;

    Ok(Attachment {
        diagram: Diagram::composite(diagram.clone(), vec![Content { forward, backward }]),
        slice: rewritten,
    })
}

fn attach_boundary(
    diagram: &Diagram,
    generator: &Generator,
    boundary: Boundary,
    depth: usize,
    point: &[usize],
) -> Result<Attachment, Error> {
    let Diagram::Composite(composite) = diagram else {
        return Err(Error::ZeroDimensional);
    };
    if depth == 0 {
        return Err(Error::MalformedPoint);
    }

    if depth > 1 {
        let inner = attach_boundary(&composite.source, generator, boundary, depth - 1, point)?;
        let data = match boundary {
            Boundary::Source => {
                // The recursion prepended one level `depth - 1` dimensions
                // down; everything above re-expresses in the padded context.
                let mut offsets = vec![0; depth - 2];
                offsets.push(1);
                composite.data.iter().map(|d| d.pad(&offsets)).collect()
            }
            Boundary::Target => composite.data.clone(),
        };
        return Ok(Attachment {
            diagram: Diagram::composite(inner.diagram, data),
            slice: inner.slice,
        });
    }

    if generator.dimension() != diagram.dimension() {
        return Err(Error::DimensionMismatch {
            expected: diagram.dimension(),
            found: generator.dimension(),
        });
    }
    let generator_source = generator.source().expect("positive dimension").clone();
    let generator_target = generator.target().expect("positive dimension").clone();

    match boundary {
        // Attaching below: the generator's target matches the diagram's
        // source boundary, and the new level's forward limit collapses the
        // generator's source instead.
        Boundary::Source => {
            let old_source = composite.source.clone();
            let new_source =
                old_source.splice_region(point, &generator_target, &generator_source)?;
            let forward = new_source.contract_forward_limit(generator, point, &generator_source)?;
            let backward = old_source.contract_backward_limit(generator, point, &generator_target)?;

            let mut data = vec![Content { forward, backward }];
            data.extend(composite.data.iter().cloned());
            Ok(Attachment {
                diagram: Diagram::composite(new_source.clone(), data),
                slice: new_source,
            })
        }
        Boundary::Target => {
            let old_target = diagram.target()?;
            let new_target =
                old_target.splice_region(point, &generator_source, &generator_target)?;
            let forward = old_target.contract_forward_limit(generator, point, &generator_source)?;
            let backward = new_target.contract_backward_limit(generator, point, &generator_target)?;

            let mut data = composite.data.clone();
            data.push(Content { forward, backward });
            Ok(Attachment {
                diagram: Diagram::composite(composite.source.clone(), data),
                slice: new_target,
            })
        }
    }
}

/// Enumerate the legal attachment options for `generator` on `diagram`:
/// interior region matches when the generator sits one dimension above the
/// diagram, and boundary matches at the unique depth with the right
/// dimension otherwise.
pub fn matches(diagram: &Diagram, generator: &Generator) -> Vec<BoundaryPath> {
    let mut options = Vec::new();

    if generator.dimension() == diagram.dimension() + 1 {
        if let Some(source) = generator.source() {
            for point in embeddings(diagram, source) {
                options.push(BoundaryPath::interior(to_heights(&point, source)));
            }
        }
    }

    if generator.dimension() >= 1 && generator.dimension() <= diagram.dimension() {
        let depth = diagram.dimension() - generator.dimension() + 1;

        let mut source_boundary = Some(diagram.clone());
        let mut target_boundary = Some(diagram.clone());
        for _ in 0..depth {
            source_boundary = source_boundary.and_then(|d| d.source());
            target_boundary = target_boundary.and_then(|d| d.target().ok());
        }

        if let (Some(boundary), Some(region)) = (source_boundary, generator.target()) {
            for point in embeddings(&boundary, region) {
                options.push(BoundaryPath::at_boundary(
                    Boundary::Source,
                    depth,
                    to_heights(&point, region),
                ));
            }
        }
        if let (Some(boundary), Some(region)) = (target_boundary, generator.source()) {
            for point in embeddings(&boundary, region) {
                options.push(BoundaryPath::at_boundary(
                    Boundary::Target,
                    depth,
                    to_heights(&point, region),
                ));
            }
        }
    }

    options
}

/// All positions at which `sub` embeds in `diagram`, as region-start
/// coordinates, one per dimension.
pub(crate) fn embeddings(diagram: &Diagram, sub: &Diagram) -> Vec<Vec<usize>> {
    match (diagram, sub) {
        (Diagram::Object(a), Diagram::Object(b)) => {
            if a == b {
                vec![Vec::new()]
            } else {
                Vec::new()
            }
        }
        (Diagram::Composite(c), Diagram::Composite(s)) => {
            let k = s.data.len();
            if k > c.data.len() {
                return Vec::new();
            }
            let mut out = Vec::new();
            for p in 0..=c.data.len() - k {
                let deepers = if k == 0 {
                    match diagram.slice(Height::Regular(p)) {
                        Ok(slice) => embeddings(&slice, &s.source),
                        Err(_) => Vec::new(),
                    }
                } else {
                    match (diagram.slice(Height::Singular(p)), sub.slice(Height::Singular(0))) {
                        (Ok(slice), Ok(sub_slice)) => embeddings(&slice, &sub_slice),
                        _ => Vec::new(),
                    }
                };
                for deeper in deepers {
                    let fits = (0..k).all(|j| c.data[p + j] == s.data[j].pad(&deeper));
                    if fits {
                        let mut point = Vec::with_capacity(deeper.len() + 1);
                        point.push(p);
                        point.extend(deeper);
                        out.push(point);
                    }
                }
            }
            out
        }
        _ => Vec::new(),
    }
}

/// Express region-start coordinates as slice heights: singular where the
/// region has levels to cover, regular where it is a bare insertion point.
fn to_heights(point: &[usize], region: &Diagram) -> Vec<Height> {
    let mut heights = Vec::with_capacity(point.len());
    let mut current = region.clone();
    for &p in point {
        if current.size() > 0 {
            heights.push(Height::Singular(p));
            current = match current.slice(Height::Singular(0)) {
                Ok(slice) => slice,
                Err(_) => break,
            };
        } else {
            heights.push(Height::Regular(p));
            current = match current.source() {
                Some(source) => source,
                None => break,
            };
        }
    }
    heights
}
