//! Point and edge traversals for the layout collaborator.
//!
//! [`points_of`] and [`edges_of`] enumerate every addressable point and
//! edge of a diagram projected to a fixed number of coordinates, as finite
//! restartable iterators. Lower-dimensional diagrams are padded with the
//! bottom regular height so every emitted coordinate vector has exactly
//! the requested length.

use crate::diagram::Diagram;
use crate::error::Error;
use crate::height::Height;
use crate::limit::Limit;

/// A restartable traversal over projected points.
#[derive(Clone, Debug)]
pub struct Points {
    points: Vec<Vec<Height>>,
    cursor: usize,
}

impl Points {
    pub fn restart(&mut self) {
        self.cursor = 0;
    }
}

impl Iterator for Points {
    type Item = Vec<Height>;

    fn next(&mut self) -> Option<Vec<Height>> {
        let point = self.points.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(point)
    }
}

/// An edge between two adjacent points, directed from the regular towards
/// the singular slice: `dir` is `1` going up from below, `-1` coming down
/// from above, and `codim` is the depth at which the edge bends.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Edge {
    pub source: Vec<Height>,
    pub target: Vec<Height>,
    pub codim: usize,
    pub dir: i8,
}

/// A restartable traversal over projected edges.
#[derive(Clone, Debug)]
pub struct Edges {
    edges: Vec<Edge>,
    cursor: usize,
}

impl Edges {
    pub fn restart(&mut self) {
        self.cursor = 0;
    }
}

impl Iterator for Edges {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let edge = self.edges.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(edge)
    }
}

pub fn points_of(diagram: &Diagram, dimension: usize) -> Result<Points, Error> {
    let mut points = Vec::new();
    collect_points(diagram, dimension, &mut Vec::new(), &mut points)?;
    Ok(Points { points, cursor: 0 })
}

pub fn edges_of(diagram: &Diagram, dimension: usize) -> Result<Edges, Error> {
    let mut edges = Vec::new();
    collect_edges(diagram, dimension, &mut Vec::new(), 0, &mut edges)?;
    Ok(Edges { edges, cursor: 0 })
}

fn collect_points(
    diagram: &Diagram,
    dimension: usize,
    prefix: &mut Vec<Height>,
    out: &mut Vec<Vec<Height>>,
) -> Result<(), Error> {
    if dimension == 0 {
        out.push(prefix.clone());
        return Ok(());
    }
    match diagram {
        Diagram::Object(_) => {
            prefix.push(Height::Regular(0));
            collect_points(diagram, dimension - 1, prefix, out)?;
            prefix.pop();
        }
        Diagram::Composite(_) => {
            for raw in 0..=2 * diagram.size() {
                let height = Height::from_raw(raw);
                let slice = diagram.slice(height)?;
                prefix.push(height);
                collect_points(&slice, dimension - 1, prefix, out)?;
                prefix.pop();
            }
        }
    }
    Ok(())
}

fn collect_edges(
    diagram: &Diagram,
    dimension: usize,
    prefix: &mut Vec<Height>,
    codim: usize,
    out: &mut Vec<Edge>,
) -> Result<(), Error> {
    if dimension == 0 {
        return Ok(());
    }
    let Diagram::Composite(composite) = diagram else {
        return Ok(());
    };

    for (h, content) in composite.data.iter().enumerate() {
        let below = diagram.slice(Height::Regular(h))?;
        let above = diagram.slice(Height::Regular(h + 1))?;

        for (regular, limit, dir) in [
            (&below, &content.forward, 1i8),
            (&above, &content.backward, -1i8),
        ] {
            let regular_height = if dir > 0 { h } else { h + 1 };
            for point in points_of(regular, dimension - 1)? {
                let mut source = prefix.clone();
                source.push(Height::Regular(regular_height));
                source.extend(point.iter().copied());

                let mut target = prefix.clone();
                target.push(Height::Singular(h));
                target.extend(transport(limit, &point));

                out.push(Edge {
                    source,
                    target,
                    codim,
                    dir,
                });
            }
        }
    }

    // Deeper edges live inside the slices.
    for raw in 0..=2 * diagram.size() {
        let height = Height::from_raw(raw);
        let slice = diagram.slice(height)?;
        prefix.push(height);
        collect_edges(&slice, dimension - 1, prefix, codim + 1, out)?;
        prefix.pop();
    }
    Ok(())
}

/// Map a point of a limit's source slice to the corresponding point of its
/// target slice: singular coordinates follow the induced monotone and
/// recurse along the sublimit, regular coordinates follow the count of
/// target heights below their image.
fn transport(limit: &Limit, point: &[Height]) -> Vec<Height> {
    let Some((&head, rest)) = point.split_first() else {
        return Vec::new();
    };
    match head {
        Height::Singular(j) => {
            let target = limit.monotone(j + 1).apply(j);
            let mut out = vec![Height::Singular(target)];
            out.extend(transport(&limit.sublimit(j), rest));
            out
        }
        Height::Regular(j) => {
            let target = limit.monotone(j).target_size();
            let mut out = vec![Height::Regular(target)];
            out.extend(rest.iter().copied());
            out
        }
    }
}
