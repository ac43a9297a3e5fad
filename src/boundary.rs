//! Boundary paths: classifying a point as interior or as lying on a
//! (possibly deeply nested) source or target boundary.

use crate::diagram::Diagram;
use crate::error::Error;
use crate::height::Height;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Boundary {
    Source,
    Target,
}

/// Where a point lives: `boundary` is `None` for interior points, and the
/// `depth` counts how many dimensions down the boundary lies. The `point`
/// holds the coordinates remaining after the boundary walk.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BoundaryPath {
    pub boundary: Option<Boundary>,
    pub depth: usize,
    pub point: Vec<Height>,
}

impl BoundaryPath {
    pub fn interior(point: Vec<Height>) -> Self {
        BoundaryPath {
            boundary: None,
            depth: 0,
            point,
        }
    }

    pub fn at_boundary(boundary: Boundary, depth: usize, point: Vec<Height>) -> Self {
        BoundaryPath {
            boundary: Some(boundary),
            depth,
            point,
        }
    }

    /// Walk down from the top dimension one coordinate at a time: a
    /// coordinate landing exactly on the bottom or top regular height of
    /// the current sub-diagram lies on that boundary, one dimension deeper
    /// per step; the first non-extreme coordinate ends the walk.
    pub fn of(diagram: &Diagram, point: &[Height]) -> Result<BoundaryPath, Error> {
        let mut boundary = None;
        let mut depth = 0;
        let mut current = diagram.clone();
        let mut index = 0;

        while index < point.len() {
            if matches!(current, Diagram::Object(_)) {
                break;
            }
            let size = current.size();
            match point[index] {
                Height::Regular(0) => {
                    boundary = Some(Boundary::Source);
                    current = current.source().expect("composite has a source");
                }
                Height::Regular(h) if h >= size => {
                    boundary = Some(Boundary::Target);
                    current = current.target()?;
                }
                _ => break,
            }
            depth += 1;
            index += 1;
        }

        Ok(BoundaryPath {
            boundary,
            depth,
            point: point[index..].to_vec(),
        })
    }

    /// The remaining coordinates as region-start positions, as consumed by
    /// the contraction limits.
    pub fn point_coordinates(&self) -> Vec<usize> {
        self.point
            .iter()
            .map(|h| match h {
                Height::Regular(r) => *r,
                Height::Singular(s) => *s,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Generator, GeneratorId};

    #[test]
    fn interior_point() {
        let x = Diagram::object(Generator::new_base(GeneratorId(0)));
        let path = BoundaryPath::of(&x, &[]).unwrap();
        assert_eq!(path.boundary, None);
        assert_eq!(path.depth, 0);
    }

    #[test]
    fn nested_source_boundary() {
        let x = Diagram::object(Generator::new_base(GeneratorId(0)));
        let double = x.identity().identity();
        let path =
            BoundaryPath::of(&double, &[Height::Regular(0), Height::Regular(0)]).unwrap();
        assert_eq!(path.boundary, Some(Boundary::Source));
        assert_eq!(path.depth, 2);
        assert!(path.point.is_empty());
    }
}
