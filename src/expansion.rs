//! Expansion: splitting one singular level into two.
//!
//! The inverse move to contraction. The expansion limit maps the expanded
//! diagram back onto the original, so expanding is un-applying it with
//! [`Limit::rewrite_backward`]. At the base case the located level's
//! content is factored directly: components below the split height stay in
//! one level, components at or above it move to the other, with the
//! direction chosen by `up`.

use log::debug;

use crate::diagram::{Content, Diagram};
use crate::error::Error;
use crate::height::Height;
use crate::limit::{HigherLimit, Limit, LimitComponent};

impl Diagram {
    /// The limit contracting the two levels of the expanded diagram back
    /// into the located level of `self`.
    ///
    /// The location names the level to split and, one dimension down, the
    /// singular height of the split; deeper coordinates recurse into the
    /// slice, which succeeds only when the level's cospan factors through
    /// the deeper expansion.
    pub fn expansion_limit(&self, location: &[Height], up: bool) -> Result<Limit, Error> {
        let Diagram::Composite(composite) = self else {
            return Err(Error::ZeroDimensional);
        };
        if location.len() < 2 {
            return Err(Error::MalformedPoint);
        }
        let Height::Singular(height) = location[0] else {
            return Err(Error::MalformedPoint);
        };
        if height >= composite.data.len() {
            return Err(Error::HeightOutOfBounds {
                height,
                size: composite.data.len(),
            });
        }

        if location.len() > 2 {
            let slice = self.slice(location[0])?;
            let inner = slice.expansion_limit(&location[1..], up)?;
            let content = &composite.data[height];
            let expanded = Content {
                forward: factor_through(&content.forward, &inner)?,
                backward: factor_through(&content.backward, &inner)?,
            };
            return Ok(Limit::Higher(HigherLimit {
                n: self.dimension(),
                components: vec![LimitComponent {
                    first: height,
                    source_data: vec![expanded],
                    target_data: content.clone(),
                    sublimits: vec![inner],
                }],
            }));
        }

        let Height::Singular(split) = location[1] else {
            return Err(Error::MalformedPoint);
        };

        let content = &composite.data[height];
        let (forward_low, forward_high) = split_components(&content.forward, split)?;
        let (backward_low, backward_high) = split_components(&content.backward, split)?;
        let m = content.dimension();

        // Height difference between the two sides' preimages of the low
        // region, used to re-express the deferred components.
        let collapsed = |components: &[LimitComponent]| -> isize {
            components.iter().map(|c| c.len() as isize - 1).sum()
        };
        let low_forward = collapsed(&forward_low);
        let low_backward = collapsed(&backward_low);

        let higher = |components: Vec<LimitComponent>| {
            Limit::Higher(HigherLimit { n: m, components })
        };

        let (source_data, sublimits) = if up {
            // Low half happens first; the high half is deferred.
            let level_low = Content {
                forward: higher(forward_low.clone()),
                backward: higher(backward_low.clone()),
            };
            let level_high = Content {
                forward: higher(forward_high.clone()).shift(low_backward - low_forward),
                backward: higher(backward_high),
            };
            (
                vec![level_low, level_high],
                vec![
                    higher(forward_high).shift(-low_forward),
                    higher(backward_low),
                ],
            )
        } else {
            // High half happens first; the low half is deferred.
            let level_high = Content {
                forward: higher(forward_high.clone()),
                backward: higher(backward_high.clone()).shift(low_forward - low_backward),
            };
            let level_low = Content {
                forward: higher(forward_low.clone()),
                backward: higher(backward_low.clone()),
            };
            (
                vec![level_high, level_low],
                vec![
                    higher(forward_low),
                    higher(backward_high).shift(-low_backward),
                ],
            )
        };

        Ok(Limit::Higher(HigherLimit {
            n: self.dimension(),
            components: vec![LimitComponent {
                first: height,
                source_data,
                target_data: content.clone(),
                sublimits,
            }],
        }))
    }

    /// Expand the level at `location`, returning the new diagram.
    pub fn expand(&self, location: &[Height], up: bool) -> Result<Diagram, Error> {
        debug!("expanding at {location:?}");
        let limit = self.expansion_limit(location, up)?;
        limit.rewrite_backward(self)
    }
}

/// Partition a limit's components by whether they collapse into a target
/// height below `split`.
fn split_components(
    limit: &Limit,
    split: usize,
) -> Result<(Vec<LimitComponent>, Vec<LimitComponent>), Error> {
    let Limit::Higher(_) = limit else {
        // A one-dimensional diagram's levels have nothing to split.
        return Err(Error::MalformedPoint);
    };
    let mut low = Vec::new();
    let mut high = Vec::new();
    for (index, component) in limit.components().iter().enumerate() {
        if limit.component_target_height(index) < split {
            low.push(component.clone());
        } else {
            high.push(component.clone());
        }
    }
    Ok((low, high))
}

/// Factor `limit : r → s` through a deeper expansion `inner : e → s`,
/// producing `r → e`. This succeeds when nothing in `limit` collapses into
/// the expanded level and one side of the expansion is vacuous: the level
/// passes through by identity, plus an insertion of the vacuous side.
fn factor_through(limit: &Limit, inner: &Limit) -> Result<Limit, Error> {
    if inner.is_identity() {
        return Ok(limit.clone());
    }
    let [expansion] = inner.components() else {
        return Err(Error::NonFactorizable);
    };
    let target = inner.component_target_height(0);
    if limit
        .components()
        .iter()
        .enumerate()
        .any(|(i, _)| limit.component_target_height(i) == target)
    {
        return Err(Error::NonFactorizable);
    }
    if expansion.source_data.len() != 2 {
        return Err(Error::NonFactorizable);
    }

    // The identity height of `limit` passing through the expanded level.
    let passthrough = limit.source_height_of(target);

    let vacuous_insertion = if expansion.sublimits[0].is_identity()
        && expansion.source_data[0] == expansion.target_data
    {
        // First expanded level carries the content; insert the second.
        LimitComponent {
            first: passthrough + 1,
            source_data: Vec::new(),
            target_data: expansion.source_data[1].clone(),
            sublimits: Vec::new(),
        }
    } else if expansion.sublimits[1].is_identity()
        && expansion.source_data[1] == expansion.target_data
    {
        LimitComponent {
            first: passthrough,
            source_data: Vec::new(),
            target_data: expansion.source_data[0].clone(),
            sublimits: Vec::new(),
        }
    } else {
        return Err(Error::NonFactorizable);
    };

    let Limit::Higher(h) = limit else {
        return Err(Error::NonFactorizable);
    };
    let mut components = h.components.clone();
    let position = components
        .iter()
        .position(|c| c.first >= vacuous_insertion.first)
        .unwrap_or(components.len());
    components.insert(position, vacuous_insertion);
    Ok(Limit::Higher(HigherLimit {
        n: h.n,
        components,
    }))
}

#[cfg(test)]
mod tests {
    use super::factor_through;
    use crate::diagram::Content;
    use crate::generator::{Generator, GeneratorId};
    use crate::limit::{HigherLimit, Limit, LimitComponent};

    fn vacuous() -> Content {
        Content {
            forward: Limit::identity(0),
            backward: Limit::identity(0),
        }
    }

    #[test]
    fn factoring_through_a_trivial_expansion_inserts_the_vacuous_level() {
        let x = Generator::new_base(GeneratorId(0));
        let y = Generator::new_base(GeneratorId(1));
        let p = Generator::new_base(GeneratorId(2));

        let level = Content {
            forward: Limit::relabel(x, p.clone()),
            backward: Limit::relabel(y.clone(), p.clone()),
        };

        // An expansion of target level 0 whose second half is vacuous.
        let inner = Limit::Higher(HigherLimit {
            n: 1,
            components: vec![LimitComponent {
                first: 0,
                source_data: vec![level.clone(), vacuous()],
                target_data: level.clone(),
                sublimits: vec![Limit::identity(0), Limit::relabel(y, p)],
            }],
        });

        // A limit touching only target level 1 passes through the
        // expansion, picking up an insertion for the vacuous half.
        let untouched = Limit::Higher(HigherLimit {
            n: 1,
            components: vec![LimitComponent {
                first: 1,
                source_data: vec![level.clone()],
                target_data: level.clone(),
                sublimits: vec![Limit::identity(0)],
            }],
        });

        let factored = factor_through(&untouched, &inner).unwrap();
        assert_eq!(factored.components().len(), 2);
        assert!(factored.components()[0].is_empty());
        assert_eq!(factored.component_target_height(0), 1);
        assert_eq!(factored.component_target_height(1), 2);

        // The identity factors into a bare insertion of the vacuous level.
        let identity = factor_through(&Limit::identity(1), &inner).unwrap();
        assert_eq!(identity.components().len(), 1);
        assert!(identity.components()[0].is_empty());

        // A limit collapsing into the expanded level does not factor.
        let collapsing = Limit::Higher(HigherLimit {
            n: 1,
            components: vec![LimitComponent {
                first: 0,
                source_data: vec![level.clone(), level.clone()],
                target_data: level,
                sublimits: vec![Limit::identity(0), Limit::identity(0)],
            }],
        });
        assert!(factor_through(&collapsing, &inner).is_err());
    }
}
