//! Contraction: merging two adjacent singular levels into one.
//!
//! The contraction limit at a located point is built by recursing through
//! the location one coordinate at a time; at the last coordinate the two
//! neighboring contents are unified through their shared regular slice via
//! [`multi_unify`], with an optional directional bias resolving ambiguous
//! interleavings.

use log::debug;

use crate::diagram::{Content, Diagram};
use crate::error::Error;
use crate::height::Height;
use crate::limit::{HigherLimit, Limit, LimitComponent};
use crate::monotone::Bias;
use crate::unify::{multi_unify, UnificationLower, UnificationUpper};

impl Diagram {
    /// The limit collapsing the singular levels `h` and `h + 1` at the
    /// located point into one level.
    ///
    /// # Errors
    ///
    /// [`Error::NoUnification`] when the two levels interleave ambiguously
    /// and no bias was given; structural errors for malformed locations.
    pub fn contraction_limit(
        &self,
        location: &[Height],
        bias: Option<Bias>,
    ) -> Result<Limit, Error> {
        let Diagram::Composite(composite) = self else {
            return Err(Error::ZeroDimensional);
        };
        let (&head, rest) = location.split_first().ok_or(Error::MalformedPoint)?;
        let Height::Singular(height) = head else {
            return Err(Error::MalformedPoint);
        };

        if !rest.is_empty() {
            // Interior coordinate: contract inside the slice and lift the
            // resulting limit through one component.
            let slice = self.slice(head)?;
            let inner = slice.contraction_limit(rest, bias)?;
            let content = &composite.data[height];
            let target_data = Content {
                forward: content.forward.compose(&inner)?,
                backward: content.backward.compose(&inner)?,
            };
            return Ok(Limit::Higher(HigherLimit {
                n: self.dimension(),
                components: vec![LimitComponent {
                    first: height,
                    source_data: vec![content.clone()],
                    target_data,
                    sublimits: vec![inner],
                }],
            }));
        }

        if height + 1 >= composite.data.len() {
            return Err(Error::HeightOutOfBounds {
                height: height + 1,
                size: composite.data.len(),
            });
        }

        let lower = self.slice(Height::Singular(height))?;
        let upper = self.slice(Height::Singular(height + 1))?;
        let between = self.slice(Height::Regular(height + 1))?;

        let (bias_lower, bias_upper) = match bias {
            Some(Bias::Left) => (true, false),
            Some(Bias::Right) => (false, true),
            None => (false, false),
        };
        let unification = multi_unify(
            &[
                UnificationUpper {
                    diagram: lower,
                    bias_left: bias_lower,
                },
                UnificationUpper {
                    diagram: upper,
                    bias_left: bias_upper,
                },
            ],
            &[UnificationLower {
                source: between,
                left_index: 0,
                left: composite.data[height].backward.clone(),
                right_index: 1,
                right: composite.data[height + 1].forward.clone(),
            }],
        )?;

        let target_data = Content {
            forward: composite.data[height]
                .forward
                .compose(&unification.limits[0])?,
            backward: composite.data[height + 1]
                .backward
                .compose(&unification.limits[1])?,
        };

        Ok(Limit::Higher(HigherLimit {
            n: self.dimension(),
            components: vec![LimitComponent {
                first: height,
                source_data: composite.data[height..height + 2].to_vec(),
                target_data,
                sublimits: unification.limits,
            }],
        }))
    }

    /// Contract the levels at `location`, returning the new diagram.
    pub fn contract(&self, location: &[Height], bias: Option<Bias>) -> Result<Diagram, Error> {
        debug!("contracting at {location:?}");
        let limit = self.contraction_limit(location, bias)?;
        limit.rewrite_forward(self)
    }
}
