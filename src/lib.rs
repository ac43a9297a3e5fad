//! # Globular Diagrams
//!
//! Recursive datastructures and rewriting for diagrams in a finitely
//! generated higher category: the combinatorial core of a proof assistant
//! for higher-dimensional algebra.
//!
//! An `n`-[Diagram](crate::diagram::Diagram) is a source `(n-1)`-diagram
//! plus an ordered list of singular levels; each level is a cospan of
//! [Limits](crate::limit::Limit) describing what changes at that height:
//!
//! ```text
//!   regular slice ──────   y
//!     ▲  backward limit    │
//!   singular slice       x f y
//!     ▲  forward limit     │
//!   regular slice ──────   x
//! ```
//!
//! Limits are height-collapsing maps recorded as sparse component lists;
//! their induced [Monotone](crate::monotone::Monotone) height maps unify
//! pairwise with a directional bias, or simultaneously through a
//! [DirectedQuotientGraph](crate::quotient::DirectedQuotientGraph). On top
//! of the data model sit the user-level edits: attaching a generator at a
//! located boundary path, contracting two adjacent levels into one,
//! expanding one level into two, and removing vacuous levels by
//! normalization — each producing a new immutable diagram that shares
//! untouched structure with the old one, and each preserving the
//! typechecking invariant at every dimension.
//!
//! ```rust
//! use globular_diagrams::prelude::*;
//!
//! // A signature with two points and an arrow between them.
//! let x = Generator::new_base(GeneratorId(0));
//! let y = Generator::new_base(GeneratorId(1));
//! let f = Generator::new(
//!     GeneratorId(2),
//!     Diagram::object(x.clone()),
//!     Diagram::object(y.clone()),
//! )
//! .unwrap();
//!
//! // Attach `f` at the only interior point of the 0-diagram `x`.
//! let point = BoundaryPath::interior(vec![]);
//! let attached = attach(&Diagram::object(x), &f, &point).unwrap();
//!
//! assert_eq!(attached.diagram.dimension(), 1);
//! assert_eq!(attached.diagram.size(), 1);
//! assert!(attached.diagram.typecheck().is_ok());
//! ```

pub mod error;
pub mod height;

pub mod generator;
pub mod monotone;
pub mod quotient;

pub mod diagram;
pub mod limit;

pub mod attach;
pub mod boundary;
pub mod contraction;
pub mod expansion;
pub mod normalize;
pub mod typecheck;
pub mod unify;

pub mod projection;
pub mod serial;

pub mod prelude {
    //! The common vocabulary of the crate under one import.
    pub use crate::attach::{attach, attach_generator, matches, Attachment};
    pub use crate::boundary::{Boundary, BoundaryPath};
    pub use crate::diagram::{Content, Diagram};
    pub use crate::error::{Error, TypecheckError};
    pub use crate::generator::{Generator, GeneratorId, Signature};
    pub use crate::height::Height;
    pub use crate::limit::{HigherLimit, Limit, LimitComponent, Subset};
    pub use crate::monotone::{Bias, Monotone};
    pub use crate::normalize::Normalization;
    pub use crate::projection::{edges_of, points_of};
    pub use crate::unify::{multi_unify, Unification, UnificationLower, UnificationUpper};
}
