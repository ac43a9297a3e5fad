//! Error types for diagram operations.
//!
//! Conditions reachable through normal user input (bad attachment points,
//! ambiguous unifications) are recoverable and threaded back through the
//! public operations as [`Error`] values. Conditions that can only arise
//! from a defect inside the engine (malformed component spans, a cyclic
//! linear order) are treated as fatal and surface as assertions.

use thiserror::Error;

use crate::generator::GeneratorId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("height {height} out of bounds for a diagram of size {size}")]
    HeightOutOfBounds { height: usize, size: usize },

    #[error("point does not address a location of the diagram")]
    MalformedPoint,

    #[error("zero-dimensional diagrams have no levels")]
    ZeroDimensional,

    #[error("attachment region does not match the generator boundary")]
    BoundaryMismatch,

    /// Two monotones demand simultaneous insertions at the same position
    /// and no bias was supplied to order them.
    #[error("no monotone unification without a bias")]
    NoUnification,

    #[error("monotone sources differ in length: {left} vs {right}")]
    SourceLengthMismatch { left: usize, right: usize },

    /// Distinct maximal-dimension cell types met at a point.
    #[error("incompatible cell types cannot be unified")]
    IncompatibleTypes,

    /// A limit does not factor through the requested expansion.
    #[error("limit does not factor through the expansion")]
    NonFactorizable,

    #[error("malformed limit: {reason}")]
    MalformedLimit { reason: &'static str },

    #[error("unknown generator {0:?}")]
    UnknownGenerator(GeneratorId),

    #[error(transparent)]
    Typecheck(#[from] TypecheckError),
}

/// Failures detected by the recursive typechecking walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypecheckError {
    #[error("malformed limit at height {height}: {reason}")]
    MalformedLimit { height: usize, reason: &'static str },

    #[error("cospan limits disagree on the singular slice at height {height}")]
    CospanMismatch { height: usize },

    #[error("level at height {height} does not match the boundary of generator {id:?}")]
    BoundaryViolation { height: usize, id: GeneratorId },

    #[error("rewriting failed during typechecking at height {height}")]
    RewriteFailure { height: usize },
}
