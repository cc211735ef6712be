//! Precondition failures of the tensor view engine.
//!
//! Every operation that can fail has a panicking form whose message is the
//! display string of one of these variants, and a `try_` form returning it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    /// Element buffer does not hold `product(dimensions)` values.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A span or index carries the wrong number of axes.
    #[error("rank mismatch: expected {expected} axes, got {actual}")]
    RankMismatch { expected: usize, actual: usize },

    #[error("index {index:?} is out of bounds for dimensions {dims:?}")]
    IndexOutOfBounds { index: Vec<usize>, dims: Vec<usize> },

    /// Range on `axis` reaches past the extent of that axis.
    #[error("range {start}..{end} on axis {axis} is out of bounds for size {size}")]
    SpanOutOfBounds {
        axis: usize,
        start: usize,
        end: usize,
        size: usize,
    },

    #[error("invalid range {start}..{end}: start is past end")]
    InvalidRange { start: usize, end: usize },

    /// The selected region is not one contiguous row-major block.
    #[error("span with dimensions {dims:?} over tensor {tensor_dims:?} is not contiguous as a matrix")]
    NonContiguous {
        dims: Vec<usize>,
        tensor_dims: Vec<usize>,
    },

    #[error("dimensions {lhs:?} and {rhs:?} are not congruent")]
    Incongruent { lhs: Vec<usize>, rhs: Vec<usize> },

    #[error("operation does not support rank {rank}")]
    UnsupportedRank { rank: usize },
}

pub type Result<T> = std::result::Result<T, TensorError>;
