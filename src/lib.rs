//! N-dimensional tensors over dense row-major storage.
//!
//! A [`Tensor`] owns its elements. Rectangular regions are described by a
//! [`Span`], one half-open [`AxisRange`] per axis, and borrowed as
//! [`TensorSlice`] / [`TensorSliceMut`] views that read and write the base
//! storage directly. Congruent regions can be bulk assigned into one another,
//! and contiguous regions can be handed to ndarray as zero-copy matrices.
//!
//! ```
//! use tensorspan::{slice, Tensor};
//!
//! let mut t = Tensor::from_vec(&[2, 2, 2], vec![1, 2, 2, 2, 5, 2, 5, 1]);
//! assert_eq!(t.slice(&slice![1, 0..=1, 0]).to_vec(), vec![5, 5]);
//! t[[0, 1, 1]] = 16;
//! assert_eq!(t, Tensor::from_vec(&[2, 2, 2], vec![1, 2, 2, 16, 5, 2, 5, 1]));
//! ```

pub mod config;
pub mod error;
pub mod tensor;

pub use config::{Config, PrintOptions};
pub use error::{Result, TensorError};
pub use tensor::{
    congruent, AxisRange, Interval, NdSource, Span, SpanIter, StridedBuffer, StridedBufferMut, Tensor,
    TensorSlice, TensorSliceMut,
};
