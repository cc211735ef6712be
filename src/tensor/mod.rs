pub mod display;
pub mod index;
pub mod matrix;
pub mod range;
pub mod slice;
pub mod span;
#[allow(clippy::module_inception)]
pub mod tensor;

pub use display::DisplayWith;
pub use index::Axes;
pub use matrix::{StridedBuffer, StridedBufferMut};
pub use range::{AxisRange, Interval};
pub use slice::{SliceIter, TensorSlice, TensorSliceMut};
pub use span::{congruent, Span, SpanIter};
pub use tensor::Tensor;

use ndarray::{ArrayBase, Data, Ix2};
use smallvec::smallvec;

use crate::error::{Result, TensorError};

/// Anything that can hand out elements by N-dimensional coordinate.
/// Used as the source side of bulk assignment and comparison, so tensors,
/// views and matrices can be mixed as long as their shapes are congruent.
pub trait NdSource<T> {
    fn dims(&self) -> Axes<usize>;
    /// Element at a coordinate relative to the source origin, with exactly
    /// one index per axis
    fn element(&self, indices: &[usize]) -> Option<&T>;
}

impl<T, S: Data<Elem = T>> NdSource<T> for ArrayBase<S, Ix2> {
    fn dims(&self) -> Axes<usize> {
        let (rows, cols) = self.dim();
        smallvec![rows, cols]
    }

    fn element(&self, indices: &[usize]) -> Option<&T> {
        match *indices {
            [i, j] => self.get((i, j)),
            _ => None,
        }
    }
}

/// Element-wise comparison of two congruent sources, walking `a` in
/// row-major order and reading `b` at the trailing-aligned coordinate.
pub(crate) fn elements_equal<T, A, B>(a: &A, b: &B) -> Result<bool>
where
    T: PartialEq,
    A: NdSource<T> + ?Sized,
    B: NdSource<T> + ?Sized,
{
    let (da, db) = (a.dims(), b.dims());
    span::check_congruent(&da, &db)?;
    for idx in Span::zero_to(&da).iter() {
        let out_of_bounds = || TensorError::IndexOutOfBounds { index: idx.to_vec(), dims: db.to_vec() };
        let j = index::align_trailing(&idx, db.len()).ok_or_else(out_of_bounds)?;
        match (a.element(&idx), b.element(&j)) {
            (Some(x), Some(y)) => {
                if x != y {
                    return Ok(false);
                }
            }
            _ => return Err(out_of_bounds()),
        }
    }
    Ok(true)
}

/// Build one `Interval` per axis from integers and ranges,
/// *eg.* `slice![1, 0..=1, ..]`
#[macro_export]
macro_rules! slice {
    ($($e:expr),* $(,)?) => {
        [$($crate::tensor::Interval::from($e)),*]
    };
}
