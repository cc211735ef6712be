use std::ops::{Index, IndexMut};

use ndarray::{Array2, ArrayBase, Data, Ix2};
use num::{One, Zero};
use smallvec::SmallVec;

use super::index::{self as ind, Axes};
use super::range::Interval;
use super::slice::{TensorSlice, TensorSliceMut};
use super::span::{congruent, Span};
use super::{elements_equal, NdSource};
use crate::error::{Result, TensorError};

/////////////////////////////////////////////////////////////////////
// The Tensor owns its elements as one dense row-major buffer
// Supports multidimensional indexing and slicing into aliasing views
/////////////////////////////////////////////////////////////////////
#[derive(Clone, Debug)]
pub struct Tensor<T> {
    dims: Axes<usize>,    // dimensions row-major
    strides: Axes<usize>, // strides row-major
    data: Vec<T>,         // product(dims) elements
}

impl<T> Tensor<T> {
    /// Take ownership of `data`, laid out row-major over `dims`.
    /// Panics if `data` does not hold exactly `product(dims)` elements.
    pub fn from_vec(dims: &[usize], data: Vec<T>) -> Tensor<T> {
        match Tensor::try_from_vec(dims, data) {
            Ok(t) => t,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_from_vec(dims: &[usize], data: Vec<T>) -> Result<Tensor<T>> {
        let expected: usize = dims.iter().product();
        if data.len() != expected {
            return Err(TensorError::ShapeMismatch { expected, actual: data.len() });
        }
        Ok(Tensor { dims: SmallVec::from_slice(dims), strides: ind::compute_strides(dims), data })
    }

    pub fn from_fn<F: FnMut() -> T>(dims: &[usize], elem_fn: F) -> Tensor<T> {
        let nelems: usize = dims.iter().product();
        let data = std::iter::repeat_with(elem_fn).take(nelems).collect();
        Tensor::from_vec(dims, data)
    }

    #[inline]
    pub fn dimensions(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// The full extent of the tensor
    pub fn span(&self) -> Span {
        Span::zero_to(&self.dims)
    }

    /// Linear offset of a coordinate with exactly one index per axis
    #[inline]
    pub fn strict_offset(&self, indices: &[usize]) -> Option<usize> {
        ind::linear_offset(indices, &self.dims)
    }

    /// Linear offset of a coordinate. Fewer indices than axes address the
    /// trailing axes, the missing leading indices read as 0.
    #[inline]
    pub fn offset(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() == self.rank() {
            return self.strict_offset(indices);
        }
        ind::linear_offset(&ind::pad_leading(indices, self.rank()), &self.dims)
    }

    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        self.offset(indices).map(|i| &self.data[i])
    }

    pub fn get_mut(&mut self, indices: &[usize]) -> Option<&mut T> {
        self.offset(indices).map(move |i| &mut self.data[i])
    }

    pub fn get_strict(&self, indices: &[usize]) -> Option<&T> {
        self.strict_offset(indices).map(|i| &self.data[i])
    }

    pub(crate) fn index_error(&self, indices: &[usize]) -> TensorError {
        if indices.len() > self.rank() {
            return TensorError::RankMismatch { expected: self.rank(), actual: indices.len() };
        }
        TensorError::IndexOutOfBounds { index: indices.to_vec(), dims: self.dims.to_vec() }
    }

    fn checked_offset(&self, indices: &[usize]) -> usize {
        match self.offset(indices) {
            Some(i) => i,
            None => panic!("{}", self.index_error(indices)),
        }
    }

    /// A read-only view over `span`, given in this tensor's coordinates
    pub fn try_view(&self, span: Span) -> Result<TensorSlice<'_, T>> {
        span.check_within(&self.dims)?;
        Ok(TensorSlice::new(self, span))
    }

    pub fn view(&self, span: Span) -> TensorSlice<'_, T> {
        match self.try_view(span) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_view_mut(&mut self, span: Span) -> Result<TensorSliceMut<'_, T>> {
        span.check_within(&self.dims)?;
        Ok(TensorSliceMut::new(self, span))
    }

    pub fn view_mut(&mut self, span: Span) -> TensorSliceMut<'_, T> {
        match self.try_view_mut(span) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        }
    }

    /// Slice with one `Interval` per axis, eg. `t.slice(&slice![1, 0..=1, ..])`.
    /// Axes past the last interval are taken whole; only `view` with a
    /// `Span` requires exactly one range per axis.
    pub fn try_slice(&self, intervals: &[Interval]) -> Result<TensorSlice<'_, T>> {
        let span = Span::from_intervals(&self.dims, intervals)?;
        Ok(TensorSlice::new(self, span))
    }

    pub fn slice(&self, intervals: &[Interval]) -> TensorSlice<'_, T> {
        match self.try_slice(intervals) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_slice_mut(&mut self, intervals: &[Interval]) -> Result<TensorSliceMut<'_, T>> {
        let span = Span::from_intervals(&self.dims, intervals)?;
        Ok(TensorSliceMut::new(self, span))
    }

    pub fn slice_mut(&mut self, intervals: &[Interval]) -> TensorSliceMut<'_, T> {
        match self.try_slice_mut(intervals) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        }
    }

    /// Compare element-wise against any congruent source.
    /// Panics if the shapes are not congruent.
    pub fn congruent_eq<S: NdSource<T> + ?Sized>(&self, other: &S) -> bool
    where
        T: PartialEq,
    {
        match elements_equal(self, other) {
            Ok(eq) => eq,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T: Clone> Tensor<T> {
    pub fn from_elem(dims: &[usize], value: T) -> Tensor<T> {
        let nelems: usize = dims.iter().product();
        Tensor::from_vec(dims, vec![value; nelems])
    }

    /// Copy `data` into newly owned storage
    pub fn from_slice(dims: &[usize], data: &[T]) -> Tensor<T> {
        Tensor::from_vec(dims, data.to_vec())
    }

    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|x| *x = value.clone());
    }

    pub fn try_assign<S: NdSource<T> + ?Sized>(&mut self, values: &S) -> Result<()> {
        let span = self.span();
        TensorSliceMut::new(self, span).try_assign(values)
    }

    /// Overwrite every element from a congruent source
    pub fn assign<S: NdSource<T> + ?Sized>(&mut self, values: &S) {
        if let Err(e) = self.try_assign(values) {
            panic!("{}", e);
        }
    }

    /// Copy out as a 2D array. Rank 1 becomes a single row.
    pub fn to_array2(&self) -> Result<Array2<T>> {
        let (rows, cols) = match *self.dims.as_slice() {
            [c] => (1, c),
            [r, c] => (r, c),
            _ => return Err(TensorError::UnsupportedRank { rank: self.rank() }),
        };
        Array2::from_shape_vec((rows, cols), self.data.clone())
            .map_err(|_| TensorError::ShapeMismatch { expected: rows * cols, actual: self.len() })
    }
}

impl<T: Default + Clone> Tensor<T> {
    /// Storage of the right size holding `T::default()`
    pub fn new(dims: &[usize]) -> Tensor<T> {
        Tensor::from_elem(dims, T::default())
    }
}

impl<T: Zero + Clone> Tensor<T> {
    pub fn zeros(dims: &[usize]) -> Tensor<T> {
        Tensor::from_elem(dims, T::zero())
    }
}

impl<T: One + Clone> Tensor<T> {
    pub fn ones(dims: &[usize]) -> Tensor<T> {
        Tensor::from_elem(dims, T::one())
    }
}

/// A matrix is reinterpreted as a rank 2 tensor
impl<T: Clone> From<Array2<T>> for Tensor<T> {
    fn from(m: Array2<T>) -> Self {
        let (rows, cols) = m.dim();
        Tensor::from_vec(&[rows, cols], m.iter().cloned().collect())
    }
}

/////////////////////////////////////////////////////////////////////
/// Indexing operations for Tensor, always checks inbounds
/////////////////////////////////////////////////////////////////////

impl<T, const N: usize> Index<[usize; N]> for Tensor<T> {
    type Output = T;
    fn index(&self, indices: [usize; N]) -> &T {
        &self.data[self.checked_offset(&indices)]
    }
}

impl<T, const N: usize> IndexMut<[usize; N]> for Tensor<T> {
    fn index_mut(&mut self, indices: [usize; N]) -> &mut T {
        let i = self.checked_offset(&indices);
        &mut self.data[i]
    }
}

impl<'a, T> Index<&'a [usize]> for Tensor<T> {
    type Output = T;
    fn index(&self, indices: &'a [usize]) -> &T {
        &self.data[self.checked_offset(indices)]
    }
}

impl<'a, T> IndexMut<&'a [usize]> for Tensor<T> {
    fn index_mut(&mut self, indices: &'a [usize]) -> &mut T {
        let i = self.checked_offset(indices);
        &mut self.data[i]
    }
}

impl<T> NdSource<T> for Tensor<T> {
    fn dims(&self) -> Axes<usize> {
        self.dims.clone()
    }

    fn element(&self, indices: &[usize]) -> Option<&T> {
        self.get_strict(indices)
    }
}

/// Equal when the shapes are congruent and the elements match in order
impl<T: PartialEq> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        congruent(&self.dims, &other.dims) && self.data == other.data
    }
}

impl<T: PartialEq, S: Data<Elem = T>> PartialEq<ArrayBase<S, Ix2>> for Tensor<T> {
    fn eq(&self, other: &ArrayBase<S, Ix2>) -> bool {
        let (rows, cols) = other.dim();
        congruent(&self.dims, &[rows, cols]) && self.data.iter().eq(other.iter())
    }
}
