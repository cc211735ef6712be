//! The bridge from N-dimensional addressing to contiguous runs of memory.
//!
//! Numeric kernels (ndarray's BLAS-backed routines here) only see a base
//! pointer, a starting offset, an element step and a count. A region of a
//! tensor is handed over without copying when it forms such a run: either a
//! row-major matrix block (`extract_matrix`) or a single strided line
//! (`buffer`).

use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, ShapeBuilder};

use super::index::{self as ind};
use super::slice::{TensorSlice, TensorSliceMut};
use super::span::Span;
use super::tensor::Tensor;
use crate::error::{Result, TensorError};

/// Rows, columns and first linear offset of `span` viewed as a matrix
/// over its last two axes.
///
/// Every axis before the second to last must be a singleton, and a block of
/// more than one row must cover full rows, so that the block is one
/// contiguous run under row-major layout. A rank 1 span is a single row.
fn matrix_layout(dims: &[usize], span: &Span) -> Result<(usize, usize, usize)> {
    span.check_within(dims)?;
    let rank = span.rank();
    let (rows, cols) = match rank {
        0 => return Err(TensorError::UnsupportedRank { rank }),
        1 => (1, span[0].len()),
        _ => (span[rank - 2].len(), span[rank - 1].len()),
    };
    let non_contiguous = || TensorError::NonContiguous {
        dims: span.dimensions().to_vec(),
        tensor_dims: dims.to_vec(),
    };
    if rank > 2 && span.ranges()[..rank - 2].iter().any(|r| r.len() != 1) {
        return Err(non_contiguous());
    }
    if rank >= 2 && rows > 1 && cols != dims[rank - 1] {
        return Err(non_contiguous());
    }
    if rows * cols == 0 {
        return Ok((rows, cols, 0));
    }
    let start = span.start_index();
    let offset = ind::linear_offset(&start, dims)
        .ok_or_else(|| TensorError::IndexOutOfBounds { index: start.to_vec(), dims: dims.to_vec() })?;
    Ok((rows, cols, offset))
}

/// Start offset, step and count of `span` when it is a single strided run:
/// at most one axis wider than 1, or a contiguous block where every axis
/// after the first wide one is full.
fn run_layout(dims: &[usize], strides: &[usize], span: &Span) -> Option<(usize, usize, usize)> {
    span.check_within(dims).ok()?;
    let count = span.count();
    if count == 0 {
        return Some((0, 1, 0));
    }
    let start = ind::linear_offset(&span.start_index(), dims)?;
    let wide: Vec<usize> = (0..span.rank()).filter(|&a| span[a].len() > 1).collect();
    match wide.as_slice() {
        [] => Some((start, 1, count)),
        [axis] => Some((start, strides[*axis], count)),
        [first, ..] => {
            let full = (first + 1..span.rank()).all(|a| span[a].start == 0 && span[a].end == dims[a]);
            if full {
                Some((start, 1, count))
            } else {
                None
            }
        }
    }
}

fn shape_error(expected: usize, actual: usize) -> TensorError {
    TensorError::ShapeMismatch { expected, actual }
}

impl<T> Tensor<T> {
    pub fn try_extract_matrix(&self, span: &Span) -> Result<ArrayView2<'_, T>> {
        let (rows, cols, offset) = matrix_layout(self.dimensions(), span)?;
        log::debug!("extracting {}x{} matrix at offset {} from {}", rows, cols, offset, span);
        let data = &self.as_slice()[offset..offset + rows * cols];
        ArrayView2::from_shape((rows, cols), data).map_err(|_| shape_error(rows * cols, data.len()))
    }

    /// Zero-copy matrix over the last two axes of `span`.
    /// Panics when the region is not contiguous.
    pub fn extract_matrix(&self, span: &Span) -> ArrayView2<'_, T> {
        match self.try_extract_matrix(span) {
            Ok(m) => m,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_extract_matrix_mut(&mut self, span: &Span) -> Result<ArrayViewMut2<'_, T>> {
        let (rows, cols, offset) = matrix_layout(self.dimensions(), span)?;
        log::debug!("extracting mutable {}x{} matrix at offset {} from {}", rows, cols, offset, span);
        let data = &mut self.as_mut_slice()[offset..offset + rows * cols];
        let len = data.len();
        ArrayViewMut2::from_shape((rows, cols), data).map_err(|_| shape_error(rows * cols, len))
    }

    pub fn extract_matrix_mut(&mut self, span: &Span) -> ArrayViewMut2<'_, T> {
        match self.try_extract_matrix_mut(span) {
            Ok(m) => m,
            Err(e) => panic!("{}", e),
        }
    }

    /// The whole storage as one packed run
    pub fn buffer(&self) -> StridedBuffer<'_, T> {
        StridedBuffer { data: self.as_slice(), start: 0, step: 1, count: self.len() }
    }

    pub fn buffer_mut(&mut self) -> StridedBufferMut<'_, T> {
        let count = self.len();
        StridedBufferMut { data: self.as_mut_slice(), start: 0, step: 1, count }
    }

    /// `span` as a single strided run, if it is one
    pub fn strided(&self, span: &Span) -> Option<StridedBuffer<'_, T>> {
        let (start, step, count) = run_layout(self.dimensions(), self.strides(), span)?;
        Some(StridedBuffer { data: self.as_slice(), start, step, count })
    }

    pub fn strided_mut(&mut self, span: &Span) -> Option<StridedBufferMut<'_, T>> {
        let (start, step, count) = run_layout(self.dimensions(), self.strides(), span)?;
        Some(StridedBufferMut { data: self.as_mut_slice(), start, step, count })
    }
}

impl<'a, T> TensorSlice<'a, T> {
    pub fn try_extract_matrix(&self) -> Result<ArrayView2<'a, T>> {
        self.base().try_extract_matrix(self.span())
    }

    pub fn extract_matrix(&self) -> ArrayView2<'a, T> {
        self.base().extract_matrix(self.span())
    }

    pub fn buffer(&self) -> Option<StridedBuffer<'a, T>> {
        self.base().strided(self.span())
    }
}

impl<'a, T> TensorSliceMut<'a, T> {
    pub fn try_extract_matrix(&self) -> Result<ArrayView2<'_, T>> {
        self.base().try_extract_matrix(self.span())
    }

    pub fn try_extract_matrix_mut(&mut self) -> Result<ArrayViewMut2<'_, T>> {
        let span = self.span().clone();
        self.base_mut().try_extract_matrix_mut(&span)
    }

    pub fn extract_matrix_mut(&mut self) -> ArrayViewMut2<'_, T> {
        match self.try_extract_matrix_mut() {
            Ok(m) => m,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn buffer(&self) -> Option<StridedBuffer<'_, T>> {
        self.base().strided(self.span())
    }

    pub fn buffer_mut(&mut self) -> Option<StridedBufferMut<'_, T>> {
        let span = self.span().clone();
        self.base_mut().strided_mut(&span)
    }
}

/// A read-only run of `count` elements of `data`, starting at `start` and
/// `step` elements apart.
#[derive(Debug)]
pub struct StridedBuffer<'a, T> {
    data: &'a [T],
    start: usize,
    step: usize,
    count: usize,
}

impl<'a, T> Clone for StridedBuffer<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for StridedBuffer<'a, T> {}

/// One past the last element touched by a run
fn run_end(start: usize, step: usize, count: usize) -> usize {
    if count == 0 {
        start
    } else {
        start + (count - 1) * step + 1
    }
}

impl<'a, T> StridedBuffer<'a, T> {
    #[inline]
    pub fn start_index(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end_index(&self) -> usize {
        run_end(self.start, self.step, self.count)
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Pointer to the first element of the run
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr().wrapping_add(self.start)
    }

    pub fn get(&self, i: usize) -> Option<&'a T> {
        if i >= self.count {
            return None;
        }
        self.data.get(self.start + i * self.step)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + 'a {
        self.data[self.start..].iter().step_by(self.step).take(self.count)
    }

    /// Hand the run to ndarray as a strided 1D view
    pub fn as_array_view(&self) -> Result<ArrayView1<'a, T>> {
        let tail = &self.data[self.start..];
        ArrayView1::from_shape((self.count,).strides((self.step,)), tail)
            .map_err(|_| shape_error(self.count, tail.len()))
    }
}

/// The mutable version of StridedBuffer, used as a kernel destination
#[derive(Debug)]
pub struct StridedBufferMut<'a, T> {
    data: &'a mut [T],
    start: usize,
    step: usize,
    count: usize,
}

impl<'a, T> StridedBufferMut<'a, T> {
    #[inline]
    pub fn start_index(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end_index(&self) -> usize {
        run_end(self.start, self.step, self.count)
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr().wrapping_add(self.start)
    }

    pub fn as_buffer(&self) -> StridedBuffer<'_, T> {
        StridedBuffer { data: self.data, start: self.start, step: self.step, count: self.count }
    }

    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        if i >= self.count {
            return None;
        }
        self.data.get_mut(self.start + i * self.step)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.data[self.start..].iter_mut().step_by(self.step).take(self.count)
    }

    pub fn as_array_view_mut(&mut self) -> Result<ArrayViewMut1<'_, T>> {
        let tail = &mut self.data[self.start..];
        let len = tail.len();
        ArrayViewMut1::from_shape((self.count,).strides((self.step,)), tail)
            .map_err(|_| shape_error(self.count, len))
    }
}
