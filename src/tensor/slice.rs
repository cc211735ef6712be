use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use smallvec::SmallVec;

use super::index::{self as ind, Axes};
use super::range::Interval;
use super::span::{self, Span, SpanIter};
use super::tensor::Tensor;
use super::{elements_equal, NdSource};
use crate::error::{Result, TensorError};

/////////////////////////////////////////////////////////////////////
/// TensorSlice represents a view of a Tensor, the memory order may not be contiguous
/////////////////////////////////////////////////////////////////////

/// A potentially non-contiguous view into a `Tensor`,
/// *eg.* `t.slice(&slice![.., 1..5, .., 2..4])`.
///
/// The span is kept in the base tensor's coordinates and always has the
/// base's rank; narrowing an axis makes it a singleton instead of dropping it.
pub struct TensorSlice<'a, T> {
    base: &'a Tensor<T>,
    span: Span,
}

/// The mutable version of TensorSlice. Writes land directly in the base.
pub struct TensorSliceMut<'a, T> {
    base: &'a mut Tensor<T>,
    span: Span,
}

/// Map a slice-relative coordinate (one index per axis) into the base
fn absolute_index(span: &Span, indices: &[usize]) -> Option<Axes<usize>> {
    if indices.len() != span.rank() {
        return None;
    }
    let mut abs: Axes<usize> = SmallVec::with_capacity(indices.len());
    for (r, &i) in span.ranges().iter().zip(indices.iter()) {
        if i >= r.len() {
            return None;
        }
        abs.push(r.start + i);
    }
    Some(abs)
}

fn strict_offset<T>(base: &Tensor<T>, span: &Span, indices: &[usize]) -> Option<usize> {
    absolute_index(span, indices).and_then(|abs| base.strict_offset(&abs))
}

/// Right-aligned: missing leading indices read as 0
fn offset<T>(base: &Tensor<T>, span: &Span, indices: &[usize]) -> Option<usize> {
    if indices.len() == span.rank() {
        return strict_offset(base, span, indices);
    }
    strict_offset(base, span, &ind::pad_leading(indices, span.rank()))
}

fn index_error(span: &Span, indices: &[usize]) -> TensorError {
    if indices.len() > span.rank() {
        return TensorError::RankMismatch { expected: span.rank(), actual: indices.len() };
    }
    TensorError::IndexOutOfBounds { index: indices.to_vec(), dims: span.dimensions().to_vec() }
}

/// Resolve intervals relative to a view and move them into base coordinates
fn sub_span(span: &Span, intervals: &[Interval]) -> Result<Span> {
    let relative = Span::from_intervals(&span.dimensions(), intervals)?;
    Ok(relative.translate(&span.start_index()))
}

fn sub_view(span: &Span, relative: &Span) -> Result<Span> {
    relative.check_within(&span.dimensions())?;
    Ok(span + relative)
}

impl<'a, T> TensorSlice<'a, T> {
    /// `span` must already be validated against `base`
    pub(crate) fn new(base: &'a Tensor<T>, span: Span) -> TensorSlice<'a, T> {
        TensorSlice { base, span }
    }

    pub fn base(&self) -> &'a Tensor<T> {
        self.base
    }

    /// The region covered, in base coordinates
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn dimensions(&self) -> Axes<usize> {
        self.span.dimensions()
    }

    pub fn start_index(&self) -> Axes<usize> {
        self.span.start_index()
    }

    pub fn rank(&self) -> usize {
        self.span.rank()
    }

    pub fn count(&self) -> usize {
        self.span.count()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    pub fn get(&self, indices: &[usize]) -> Option<&'a T> {
        let base = self.base;
        offset(base, &self.span, indices).map(|i| &base.as_slice()[i])
    }

    /// Sub-slice with intervals relative to this view; the result still
    /// refers to the same base tensor.
    pub fn try_slice(&self, intervals: &[Interval]) -> Result<TensorSlice<'a, T>> {
        Ok(TensorSlice::new(self.base, sub_span(&self.span, intervals)?))
    }

    pub fn slice(&self, intervals: &[Interval]) -> TensorSlice<'a, T> {
        match self.try_slice(intervals) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_view(&self, relative: &Span) -> Result<TensorSlice<'a, T>> {
        Ok(TensorSlice::new(self.base, sub_view(&self.span, relative)?))
    }

    pub fn view(&self, relative: &Span) -> TensorSlice<'a, T> {
        match self.try_view(relative) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        }
    }

    /// Elements in row-major order of the view
    pub fn iter(&self) -> SliceIter<'a, T> {
        SliceIter { base: self.base, coords: self.span.iter() }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Copy the viewed elements into a new, independent tensor
    pub fn to_tensor(&self) -> Tensor<T>
    where
        T: Clone,
    {
        Tensor::from_vec(&self.dimensions(), self.to_vec())
    }
}

impl<'a, T> Clone for TensorSlice<'a, T> {
    fn clone(&self) -> Self {
        TensorSlice { base: self.base, span: self.span.clone() }
    }
}

impl<'a, T> TensorSliceMut<'a, T> {
    /// `span` must already be validated against `base`
    pub(crate) fn new(base: &'a mut Tensor<T>, span: Span) -> TensorSliceMut<'a, T> {
        TensorSliceMut { base, span }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn dimensions(&self) -> Axes<usize> {
        self.span.dimensions()
    }

    pub fn start_index(&self) -> Axes<usize> {
        self.span.start_index()
    }

    pub fn rank(&self) -> usize {
        self.span.rank()
    }

    pub fn count(&self) -> usize {
        self.span.count()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    pub(crate) fn base(&self) -> &Tensor<T> {
        self.base
    }

    pub(crate) fn base_mut(&mut self) -> &mut Tensor<T> {
        self.base
    }

    pub fn immutable_slice(&self) -> TensorSlice<'_, T> {
        TensorSlice::new(self.base, self.span.clone())
    }

    /// Give up mutability, keeping the full borrow
    pub fn into_slice(self) -> TensorSlice<'a, T> {
        TensorSlice::new(self.base, self.span)
    }

    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        offset(self.base, &self.span, indices).map(|i| &self.base.as_slice()[i])
    }

    pub fn get_mut(&mut self, indices: &[usize]) -> Option<&mut T> {
        let i = offset(self.base, &self.span, indices)?;
        Some(&mut self.base.as_mut_slice()[i])
    }

    pub fn try_slice(&self, intervals: &[Interval]) -> Result<TensorSlice<'_, T>> {
        Ok(TensorSlice::new(self.base, sub_span(&self.span, intervals)?))
    }

    pub fn slice(&self, intervals: &[Interval]) -> TensorSlice<'_, T> {
        match self.try_slice(intervals) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_slice_mut(&mut self, intervals: &[Interval]) -> Result<TensorSliceMut<'_, T>> {
        let span = sub_span(&self.span, intervals)?;
        Ok(TensorSliceMut::new(self.base, span))
    }

    pub fn slice_mut(&mut self, intervals: &[Interval]) -> TensorSliceMut<'_, T> {
        match self.try_slice_mut(intervals) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_view_mut(&mut self, relative: &Span) -> Result<TensorSliceMut<'_, T>> {
        let span = sub_view(&self.span, relative)?;
        Ok(TensorSliceMut::new(self.base, span))
    }

    pub fn view_mut(&mut self, relative: &Span) -> TensorSliceMut<'_, T> {
        match self.try_view_mut(relative) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn iter(&self) -> SliceIter<'_, T> {
        SliceIter { base: self.base, coords: self.span.iter() }
    }

    /// Apply `f` to every viewed element, in row-major order
    pub fn map_inplace<F: FnMut(&mut T)>(&mut self, mut f: F) {
        let strides: Axes<usize> = SmallVec::from_slice(self.base.strides());
        let data = self.base.as_mut_slice();
        for coord in self.span.iter() {
            f(&mut data[ind::strided_offset(&coord, &strides)]);
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    pub fn to_tensor(&self) -> Tensor<T>
    where
        T: Clone,
    {
        Tensor::from_vec(&self.dimensions(), self.to_vec())
    }
}

impl<'a, T: Clone> TensorSliceMut<'a, T> {
    pub fn fill(&mut self, value: T) {
        self.map_inplace(|x| *x = value.clone());
    }

    /// Copy `values` into the view. The shapes must be congruent; a lower
    /// rank source is aligned with the trailing axes of the view.
    pub fn try_assign<S: NdSource<T> + ?Sized>(&mut self, values: &S) -> Result<()> {
        let src_dims = values.dims();
        span::check_congruent(&self.dimensions(), &src_dims)?;
        if self.span.count() == 0 {
            return Ok(());
        }
        let rank = self.span.rank();
        let mut dst = self.span.start_index();
        let mut rel: Axes<usize> = SmallVec::from_elem(0, rank);
        if rank == 0 {
            return copy_element(self.base, values, &dst, &rel, src_dims.len());
        }
        assign_axis(self.base, &self.span, values, src_dims.len(), 0, &mut dst, &mut rel)
    }

    pub fn assign<S: NdSource<T> + ?Sized>(&mut self, values: &S) {
        if let Err(e) = self.try_assign(values) {
            panic!("{}", e);
        }
    }
}

/// Walk the view one axis at a time. Every call fixes `axis` to each of its
/// coordinates in turn and recurses inward; the innermost axis copies
/// element by element, so the destination never needs to be contiguous.
fn assign_axis<T: Clone, S: NdSource<T> + ?Sized>(
    base: &mut Tensor<T>,
    span: &Span,
    values: &S,
    src_rank: usize,
    axis: usize,
    dst: &mut Axes<usize>,
    rel: &mut Axes<usize>,
) -> Result<()> {
    let range = span[axis];
    let last = axis + 1 == span.rank();
    log::trace!("assigning axis {} over {}", axis, range);
    for (k, i) in range.iter().enumerate() {
        dst[axis] = i;
        rel[axis] = k;
        if last {
            copy_element(base, values, dst, rel, src_rank)?;
        } else {
            assign_axis(base, span, values, src_rank, axis + 1, dst, rel)?;
        }
    }
    Ok(())
}

fn copy_element<T: Clone, S: NdSource<T> + ?Sized>(
    base: &mut Tensor<T>,
    values: &S,
    dst: &[usize],
    rel: &[usize],
    src_rank: usize,
) -> Result<()> {
    let src_error = || TensorError::IndexOutOfBounds { index: rel.to_vec(), dims: values.dims().to_vec() };
    let src = ind::align_trailing(rel, src_rank).ok_or_else(src_error)?;
    let value = values.element(&src).ok_or_else(src_error)?.clone();
    let i = base.strict_offset(dst).ok_or_else(|| base.index_error(dst))?;
    base.as_mut_slice()[i] = value;
    Ok(())
}

/////////////////////////////////////////////////////////////////////
// Indexing for TensorSlice and TensorSliceMut, relative to the view
/////////////////////////////////////////////////////////////////////

impl<'a, T, const N: usize> Index<[usize; N]> for TensorSlice<'a, T> {
    type Output = T;
    fn index(&self, indices: [usize; N]) -> &T {
        match self.get(&indices) {
            Some(x) => x,
            None => panic!("{}", index_error(&self.span, &indices)),
        }
    }
}

impl<'a, 'i, T> Index<&'i [usize]> for TensorSlice<'a, T> {
    type Output = T;
    fn index(&self, indices: &'i [usize]) -> &T {
        match self.get(indices) {
            Some(x) => x,
            None => panic!("{}", index_error(&self.span, indices)),
        }
    }
}

impl<'a, T, const N: usize> Index<[usize; N]> for TensorSliceMut<'a, T> {
    type Output = T;
    fn index(&self, indices: [usize; N]) -> &T {
        match self.get(&indices) {
            Some(x) => x,
            None => panic!("{}", index_error(&self.span, &indices)),
        }
    }
}

impl<'a, T, const N: usize> IndexMut<[usize; N]> for TensorSliceMut<'a, T> {
    fn index_mut(&mut self, indices: [usize; N]) -> &mut T {
        match offset(self.base, &self.span, &indices) {
            Some(i) => &mut self.base.as_mut_slice()[i],
            None => panic!("{}", index_error(&self.span, &indices)),
        }
    }
}

impl<'a, 'i, T> Index<&'i [usize]> for TensorSliceMut<'a, T> {
    type Output = T;
    fn index(&self, indices: &'i [usize]) -> &T {
        match self.get(indices) {
            Some(x) => x,
            None => panic!("{}", index_error(&self.span, indices)),
        }
    }
}

impl<'a, 'i, T> IndexMut<&'i [usize]> for TensorSliceMut<'a, T> {
    fn index_mut(&mut self, indices: &'i [usize]) -> &mut T {
        match offset(self.base, &self.span, indices) {
            Some(i) => &mut self.base.as_mut_slice()[i],
            None => panic!("{}", index_error(&self.span, indices)),
        }
    }
}

impl<'a, T> NdSource<T> for TensorSlice<'a, T> {
    fn dims(&self) -> Axes<usize> {
        self.span.dimensions()
    }

    fn element(&self, indices: &[usize]) -> Option<&T> {
        strict_offset(self.base, &self.span, indices).map(|i| &self.base.as_slice()[i])
    }
}

impl<'a, T> NdSource<T> for TensorSliceMut<'a, T> {
    fn dims(&self) -> Axes<usize> {
        self.span.dimensions()
    }

    fn element(&self, indices: &[usize]) -> Option<&T> {
        strict_offset(self.base, &self.span, indices).map(|i| &self.base.as_slice()[i])
    }
}

impl<'a, 'b, T: PartialEq> PartialEq<TensorSlice<'b, T>> for TensorSlice<'a, T> {
    fn eq(&self, other: &TensorSlice<'b, T>) -> bool {
        elements_equal(self, other).unwrap_or(false)
    }
}

impl<'a, T: PartialEq> PartialEq<Tensor<T>> for TensorSlice<'a, T> {
    fn eq(&self, other: &Tensor<T>) -> bool {
        elements_equal(self, other).unwrap_or(false)
    }
}

impl<'a, T: PartialEq> PartialEq<TensorSlice<'a, T>> for Tensor<T> {
    fn eq(&self, other: &TensorSlice<'a, T>) -> bool {
        elements_equal(self, other).unwrap_or(false)
    }
}

impl<'a, T: std::fmt::Debug> std::fmt::Debug for TensorSlice<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorSlice")
            .field("span", &self.span)
            .field("elements", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a, T: std::fmt::Debug> std::fmt::Debug for TensorSliceMut<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorSliceMut")
            .field("span", &self.span)
            .field("elements", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Slice iterator: since slices are not linear, each coordinate from the
/// span walk is mapped back into the base's linear storage
pub struct SliceIter<'a, T> {
    base: &'a Tensor<T>,
    coords: SpanIter,
}

impl<'a, T> Iterator for SliceIter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        let coord = self.coords.next()?;
        let idx = ind::strided_offset(&coord, self.base.strides());
        Some(&self.base.as_slice()[idx])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.coords.size_hint()
    }
}

impl<'a, T> ExactSizeIterator for SliceIter<'a, T> {}
impl<'a, T> FusedIterator for SliceIter<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice;
    use crate::tensor::AxisRange;
    use ndarray::array;

    fn sample() -> Tensor<f32> {
        Tensor::from_vec(&[2, 2, 2], vec![1.0, 2.0, 2.0, 2.0, 5.0, 2.0, 5.0, 1.0])
    }

    fn counting(dims: &[usize]) -> Tensor<i32> {
        let mut k = -1;
        Tensor::from_fn(dims, || {
            k += 1;
            k
        })
    }

    #[test]
    fn slice_reads_through_base() {
        let t = sample();
        let s = t.slice(&slice![1, 0..=1, 0]);
        assert_eq!(s.dimensions().as_slice(), &[1, 2, 1]);
        assert_eq!(s.to_vec(), vec![5.0, 5.0]);
        assert_eq!(s[[0, 1, 0]], 5.0);
        // right-aligned: [1, 0] is [0, 1, 0]
        assert_eq!(s[[1, 0]], 5.0);
        assert_eq!(s.get(&[0, 2, 0]), None);
    }

    #[test]
    fn nested_slices_compose() {
        let t = counting(&[4, 5, 6]);
        let outer = t.slice(&slice![1..4, 2.., ..]);
        let inner = outer.slice(&slice![1, 0..2, 3..5]);
        assert_eq!(
            inner.span(),
            &Span::new([AxisRange::new(2, 3), AxisRange::new(2, 4), AxisRange::new(3, 5)])
        );
        assert_eq!(inner[[0, 0, 0]], t[[2, 2, 3]]);
        assert_eq!(inner[[0, 1, 1]], t[[2, 3, 4]]);
        assert_eq!(inner.to_vec(), vec![t[[2, 2, 3]], t[[2, 2, 4]], t[[2, 3, 3]], t[[2, 3, 4]]]);
    }

    #[test]
    fn sub_slice_out_of_view_fails() {
        let t = counting(&[4, 5]);
        let outer = t.slice(&slice![1..3, ..]);
        assert!(matches!(outer.try_slice(&slice![0..3]), Err(TensorError::SpanOutOfBounds { axis: 0, .. })));
    }

    #[test]
    fn writes_alias_base() {
        let mut t = counting(&[3, 4]);
        {
            let mut s = t.slice_mut(&slice![1..3, 1..3]);
            s[[0, 0]] = 100;
            *s.get_mut(&[1, 1]).unwrap() = 200;
            assert_eq!(s[[0, 0]], 100);
        }
        assert_eq!(t[[1, 1]], 100);
        assert_eq!(t[[2, 2]], 200);

        t[[1, 2]] = 300;
        let s = t.slice(&slice![1..3, 1..3]);
        assert_eq!(s[[0, 1]], 300);
    }

    #[test]
    fn nested_mut_slices_write_base() {
        let mut t = counting(&[3, 3, 3]);
        let mut outer = t.slice_mut(&slice![1.., .., 1..]);
        let mut inner = outer.slice_mut(&slice![1, 2, ..]);
        inner.fill(-1);
        assert_eq!(t[[2, 2, 0]], 24);
        assert_eq!(t[[2, 2, 1]], -1);
        assert_eq!(t[[2, 2, 2]], -1);
    }

    #[test]
    fn recursive_assign_non_contiguous() {
        let mut t: Tensor<i32> = Tensor::zeros(&[3, 4, 5]);
        let src = counting(&[2, 2, 3]);
        t.slice_mut(&slice![1..3, 1..3, 2..5]).assign(&src);
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..3 {
                    assert_eq!(t[[i + 1, j + 1, k + 2]], src[[i, j, k]]);
                }
            }
        }
        assert_eq!(t.iter().filter(|&&x| x != 0).count(), 11);
        assert_eq!(t[[0, 0, 0]], 0);
    }

    #[test]
    fn assign_broadcasts_leading_singletons() {
        let mut t: Tensor<i32> = Tensor::zeros(&[2, 3, 2]);
        t.slice_mut(&slice![1, .., ..]).assign(&array![[1, 2], [3, 4], [5, 6]]);
        assert_eq!(t.as_slice(), &[0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6]);

        // the source may also carry extra leading singleton axes
        let src = Tensor::from_vec(&[1, 1, 2], vec![7, 8]);
        t.slice_mut(&slice![0, 2, ..]).assign(&src.slice(&slice![0, ..]));
        assert_eq!(t[[0, 2, 0]], 7);
        assert_eq!(t[[0, 2, 1]], 8);
    }

    #[test]
    fn assign_rejects_incongruent() {
        let mut t: Tensor<i32> = Tensor::zeros(&[2, 3]);
        let src: Tensor<i32> = Tensor::zeros(&[3, 2]);
        assert!(matches!(t.slice_mut(&slice![..]).try_assign(&src), Err(TensorError::Incongruent { .. })));
        assert!(t.iter().all(|&x| x == 0));
    }

    #[test]
    #[should_panic(expected = "not congruent")]
    fn assign_panics_on_incongruent() {
        let mut t: Tensor<i32> = Tensor::zeros(&[2, 3]);
        let src: Tensor<i32> = Tensor::zeros(&[2, 2]);
        t.slice_mut(&slice![..]).assign(&src);
    }

    #[test]
    fn assign_between_views_of_different_tensors() {
        let src = counting(&[4, 4]);
        let mut dst: Tensor<i32> = Tensor::zeros(&[2, 2]);
        dst.assign(&src.slice(&slice![2.., 1..3]));
        assert_eq!(dst.as_slice(), &[9, 10, 13, 14]);
    }

    #[test]
    fn empty_slice() {
        let mut t = counting(&[2, 3]);
        let mut s = t.slice_mut(&slice![1..1, ..]);
        assert!(s.is_empty());
        assert_eq!(s.iter().count(), 0);
        s.assign(&Tensor::<i32>::zeros(&[0, 3]));
        s.fill(9);
        assert!(!t.iter().any(|&x| x == 9));
    }

    #[test]
    fn equality_with_tensors() {
        let t = sample();
        let expected = Tensor::from_vec(&[2], vec![5.0, 5.0]);
        let s = t.slice(&slice![1, 0..=1, 0]);
        assert_eq!(s.dimensions().as_slice(), &[1, 2, 1]);
        // [1, 2, 1] does not squeeze down to [2]
        assert_ne!(s, expected);
        assert_eq!(s, Tensor::from_vec(&[2, 1], vec![5.0, 5.0]));
        assert_eq!(s.to_tensor(), Tensor::from_vec(&[1, 2, 1], vec![5.0, 5.0]));
        assert_eq!(s, s.clone());
    }

    #[test]
    fn map_inplace_visits_view_only() {
        let mut t = counting(&[2, 3]);
        t.slice_mut(&slice![.., 1]).map_inplace(|x| *x *= 10);
        assert_eq!(t.as_slice(), &[0, 10, 2, 3, 40, 5]);
    }

    #[test]
    fn into_slice_keeps_borrow() {
        let mut t = counting(&[2, 2]);
        let s = t.slice_mut(&slice![1, ..]).into_slice();
        assert_eq!(s.to_vec(), vec![2, 3]);
    }

    #[test]
    fn immutable_slice_reads_live_values() {
        let mut t = counting(&[2, 3]);
        let mut s = t.slice_mut(&slice![.., 1..]);
        s[[1, 0]] = 40;
        let ro = s.immutable_slice();
        assert_eq!(ro.dimensions().as_slice(), &[2, 2]);
        assert_eq!(ro.to_vec(), vec![1, 2, 40, 5]);
        assert_eq!(ro.span(), s.span());
    }
}
