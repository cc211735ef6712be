use std::fmt::{self, Display};
use std::iter::FusedIterator;
use std::ops::{Add, Index};

use itertools::Itertools;
use smallvec::SmallVec;

use super::index::{carry_over, Axes};
use super::range::{AxisRange, Interval};
use crate::error::{Result, TensorError};

/// An ordered list of per-axis half-open ranges, describing a rectangular
/// region of an N-dimensional array.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Span {
    ranges: Axes<AxisRange>,
}

impl Span {
    pub fn new<I: IntoIterator<Item = AxisRange>>(ranges: I) -> Span {
        Span { ranges: ranges.into_iter().collect() }
    }

    /// The full extent of an object with the given shape
    pub fn zero_to(dims: &[usize]) -> Span {
        Span::new(dims.iter().map(|&d| AxisRange { start: 0, end: d }))
    }

    pub fn from_bounds(start: &[usize], end: &[usize]) -> Span {
        assert_eq!(start.len(), end.len(), "span bounds have different ranks");
        Span::new(start.iter().zip(end.iter()).map(|(&s, &e)| AxisRange::new(s, e)))
    }

    pub fn from_lengths(start: &[usize], length: &[usize]) -> Span {
        assert_eq!(start.len(), length.len(), "span bounds have different ranks");
        Span::new(start.iter().zip(length.iter()).map(|(&s, &l)| AxisRange { start: s, end: s + l }))
    }

    /// Resolve one `Interval` per axis of an object shaped `dims`.
    /// Axes to the right of the last interval are taken whole.
    pub fn from_intervals(dims: &[usize], intervals: &[Interval]) -> Result<Span> {
        if intervals.len() > dims.len() {
            return Err(TensorError::RankMismatch { expected: dims.len(), actual: intervals.len() });
        }
        let mut ranges: Axes<AxisRange> = SmallVec::with_capacity(dims.len());
        for (axis, &d) in dims.iter().enumerate() {
            let interval = intervals.get(axis).copied().unwrap_or(Interval::All);
            ranges.push(interval.resolve(d, axis)?);
        }
        Ok(Span { ranges })
    }

    #[inline]
    pub fn ranges(&self) -> &[AxisRange] {
        &self.ranges
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.ranges.len()
    }

    pub fn start_index(&self) -> Axes<usize> {
        self.ranges.iter().map(|r| r.start).collect()
    }

    pub fn end_index(&self) -> Axes<usize> {
        self.ranges.iter().map(|r| r.end).collect()
    }

    pub fn dimensions(&self) -> Axes<usize> {
        self.ranges.iter().map(|r| r.len()).collect()
    }

    /// Number of coordinates covered, the product of the extents
    pub fn count(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn contains(&self, coord: &[usize]) -> bool {
        coord.len() == self.rank() && self.ranges.iter().zip(coord.iter()).all(|(r, &i)| r.contains(i))
    }

    /// Check that the span addresses a region inside an object shaped `dims`.
    pub fn check_within(&self, dims: &[usize]) -> Result<()> {
        if self.rank() != dims.len() {
            return Err(TensorError::RankMismatch { expected: dims.len(), actual: self.rank() });
        }
        for (axis, (r, &d)) in self.ranges.iter().zip(dims.iter()).enumerate() {
            if r.end > d || r.start > r.end {
                return Err(TensorError::SpanOutOfBounds { axis, start: r.start, end: r.end, size: d });
            }
        }
        Ok(())
    }

    pub fn is_within(&self, dims: &[usize]) -> bool {
        self.check_within(dims).is_ok()
    }

    /// Offset this (relative) span by an absolute origin, one entry per axis.
    pub fn translate(&self, origin: &[usize]) -> Span {
        assert_eq!(origin.len(), self.rank(), "origin rank does not match span rank");
        Span::new(self.ranges.iter().zip(origin.iter()).map(|(r, &o)| r.offset(o)))
    }

    /// Fix `axis` to the single coordinate `i`, keeping the rank.
    pub fn narrow(&self, axis: usize, i: usize) -> Span {
        let mut ranges = self.ranges.clone();
        ranges[axis] = AxisRange::single(i);
        Span { ranges }
    }

    pub fn is_congruent(&self, other: &Span) -> bool {
        congruent(&self.dimensions(), &other.dimensions())
    }

    /// Row-major walk over every coordinate in the span
    pub fn iter(&self) -> SpanIter {
        SpanIter::new(self)
    }
}

impl Index<usize> for Span {
    type Output = AxisRange;
    fn index(&self, axis: usize) -> &AxisRange {
        &self.ranges[axis]
    }
}

impl FromIterator<AxisRange> for Span {
    fn from_iter<I: IntoIterator<Item = AxisRange>>(iter: I) -> Self {
        Span::new(iter)
    }
}

/// `base + sub` places the relative span `sub` at the origin of `base`
impl<'a> Add<&'a Span> for &'a Span {
    type Output = Span;
    fn add(self, sub: &'a Span) -> Span {
        sub.translate(&self.start_index())
    }
}

impl<'a> IntoIterator for &'a Span {
    type Item = Axes<usize>;
    type IntoIter = SpanIter;
    fn into_iter(self) -> SpanIter {
        self.iter()
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.ranges.iter().join(", "))
    }
}

/// Two shapes are congruent when they are identical, or when the longer one
/// only adds leading singleton axes in front of the shorter one.
pub fn congruent(a: &[usize], b: &[usize]) -> bool {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let extra = long.len() - short.len();
    long[..extra].iter().all(|&d| d == 1) && long[extra..] == *short
}

pub(crate) fn check_congruent(a: &[usize], b: &[usize]) -> Result<()> {
    if congruent(a, b) {
        return Ok(());
    }
    log::debug!("rejecting incongruent shapes {:?} and {:?}", a, b);
    Err(TensorError::Incongruent { lhs: a.to_vec(), rhs: b.to_vec() })
}

/// Cartesian product generator over a `Span`, the last axis moving fastest.
///
/// One-shot: build a new one from the span for every traversal.
#[derive(Clone, Debug)]
pub struct SpanIter {
    start: Axes<usize>,
    end: Axes<usize>,
    current: Axes<usize>,
    remaining: usize,
}

impl SpanIter {
    pub fn new(span: &Span) -> SpanIter {
        let start = span.start_index();
        SpanIter { current: start.clone(), end: span.end_index(), start, remaining: span.count() }
    }
}

impl Iterator for SpanIter {
    type Item = Axes<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.current.clone();
        self.remaining -= 1;
        if self.remaining > 0 {
            // if the first axis overflows there are no more coordinates,
            // which `remaining` already accounts for
            carry_over(&mut self.current, &self.start, &self.end);
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SpanIter {}
impl FusedIterator for SpanIter {}
