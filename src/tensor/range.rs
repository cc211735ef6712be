use std::fmt::{self, Display};
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

use crate::error::{Result, TensorError};

/// A half-open interval `[start, end)` along one axis.
///
/// `start == end` is a valid, empty axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct AxisRange {
    pub start: usize,
    pub end: usize,
}

impl AxisRange {
    pub fn new(start: usize, end: usize) -> AxisRange {
        match AxisRange::try_new(start, end) {
            Ok(r) => r,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn try_new(start: usize, end: usize) -> Result<AxisRange> {
        if end < start {
            return Err(TensorError::InvalidRange { start, end });
        }
        Ok(AxisRange { start, end })
    }

    /// The single index `v`, as `[v, v + 1)`
    pub fn single(v: usize) -> AxisRange {
        AxisRange { start: v, end: v + 1 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        self.start <= i && i < self.end
    }

    /// Intersection `[max(starts), min(ends))`.
    /// Disjoint inputs collapse to an empty range sitting at the larger start.
    pub fn clamp(&self, other: &AxisRange) -> AxisRange {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end).max(start);
        AxisRange { start, end }
    }

    /// Shift both bounds by `origin`
    #[inline]
    pub fn offset(&self, origin: usize) -> AxisRange {
        AxisRange { start: self.start + origin, end: self.end + origin }
    }

    /// A fresh iterator over `start, start + 1, .., end - 1`
    #[inline]
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl IntoIterator for AxisRange {
    type Item = usize;
    type IntoIter = Range<usize>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<usize> for AxisRange {
    fn from(v: usize) -> Self {
        AxisRange::single(v)
    }
}

/// A reversed native range is empty, as it is for std, and becomes an
/// empty range at its start
impl From<Range<usize>> for AxisRange {
    fn from(r: Range<usize>) -> Self {
        AxisRange { start: r.start, end: r.end.max(r.start) }
    }
}

impl From<RangeInclusive<usize>> for AxisRange {
    fn from(r: RangeInclusive<usize>) -> Self {
        let start = *r.start();
        AxisRange { start, end: r.end().saturating_add(1).max(start) }
    }
}

impl From<AxisRange> for Range<usize> {
    fn from(r: AxisRange) -> Self {
        r.start..r.end
    }
}

impl Display for AxisRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Selection along one axis when slicing: either the whole axis,
/// an open-ended side, or an explicit range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interval {
    All,
    From(usize),
    To(usize),
    Range(AxisRange),
}

impl Interval {
    /// Resolve against an axis of size `dim`, checking the result fits.
    pub fn resolve(&self, dim: usize, axis: usize) -> Result<AxisRange> {
        let r = match *self {
            Interval::All => AxisRange { start: 0, end: dim },
            Interval::From(s) => AxisRange { start: s, end: dim.max(s) },
            Interval::To(e) => AxisRange { start: 0, end: e },
            Interval::Range(r) => r,
        };
        if r.end > dim || r.start > r.end {
            return Err(TensorError::SpanOutOfBounds { axis, start: r.start, end: r.end, size: dim });
        }
        Ok(r)
    }
}

impl From<RangeFull> for Interval {
    fn from(_: RangeFull) -> Self {
        Interval::All
    }
}

impl From<RangeFrom<usize>> for Interval {
    fn from(r: RangeFrom<usize>) -> Self {
        Interval::From(r.start)
    }
}

impl From<RangeTo<usize>> for Interval {
    fn from(r: RangeTo<usize>) -> Self {
        Interval::To(r.end)
    }
}

impl From<Range<usize>> for Interval {
    fn from(r: Range<usize>) -> Self {
        Interval::Range(r.into())
    }
}

impl From<RangeInclusive<usize>> for Interval {
    fn from(r: RangeInclusive<usize>) -> Self {
        Interval::Range(r.into())
    }
}

impl From<usize> for Interval {
    fn from(v: usize) -> Self {
        Interval::Range(AxisRange::single(v))
    }
}

impl From<AxisRange> for Interval {
    fn from(r: AxisRange) -> Self {
        Interval::Range(r)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::All => write!(f, ".."),
            Interval::From(s) => write!(f, "{}..", s),
            Interval::To(e) => write!(f, "..{}", e),
            Interval::Range(r) => write!(f, "{}", r),
        }
    }
}
