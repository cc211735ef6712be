//! Cartesian <-> linear index arithmetic for dense row-major storage.
//!
//! The strict primitives here take exactly one coordinate per axis. The
//! right-aligned convenience (fewer coordinates than axes, missing leading
//! coordinates read as 0) is layered on top by `pad_leading` so the bounds
//! logic stays the same for every caller.
use smallvec::SmallVec;

/// Per-axis metadata; ranks up to 6 stay on the stack
pub type Axes<T> = SmallVec<[T; 6]>;

/// Computes the stride from dimensions, the last stride is always 1
pub fn compute_strides(dims: &[usize]) -> Axes<usize> {
    let mut strides: Axes<usize> = SmallVec::from_elem(0, dims.len());
    let mut k = 1usize;
    for i in (0..dims.len()).rev() {
        strides[i] = k;
        k *= dims[i];
    }
    strides
}

/// Linear offset of `indices`, folding from the first axis to the last:
/// `((i0 * d1 + i1) * d2 + i2) ...`
///
/// Returns `None` unless there is exactly one index per axis and every
/// index lies in `[0, dim)`.
#[inline]
pub fn linear_offset(indices: &[usize], dims: &[usize]) -> Option<usize> {
    if indices.len() != dims.len() {
        return None;
    }
    let mut idx = 0;
    for (&i, &d) in indices.iter().zip(dims.iter()) {
        if i >= d {
            return None;
        }
        idx = idx * d + i;
    }
    Some(idx)
}

/// Same as `linear_offset` but with precomputed strides and no checks
#[inline]
pub fn strided_offset(indices: &[usize], strides: &[usize]) -> usize {
    indices.iter().zip(strides.iter()).fold(0, |acc, (i, s)| acc + i * s)
}

/// Inverse of `linear_offset`
pub fn linear_to_cartesian(mut linear: usize, dims: &[usize]) -> Axes<usize> {
    let mut indices: Axes<usize> = SmallVec::from_elem(0, dims.len());
    for i in (0..dims.len()).rev() {
        let d = dims[i];
        if d == 0 {
            continue;
        }
        indices[i] = linear % d;
        linear /= d;
    }
    indices
}

/// If the length of the index is smaller than `rank`, pad the index
/// on the left with zeros. Longer indices are returned unchanged and
/// rejected later by the strict check.
pub fn pad_leading(indices: &[usize], rank: usize) -> Axes<usize> {
    let mut padded: Axes<usize> = SmallVec::with_capacity(rank.max(indices.len()));
    for _ in indices.len()..rank {
        padded.push(0);
    }
    padded.extend_from_slice(indices);
    padded
}

/// Re-express a coordinate of one shape as a coordinate into a congruent
/// shape of rank `rank`, aligning both on their trailing axes.
///
/// Extra leading coordinates must be 0 (they address singleton axes);
/// missing leading coordinates become 0.
pub fn align_trailing(indices: &[usize], rank: usize) -> Option<Axes<usize>> {
    if indices.len() <= rank {
        return Some(pad_leading(indices, rank));
    }
    let extra = indices.len() - rank;
    if indices[..extra].iter().any(|&i| i != 0) {
        return None;
    }
    Some(SmallVec::from_slice(&indices[extra..]))
}

/// Increase the index by 1 inside `[start, end)` per axis, and carry over
/// to the next axis to the left when one overflows.
/// Returns true when the first axis overflowed, i.e. the walk is finished;
/// the index is then reset to `start`.
pub fn carry_over(index: &mut [usize], start: &[usize], end: &[usize]) -> bool {
    for axis in (0..index.len()).rev() {
        index[axis] += 1;
        if index[axis] < end[axis] {
            return false;
        }
        index[axis] = start[axis];
    }
    true
}
