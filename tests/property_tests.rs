//! Property-based tests for coordinate generation, aliasing views and
//! bulk assignment.

use proptest::prelude::*;
use tensorspan::tensor::index;
use tensorspan::{AxisRange, Span, Tensor};

// ============================================================================
// Strategies
// ============================================================================

fn dims_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..=4, 1..=4)
}

/// A non-empty span inside `dims`
fn span_in(dims: &[usize]) -> impl Strategy<Value = Span> {
    let axes: Vec<_> = dims
        .iter()
        .map(|&d| (0..d).prop_flat_map(move |s| (Just(s), s + 1..=d)))
        .collect();
    axes.prop_map(|bounds| Span::new(bounds.into_iter().map(|(s, e)| AxisRange::new(s, e))))
}

fn dims_and_span() -> impl Strategy<Value = (Vec<usize>, Span)> {
    dims_strategy().prop_flat_map(|dims| {
        let span = span_in(&dims);
        (Just(dims), span)
    })
}

fn counting(dims: &[usize]) -> Tensor<i64> {
    let mut k = 0i64;
    Tensor::from_fn(dims, || {
        k += 1;
        k
    })
}

// ============================================================================
// Addressing
// ============================================================================

proptest! {
    /// Row-major offsets enumerate 0..count exactly once, in generator order
    #[test]
    fn prop_linear_offset_is_a_bijection(dims in dims_strategy()) {
        let n: usize = dims.iter().product();
        let full = Span::zero_to(&dims);
        prop_assert_eq!(full.iter().len(), n);
        for (i, coord) in full.iter().enumerate() {
            prop_assert_eq!(index::linear_offset(&coord, &dims), Some(i));
            prop_assert_eq!(index::linear_to_cartesian(i, &dims), coord);
        }
    }

    /// Every coordinate is produced once, inside the span, in increasing order
    #[test]
    fn prop_generator_visits_span_in_order((dims, span) in dims_and_span()) {
        prop_assert!(span.check_within(&dims).is_ok());
        let coords: Vec<_> = span.iter().collect();
        prop_assert_eq!(coords.len(), span.count());
        prop_assert!(coords.iter().all(|c| span.contains(c)));
        prop_assert!(coords.windows(2).all(|w| w[0] < w[1]));
    }
}

// ============================================================================
// Views
// ============================================================================

proptest! {
    #[test]
    fn prop_slice_writes_reach_base((dims, span) in dims_and_span(), value in 1i64..1000) {
        let mut t: Tensor<i64> = Tensor::zeros(&dims);
        t.view_mut(span.clone()).fill(value);
        for coord in t.span().iter() {
            let expected = if span.contains(&coord) { value } else { 0 };
            prop_assert_eq!(t[coord.as_slice()], expected);
        }
    }

    #[test]
    fn prop_clone_is_independent(dims in dims_strategy()) {
        let t = counting(&dims);
        let mut c = t.clone();
        c.fill(-1);
        prop_assert!(t.iter().zip(1..).all(|(&x, i)| x == i));
        prop_assert!(c.iter().all(|&x| x == -1));
    }

    #[test]
    fn prop_assign_copies_congruent_source((dims, span) in dims_and_span()) {
        let mut t: Tensor<i64> = Tensor::zeros(&dims);
        let src = counting(&span.dimensions());
        t.view_mut(span.clone()).assign(&src);
        prop_assert!(t.view(span.clone()) == src);
        prop_assert_eq!(t.view(span.clone()).to_vec(), src.as_slice().to_vec());
        // everything outside the span is untouched
        let outside = t.span().iter().filter(|c| !span.contains(c)).count();
        prop_assert_eq!(t.iter().filter(|&&x| x == 0).count(), outside);
    }

    /// Whenever a span is handed out as contiguous memory, the run holds
    /// exactly the elements the view iterates
    #[test]
    fn prop_contiguous_runs_match_view((dims, span) in dims_and_span()) {
        let t = counting(&dims);
        let expected = t.view(span.clone()).to_vec();
        if let Ok(m) = t.try_extract_matrix(&span) {
            prop_assert_eq!(m.iter().copied().collect::<Vec<_>>(), expected.clone());
        }
        if let Some(run) = t.strided(&span) {
            prop_assert_eq!(run.iter().copied().collect::<Vec<_>>(), expected);
        }
    }
}
