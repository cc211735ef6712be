use std::fmt::{self, Display};

use itertools::Itertools;
use smallvec::SmallVec;

use super::index::{carry_over, Axes};
use super::slice::{TensorSlice, TensorSliceMut};
use super::tensor::Tensor;
use crate::config::PrintOptions;

/// A tensor paired with the options used to print it,
/// *eg.* `println!("{}", t.display_with(&opts))`
pub struct DisplayWith<'a, T> {
    tensor: &'a Tensor<T>,
    options: &'a PrintOptions,
}

impl<T> Tensor<T> {
    pub fn display_with<'a>(&'a self, options: &'a PrintOptions) -> DisplayWith<'a, T> {
        DisplayWith { tensor: self, options }
    }
}

impl<'a, T: Display> Display for DisplayWith<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        pretty_write(f, self.tensor.as_slice(), self.tensor.dimensions(), self.options)
    }
}

impl<T: Display> Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        pretty_write(f, self.as_slice(), self.dimensions(), &PrintOptions::default())
    }
}

impl<'a, T: Display + Clone> Display for TensorSlice<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.to_tensor();
        pretty_write(f, t.as_slice(), t.dimensions(), &PrintOptions::default())
    }
}

impl<'a, T: Display + Clone> Display for TensorSliceMut<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.to_tensor();
        pretty_write(f, t.as_slice(), t.dimensions(), &PrintOptions::default())
    }
}

/// Index of the matrix block being printed, over every axis but the last two
struct BlockLabel {
    start: Axes<usize>,
    end: Axes<usize>,
    current: Axes<usize>,
}

impl BlockLabel {
    fn new(leading: &[usize]) -> Self {
        let start: Axes<usize> = SmallVec::from_elem(0, leading.len());
        BlockLabel { current: start.clone(), start, end: SmallVec::from_slice(leading) }
    }

    fn increment(&mut self) {
        if !self.current.is_empty() {
            carry_over(&mut self.current, &self.start, &self.end);
        }
    }

    /// `(i)` for rank 3, `(a, b, ..)` above, nothing for matrices and vectors
    fn show(&self) -> Option<String> {
        if self.current.is_empty() {
            return None;
        }
        Some(format!("({})", self.current.iter().join(", ")))
    }
}

/// Print a row-major buffer shaped `dims` one matrix block at a time.
///
/// Columns are aligned within a block and, for rank 3 and up, every block
/// is preceded by its leading index, *eg.* a [2, 2, 2] tensor prints as
///
/// ```text
/// (0)
/// [1, 2]
/// [3, 4]
///
/// (1)
/// [5, 6]
/// [7, 8]
/// ```
fn pretty_write<T: Display>(
    f: &mut fmt::Formatter<'_>,
    arr: &[T],
    dims: &[usize],
    options: &PrintOptions,
) -> fmt::Result {
    if arr.is_empty() {
        return f.write_str("[]");
    }
    let rank = dims.len();
    if rank == 0 {
        return f.write_str(&format_elem(&arr[0], options));
    }
    let (rows, cols) = if rank == 1 { (1, dims[0]) } else { (dims[rank - 2], dims[rank - 1]) };
    let mut label = BlockLabel::new(&dims[..rank.saturating_sub(2)]);

    for (i, block) in arr.chunks(rows * cols).enumerate() {
        if i > 0 {
            f.write_str("\n\n")?;
        }
        if options.label_blocks {
            if let Some(l) = label.show() {
                writeln!(f, "{}", l)?;
            }
        }
        let elems = format_pad_elem(block, options);
        for (r, row) in elems.chunks(cols).enumerate() {
            if r > 0 {
                f.write_str("\n")?;
            }
            write!(f, "[{}]", row.join(", "))?;
        }
        label.increment();
    }
    Ok(())
}

fn format_elem<T: Display>(x: &T, options: &PrintOptions) -> String {
    match options.precision {
        Some(p) => format!("{:.*}", p, x),
        None => format!("{}", x),
    }
}

/// Right align every element to the widest one in `arr`
fn format_pad_elem<T: Display>(arr: &[T], options: &PrintOptions) -> Vec<String> {
    let strs: Vec<String> = arr.iter().map(|x| format_elem(x, options)).collect();
    let width = strs.iter().map(|s| s.chars().count()).max().unwrap_or(0);
    strs.into_iter().map(|s| format!("{:>width$}", s, width = width)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice;

    #[test]
    fn vector_and_matrix() {
        let v = Tensor::from_vec(&[3], vec![1, 2, 3]);
        assert_eq!(v.to_string(), "[1, 2, 3]");

        let m = Tensor::from_vec(&[2, 2], vec![1, 16, 5, 2]);
        assert_eq!(m.to_string(), "[ 1, 16]\n[ 5,  2]");
    }

    #[test]
    fn labels_blocks() {
        let t = Tensor::from_vec(&[2, 2, 2], (1..=8).collect());
        assert_eq!(t.to_string(), "(0)\n[1, 2]\n[3, 4]\n\n(1)\n[5, 6]\n[7, 8]");

        let t = Tensor::from_vec(&[2, 2, 1, 1], vec![1, 2, 3, 4]);
        let s = t.to_string();
        assert!(s.starts_with("(0, 0)\n[1]"));
        assert!(s.ends_with("(1, 1)\n[4]"));
    }

    #[test]
    fn options() {
        let t = Tensor::from_vec(&[2, 1, 2], vec![0.5, 1.0, 2.26, 3.0]);
        let opts = PrintOptions { precision: Some(1), label_blocks: false };
        assert_eq!(t.display_with(&opts).to_string(), "[0.5, 1.0]\n\n[2.3, 3.0]");
    }

    #[test]
    fn degenerate_shapes() {
        let scalar = Tensor::from_vec(&[], vec![4]);
        assert_eq!(scalar.to_string(), "4");
        let empty: Tensor<i32> = Tensor::from_vec(&[2, 0], vec![]);
        assert_eq!(empty.to_string(), "[]");
    }

    #[test]
    fn slices_print_their_own_shape() {
        let t = Tensor::from_vec(&[2, 2, 2], vec![1, 2, 2, 2, 5, 2, 5, 1]);
        assert_eq!(t.slice(&slice![1, .., 0]).to_string(), "(0)\n[5]\n[5]");
    }
}
