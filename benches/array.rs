#[macro_use]
extern crate bencher;

use bencher::{black_box, Bencher};
use ndarray::{self as nd};
use rand::Rng;

use tensorspan::{slice, Span, Tensor};

fn random_tensor(dims: &[usize]) -> Tensor<f32> {
    let mut rng = rand::thread_rng();
    Tensor::from_fn(dims, || rng.gen_range(-1.0..1.0))
}

fn bench_span_iter(bench: &mut Bencher) {
    let span = Span::zero_to(&[8, 16, 16, 4]);
    bench.iter(|| span.iter().map(|c| c[3]).sum::<usize>())
}

fn bench_slice_iter(bench: &mut Bencher) {
    let t = random_tensor(&[8, 16, 16, 4]);
    let s = t.slice(&slice![.., 2..14, .., 1..3]);
    bench.iter(|| s.iter().sum::<f32>())
}

fn bench_assign_strided(bench: &mut Bencher) {
    let src = random_tensor(&[64, 16]);
    let mut dst: Tensor<f32> = Tensor::zeros(&[4, 64, 16]);
    bench.iter(|| {
        dst.slice_mut(&slice![1, .., 0..1]).assign(&src.slice(&slice![.., 0..1]));
        black_box(dst[[1, 0, 0]])
    })
}

fn bench_extract_gemm(bench: &mut Bencher) {
    let a = random_tensor(&[4, 32, 32]);
    let b = random_tensor(&[4, 32, 32]);
    let mut c: Tensor<f32> = Tensor::zeros(&[4, 32, 32]);

    bench.iter(|| {
        for batch in 0..4 {
            let lhs = a.slice(&slice![batch]).extract_matrix();
            let rhs = b.slice(&slice![batch]).extract_matrix();
            let mut out = c.slice_mut(&slice![batch]);
            nd::linalg::general_mat_mul(1.0, &lhs, &rhs, 0.0, &mut out.extract_matrix_mut());
        }
    })
}

fn bench_nd(bench: &mut Bencher) {
    let a = nd::Array3::<f32>::from_shape_fn((4, 32, 32), |(i, j, k)| (i + j + k) as f32);
    let b = a.clone();
    let mut c = nd::Array3::<f32>::zeros((4, 32, 32));

    bench.iter(|| {
        for batch in 0..4 {
            let lhs = a.index_axis(nd::Axis(0), batch);
            let rhs = b.index_axis(nd::Axis(0), batch);
            let mut out = c.index_axis_mut(nd::Axis(0), batch);
            nd::linalg::general_mat_mul(1.0, &lhs, &rhs, 0.0, &mut out);
        }
    })
}

benchmark_group!(benches, bench_span_iter, bench_slice_iter, bench_assign_strided, bench_extract_gemm, bench_nd);
benchmark_main!(benches);
