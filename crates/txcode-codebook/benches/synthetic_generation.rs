use criterion::{black_box, criterion_group, criterion_main, Criterion};
use txcode_codebook::synthetic_one_hot_codebook;
use txcode_core::{NormOrder, RngHandle};

fn bench_synthetic(c: &mut Criterion) {
    c.bench_function("synthetic_one_hot_256", |b| {
        b.iter(|| {
            let mut rng = RngHandle::from_seed(11);
            black_box(synthetic_one_hot_codebook(6, 4, 256, None, &mut rng).unwrap());
        })
    });

    let mut rng = RngHandle::from_seed(5);
    let codebook = synthetic_one_hot_codebook(6, 4, 1_024, None, &mut rng).unwrap();
    c.bench_function("normalize_codebook_1024", |b| {
        b.iter(|| black_box(codebook.normalized(NormOrder::L2).unwrap()))
    });
}

criterion_group!(benches, bench_synthetic);
criterion_main!(benches);
