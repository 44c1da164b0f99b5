use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swap_or_not_shuffle::{compute_shuffled_index, shuffle_list};

const SEED: [u8; 32] = [42; 32];

fn shuffles(c: &mut Criterion) {
    for list_size in [512, 16_384, 300_000] {
        c.bench_function(&format!("whole list shuffle of {} indices", list_size), |b| {
            b.iter(|| {
                let input: Vec<usize> = (0..list_size).collect();
                black_box(shuffle_list(input, 90, &SEED, false))
            })
        });
    }

    c.bench_function("single index shuffle of 1 in 300_000", |b| {
        b.iter(|| black_box(compute_shuffled_index(0, 300_000, &SEED, 90)))
    });
}

criterion_group!(benches, shuffles);
criterion_main!(benches);
