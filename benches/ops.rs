use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion,
};
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};

use mem_index::{ChainMap, Llrb};

fn rand_seq<T, I, R>(iter: I, rng: &mut R) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    R: Rng + ?Sized,
{
    let mut res: Vec<_> = iter.into_iter().collect();
    res.shuffle(rng);
    res
}

const TREE_SIZE: i64 = 10_000;
const MAP_SIZE: i64 = 1_000;

fn bench_llrb(c: &mut Criterion) {
    let mut group = c.benchmark_group("llrb");

    let mut rng = SmallRng::from_seed([
        0x55, 0xEF, 0xE0, 0x3C, 0x71, 0xDA, 0xFC, 0xAB, 0x5C, 0x1A, 0x9F,
        0xEB, 0xA4, 0x9E, 0x61, 0xE6,
    ]);

    let values = rand_seq(0..TREE_SIZE, &mut rng);
    let hits = rand_seq(0..TREE_SIZE, &mut rng);
    let misses = rand_seq(TREE_SIZE..(2 * TREE_SIZE), &mut rng);
    let tree: Llrb<i64> = Llrb::load_from("bench-llrb", values.clone().into_iter());

    group
        .bench_function(BenchmarkId::new("load", TREE_SIZE), |b| {
            b.iter(|| {
                let mut index: Llrb<i64> = Llrb::new("bench-llrb");
                for value in &values {
                    index.insert(*value);
                }
                black_box(index.len())
            })
        })
        .bench_function(BenchmarkId::new("find-hit", TREE_SIZE), |b| {
            b.iter(|| {
                for value in &hits {
                    black_box(tree.find(value));
                }
            })
        })
        .bench_function(BenchmarkId::new("find-miss", TREE_SIZE), |b| {
            b.iter(|| {
                for value in &misses {
                    black_box(tree.find(value));
                }
            })
        });

    group.finish();
}

fn bench_chainmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("chainmap");

    let mut rng = SmallRng::from_seed([
        0x1E, 0x7E, 0x29, 0x77, 0x38, 0x9A, 0xF5, 0x67, 0xF5, 0xDD, 0x07,
        0x06, 0xAE, 0xE4, 0x5A, 0xDC,
    ]);

    let keys = rand_seq(0..MAP_SIZE, &mut rng);
    let hits = rand_seq(0..MAP_SIZE, &mut rng);
    let misses = rand_seq(MAP_SIZE..(2 * MAP_SIZE), &mut rng);

    let mut map: ChainMap<i64> = ChainMap::new("bench-chainmap");
    for key in &keys {
        map.push(*key, key * 10);
    }

    group
        .bench_function(BenchmarkId::new("load", MAP_SIZE), |b| {
            b.iter(|| {
                let mut map: ChainMap<i64> = ChainMap::new("bench-chainmap");
                for key in &keys {
                    map.push(*key, key * 10);
                }
                black_box(map.len())
            })
        })
        .bench_function(BenchmarkId::new("find-hit", MAP_SIZE), |b| {
            b.iter(|| {
                for key in &hits {
                    black_box(map.find(*key));
                }
            })
        })
        .bench_function(BenchmarkId::new("find-miss", MAP_SIZE), |b| {
            b.iter(|| {
                for key in &misses {
                    black_box(map.find(*key));
                }
            })
        })
        .bench_function(BenchmarkId::new("drain", MAP_SIZE), |b| {
            b.iter(|| {
                let mut map = map.clone();
                for key in &hits {
                    black_box(map.remove(*key));
                }
                black_box(map.len())
            })
        });

    group.finish();
}

criterion_group!(benches, bench_llrb, bench_chainmap);
criterion_main!(benches);
