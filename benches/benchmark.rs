use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avl_bst::{AvlTree, BinaryTree};

// Every AVL update scans the whole tree, so keep the AVL workload smaller
const N: usize = 10_000;
const AVL_N: usize = 1_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();
    let avl_values = &values[..AVL_N];

    c.bench_function("bst_insert", |b| {
        b.iter(|| {
            let mut tree = BinaryTree::new();
            for value in &values {
                tree.insert(*value, *value);
            }
            tree
        })
    });

    c.bench_function("avl_insert", |b| {
        b.iter(|| {
            let mut tree = AvlTree::new();
            for value in avl_values {
                tree.insert(*value, *value);
            }
            tree
        })
    });

    let tree: AvlTree<i32, i32> = avl_values.iter().map(|v| (*v, *v)).collect();

    c.bench_function("avl_get", |b| {
        b.iter(|| {
            for value in avl_values {
                black_box(tree.get(value));
            }
        })
    });

    c.bench_function("avl_remove", |b| {
        b.iter(|| {
            let mut tree = tree.clone();
            for value in avl_values {
                tree.remove(value);
            }
            tree
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
