#[macro_use]
extern crate criterion;
use criterion::Criterion;

use std::collections::{BTreeMap, BTreeSet};

use dancing_cover::type_encoding::PRIMITIVE_TYPES;
use dancing_cover::{CoverageLinks, CoverageMode, Multiplier, Resistance, TypeEncoding};

/// Builds a full 18-item generation-sized interaction table: each of the
/// 18 primitive types resists itself and its two neighbors (wrapping), a
/// density that keeps the search from terminating in a single branch while
/// staying representative of a real type chart's sparsity.
fn generation_sized_table() -> BTreeMap<TypeEncoding, BTreeSet<Resistance>> {
    let mut interactions = BTreeMap::new();
    let n = PRIMITIVE_TYPES.len();
    for (i, defender) in PRIMITIVE_TYPES.iter().enumerate() {
        let resistances = (0..n)
            .map(|j| {
                let attacker = PRIMITIVE_TYPES[j];
                let multiplier = if j == i || j == (i + 1) % n || j == (i + n - 1) % n {
                    Multiplier::Half
                } else {
                    Multiplier::Normal
                };
                Resistance::new(TypeEncoding::new(attacker), multiplier)
            })
            .collect();
        interactions.insert(TypeEncoding::new(defender), resistances);
    }
    interactions
}

fn construction(c: &mut Criterion) {
    let interactions = generation_sized_table();
    c.bench_function("matrix construction (18 items)", |b| {
        b.iter(|| CoverageLinks::build(&interactions, CoverageMode::Defense));
    });
}

fn exact_cover_search(c: &mut Criterion) {
    let interactions = generation_sized_table();
    c.bench_function("exact cover search (18 items, depth 6)", |b| {
        b.iter(|| {
            let mut links = CoverageLinks::build(&interactions, CoverageMode::Defense);
            links.exact_coverages(6)
        });
    });
}

fn overlapping_cover_search(c: &mut Criterion) {
    let interactions = generation_sized_table();
    c.bench_function("overlapping cover search (18 items, depth 6)", |b| {
        b.iter(|| {
            let mut links = CoverageLinks::build(&interactions, CoverageMode::Defense);
            links.overlapping_coverages(6)
        });
    });
}

criterion_group!(
    benches,
    construction,
    exact_cover_search,
    overlapping_cover_search
);
criterion_main!(benches);
