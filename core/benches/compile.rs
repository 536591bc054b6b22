//! Compile benchmarks: pattern → compiled test tree.
//!
//! Measures the one-time cost of validating patterns, including regex
//! compilation and scaling with shape size.

use pura::prelude::*;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Predicates
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn compile_literal(bencher: divan::Bencher) {
    let pattern = Pattern::from("garfield");
    bencher.bench_local(|| compile(&pattern));
}

#[divan::bench]
fn compile_regex_simple(bencher: divan::Bencher) {
    bencher.bench_local(|| predicate::regex(r"^/api/v\d+/users$"));
}

#[divan::bench]
fn compile_regex_complex(bencher: divan::Bencher) {
    bencher.bench_local(|| {
        predicate::regex(r"^/api/v[1-3]/(users|orders|products)/[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$")
    });
}

// ═══════════════════════════════════════════════════════════════════════════════
// Shapes at scale
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 16, 256])]
fn compile_wide_shape(bencher: divan::Bencher, width: usize) {
    let pattern = object((0..width).map(|i| (format!("key_{i}"), Pattern::from(predicate::string()))));
    bencher.bench_local(|| compile(&pattern));
}

#[divan::bench(args = [1, 8, 32])]
fn compile_deep_shape(bencher: divan::Bencher, depth: usize) {
    let mut pattern = Pattern::from(predicate::number());
    for _ in 1..depth {
        pattern = object([("next", pattern)]);
    }
    bencher.bench_local(|| compile(&pattern));
}

#[divan::bench(args = [10, 100, 256])]
fn compile_table(bencher: divan::Bencher, arms: usize) {
    let patterns: Vec<Pattern> = (0..arms)
        .map(|i| object([("id", Pattern::from(format!("id_{i}")))]))
        .collect();
    bencher.bench_local(|| {
        let arms = patterns
            .iter()
            .enumerate()
            .map(|(i, p)| Arm::compile(p, i))
            .collect::<Result<Vec<_>, PatternError>>()?;
        let table = MatchTable::new(arms, None);
        table.validate().map(|()| table)
    });
}
