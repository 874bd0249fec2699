/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use criterion::{black_box, BenchmarkId, Criterion};
use frontcode::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

fn sorted_word_list(n: usize, rng: &mut SmallRng) -> Vec<String> {
    let alphabet = b"abcdefghijklmnopqrstuvwxyz";
    let mut words: Vec<String> = (0..n)
        .map(|_| {
            let len = rng.gen_range(4..20);
            (0..len)
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
                .collect()
        })
        .collect();
    words.sort();
    words
}

pub fn main() {
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    let words = sorted_word_list(100_000, &mut rng);

    let mut c = Criterion::default()
        .with_output_color(true)
        .measurement_time(Duration::from_secs(5));

    let mut build_group = c.benchmark_group("build");
    for ratio in [2u32, 4, 8, 16, 32, 64] {
        build_group.bench_with_input(BenchmarkId::new("ratio", ratio), &ratio, |b, &ratio| {
            b.iter(|| {
                black_box(
                    FrontCodedList::<i8>::from_arrays(ratio, words.iter().map(|w| w.as_bytes()))
                        .unwrap(),
                )
            });
        });
    }
    build_group.finish();

    let mut get_group = c.benchmark_group("get");
    for ratio in [2u32, 8, 32, 64] {
        let list = FrontCodedList::<i8>::from_arrays(ratio, words.iter().map(|w| w.as_bytes())).unwrap();
        get_group.bench_with_input(BenchmarkId::new("random_access", ratio), &ratio, |b, _| {
            let mut idx = 0u32;
            b.iter(|| {
                idx = (idx + 104729) % list.len();
                black_box(list.get(idx))
            });
        });
    }
    get_group.finish();

    let mut scan_group = c.benchmark_group("cursor_scan");
    for ratio in [2u32, 8, 32, 64] {
        let list = FrontCodedList::<i8>::from_arrays(ratio, words.iter().map(|w| w.as_bytes())).unwrap();
        scan_group.bench_with_input(BenchmarkId::new("forward", ratio), &ratio, |b, _| {
            b.iter(|| {
                let mut cursor = list.iter();
                while cursor.has_next() {
                    black_box(cursor.next());
                }
            });
        });
    }
    scan_group.finish();

    c.final_summary();
}
