use std::fs;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wildglob::{Config, Matcher, MatchFlags, PatternCache, Walker};

fn bench_compile(c: &mut Criterion) {
    let config = Config::default();
    let cache = PatternCache::new(config.pattern_cache_capacity.get());
    let patterns = vec!["src/**/*.rs".to_string(), "!src/**/*_test.rs".to_string()];
    let flags = MatchFlags::GLOBSTAR | MatchFlags::NEGATE;

    c.bench_function("compile_cold", |b| {
        b.iter(|| {
            let cache = PatternCache::new(config.pattern_cache_capacity.get());
            black_box(Matcher::compile(black_box(&patterns), flags, &config, &cache).unwrap());
        })
    });

    c.bench_function("compile_warm_cache", |b| {
        Matcher::compile(&patterns, flags, &config, &cache).unwrap();
        b.iter(|| {
            black_box(Matcher::compile(black_box(&patterns), flags, &config, &cache).unwrap());
        })
    });
}

fn bench_walk(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..200 {
        let sub = dir.path().join(format!("pkg{i}"));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("lib.rs"), "").unwrap();
        fs::write(sub.join("README.md"), "").unwrap();
    }

    let config = Config::default();
    let cache = PatternCache::new(config.pattern_cache_capacity.get());
    let patterns = vec!["**/*.rs".to_string()];
    let flags = MatchFlags::GLOBSTAR;
    let matcher = Matcher::compile(&patterns, flags, &config, &cache).unwrap();

    c.bench_function("walk_200_packages", |b| {
        b.iter(|| {
            black_box(Walker::new(&matcher, dir.path()).run().unwrap());
        })
    });
}

criterion_group!(benches, bench_compile, bench_walk);
criterion_main!(benches);
