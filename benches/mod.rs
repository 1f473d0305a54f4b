use criterion::{criterion_group, criterion_main};


use market::register_benchmarks as register_market_benchmarks;

criterion_group!(benches, register_market_benchmarks);

criterion_main!(benches);
