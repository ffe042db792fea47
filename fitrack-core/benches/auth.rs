//! Credential and session token benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fitrack_core::auth::*;
use fitrack_core::AuthConfig;
use std::time::Duration;

fn benchmark_credentials(c: &mut Criterion) {
    let hasher = CredentialHasher::new(KdfParams::DEFAULT).unwrap();
    let record = hasher.hash("correct-horse").unwrap();

    let mut group = c.benchmark_group("credential");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("hash", |b| {
        b.iter(|| hasher.hash(black_box("correct-horse")).unwrap());
    });
    group.bench_function("compare_match", |b| {
        b.iter(|| hasher.compare(black_box("correct-horse"), black_box(&record)).unwrap());
    });
    group.bench_function("compare_mismatch", |b| {
        b.iter(|| hasher.compare(black_box("wrong-horse"), black_box(&record)).unwrap());
    });
    group.finish();
}

fn benchmark_sessions(c: &mut Criterion) {
    let authorizer =
        SessionAuthorizer::new(&AuthConfig::new("benchmark-signing-secret-0123456789abcdef"))
            .unwrap();
    let issued = authorizer.issue("01HZY8J3K5N6P7Q8R9S0T1V2W3").unwrap();

    let mut group = c.benchmark_group("session");
    group.bench_function("issue", |b| {
        b.iter(|| authorizer.issue(black_box("01HZY8J3K5N6P7Q8R9S0T1V2W3")).unwrap());
    });
    group.bench_function("validate", |b| {
        b.iter(|| authorizer.validate(black_box(Some(issued.token.as_str()))).unwrap());
    });
    group.finish();
}

criterion_group!(benches, benchmark_credentials, benchmark_sessions);
criterion_main!(benches);
