// State proof and knot benchmarks.
//
// Covers balance proof verification against trees of various sizes, root
// recomputation, and knot signing and verification.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use weave_core::TokenId;
use weave_smt::{balance_key, compute_root, encode_balance};
use weave_testkit::fixtures::{StateFixture, TestFixture};

fn bench_verify_balance_proof(c: &mut Criterion) {
    let mut group = c.benchmark_group("smt/verify_balance_proof");
    for holders in [1u8, 16, 128] {
        let state = StateFixture::new(holders);
        let response = state.proof_response(0);
        group.bench_with_input(BenchmarkId::from_parameter(holders), &response, |b, r| {
            b.iter(|| r.verify());
        });
    }
    group.finish();
}

fn bench_compute_root(c: &mut Criterion) {
    let state = StateFixture::new(32);
    let (address, token_id, balance) = state.balances[0];
    let key = balance_key(&address, &token_id);
    let proof = state.tree.proof(&key);
    let value = encode_balance(balance);

    c.bench_function("smt/compute_root", |b| {
        b.iter(|| compute_root(black_box(&key), black_box(&value), &proof.siblings));
    });
}

fn bench_build_proof(c: &mut Criterion) {
    let state = StateFixture::new(128);
    let (address, _, _) = state.balances[64];
    let key = balance_key(&address, &TokenId::NATIVE);

    c.bench_function("smt/build_proof", |b| {
        b.iter(|| state.tree.proof(black_box(&key)));
    });
}

fn bench_knot_sign_and_verify(c: &mut Criterion) {
    let fixture = TestFixture::with_seed([9; 32]);
    let to = fixture.peer(1).address();
    let knot = fixture.make_transfer(to, 1_000);

    c.bench_function("knot/sign_transfer", |b| {
        b.iter(|| fixture.make_transfer(black_box(to), 1_000));
    });
    c.bench_function("knot/verify_transfer", |b| {
        b.iter(|| knot.verify());
    });
}

criterion_group!(
    benches,
    bench_verify_balance_proof,
    bench_compute_root,
    bench_build_proof,
    bench_knot_sign_and_verify,
);
criterion_main!(benches);
