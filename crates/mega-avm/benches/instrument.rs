//! Benchmarks for the instrumentation pass and the checkpoint runtime.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mega_avm::{
    test_utils::{replay_straight_line, MethodBodyBuilder},
    AvmEngine, MethodBody, Opcode,
};

/// Number of basic blocks in the synthetic method body.
const BLOCKS: u32 = 1_000;

/// A loop-heavy body: every block does a little arithmetic, allocates, and branches.
fn synthetic_body() -> MethodBody {
    let mut builder = MethodBodyBuilder::default().frame(8, 4);
    for block in 0..BLOCKS {
        builder = builder
            .label(block)
            .op(Opcode::ILOAD_0)
            .op(Opcode::ICONST_1)
            .op(Opcode::IADD)
            .op(Opcode::ISTORE_0)
            .new_object("java/lang/Object")
            .op(Opcode::POP)
            .op(Opcode::ILOAD_0)
            .jump(Opcode::IFEQ, block + 1);
    }
    builder.label(BLOCKS).op(Opcode::RETURN).build()
}

fn bench_instrument(c: &mut Criterion) {
    let engine = AvmEngine::default();
    let body = synthetic_body();
    c.bench_function("instrument_1000_blocks", |b| {
        b.iter(|| engine.instrument(black_box(&body)).unwrap());
    });
}

fn bench_replay(c: &mut Criterion) {
    let engine = AvmEngine::default();
    let instrumented = engine.instrument(&synthetic_body()).unwrap();
    c.bench_function("replay_1000_checkpoints", |b| {
        b.iter(|| {
            let mut ctx = engine.new_execution(u64::MAX);
            replay_straight_line(&mut ctx, black_box(&instrumented))
        });
    });
}

criterion_group!(benches, bench_instrument, bench_replay);
criterion_main!(benches);
