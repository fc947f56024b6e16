//! Machine allocation benchmarks
//!
//! Allocation through the machine, including the collections the
//! threshold policy triggers along the way.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pairgc::eval::machine::{standard_machine, vm::Machine};

/// Build a chain of `length` pairs rooted at the top of the stack,
/// discarding one integer per link
fn build_chain(machine: &mut Machine, length: i64) {
    machine.push_int(0).unwrap();
    for i in 1..length {
        machine.push_int(-i).unwrap();
        machine.pop().unwrap();
        machine.push_int(i).unwrap();
        machine.push_pair().unwrap();
    }
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("alloc_garbage_ints", |b| {
        b.iter(|| {
            let mut machine = standard_machine(5, 256).unwrap();
            for i in 0..10_000 {
                machine.push_int(black_box(i)).unwrap();
                machine.pop().unwrap();
            }
        })
    });

    c.bench_function("alloc_pair_chain", |b| {
        b.iter(|| {
            let mut machine = standard_machine(5, 256).unwrap();
            build_chain(&mut machine, black_box(10_000));
        })
    });

    c.bench_function("alloc_shared_tree", |b| {
        b.iter(|| {
            let mut machine = standard_machine(5, 256).unwrap();
            machine.push_int(0).unwrap();
            for _ in 0..black_box(1_000) {
                let top = machine.peek().unwrap();
                machine.push(top).unwrap();
                machine.push_pair().unwrap();
            }
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
