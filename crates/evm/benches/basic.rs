// Copyright 2015-2020 Parity Technologies (UK) Ltd.
// This file is part of OpenEthereum.

// OpenEthereum is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// OpenEthereum is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with OpenEthereum.  If not, see <http://www.gnu.org/licenses/>.

extern crate criterion;
extern crate ethereum_types;
extern crate evm;
extern crate vm;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ethereum_types::U256;
use evm::Factory;
use std::sync::Arc;
use vm::tests::FakeExt;
use vm::{ActionParams, Schedule};

/// `N` repeats of `PUSH1 1 PUSH1 2 ADD POP`, terminated by `STOP`: pure
/// dispatch and stack traffic, no memory or host calls.
fn add_pop_code(repeats: usize) -> Vec<u8> {
    let mut code = Vec::with_capacity(repeats * 5 + 1);
    for _ in 0..repeats {
        code.extend_from_slice(&[0x60, 0x01, 0x60, 0x02, 0x01, 0x50]);
    }
    code.push(0x00); // STOP
    code
}

fn run(code: Vec<u8>, schedule: Schedule, gas: U256) {
    let mut params = ActionParams::default();
    params.code = Some(Arc::new(code));
    params.gas = gas;

    let mut ext = FakeExt::new();
    ext.schedule = schedule;

    let factory = Factory::default();
    let exec = factory.create(params, &ext.schedule.clone(), 0);
    let _ = black_box(exec.exec(&mut ext));
}

fn bench_add_pop_loop(c: &mut Criterion) {
    c.bench_function("10_000 PUSH/PUSH/ADD/POP", |b| {
        b.iter(|| run(add_pop_code(10_000), Schedule::new_cancun(), U256::from(10_000_000)))
    });
}

criterion_group!(benches, bench_add_pop_loop);
criterion_main!(benches);
