// Run with:  cargo bench --bench set_led

use core::convert::Infallible;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use embedded_hal::i2c::{ErrorType, I2c, Operation};
use std::hint::black_box;
use trellis_grid::{GridController, Matrix, DEFAULT_ADDRESSES, GRID_SIZE};

// Number of iterations to target ~1-5ms per measurement
const ITERATIONS: usize = 1000;

struct NullBus;

impl ErrorType for NullBus {
    type Error = Infallible;
}

impl I2c for NullBus {
    fn transaction(
        &mut self,
        _address: u8,
        _operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn set_led(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_led");
    group.throughput(Throughput::Elements(u64::from(GRID_SIZE) * ITERATIONS as u64));

    group.bench_function("grid_controller_set_clear", |b| {
        let mut m0 = Matrix::new(NullBus, DEFAULT_ADDRESSES[0]);
        let mut m1 = Matrix::new(NullBus, DEFAULT_ADDRESSES[1]);
        let mut m2 = Matrix::new(NullBus, DEFAULT_ADDRESSES[2]);
        let mut m3 = Matrix::new(NullBus, DEFAULT_ADDRESSES[3]);
        let mut grid = GridController::new([
            Some(&mut m0),
            Some(&mut m1),
            Some(&mut m2),
            Some(&mut m3),
        ]);

        b.iter(|| {
            for _ in 0..ITERATIONS {
                for index in 0..GRID_SIZE {
                    let grid = black_box(&mut grid);
                    if grid.is_led_on(index) {
                        grid.clear_led(black_box(index));
                    } else {
                        grid.set_led(black_box(index));
                    }
                }
            }
        });
    });

    group.bench_function("grid_controller_set_xy", |b| {
        let mut m0 = Matrix::new(NullBus, DEFAULT_ADDRESSES[0]);
        let mut m1 = Matrix::new(NullBus, DEFAULT_ADDRESSES[1]);
        let mut m2 = Matrix::new(NullBus, DEFAULT_ADDRESSES[2]);
        let mut m3 = Matrix::new(NullBus, DEFAULT_ADDRESSES[3]);
        let mut grid = GridController::new([
            Some(&mut m0),
            Some(&mut m1),
            Some(&mut m2),
            Some(&mut m3),
        ]);

        b.iter(|| {
            for _ in 0..ITERATIONS {
                for y in 0..8 {
                    for x in 0..8 {
                        black_box(&mut grid).set_led_xy(black_box(x), black_box(y));
                    }
                }
                grid.clear();
            }
        });
    });

    group.finish();
}

criterion_group!(benches, set_led);
criterion_main!(benches);
