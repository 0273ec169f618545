//! Mapping core benchmarks for relmap.
//!
//! Benchmarks for:
//! - Binding lookup at the head and tail of a chain
//! - Fixed-shape argument building
//! - Variadic argument decoding
//! - Aggregate evaluation over stored rows

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use relmap_bench::utils::{generate_numeric_values, generate_raw_rows, generate_user_records};
use relmap_common::{RelmapResult, StorageConfig};
use relmap_core::args::{self, ArgValues};
use relmap_core::chain;
use relmap_core::function::AggregateFunction;
use relmap_core::registry::StorageRegistry;
use relmap_core::schema::{Column, Table};
use relmap_core::storage::{func, Storage};

macro_rules! records {
    ($($name:ident => $table:literal),* $(,)?) => {
        $(
            #[derive(Default)]
            struct $name;
        )*

        fn lookup_registry() -> StorageRegistry<impl relmap_core::registry::BindingChain> {
            StorageRegistry::new(chain![$(Table::<$name>::new($table)),*], &StorageConfig::default())
                .unwrap()
        }
    };
}

records! {
    R0 => "r0",
    R1 => "r1",
    R2 => "r2",
    R3 => "r3",
    R4 => "r4",
    R5 => "r5",
    R6 => "r6",
    R7 => "r7",
}

/// Benchmark runtime lookups against the chain's first and last binding.
fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry/find");
    let registry = lookup_registry();

    group.bench_function("head", |b| b.iter(|| black_box(registry.find::<R0>().name().len())));
    group.bench_function("tail", |b| b.iter(|| black_box(registry.find::<R7>().name().len())));
    group.bench_function("unmapped", |b| {
        b.iter(|| black_box(registry.find::<String>().is_empty()))
    });

    group.finish();
}

/// Benchmark building `(i64, f64, String)` tuples from raw rows.
fn bench_build_fixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("args/build_fixed");

    for size in [100, 1000, 10_000].iter() {
        let rows = generate_raw_rows(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut total = 0i64;
                for row in &rows {
                    let (id, _, name) = args::build::<(i64, f64, String)>(row, row.len()).unwrap();
                    total += id + name.len() as i64;
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

/// Benchmark lazy decoding of a variadic argument list.
fn bench_variadic(c: &mut Criterion) {
    let mut group = c.benchmark_group("args/variadic");

    for size in [8, 64, 512].iter() {
        let values = generate_numeric_values(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let list = ArgValues::new(&values, values.len()).unwrap();
                let sum: f64 = list.iter().filter_map(|arg| arg.get::<f64>().ok()).sum();
                black_box(sum)
            });
        });
    }

    group.finish();
}

#[derive(Default)]
struct User {
    id: i64,
    name: String,
    age: i64,
}

#[derive(Default)]
struct SumAges {
    total: i64,
}

impl AggregateFunction for SumAges {
    const NAME: &'static str = "SUM_AGES";
    type Args<'a> = (i64,);
    type Output = i64;

    fn step(&mut self, (age,): (i64,)) -> RelmapResult<()> {
        self.total += age;
        Ok(())
    }

    fn finalize(self) -> i64 {
        self.total
    }
}

/// Benchmark an aggregate stepped over every stored row.
fn bench_select_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage/select_aggregate");

    for size in [100, 1000, 10_000].iter() {
        let users = Table::<User>::new("users")
            .column(Column::new("id", |u: &User| u.id, |u: &mut User, v| u.id = v).primary_key())
            .column(Column::new("name", |u: &User| u.name.clone(), |u: &mut User, v| u.name = v))
            .column(Column::new("age", |u: &User| u.age, |u: &mut User, v| u.age = v));
        let storage = Storage::new(chain![users], StorageConfig::default()).unwrap();
        for (id, name, age) in generate_user_records(*size) {
            storage.replace(&User { id, name, age });
        }
        storage.create_aggregate_function(SumAges::default).unwrap();
        let call = func("SUM_AGES").column(storage.column::<User, _>("age").unwrap());

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(storage.select(&call).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_find,
    bench_build_fixed,
    bench_variadic,
    bench_select_aggregate,
);
criterion_main!(benches);
