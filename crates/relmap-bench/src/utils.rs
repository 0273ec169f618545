//! Benchmark utilities and helpers.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relmap_core::value::Value;

/// Generates random string data for benchmarks.
pub fn random_string(rng: &mut StdRng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generates rows of raw `(INTEGER, REAL, TEXT)` values.
pub fn generate_raw_rows(count: usize) -> Vec<Vec<Value>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            vec![
                Value::integer(rng.gen_range(0..1_000_000)),
                Value::real(rng.gen_range(0.0..1000.0)),
                Value::text(random_string(&mut rng, 16)),
            ]
        })
        .collect()
}

/// Generates a flat list of numeric values, some encoded as numeric text.
pub fn generate_numeric_values(count: usize) -> Vec<Value> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| match rng.gen_range(0..3) {
            0 => Value::integer(rng.gen_range(-1000..1000)),
            1 => Value::real(rng.gen_range(-1000.0..1000.0)),
            _ => Value::text(rng.gen_range(-1000..1000).to_string()),
        })
        .collect()
}

/// Generates random user records `(id, name, age)`.
pub fn generate_user_records(count: usize) -> Vec<(i64, String, i64)> {
    let mut rng = StdRng::seed_from_u64(42);
    let names = [
        "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Henry",
    ];

    (0..count)
        .map(|i| {
            let name_idx = rng.gen_range(0..names.len());
            let suffix: u32 = rng.gen_range(0..10000);
            let name = format!("{}_{}", names[name_idx], suffix);
            let age = rng.gen_range(18..80);
            (i as i64 + 1, name, age)
        })
        .collect()
}
