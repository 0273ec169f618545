//! Shared fixtures for integration tests.

#![allow(dead_code)]

use relmap_common::StorageConfig;
use relmap_core::chain;
use relmap_core::registry::Link;
use relmap_core::schema::{Column, EmptyBinding, Table};
use relmap_core::alias::Record;
use relmap_core::{Classify, Storage};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: i64,
}

impl Classify for User {
    type Role = Record;
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Word {
    pub id: i64,
    pub text: String,
    pub prefix: String,
}

impl Classify for Word {
    type Role = Record;
}

pub type Chain = Link<Table<User>, Link<Table<Word>, EmptyBinding>>;

pub fn users() -> Table<User> {
    Table::new("users").column(Column::new("id", |u: &User| u.id, |u: &mut User, v| u.id = v).primary_key())
}

pub fn words() -> Table<Word> {
    Table::new("words")
        .column(Column::new("id", |w: &Word| w.id, |w: &mut Word, v| w.id = v).primary_key())
        .column(Column::new("text", |w: &Word| w.text.clone(), |w: &mut Word, v| w.text = v))
        .column(Column::new("prefix", |w: &Word| w.prefix.clone(), |w: &mut Word, v| w.prefix = v))
}

/// Opens an in-memory storage mapping `User` and `Word`.
pub fn open() -> Storage<Chain> {
    init_tracing();
    let config = StorageConfig::builder().trace_invocations(true).build();
    match Storage::new(chain![users(), words()], config) {
        Ok(storage) => storage,
        Err(err) => panic!("failed to open storage: {}", err),
    }
}
