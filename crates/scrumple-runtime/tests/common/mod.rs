//! Shared helpers for integration tests

#![allow(dead_code)]

use scrumple_runtime::ModuleDef;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Install a debug subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("scrumple_runtime=debug")
        .with_test_writer()
        .try_init();
}

/// Shared execution counter
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Module with an empty body
pub fn leaf(filename: &str) -> ModuleDef {
    ModuleDef::new(filename, |_| Ok(()))
}

/// Module that only counts its executions
pub fn counted(filename: &str, counter: &Counter) -> ModuleDef {
    let counter = counter.clone();
    ModuleDef::new(filename, move |_| {
        counter.hit();
        Ok(())
    })
}
