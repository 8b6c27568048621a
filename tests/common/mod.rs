#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use ndinterp::{FlatIndex, Interpreter};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One visit counter per flat index of `interpreter`.
pub struct VisitCounts(Vec<AtomicUsize>);

impl VisitCounts {
    pub fn new(interpreter: &Interpreter) -> Self {
        VisitCounts(
            (0..interpreter.size())
                .map(|_| AtomicUsize::new(0))
                .collect(),
        )
    }

    pub fn visit(&self, index: FlatIndex) {
        self.0[isize::from(index).unsigned_abs()].fetch_add(1, Ordering::SeqCst);
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn assert_all_once(&self) {
        for (i, c) in self.0.iter().enumerate() {
            assert_eq!(c.load(Ordering::SeqCst), 1, "index {i} visited the wrong number of times");
        }
    }
}
