use std::cmp::Ordering;
use std::thread::available_parallelism;

use eyre::Result;
use rayon::prelude::*;
use rayon::ThreadPool;

fn _normalize(requested: isize, max: isize) -> usize {
    match requested.cmp(&0) {
        Ordering::Less => (max + requested + 1).max(1) as usize,
        Ordering::Equal => 1,
        Ordering::Greater => requested.min(max) as usize,
    }
}

pub fn available(requested: isize) -> Result<usize> {
    let max = available_parallelism()?.get() as isize;
    Ok(_normalize(requested, max))
}

/// Capability to map a function over independent work items.
///
/// Implementations are free to schedule items in any order, but the output must be order preserving:
/// `result[i]` is always `f(items[i])`. Work items must not share mutable state.
pub trait Executor: Sync {
    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync;
}

/// In-process executor that runs all items on the calling thread.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Sequential;

impl Executor for Sequential {
    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        items.into_iter().map(f).collect()
    }
}

impl Executor for ThreadPool {
    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        // Indexed parallel iterators collect in the input order
        self.install(|| items.into_par_iter().map(f).collect())
    }
}

impl<E: Executor> Executor for &E {
    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        (**self).map(items, f)
    }
}
