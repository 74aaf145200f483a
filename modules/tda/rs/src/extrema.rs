use derive_getters::Dissolve;
use derive_more::Constructor;
use eyre::{ensure, Result};

use stria_core_rs::num::Float;

use super::persistence::{run, LevelSets, PersistencePair};

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// Minima and maxima of a signal together with their persistence.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Debug, Default, Dissolve, Constructor)]
pub struct Extrema<V> {
    pub minima: Vec<PersistencePair<V>>,
    pub maxima: Vec<PersistencePair<V>>,
}

impl<V: Float> Extrema<V> {
    /// Most persistent extrema first. Extrema with equal persistence keep their relative order.
    pub fn sort_by_persistence(&mut self) -> &mut Self {
        for extrema in [&mut self.minima, &mut self.maxima] {
            extrema.sort_by(|a, b| {
                b.persistence
                    .partial_cmp(&a.persistence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        self
    }

    pub fn sort_by_index(&mut self) -> &mut Self {
        self.minima.sort_by_key(|x| x.index);
        self.maxima.sort_by_key(|x| x.index);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.minima.is_empty() && self.maxima.is_empty()
    }
}

/// Split the output of the persistence engine into minima (even positions) and maxima (odd
/// positions). Under upper level sets the trailing unpaired entry is the global maximum and is
/// reported among maxima.
pub fn split<V: Float>(pairs: &[PersistencePair<V>], level_sets: LevelSets) -> Extrema<V> {
    let mut minima = Vec::with_capacity(pairs.len() / 2 + 1);
    let mut maxima = Vec::with_capacity(pairs.len() / 2 + 1);
    for (ind, pair) in pairs.iter().enumerate() {
        if ind % 2 == 0 {
            minima.push(*pair);
        } else {
            maxima.push(*pair);
        }
    }

    if level_sets == LevelSets::Upper && pairs.len() % 2 == 1 {
        if let Some(global) = minima.pop() {
            maxima.push(global);
        }
    }
    Extrema { minima, maxima }
}

/// Keep only pairs with persistence strictly above the threshold. Pairs keep their order, hence
/// minima/maxima positions are preserved as long as both members of a pair share a persistence.
pub fn filter<V: Float>(
    pairs: &[PersistencePair<V>],
    threshold: V,
) -> Result<Vec<PersistencePair<V>>> {
    ensure!(
        !threshold.is_nan() && threshold >= V::zero(),
        "Persistence threshold must be a non-negative number, got {threshold:?}"
    );
    Ok(pairs
        .iter()
        .filter(|x| x.persistence > threshold)
        .copied()
        .collect())
}

/// Persistent extrema of the signal: run the persistence engine, drop everything at or below
/// `min_persistence` and split the rest into minima and maxima.
pub fn extrema<V: Float>(
    signal: &[V],
    level_sets: LevelSets,
    min_persistence: V,
) -> Result<Extrema<V>> {
    let pairs = run(signal, level_sets)?;
    let persistent = filter(&pairs, min_persistence)?;
    log::trace!(
        "{} of {} extrema are above the persistence threshold {min_persistence:?}",
        persistent.len(),
        pairs.len()
    );
    Ok(split(&persistent, level_sets))
}
