use derive_getters::{Dissolve, Getters};
use eyre::Result;

use stria_core_rs::loc::Interval;
use stria_core_rs::num::Float;
use stria_tda_rs::{self as tda, Extrema, LevelSets, PersistencePair};

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// Seeds of candidate stripes found in a pseudo-distribution.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Debug, Default, Dissolve, Getters)]
pub struct Seeds<V> {
    /// Persistent maxima, sorted by index.
    seeds: Vec<PersistencePair<V>>,
    /// Persistent minima, sorted by index. They bound the horizontal extent of stripes.
    minima: Vec<PersistencePair<V>>,
    /// Every extremum of the pseudo-distribution regardless of its persistence.
    all: Extrema<V>,
}

impl<V: Float> Seeds<V> {
    /// Step 2 of the pipeline: persistent maxima of the pseudo-distribution.
    pub fn detect(pseudodistribution: &[V], global_persistence_min: V) -> Result<Self> {
        let pairs = tda::run(pseudodistribution, LevelSets::Upper)?;

        let mut all = tda::split(&pairs, LevelSets::Upper);
        all.sort_by_index();

        let persistent = tda::filter(&pairs, global_persistence_min)?;
        let mut persistent = tda::split(&persistent, LevelSets::Upper);
        persistent.sort_by_index();
        let (minima, seeds) = persistent.dissolve();

        log::debug!(
            "{} of {} maxima passed the global persistence threshold {global_persistence_min:?}",
            seeds.len(),
            all.maxima.len()
        );
        Ok(Self { seeds, minima, all })
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// Only seeds located inside the region of interest. Minima are kept as is.
    pub fn restricted(&self, roi: &Interval<usize>) -> Self {
        Self {
            seeds: self
                .seeds
                .iter()
                .filter(|x| roi.contains(x.index))
                .copied()
                .collect(),
            minima: self.minima.clone(),
            all: self.all.clone(),
        }
    }
}
