use std::cmp::Ordering;

use derive_more::Constructor;
use eyre::{ensure, eyre, Result};

use stria_collections_rs::union_find::UnionFind;
use stria_core_rs::num::Float;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// Level sets used to sweep the signal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LevelSets {
    /// Sweep from the lowest value upwards: components are born at minima and merge at maxima.
    Lower,
    /// Sweep from the highest value downwards: components are born at maxima and merge at minima.
    Upper,
}

/// Extremum of a signal paired with its topological persistence.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, Copy, PartialEq, Debug, Default, Constructor)]
pub struct PersistencePair<V> {
    pub index: usize,
    pub persistence: V,
}

impl<V: Float> PersistencePair<V> {
    /// True for the unpaired global extremum.
    pub fn is_global(&self) -> bool {
        self.persistence.is_infinite()
    }
}

// Behaviour of the watershed that depends on the level sets
struct Sweep<V> {
    // Reverse the ascending stable order of the signal
    descending: bool,
    // Whether a component rooted at the first value wins the merge against the second one
    dominates: fn(V, V) -> bool,
    // Persistence of the merged component given (merged root value, merge point value)
    persistence: fn(V, V) -> V,
    // Order of the recorded pair: (merged root, merge point) or (merge point, merged root)
    merged_first: bool,
}

impl LevelSets {
    fn sweep<V: Float>(self) -> Sweep<V> {
        match self {
            LevelSets::Lower => Sweep {
                descending: false,
                dominates: |a, b| a < b,
                persistence: |merged, at| at - merged,
                merged_first: true,
            },
            LevelSets::Upper => Sweep {
                descending: true,
                dominates: |a, b| a > b,
                persistence: |merged, at| merged - at,
                merged_first: false,
            },
        }
    }
}

/// Extract local extrema and their persistence from a signal over a connected 1D domain.
///
/// The result is NOT sorted by index. Extrema come in pairs that were removed together at the
/// same persistence level: even entries are minima and odd entries are maxima. The last entry is
/// the global minimum (lower level sets) or the global maximum (upper level sets), it is never
/// paired and has infinite persistence. Hence, the result always has an odd number of entries.
///
/// Ties are broken by index: with lower level sets the leftmost of equal values is visited first,
/// with upper level sets the rightmost one. When two merging components are rooted at equal
/// values, the component to the left of the merge point survives.
pub fn run<V: Float>(signal: &[V], level_sets: LevelSets) -> Result<Vec<PersistencePair<V>>> {
    ensure!(
        signal.len() >= 2,
        "Persistence requires a signal with at least 2 values, got {}",
        signal.len()
    );
    ensure!(
        signal.iter().all(|x| !x.is_nan()),
        "Persistence is not defined for signals with NaN values"
    );

    let sweep = level_sets.sweep::<V>();
    let size = signal.len();

    let mut order = (0..size).collect::<Vec<_>>();
    order.sort_by(|a, b| {
        signal[*a]
            .partial_cmp(&signal[*b])
            .unwrap_or(Ordering::Equal)
    });
    if sweep.descending {
        order.reverse();
    }

    let mut uf = UnionFind::new(size);
    let mut pairs = Vec::with_capacity(size);

    // Watershed
    for idx in order {
        let left = uf.find(idx.saturating_sub(1));
        let right = uf.find((idx + 1).min(size - 1));

        match (left, right) {
            (None, None) => uf.make_set(idx)?,
            (Some(root), None) | (None, Some(root)) => uf.extend_set_by_id(root, idx)?,
            (Some(left), Some(right)) if left == right => uf.extend_set_by_id(left, idx)?,
            (Some(left), Some(right)) => {
                let (survivor, merged) = if (sweep.dominates)(signal[right], signal[left]) {
                    (right, left)
                } else {
                    (left, right)
                };
                uf.extend_set_by_id(survivor, idx)?;
                uf.union(merged, survivor)?;

                let persistence = (sweep.persistence)(signal[merged], signal[idx]);
                let (first, second) = if sweep.merged_first {
                    (merged, idx)
                } else {
                    (idx, merged)
                };
                pairs.push(PersistencePair::new(first, persistence));
                pairs.push(PersistencePair::new(second, persistence));
            }
        }
    }

    // The domain is connected, all indices end up in the same component
    let global = uf
        .find(0)
        .ok_or_else(|| eyre!("Watershed finished without visiting index 0"))?;
    pairs.push(PersistencePair::new(global, V::infinity()));

    Ok(pairs)
}
