use eyre::Result;

use stria_collections_rs::csr::{CsMat, ContactMatrix};
use stria_core_rs::loc::{Interval, Triangle};
use stria_core_rs::num::Float;
use stria_tda_rs::{self as tda, LevelSets};

use crate::config::Thresholds;

/// Mean contact density of the domain columns at increasing distances from the main diagonal,
/// normalised by its maximum. The profile ends at the first distance without cells inside the
/// matrix or at the end of the genomic belt.
pub fn profile<V: Float>(
    matrix: &CsMat<V>,
    triangle: Triangle,
    domain: &Interval<usize>,
    belt: usize,
) -> Vec<V> {
    let mut profile = Vec::with_capacity(belt);
    for offset in 0..belt {
        let (mut total, mut count) = (V::zero(), 0);
        for col in domain.as_range() {
            if let Some(row) = triangle.row(col, offset, matrix.rows()) {
                total = total + matrix.value(row, col);
                count += 1;
            }
        }
        if count == 0 {
            break;
        }
        profile.push(total / V::from_count(count));
    }

    let max = profile.iter().copied().fold(V::zero(), V::max);
    if max > V::zero() {
        for value in profile.iter_mut() {
            *value = *value / max;
        }
    }
    profile
}

/// Number of diagonals covered by the stripe given its normalised vertical profile.
///
/// The stripe ends at the first diagonal after the profile maximum where the profile drops below
/// the local trend minimum. With constrained heights, the stripe instead ends right after its
/// furthest persistent local maximum, provided the profile has at least two of them.
pub fn height<V: Float>(profile: &[V], thresholds: &Thresholds<V>) -> Result<usize> {
    if *thresholds.constrain_heights() && profile.len() >= 2 {
        let min_persistence = *thresholds.local_persistence_min();
        let extrema = tda::extrema(profile, LevelSets::Upper, min_persistence)?;
        if extrema.maxima.len() >= 2 {
            if let Some(furthest) = extrema.maxima.iter().map(|x| x.index).max() {
                return Ok(furthest + 1);
            }
        }
    }

    let mut peak = 0;
    for (ind, value) in profile.iter().enumerate() {
        if *value > profile[peak] {
            peak = ind;
        }
    }

    let height = profile
        .iter()
        .enumerate()
        .skip(peak + 1)
        .find(|(_, value)| **value < *thresholds.local_trend_min())
        .map(|(ind, _)| ind)
        .unwrap_or(profile.len());
    Ok(height.max(1))
}
