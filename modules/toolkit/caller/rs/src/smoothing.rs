use eyre::{ensure, Result};

use stria_collections_rs::csr::{CsMat, ContactMatrix};
use stria_core_rs::num::Float;

/// Window of the moving average applied to pseudo-distributions.
pub const PSEUDODISTRIBUTION_WINDOW: usize = 11;

/// Weighted moving average with triangular weights (wQISA). A window of size k averages
/// `k / 2` neighbours on each side, the weight of a neighbour at distance d is `k / 2 + 1 - d`.
/// Weights are renormalised near the borders where the window is truncated.
pub fn wqisa<V: Float>(signal: &[V], window: usize) -> Result<Vec<V>> {
    ensure!(window > 0, "Smoothing window must be greater than 0");

    let radius = window / 2;
    let mut smoothed = Vec::with_capacity(signal.len());
    for center in 0..signal.len() {
        let start = center.saturating_sub(radius);
        let end = (center + radius + 1).min(signal.len());

        let (mut total, mut weights) = (V::zero(), V::zero());
        for (ind, value) in signal[start..end].iter().enumerate() {
            let distance = (start + ind).abs_diff(center);
            let weight = V::from_count(radius + 1 - distance);
            total = total + *value * weight;
            weights = weights + weight;
        }
        smoothed.push(total / weights);
    }
    Ok(smoothed)
}

/// Column marginals of a working matrix projected onto [0, 1] and lifted by their smoothed
/// version: `max(raw, wqisa(raw))`.
pub fn pseudodistribution<V: Float>(matrix: &CsMat<V>) -> Result<Vec<V>> {
    let mut raw = matrix.column_sums();
    let max = raw.iter().copied().fold(V::zero(), V::max);
    if max > V::zero() {
        for value in raw.iter_mut() {
            *value = *value / max;
        }
    } else {
        raw.fill(V::zero());
    }

    let smoothed = wqisa(&raw, PSEUDODISTRIBUTION_WINDOW)?;
    Ok(raw
        .into_iter()
        .zip(smoothed)
        .map(|(raw, smoothed)| raw.max(smoothed))
        .collect())
}
