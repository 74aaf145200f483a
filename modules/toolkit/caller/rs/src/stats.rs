use std::ops::Range;

use derive_getters::{Dissolve, Getters};
use eyre::{ensure, Result};

use stria_collections_rs::csr::{CsMat, ContactMatrix};
use stria_core_rs::loc::Triangle;
use stria_core_rs::num::Float;

use crate::config::Thresholds;
use crate::stripe::Stripe;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// Background densities at or below this value are treated as empty.
pub const BACKGROUND_EPSILON: f64 = 1e-9;

/// Candidates must cover at least one diagonal besides the main one, which belongs to both
/// triangles.
pub const MIN_HEIGHT: usize = 2;

/// Descriptive statistics of a stripe and of its flanking background.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Debug, Default, Dissolve, Getters)]
pub struct Biodescriptors<V> {
    inner_mean: V,
    inner_std: V,
    /// Minimum, first quartile, median, third quartile, and maximum of the inner cells.
    five_number: [V; 5],
    outer_left_mean: Option<V>,
    outer_right_mean: Option<V>,
    outer_mean: Option<V>,
    /// Ratio between the inner and the outer mean, None for an empty background.
    relative_change: Option<V>,
}

// Values of cells covered by the given columns within `height` diagonals from the main one
fn cells<V: Float>(
    matrix: &CsMat<V>,
    triangle: Triangle,
    columns: Range<usize>,
    height: usize,
) -> Vec<V> {
    let nrows = matrix.rows();
    let mut values = Vec::with_capacity(columns.len() * height);
    for col in columns {
        let band = triangle.band(col, height);
        values.extend((band.start..band.end.min(nrows)).map(|row| matrix.value(row, col)));
    }
    values
}

fn mean<V: Float>(values: &[V]) -> Option<V> {
    if values.is_empty() {
        return None;
    }
    let total = values.iter().copied().fold(V::zero(), |acc, x| acc + x);
    Some(total / V::from_count(values.len()))
}

// Linear interpolation between the closest ranks, values must be sorted
fn quantile<V: Float>(sorted: &[V], q: V) -> V {
    let position = q * V::from_count(sorted.len() - 1);
    let lower = position.floor();
    let fraction = position - lower;
    let lower = lower.to_usize().unwrap_or(0).min(sorted.len() - 1);
    let upper = (lower + 1).min(sorted.len() - 1);
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

impl<V: Float> Biodescriptors<V> {
    /// Describe the stripe using the working matrix of its triangle.
    ///
    /// Inner cells are the ones covered by the stripe (see [`Stripe::rows_at`]). The background
    /// consists of two flanks with the same diagonals, each as wide as the stripe, directly to
    /// the left and to the right of it. Flanks are clipped to the matrix.
    pub fn describe(matrix: &CsMat<V>, stripe: &Stripe<V>) -> Self {
        let domain = stripe.domain();
        let (triangle, height, width) = (*stripe.triangle(), *stripe.height(), stripe.width());

        let inner = cells(matrix, triangle, domain.as_range(), height);

        let left_flank = domain.start().saturating_sub(width)..domain.start();
        let right_flank = domain.end()..(domain.end() + width).min(matrix.cols());
        let left = cells(matrix, triangle, left_flank, height);
        let right = cells(matrix, triangle, right_flank, height);

        let mut sorted = inner.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let (inner_mean, inner_std, five_number) = match mean(&inner) {
            Some(inner_mean) => {
                let variance = mean(
                    &inner
                        .iter()
                        .map(|x| (*x - inner_mean).powi(2))
                        .collect::<Vec<_>>(),
                )
                .unwrap_or_else(V::zero);
                let five_number = [0.0, 0.25, 0.5, 0.75, 1.0]
                    .map(|q| quantile(&sorted, V::from_constant(q)));
                (inner_mean, variance.sqrt(), five_number)
            }
            None => (V::zero(), V::zero(), [V::zero(); 5]),
        };

        let outer = [left.as_slice(), right.as_slice()].concat();
        let outer_mean = mean(&outer);
        let relative_change = outer_mean
            .filter(|x| *x > V::from_constant(BACKGROUND_EPSILON))
            .map(|outer| inner_mean / outer);

        Self {
            inner_mean,
            inner_std,
            five_number,
            outer_left_mean: mean(&left),
            outer_right_mean: mean(&right),
            outer_mean,
            relative_change,
        }
    }
}

/// Step 4 of the pipeline: annotate candidates with their biodescriptors and retain the ones
/// that stand out from the background. Returns retained stripes and the number of discarded ones.
///
/// Candidates that don't reach past the main diagonal or lack a usable background are always
/// discarded. Candidates below the relative change cutoff are discarded unless the thresholds ask
/// to only annotate them.
pub fn filter<V: Float>(
    matrix: &CsMat<V>,
    candidates: Vec<Stripe<V>>,
    thresholds: &Thresholds<V>,
) -> Result<(Vec<Stripe<V>>, usize)> {
    let total = candidates.len();
    let mut retained = Vec::with_capacity(total);
    for mut stripe in candidates {
        ensure!(
            stripe.domain().end() <= matrix.cols(),
            "Stripe columns {} are outside of the {}x{} matrix",
            stripe.domain(),
            matrix.rows(),
            matrix.cols()
        );
        if *stripe.height() < MIN_HEIGHT {
            log::debug!(
                "Discarding stripe seeded at {} [{}]: it covers only the main diagonal",
                stripe.seed(),
                stripe.triangle()
            );
            continue;
        }
        let descriptors = Biodescriptors::describe(matrix, &stripe);
        let keep = match descriptors.relative_change() {
            None => {
                log::warn!(
                    "Discarding stripe seeded at {} [{}]: no background around columns {}",
                    stripe.seed(),
                    stripe.triangle(),
                    stripe.domain()
                );
                false
            }
            Some(change) => {
                *change >= *thresholds.relative_change_cutoff()
                    || !*thresholds.discard_below_cutoff()
            }
        };
        if keep {
            stripe.set_descriptors(descriptors);
            retained.push(stripe);
        }
    }

    let discarded = total - retained.len();
    Ok((retained, discarded))
}
