use eyre::{ensure, Result};

use stria_core_rs::loc::Interval;
use stria_core_rs::num::Float;
use stria_tda_rs::{self as tda, LevelSets, PersistencePair};

fn argmin<V: Float>(values: &[V]) -> Option<usize> {
    let mut best: Option<(usize, V)> = None;
    for (ind, value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if *value >= current => {}
            _ => best = Some((ind, *value)),
        }
    }
    best.map(|(ind, _)| ind)
}

/// Indices that bound the seed on the left and on the right. The closest persistent minimum is
/// used when available, otherwise the smallest value on that side of the seed.
pub fn bounding_minima<V: Float>(signal: &[V], minima: &[usize], seed: usize) -> (usize, usize) {
    let left = minima
        .iter()
        .copied()
        .filter(|x| *x < seed)
        .max()
        .or_else(|| argmin(&signal[..seed]))
        .unwrap_or(seed);

    let right = minima
        .iter()
        .copied()
        .filter(|x| *x > seed)
        .min()
        .or_else(|| argmin(&signal[seed + 1..]).map(|x| x + seed + 1))
        .unwrap_or(seed);

    (left, right)
}

/// Share of its local persistence a seed may lose inside its own domain.
pub const DOMAIN_PERSISTENCE_SHARE: f64 = 0.5;

// Persistence of the maximum that holds the seed within the neighbourhood. Plateaus are
// represented by a single index, hence any maximum on the seed plateau counts.
fn local_persistence<V: Float>(signal: &[V], maxima: &[PersistencePair<V>], seed: usize) -> V {
    let peak = signal[seed];
    let start = signal[..seed]
        .iter()
        .rposition(|x| *x != peak)
        .map_or(0, |x| x + 1);
    let end = signal[seed..]
        .iter()
        .position(|x| *x != peak)
        .map_or(signal.len(), |x| x + seed);

    maxima
        .iter()
        .filter(|x| (start..end).contains(&x.index))
        .map(|x| x.persistence)
        .fold(V::zero(), V::max)
}

/// Horizontal domain of the stripe seeded at `seed`.
///
/// The neighbourhood reachable within `max_half_width` bins on each side of the seed goes
/// through its own persistence pass. The seed keeps its domain while the signal loses less than
/// [`DOMAIN_PERSISTENCE_SHARE`] of the seed's local persistence, the global maximum of the
/// neighbourhood is measured against the neighbourhood minimum. Starting from the seed, the
/// domain grows on each side while the signal keeps decreasing (or stays flat) and never
/// crosses the closest global (`minima`) or local persistent minimum.
pub fn domain<V: Float>(
    signal: &[V],
    minima: &[usize],
    seed: usize,
    max_half_width: usize,
    local_persistence_min: V,
) -> Result<Interval<usize>> {
    ensure!(
        seed < signal.len(),
        "Seed {seed} is outside of the signal with {} values",
        signal.len()
    );

    let lower_cap = seed.saturating_sub(max_half_width);
    let upper_cap = (seed + max_half_width).min(signal.len() - 1);
    let neighbourhood = &signal[lower_cap..=upper_cap];
    if neighbourhood.len() < 2 {
        return Interval::new(seed, seed + 1);
    }

    let pairs = tda::run(neighbourhood, LevelSets::Upper)?;
    let all = tda::split(&pairs, LevelSets::Upper);
    let persistent = tda::split(&tda::filter(&pairs, local_persistence_min)?, LevelSets::Upper);

    let peak = signal[seed];
    let persistence = local_persistence(neighbourhood, &all.maxima, seed - lower_cap);
    let persistence = if persistence.is_finite() {
        persistence
    } else {
        let floor = neighbourhood.iter().copied().fold(peak, V::min);
        peak - floor
    };
    let cutoff = peak - persistence * V::from_constant(DOMAIN_PERSISTENCE_SHARE);

    let minima = minima
        .iter()
        .copied()
        .chain(persistent.minima.iter().map(|x| x.index + lower_cap))
        .collect::<Vec<_>>();
    let (left_bound, right_bound) = bounding_minima(signal, &minima, seed);
    let left_bound = left_bound.max(lower_cap);
    let right_bound = right_bound.min(upper_cap);

    let mut left = seed;
    while left > left_bound && signal[left - 1] <= signal[left] && signal[left - 1] >= cutoff {
        left -= 1;
    }

    let mut right = seed;
    while right < right_bound && signal[right + 1] <= signal[right] && signal[right + 1] >= cutoff
    {
        right += 1;
    }

    Interval::new(left, right + 1)
}

/// Trim domains of consecutive seeds so that they don't overlap. Domains must be ordered by
/// their seeds. A domain is never trimmed beyond its own seed.
pub fn resolve_overlaps(seeds: &[usize], domains: &mut [Interval<usize>]) -> Result<()> {
    ensure!(
        seeds.len() == domains.len(),
        "Got {} domains for {} seeds",
        domains.len(),
        seeds.len()
    );

    for ind in 1..domains.len() {
        let previous = domains[ind - 1].end();
        let current = domains[ind];
        if current.start() < previous {
            let start = previous.min(seeds[ind]);
            domains[ind] = Interval::new(start, current.end())?;
        }
    }
    Ok(())
}
