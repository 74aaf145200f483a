use eyre::Result;
use itertools::izip;

use stria_collections_rs::csr::CsMat;
use stria_core_rs::loc::Triangle;
use stria_core_rs::num::Float;
use stria_core_rs::parallelism::Executor;

use crate::config::{Params, Thresholds};
use crate::seeds::Seeds;
use crate::stripe::Stripe;

pub mod horizontal;
pub mod vertical;

/// Step 3 of the pipeline: horizontal domain and height of every seed.
///
/// Seeds are independent work units and are dispatched through the executor. Stripes are
/// returned in the order of their seeds.
pub fn estimate<V, E>(
    working: &CsMat<V>,
    triangle: Triangle,
    pseudodistribution: &[V],
    seeds: &Seeds<V>,
    params: &Params,
    thresholds: &Thresholds<V>,
    executor: &E,
) -> Result<Vec<Stripe<V>>>
where
    V: Float + Send + Sync,
    E: Executor,
{
    let minima = seeds.minima().iter().map(|x| x.index).collect::<Vec<_>>();
    let positions = seeds.seeds().iter().map(|x| x.index).collect::<Vec<_>>();
    let max_half_width = params.max_half_width_bins(*thresholds.max_width());
    let local_persistence_min = *thresholds.local_persistence_min();

    let mut domains = executor
        .map(positions.clone(), |seed| {
            horizontal::domain(
                pseudodistribution,
                &minima,
                seed,
                max_half_width,
                local_persistence_min,
            )
        })
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
    horizontal::resolve_overlaps(&positions, &mut domains)?;

    let belt = params.belt_bins();
    let heights = executor
        .map(domains.clone(), |domain| {
            let profile = vertical::profile(working, triangle, &domain, belt);
            vertical::height(&profile, thresholds)
        })
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    izip!(seeds.seeds(), domains, heights)
        .map(|(seed, domain, height)| {
            Stripe::new(seed.index, seed.persistence, triangle, domain, height)
        })
        .collect()
}
