use std::time::Instant;

use derive_getters::Getters;
use eyre::{Result, WrapErr};

use stria_collections_rs::csr::CsMat;
use stria_core_rs::loc::Triangle;
use stria_core_rs::num::Float;
use stria_core_rs::parallelism::Executor;

use crate::config::{Params, Thresholds};
use crate::failure::{Failure, Stage};
use crate::preprocess::preprocess;
use crate::result::{ChromosomeResult, TriangleResult};
use crate::roi::{Roi, RoiCriterion};
use crate::seeds::Seeds;
use crate::{shape, smoothing, stats};

/// Provider of contact matrices, one chromosome at a time.
pub trait ContactSource<V> {
    /// Names and sizes (bp) of all chromosomes in the order they are stored.
    fn chromosomes(&self) -> Vec<(String, usize)>;

    /// Full (both triangles) contact matrix of the chromosome at the given resolution.
    fn fetch(&self, chromosome: &str, resolution: usize) -> Result<CsMat<V>>;
}

/// Chromosomes large enough to be processed, as (index, name) pairs.
pub fn select_chromosomes(
    chromosomes: &[(String, usize)],
    min_chrom_size: usize,
) -> Vec<(usize, String)> {
    chromosomes
        .iter()
        .enumerate()
        .filter_map(|(ind, (name, size))| {
            if *size >= min_chrom_size {
                Some((ind, name.clone()))
            } else {
                log::warn!(
                    "Skipping chromosome {name}: {size} bp is below the minimum size of {min_chrom_size} bp"
                );
                None
            }
        })
        .collect()
}

/// Stripe caller that runs the pipeline chromosome by chromosome.
#[derive(Getters)]
pub struct Caller<V, E> {
    params: Params,
    thresholds: Thresholds<V>,
    executor: E,
    roi: Option<RoiCriterion>,
}

impl<V, E> Caller<V, E>
where
    V: Float + Send + Sync,
    E: Executor,
{
    pub fn new(params: Params, thresholds: Thresholds<V>, executor: E) -> Self {
        Self {
            params,
            thresholds,
            executor,
            roi: None,
        }
    }

    /// Define a region of interest on every chromosome processed by [`Caller::run`].
    pub fn set_roi(&mut self, criterion: Option<RoiCriterion>) -> &mut Self {
        self.roi = criterion;
        self
    }

    /// Call stripes on every chromosome of the source that is large enough.
    ///
    /// Failures are reported per chromosome and don't interrupt the processing of the rest.
    pub fn run<S: ContactSource<V>>(&self, source: &S) -> Vec<Result<ChromosomeResult<V>>> {
        let started = Instant::now();
        let chromosomes = source.chromosomes();
        let selected = select_chromosomes(&chromosomes, *self.params.min_chrom_size());

        let mut results = Vec::with_capacity(selected.len());
        for (ind, name) in selected {
            let size = chromosomes[ind].1;
            let result = self.run_chromosome(source, &name, size);
            if let Err(err) = &result {
                log::error!("{err:?}");
            }
            results.push(result);
        }

        log::info!(
            "Processed {} chromosomes in {:.2?}",
            results.len(),
            started.elapsed()
        );
        results
    }

    fn run_chromosome<S: ContactSource<V>>(
        &self,
        source: &S,
        chromosome: &str,
        size: usize,
    ) -> Result<ChromosomeResult<V>> {
        let failure = || Failure::new(chromosome.to_string(), None, Stage::Preprocessing);

        let matrix = source
            .fetch(chromosome, *self.params.resolution())
            .wrap_err_with(failure)?;
        let roi = self
            .roi
            .map(|criterion| Roi::define(criterion, size, *self.params.resolution()))
            .transpose()
            .wrap_err_with(failure)?;
        self.call(chromosome, size, &matrix, roi)
    }

    /// Run all steps of the pipeline on the full contact matrix of a single chromosome.
    pub fn call(
        &self,
        chromosome: &str,
        size: usize,
        matrix: &CsMat<V>,
        roi: Option<Roi>,
    ) -> Result<ChromosomeResult<V>> {
        let started = Instant::now();
        log::info!("Calling stripes for {chromosome} ({size} bp)");

        let preprocessed = preprocess(matrix, &self.params, roi.as_ref().map(|x| x.bins()))
            .wrap_err_with(|| Failure::new(chromosome.to_string(), None, Stage::Preprocessing))?;
        log::info!(
            "{chromosome}: pre-processing finished in {:.2?}",
            started.elapsed()
        );

        let (working, roi_matrix) = preprocessed.dissolve();
        let triangles = working
            .as_refs()
            .try_map(|triangle, working| self.call_triangle(chromosome, triangle, working))?;

        log::info!(
            "{chromosome}: {} + {} stripes retained in {:.2?}",
            triangles.lower.stripes().len(),
            triangles.upper.stripes().len(),
            started.elapsed()
        );

        Ok(ChromosomeResult::new(
            chromosome.to_string(),
            size,
            self.params.clone(),
            self.thresholds.clone(),
            roi,
            roi_matrix,
            triangles,
        ))
    }

    fn call_triangle(
        &self,
        chromosome: &str,
        triangle: Triangle,
        working: &CsMat<V>,
    ) -> Result<TriangleResult<V>> {
        let failure = |stage| Failure::new(chromosome.to_string(), Some(triangle), stage);

        let started = Instant::now();
        let pseudodistribution = smoothing::pseudodistribution(working)
            .wrap_err_with(|| failure(Stage::SeedDetection))?;
        let seeds = Seeds::detect(
            &pseudodistribution,
            *self.thresholds.global_persistence_min(),
        )
        .wrap_err_with(|| failure(Stage::SeedDetection))?;
        log::info!(
            "{chromosome} [{triangle}]: found {} seeds in {:.2?}",
            seeds.len(),
            started.elapsed()
        );

        let started = Instant::now();
        let candidates = shape::estimate(
            working,
            triangle,
            &pseudodistribution,
            &seeds,
            &self.params,
            &self.thresholds,
            &self.executor,
        )
        .wrap_err_with(|| failure(Stage::ShapeEstimation))?;
        log::info!(
            "{chromosome} [{triangle}]: estimated {} shapes in {:.2?}",
            candidates.len(),
            started.elapsed()
        );

        let started = Instant::now();
        let (stripes, discarded) = stats::filter(working, candidates, &self.thresholds)
            .wrap_err_with(|| failure(Stage::StatisticalFiltering))?;
        log::info!(
            "{chromosome} [{triangle}]: {} stripes retained, {discarded} discarded in {:.2?}",
            stripes.len(),
            started.elapsed()
        );

        let (seeds, _, extrema) = seeds.dissolve();
        Ok(TriangleResult::new(
            pseudodistribution,
            extrema,
            seeds,
            stripes,
            discarded,
        ))
    }
}
