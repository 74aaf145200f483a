use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

use stria_collections_rs::csr::Array2;
use stria_core_rs::loc::PerTriangle;
use stria_core_rs::num::Float;
use stria_tda_rs::{Extrema, PersistencePair};

use crate::config::{Params, Thresholds};
use crate::roi::Roi;
use crate::stripe::Stripe;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// Outcome of the pipeline for one half of the contact matrix.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Debug, Default, Constructor, Dissolve, Getters)]
pub struct TriangleResult<V> {
    pseudodistribution: Vec<V>,
    // All extrema of the pseudo-distribution, regardless of their persistence
    extrema: Extrema<V>,
    seeds: Vec<PersistencePair<V>>,
    stripes: Vec<Stripe<V>>,
    discarded: usize,
}

impl<V: Float> TriangleResult<V> {
    /// Number of candidates evaluated by the statistical filter.
    pub fn candidates(&self) -> usize {
        self.stripes.len() + self.discarded
    }
}

/// Stripes called for a single chromosome together with the parameters used to call them.
#[derive(Clone, PartialEq, Debug, Constructor, Dissolve, Getters)]
pub struct ChromosomeResult<V> {
    chromosome: String,
    size: usize,
    params: Params,
    thresholds: Thresholds<V>,
    roi: Option<Roi>,
    // Pre-processed matrix restricted to the RoI
    roi_matrix: Option<Array2<V>>,
    triangles: PerTriangle<TriangleResult<V>>,
}

impl<V: Float> ChromosomeResult<V> {
    /// Retained stripes of both triangles, lower triangle first.
    pub fn stripes(&self) -> impl Iterator<Item = &Stripe<V>> {
        self.triangles
            .iter()
            .flat_map(|(_, result)| result.stripes().iter())
    }

    /// Run parameters as key/value pairs, suitable for result file attributes.
    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        let mut metadata = self.params.metadata();
        metadata.extend(self.thresholds.metadata());
        metadata
    }
}
