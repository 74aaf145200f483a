use derive_getters::Getters;
use eyre::{eyre, Result};

use stria_core_rs::num::Float;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// Thresholds that control seed detection, shape estimation, and statistical filtering.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Debug, Getters)]
pub struct Thresholds<V> {
    global_persistence_min: V,
    local_persistence_min: V,
    local_trend_min: V,
    max_width: usize,
    constrain_heights: bool,
    relative_change_cutoff: V,
    discard_below_cutoff: bool,
}

impl<V: Float> Default for Thresholds<V> {
    fn default() -> Self {
        Self {
            global_persistence_min: V::from_constant(0.05),
            local_persistence_min: V::from_constant(0.33),
            local_trend_min: V::from_constant(0.25),
            max_width: 100_000,
            constrain_heights: false,
            relative_change_cutoff: V::from_constant(5.0),
            discard_below_cutoff: true,
        }
    }
}

fn ensure_probability<V: Float>(name: &str, value: V) -> Result<()> {
    if value.is_nan() || value < V::zero() || value > V::one() {
        return Err(eyre!("{name} must be in [0, 1], got {value:?}"));
    }
    Ok(())
}

impl<V: Float> Thresholds<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum persistence of a pseudo-distribution maximum to become a seed.
    pub fn set_global_persistence_min(&mut self, value: V) -> Result<&mut Self> {
        ensure_probability("Global persistence minimum", value)?;
        self.global_persistence_min = value;
        Ok(self)
    }

    /// Minimum persistence of a local maximum in the vertical profile (constrained heights only).
    pub fn set_local_persistence_min(&mut self, value: V) -> Result<&mut Self> {
        ensure_probability("Local persistence minimum", value)?;
        self.local_persistence_min = value;
        Ok(self)
    }

    /// Relative level of the vertical profile below which the stripe ends.
    pub fn set_local_trend_min(&mut self, value: V) -> Result<&mut Self> {
        ensure_probability("Local trend minimum", value)?;
        self.local_trend_min = value;
        Ok(self)
    }

    /// Maximum stripe width in base pairs.
    pub fn set_max_width(&mut self, max_width: usize) -> Result<&mut Self> {
        if max_width == 0 {
            return Err(eyre!("Maximum stripe width must be greater than 0"));
        }
        self.max_width = max_width;
        Ok(self)
    }

    pub fn set_constrain_heights(&mut self, constrain: bool) -> &mut Self {
        self.constrain_heights = constrain;
        self
    }

    pub fn set_relative_change_cutoff(&mut self, cutoff: V) -> Result<&mut Self> {
        if cutoff.is_nan() || cutoff <= V::zero() {
            return Err(eyre!(
                "Relative change cutoff must be greater than 0, got {cutoff:?}"
            ));
        }
        self.relative_change_cutoff = cutoff;
        Ok(self)
    }

    /// When disabled, stripes below the relative change cutoff are annotated but kept.
    pub fn set_discard_below_cutoff(&mut self, discard: bool) -> &mut Self {
        self.discard_below_cutoff = discard;
        self
    }

    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        vec![
            ("constrain-heights", self.constrain_heights.to_string()),
            (
                "global-persistence-minimum",
                format!("{:?}", self.global_persistence_min),
            ),
            (
                "local-persistence-minimum",
                format!("{:?}", self.local_persistence_min),
            ),
            ("local-trend-minimum", format!("{:?}", self.local_trend_min)),
            ("max-width", self.max_width.to_string()),
            (
                "relative-change-cutoff",
                format!("{:?}", self.relative_change_cutoff),
            ),
            (
                "discard-below-cutoff",
                self.discard_below_cutoff.to_string(),
            ),
        ]
    }
}

/// Parameters of the contact matrix and of the region around the diagonal that is analysed.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Eq, Hash, Debug, Getters)]
pub struct Params {
    resolution: usize,
    genomic_belt: usize,
    min_chrom_size: usize,
}

impl Params {
    pub fn new(resolution: usize) -> Result<Self> {
        if resolution == 0 {
            return Err(eyre!("Resolution must be greater than 0"));
        }
        let mut params = Self {
            resolution,
            genomic_belt: 5_000_000,
            min_chrom_size: 2_000_000,
        };
        // Coarse resolutions must still fit at least one bin into the default belt
        params.genomic_belt = params.genomic_belt.max(resolution);
        Ok(params)
    }

    /// Width of the band around the main diagonal in base pairs.
    pub fn set_genomic_belt(&mut self, genomic_belt: usize) -> Result<&mut Self> {
        if genomic_belt < self.resolution {
            return Err(eyre!(
                "Genomic belt ({genomic_belt}) must be at least the resolution ({})",
                self.resolution
            ));
        }
        self.genomic_belt = genomic_belt;
        Ok(self)
    }

    /// Chromosomes shorter than this are not processed.
    pub fn set_min_chrom_size(&mut self, min_chrom_size: usize) -> &mut Self {
        self.min_chrom_size = min_chrom_size;
        self
    }

    /// Genomic belt expressed in bins, always at least 1.
    pub fn belt_bins(&self) -> usize {
        self.genomic_belt / self.resolution
    }

    /// Maximum number of bins a stripe can extend on each side of its seed.
    pub fn max_half_width_bins(&self, max_width: usize) -> usize {
        max_width / (2 * self.resolution) + 1
    }

    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        vec![
            ("resolution", self.resolution.to_string()),
            ("genomic-belt", self.genomic_belt.to_string()),
            ("min-chromosome-size", self.min_chrom_size.to_string()),
        ]
    }
}
