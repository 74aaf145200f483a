use derive_getters::{Dissolve, Getters};
use eyre::{eyre, Result};

use stria_core_rs::loc::Interval;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// Size of the region of interest in base pairs.
pub const ROI_WINDOW: usize = 2_000_000;

/// Where the region of interest is placed within a chromosome.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RoiCriterion {
    /// Centred on the middle of the chromosome.
    Middle,
    /// At the beginning of the chromosome.
    Start,
}

impl TryFrom<&str> for RoiCriterion {
    type Error = eyre::Report;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "middle" => Ok(RoiCriterion::Middle),
            "start" => Ok(RoiCriterion::Start),
            _ => Err(eyre!("Unknown RoI criterion: {value}")),
        }
    }
}

/// Region of interest of a chromosome in genomic coordinates and in matrix bins.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Dissolve, Getters)]
pub struct Roi {
    genomic: Interval<usize>,
    bins: Interval<usize>,
}

impl Roi {
    /// Place a window of [`ROI_WINDOW`] bp on the chromosome, clipped to its boundaries.
    pub fn define(criterion: RoiCriterion, chrom_size: usize, resolution: usize) -> Result<Self> {
        if resolution == 0 {
            return Err(eyre!("Resolution must be greater than 0"));
        }

        let (start, end) = match criterion {
            RoiCriterion::Middle => {
                let middle = chrom_size / 2;
                let start = middle.saturating_sub(ROI_WINDOW / 2);
                (start, (start + ROI_WINDOW).min(chrom_size))
            }
            RoiCriterion::Start => (0, ROI_WINDOW.min(chrom_size)),
        };
        let genomic = Interval::new(start, end)?;
        let bins = Interval::new(start / resolution, end.div_ceil(resolution))?;
        Ok(Self { genomic, bins })
    }
}
