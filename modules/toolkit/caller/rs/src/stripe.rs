use std::ops::Range;

use derive_getters::{Dissolve, Getters};
use eyre::{eyre, Result};

use stria_core_rs::loc::{Interval, Triangle};
use stria_core_rs::num::Float;

use crate::stats::Biodescriptors;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// Candidate architectural stripe. Coordinates are matrix bins.
///
/// The stripe follows the main diagonal: in every column of its domain it covers the cells
/// located [0, height) bins away from the diagonal, below it in the lower triangle and above it
/// in the upper one. Statistics are computed over exactly these cells.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Debug, Dissolve, Getters)]
pub struct Stripe<V> {
    seed: usize,
    persistence: V,
    triangle: Triangle,
    /// Columns covered by the stripe.
    domain: Interval<usize>,
    /// Number of diagonals covered by the stripe, starting from the main one.
    height: usize,
    descriptors: Option<Biodescriptors<V>>,
}

impl<V: Float> Stripe<V> {
    pub fn new(
        seed: usize,
        persistence: V,
        triangle: Triangle,
        domain: Interval<usize>,
        height: usize,
    ) -> Result<Self> {
        if !domain.contains(seed) {
            return Err(eyre!(
                "Stripe domain {domain} must contain its seed {seed}"
            ));
        }
        if height == 0 {
            return Err(eyre!("Stripe height must be greater than 0"));
        }
        Ok(Self {
            seed,
            persistence,
            triangle,
            domain,
            height,
            descriptors: None,
        })
    }

    pub fn width(&self) -> usize {
        self.domain.len()
    }

    /// Rows covered by the stripe in the given column, None outside of its domain.
    pub fn rows_at(&self, col: usize) -> Option<Range<usize>> {
        self.domain
            .contains(col)
            .then(|| self.triangle.band(col, self.height))
    }

    /// First row covered by the stripe (closest to the top of the matrix).
    pub fn top(&self) -> usize {
        self.triangle.band(self.domain.start(), self.height).start
    }

    /// Last row covered by the stripe, inclusive. Lower stripes next to the bottom-right corner
    /// may extend past the last row of the matrix.
    pub fn bottom(&self) -> usize {
        self.triangle.band(self.domain.end() - 1, self.height).end - 1
    }

    pub fn relative_change(&self) -> Option<V> {
        self.descriptors.as_ref().and_then(|x| *x.relative_change())
    }

    pub fn set_descriptors(&mut self, descriptors: Biodescriptors<V>) -> &mut Self {
        self.descriptors = Some(descriptors);
        self
    }
}
