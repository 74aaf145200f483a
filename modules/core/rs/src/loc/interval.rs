use std::fmt::{Debug, Display};
use std::ops::Range;

use derive_getters::Dissolve;
use eyre::{eyre, Result};

use crate::num::PrimInt;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// Interval is a half-open region [start, end) of matrix bins or genomic coordinates.
/// Empty intervals (start == end) and intervals with negative length (start > end) are prohibited.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Dissolve)]
pub struct Interval<Idx: PrimInt> {
    start: Idx,
    end: Idx,
}

impl<Idx: PrimInt> Interval<Idx> {
    pub fn new(start: Idx, end: Idx) -> Result<Self> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(eyre!("Invalid interval: start >= end ({start:?} >= {end:?})"))
        }
    }

    #[inline(always)]
    pub fn start(&self) -> Idx {
        self.start
    }

    #[inline(always)]
    pub fn end(&self) -> Idx {
        self.end
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> Idx {
        self.end - self.start
    }

    pub fn contains(&self, pos: Idx) -> bool {
        self.start <= pos && pos < self.end
    }
}

impl Interval<usize> {
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl<Idx: PrimInt + Display> Display for Interval<Idx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl<Idx: PrimInt> TryFrom<Range<Idx>> for Interval<Idx> {
    type Error = eyre::Report;

    fn try_from(value: Range<Idx>) -> Result<Self> {
        Self::new(value.start, value.end)
    }
}
