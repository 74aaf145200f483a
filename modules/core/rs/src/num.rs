use std::fmt::Debug;

/// T values are primitive integers
pub trait PrimInt: ::num::PrimInt + Debug + Default {}
impl<T: ::num::PrimInt + Debug + Default> PrimInt for T {}

/// T values are float numbers
pub trait Float: ::num::Float + Debug + Default {
    /// Convert a number of elements (bins, cells, etc) into a float value.
    /// Primitive floats can represent any usize (possibly rounded), so the conversion never fails.
    #[inline(always)]
    fn from_count(count: usize) -> Self {
        <Self as ::num::NumCast>::from(count).unwrap_or_else(Self::infinity)
    }

    /// Convert a compile-time constant (threshold, epsilon, etc) into a float value.
    #[inline(always)]
    fn from_constant(value: f64) -> Self {
        <Self as ::num::NumCast>::from(value).unwrap_or_else(Self::nan)
    }
}

impl<T: ::num::Float + Debug + Default> Float for T {}
