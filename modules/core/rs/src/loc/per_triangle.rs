use std::ops::Index;

use derive_getters::Dissolve;
use derive_more::{Constructor, From};

use super::triangle::Triangle;

#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};

/// A struct that holds data for each half of a contact matrix.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, From, Dissolve, Constructor,
)]
pub struct PerTriangle<T> {
    pub lower: T,
    pub upper: T,
}

impl<T> PerTriangle<T> {
    /// Gets a reference to the data for the specified triangle.
    pub fn get(&self, triangle: Triangle) -> &T {
        match triangle {
            Triangle::Lower => &self.lower,
            Triangle::Upper => &self.upper,
        }
    }

    /// Gets an iterator over the data for each triangle. Order is lower, upper.
    pub fn iter(&self) -> impl Iterator<Item = (Triangle, &T)> {
        self.into_iter()
    }

    /// Maps each triangle to a new value.
    pub fn map<U>(self, mut f: impl FnMut(Triangle, T) -> U) -> PerTriangle<U> {
        PerTriangle {
            lower: f(Triangle::Lower, self.lower),
            upper: f(Triangle::Upper, self.upper),
        }
    }

    /// Fallible version of `map`. Stops at the first failure, the lower triangle goes first.
    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(Triangle, T) -> Result<U, E>,
    ) -> Result<PerTriangle<U>, E> {
        Ok(PerTriangle {
            lower: f(Triangle::Lower, self.lower)?,
            upper: f(Triangle::Upper, self.upper)?,
        })
    }

    /// Converts `&PerTriangle<T>` into `PerTriangle<&T>`.
    pub fn as_refs(&self) -> PerTriangle<&T> {
        PerTriangle {
            lower: &self.lower,
            upper: &self.upper,
        }
    }
}

impl<T> Index<Triangle> for PerTriangle<T> {
    type Output = T;

    fn index(&self, triangle: Triangle) -> &Self::Output {
        self.get(triangle)
    }
}

impl<'a, T> IntoIterator for &'a PerTriangle<T> {
    type Item = (Triangle, &'a T);
    type IntoIter = std::array::IntoIter<(Triangle, &'a T), 2>;

    fn into_iter(self) -> Self::IntoIter {
        [(Triangle::Lower, &self.lower), (Triangle::Upper, &self.upper)].into_iter()
    }
}
