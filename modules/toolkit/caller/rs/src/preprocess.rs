use derive_getters::{Dissolve, Getters};
use eyre::{ensure, Result};

use stria_collections_rs::csr::{Array2, CsMat, ContactMatrix};
use stria_core_rs::loc::{Interval, PerTriangle, Triangle};
use stria_core_rs::num::Float;

use crate::config::Params;

/// Pseudocount added to contacts before the log transform. Zero contacts stay zero.
pub const LOG_PSEUDOCOUNT: f64 = 1.0;

/// Log-transformed contact matrix projected onto [0, 1] and split into the two triangular
/// working matrices restricted to the genomic belt.
#[derive(Clone, PartialEq, Debug, Dissolve, Getters)]
pub struct Preprocessed<V> {
    working: PerTriangle<CsMat<V>>,
    roi: Option<Array2<V>>,
}

/// Step 1 of the pipeline. The input matrix must hold both halves of the contact map.
pub fn preprocess<V: Float>(
    matrix: &CsMat<V>,
    params: &Params,
    roi: Option<&Interval<usize>>,
) -> Result<Preprocessed<V>> {
    ensure!(
        matrix.is_square(),
        "Contact matrix must be square, got {}x{}",
        matrix.rows(),
        matrix.cols()
    );
    ensure!(
        matrix.data().iter().all(|x| x.is_finite() && *x >= V::zero()),
        "Contact matrix must hold only finite non-negative values"
    );

    let pseudocount = V::from_constant(LOG_PSEUDOCOUNT);
    let transformed = matrix.map(|x| (*x + pseudocount).ln());
    let transformed = match transformed.max_value() {
        Some(max) if max > V::zero() => transformed.map(|x| *x / max),
        _ => transformed,
    };

    let belt = params.belt_bins();
    let working = PerTriangle::new(Triangle::Lower, Triangle::Upper).map(|_, triangle| {
        transformed.retain(|row, col, _| {
            triangle
                .offset(row, col)
                .is_some_and(|offset| offset < belt)
        })
    });

    let roi = match roi {
        Some(roi) => Some(transformed.block(roi.as_range(), roi.as_range())?),
        None => None,
    };

    Ok(Preprocessed { working, roi })
}

#[cfg(test)]
mod tests {
    use stria_collections_rs::csr::{empty, from_triplets};

    use super::*;

    fn matrix() -> Result<CsMat<f64>> {
        let mut triplets = Vec::new();
        for row in 0..6 {
            for col in 0..6 {
                let value = (row + col + 1) as f64;
                triplets.push((row, col, value));
            }
        }
        from_triplets((6, 6), triplets)
    }

    #[test]
    fn test_preprocess_band() -> Result<()> {
        let mut params = Params::new(10)?;
        params.set_genomic_belt(30)?;

        let input = matrix()?;
        let preprocessed = preprocess(&input, &params, None)?;

        for (triangle, working) in preprocessed.working() {
            for (row, col, value) in working.cells() {
                let offset = triangle.offset(row, col);
                assert!(offset.is_some_and(|x| x < 3), "{triangle} ({row}, {col})");
                assert!((0.0..=1.0).contains(&value));
            }
        }
        // Main diagonal belongs to both halves
        let working = preprocessed.working();
        assert_eq!(working.lower.value(2, 2), working.upper.value(2, 2));
        assert_eq!(working.lower.nnz(), 6 + 5 + 4);
        assert_eq!(working.upper.nnz(), 6 + 5 + 4);
        assert_eq!(working.lower.value(0, 3), 0.0);
        assert_eq!(working.lower.value(3, 0), 0.0);

        // Input is left untouched
        assert_eq!(input, matrix()?);
        Ok(())
    }

    #[test]
    fn test_preprocess_scaling() -> Result<()> {
        let params = Params::new(1)?;
        let preprocessed = preprocess(&matrix()?, &params, None)?;

        // The largest cell (5, 5) = 11 lies on the diagonal and maps to 1
        let lower = &preprocessed.working().lower;
        assert_eq!(lower.value(5, 5), 1.0);
        let expected = (1.0f64 + 4.0).ln() / (1.0f64 + 11.0).ln();
        assert!((lower.value(2, 1) - expected).abs() < 1e-12);

        // All-zero matrix stays zero
        let zeros = from_triplets((3, 3), [(0, 0, 0.0), (1, 0, 0.0)])?;
        let preprocessed = preprocess(&zeros, &params, None)?;
        assert_eq!(preprocessed.working().lower.max_value(), Some(0.0));
        Ok(())
    }

    #[test]
    fn test_preprocess_roi() -> Result<()> {
        let params = Params::new(1)?;
        let roi = Interval::new(2, 5)?;
        let preprocessed = preprocess(&matrix()?, &params, Some(&roi))?;

        let block = preprocessed
            .roi()
            .as_ref()
            .ok_or_else(|| eyre::eyre!("RoI block is missing"))?;
        assert_eq!(block.dim(), (3, 3));
        let scale = (1.0f64 + 11.0).ln();
        assert!((block[[0, 2]] - (1.0f64 + 7.0).ln() / scale).abs() < 1e-12);

        let outside = Interval::new(4, 7)?;
        assert!(preprocess(&matrix()?, &params, Some(&outside)).is_err());
        Ok(())
    }

    #[test]
    fn test_preprocess_invalid_input() -> Result<()> {
        let params = Params::new(1)?;
        for triplets in [
            vec![(0, 1, -1.0)],
            vec![(1, 1, f64::NAN)],
            vec![(0, 0, f64::INFINITY)],
        ] {
            let matrix = from_triplets((2, 2), triplets)?;
            assert!(preprocess(&matrix, &params, None).is_err());
        }
        let rectangular = empty::<f64>((2, 3));
        assert!(preprocess(&rectangular, &params, None).is_err());
        Ok(())
    }
}
