use std::ops::RangeInclusive;

use rayon::ThreadPoolBuilder;

use eyre::{eyre, Result};
use stria_caller_rs::{
    select_chromosomes, Caller, ChromosomeResult, ContactSource, Failure, Params, Roi,
    RoiCriterion, Stage, Thresholds,
};
use stria_collections_rs::csr::{from_triplets, CsMat};
use stria_core_rs::loc::Triangle;
use stria_core_rs::parallelism::{self, Sequential};

const THREADS: isize = -1;
const BINS: usize = 300;
const RESOLUTION: usize = 1_000;
const BELT: usize = 50_000;
const STRIPE_COLUMNS: std::ops::Range<usize> = 100..120;
const STRIPE_OFFSETS: RangeInclusive<usize> = 1..=10;
const STRIPE_HEIGHT: usize = 10;

/// Uniform background within the belt and bright cells on top of it.
fn contacts_with(stripe: impl IntoIterator<Item = (usize, usize)>) -> Result<CsMat<f64>> {
    let belt = BELT / RESOLUTION;
    let mut triplets = Vec::new();
    for row in 0..BINS {
        for col in row.saturating_sub(belt - 1)..(row + belt).min(BINS) {
            triplets.push((row, col, 1.0));
        }
    }
    triplets.extend(stripe.into_iter().map(|(row, col)| (row, col, 50.0)));
    from_triplets((BINS, BINS), triplets)
}

/// Stripe hanging below the diagonal, (col + offset, col) cells.
fn lower_stripe(offsets: RangeInclusive<usize>) -> impl Iterator<Item = (usize, usize)> {
    STRIPE_COLUMNS.flat_map(move |col| offsets.clone().map(move |offset| (col + offset, col)))
}

/// Stripe rising above the diagonal, (col - offset, col) cells.
fn upper_stripe(offsets: RangeInclusive<usize>) -> impl Iterator<Item = (usize, usize)> {
    STRIPE_COLUMNS.flat_map(move |col| offsets.clone().map(move |offset| (col - offset, col)))
}

fn contacts() -> Result<CsMat<f64>> {
    contacts_with(lower_stripe(STRIPE_OFFSETS))
}

fn caller<E: parallelism::Executor>(executor: E) -> Result<Caller<f64, E>> {
    let mut params = Params::new(RESOLUTION)?;
    params.set_genomic_belt(BELT)?.set_min_chrom_size(250_000);
    Ok(Caller::new(params, Thresholds::new(), executor))
}

struct Synthetic {
    chromosomes: Vec<(String, usize)>,
    contacts: CsMat<f64>,
}

impl ContactSource<f64> for Synthetic {
    fn chromosomes(&self) -> Vec<(String, usize)> {
        self.chromosomes.clone()
    }

    fn fetch(&self, chromosome: &str, resolution: usize) -> Result<CsMat<f64>> {
        match (chromosome, resolution) {
            ("chrBroken", _) => Err(eyre!("Corrupted contacts")),
            (_, RESOLUTION) => Ok(self.contacts.clone()),
            _ => Err(eyre!("Unsupported resolution: {resolution}")),
        }
    }
}

fn check_single_stripe(result: &ChromosomeResult<f64>, triangle: Triangle) {
    let calls = &result.triangles()[triangle];
    assert_eq!(calls.stripes().len(), 1, "{triangle}");

    let stripe = &calls.stripes()[0];
    assert_eq!(*stripe.triangle(), triangle);
    assert!((STRIPE_COLUMNS.start..=STRIPE_COLUMNS.end).contains(stripe.seed()));
    assert!(stripe.width().abs_diff(STRIPE_COLUMNS.len()) <= 1, "{stripe:?}");
    // Height counts the main diagonal as well
    assert!(stripe.height().abs_diff(STRIPE_HEIGHT) <= 1, "{stripe:?}");
    assert!(stripe.relative_change().is_some_and(|x| x >= 5.0));

    // The other triangle holds only the background
    let other = match triangle {
        Triangle::Lower => &result.triangles()[Triangle::Upper],
        Triangle::Upper => &result.triangles()[Triangle::Lower],
    };
    assert!(other.stripes().is_empty());
    assert!(*other.discarded() >= 1);
    assert_eq!(result.stripes().count(), 1);
}

#[test]
fn single_stripe() -> Result<()> {
    let contacts = contacts()?;
    let result = caller(Sequential)?.call("chrS", BINS * RESOLUTION, &contacts, None)?;
    check_single_stripe(&result, Triangle::Lower);

    assert_eq!(result.chromosome(), "chrS");
    assert!(result.roi().is_none());
    assert!(result.roi_matrix().is_none());
    for (_, triangle) in result.triangles() {
        assert_eq!(triangle.pseudodistribution().len(), BINS);
        assert!(!triangle.seeds().is_empty());
        assert!(triangle.extrema().maxima.len() >= triangle.seeds().len());
    }
    assert!(result
        .metadata()
        .contains(&("genomic-belt", BELT.to_string())));
    Ok(())
}

#[test]
fn stripe_touching_diagonal() -> Result<()> {
    // The diagonal is shared by both halves, yet the upper one must not report a stripe
    let contacts = contacts_with(lower_stripe(0..=STRIPE_HEIGHT))?;
    let result = caller(Sequential)?.call("chrS", BINS * RESOLUTION, &contacts, None)?;
    check_single_stripe(&result, Triangle::Lower);
    Ok(())
}

#[test]
fn upper_triangle_stripe() -> Result<()> {
    let contacts = contacts_with(upper_stripe(STRIPE_OFFSETS))?;
    let result = caller(Sequential)?.call("chrS", BINS * RESOLUTION, &contacts, None)?;
    check_single_stripe(&result, Triangle::Upper);

    let stripe = &result.triangles()[Triangle::Upper].stripes()[0];
    assert!(stripe.top() < STRIPE_COLUMNS.start);
    assert_eq!(stripe.bottom(), stripe.domain().end() - 1);
    Ok(())
}

#[test]
fn constrained_heights() -> Result<()> {
    let contacts = contacts()?;
    let mut params = Params::new(RESOLUTION)?;
    params.set_genomic_belt(BELT)?;
    let mut thresholds = Thresholds::new();
    thresholds.set_constrain_heights(true);

    let caller = Caller::new(params, thresholds, Sequential);
    let result = caller.call("chrS", BINS * RESOLUTION, &contacts, None)?;
    check_single_stripe(&result, Triangle::Lower);
    Ok(())
}

#[test]
fn executors_agree() -> Result<()> {
    let contacts = contacts()?;
    let sequential = caller(Sequential)?.call("chrS", BINS * RESOLUTION, &contacts, None)?;

    let pool = ThreadPoolBuilder::new()
        .num_threads(parallelism::available(THREADS)?)
        .use_current_thread()
        .build()?;
    let parallel = caller(pool)?.call("chrS", BINS * RESOLUTION, &contacts, None)?;

    assert_eq!(sequential, parallel);
    Ok(())
}

#[test]
fn region_of_interest() -> Result<()> {
    let contacts = contacts()?;
    let roi = Roi::define(RoiCriterion::Middle, BINS * RESOLUTION, RESOLUTION)?;
    let result = caller(Sequential)?.call("chrS", BINS * RESOLUTION, &contacts, Some(roi))?;

    // The window is larger than the chromosome and covers it entirely
    let block = result.roi_matrix().as_ref().ok_or_else(|| eyre!("RoI matrix is missing"))?;
    assert_eq!(block.dim(), (BINS, BINS));
    check_single_stripe(&result, Triangle::Lower);
    Ok(())
}

#[test]
fn labeled_failures() -> Result<()> {
    let contacts = from_triplets((BINS, BINS), [(0, 0, 1.0), (5, 3, -1.0)])?;
    let err = caller(Sequential)?
        .call("chrNeg", BINS * RESOLUTION, &contacts, None)
        .unwrap_err();

    let failure = err
        .downcast_ref::<Failure>()
        .ok_or_else(|| eyre!("Failure context is missing"))?;
    assert_eq!(failure.chromosome, "chrNeg");
    assert_eq!(failure.stage, Stage::Preprocessing);
    assert_eq!(failure.triangle, None);
    Ok(())
}

#[test]
fn run_over_source() -> Result<()> {
    let source = Synthetic {
        chromosomes: vec![
            ("chrShort".to_string(), 100_000),
            ("chrS".to_string(), BINS * RESOLUTION),
            ("chrBroken".to_string(), BINS * RESOLUTION),
        ],
        contacts: contacts()?,
    };

    let selected = select_chromosomes(&source.chromosomes(), 250_000);
    assert_eq!(
        selected,
        vec![(1, "chrS".to_string()), (2, "chrBroken".to_string())]
    );

    let mut caller = caller(Sequential)?;
    caller.set_roi(Some(RoiCriterion::Start));
    let results = caller.run(&source);
    assert_eq!(results.len(), 2);

    let result = results[0].as_ref().map_err(|err| eyre!("{err:?}"))?;
    assert_eq!(result.chromosome(), "chrS");
    assert!(result.roi().is_some());
    check_single_stripe(result, Triangle::Lower);

    // Failures don't stop the run, short chromosomes never reach it
    let err = results[1]
        .as_ref()
        .err()
        .ok_or_else(|| eyre!("chrBroken must fail"))?;
    let failure = err
        .downcast_ref::<Failure>()
        .ok_or_else(|| eyre!("Failure context is missing"))?;
    assert_eq!(failure.chromosome, "chrBroken");
    assert_eq!(failure.stage, Stage::Preprocessing);
    assert_eq!(failure.triangle, None);
    Ok(())
}
