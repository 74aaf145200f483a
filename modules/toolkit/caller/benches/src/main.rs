use eyre::{eyre, Result};
use rayon::ThreadPoolBuilder;

use stria_caller_rs::{Caller, ContactSource, Params, RoiCriterion, Thresholds};
use stria_collections_rs::csr::{from_triplets, CsMat};
use stria_core_rs::parallelism;

const THREADS: isize = 0;
const RESOLUTION: usize = 25_000;
const BELT: usize = 5_000_000;
const CHROMOSOMES: &[(&str, usize)] = &[
    // CHM13v2
    ("chr1", 248_387_328),
    ("chr2", 242_696_752),
    ("chr3", 201_105_948),
    ("chr4", 193_574_945),
    ("chr5", 182_045_439),
    // ("chr6", 172_126_628),
    // ("chr7", 160_567_428),
    // ("chr8", 146_259_331),
    ("chrM", 16_569),
];

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

/// Contacts decaying with the distance from the diagonal plus a stripe every 97 bins.
struct Synthetic;

impl ContactSource<f64> for Synthetic {
    fn chromosomes(&self) -> Vec<(String, usize)> {
        CHROMOSOMES
            .iter()
            .map(|(name, size)| (name.to_string(), *size))
            .collect()
    }

    fn fetch(&self, chromosome: &str, resolution: usize) -> Result<CsMat<f64>> {
        let size = CHROMOSOMES
            .iter()
            .find(|(name, _)| *name == chromosome)
            .map(|(_, size)| *size)
            .ok_or_else(|| eyre!("Unknown chromosome: {chromosome}"))?;

        let bins = size.div_ceil(resolution);
        let belt = BELT / resolution;
        let mut triplets = Vec::new();
        for col in 0..bins {
            for offset in 0..belt.min(bins - col) {
                let mut value = 100.0 / (1.0 + offset as f64);
                if col % 97 < 3 && offset < 25 {
                    value *= 4.0;
                }
                triplets.push((col + offset, col, value));
                if offset > 0 {
                    triplets.push((col, col + offset, value));
                }
            }
        }
        from_triplets((bins, bins), triplets)
    }
}

fn main() {
    let threads = parallelism::available(THREADS).unwrap();
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .use_current_thread()
        .build()
        .unwrap();

    let mut params = Params::new(RESOLUTION).unwrap();
    params.set_genomic_belt(BELT).unwrap();

    let mut thresholds = Thresholds::<f64>::new();
    thresholds
        .set_global_persistence_min(0.04)
        .unwrap()
        .set_constrain_heights(true);

    let mut caller = Caller::new(params, thresholds, pool);
    caller.set_roi(Some(RoiCriterion::Middle));

    // Run the caller
    let results = {
        #[cfg(feature = "dhat-heap")]
        let _profiler = dhat::Profiler::new_heap();
        caller.run(&Synthetic)
    };

    // Print the result
    for result in results {
        let result = result.unwrap();
        println!("Chromosome: {}", result.chromosome());

        for (triangle, calls) in result.triangles() {
            println!(
                "\t{}: {} seeds, {} stripes, {} discarded",
                triangle,
                calls.seeds().len(),
                calls.stripes().len(),
                calls.discarded()
            );
            for stripe in calls.stripes() {
                println!(
                    "\t\t{} {} {:.3}",
                    stripe.domain(),
                    stripe.height(),
                    stripe.relative_change().unwrap_or(f64::NAN)
                )
            }
        }
        println!()
    }
}
