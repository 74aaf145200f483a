use std::fmt::{Display, Formatter};

use derive_more::Constructor;

use stria_core_rs::loc::Triangle;

/// Steps of the stripe calling pipeline.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Stage {
    Preprocessing,
    SeedDetection,
    ShapeEstimation,
    StatisticalFiltering,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Preprocessing => "pre-processing",
            Stage::SeedDetection => "seed detection",
            Stage::ShapeEstimation => "shape estimation",
            Stage::StatisticalFiltering => "statistical filtering",
        };
        write!(f, "{name}")
    }
}

/// Context attached to errors raised by the pipeline. Triangle is None for steps that process
/// both halves of the matrix at once.
#[derive(Clone, PartialEq, Eq, Debug, Constructor)]
pub struct Failure {
    pub chromosome: String,
    pub triangle: Option<Triangle>,
    pub stage: Stage,
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.triangle {
            Some(triangle) => write!(
                f,
                "Stripe calling failed at {} for {} [{}]",
                self.stage, self.chromosome, triangle
            ),
            None => write!(
                f,
                "Stripe calling failed at {} for {}",
                self.stage, self.chromosome
            ),
        }
    }
}
