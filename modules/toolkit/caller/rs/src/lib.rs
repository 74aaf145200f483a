pub use caller::{select_chromosomes, Caller, ContactSource};
pub use config::{Params, Thresholds};
pub use failure::{Failure, Stage};
pub use result::{ChromosomeResult, TriangleResult};
pub use roi::{Roi, RoiCriterion};
pub use stripe::Stripe;

mod caller;
mod config;
mod failure;
pub mod preprocess;
pub mod result;
pub mod roi;
pub mod seeds;
pub mod shape;
pub mod smoothing;
pub mod stats;
mod stripe;
