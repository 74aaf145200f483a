pub use extrema::{extrema, filter, split, Extrema};
pub use persistence::{run, LevelSets, PersistencePair};

mod extrema;
mod persistence;
