pub use interval::Interval;
pub use per_triangle::PerTriangle;
pub use triangle::Triangle;

mod interval;
mod per_triangle;
mod triangle;
