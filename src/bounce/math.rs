pub mod segment;
pub mod vec2;

pub use segment::*;
pub use vec2::*;
