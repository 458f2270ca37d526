pub mod canvas;
pub mod color;
pub mod core;
pub mod math;
pub mod render;
pub mod scene;
pub mod view;

pub use math::*;
