use super::math::Vec2;

/// Maps a rectangular window of the plane onto a `width` x `height` pixel grid.
/// Row 0 corresponds to `min.y`.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub min: Vec2,
    pub max: Vec2,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(min: Vec2, max: Vec2, width: u32, height: u32) -> Self {
        Self {
            min,
            max,
            width,
            height,
        }
    }

    /// Pixel holding `point`, truncated toward zero. May lie outside the grid.
    pub fn to_pixel(&self, point: Vec2) -> (i64, i64) {
        let x = (point.x - self.min.x) / (self.max.x - self.min.x) * self.width as f64;
        let y = (point.y - self.min.y) / (self.max.y - self.min.y) * self.height as f64;
        (x as i64, y as i64)
    }

    /// Length in pixels of `len` world units, using the horizontal scale.
    pub fn scale(&self, len: f64) -> i64 {
        (self.width as f64 / (self.max.x - self.min.x) * len) as i64
    }

    /// World position of the top-left corner of pixel (`x`, `y`).
    pub fn to_world(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f64 / self.width as f64) * (self.max.x - self.min.x) + self.min.x,
            (y as f64 / self.height as f64) * (self.max.y - self.min.y) + self.min.y,
        )
    }
}
