use super::Vec2;

/// A probe from `origin` toward `target`. Only the finite stretch between the
/// two endpoints takes part in collision tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub origin: Vec2,
    pub target: Vec2,
}

impl Segment {
    pub fn new(origin: Vec2, target: Vec2) -> Segment {
        Segment { origin, target }
    }

    #[inline(always)]
    pub fn direction(&self) -> Vec2 {
        self.target - self.origin
    }

    pub fn is_finite(&self) -> bool {
        self.origin.is_finite() && self.target.is_finite()
    }

    /// Inclusive test against the axis-aligned rectangle spanned by the endpoints.
    pub fn bounds_contain(&self, point: Vec2) -> bool {
        let (min_x, max_x) = min_max(self.origin.x, self.target.x);
        let (min_y, max_y) = min_max(self.origin.y, self.target.y);
        point.x >= min_x && point.x <= max_x && point.y >= min_y && point.y <= max_y
    }
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}
