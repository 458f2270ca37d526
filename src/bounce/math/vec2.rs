use std::ops;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl ops::Add<Vec2> for Vec2 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl ops::Sub<Vec2> for Vec2 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl ops::Neg for Vec2 {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl ops::Mul<f64> for Vec2 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: f64) -> Self::Output {
        Vec2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl ops::Div<f64> for Vec2 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: f64) -> Self::Output {
        Vec2 {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

impl Vec2 {
    #[inline(always)]
    pub fn new(x: f64, y: f64) -> Vec2 {
        Vec2 { x, y }
    }

    /// Point at distance `radius` from the origin, `angle` radians counterclockwise from +x.
    #[inline(always)]
    pub fn from_polar(radius: f64, angle: f64) -> Vec2 {
        Vec2::new(radius * angle.cos(), radius * angle.sin())
    }

    #[inline(always)]
    pub fn reflect(self, axis: Vec2) -> Vec2 {
        // reflect the vector with respect to the (unit) axis
        self - axis * (2.0 * self.dot(axis))
    }

    #[inline(always)]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline(always)]
    pub fn squared_distance(self, other: Vec2) -> f64 {
        (self - other).squared_len()
    }

    #[inline(always)]
    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).len()
    }

    #[inline(always)]
    pub fn squared_len(self) -> f64 {
        self.dot(self)
    }

    #[inline(always)]
    pub fn len(self) -> f64 {
        self.squared_len().sqrt()
    }

    #[inline(always)]
    pub fn normalize(self) -> Vec2 {
        self / self.len()
    }

    /// Same direction, rescaled to `len`. Divides by `self.len() / len`,
    /// which rounds differently from multiplying by `len / self.len()`.
    #[inline(always)]
    pub fn with_len(self, len: f64) -> Vec2 {
        self / (self.len() / len)
    }

    /// Angle in radians in (-π, π], measured from +x.
    #[inline(always)]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline(always)]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
