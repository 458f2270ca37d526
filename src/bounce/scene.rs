use std::f64::consts::PI;

use super::core::{Circle, Scene};
use super::math::Vec2;

/// `count` circles evenly spaced by angle on a ring of radius `radius`,
/// the first one on the +x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub count: u32,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Place a circle at the origin before the rings.
    pub center: bool,
    pub rings: Vec<Ring>,
    pub circle_radius: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            center: true,
            rings: vec![
                Ring {
                    count: 6,
                    radius: 3.0,
                },
                Ring {
                    count: 12,
                    radius: 6.0,
                },
            ],
            circle_radius: 1.0,
        }
    }
}

impl Ring {
    pub fn circles(&self, circle_radius: f64) -> impl Iterator<Item = Circle> + '_ {
        (0..self.count).map(move |k| {
            let angle = 2.0 * PI * (k as f64 / self.count as f64);
            let center = Vec2::from_polar(self.radius, angle);
            Circle {
                center,
                radius: circle_radius,
            }
        })
    }
}

impl Scene {
    pub fn build(config: &SceneConfig) -> Scene {
        let mut circles = Vec::new();
        if config.center {
            circles.push(Circle::new(0.0, 0.0, config.circle_radius));
        }
        for ring in &config.rings {
            circles.extend(ring.circles(config.circle_radius));
        }
        Scene { circles }
    }

    /// The central circle, six circles at radius 3 and twelve at radius 6, all of radius 1.
    pub fn reference() -> Scene {
        Scene::build(&SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_layout() {
        let scene = Scene::reference();
        assert_eq!(scene.circles.len(), 19);
        assert_eq!(scene.circles[0], Circle::new(0.0, 0.0, 1.0));
        // first circle of each ring sits on the +x axis
        assert_eq!(scene.circles[1].center, Vec2::new(3.0, 0.0));
        assert_eq!(scene.circles[7].center, Vec2::new(6.0, 0.0));
        for circle in &scene.circles[1..7] {
            assert!((circle.center.len() - 3.0).abs() < 1e-12);
        }
        for circle in &scene.circles[7..] {
            assert!((circle.center.len() - 6.0).abs() < 1e-12);
            assert_eq!(circle.radius, 1.0);
        }
    }

    #[test]
    fn test_ring_spacing() {
        let ring = Ring {
            count: 4,
            radius: 2.0,
        };
        let centers: Vec<Vec2> = ring.circles(0.5).map(|c| c.center).collect();
        assert!(centers[1].distance(Vec2::new(0.0, 2.0)) < 1e-12);
        assert!(centers[2].distance(Vec2::new(-2.0, 0.0)) < 1e-12);
        assert!(centers[3].distance(Vec2::new(0.0, -2.0)) < 1e-12);
    }

    #[test]
    fn test_hollow_scene() {
        let config = SceneConfig {
            center: false,
            ..SceneConfig::default()
        };
        let scene = Scene::build(&config);
        assert_eq!(scene.circles.len(), 18);
        assert_eq!(scene.circles[0].center, Vec2::new(3.0, 0.0));
    }
}
