use std::f64::consts::PI;

use image::{Rgb, RgbImage};
use rayon::prelude::*;

use super::canvas::{Surface, BLACK, RED, WHITE};
use super::color::escape_color;
use super::core::{trace, BounceParams, Scene, Termination};
use super::math::{Segment, Vec2};
use super::view::Viewport;

pub fn draw_circles<S: Surface>(
    surface: &mut S,
    scene: &Scene,
    view: &Viewport,
    color: Rgb<u8>,
) {
    for circle in &scene.circles {
        let (x, y) = view.to_pixel(circle.center);
        surface.draw_circle_outline(x, y, view.scale(circle.radius), color);
    }
}

pub fn draw_segment<S: Surface>(
    surface: &mut S,
    segment: &Segment,
    view: &Viewport,
    color: Rgb<u8>,
) {
    let (x1, y1) = view.to_pixel(segment.origin);
    let (x2, y2) = view.to_pixel(segment.target);
    surface.draw_line(x1, y1, x2, y2, color);
}

/// A ray that drifts slightly between frames so that the divergence of nearby
/// bounce chains can be watched.
#[derive(Debug, Clone)]
pub struct Animation {
    pub view: Viewport,
    pub frames: u32,
    pub start: Vec2,
    pub target: Vec2,
    /// Vertical offset of the start point reached at the last frame.
    pub wobble: f64,
    pub params: BounceParams,
}

impl Animation {
    pub fn ray(&self, frame: u32) -> Segment {
        let offset = frame as f64 / self.frames as f64 * self.wobble;
        Segment::new(self.start + Vec2::new(0.0, offset), self.target)
    }

    /// Circles in white, then the bounce chain in red on a black background.
    pub fn render_frame(&self, scene: &Scene, frame: u32) -> (RgbImage, Termination) {
        let mut buffer = RgbImage::from_pixel(self.view.width, self.view.height, BLACK);
        draw_circles(&mut buffer, scene, &self.view, WHITE);

        let path = trace(scene, self.ray(frame), self.params);
        for segment in path.segments() {
            draw_segment(&mut buffer, &segment, &self.view, RED);
        }
        (buffer, path.termination)
    }
}

/// Per-pixel scan: the horizontal axis picks where on the launch circle a ray
/// starts, the vertical axis which way it heads (both in degrees). Pixels are
/// colored by the heading of the escaped ray.
#[derive(Debug, Clone)]
pub struct EscapeMap {
    pub window: Viewport,
    pub launch_radius: f64,
    /// Length of the first probe.
    pub reach: f64,
    pub params: BounceParams,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscapeStats {
    pub escaped: u64,
    pub exhausted: u64,
    pub degenerate: u64,
}

impl EscapeStats {
    fn record(&mut self, termination: Termination) {
        match termination {
            Termination::Escaped => self.escaped += 1,
            Termination::Exhausted => self.exhausted += 1,
            Termination::Degenerate => self.degenerate += 1,
        }
    }

    fn merge(self, other: EscapeStats) -> EscapeStats {
        EscapeStats {
            escaped: self.escaped + other.escaped,
            exhausted: self.exhausted + other.exhausted,
            degenerate: self.degenerate + other.degenerate,
        }
    }
}

impl EscapeMap {
    pub fn ray(&self, x: u32, y: u32) -> Segment {
        let angles = self.window.to_world(x, y);
        let origin = Vec2::from_polar(self.launch_radius, angles.x / 180.0 * PI);
        let target = origin + Vec2::from_polar(self.reach, angles.y / 180.0 * PI);
        Segment::new(origin, target)
    }

    /// Color of one pixel; black unless the ray escapes.
    pub fn shade(&self, scene: &Scene, x: u32, y: u32) -> (Rgb<u8>, Termination) {
        let path = trace(scene, self.ray(x, y), self.params);
        match path.exit() {
            Some(exit) => (escape_color(exit.direction()), path.termination),
            None => (BLACK, path.termination),
        }
    }

    /// Renders rows in parallel; each row owns its own slice of pixels.
    pub fn render(&self, scene: &Scene) -> (RgbImage, EscapeStats) {
        let width = self.window.width as usize;
        let height = self.window.height as usize;
        let mut pixels = vec![BLACK; width * height];

        let stats = pixels
            .par_chunks_mut(width.max(1))
            .enumerate()
            .map(|(y, row)| {
                let mut stats = EscapeStats::default();
                for (x, pixel) in row.iter_mut().enumerate() {
                    let (color, termination) = self.shade(scene, x as u32, y as u32);
                    *pixel = color;
                    stats.record(termination);
                }
                stats
            })
            .reduce(EscapeStats::default, EscapeStats::merge);

        let mut buffer = RgbImage::new(self.window.width, self.window.height);
        for (x, y, pixel) in buffer.enumerate_pixels_mut() {
            *pixel = pixels[x as usize + width * y as usize];
        }
        (buffer, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounce::color::escape_hue;
    use crate::bounce::core::Circle;

    fn animation() -> Animation {
        Animation {
            view: Viewport::new(Vec2::new(-14.22, -8.0), Vec2::new(14.22, 8.0), 192, 108),
            frames: 96,
            start: Vec2::new(7.0, 7.0),
            target: Vec2::new(-3.0, -4.0),
            wobble: 0.0000005,
            params: BounceParams::default(),
        }
    }

    fn escape_map(width: u32, height: u32) -> EscapeMap {
        EscapeMap {
            window: Viewport::new(Vec2::new(210.0, 40.0), Vec2::new(246.0, 76.0), width, height),
            launch_radius: 8.0,
            reach: 12.0,
            params: BounceParams::default(),
        }
    }

    #[test]
    fn test_frame_rays_drift_upward() {
        let animation = animation();
        let first = animation.ray(0);
        assert_eq!(first, Segment::new(Vec2::new(7.0, 7.0), Vec2::new(-3.0, -4.0)));
        let last = animation.ray(48);
        assert!((last.origin.y - 7.00000025).abs() < 1e-12);
        assert_eq!(last.target, Vec2::new(-3.0, -4.0));
    }

    #[test]
    fn test_frame_draws_circles_and_path() {
        let (frame, termination) = animation().render_frame(&Scene::reference(), 0);
        assert_eq!(frame.dimensions(), (192, 108));
        assert!(frame.pixels().any(|p| *p == WHITE));
        assert!(frame.pixels().any(|p| *p == RED));
        assert_ne!(termination, Termination::Degenerate);
    }

    #[test]
    fn test_frame_of_empty_scene_is_a_single_line() {
        let animation = animation();
        let (frame, termination) = animation.render_frame(&Scene::default(), 0);
        assert_eq!(termination, Termination::Escaped);
        assert!(!frame.pixels().any(|p| *p == WHITE));
        let (x, y) = animation.view.to_pixel(Vec2::new(7.0, 7.0));
        assert_eq!(*frame.get_pixel(x as u32, y as u32), RED);
    }

    #[test]
    fn test_escape_ray_geometry() {
        let map = escape_map(36, 36);
        let ray = map.ray(0, 0);
        let start = Vec2::from_polar(8.0, 210f64.to_radians());
        assert!(ray.origin.distance(start) < 1e-12);
        assert!((ray.direction().len() - 12.0).abs() < 1e-12);
        assert!((ray.direction().angle().to_degrees() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_scene_colors_every_pixel_by_heading() {
        let map = escape_map(6, 6);
        let (image, stats) = map.render(&Scene::default());
        assert_eq!(stats.escaped, 36);
        for (x, y, pixel) in image.enumerate_pixels() {
            assert_eq!(*pixel, escape_color(map.ray(x, y).direction()));
        }
    }

    #[test]
    fn test_parallel_render_matches_sequential_trace() {
        let scene = Scene::reference();
        let map = escape_map(12, 9);
        let (image, stats) = map.render(&scene);
        assert_eq!(stats.escaped + stats.exhausted + stats.degenerate, 12 * 9);
        for (x, y, pixel) in image.enumerate_pixels() {
            let path = trace(&scene, map.ray(x, y), map.params);
            let expected = match path.exit() {
                Some(exit) => escape_color(exit.direction()),
                None => BLACK,
            };
            assert_eq!(*pixel, expected, "pixel ({}, {})", x, y);
        }
    }

    /// Straight-line rendition of the reference bounce loop on plain floats,
    /// operation for operation. Stops where `trace` reports degenerate geometry.
    fn reference_chain(circles: &[(f64, f64, f64)], start: (f64, f64), end: (f64, f64)) -> Vec<Vec2> {
        let (mut x1, mut y1) = start;
        let (mut x2, mut y2) = end;
        let inside = |cx: f64, cy: f64, r: f64, x: f64, y: f64| {
            let dx = x - cx;
            let dy = y - cy;
            dx * dx + dy * dy <= r * r
        };
        let mut vertices = vec![Vec2::new(x1, y1)];
        let mut last = None;
        for _ in 0..10000 {
            let mut best: Option<(usize, f64, f64, f64, f64)> = None;
            for (i, &(cx, cy, r)) in circles.iter().enumerate() {
                if last == Some(i) {
                    continue;
                }
                let dx = x1 - x2;
                let dy = y1 - y2;
                let len = (dx * dx + dy * dy).sqrt();
                let dot = ((cx - x1) * (x2 - x1) + (cy - y1) * (y2 - y1)) / (len * len);
                let fx = x1 + dot * (x2 - x1);
                let fy = y1 + dot * (y2 - y1);
                let in_rect = fx >= x1.min(x2) && fx <= x1.max(x2) && fy >= y1.min(y2) && fy <= y1.max(y2);
                if !(inside(cx, cy, r, x1, y1) || inside(cx, cy, r, x2, y2) || (inside(cx, cy, r, fx, fy) && in_rect)) {
                    continue;
                }
                let dis = ((fx - cx) * (fx - cx) + (fy - cy) * (fy - cy)).sqrt();
                let travel = (r * r - dis * dis).sqrt();
                let (mut rx, mut ry) = (x1 - fx, y1 - fy);
                let mag = (rx * rx + ry * ry).sqrt() / travel;
                rx /= mag;
                ry /= mag;
                let (px, py) = (rx + fx, ry + fy);
                let (nx, ny) = ((px - cx) / r, (py - cy) / r);
                let (mut ddx, mut ddy) = (x2 - x1, y2 - y1);
                let mag = (ddx * ddx + ddy * ddy).sqrt();
                ddx /= mag;
                ddy /= mag;
                let dot = ddx * nx + ddy * ny;
                let (ox, oy) = (ddx - nx * (2.0 * dot), ddy - ny * (2.0 * dot));
                let distance = (x1 - px) * (x1 - px) + (y1 - py) * (y1 - py);
                let nearer = match best {
                    Some((_, bx, by, _, _)) => distance < (x1 - bx) * (x1 - bx) + (y1 - by) * (y1 - by),
                    None => true,
                };
                if nearer {
                    best = Some((i, px, py, ox, oy));
                }
            }
            let Some((i, px, py, ox, oy)) = best else {
                vertices.push(Vec2::new(x2, y2));
                break;
            };
            if !(px.is_finite() && py.is_finite()) {
                break;
            }
            last = Some(i);
            vertices.push(Vec2::new(px, py));
            x1 = px;
            y1 = py;
            let mag = (ox * ox + oy * oy).sqrt() / 12.0;
            x2 = x1 + ox / mag;
            y2 = y1 + oy / mag;
        }
        vertices
    }

    fn reference_circles() -> Vec<(f64, f64, f64)> {
        let mut circles = vec![(0.0, 0.0, 1.0)];
        for i in 1..7 {
            let t = 2.0 * std::f64::consts::PI * ((i - 1) as f64 / 6.0);
            circles.push((3.0 * t.cos(), 3.0 * t.sin(), 1.0));
        }
        for i in 7..19 {
            let t = 2.0 * std::f64::consts::PI * ((i - 7) as f64 / 12.0);
            circles.push((6.0 * t.cos(), 6.0 * t.sin(), 1.0));
        }
        circles
    }

    #[test]
    fn test_reference_scene_matches_plain_float_circles() {
        let circles: Vec<(f64, f64, f64)> = Scene::reference()
            .circles
            .iter()
            .map(|c| (c.center.x, c.center.y, c.radius))
            .collect();
        assert_eq!(circles, reference_circles());
    }

    #[test]
    fn test_every_frame_reproduces_reference_chain() {
        let scene = Scene::reference();
        let circles = reference_circles();
        let animation = animation();
        for frame in 0..96 {
            let y1 = 7.0 + frame as f64 / 96.0 * 0.0000005;
            let expected = reference_chain(&circles, (7.0, y1), (-3.0, -4.0));
            let path = trace(&scene, animation.ray(frame), animation.params);
            assert_eq!(path.vertices, expected, "frame {}", frame);
        }
    }

    #[test]
    fn test_escape_rays_reproduce_reference_chain() {
        let scene = Scene::reference();
        let circles = reference_circles();
        let (width, height) = (1080u32, 1080u32);
        let map = escape_map(width, height);
        for x in (0..width).step_by(60) {
            for y in (0..height).step_by(60) {
                let rad = ((x as f64 / width as f64) * 36.0 + 210.0) / 180.0 * std::f64::consts::PI;
                let dir = ((y as f64 / height as f64) * 36.0 + 40.0) / 180.0 * std::f64::consts::PI;
                let (x1, y1) = (8.0 * rad.cos(), 8.0 * rad.sin());
                let end = (x1 + 12.0 * dir.cos(), y1 + 12.0 * dir.sin());
                let expected = reference_chain(&circles, (x1, y1), end);

                let ray = map.ray(x, y);
                assert_eq!(ray, Segment::new(Vec2::new(x1, y1), Vec2::new(end.0, end.1)));
                let path = trace(&scene, ray, map.params);
                assert_eq!(path.vertices, expected, "pixel ({}, {})", x, y);
                if let Some(exit) = path.exit() {
                    let from = expected[expected.len() - 2];
                    let to = expected[expected.len() - 1];
                    let heading = (to.y - from.y).atan2(to.x - from.x);
                    let hue = (heading / std::f64::consts::PI * 180.0 + 180.0).trunc();
                    assert_eq!(escape_hue(exit.direction()), hue, "pixel ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_trapped_ray_stays_black() {
        let scene = Scene {
            circles: vec![Circle::new(-5.0, 0.0, 1.0), Circle::new(5.0, 0.0, 1.0)],
        };
        // launch from the origin straight along +x: a closed orbit
        let map = EscapeMap {
            window: Viewport::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 1, 1),
            launch_radius: 0.0,
            reach: 10.0,
            params: BounceParams {
                max_bounces: 50,
                ..BounceParams::default()
            },
        };
        let (image, stats) = map.render(&scene);
        assert_eq!(stats.exhausted, 1);
        assert_eq!(*image.get_pixel(0, 0), BLACK);
    }
}
