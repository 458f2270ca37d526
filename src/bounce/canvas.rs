use std::f64::consts::PI;

use image::{Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Samples per pixel of line length.
const LINE_DENSITY: f64 = 1.1;
/// Samples per pixel of circumference.
const CIRCLE_DENSITY: f64 = 1.5;

/// Something that can be drawn on in pixel coordinates. Writes falling
/// outside the surface are dropped.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn put(&mut self, x: u32, y: u32, color: Rgb<u8>);

    fn set_pixel(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        self.put(x as u32, y as u32, color);
    }

    /// Point samples along the segment; the end point itself is not drawn.
    fn draw_line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, color: Rgb<u8>) {
        let dx = x2 as f64 - x1 as f64;
        let dy = y2 as f64 - y1 as f64;
        let samples = (LINE_DENSITY * (dx * dx + dy * dy).sqrt()) as i64;
        for i in 0..samples {
            let t = i as f64 / samples as f64;
            let px = (t * dx + x1 as f64) as i64;
            let py = (t * dy + y1 as f64) as i64;
            self.set_pixel(px, py, color);
        }
    }

    fn draw_circle_outline(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
        let samples = (CIRCLE_DENSITY * 2.0 * PI * radius as f64) as i64;
        for i in 0..samples {
            let t = i as f64 / samples as f64 * 2.0 * PI;
            let px = (cx as f64 + radius as f64 * t.cos()) as i64;
            let py = (cy as f64 + radius as f64 * t.sin()) as i64;
            self.set_pixel(px, py, color);
        }
    }
}

impl Surface for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn put(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        self.put_pixel(x, y, color);
    }
}
