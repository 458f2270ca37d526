use std::f64::consts::PI;

use image::Rgb;

use super::math::Vec2;

/// Six-sector HSV to RGB. `hue` in degrees, `saturation` and `value` in [0, 1];
/// hues of 360 or more wrap to 0.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> [f64; 3] {
    if saturation <= 0.0 {
        return [value, value, value];
    }
    let hue = if hue >= 360.0 { 0.0 } else { hue } / 60.0;
    let sector = hue as i64;
    let fraction = hue - sector as f64;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * fraction);
    let t = value * (1.0 - saturation * (1.0 - fraction));

    match sector {
        0 => [value, t, p],
        1 => [q, value, p],
        2 => [p, value, t],
        3 => [p, q, value],
        4 => [t, p, value],
        _ => [value, p, q],
    }
}

/// Whole degrees in [0, 360] of a direction, measured from -x.
pub fn escape_hue(direction: Vec2) -> f64 {
    // divide by pi first: `to_degrees` multiplies by 180/pi and rounds differently
    (direction.angle() / PI * 180.0 + 180.0).trunc()
}

pub fn to_rgb8(color: [f64; 3]) -> Rgb<u8> {
    Rgb(color.map(|c| (c * 255.0) as u8))
}

/// Fully saturated color for the heading of an escaped ray.
pub fn escape_color(direction: Vec2) -> Rgb<u8> {
    to_rgb8(hsv_to_rgb(escape_hue(direction), 1.0, 1.0))
}
