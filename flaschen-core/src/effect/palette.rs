//! Colour ramps used by the effects.

use crate::color::Rgb;

/// Number of entries in a brightness palette.
pub const PALETTE_SIZE: usize = 256;

/// Last index of the black → colour ramp.
const MAIN_RAMP_END: usize = 240;

/// `steps` colours from `from` to `to`, both ends included.
///
/// Channels are interpolated linearly and truncated toward zero.
pub fn gradient(from: Rgb, to: Rgb, steps: usize) -> Vec<Rgb> {
    if steps == 0 {
        return Vec::new();
    }
    if steps == 1 {
        return vec![from];
    }
    let span = (steps - 1) as f64;
    let lerp = |a: u8, b: u8, k: f64| (f64::from(a) + (f64::from(b) - f64::from(a)) * k) as u8;
    (0..steps)
        .map(|i| {
            let k = i as f64 / span;
            Rgb::new(
                lerp(from.r, to.r, k),
                lerp(from.g, to.g, k),
                lerp(from.b, to.b, k),
            )
        })
        .collect()
}

/// The 256-entry trail palette for the matrix rain.
///
/// Index 0 is black, 240 is `color`, 241..=254 fade from `color` toward
/// white and 255 is pure white for the head of a drop.
pub fn matrix_palette(color: Rgb) -> Vec<Rgb> {
    let mut palette = Vec::with_capacity(PALETTE_SIZE);
    palette.extend(gradient(Rgb::BLACK, color, MAIN_RAMP_END + 1));
    palette.extend(gradient(color, Rgb::WHITE, PALETTE_SIZE - MAIN_RAMP_END - 2));
    palette.push(Rgb::WHITE);
    palette
}

/// Colour at position `t` (0.0 – 1.0) along a multi-stop gradient.
pub fn sample_stops(stops: &[Rgb], t: f64) -> Rgb {
    match stops {
        [] => Rgb::BLACK,
        [only] => *only,
        _ => {
            let t = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
            let idx = (t.floor() as usize).min(stops.len() - 2);
            let local = t - idx as f64;
            let (a, b) = (stops[idx], stops[idx + 1]);
            let lerp =
                |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * local).round() as u8;
            Rgb::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
        }
    }
}
