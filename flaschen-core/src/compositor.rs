//! Receiver-side framebuffer that reassembles tiles and blends layers.
//!
//! Each incoming [`WireFrame`] overwrites the rectangle it names on its
//! layer, so tiles may arrive in any order or not at all. Flattening
//! picks, per pixel, the highest layer whose pixel is not pure black;
//! layer 0 is the background and always shows through.

use crate::canvas::MAX_LAYER;
use crate::color::Rgb;
use crate::error::FlaschenError;
use crate::wire::{BYTES_PER_PIXEL, WireFrame};

const LAYERS: usize = MAX_LAYER as usize + 1;

/// A layered `width × height` display buffer.
#[derive(Debug, Clone)]
pub struct Compositor {
    width: usize,
    height: usize,
    layers: Vec<Vec<Rgb>>,
}

impl Compositor {
    pub fn new(width: usize, height: usize) -> Result<Self, FlaschenError> {
        let len = width
            .checked_mul(height)
            .filter(|&len| len > 0)
            .ok_or(FlaschenError::InvalidDimension { width, height })?;
        Ok(Self {
            width,
            height,
            layers: vec![vec![Rgb::BLACK; len]; LAYERS],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Write a frame into its layer. Anything outside the display is clipped.
    pub fn apply(&mut self, frame: &WireFrame) -> Result<(), FlaschenError> {
        let layer = usize::from(frame.layer);
        if layer >= LAYERS {
            return Err(FlaschenError::InvalidLayer(frame.layer));
        }
        if frame.pixels.len() != frame.width * frame.height * BYTES_PER_PIXEL {
            return Err(FlaschenError::Decode("pixel payload does not match dimensions"));
        }

        let buffer = &mut self.layers[layer];
        let rows = (frame.y_offset..self.height).take(frame.height);
        for (src_y, y) in rows.enumerate() {
            let cols = (frame.x_offset..self.width).take(frame.width);
            for (src_x, x) in cols.enumerate() {
                let src = (src_y * frame.width + src_x) * BYTES_PER_PIXEL;
                let px = &frame.pixels[src..src + BYTES_PER_PIXEL];
                buffer[y * self.width + x] = Rgb::new(px[0], px[1], px[2]);
            }
        }
        Ok(())
    }

    /// Raw contents of one layer, row-major.
    pub fn layer(&self, layer: u8) -> Option<&[Rgb]> {
        self.layers.get(usize::from(layer)).map(Vec::as_slice)
    }

    /// The pixel a viewer would see at `(x, y)`.
    pub fn visible_pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.width + x;
        let top = self.layers[1..]
            .iter()
            .rev()
            .map(|layer| layer[idx])
            .find(|px| !px.is_black());
        Some(top.unwrap_or(self.layers[0][idx]))
    }

    /// Flatten all layers into one image.
    pub fn composite(&self) -> Vec<Rgb> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter_map(|(x, y)| self.visible_pixel(x, y))
            .collect()
    }

    /// Reset every layer to black.
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.fill(Rgb::BLACK);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, x: usize, y: usize, layer: u8, rgb: [u8; 3]) -> WireFrame {
        WireFrame {
            width,
            height,
            x_offset: x,
            y_offset: y,
            layer,
            pixels: rgb.repeat(width * height),
        }
    }

    #[test]
    fn rejects_zero_or_overflowing_dimensions() {
        assert!(Compositor::new(0, 4).is_err());
        assert!(matches!(
            Compositor::new(2, usize::MAX),
            Err(FlaschenError::InvalidDimension { width: 2, height: usize::MAX })
        ));
    }

    #[test]
    fn tile_lands_at_its_offset() {
        let mut comp = Compositor::new(4, 4).unwrap();
        comp.apply(&solid(2, 2, 2, 2, 0, [5, 5, 5])).unwrap();

        assert_eq!(comp.visible_pixel(1, 1), Some(Rgb::BLACK));
        assert_eq!(comp.visible_pixel(2, 2), Some(Rgb::new(5, 5, 5)));
        assert_eq!(comp.visible_pixel(3, 3), Some(Rgb::new(5, 5, 5)));
    }

    #[test]
    fn overhanging_tile_is_clipped() {
        let mut comp = Compositor::new(3, 3).unwrap();
        comp.apply(&solid(4, 4, 2, 2, 1, [9, 9, 9])).unwrap();
        assert_eq!(comp.visible_pixel(2, 2), Some(Rgb::new(9, 9, 9)));
        assert_eq!(comp.layer(1).unwrap().iter().filter(|p| !p.is_black()).count(), 1);
    }

    #[test]
    fn black_on_upper_layer_is_see_through() {
        let mut comp = Compositor::new(2, 1).unwrap();
        comp.apply(&solid(2, 1, 0, 0, 0, [0, 0, 200])).unwrap();

        let mut top = solid(2, 1, 0, 0, 3, [0, 0, 0]);
        top.pixels[3..6].copy_from_slice(&[1, 1, 1]);
        comp.apply(&top).unwrap();

        assert_eq!(comp.composite(), vec![Rgb::new(0, 0, 200), Rgb::NEAR_BLACK]);
    }

    #[test]
    fn higher_layer_wins() {
        let mut comp = Compositor::new(1, 1).unwrap();
        comp.apply(&solid(1, 1, 0, 0, 2, [0, 255, 0])).unwrap();
        comp.apply(&solid(1, 1, 0, 0, 1, [255, 0, 0])).unwrap();
        assert_eq!(comp.visible_pixel(0, 0), Some(Rgb::new(0, 255, 0)));

        comp.clear();
        assert_eq!(comp.visible_pixel(0, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn rejects_inconsistent_frames() {
        let mut comp = Compositor::new(2, 2).unwrap();
        let mut frame = solid(1, 1, 0, 0, 0, [1, 2, 3]);
        frame.pixels.pop();
        assert!(comp.apply(&frame).is_err());
        assert!(comp.apply(&solid(1, 1, 0, 0, 16, [1, 2, 3])).is_err());
    }
}
