//! The addressable pixel grid for one display layer.

use bytes::{BufMut, Bytes, BytesMut};

use crate::color::Rgb;
use crate::error::FlaschenError;
use crate::tiling::{Tile, TilePlan};
use crate::wire;

/// Highest compositing layer the display understands.
pub const MAX_LAYER: u8 = 15;

// ── CanvasOptions ────────────────────────────────────────────────

/// Everything needed to build a [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasOptions {
    pub width: usize,
    pub height: usize,
    /// Compositing layer, `0..=15`. 0 is the background.
    pub layer: u8,
    /// When `true`, black pixels are sent as black and let lower layers
    /// show through. When `false`, black is sent as `(1, 1, 1)`.
    pub transparent: bool,
}

impl CanvasOptions {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            layer: 0,
            transparent: false,
        }
    }

    pub fn layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }
}

// ── Canvas ───────────────────────────────────────────────────────

/// Dense row-major grid of RGB pixels with fixed dimensions.
///
/// Writes outside the grid are dropped without error so callers can
/// draw shapes that run off the edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    layer: u8,
    transparent: bool,
    pixels: Vec<Rgb>,
}

impl Canvas {
    /// Allocate an all-black `width × height` canvas on layer 0.
    pub fn new(width: usize, height: usize) -> Result<Self, FlaschenError> {
        let len = width
            .checked_mul(height)
            .filter(|&len| len > 0)
            .ok_or(FlaschenError::InvalidDimension { width, height })?;
        Ok(Self {
            width,
            height,
            layer: 0,
            transparent: false,
            pixels: vec![Rgb::BLACK; len],
        })
    }

    /// Build a canvas from a full set of options.
    pub fn with_options(options: CanvasOptions) -> Result<Self, FlaschenError> {
        Ok(Self::new(options.width, options.height)?
            .with_layer(options.layer)?
            .with_transparency(options.transparent))
    }

    /// Move the canvas to another compositing layer.
    pub fn with_layer(mut self, layer: u8) -> Result<Self, FlaschenError> {
        if layer > MAX_LAYER {
            return Err(FlaschenError::InvalidLayer(layer));
        }
        self.layer = layer;
        Ok(self)
    }

    pub fn with_transparency(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layer(&self) -> u8 {
        self.layer
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Row-major pixel storage.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    /// Colour that is actually stored for a requested write.
    fn normalize(&self, color: Rgb) -> Rgb {
        if color.is_black() && !self.transparent {
            Rgb::NEAR_BLACK
        } else {
            color
        }
    }

    /// Write one pixel. Out-of-bounds coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        let color = self.normalize(color);
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    /// Row/column addressed variant of [`set_pixel`](Self::set_pixel).
    pub fn set_pixel_ij(&mut self, row: i32, col: i32, color: Rgb) {
        self.set_pixel(col, row, color);
    }

    /// Stored colour at `(x, y)`, or `None` outside the grid.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    /// Reset every pixel to true black.
    pub fn clear(&mut self) {
        self.pixels.fill(Rgb::BLACK);
    }

    /// Paint every pixel, applying the same black substitution as
    /// [`set_pixel`](Self::set_pixel).
    pub fn fill(&mut self, color: Rgb) {
        let color = self.normalize(color);
        self.pixels.fill(color);
    }

    /// How the next flush will split this canvas.
    pub fn tile_plan(&self) -> TilePlan {
        TilePlan::for_canvas(self.width, self.height, self.layer)
    }

    /// Serialize one tile as a wire frame into `dst`.
    pub fn encode_tile_into(&self, tile: &Tile, dst: &mut BytesMut) {
        dst.reserve(wire::frame_len(
            tile.width,
            tile.height,
            tile.x,
            tile.y,
            self.layer,
        ));
        dst.put_slice(wire::header(tile.width, tile.height).as_bytes());
        for y in tile.y..tile.y + tile.height {
            let row = y * self.width;
            for px in &self.pixels[row + tile.x..row + tile.x + tile.width] {
                dst.put_slice(&px.to_bytes());
            }
        }
        dst.put_slice(wire::footer(tile.x, tile.y, self.layer).as_bytes());
    }

    /// Every datagram a flush of the current contents would send, in
    /// row-major tile order.
    pub fn encode_frames(&self) -> Vec<Bytes> {
        let mut buf = BytesMut::new();
        self.tile_plan()
            .tiles()
            .map(|tile| {
                self.encode_tile_into(&tile, &mut buf);
                buf.split().freeze()
            })
            .collect()
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{MAX_PACKET, WireFrame};

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            Canvas::new(0, 10),
            Err(FlaschenError::InvalidDimension { width: 0, height: 10 })
        ));
        assert!(Canvas::new(10, 0).is_err());
    }

    #[test]
    fn rejects_overflowing_dimensions() {
        assert!(matches!(
            Canvas::new(usize::MAX, 2),
            Err(FlaschenError::InvalidDimension { width: usize::MAX, height: 2 })
        ));
    }

    #[test]
    fn rejects_layer_above_fifteen() {
        let canvas = Canvas::new(4, 4).unwrap();
        assert!(matches!(
            canvas.clone().with_layer(16),
            Err(FlaschenError::InvalidLayer(16))
        ));
        assert_eq!(canvas.with_layer(15).unwrap().layer(), 15);
    }

    #[test]
    fn black_is_substituted_unless_transparent() {
        let mut opaque = Canvas::new(2, 2).unwrap();
        opaque.set_pixel(0, 0, Rgb::BLACK);
        assert_eq!(opaque.pixel(0, 0), Some(Rgb::NEAR_BLACK));

        let mut clear = Canvas::new(2, 2).unwrap().with_transparency(true);
        clear.set_pixel(0, 0, Rgb::new(0, 0, 0));
        assert_eq!(clear.pixel(0, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn out_of_bounds_writes_leave_grid_untouched() {
        let mut canvas = Canvas::new(5, 3).unwrap();
        canvas.set_pixel(1, 1, Rgb::new(9, 9, 9));
        let before = canvas.clone();

        for (x, y) in [(-1, 0), (0, -1), (5, 0), (0, 3), (i32::MAX, i32::MIN)] {
            canvas.set_pixel(x, y, Rgb::new(200, 100, 50));
        }
        assert_eq!(canvas, before);
        assert_eq!(canvas.pixel(5, 0), None);
    }

    #[test]
    fn clear_stores_true_black_even_when_opaque() {
        let mut canvas = Canvas::new(3, 3).unwrap();
        canvas.fill(Rgb::new(10, 20, 30));
        canvas.clear();
        assert!(canvas.pixels().iter().all(|p| *p == Rgb::BLACK));
    }

    #[test]
    fn clear_on_transparent_canvas_is_see_through() {
        let mut canvas = Canvas::new(3, 3).unwrap().with_transparency(true);
        canvas.fill(Rgb::new(10, 20, 30));
        canvas.set_pixel(1, 1, Rgb::WHITE);
        canvas.clear();
        assert!(canvas.pixels().iter().all(|p| p.to_bytes() == [0, 0, 0]));

        let frame = WireFrame::decode(&canvas.encode_frames()[0]).unwrap();
        assert_eq!(frame.pixel(1, 1), Some([0, 0, 0]));
    }

    #[test]
    fn fill_applies_substitution() {
        let mut canvas = Canvas::new(3, 3).unwrap();
        canvas.fill(Rgb::BLACK);
        assert!(canvas.pixels().iter().all(|p| *p == Rgb::NEAR_BLACK));
    }

    #[test]
    fn ij_addressing_swaps_axes() {
        let mut canvas = Canvas::new(4, 2).unwrap();
        canvas.set_pixel_ij(1, 3, Rgb::new(1, 2, 3));
        assert_eq!(canvas.pixel(3, 1), Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn default_matrix_canvas_is_one_frame() {
        let mut canvas = Canvas::new(45, 35).unwrap().with_layer(2).unwrap();
        canvas.set_pixel(44, 34, Rgb::new(0, 255, 0));

        let frames = canvas.encode_frames();
        assert_eq!(frames.len(), 1);
        let bytes = &frames[0];
        assert!(bytes.starts_with(b"P6\n45 35\n255\n"));
        assert!(bytes.ends_with(b"0\n0\n2\n"));
        assert_eq!(bytes.len(), 13 + 45 * 35 * 3 + 6);

        let decoded = WireFrame::decode(bytes).unwrap();
        assert_eq!(decoded.pixel(44, 34), Some([0, 255, 0]));
        assert_eq!(decoded.pixel(0, 0), Some([0, 0, 0]));
    }

    #[test]
    fn tiled_frames_carry_their_region() {
        let mut canvas = Canvas::new(192, 128).unwrap().with_layer(1).unwrap();
        canvas.set_pixel(180, 100, Rgb::new(7, 8, 9));

        let frames = canvas.encode_frames();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.len() <= MAX_PACKET));

        let second = WireFrame::decode(&frames[1]).unwrap();
        assert_eq!((second.x_offset, second.y_offset), (170, 0));
        assert_eq!((second.width, second.height), (22, 128));
        assert_eq!(second.layer, 1);
        assert_eq!(second.pixel(10, 100), Some([7, 8, 9]));
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut canvas = Canvas::new(300, 200).unwrap();
        canvas.set_pixel(123, 45, Rgb::new(1, 2, 3));
        assert_eq!(canvas.encode_frames(), canvas.encode_frames());
    }
}
