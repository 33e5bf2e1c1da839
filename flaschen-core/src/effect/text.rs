//! Centred multi-line text in a 5×7 bitmap font.

use crate::canvas::Canvas;
use crate::color::Rgb;

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: i32 = 7;
/// Horizontal advance per character, one blank column included.
const CHAR_ADVANCE: i32 = 6;
/// Vertical distance between the tops of consecutive lines.
const LINE_PITCH: i32 = 10;

/// Column bitmaps, left to right. Bit 6 is the top row.
fn glyph(c: char) -> Option<[u8; GLYPH_WIDTH]> {
    let columns = match c {
        'A' => [0x3E, 0x51, 0x51, 0x3E, 0x00],
        'B' => [0x7F, 0x49, 0x49, 0x36, 0x00],
        'C' => [0x3E, 0x41, 0x41, 0x22, 0x00],
        'D' => [0x7F, 0x41, 0x41, 0x3E, 0x00],
        'E' => [0x7F, 0x49, 0x49, 0x41, 0x00],
        'F' => [0x7F, 0x48, 0x48, 0x40, 0x00],
        'G' => [0x3E, 0x41, 0x49, 0x2F, 0x00],
        'H' => [0x7F, 0x08, 0x08, 0x7F, 0x00],
        'I' => [0x41, 0x7F, 0x41, 0x00, 0x00],
        'J' => [0x06, 0x01, 0x01, 0x7E, 0x00],
        'K' => [0x7F, 0x08, 0x14, 0x63, 0x00],
        'L' => [0x7F, 0x01, 0x01, 0x01, 0x00],
        'M' => [0x7F, 0x20, 0x10, 0x20, 0x7F],
        'N' => [0x7F, 0x10, 0x08, 0x04, 0x7F],
        'O' => [0x3E, 0x41, 0x41, 0x3E, 0x00],
        'P' => [0x7F, 0x48, 0x48, 0x30, 0x00],
        'Q' => [0x3E, 0x41, 0x45, 0x3F, 0x00],
        'R' => [0x7F, 0x48, 0x4C, 0x33, 0x00],
        'S' => [0x32, 0x49, 0x49, 0x26, 0x00],
        'T' => [0x40, 0x40, 0x7F, 0x40, 0x40],
        'U' => [0x7E, 0x01, 0x01, 0x7E, 0x00],
        'V' => [0x7C, 0x02, 0x01, 0x02, 0x7C],
        'W' => [0x7F, 0x02, 0x04, 0x02, 0x7F],
        'X' => [0x63, 0x14, 0x08, 0x14, 0x63],
        'Y' => [0x70, 0x08, 0x07, 0x08, 0x70],
        'Z' => [0x43, 0x45, 0x49, 0x51, 0x61],
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00],
        '.' => [0x01, 0x01, 0x00, 0x00, 0x00],
        ',' => [0x01, 0x02, 0x00, 0x00, 0x00],
        ':' => [0x14, 0x14, 0x00, 0x00, 0x00],
        '!' => [0x7D, 0x00, 0x00, 0x00, 0x00],
        '?' => [0x20, 0x40, 0x45, 0x38, 0x00],
        '(' => [0x3E, 0x41, 0x00, 0x00, 0x00],
        ')' => [0x41, 0x3E, 0x00, 0x00, 0x00],
        '+' => [0x08, 0x08, 0x3E, 0x08, 0x08],
        '-' => [0x08, 0x08, 0x08, 0x08, 0x00],
        '/' => [0x01, 0x02, 0x04, 0x08, 0x10],
        '\\' => [0x10, 0x08, 0x04, 0x02, 0x01],
        '0' => [0x3E, 0x45, 0x49, 0x51, 0x3E],
        '1' => [0x00, 0x21, 0x7F, 0x01, 0x00],
        '2' => [0x21, 0x43, 0x45, 0x49, 0x31],
        '3' => [0x22, 0x41, 0x49, 0x49, 0x36],
        '4' => [0x0C, 0x14, 0x24, 0x7F, 0x04],
        '5' => [0x72, 0x51, 0x51, 0x51, 0x4E],
        '6' => [0x1E, 0x29, 0x49, 0x49, 0x06],
        '7' => [0x40, 0x40, 0x47, 0x58, 0x60],
        '8' => [0x36, 0x49, 0x49, 0x49, 0x36],
        '9' => [0x30, 0x49, 0x49, 0x4A, 0x3C],
        _ => return None,
    };
    Some(columns)
}

/// Whether the font can draw `c` (after upper-casing).
pub fn is_drawable(c: char) -> bool {
    glyph(c.to_ascii_uppercase()).is_some()
}

/// Draws text centred on a canvas.
#[derive(Debug, Clone, Copy)]
pub struct TextOverlay {
    pub color: Rgb,
}

impl TextOverlay {
    pub fn new(color: Rgb) -> Self {
        Self { color }
    }

    /// Draw `text` centred on `canvas`, one line per `\n`.
    ///
    /// Letters are upper-cased. Characters without a glyph take up space
    /// but draw nothing. Lines wider than the canvas are clipped.
    pub fn draw(&self, canvas: &mut Canvas, text: &str) {
        let lines: Vec<&str> = text.split('\n').collect();
        let count = lines.len() as i32;
        let block_height = count * GLYPH_HEIGHT + (count - 1) * (LINE_PITCH - GLYPH_HEIGHT);
        let top = (canvas.height() as i32 - block_height).div_euclid(2);

        for (i, line) in lines.iter().enumerate() {
            let line = line.to_uppercase();
            let width = line.chars().count() as i32 * CHAR_ADVANCE;
            let mut x = (canvas.width() as i32 - width).div_euclid(2);
            let y = top + i as i32 * LINE_PITCH;

            for c in line.chars() {
                if let Some(columns) = glyph(c) {
                    self.draw_glyph(canvas, &columns, x, y);
                }
                x += CHAR_ADVANCE;
            }
        }
    }

    fn draw_glyph(&self, canvas: &mut Canvas, columns: &[u8; GLYPH_WIDTH], x: i32, y: i32) {
        for (col, bits) in columns.iter().enumerate() {
            for row in 0..GLYPH_HEIGHT {
                if bits & (1 << (GLYPH_HEIGHT - 1 - row)) != 0 {
                    canvas.set_pixel(x + col as i32, y + row, self.color);
                }
            }
        }
    }
}
