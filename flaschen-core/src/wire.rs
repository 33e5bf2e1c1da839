//! The wire frame: a binary PPM (`P6`) image followed by a text footer
//! carrying the tile offset and compositing layer.
//!
//! ## Wire format
//!
//! ```text
//! "P6\n"
//! "<width> <height>\n"
//! "255\n"
//! <width * height * 3 bytes, row-major RGB>
//! "<x_offset>\n"
//! "<y_offset>\n"
//! "<layer>\n"
//! ```
//!
//! One wire frame travels in exactly one UDP datagram.

use bytes::{BufMut, BytesMut};

use crate::error::FlaschenError;

// ── Constants ────────────────────────────────────────────────────

/// Largest UDP payload that is safe over IPv4 (65535 − 8 − 20).
pub const MAX_PACKET: usize = 65507;

/// Maximum channel value token in the PPM header.
pub const MAX_CHANNEL_VALUE: u16 = 255;

/// Bytes per pixel on the wire.
pub const BYTES_PER_PIXEL: usize = 3;

const MAGIC: &[u8] = b"P6";

/// PPM header announcing a `width × height` image.
pub fn header(width: usize, height: usize) -> String {
    format!("P6\n{width} {height}\n{MAX_CHANNEL_VALUE}\n")
}

/// Footer placing the image at `(x, y)` on `layer`.
pub fn footer(x: usize, y: usize, layer: u8) -> String {
    format!("{x}\n{y}\n{layer}\n")
}

/// Total datagram size for a `width × height` tile at `(x, y)`.
pub fn frame_len(width: usize, height: usize, x: usize, y: usize, layer: u8) -> usize {
    header(width, height).len() + width * height * BYTES_PER_PIXEL + footer(x, y, layer).len()
}

// ── WireFrame ────────────────────────────────────────────────────

/// A decoded (or to-be-encoded) wire frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame {
    pub width: usize,
    pub height: usize,
    pub x_offset: usize,
    pub y_offset: usize,
    pub layer: u8,
    /// Row-major RGB, `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

impl WireFrame {
    /// Encoded size on the wire.
    pub fn encoded_len(&self) -> usize {
        frame_len(
            self.width,
            self.height,
            self.x_offset,
            self.y_offset,
            self.layer,
        )
    }

    /// Serialize into `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        dst.put_slice(header(self.width, self.height).as_bytes());
        dst.put_slice(&self.pixels);
        dst.put_slice(footer(self.x_offset, self.y_offset, self.layer).as_bytes());
    }

    /// Serialize into a fresh buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.to_vec()
    }

    /// Parse one datagram.
    ///
    /// A datagram without a footer is accepted and placed at `(0, 0)`
    /// on layer 0, which is what a plain PPM sent to the display means.
    pub fn decode(data: &[u8]) -> Result<Self, FlaschenError> {
        let mut cursor = Cursor { data, pos: 0 };

        if cursor.token()? != MAGIC {
            return Err(FlaschenError::Decode("missing P6 magic"));
        }
        let width = cursor.number()?;
        let height = cursor.number()?;
        if width == 0 || height == 0 {
            return Err(FlaschenError::Decode("zero image dimension"));
        }
        if cursor.number()? != MAX_CHANNEL_VALUE as usize {
            return Err(FlaschenError::Decode("unsupported max channel value"));
        }
        // Exactly one whitespace byte separates the header from the raster.
        cursor.pos += 1;

        let payload_len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(FlaschenError::Decode("image dimensions overflow"))?;
        let end = cursor
            .pos
            .checked_add(payload_len)
            .filter(|end| *end <= data.len())
            .ok_or(FlaschenError::Decode("truncated pixel payload"))?;
        let pixels = data[cursor.pos..end].to_vec();
        cursor.pos = end;

        let (x_offset, y_offset, layer) = if cursor.at_end() {
            (0, 0, 0)
        } else {
            let x = cursor.number()?;
            let y = cursor.number()?;
            let layer = u8::try_from(cursor.number()?)
                .map_err(|_| FlaschenError::Decode("layer out of range"))?;
            (x, y, layer)
        };

        Ok(Self {
            width,
            height,
            x_offset,
            y_offset,
            layer,
            pixels,
        })
    }

    /// RGB triple at `(x, y)` within this frame.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * BYTES_PER_PIXEL;
        let mut rgb = [0u8; 3];
        rgb.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(rgb)
    }
}

// ── Text-token cursor ────────────────────────────────────────────

/// Whitespace-separated token reader over the ASCII parts of a frame.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn skip_whitespace(&mut self) {
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.data.len()
    }

    fn token(&mut self) -> Result<&'a [u8], FlaschenError> {
        self.skip_whitespace();
        let start = self.pos;
        while self.pos < self.data.len() && !self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(FlaschenError::Decode("unexpected end of frame"));
        }
        let data = self.data;
        Ok(&data[start..self.pos])
    }

    fn number(&mut self) -> Result<usize, FlaschenError> {
        let token = self.token()?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(FlaschenError::Decode("expected a decimal number"))
    }
}

// ── Tests ────────────────────────────────────────────────────────
