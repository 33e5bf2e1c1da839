//! Splitting a canvas into datagram-sized tiles.
//!
//! When the whole canvas fits in one datagram the plan is a single tile
//! at `(0, 0)`. Otherwise the canvas is cut into a grid of near-square
//! tiles, each small enough that its wire frame fits in [`MAX_PACKET`].
//!
//! The near-square shape keeps the datagram count low compared to thin
//! strips. It is a heuristic and makes no claim to be the packing with
//! the fewest datagrams.

use std::cmp;

use crate::wire::{self, BYTES_PER_PIXEL, MAX_PACKET};

// ── Tile ─────────────────────────────────────────────────────────

/// A rectangular region of the canvas sent as one wire frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Left edge in pixels.
    pub x: usize,
    /// Top edge in pixels.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Tile {
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

// ── TilePlan ─────────────────────────────────────────────────────

/// The tile grid used by one flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePlan {
    canvas_width: usize,
    canvas_height: usize,
    tile_width: usize,
    tile_height: usize,
}

impl TilePlan {
    /// Plan for a canvas using the standard UDP ceiling.
    pub fn for_canvas(width: usize, height: usize, layer: u8) -> Self {
        Self::with_limit(width, height, layer, MAX_PACKET)
    }

    /// Plan for a canvas against an arbitrary datagram limit.
    ///
    /// Dimensions must be non-zero; the canvas guarantees that.
    pub fn with_limit(width: usize, height: usize, layer: u8, max_packet: usize) -> Self {
        let whole = Self {
            canvas_width: width,
            canvas_height: height,
            tile_width: width,
            tile_height: height,
        };
        if wire::frame_len(width, height, 0, 0, layer) <= max_packet {
            return whole;
        }

        // Budget against the widest header and footer any tile can carry:
        // tile dimensions never exceed the canvas, offsets never exceed W-1/H-1.
        let overhead = wire::header(width, height).len()
            + wire::footer(width - 1, height - 1, layer).len();
        let pixel_budget = cmp::max(1, max_packet.saturating_sub(overhead) / BYTES_PER_PIXEL);

        let mut tile_height = cmp::min(height, pixel_budget.isqrt());
        let mut tile_width = if tile_height == 0 {
            0
        } else {
            cmp::min(width, pixel_budget / tile_height)
        };

        // A one-pixel column always fits.
        if tile_width < 1 {
            tile_width = 1;
            tile_height = cmp::min(height, pixel_budget);
        }

        Self {
            tile_width,
            tile_height,
            ..whole
        }
    }

    /// Whether the canvas has to be split at all.
    pub fn is_tiled(&self) -> bool {
        self.tile_width < self.canvas_width || self.tile_height < self.canvas_height
    }

    /// Horizontal stride between tile origins.
    pub fn tile_width(&self) -> usize {
        self.tile_width
    }

    /// Vertical stride between tile origins.
    pub fn tile_height(&self) -> usize {
        self.tile_height
    }

    /// Number of tiles the plan produces.
    pub fn len(&self) -> usize {
        self.canvas_width.div_ceil(self.tile_width) * self.canvas_height.div_ceil(self.tile_height)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tiles in row-major order; edge tiles are clipped to the canvas.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.canvas_height)
            .step_by(self.tile_height)
            .flat_map(move |y| {
                (0..self.canvas_width)
                    .step_by(self.tile_width)
                    .map(move |x| Tile {
                        x,
                        y,
                        width: cmp::min(self.tile_width, self.canvas_width - x),
                        height: cmp::min(self.tile_height, self.canvas_height - y),
                    })
            })
    }
}

// ── Tests ────────────────────────────────────────────────────────
