//! "Digital rain": bright-headed drops falling down the canvas, each
//! leaving a fading trail.

use std::sync::Arc;

use rand::Rng;

use crate::canvas::Canvas;
use crate::color::{ColorSelection, Rgb};
use crate::effect::palette::{self, PALETTE_SIZE};

// ── Tuning ───────────────────────────────────────────────────────

/// Drops are considered for spawning every this many frames.
const SPAWN_INTERVAL: u32 = 4;
const SPAWN_CHANCE: f64 = 0.5;
/// Extra spawn chance on displays wider than [`WIDE_DISPLAY`].
const SECOND_SPAWN_CHANCE: f64 = 0.3;
const WIDE_DISPLAY: usize = 100;
const MIN_TRAIL: i32 = 15;
const MAX_TRAIL: i32 = 35;
/// Brightness lost per trail cell behind the head.
const FADE_STEP: i32 = 8;
const FRAME_WRAP: u32 = 10_000;
/// Gradient selections cycle through this many evenly spaced colours.
const GRADIENT_CYCLE: usize = 16;

/// Default drop density: one in six.
pub const DEFAULT_DENSITY: f64 = 1.0 / 6.0;

// ── Raindrop ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Raindrop {
    x: i32,
    /// Row of the head. Starts at 0 and moves one row per frame.
    y: i32,
    length: i32,
    palette: Arc<Vec<Rgb>>,
}

impl Raindrop {
    /// Advance one row; `false` once the whole trail has left the canvas.
    fn update(&mut self, height: i32) -> bool {
        self.y += 1;
        self.y - self.length <= height
    }

    fn draw(&self, canvas: &mut Canvas) {
        for i in 0..self.length {
            let brightness = (PALETTE_SIZE as i32 - 1 - i * FADE_STEP).max(0) as usize;
            canvas.set_pixel(self.x, self.y - i, self.palette[brightness]);
        }
    }
}

// ── MatrixRain ───────────────────────────────────────────────────

/// The rain simulation. Call [`step`](Self::step) once per frame.
#[derive(Debug, Clone)]
pub struct MatrixRain {
    width: usize,
    height: usize,
    color: ColorSelection,
    /// Shared palette for `Fixed` selections.
    fixed_palette: Arc<Vec<Rgb>>,
    drops: Vec<Raindrop>,
    max_drops: usize,
    frame: u32,
    spawned: usize,
}

impl MatrixRain {
    pub fn new(width: usize, height: usize, color: ColorSelection, density: f64) -> Self {
        let max_drops = ((width * height) as f64 * density.clamp(0.0, 1.0) / 20.0) as usize;
        let fixed_palette = Arc::new(palette::matrix_palette(color.overlay_color()));
        Self {
            width,
            height,
            color,
            fixed_palette,
            drops: Vec::new(),
            max_drops: max_drops.max(1),
            frame: 0,
            spawned: 0,
        }
    }

    /// Change the colour of drops spawned from now on. Drops already
    /// falling keep their colour.
    pub fn set_color(&mut self, color: ColorSelection) {
        self.fixed_palette = Arc::new(palette::matrix_palette(color.overlay_color()));
        self.color = color;
    }

    pub fn color(&self) -> &ColorSelection {
        &self.color
    }

    pub fn active_drops(&self) -> usize {
        self.drops.len()
    }

    pub fn max_drops(&self) -> usize {
        self.max_drops
    }

    /// Frame counter; wraps at 10 000.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Forget every drop.
    pub fn reset(&mut self) {
        self.drops.clear();
        self.frame = 0;
    }

    /// Clear `canvas` and draw the next frame into it.
    pub fn step<R: Rng + ?Sized>(&mut self, canvas: &mut Canvas, rng: &mut R) {
        canvas.clear();

        if self.frame % SPAWN_INTERVAL == 0 {
            if rng.gen_bool(SPAWN_CHANCE) {
                self.spawn(rng);
            }
            if self.width > WIDE_DISPLAY && rng.gen_bool(SECOND_SPAWN_CHANCE) {
                self.spawn(rng);
            }
        }

        let height = self.height as i32;
        self.drops.retain_mut(|drop| {
            let alive = drop.update(height);
            if alive {
                drop.draw(canvas);
            }
            alive
        });

        self.frame += 1;
        if self.frame >= FRAME_WRAP {
            self.frame = 0;
        }
    }

    fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.drops.len() >= self.max_drops {
            return;
        }
        let palette = self.palette_for_new_drop(rng);
        self.drops.push(Raindrop {
            x: rng.gen_range(0..self.width) as i32,
            y: 0,
            length: rng.gen_range(MIN_TRAIL..=MAX_TRAIL),
            palette,
        });
        self.spawned += 1;
    }

    fn palette_for_new_drop<R: Rng + ?Sized>(&self, rng: &mut R) -> Arc<Vec<Rgb>> {
        match &self.color {
            ColorSelection::Fixed(_) => Arc::clone(&self.fixed_palette),
            ColorSelection::RandomPerInstance => {
                let color = Rgb::new(rng.r#gen(), rng.r#gen(), rng.r#gen());
                Arc::new(palette::matrix_palette(color))
            }
            ColorSelection::PaletteGradient(stops) => {
                let t = (self.spawned % GRADIENT_CYCLE) as f64 / (GRADIENT_CYCLE - 1) as f64;
                Arc::new(palette::matrix_palette(palette::sample_stops(stops, t)))
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
