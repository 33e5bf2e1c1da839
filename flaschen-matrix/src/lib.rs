//! # flaschen-matrix: matrix rain for LED matrix displays
//!
//! Sends a "digital rain" animation to a Flaschen Taschen style display
//! server over UDP.
//!
//! ## Modes
//!
//! - **Run**: the standalone effect on one layer, for a fixed time or
//!   until Ctrl-C.
//! - **Control**: rain plus a text layer with a welcome screen, custom
//!   text and a clock, driven by console commands.

pub mod config;
pub mod controller;
pub mod runner;
pub mod shutdown;
