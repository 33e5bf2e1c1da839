//! # flaschen-core
//!
//! Driver library for low-resolution RGB LED matrix displays that accept
//! PPM images over UDP (the Flaschen Taschen protocol).
//!
//! This crate contains:
//! - **Canvas**: `Canvas`, the bounds-checked pixel grid for one layer
//! - **Wire**: `WireFrame`, the PPM + offset/layer footer datagram format
//! - **Tiling**: `TilePlan`, splitting frames larger than one UDP datagram
//! - **Transport**: `DatagramSink`, `UdpTransport`, `FrameReceiver`
//! - **Encoder**: `FrameEncoder`, canvas + transport with `flush()`
//! - **Compositor**: receiver-side tile reassembly and layer blending
//! - **Effects**: matrix rain, palettes and a 5×7 text overlay
//! - **Session**: animation state machine, persisted settings, change feed
//! - **Error**: `FlaschenError`, a `thiserror`-based error type

pub mod canvas;
pub mod color;
pub mod compositor;
pub mod effect;
pub mod encoder;
pub mod error;
pub mod session;
pub mod tiling;
pub mod transport;
pub mod wire;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use canvas::{Canvas, CanvasOptions, MAX_LAYER};
pub use color::{ColorSelection, Rgb};
pub use compositor::Compositor;
pub use effect::{MatrixRain, TextOverlay};
pub use encoder::FrameEncoder;
pub use error::FlaschenError;
pub use session::{AnimationState, ControlCommand, Session, SessionSnapshot, Settings, SettingsStore};
pub use tiling::{Tile, TilePlan};
pub use transport::{DatagramSink, FrameReceiver, UdpTransport};
pub use wire::{MAX_PACKET, WireFrame};
