//! Visual effects that draw into a [`Canvas`](crate::canvas::Canvas).
//!
//! | Module    | Purpose                                     |
//! |-----------|---------------------------------------------|
//! | `palette` | Colour ramps and multi-stop gradients       |
//! | `matrix`  | Falling "digital rain" simulation           |
//! | `text`    | Centred text in a 5×7 bitmap font           |

pub mod matrix;
pub mod palette;
pub mod text;

pub use matrix::{DEFAULT_DENSITY, MatrixRain};
pub use text::TextOverlay;
