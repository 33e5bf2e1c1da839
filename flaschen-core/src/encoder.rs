//! Canvas + transport: the object effects draw into and flush.
//!
//! ```no_run
//! # use flaschen_core::{CanvasOptions, FrameEncoder, Rgb};
//! # async fn example() -> Result<(), flaschen_core::FlaschenError> {
//! let mut ft = FrameEncoder::connect("localhost", 1337, CanvasOptions::new(45, 35).layer(2)).await?;
//! ft.set_pixel(10, 10, Rgb::new(0, 255, 0));
//! ft.flush().await?;
//! # Ok(())
//! # }
//! ```

use bytes::BytesMut;
use tracing::trace;

use crate::canvas::{Canvas, CanvasOptions};
use crate::color::Rgb;
use crate::error::FlaschenError;
use crate::transport::{DatagramSink, UdpTransport};

// ── FrameEncoder ─────────────────────────────────────────────────

/// Owns one canvas and one datagram sink.
///
/// Not synchronised: concurrent producers must serialise access to an
/// encoder themselves, or use one encoder per layer.
pub struct FrameEncoder<S: DatagramSink = UdpTransport> {
    canvas: Canvas,
    sink: S,
    /// Reused across flushes to avoid reallocating per tile.
    scratch: BytesMut,
}

impl FrameEncoder<UdpTransport> {
    /// Validate the canvas, then open a UDP socket to `(host, port)`.
    pub async fn connect(
        host: &str,
        port: u16,
        options: CanvasOptions,
    ) -> Result<Self, FlaschenError> {
        let canvas = Canvas::with_options(options)?;
        let sink = UdpTransport::connect(host, port).await?;
        Ok(Self::from_parts(canvas, sink))
    }
}

impl<S: DatagramSink> FrameEncoder<S> {
    /// Build an encoder over an arbitrary sink.
    pub fn with_sink(sink: S, options: CanvasOptions) -> Result<Self, FlaschenError> {
        Ok(Self::from_parts(Canvas::with_options(options)?, sink))
    }

    fn from_parts(canvas: Canvas, sink: S) -> Self {
        Self {
            canvas,
            sink,
            scratch: BytesMut::new(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn width(&self) -> usize {
        self.canvas.width()
    }

    pub fn height(&self) -> usize {
        self.canvas.height()
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        self.canvas.set_pixel(x, y, color);
    }

    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    pub fn fill(&mut self, color: Rgb) {
        self.canvas.fill(color);
    }

    /// Send the current canvas, one datagram per tile, in row-major order.
    ///
    /// Returns the number of datagrams sent. The first failed send aborts
    /// the remaining tiles; the display may be left partially updated.
    pub async fn flush(&mut self) -> Result<usize, FlaschenError> {
        let plan = self.canvas.tile_plan();
        let mut sent = 0;

        for (index, tile) in plan.tiles().enumerate() {
            self.scratch.clear();
            self.canvas.encode_tile_into(&tile, &mut self.scratch);
            self.sink
                .send(&self.scratch)
                .await
                .map_err(|source| FlaschenError::Send {
                    tile: index,
                    source,
                })?;
            sent += 1;
        }

        trace!(
            "flushed layer {} as {sent} datagram(s)",
            self.canvas.layer()
        );
        Ok(sent)
    }

    /// Release the socket.
    pub fn close(self) -> Canvas {
        self.canvas
    }
}

// ── Tests ────────────────────────────────────────────────────────
