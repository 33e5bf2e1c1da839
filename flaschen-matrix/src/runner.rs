//! Standalone matrix effect: rain on one layer until stopped or timed out.

use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use flaschen_core::{CanvasOptions, DatagramSink, FlaschenError, FrameEncoder, MatrixRain};

use crate::config::MatrixConfig;
use crate::shutdown::StopHandle;

// ── MatrixRunner ─────────────────────────────────────────────────

/// Drives [`MatrixRain`] into a single display layer.
pub struct MatrixRunner {
    config: MatrixConfig,
    stop: StopHandle,
}

impl MatrixRunner {
    pub fn new(config: MatrixConfig) -> Self {
        Self {
            config,
            stop: StopHandle::new(),
        }
    }

    /// Handle that stops the effect from another task (e.g. Ctrl-C).
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Connect to the configured display and run until stopped.
    ///
    /// Returns the number of animation frames delivered.
    pub async fn run(&self) -> Result<u64, FlaschenError> {
        let server = &self.config.display;
        let effect = &self.config.effect;
        let options = CanvasOptions::new(effect.width, effect.height).layer(effect.layer);
        let mut ft = FrameEncoder::connect(&server.host, server.port, options).await?;
        info!(
            "matrix effect → {}:{} ({}x{}, layer {})",
            server.host, server.port, effect.width, effect.height, effect.layer
        );

        let mut rng = StdRng::from_entropy();
        self.run_with(&mut ft, &mut rng).await
    }

    /// Run the effect on an existing encoder.
    ///
    /// If a stop was already requested, only the clearing frame is sent.
    /// The layer is cleared and flushed once more before returning, even
    /// when individual frames failed to send.
    pub async fn run_with<S, R>(&self, ft: &mut FrameEncoder<S>, rng: &mut R) -> Result<u64, FlaschenError>
    where
        S: DatagramSink,
        R: Rng + ?Sized,
    {
        let effect = &self.config.effect;

        let mut rain = MatrixRain::new(ft.width(), ft.height(), effect.color.clone(), effect.density);
        let mut ticker = tokio::time::interval(Duration::from_millis(effect.delay_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = Instant::now() + Duration::from_secs(effect.time_secs);
        let mut frames = 0u64;

        while !self.stop.is_stopped() && Instant::now() <= deadline {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.stop.stopped() => break,
            }
            rain.step(ft.canvas_mut(), rng);
            match ft.flush().await {
                Ok(_) => frames += 1,
                Err(e) => warn!("frame {} not delivered: {e}", rain.frame()),
            }
        }

        ft.clear();
        ft.flush().await?;
        info!("matrix effect stopped after {frames} frames");
        Ok(frames)
    }
}

// ── Tests ────────────────────────────────────────────────────────
