//! Two-layer display controller.
//!
//! The rain runs on the animation layer; the text layer underneath shows
//! a welcome screen while stopped and the custom text while running,
//! each with a clock that ticks once per second. Console commands on
//! stdin change the [`Session`], and the render loop follows the
//! session's change feed.
//!
//! ```text
//! console (stdin) ──► Session::apply ──watch──► render loop ──► FrameEncoder ×2
//! ```

use std::time::Duration;

use chrono::{DateTime, Local};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use flaschen_core::{
    AnimationState, CanvasOptions, ControlCommand, DatagramSink, FlaschenError, FrameEncoder,
    MatrixRain, Rgb, Session, SessionSnapshot, SettingsStore, TextOverlay,
};

use crate::config::MatrixConfig;
use crate::shutdown::StopHandle;

/// Colour of the welcome screen.
pub const WELCOME_COLOR: Rgb = Rgb::new(0, 180, 0);

const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Wall-clock text shown under the welcome or custom text.
pub fn clock_text(now: DateTime<Local>) -> String {
    now.format("%H:%M:%S").to_string()
}

// ── Renderer ─────────────────────────────────────────────────────

/// Turns session snapshots into frames on the animation and text layers.
pub struct Renderer<S: DatagramSink> {
    animation: FrameEncoder<S>,
    text: FrameEncoder<S>,
    rain: MatrixRain,
    url: String,
    snapshot: SessionSnapshot,
}

impl<S: DatagramSink> Renderer<S> {
    pub fn new(
        animation: FrameEncoder<S>,
        text: FrameEncoder<S>,
        density: f64,
        url: impl Into<String>,
        snapshot: SessionSnapshot,
    ) -> Self {
        let rain = MatrixRain::new(
            animation.width(),
            animation.height(),
            snapshot.settings.color.clone(),
            density,
        );
        Self {
            animation,
            text,
            rain,
            url: url.into(),
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn animation(&self) -> &FrameEncoder<S> {
        &self.animation
    }

    pub fn text(&self) -> &FrameEncoder<S> {
        &self.text
    }

    /// Blank the animation layer and draw the text layer for the current
    /// state.
    pub async fn start(&mut self, clock: &str) -> Result<(), FlaschenError> {
        self.animation.clear();
        self.animation.flush().await?;
        self.draw_text(clock).await
    }

    /// React to a new snapshot from the session.
    pub async fn update(&mut self, next: SessionSnapshot, clock: &str) -> Result<(), FlaschenError> {
        let prev = std::mem::replace(&mut self.snapshot, next);
        let state = self.snapshot.state;

        if prev.settings.color != self.snapshot.settings.color {
            self.rain.set_color(self.snapshot.settings.color.clone());
        }

        if matches!(state, AnimationState::Stopped | AnimationState::Blank) && prev.state != state {
            self.rain.reset();
            self.animation.clear();
            self.animation.flush().await?;
        }

        self.draw_text(clock).await
    }

    /// Advance the rain one frame if the session is running.
    pub async fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), FlaschenError> {
        if !self.snapshot.state.is_animating() {
            return Ok(());
        }
        self.rain.step(self.animation.canvas_mut(), rng);
        self.animation.flush().await?;
        Ok(())
    }

    /// Redraw the text layer with `clock` as its last line.
    pub async fn draw_text(&mut self, clock: &str) -> Result<(), FlaschenError> {
        let canvas = self.text.canvas_mut();
        canvas.clear();

        let state = self.snapshot.state;
        if state == AnimationState::Stopped {
            let welcome = format!("PRESS START AT:\n{}\n{clock}", self.url);
            TextOverlay::new(WELCOME_COLOR).draw(canvas, &welcome);
        } else if state.shows_custom_text() {
            if let Some(text) = self.snapshot.settings.custom_text() {
                let overlay = TextOverlay::new(self.snapshot.settings.color.overlay_color());
                overlay.draw(canvas, &format!("{text}\n{clock}"));
            }
        }

        self.text.flush().await?;
        Ok(())
    }

    /// Clear both layers.
    pub async fn shutdown(&mut self) -> Result<(), FlaschenError> {
        self.animation.clear();
        self.animation.flush().await?;
        self.text.clear();
        self.text.flush().await?;
        Ok(())
    }
}

// ── Console ──────────────────────────────────────────────────────

/// Read stdin on a dedicated thread, one `String` per line.
///
/// A blocking read must not hold up runtime shutdown, so this stays off
/// the tokio blocking pool.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Feed console lines into `session` until the input closes or `stop`
/// fires. Each line gets a one-line reply on `output`.
pub async fn drive_session<W: AsyncWrite + Unpin>(
    session: &mut Session,
    input: &mut mpsc::Receiver<String>,
    output: &mut W,
    stop: &StopHandle,
) -> std::io::Result<()> {
    loop {
        let line = tokio::select! {
            line = input.recv() => line,
            _ = stop.stopped() => return Ok(()),
        };
        let Some(line) = line else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match line.parse::<ControlCommand>().and_then(|cmd| session.apply(cmd)) {
            Ok(snap) => format!(
                "{} color={} text={:?}",
                snap.state, snap.settings.color, snap.settings.text
            ),
            Err(e) => {
                debug!("rejected console command {line:?}: {e}");
                format!("error: {e}")
            }
        };
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
}

// ── Controller ───────────────────────────────────────────────────

/// The `control` mode: session, console and render loop.
pub struct Controller {
    config: MatrixConfig,
    stop: StopHandle,
}

impl Controller {
    pub fn new(config: MatrixConfig) -> Self {
        Self {
            config,
            stop: StopHandle::new(),
        }
    }

    /// Handle that stops the controller from another task (e.g. Ctrl-C).
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Run until stopped; both layers are cleared on the way out.
    pub async fn run(&self) -> Result<(), FlaschenError> {
        let server = &self.config.display;
        let control = &self.config.control;
        let size = (control.width, control.height);

        // Black on the animation layer must not hide the text below it.
        let animation = FrameEncoder::connect(
            &server.host,
            server.port,
            CanvasOptions::new(size.0, size.1)
                .layer(control.animation_layer)
                .transparent(true),
        )
        .await?;
        let text = FrameEncoder::connect(
            &server.host,
            server.port,
            CanvasOptions::new(size.0, size.1).layer(control.text_layer),
        )
        .await?;

        let mut session = Session::with_store(SettingsStore::new(&control.settings_path));
        let feed = session.subscribe();
        let mut renderer = Renderer::new(
            animation,
            text,
            self.config.effect.density,
            &control.url,
            session.snapshot().clone(),
        );
        info!(
            "controller → {}:{} ({}x{}, animation layer {}, text layer {})",
            server.host, server.port, size.0, size.1, control.animation_layer, control.text_layer
        );
        println!("commands: start | pause | stop | blank | color <name|hex|random> | text <words> | status");

        let console_stop = self.stop.clone();
        let console = tokio::spawn(async move {
            let mut stdin = spawn_stdin_reader();
            let mut stdout = tokio::io::stdout();
            if let Err(e) = drive_session(&mut session, &mut stdin, &mut stdout, &console_stop).await {
                warn!("console error: {e}");
            }
            // Keep the session (and its change feed) alive after stdin closes.
            console_stop.stopped().await;
        });

        let result = self.render_loop(&mut renderer, feed).await;

        self.stop.stop();
        if let Err(e) = console.await {
            warn!("console task failed: {e}");
        }
        if let Err(e) = renderer.shutdown().await {
            warn!("failed to clear display: {e}");
        }
        info!("controller stopped");
        result
    }

    async fn render_loop<S: DatagramSink>(
        &self,
        renderer: &mut Renderer<S>,
        mut feed: watch::Receiver<SessionSnapshot>,
    ) -> Result<(), FlaschenError> {
        let mut rng = StdRng::from_entropy();
        let mut frame_tick =
            tokio::time::interval(Duration::from_millis(self.config.effect.delay_ms.max(1)));
        frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut clock_tick = tokio::time::interval(CLOCK_PERIOD);
        clock_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        report(renderer.start(&clock_text(Local::now())).await, "initial draw");

        while !self.stop.is_stopped() {
            tokio::select! {
                changed = feed.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = feed.borrow_and_update().clone();
                    report(renderer.update(snapshot, &clock_text(Local::now())).await, "state change");
                }
                _ = frame_tick.tick() => {
                    report(renderer.step(&mut rng).await, "animation frame");
                }
                _ = clock_tick.tick() => {
                    report(renderer.draw_text(&clock_text(Local::now())).await, "clock");
                }
                _ = self.stop.stopped() => break,
            }
        }
        Ok(())
    }
}

/// Log a failed display update; the display may come back later.
fn report(result: Result<(), FlaschenError>, what: &str) {
    if let Err(e) = result {
        warn!("{what}: {e}");
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flaschen_core::{ColorSelection, Compositor, FrameReceiver, Settings};

    const W: usize = 120;
    const H: usize = 40;

    async fn renderer(snapshot: SessionSnapshot) -> (Renderer<flaschen_core::UdpTransport>, FrameReceiver) {
        let rx = FrameReceiver::bind("127.0.0.1:0").await.unwrap();
        let port = rx.local_addr().unwrap().port();
        let animation = FrameEncoder::connect(
            "127.0.0.1",
            port,
            CanvasOptions::new(W, H).layer(2).transparent(true),
        )
        .await
        .unwrap();
        let text = FrameEncoder::connect("127.0.0.1", port, CanvasOptions::new(W, H).layer(1))
            .await
            .unwrap();
        (Renderer::new(animation, text, 0.5, "HTTP://X", snapshot), rx)
    }

    fn lit(canvas: &flaschen_core::Canvas) -> usize {
        canvas.pixels().iter().filter(|p| !p.is_black()).count()
    }

    fn running_with_text(text: &str) -> SessionSnapshot {
        SessionSnapshot {
            state: AnimationState::Running,
            settings: Settings {
                color: ColorSelection::Fixed(Rgb::new(255, 0, 0)),
                text: text.into(),
            },
        }
    }

    #[test]
    fn clock_format() {
        let t = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap();
        assert_eq!(clock_text(t), "07:05:03");
    }

    #[tokio::test]
    async fn stopped_shows_welcome_in_green() {
        let (mut r, _rx) = renderer(SessionSnapshot::default()).await;
        r.start("12:00:00").await.unwrap();

        let text = r.text().canvas();
        assert!(lit(text) > 0);
        assert!(text.pixels().iter().all(|p| p.is_black() || *p == WELCOME_COLOR));
        assert_eq!(lit(r.animation().canvas()), 0);
    }

    #[tokio::test]
    async fn running_draws_custom_text_in_selected_color() {
        let (mut r, _rx) = renderer(SessionSnapshot::default()).await;
        r.update(running_with_text("HI"), "12:00:00").await.unwrap();

        let text = r.text().canvas();
        assert!(lit(text) > 0);
        assert!(text.pixels().iter().all(|p| p.is_black() || *p == Rgb::new(255, 0, 0)));
    }

    #[tokio::test]
    async fn running_without_text_leaves_text_layer_empty() {
        let (mut r, _rx) = renderer(SessionSnapshot::default()).await;
        r.update(running_with_text("  "), "12:00:00").await.unwrap();
        assert_eq!(lit(r.text().canvas()), 0);
    }

    #[tokio::test]
    async fn paused_freezes_the_rain() {
        let (mut r, _rx) = renderer(running_with_text("")).await;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..40 {
            r.step(&mut rng).await.unwrap();
        }
        assert!(lit(r.animation().canvas()) > 0);

        let mut paused = r.snapshot().clone();
        paused.state = AnimationState::Paused;
        r.update(paused, "12:00:00").await.unwrap();

        let before = r.animation().canvas().pixels().to_vec();
        for _ in 0..5 {
            r.step(&mut rng).await.unwrap();
        }
        assert_eq!(r.animation().canvas().pixels(), &before[..]);
    }

    #[tokio::test]
    async fn blank_clears_both_layers() {
        let (mut r, mut rx) = renderer(running_with_text("HI")).await;
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..40 {
            r.step(&mut rng).await.unwrap();
        }
        r.draw_text("12:00:00").await.unwrap();
        assert!(lit(r.text().canvas()) > 0);
        // Only the frames sent for the blank state matter below.
        while let Ok(Ok(_)) =
            tokio::time::timeout(Duration::from_millis(300), rx.recv_frame()).await
        {}

        let mut blank = r.snapshot().clone();
        blank.state = AnimationState::Blank;
        r.update(blank, "12:00:01").await.unwrap();
        assert_eq!(lit(r.animation().canvas()), 0);
        assert_eq!(lit(r.text().canvas()), 0);

        let mut display = Compositor::new(W, H).unwrap();
        while let Ok(Ok((frame, _))) =
            tokio::time::timeout(Duration::from_millis(300), rx.recv_frame()).await
        {
            display.apply(&frame).unwrap();
        }
        assert!(display.composite().iter().all(|p| p.is_black()));
    }

    #[tokio::test]
    async fn console_lines_drive_the_session() {
        let mut session = Session::new(Settings::default());
        let feed = session.subscribe();
        let stop = StopHandle::new();
        let (tx, mut input) = mpsc::channel(16);
        for line in ["start", "", "color red", "jump", "pause", "pause", "text hello"] {
            tx.send(line.to_string()).await.unwrap();
        }
        drop(tx);
        let mut output = Vec::new();

        drive_session(&mut session, &mut input, &mut output, &stop)
            .await
            .unwrap();

        let replies = String::from_utf8(output).unwrap();
        let replies: Vec<&str> = replies.lines().collect();
        assert_eq!(replies.len(), 6);
        assert!(replies[0].starts_with("Running"));
        assert!(replies[1].contains("color=red"));
        assert!(replies[2].starts_with("error:"));
        assert!(replies[3].starts_with("Paused"));
        assert!(replies[4].starts_with("error:"));
        assert!(replies[5].ends_with("text=\"hello\""));

        let last = feed.borrow();
        assert_eq!(last.state, AnimationState::Paused);
        assert_eq!(last.settings.text, "hello");
    }

    #[test]
    fn controller_stop_handle_is_shared() {
        let controller = Controller::new(MatrixConfig::default());
        assert!(!controller.is_stopped());
        controller.stop_handle().stop();
        assert!(controller.is_stopped());
    }

    #[tokio::test]
    async fn console_returns_once_stopped() {
        let mut session = Session::new(Settings::default());
        let stop = StopHandle::new();
        stop.stop();
        let (_tx, mut input) = mpsc::channel::<String>(1);
        let mut output = Vec::new();

        tokio::time::timeout(
            Duration::from_secs(1),
            drive_session(&mut session, &mut input, &mut output, &stop),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(output.is_empty());
    }
}
