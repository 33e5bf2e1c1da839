//! flaschen-matrix entry point.
//!
//! ```text
//! flaschen-matrix run [flags]       Standalone matrix effect (default)
//! flaschen-matrix control [flags]   Controller with text layer and console
//! flaschen-matrix --config <path>   Load a custom config TOML
//! flaschen-matrix --gen-config      Write default config to stdout
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flaschen_core::ColorSelection;
use flaschen_matrix::config::MatrixConfig;
use flaschen_matrix::controller::Controller;
use flaschen_matrix::runner::MatrixRunner;
use flaschen_matrix::shutdown::StopHandle;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "flaschen-matrix", about = "Matrix rain for Flaschen Taschen LED displays")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short = 'C', long, default_value = "flaschen-matrix.toml", global = true)]
    config: PathBuf,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,

    /// Write the default configuration to `--config` and exit.
    #[arg(long)]
    init_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the matrix effect on one layer.
    Run(RunArgs),
    /// Run the controller: rain, text layer and console commands.
    Control(ControlArgs),
}

/// Flags shared by both modes; each overrides the config file.
#[derive(Args, Debug)]
struct DisplayArgs {
    /// Host to send packets to.
    #[arg(long)]
    host: Option<String>,
    /// Port to send packets to.
    #[arg(long)]
    port: Option<u16>,
    /// Canvas width.
    #[arg(long)]
    width: Option<usize>,
    /// Canvas height.
    #[arg(long)]
    height: Option<usize>,
    /// Frame delay in milliseconds.
    #[arg(short, long)]
    delay: Option<u64>,
    /// Rain colour: RRGGBB, a preset (green, red, blue, yellow), `random`
    /// or `gradient:RRGGBB,RRGGBB`.
    #[arg(short = 'c', long, value_parser = ColorSelection::parse)]
    color: Option<ColorSelection>,
    /// Drop density (0.0 - 1.0).
    #[arg(long)]
    density: Option<f64>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    display: DisplayArgs,
    /// Canvas layer (0-15).
    #[arg(short, long)]
    layer: Option<u8>,
    /// How long to run before exiting, in seconds.
    #[arg(short, long)]
    time: Option<u64>,
}

#[derive(Args, Debug)]
struct ControlArgs {
    #[command(flatten)]
    display: DisplayArgs,
    /// Layer for the rain.
    #[arg(long)]
    animation_layer: Option<u8>,
    /// Layer for the text and clock.
    #[arg(long)]
    text_layer: Option<u8>,
    /// Settings file for colour and text.
    #[arg(long)]
    settings: Option<String>,
    /// Address shown on the welcome screen.
    #[arg(long)]
    url: Option<String>,
}

// ── Overrides ────────────────────────────────────────────────────

impl DisplayArgs {
    /// Apply the shared flags; width/height land in `size`.
    fn apply(self, config: &mut MatrixConfig, size: (&mut usize, &mut usize)) {
        if let Some(host) = self.host {
            config.display.host = host;
        }
        if let Some(port) = self.port {
            config.display.port = port;
        }
        if let Some(width) = self.width {
            *size.0 = width;
        }
        if let Some(height) = self.height {
            *size.1 = height;
        }
        if let Some(delay) = self.delay {
            config.effect.delay_ms = delay;
        }
        if let Some(color) = self.color {
            config.effect.color = color;
        }
        if let Some(density) = self.density {
            config.effect.density = density;
        }
    }
}

impl RunArgs {
    fn apply(self, config: &mut MatrixConfig) {
        let mut size = (config.effect.width, config.effect.height);
        self.display.apply(config, (&mut size.0, &mut size.1));
        (config.effect.width, config.effect.height) = size;
        if let Some(layer) = self.layer {
            config.effect.layer = layer;
        }
        if let Some(time) = self.time {
            config.effect.time_secs = time;
        }
    }
}

impl ControlArgs {
    fn apply(self, config: &mut MatrixConfig) {
        let mut size = (config.control.width, config.control.height);
        self.display.apply(config, (&mut size.0, &mut size.1));
        (config.control.width, config.control.height) = size;
        if let Some(layer) = self.animation_layer {
            config.control.animation_layer = layer;
        }
        if let Some(layer) = self.text_layer {
            config.control.text_layer = layer;
        }
        if let Some(path) = self.settings {
            config.control.settings_path = path;
        }
        if let Some(url) = self.url {
            config.control.url = url;
        }
    }
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&MatrixConfig::default())?;
        println!("{text}");
        return Ok(());
    }
    if cli.init_config {
        MatrixConfig::write_default(&cli.config)?;
        println!("Wrote {}", cli.config.display());
        return Ok(());
    }

    // Load config, then let flags override it.
    let mut config = MatrixConfig::load(&cli.config);
    let control_mode = match cli.command {
        Some(Command::Control(args)) => {
            args.apply(&mut config);
            true
        }
        Some(Command::Run(args)) => {
            args.apply(&mut config);
            false
        }
        None => false,
    };

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("flaschen-matrix v{}", env!("CARGO_PKG_VERSION"));
    info!("display: {}:{}", config.display.host, config.display.port);
    info!(
        "color: {}, delay: {} ms, density: {:.3}",
        config.effect.color, config.effect.delay_ms, config.effect.density
    );

    if control_mode {
        info!(
            "control: {}x{}, settings in {}",
            config.control.width, config.control.height, config.control.settings_path
        );
        let controller = Controller::new(config);
        spawn_ctrl_c(controller.stop_handle());
        controller.run().await?;
    } else {
        info!(
            "run: {}x{} on layer {} for {} s",
            config.effect.width, config.effect.height, config.effect.layer, config.effect.time_secs
        );
        let runner = MatrixRunner::new(config);
        spawn_ctrl_c(runner.stop_handle());
        runner.run().await?;
    }

    Ok(())
}

/// Stop the active loop on Ctrl-C so it can blank the display.
fn spawn_ctrl_c(stop: StopHandle) {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl-C received, shutting down");
        stop.stop();
    });
}
