//! Configuration for the matrix effect and its controller.

use std::path::Path;

use serde::{Deserialize, Serialize};

use flaschen_core::ColorSelection;
use flaschen_core::effect::DEFAULT_DENSITY;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Where the display server listens.
    pub display: DisplayConfig,
    /// Standalone effect settings (`run`).
    pub effect: EffectConfig,
    /// Controller settings (`control`).
    pub control: ControlConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Display server address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Hostname or IP of the display server.
    pub host: String,
    /// UDP port of the display server.
    pub port: u16,
}

/// Matrix rain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub width: usize,
    pub height: usize,
    /// Layer 0..=15 the rain is drawn on.
    pub layer: u8,
    /// Frame delay in milliseconds.
    pub delay_ms: u64,
    /// Preset name, `random`, `gradient:<hex>,<hex>…` or `RRGGBB`.
    pub color: ColorSelection,
    /// Fraction of cells that may carry a drop.
    pub density: f64,
    /// How long to run before exiting, in seconds.
    pub time_secs: u64,
}

/// Controller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub width: usize,
    pub height: usize,
    /// Layer for the rain.
    pub animation_layer: u8,
    /// Layer for the welcome text, custom text and clock.
    pub text_layer: u8,
    /// JSON file holding the colour and text between runs.
    pub settings_path: String,
    /// Address shown on the welcome screen.
    pub url: String,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1337,
        }
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            width: 45,
            height: 35,
            layer: 2,
            delay_ms: 50,
            color: ColorSelection::default(),
            density: DEFAULT_DENSITY,
            time_secs: 24 * 60 * 60,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            width: 192,
            height: 128,
            animation_layer: 2,
            text_layer: 1,
            settings_path: "matrix_settings.json".into(),
            url: "HTTP://192.168.86.56".into(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl MatrixConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the default configuration to a file (for bootstrapping).
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let text = toml::to_string_pretty(&Self::default()).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use flaschen_core::Rgb;

    #[test]
    fn default_config_serializes() {
        let text = toml::to_string_pretty(&MatrixConfig::default()).unwrap();
        assert!(text.contains("delay_ms"));
        assert!(text.contains("color = \"green\""));
        assert!(text.contains("settings_path"));
    }

    #[test]
    fn roundtrip_config() {
        let text = toml::to_string_pretty(&MatrixConfig::default()).unwrap();
        let parsed: MatrixConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.display.port, 1337);
        assert_eq!((parsed.effect.width, parsed.effect.height), (45, 35));
        assert_eq!(parsed.control.text_layer, 1);
        assert_eq!(parsed.effect.color, ColorSelection::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let parsed: MatrixConfig = toml::from_str(
            r#"
            [effect]
            color = "ff8800"
            delay_ms = 20
            "#,
        )
        .unwrap();
        assert_eq!(parsed.effect.color, ColorSelection::Fixed(Rgb::new(255, 136, 0)));
        assert_eq!(parsed.effect.delay_ms, 20);
        assert_eq!(parsed.effect.layer, 2);
        assert_eq!(parsed.display.host, "localhost");
    }

    #[test]
    fn bad_color_is_rejected() {
        assert!(toml::from_str::<MatrixConfig>("[effect]\ncolor = \"mauve\"").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = MatrixConfig::load(Path::new("/nonexistent/flaschen-matrix.toml"));
        assert_eq!(cfg.logging.level, "info");
    }
}
