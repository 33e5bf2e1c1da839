//! Colour model: 8-bit RGB triples and the colour selection used by effects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlaschenError;

// ── Rgb ──────────────────────────────────────────────────────────

/// One pixel, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Visually black, but not treated as "no pixel" by the compositor.
    pub const NEAR_BLACK: Rgb = Rgb::new(1, 1, 1);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Channels in wire order.
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = FlaschenError;

    /// Parses `RRGGBB`, with or without a leading `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(FlaschenError::InvalidColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| FlaschenError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

// ── ColorSelection ───────────────────────────────────────────────

/// Named presets offered by the controller, as `(token, colour)`.
pub const PRESETS: [(&str, Rgb); 4] = [
    ("green", Rgb::new(0x00, 0xff, 0x00)),
    ("red", Rgb::new(0xff, 0x00, 0x00)),
    ("blue", Rgb::new(0x00, 0xaa, 0xff)),
    ("yellow", Rgb::new(0xff, 0xff, 0x00)),
];

const RANDOM_TOKEN: &str = "random";
const GRADIENT_PREFIX: &str = "gradient:";

/// How an effect picks the colour of the things it draws.
///
/// Serialized as a single string token: a preset name, `random`,
/// a hex colour, or `gradient:RRGGBB,RRGGBB[,...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorSelection {
    /// One colour for everything.
    Fixed(Rgb),
    /// Every spawned instance (e.g. each raindrop) gets its own random colour.
    RandomPerInstance,
    /// Instances cycle through colours interpolated between the stops.
    PaletteGradient(Vec<Rgb>),
}

impl Default for ColorSelection {
    fn default() -> Self {
        ColorSelection::Fixed(PRESETS[0].1)
    }
}

impl ColorSelection {
    /// Parse a preset name, `random`, a hex colour or a gradient token.
    pub fn parse(token: &str) -> Result<Self, FlaschenError> {
        let token = token.trim();
        let lower = token.to_ascii_lowercase();

        if lower == RANDOM_TOKEN {
            return Ok(ColorSelection::RandomPerInstance);
        }
        if let Some((_, rgb)) = PRESETS.iter().find(|(name, _)| *name == lower) {
            return Ok(ColorSelection::Fixed(*rgb));
        }
        if let Some(stops) = lower.strip_prefix(GRADIENT_PREFIX) {
            let stops = stops
                .split(',')
                .map(str::parse::<Rgb>)
                .collect::<Result<Vec<_>, _>>()?;
            if stops.len() < 2 {
                return Err(FlaschenError::InvalidColor(token.to_string()));
            }
            return Ok(ColorSelection::PaletteGradient(stops));
        }
        Ok(ColorSelection::Fixed(token.parse()?))
    }

    /// Stable token written to settings files.
    pub fn name(&self) -> String {
        match self {
            ColorSelection::Fixed(rgb) => PRESETS
                .iter()
                .find(|(_, preset)| preset == rgb)
                .map(|(name, _)| (*name).to_string())
                .unwrap_or_else(|| rgb.to_string()),
            ColorSelection::RandomPerInstance => RANDOM_TOKEN.to_string(),
            ColorSelection::PaletteGradient(stops) => {
                let stops: Vec<String> = stops.iter().map(Rgb::to_string).collect();
                format!("{GRADIENT_PREFIX}{}", stops.join(","))
            }
        }
    }

    /// Colour used for the text overlay. Only fixed colours carry over;
    /// anything else falls back to green.
    pub fn overlay_color(&self) -> Rgb {
        match self {
            ColorSelection::Fixed(rgb) => *rgb,
            _ => PRESETS[0].1,
        }
    }
}

impl TryFrom<String> for ColorSelection {
    type Error = FlaschenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ColorSelection::parse(&value)
    }
}

impl From<ColorSelection> for String {
    fn from(value: ColorSelection) -> Self {
        value.name()
    }
}

impl fmt::Display for ColorSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ── Tests ────────────────────────────────────────────────────────
