//! Control commands accepted by a [`Session`](super::Session).

use std::str::FromStr;

use crate::color::ColorSelection;
use crate::error::FlaschenError;

/// One request to change what the display is doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Pause,
    Stop,
    Blank,
    Color(ColorSelection),
    Text(String),
    /// Report the current state without changing it.
    Status,
}

impl FromStr for ControlCommand {
    type Err = FlaschenError;

    /// Parse a console line such as `start`, `color red` or `text HI THERE`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(v, r)| (v, r.trim()))
            .unwrap_or((line, ""));

        match verb.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "stop" => Ok(Self::Stop),
            "blank" => Ok(Self::Blank),
            "status" => Ok(Self::Status),
            "color" | "colour" if !rest.is_empty() => Ok(Self::Color(ColorSelection::parse(rest)?)),
            "text" => Ok(Self::Text(rest.to_string())),
            _ => Err(FlaschenError::Other(format!("unknown command: {line:?}"))),
        }
    }
}
