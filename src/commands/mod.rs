// Command handlers module
pub mod alert;
pub mod collect;
pub mod monitor;

use std::fmt;
use std::str::FromStr;

/// Operating mode selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Collect,
    Alert,
    Monitor,
}

impl Mode {
    pub const NAMES: [&'static str; 3] = ["collect", "alert", "monitor"];
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collect" => Ok(Mode::Collect),
            "alert" => Ok(Mode::Alert),
            "monitor" => Ok(Mode::Monitor),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Collect => "collect",
            Mode::Alert => "alert",
            Mode::Monitor => "monitor",
        };
        f.write_str(name)
    }
}
