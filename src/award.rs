use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Award {
    #[serde(rename = "MVP")]
    Mvp,
    #[serde(rename = "OROY")]
    Oroy,
    #[serde(rename = "DROY")]
    Droy,
}

impl Award {
    pub const ALL: [Award; 3] = [Award::Mvp, Award::Oroy, Award::Droy];

    pub fn code(self) -> &'static str {
        match self {
            Award::Mvp => "MVP",
            Award::Oroy => "OROY",
            Award::Droy => "DROY",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Award::Mvp => "Most Valuable Player",
            Award::Oroy => "Offensive Rookie of the Year",
            Award::Droy => "Defensive Rookie of the Year",
        }
    }
}

impl fmt::Display for Award {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Award {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MVP" => Ok(Award::Mvp),
            "OROY" => Ok(Award::Oroy),
            "DROY" => Ok(Award::Droy),
            other => Err(anyhow!("unknown award {other:?}")),
        }
    }
}
