//! System identifiers.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Consoles whose video memory can be decoded into a `FrameIR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemId {
    MegaDrive,
    Snes,
    Nes,
    #[serde(rename = "gb")]
    GameBoy,
    #[serde(rename = "gbc")]
    GameBoyColor,
}

impl SystemId {
    pub const ALL: [SystemId; 5] = [
        SystemId::MegaDrive,
        SystemId::Snes,
        SystemId::Nes,
        SystemId::GameBoy,
        SystemId::GameBoyColor,
    ];

    /// Canonical identifier, as written in exported metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemId::MegaDrive => "megadrive",
            SystemId::Snes => "snes",
            SystemId::Nes => "nes",
            SystemId::GameBoy => "gb",
            SystemId::GameBoyColor => "gbc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SystemId::MegaDrive => "Sega Mega Drive / Genesis",
            SystemId::Snes => "Super Nintendo",
            SystemId::Nes => "Nintendo Entertainment System",
            SystemId::GameBoy => "Game Boy",
            SystemId::GameBoyColor => "Game Boy Color",
        }
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "megadrive" | "genesis" | "segamd" | "md" => Ok(SystemId::MegaDrive),
            "snes" | "sfc" => Ok(SystemId::Snes),
            "nes" | "famicom" => Ok(SystemId::Nes),
            "gb" | "gameboy" | "dmg" => Ok(SystemId::GameBoy),
            "gbc" | "gameboycolor" | "cgb" => Ok(SystemId::GameBoyColor),
            other => Err(DecodeError::UnsupportedSystem(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve() {
        assert_eq!("genesis".parse::<SystemId>(), Ok(SystemId::MegaDrive));
        assert_eq!("SegaMD".parse::<SystemId>(), Ok(SystemId::MegaDrive));
        assert_eq!("sfc".parse::<SystemId>(), Ok(SystemId::Snes));
        assert_eq!("famicom".parse::<SystemId>(), Ok(SystemId::Nes));
        assert_eq!("dmg".parse::<SystemId>(), Ok(SystemId::GameBoy));
        assert_eq!("cgb".parse::<SystemId>(), Ok(SystemId::GameBoyColor));
    }

    #[test]
    fn test_unknown_system() {
        assert_eq!(
            "pce".parse::<SystemId>(),
            Err(DecodeError::UnsupportedSystem("pce".to_string()))
        );
    }

    #[test]
    fn test_canonical_ids_round_trip() {
        for id in SystemId::ALL {
            assert_eq!(id.as_str().parse::<SystemId>(), Ok(id));
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }
}
