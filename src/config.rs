// Board layout, read from <sound dir>/deckpad.json when it exists.
//
//   {
//     "pads": [ { "label": "Bass", "sound": "bass", "key": "a" } ],
//     "scratch_sound": "scratch",
//     "log_file": "deckpad.log"
//   }
//
// Anything left out falls back to the defaults below. Tuning constants
// (pool size, rate clamp, thresholds) live in shared.rs and are not
// configurable.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE: &str = "deckpad.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("pad key '{0}' is used twice")]
    DuplicateKey(char),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PadConfig {
    pub label: String,
    pub sound: String,
    pub key: char,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub pads: Vec<PadConfig>,
    pub scratch_sound: String,
    pub log_file: PathBuf,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            pads: vec![
                PadConfig { label: "Bass".into(), sound: "bass".into(), key: 'a' },
                PadConfig { label: "Beats".into(), sound: "beats".into(), key: 's' },
            ],
            scratch_sound: "scratch".into(),
            log_file: PathBuf::from("deckpad.log"),
        }
    }
}

impl BoardConfig {
    pub fn config_path(sound_dir: &Path) -> PathBuf {
        sound_dir.join(CONFIG_FILE)
    }

    // Defaults when there is no file; an error only when there is one and it
    // doesn't make sense
    pub fn load(sound_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::config_path(sound_dir);
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        for (i, pad) in config.pads.iter().enumerate() {
            if config.pads[..i].iter().any(|p| p.key == pad.key) {
                return Err(ConfigError::DuplicateKey(pad.key));
            }
        }
        Ok(config)
    }

    // every sound name the board needs, pads first
    pub fn sound_names(&self) -> impl Iterator<Item = &str> {
        self.pads
            .iter()
            .map(|p| p.sound.as_str())
            .chain(std::iter::once(self.scratch_sound.as_str()))
    }
}
