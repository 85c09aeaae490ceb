//! Host-level preferences.
//!
//! An optional TOML file supplying default identifiers so they need not be
//! repeated on every invocation:
//!
//! ```toml
//! board = "mega"
//! cpu = "atmega2560"
//! programmer = "usbtinyisp"
//! port = "/dev/ttyUSB0"
//! ```
//!
//! Default location: `~/.config/ardulane/prefs.toml`. CLI flags override
//! preference values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Preference loading errors.
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// Default identifiers for a resolution session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub board: Option<String>,

    #[serde(default)]
    pub cpu: Option<String>,

    #[serde(default)]
    pub programmer: Option<String>,

    #[serde(default)]
    pub port: Option<String>,
}

impl Preferences {
    /// Load preferences from a TOML file. A missing file yields defaults;
    /// an unreadable or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| PrefsError::Io {
            path: display.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| PrefsError::Parse {
            path: display,
            message: e.to_string(),
        })
    }

    /// The conventional preferences location, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config/ardulane/prefs.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "board = \"mega\"").unwrap();
        writeln!(file, "cpu = \"atmega2560\"").unwrap();
        writeln!(file, "programmer = \"usbtinyisp\"").unwrap();
        writeln!(file, "port = \"/dev/ttyUSB0\"").unwrap();

        let prefs = Preferences::load(file.path()).unwrap();
        assert_eq!(prefs.board.as_deref(), Some("mega"));
        assert_eq!(prefs.cpu.as_deref(), Some("atmega2560"));
        assert_eq!(prefs.programmer.as_deref(), Some("usbtinyisp"));
        assert_eq!(prefs.port.as_deref(), Some("/dev/ttyUSB0"));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "board = \"uno\"").unwrap();

        let prefs = Preferences::load(file.path()).unwrap();
        assert_eq!(prefs.board.as_deref(), Some("uno"));
        assert!(prefs.cpu.is_none());
        assert!(prefs.programmer.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let prefs = Preferences::load(Path::new("/nonexistent/prefs.toml")).unwrap();
        assert!(prefs.board.is_none());
        assert!(prefs.port.is_none());
    }

    #[test]
    fn test_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "board = [not toml").unwrap();

        let err = Preferences::load(file.path()).unwrap_err();
        assert!(matches!(err, PrefsError::Parse { .. }));
    }
}
