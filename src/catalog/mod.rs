//! Board/tool/programmer metadata catalog.
//!
//! The catalog is the read-only data source sessions resolve against. It is
//! parsed from Arduino-style `key=value` text files (the `boards.txt` /
//! `platform.txt` / `programmers.txt` format) and keyed under `boards.*`,
//! `tools.*`, and `programmers.*`. Each loaded file's path and SHA-256
//! digest are recorded for provenance.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::{extract_subtree, ConfigStore};

/// Errors from catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: malformed entry (expected key=value)")]
    Malformed { path: String, line: usize },
}

/// Provenance for one contributing catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSource {
    /// File path as given to the loader.
    pub path: String,

    /// SHA-256 digest of the raw file bytes.
    pub digest: String,
}

/// The full metadata tree plus the provenance of its sources.
///
/// Immutable after construction; safe to share across threads and reuse for
/// any number of independent sessions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cfgs: ConfigStore,
    sources: Vec<CatalogSource>,
}

impl Catalog {
    /// Wrap an already-populated store (no file provenance).
    pub fn new(cfgs: ConfigStore) -> Self {
        Self {
            cfgs,
            sources: Vec::new(),
        }
    }

    /// Load a single catalog file.
    pub fn load_file(path: &Path) -> Result<Self, CatalogError> {
        Self::load_files(std::slice::from_ref(&path.to_path_buf()))
    }

    /// Load and merge several catalog files in order (later files win on
    /// key collision).
    pub fn load_files(paths: &[std::path::PathBuf]) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for path in paths {
            catalog.merge_file(path)?;
        }
        Ok(catalog)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), CatalogError> {
        let display = path.display().to_string();
        let bytes = fs::read(path).map_err(|source| CatalogError::Io {
            path: display.clone(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let text = String::from_utf8_lossy(&bytes);
        parse_into(&text, &display, &mut self.cfgs)?;

        self.sources.push(CatalogSource {
            path: display,
            digest,
        });
        Ok(())
    }

    /// The full metadata store.
    pub fn store(&self) -> &ConfigStore {
        &self.cfgs
    }

    /// Contributing files in load order.
    pub fn sources(&self) -> &[CatalogSource] {
        &self.sources
    }

    /// The cpu identifiers a board supports, derived from the
    /// `boards.<board>.menu.cpu` subtree. An empty set means the board has
    /// a fixed default cpu and no selection is expected.
    pub fn board_supported_cpus(&self, board: &str) -> BTreeSet<String> {
        first_segments(&self.cfgs, &format!("boards.{board}.menu.cpu"))
    }

    /// All board identifiers in the catalog.
    pub fn board_ids(&self) -> BTreeSet<String> {
        first_segments(&self.cfgs, "boards")
    }

    /// All programmer identifiers in the catalog.
    pub fn programmer_ids(&self) -> BTreeSet<String> {
        first_segments(&self.cfgs, "programmers")
    }
}

/// Distinct first path segments of the subtree under `prefix`.
fn first_segments(store: &ConfigStore, prefix: &str) -> BTreeSet<String> {
    let subtree = extract_subtree(store, prefix);
    subtree
        .iter()
        .filter_map(|(key, _)| key.split('.').next())
        .map(str::to_string)
        .collect()
}

/// Parse `key=value` lines into a store. Blank lines and `#` comments are
/// skipped; the split is on the first `=` only, both sides trimmed.
fn parse_into(text: &str, path: &str, store: &mut ConfigStore) -> Result<(), CatalogError> {
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or(CatalogError::Malformed {
            path: path.to_string(),
            line: idx + 1,
        })?;
        store.set(key.trim(), value.trim());
    }
    Ok(())
}
