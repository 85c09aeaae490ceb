//! ardulane - board upload lane
//!
//! This crate resolves a layered board/tool/programmer catalog into a fully
//! expanded flash/upload command line. A catalog (Arduino-style `key=value`
//! metadata) is wrapped in a layered overlay, specialized with the
//! board-, cpu-, tool-, and programmer-specific subtrees in a fixed order,
//! and a template key (`upload.pattern`) is expanded into the command handed
//! to the external flashing tool.

pub mod catalog;
pub mod config;
pub mod expand;
pub mod prefs;
pub mod runner;
pub mod session;

pub use catalog::{Catalog, CatalogError, CatalogSource};
pub use config::{extract_overlay_subtree, extract_subtree, ConfigStore, Overlay};
pub use expand::{ExpandError, Expander, MAX_EXPANSION_DEPTH};
pub use prefs::{Preferences, PrefsError};
pub use runner::{ProcessRunner, ShellRunner};
pub use session::{
    BuildOverrides, SessionError, SessionState, UploadRequest, UploadSession, UploadSummary,
};
