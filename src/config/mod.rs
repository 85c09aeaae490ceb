//! Hierarchical configuration namespace.
//!
//! Three layers of machinery:
//! - [`ConfigStore`]: flat dotted-key → string map
//! - [`Overlay`]: fallback chain of stores, child writes never touch the parent
//! - subtree extraction: re-roots everything beneath a key prefix

mod overlay;
mod store;
mod subtree;

pub use overlay::Overlay;
pub use store::ConfigStore;
pub use subtree::{extract_overlay_subtree, extract_subtree};
