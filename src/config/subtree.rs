//! Prefix-rooted subtree extraction.
//!
//! A subtree is a derived view: every key beneath `prefix.` with the prefix
//! stripped, re-rooted at its own top level. An empty result is not an
//! error; callers decide whether emptiness is meaningful.

use super::overlay::Overlay;
use super::store::ConfigStore;

/// Extract the subtree rooted at `prefix` from a store.
///
/// Only keys starting with `prefix` followed by `.` survive; the bare
/// `prefix` key itself is not part of the subtree.
pub fn extract_subtree(store: &ConfigStore, prefix: &str) -> ConfigStore {
    let needle = format!("{prefix}.");
    let mut out = ConfigStore::new();
    for (key, value) in store.keys_with_prefix(&needle) {
        out.set(&key[needle.len()..], value);
    }
    out
}

/// Extract a subtree from the effective merged view of an overlay, i.e.
/// from every key visible through layered lookup, not just the top layer.
pub fn extract_overlay_subtree(overlay: &Overlay<'_>, prefix: &str) -> ConfigStore {
    extract_subtree(&overlay.flatten(), prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_prefix() {
        let mut store = ConfigStore::new();
        store.set("boards.mega.build.mcu", "atmega2560");
        store.set("boards.mega.upload.tool", "avrdude");
        store.set("boards.uno.build.mcu", "atmega328p");

        let sub = extract_subtree(&store, "boards.mega");
        assert_eq!(sub.get("build.mcu"), Some("atmega2560"));
        assert_eq!(sub.get("upload.tool"), Some("avrdude"));
        assert_eq!(sub.len(), 2);
    }

    #[test]
    fn test_bare_prefix_key_excluded() {
        let mut store = ConfigStore::new();
        store.set("boards.mega", "Arduino Mega");
        store.set("boards.mega.build.mcu", "atmega2560");

        let sub = extract_subtree(&store, "boards.mega");
        assert_eq!(sub.len(), 1);
        assert_eq!(sub.get("build.mcu"), Some("atmega2560"));
    }

    #[test]
    fn test_no_match_is_empty() {
        let mut store = ConfigStore::new();
        store.set("tools.avrdude.path", "/usr/bin/avrdude");

        let sub = extract_subtree(&store, "boards.mega");
        assert!(sub.is_empty());
    }

    #[test]
    fn test_sibling_prefix_not_matched() {
        // "boards.mega" must not match "boards.megaX.*"
        let mut store = ConfigStore::new();
        store.set("boards.megaX.build.mcu", "other");

        let sub = extract_subtree(&store, "boards.mega");
        assert!(sub.is_empty());
    }

    #[test]
    fn test_remerge_under_new_prefix_does_not_resurrect() {
        let mut store = ConfigStore::new();
        store.set("boards.mega.build.mcu", "atmega2560");

        let sub = extract_subtree(&store, "boards.mega");
        let mut target = ConfigStore::new();
        target.merge(&sub);

        assert_eq!(target.get("build.mcu"), Some("atmega2560"));
        assert!(target.get("boards.mega.build.mcu").is_none());
    }

    #[test]
    fn test_extract_from_overlay_sees_all_layers() {
        let mut base = ConfigStore::new();
        base.set("tools.avrdude.cmd.path", "/usr/bin/avrdude");

        let mut overlay = Overlay::over_store(&base);
        overlay.set("tools.avrdude.upload.verbose", "-v");

        let sub = extract_overlay_subtree(&overlay, "tools.avrdude");
        assert_eq!(sub.get("cmd.path"), Some("/usr/bin/avrdude"));
        assert_eq!(sub.get("upload.verbose"), Some("-v"));
    }
}
