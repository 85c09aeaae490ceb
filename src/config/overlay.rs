//! Layered read-through view over configuration stores.
//!
//! An overlay chains a mutable top layer over a borrowed parent. Reads
//! consult the top layer first and fall back to the parent on miss; writes
//! always land in the top layer, so a child never mutates what it was built
//! on. This replaces the eager deep-copy of the whole catalog with a pointer
//! indirection.

use super::store::ConfigStore;

/// The parent a layer falls back to on lookup miss.
#[derive(Debug)]
enum Parent<'a> {
    Store(&'a ConfigStore),
    Overlay(&'a Overlay<'a>),
}

/// A chain of configuration layers, most specific on top.
#[derive(Debug)]
pub struct Overlay<'a> {
    top: ConfigStore,
    parent: Option<Parent<'a>>,
}

impl<'a> Overlay<'a> {
    /// An overlay with no parent; lookups only see the top layer.
    pub fn new() -> Self {
        Self {
            top: ConfigStore::new(),
            parent: None,
        }
    }

    /// A new empty top layer backed by a store for fallback reads.
    pub fn over_store(parent: &'a ConfigStore) -> Self {
        Self {
            top: ConfigStore::new(),
            parent: Some(Parent::Store(parent)),
        }
    }

    /// A new empty top layer backed by another overlay.
    pub fn over(parent: &'a Overlay<'a>) -> Self {
        Self {
            top: ConfigStore::new(),
            parent: Some(Parent::Overlay(parent)),
        }
    }

    /// Layered lookup: top layer first, then the parent chain. `None` at
    /// the root means the key is undefined.
    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.top.get(key) {
            return Some(value);
        }
        match self.parent {
            Some(Parent::Store(store)) => store.get(key),
            Some(Parent::Overlay(overlay)) => overlay.get(key),
            None => None,
        }
    }

    /// Write to the top layer only.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.top.set(key, value);
    }

    /// Merge a store's entries into the top layer.
    pub fn merge(&mut self, source: &ConfigStore) {
        self.top.merge(source);
    }

    /// The mutable top layer's contents.
    pub fn top(&self) -> &ConfigStore {
        &self.top
    }

    /// Materialize the effective merged view: every key visible through
    /// layered lookup, with the top layer winning on collision.
    pub fn flatten(&self) -> ConfigStore {
        let mut out = ConfigStore::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut ConfigStore) {
        match self.parent {
            Some(Parent::Store(store)) => out.merge(store),
            Some(Parent::Overlay(overlay)) => overlay.collect_into(out),
            None => {}
        }
        out.merge(&self.top);
    }
}

impl Default for Overlay<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_to_parent() {
        let mut parent = ConfigStore::new();
        parent.set("upload.tool", "avrdude");

        let overlay = Overlay::over_store(&parent);
        assert_eq!(overlay.get("upload.tool"), Some("avrdude"));
        assert!(overlay.get("upload.speed").is_none());
    }

    #[test]
    fn test_child_set_shadows_without_mutating_parent() {
        let mut parent = ConfigStore::new();
        parent.set("upload.speed", "57600");

        let mut overlay = Overlay::over_store(&parent);
        overlay.set("upload.speed", "115200");

        assert_eq!(overlay.get("upload.speed"), Some("115200"));
        assert_eq!(parent.get("upload.speed"), Some("57600"));
    }

    #[test]
    fn test_chained_overlays() {
        let mut base = ConfigStore::new();
        base.set("a", "base");
        base.set("b", "base");
        base.set("c", "base");

        let mut mid = Overlay::over_store(&base);
        mid.set("b", "mid");

        let mut top = Overlay::over(&mid);
        top.set("c", "top");

        assert_eq!(top.get("a"), Some("base"));
        assert_eq!(top.get("b"), Some("mid"));
        assert_eq!(top.get("c"), Some("top"));
    }

    #[test]
    fn test_flatten_top_wins() {
        let mut base = ConfigStore::new();
        base.set("x", "1");
        base.set("y", "1");

        let mut overlay = Overlay::over_store(&base);
        overlay.set("y", "2");
        overlay.set("z", "2");

        let flat = overlay.flatten();
        assert_eq!(flat.get("x"), Some("1"));
        assert_eq!(flat.get("y"), Some("2"));
        assert_eq!(flat.get("z"), Some("2"));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn test_rootless_overlay() {
        let mut overlay = Overlay::new();
        assert!(overlay.get("k").is_none());
        overlay.set("k", "v");
        assert_eq!(overlay.get("k"), Some("v"));
    }
}
