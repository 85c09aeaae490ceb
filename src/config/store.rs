//! Flat configuration store keyed by dotted paths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered mapping from dotted hierarchical keys to string values.
///
/// Keys are case-sensitive and segment-separated by `.`
/// (e.g., `boards.mega.menu.cpu.atmega2560.upload.speed`). Values stay
/// strings until a consumer interprets them; the store never coerces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigStore {
    entries: BTreeMap<String, String>,
}

impl ConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact dotted-key lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether an exact key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Upsert; silently overwrites an existing value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Copy every entry from `source` into this store, overwriting on
    /// collision. Merge order is caller-controlled; the later merge wins.
    pub fn merge(&mut self, source: &ConfigStore) {
        for (key, value) in &source.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Iterate entries whose key starts with `prefix`, in key order.
    ///
    /// The iterator is lazy and restartable; order is stable for a given
    /// store instance.
    pub fn keys_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.entries
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut store = ConfigStore::new();
        assert!(store.get("boards.mega.build.mcu").is_none());

        store.set("boards.mega.build.mcu", "atmega2560");
        assert_eq!(store.get("boards.mega.build.mcu"), Some("atmega2560"));
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = ConfigStore::new();
        store.set("upload.speed", "57600");
        store.set("upload.speed", "115200");
        assert_eq!(store.get("upload.speed"), Some("115200"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = ConfigStore::new();
        base.set("upload.tool", "avrdude");
        base.set("upload.speed", "57600");

        let mut overlay = ConfigStore::new();
        overlay.set("upload.speed", "115200");
        overlay.set("upload.protocol", "wiring");

        base.merge(&overlay);

        assert_eq!(base.get("upload.tool"), Some("avrdude"));
        assert_eq!(base.get("upload.speed"), Some("115200"));
        assert_eq!(base.get("upload.protocol"), Some("wiring"));
    }

    #[test]
    fn test_keys_with_prefix() {
        let mut store = ConfigStore::new();
        store.set("boards.mega.name", "Arduino Mega");
        store.set("boards.mega.build.mcu", "atmega2560");
        store.set("boards.uno.name", "Arduino Uno");
        store.set("tools.avrdude.path", "/usr/bin/avrdude");

        let hits: Vec<_> = store.keys_with_prefix("boards.mega.").collect();
        assert_eq!(
            hits,
            vec![
                ("boards.mega.build.mcu", "atmega2560"),
                ("boards.mega.name", "Arduino Mega"),
            ]
        );
    }

    #[test]
    fn test_keys_with_prefix_empty() {
        let store = ConfigStore::new();
        assert_eq!(store.keys_with_prefix("boards.").count(), 0);
    }

    #[test]
    fn test_iteration_order_stable() {
        let mut store = ConfigStore::new();
        store.set("b", "2");
        store.set("a", "1");
        store.set("c", "3");

        let first: Vec<_> = store.iter().map(|(k, _)| k.to_string()).collect();
        let second: Vec<_> = store.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "b", "c"]);
    }
}
