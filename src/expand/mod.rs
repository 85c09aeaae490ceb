//! Recursive `{key}` placeholder expansion.
//!
//! A template value may reference other keys with `{name}` placeholders;
//! each referent is itself expanded before substitution. Expansion is total:
//! either every placeholder resolves to a placeholder-free value or the
//! operation fails. There are no conditionals, loops, or escapes — only key
//! substitution.

use regex_lite::Regex;
use thiserror::Error;

use crate::config::Overlay;

/// Hard cap on expansion depth, independent of cycle detection. Guards
/// against a missed-cycle bug masquerading as a very long legitimate chain.
pub const MAX_EXPANSION_DEPTH: usize = 64;

/// Placeholder syntax: `{dotted.key}`.
const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z0-9_][A-Za-z0-9_.\-]*)\}";

/// Errors from template expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// A template key or placeholder referent is undefined in the overlay.
    #[error("undefined configuration key \"{0}\"")]
    MissingKey(String),

    /// Expansion revisited a key already being expanded.
    #[error("cyclic reference: {}", .0.join(" -> "))]
    CyclicReference(Vec<String>),

    /// Expansion exceeded [`MAX_EXPANSION_DEPTH`].
    #[error("expansion depth limit exceeded while expanding \"{0}\"")]
    RecursionLimit(String),
}

/// Expands `{key}` placeholders against a layered overlay.
#[derive(Debug)]
pub struct Expander {
    placeholder: Regex,
}

impl Expander {
    pub fn new() -> Self {
        // Static pattern, cannot fail to compile.
        Self {
            placeholder: Regex::new(PLACEHOLDER_PATTERN).unwrap(),
        }
    }

    /// Look up `key` in the overlay and fully expand its value.
    pub fn expand_key(&self, overlay: &Overlay<'_>, key: &str) -> Result<String, ExpandError> {
        let raw = overlay
            .get(key)
            .ok_or_else(|| ExpandError::MissingKey(key.to_string()))?
            .to_string();
        let mut stack = vec![key.to_string()];
        self.expand_text(overlay, &raw, &mut stack)
    }

    /// Fully expand a literal template string.
    pub fn expand_literal(
        &self,
        overlay: &Overlay<'_>,
        template: &str,
    ) -> Result<String, ExpandError> {
        let mut stack = Vec::new();
        self.expand_text(overlay, template, &mut stack)
    }

    /// Substitute every placeholder in `text`, recursively expanding each
    /// referent. `stack` holds the keys currently being expanded on the
    /// active call path; revisiting one of them is a cycle.
    fn expand_text(
        &self,
        overlay: &Overlay<'_>,
        text: &str,
        stack: &mut Vec<String>,
    ) -> Result<String, ExpandError> {
        if stack.len() > MAX_EXPANSION_DEPTH {
            let key = stack.last().cloned().unwrap_or_default();
            return Err(ExpandError::RecursionLimit(key));
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.placeholder.captures_iter(text) {
            // Capture 0 always exists when captures_iter yields.
            let span = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let name = &caps[1];
            out.push_str(&text[last..span.start()]);

            if stack.iter().any(|k| k == name) {
                let mut chain = stack.clone();
                chain.push(name.to_string());
                return Err(ExpandError::CyclicReference(chain));
            }

            let value = overlay
                .get(name)
                .ok_or_else(|| ExpandError::MissingKey(name.to_string()))?
                .to_string();
            stack.push(name.to_string());
            let expanded = self.expand_text(overlay, &value, stack)?;
            stack.pop();

            out.push_str(&expanded);
            last = span.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl Default for Expander {
    fn default() -> Self {
        Self::new()
    }
}
