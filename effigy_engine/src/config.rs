// Configuration access and load diagnostics.
//
// The engine consumes configuration as an already-parsed `serde_json::Value`
// tree; how that tree got parsed (and from what file format) is the host's
// concern. `ConfigSection` wraps a node in the tree with typed accessors
// that fall back to defaults and record a warning when a value is present
// but the wrong type — a misconfigured entry should degrade, never abort
// the load.
//
// `Diagnostics` is the warning sink threaded through every load path. The
// host hands one to `ArchetypeRegistry::load` and renders the collected
// warnings however it likes; each warning is also mirrored to `log::warn!`
// so embedding hosts with a logger configured see problems immediately.
//
// `ConfigError` is internal plumbing: entry loaders bail out with `?` and
// the per-entry loop converts the error into a diagnostic and moves on to
// the next entry. Nothing in the load path panics or returns `Err` to the
// host.
//
// See also: `shape.rs` and `archetype.rs` for the entry loaders,
// `registry.rs` for the top-level section walk.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A single load-time warning: where it happened and what went wrong.
#[derive(Clone, Debug, Serialize)]
pub struct Warning {
    /// Configuration path of the offending entry, e.g. `shapes.Obelisk.body[2]`.
    pub context: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.message)
    }
}

/// Collects non-fatal warnings during configuration loading and spawning.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and mirror it to the `log` facade.
    pub fn warn(&mut self, context: impl Into<String>, message: impl fmt::Display) {
        let warning = Warning {
            context: context.into(),
            message: message.to_string(),
        };
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Internal load errors
// ---------------------------------------------------------------------------

/// Why a configuration entry could not be loaded. Always converted into a
/// `Diagnostics` warning by the caller; never escapes a public load API.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required value `{key}`")]
    Missing { key: String },
    #[error("`{key}` is not a valid {expected}")]
    Invalid { key: String, expected: &'static str },
    #[error("{0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// ConfigSection
// ---------------------------------------------------------------------------

/// A node in the configuration tree plus the path that led to it.
///
/// Accessors are tolerant: a missing key yields the default silently, a
/// present-but-wrong-typed value yields the default with a warning. This
/// mirrors how entries behave everywhere in the engine: the bad value is
/// dropped, the rest of the entry survives.
#[derive(Clone, Copy)]
pub struct ConfigSection<'a> {
    value: &'a Value,
    path: &'a str,
}

impl<'a> ConfigSection<'a> {
    pub fn new(value: &'a Value, path: &'a str) -> Self {
        Self { value, path }
    }

    pub fn path(&self) -> &str {
        self.path
    }

    /// Raw child value, if this node is an object and the key exists.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.value.as_object().and_then(|map| map.get(key))
    }

    /// Object keys in file order (empty for non-objects). File order is
    /// load-bearing for shapes: earlier entries win ties during matching.
    pub fn keys(&self) -> Vec<&'a str> {
        match self.value.as_object() {
            Some(map) => map.keys().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }

    /// Child object as a section; `None` if missing or not an object.
    pub fn child_object(&self, key: &str) -> Option<&'a Value> {
        self.get(key).filter(|v| v.is_object())
    }

    /// Child list; `None` if missing or not a list.
    pub fn list(&self, key: &str) -> Option<&'a Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    // -- typed accessors ----------------------------------------------------

    pub fn opt_str(&self, key: &str, diags: &mut Diagnostics) -> Option<String> {
        match self.get(key) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.wrong_type(key, "a string", diags);
                None
            }
        }
    }

    pub fn str_or(&self, key: &str, default: &str, diags: &mut Diagnostics) -> String {
        self.opt_str(key, diags)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn opt_f64(&self, key: &str, diags: &mut Diagnostics) -> Option<f64> {
        match self.get(key) {
            None => None,
            // An integer in the file is fine; tolerate and widen.
            Some(v) => match v.as_f64() {
                Some(n) => Some(n),
                None => {
                    self.wrong_type(key, "a number", diags);
                    None
                }
            },
        }
    }

    pub fn f64_or(&self, key: &str, default: f64, diags: &mut Diagnostics) -> f64 {
        self.opt_f64(key, diags).unwrap_or(default)
    }

    pub fn opt_i64(&self, key: &str, diags: &mut Diagnostics) -> Option<i64> {
        match self.get(key) {
            None => None,
            Some(v) => match v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)) {
                Some(n) => Some(n),
                None => {
                    self.wrong_type(key, "an integer", diags);
                    None
                }
            },
        }
    }

    pub fn i64_or(&self, key: &str, default: i64, diags: &mut Diagnostics) -> i64 {
        self.opt_i64(key, diags).unwrap_or(default)
    }

    pub fn opt_bool(&self, key: &str, diags: &mut Diagnostics) -> Option<bool> {
        match self.get(key) {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.wrong_type(key, "a boolean", diags);
                None
            }
        }
    }

    pub fn bool_or(&self, key: &str, default: bool, diags: &mut Diagnostics) -> bool {
        self.opt_bool(key, diags).unwrap_or(default)
    }

    /// A list of strings; non-string elements are warned and skipped.
    pub fn opt_str_list(&self, key: &str, diags: &mut Diagnostics) -> Option<Vec<String>> {
        let list = self.list(key)?;
        let mut out = Vec::with_capacity(list.len());
        for (i, entry) in list.iter().enumerate() {
            match entry.as_str() {
                Some(s) => out.push(s.to_string()),
                None => diags.warn(
                    format!("{}.{key}[{i}]", self.path),
                    "expected a string; skipping",
                ),
            }
        }
        Some(out)
    }

    fn wrong_type(&self, key: &str, expected: &str, diags: &mut Diagnostics) {
        diags.warn(
            format!("{}.{key}", self.path),
            format!("expected {expected}; using default"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_key_yields_default_without_warning() {
        let value = json!({ "present": 1 });
        let section = ConfigSection::new(&value, "test");
        let mut diags = Diagnostics::new();
        assert_eq!(section.i64_or("absent", 7, &mut diags), 7);
        assert!(diags.is_empty());
    }

    #[test]
    fn wrong_type_yields_default_with_warning() {
        let value = json!({ "health": "lots" });
        let section = ConfigSection::new(&value, "creatures.Brute");
        let mut diags = Diagnostics::new();
        assert_eq!(section.i64_or("health", 20, &mut diags), 20);
        assert_eq!(diags.len(), 1);
        assert!(diags.warnings()[0].context.contains("creatures.Brute.health"));
    }

    #[test]
    fn integers_widen_to_f64() {
        let value = json!({ "weight": 3 });
        let section = ConfigSection::new(&value, "t");
        let mut diags = Diagnostics::new();
        assert_eq!(section.f64_or("weight", 1.0, &mut diags), 3.0);
        assert!(diags.is_empty());
    }

    #[test]
    fn keys_preserve_file_order() {
        let value: Value = serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let section = ConfigSection::new(&value, "");
        assert_eq!(section.keys(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn str_list_skips_non_strings() {
        let value = json!({ "shapes": ["Statue", 4, "Obelisk"] });
        let section = ConfigSection::new(&value, "identities.Alice");
        let mut diags = Diagnostics::new();
        let list = section.opt_str_list("shapes", &mut diags).unwrap();
        assert_eq!(list, vec!["Statue".to_string(), "Obelisk".to_string()]);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn config_error_messages_read_naturally() {
        let missing = ConfigError::Missing {
            key: "offset".to_string(),
        };
        assert_eq!(missing.to_string(), "missing required value `offset`");
        let invalid = ConfigError::Invalid {
            key: "cheese_block".to_string(),
            expected: "block type",
        };
        assert_eq!(invalid.to_string(), "`cheese_block` is not a valid block type");
    }
}
