//! Resource limits applied while decoding untrusted buffers.

use serde::Deserialize;
use serde_json::Value;

/// Resource limits for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_header_bytes: u64,
    pub max_files: usize,
    pub max_tree_depth: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_header_bytes: 64 * 1024 * 1024, // 64 MB
            max_files: 1_000_000,
            max_tree_depth: 64,
        }
    }
}

impl DecodeLimits {
    /// No limits at all, for buffers produced by this process.
    pub fn unlimited() -> Self {
        Self {
            max_header_bytes: u64::MAX,
            max_files: usize::MAX,
            max_tree_depth: usize::MAX,
        }
    }

    /// Apply overrides onto these defaults. Only `Some` values override.
    pub fn apply(self, overrides: DecodeLimitsOverrides) -> Self {
        Self {
            max_header_bytes: overrides.max_header_bytes.unwrap_or(self.max_header_bytes),
            max_files: overrides.max_files.unwrap_or(self.max_files),
            max_tree_depth: overrides.max_tree_depth.unwrap_or(self.max_tree_depth),
        }
    }
}

/// Partial overrides for `DecodeLimits`. Used for CLI/config JSON parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecodeLimitsOverrides {
    pub max_header_bytes: Option<u64>,
    pub max_files: Option<usize>,
    pub max_tree_depth: Option<usize>,
}

/// Nesting depth of a JSON value; scalars have depth 0.
pub(crate) fn json_depth(value: &Value) -> usize {
    match value {
        Value::Object(map) => 1 + map.values().map(json_depth).max().unwrap_or(0),
        Value::Array(items) => 1 + items.iter().map(json_depth).max().unwrap_or(0),
        _ => 0,
    }
}
