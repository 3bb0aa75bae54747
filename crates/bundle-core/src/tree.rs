//! Import and resolution maps.
//!
//! Both maps are condition trees: string keys mapping either to a path
//! (leaf) or to a nested tree. Key order is insertion order and is preserved
//! through encode and decode, since loaders match conditions in order.
//!
//! ```text
//! imports:     { "bar": "/bar.js", "baz": { "asset": "/baz.txt", "default": "/baz.js" } }
//! resolutions: { "/foo.js": { "bar": { "asset": "/bar.txt" } } }
//! ```

use crate::error::{describe, BundleError, BundleResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node of a condition tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf(String),
    Branch(TreeMap),
}

impl TreeNode {
    /// Validate and deep-clone a JSON value into a tree node.
    ///
    /// Strings become leaves, objects become branches; anything else fails.
    pub fn from_value(value: &Value) -> BundleResult<Self> {
        match value {
            Value::String(s) => Ok(Self::Leaf(s.clone())),
            Value::Object(_) => TreeMap::clone_object(value, "Imports map entry").map(Self::Branch),
            other => Err(BundleError::invalid_argument(format!(
                "Imports map entry must be a string or object. Received type {}",
                describe(other)
            ))),
        }
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(s) => Some(s),
            Self::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&TreeMap> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch(map) => Some(map),
        }
    }

    /// Depth of this node; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Branch(map) => map.depth(),
        }
    }

    /// Rewrite every leaf, passing the leaf together with the key path
    /// leading to it.
    pub(crate) fn try_map_leaves<F>(&self, path: &mut Vec<String>, f: &mut F) -> BundleResult<Self>
    where
        F: FnMut(&[String], &str) -> BundleResult<String>,
    {
        match self {
            Self::Leaf(s) => f(path, s).map(Self::Leaf),
            Self::Branch(map) => map.try_map_leaves_at(path, f).map(Self::Branch),
        }
    }
}

impl From<&str> for TreeNode {
    fn from(value: &str) -> Self {
        Self::Leaf(value.to_string())
    }
}

impl From<String> for TreeNode {
    fn from(value: String) -> Self {
        Self::Leaf(value)
    }
}

impl From<TreeMap> for TreeNode {
    fn from(value: TreeMap) -> Self {
        Self::Branch(value)
    }
}

impl From<&TreeNode> for Value {
    fn from(node: &TreeNode) -> Self {
        match node {
            TreeNode::Leaf(s) => Value::String(s.clone()),
            TreeNode::Branch(map) => Value::from(map),
        }
    }
}

/// An insertion-ordered condition tree (the `imports` map).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeMap(IndexMap<String, TreeNode>);

impl TreeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and deep-clone a JSON object into a tree.
    ///
    /// The input is never mutated; on error nothing is returned.
    pub fn from_value(value: &Value) -> BundleResult<Self> {
        Self::clone_object(value, "Imports map")
    }

    fn clone_object(value: &Value, what: &str) -> BundleResult<Self> {
        let Value::Object(object) = value else {
            return Err(BundleError::invalid_argument(format!(
                "{what} must be an object. Received type {}",
                describe(value)
            )));
        };

        let mut map = IndexMap::with_capacity(object.len());
        for (key, entry) in object {
            map.insert(key.clone(), TreeNode::from_value(entry)?);
        }

        Ok(Self(map))
    }

    /// Insert or replace an entry, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<TreeNode>) -> Option<TreeNode> {
        self.0.insert(key.into(), node.into())
    }

    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<TreeNode> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, TreeNode> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Nesting depth; an empty or all-leaf map has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.0.values().map(TreeNode::depth).max().unwrap_or(0)
    }

    /// Collect every leaf value, depth first in key order.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    /// Rewrite every leaf. `f` receives the key path from the root of this
    /// map to the leaf, and the leaf itself.
    pub fn try_map_leaves<F>(&self, mut f: F) -> BundleResult<Self>
    where
        F: FnMut(&[String], &str) -> BundleResult<String>,
    {
        self.try_map_leaves_at(&mut Vec::new(), &mut f)
    }

    fn try_map_leaves_at<F>(&self, path: &mut Vec<String>, f: &mut F) -> BundleResult<Self>
    where
        F: FnMut(&[String], &str) -> BundleResult<String>,
    {
        let mut out = IndexMap::with_capacity(self.0.len());
        for (key, node) in &self.0 {
            path.push(key.clone());
            let mapped = node.try_map_leaves(path, f);
            path.pop();
            out.insert(key.clone(), mapped?);
        }
        Ok(Self(out))
    }
}

fn collect_leaves<'a>(map: &'a TreeMap, out: &mut Vec<&'a str>) {
    for node in map.0.values() {
        match node {
            TreeNode::Leaf(s) => out.push(s),
            TreeNode::Branch(inner) => collect_leaves(inner, out),
        }
    }
}

impl From<&TreeMap> for Value {
    fn from(map: &TreeMap) -> Self {
        Value::Object(map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect())
    }
}

impl<K: Into<String>, V: Into<TreeNode>> FromIterator<(K, V)> for TreeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a TreeMap {
    type Item = (&'a String, &'a TreeNode);
    type IntoIter = indexmap::map::Iter<'a, String, TreeNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-file import maps (the `resolutions` map): file path to condition tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resolutions(IndexMap<String, TreeMap>);

impl Resolutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and deep-clone a JSON object of import maps.
    pub fn from_value(value: &Value) -> BundleResult<Self> {
        let Value::Object(object) = value else {
            return Err(BundleError::invalid_argument(format!(
                "Resolutions map must be an object. Received type {}",
                describe(value)
            )));
        };

        let mut map = IndexMap::with_capacity(object.len());
        for (key, entry) in object {
            map.insert(key.clone(), TreeMap::from_value(entry)?);
        }

        Ok(Self(map))
    }

    pub fn insert(&mut self, path: impl Into<String>, imports: TreeMap) -> Option<TreeMap> {
        self.0.insert(path.into(), imports)
    }

    pub fn get(&self, path: &str) -> Option<&TreeMap> {
        self.0.get(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<TreeMap> {
        self.0.shift_remove(path)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, TreeMap> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, TreeMap)> for Resolutions {
    fn from_iter<I: IntoIterator<Item = (String, TreeMap)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Resolutions {
    type Item = (&'a String, &'a TreeMap);
    type IntoIter = indexmap::map::Iter<'a, String, TreeMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Validate and clone a JSON array of path strings (`addons` / `assets`).
///
/// `name` is used in error messages.
pub fn files_list_from_value(value: &Value, name: &str) -> BundleResult<Vec<String>> {
    let Value::Array(entries) = value else {
        return Err(BundleError::invalid_argument(format!(
            "{name} list must be an array. Received type {}",
            describe(value)
        )));
    };

    entries
        .iter()
        .map(|entry| match entry {
            Value::String(s) => Ok(s.clone()),
            other => Err(BundleError::invalid_argument(format!(
                "{name} entry must be a string. Received type {}",
                describe(other)
            ))),
        })
        .collect()
}
