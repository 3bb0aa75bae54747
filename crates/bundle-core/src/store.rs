//! Ordered path to file storage.
//!
//! Paths are opaque keys: no normalization happens here. Queries for unknown
//! paths return neutral values (`0`, `None`) instead of failing; use
//! [`FileStore::exists`] when existence matters.

use crate::file::BundleFile;
use bytes::Bytes;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct FileStore {
    files: IndexMap<String, Arc<dyn BundleFile>>,
}

impl FileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the file at `path`.
    ///
    /// A replaced path keeps its original insertion position.
    pub fn write(&mut self, path: impl Into<String>, file: Arc<dyn BundleFile>) {
        self.files.insert(path.into(), file);
    }

    pub fn read(&self, path: &str) -> Option<Bytes> {
        self.files.get(path).map(|f| f.read())
    }

    pub fn size(&self, path: &str) -> usize {
        self.files.get(path).map_or(0, |f| f.size())
    }

    pub fn mode(&self, path: &str) -> u32 {
        self.files.get(path).map_or(0, |f| f.mode())
    }

    pub fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// The file handle at `path`.
    pub fn get(&self, path: &str) -> Option<&Arc<dyn BundleFile>> {
        self.files.get(path)
    }

    /// Paths in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// `(path, contents, mode)` triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Bytes, u32)> {
        self.files
            .iter()
            .map(|(path, file)| (path.as_str(), file.read(), file.mode()))
    }

    /// `(path, handle)` pairs in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = (&str, &Arc<dyn BundleFile>)> {
        self.files.iter().map(|(path, file)| (path.as_str(), file))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all file sizes.
    pub fn total_size(&self) -> usize {
        self.files.values().map(|f| f.size()).sum()
    }
}
