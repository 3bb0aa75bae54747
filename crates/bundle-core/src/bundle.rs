//! The bundle aggregate: files plus entry point, import maps and
//! addon/asset classification.
//!
//! # Example
//!
//! ```
//! use bundle_core::{Bundle, WriteOptions};
//!
//! let mut bundle = Bundle::new();
//! bundle
//!     .write("/foo.js", "foo", &WriteOptions::new().main())?
//!     .write("/bar.js", "bar", &WriteOptions::new().alias("bar"))?;
//!
//! assert_eq!(bundle.main(), Some("/foo.js"));
//! assert_eq!(bundle.read("/bar.js").as_deref(), Some(&b"bar"[..]));
//! # Ok::<(), bundle_core::BundleError>(())
//! ```

use crate::error::{describe, BundleError, BundleResult};
use crate::file::{memory_file_factory, BundleFile, FileFactory, FileOptions};
use crate::store::FileStore;
use crate::tree::{files_list_from_value, Resolutions, TreeMap, TreeNode};
use bytes::Bytes;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Format version written to and expected in every bundle header.
pub const VERSION: u32 = 0;

/// Tags applied to a path by [`Bundle::write`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Make the path the bundle's entry point.
    pub main: bool,
    /// Record `imports[alias] = path`.
    pub alias: Option<String>,
    /// Import map stored as `resolutions[path]`.
    pub imports: Option<TreeMap>,
    pub addon: bool,
    pub asset: bool,
    pub executable: bool,
    /// Explicit mode, overriding the `executable` default.
    pub mode: Option<u32>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn main(mut self) -> Self {
        self.main = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn imports(mut self, imports: TreeMap) -> Self {
        self.imports = Some(imports);
        self
    }

    pub fn addon(mut self) -> Self {
        self.addon = true;
        self
    }

    pub fn asset(mut self) -> Self {
        self.asset = true;
        self
    }

    pub fn executable(mut self) -> Self {
        self.executable = true;
        self
    }

    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    fn file_options(&self) -> FileOptions {
        FileOptions {
            executable: self.executable,
            mode: self.mode,
        }
    }
}

/// A set of files plus the metadata needed to load them as one program.
#[derive(Clone)]
pub struct Bundle {
    factory: FileFactory,
    pub(crate) id: Option<String>,
    pub(crate) main: Option<String>,
    pub(crate) imports: TreeMap,
    pub(crate) resolutions: Resolutions,
    pub(crate) addons: Vec<String>,
    pub(crate) assets: Vec<String>,
    pub(crate) files: FileStore,
}

impl Default for Bundle {
    fn default() -> Self {
        Self::with_file_factory(memory_file_factory())
    }
}

impl Bundle {
    /// Create an empty bundle storing files in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bundle whose `write` calls build files with `factory`.
    pub fn with_file_factory(factory: FileFactory) -> Self {
        Self {
            factory,
            id: None,
            main: None,
            imports: TreeMap::new(),
            resolutions: Resolutions::new(),
            addons: Vec::new(),
            assets: Vec::new(),
            files: FileStore::new(),
        }
    }

    /// An empty bundle sharing this bundle's file factory.
    pub(crate) fn empty_like(&self) -> Self {
        Self::with_file_factory(self.factory.clone())
    }

    pub fn version(&self) -> u32 {
        VERSION
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    /// Replace `id` from a dynamic value (string or null).
    pub fn replace_id(&mut self, value: &Value) -> BundleResult<()> {
        self.id = optional_string(value, "ID")?;
        Ok(())
    }

    pub fn main(&self) -> Option<&str> {
        self.main.as_deref()
    }

    pub fn set_main(&mut self, main: Option<String>) {
        self.main = main;
    }

    /// Replace `main` from a dynamic value (string or null).
    pub fn replace_main(&mut self, value: &Value) -> BundleResult<()> {
        self.main = optional_string(value, "Main")?;
        Ok(())
    }

    pub fn imports(&self) -> &TreeMap {
        &self.imports
    }

    pub fn set_imports(&mut self, imports: TreeMap) {
        self.imports = imports;
    }

    /// Replace `imports` from a dynamic value, validating the whole tree
    /// before anything is assigned.
    pub fn replace_imports(&mut self, value: &Value) -> BundleResult<()> {
        self.imports = TreeMap::from_value(value)?;
        Ok(())
    }

    pub fn resolutions(&self) -> &Resolutions {
        &self.resolutions
    }

    pub fn set_resolutions(&mut self, resolutions: Resolutions) {
        self.resolutions = resolutions;
    }

    /// Replace `resolutions` from a dynamic value.
    pub fn replace_resolutions(&mut self, value: &Value) -> BundleResult<()> {
        self.resolutions = Resolutions::from_value(value)?;
        Ok(())
    }

    pub fn addons(&self) -> &[String] {
        &self.addons
    }

    pub fn set_addons(&mut self, addons: Vec<String>) {
        self.addons = addons;
    }

    /// Replace `addons` from a dynamic value (array of strings).
    pub fn replace_addons(&mut self, value: &Value) -> BundleResult<()> {
        self.addons = files_list_from_value(value, "Addons")?;
        Ok(())
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn set_assets(&mut self, assets: Vec<String>) {
        self.assets = assets;
    }

    /// Replace `assets` from a dynamic value (array of strings).
    pub fn replace_assets(&mut self, value: &Value) -> BundleResult<()> {
        self.assets = files_list_from_value(value, "Assets")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// Paths in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys()
    }

    /// `(path, contents, mode)` triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Bytes, u32)> {
        self.files.iter()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.files.exists(path)
    }

    /// Size of the file at `path`, `0` if there is none.
    pub fn size(&self, path: &str) -> usize {
        self.files.size(path)
    }

    /// Mode of the file at `path`, `0` if there is none.
    pub fn mode(&self, path: &str) -> u32 {
        self.files.mode(path)
    }

    /// Contents of the file at `path`, `None` if there is none.
    pub fn read(&self, path: &str) -> Option<Bytes> {
        self.files.read(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if the bundle holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write a file, creating it with this bundle's file factory.
    ///
    /// Rewriting a path replaces its file but leaves earlier tags (main,
    /// alias, addon, asset) referencing it in place.
    pub fn write(
        &mut self,
        path: impl Into<String>,
        data: impl Into<Bytes>,
        options: &WriteOptions,
    ) -> BundleResult<&mut Self> {
        let path = path.into();
        check_path(&path)?;

        let file = (self.factory)(data.into(), options.file_options().resolve_mode());
        self.insert(path, file, options);
        Ok(self)
    }

    /// Write an existing file handle. `options.executable` and
    /// `options.mode` are ignored; the handle reports its own mode.
    pub fn write_file(
        &mut self,
        path: impl Into<String>,
        file: Arc<dyn BundleFile>,
        options: &WriteOptions,
    ) -> BundleResult<&mut Self> {
        let path = path.into();
        check_path(&path)?;

        self.insert(path, file, options);
        Ok(self)
    }

    fn insert(&mut self, path: String, file: Arc<dyn BundleFile>, options: &WriteOptions) {
        if options.main {
            self.main = Some(path.clone());
        }
        if let Some(alias) = options.alias.as_deref().filter(|a| !a.is_empty()) {
            self.imports.insert(alias, TreeNode::Leaf(path.clone()));
        }
        if let Some(imports) = &options.imports {
            self.resolutions.insert(path.clone(), imports.clone());
        }
        if options.addon {
            self.addons.push(path.clone());
        }
        if options.asset {
            self.assets.push(path.clone());
        }

        self.files.write(path, file);
    }
}

fn check_path(path: &str) -> BundleResult<()> {
    if path.is_empty() {
        return Err(BundleError::invalid_argument(
            "File path must be a non-empty string",
        ));
    }
    Ok(())
}

fn optional_string(value: &Value, name: &str) -> BundleResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(BundleError::invalid_argument(format!(
            "{name} must be a string or null. Received type {}",
            describe(other)
        ))),
    }
}

fn sorted(list: &[String]) -> Vec<&String> {
    let mut list: Vec<_> = list.iter().collect();
    list.sort();
    list
}

/// Bundles are equal when their metadata matches, `addons`/`assets` hold the
/// same paths in any order, and the same paths map to the same contents and
/// modes regardless of insertion order.
impl PartialEq for Bundle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.main == other.main
            && self.imports == other.imports
            && self.resolutions == other.resolutions
            && sorted(&self.addons) == sorted(&other.addons)
            && sorted(&self.assets) == sorted(&other.assets)
            && self.files.len() == other.files.len()
            && self.files.handles().all(|(path, file)| {
                other.files.get(path).is_some_and(|theirs| {
                    theirs.mode() == file.mode() && theirs.read() == file.read()
                })
            })
    }
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("id", &self.id)
            .field("main", &self.main)
            .field("imports", &self.imports)
            .field("resolutions", &self.resolutions)
            .field("addons", &self.addons)
            .field("assets", &self.assets)
            .field("files", &self.files)
            .finish()
    }
}
