//! Rewriting every path in a bundle against a deployment root.
//!
//! `main`, file keys, addons, assets and resolution keys resolve against the
//! root. Import map leaves resolve against the root of the first key on their
//! path that names a configured condition, else against the `default`
//! condition, else against the root:
//!
//! ```text
//! conditions = { asset: file:///assets/ }
//!
//! { bar: { asset: "/bar.txt", default: "/bar.js" } }
//!   -> { bar: { asset: "file:///assets/bar.txt", default: "file:///dir/bar.js" } }
//! ```

use crate::bundle::{Bundle, WriteOptions};
use crate::error::BundleResult;
use crate::specifier::{check_root, mount_specifier, unmount_specifier};
use crate::tree::{Resolutions, TreeMap};
use indexmap::IndexMap;
use url::Url;

/// Condition name consulted when no condition on the key path matches.
pub const DEFAULT_CONDITION: &str = "default";

/// Per-condition root overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountOptions {
    pub conditions: IndexMap<String, Url>,
}

impl MountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, name: impl Into<String>, root: Url) -> Self {
        self.conditions.insert(name.into(), root);
        self
    }

    /// Root for an import map leaf reached through `path`.
    fn root_for<'a>(&'a self, path: &[String], root: &'a Url) -> &'a Url {
        path.iter()
            .find_map(|key| self.conditions.get(key))
            .or_else(|| self.conditions.get(DEFAULT_CONDITION))
            .unwrap_or(root)
    }

    fn check(&self, root: &Url) -> BundleResult<()> {
        check_root(root)?;
        self.conditions.values().try_for_each(check_root)
    }
}

type Rewrite = fn(&str, &Url) -> BundleResult<String>;

impl Bundle {
    /// Return a copy of this bundle with every path resolved against `root`.
    ///
    /// File handles are shared with the receiver, which is left untouched.
    pub fn mount(&self, root: &Url, options: &MountOptions) -> BundleResult<Bundle> {
        let mounted = self.rewrite(root, options, mount_specifier)?;
        tracing::debug!(root = %root, files = mounted.len(), "mounted bundle");
        Ok(mounted)
    }

    /// Inverse of [`mount`](Self::mount): turn URLs below `root` (or below a
    /// condition root) back into `/`-rooted paths.
    pub fn unmount(&self, root: &Url, options: &MountOptions) -> BundleResult<Bundle> {
        let unmounted = self.rewrite(root, options, unmount_specifier)?;
        tracing::debug!(root = %root, files = unmounted.len(), "unmounted bundle");
        Ok(unmounted)
    }

    fn rewrite(&self, root: &Url, options: &MountOptions, f: Rewrite) -> BundleResult<Bundle> {
        options.check(root)?;

        let map_tree = |tree: &TreeMap| -> BundleResult<TreeMap> {
            tree.try_map_leaves(|path, leaf| f(leaf, options.root_for(path, root)))
        };

        let mut out = self.empty_like();
        out.id = self.id.clone();
        out.main = self.main.as_deref().map(|main| f(main, root)).transpose()?;
        out.imports = map_tree(&self.imports)?;
        out.resolutions = self
            .resolutions
            .iter()
            .map(|(path, tree)| -> BundleResult<(String, TreeMap)> {
                Ok((f(path, root)?, map_tree(tree)?))
            })
            .collect::<BundleResult<Resolutions>>()?;
        out.addons = self
            .addons
            .iter()
            .map(|path| f(path, root))
            .collect::<BundleResult<_>>()?;
        out.assets = self
            .assets
            .iter()
            .map(|path| f(path, root))
            .collect::<BundleResult<_>>()?;

        for (path, file) in self.files.handles() {
            out.write_file(f(path, root)?, file.clone(), &WriteOptions::new())?;
        }

        Ok(out)
    }
}
