use super::super::args::PackArgs;
use super::super::helpers::{bundle_path, write_bundle};
use crate::exit_codes;
use anyhow::{bail, Context};
use bundle_core::{Bundle, WriteOptions};
use std::path::{Path, PathBuf};

pub fn run(args: PackArgs) -> anyhow::Result<i32> {
    if !args.dir.is_dir() {
        bail!("not a directory: {}", args.dir.display());
    }

    let mut files = Vec::new();
    collect_files(&args.dir, &mut files)?;
    files.sort();

    let assets: Vec<String> = args.assets.iter().map(|p| bundle_path(p)).collect();
    let addons: Vec<String> = args.addons.iter().map(|p| bundle_path(p)).collect();
    let main = args.main.as_deref().map(bundle_path);

    let mut bundle = Bundle::new();
    bundle.set_id(args.id.clone());

    if let Some(path) = &args.imports {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read import map {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("invalid import map {}", path.display()))?;
        bundle
            .replace_imports(&value)
            .with_context(|| format!("invalid import map {}", path.display()))?;
    }

    for file in &files {
        let key = key_for(&args.dir, file)?;
        let data = std::fs::read(file)
            .with_context(|| format!("failed to read {}", file.display()))?;

        let mut options = WriteOptions::new();
        if let Some(mode) = file_mode(file)? {
            options = options.mode(mode);
        }
        if main.as_deref() == Some(key.as_str()) {
            options = options.main();
        }
        if assets.contains(&key) {
            options = options.asset();
        }
        if addons.contains(&key) {
            options = options.addon();
        }

        tracing::debug!(path = %key, bytes = data.len(), "adding file");
        bundle.write(key, data, &options)?;
    }

    for tagged in main.iter().chain(&assets).chain(&addons) {
        if !bundle.exists(tagged) {
            tracing::warn!(path = %tagged, "tagged path is not among the packed files");
        }
    }

    let written = write_bundle(&bundle, &args.out, &args.encode)?;
    eprintln!(
        "Packed {} files ({} bytes) into {}",
        bundle.len(),
        written,
        args.out.display()
    );
    Ok(exit_codes::EXIT_SUCCESS)
}

/// Every regular file below `dir`, following no symlinks.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        } else {
            tracing::warn!(path = %path.display(), "skipping non-regular file");
        }
    }
    Ok(())
}

/// `/`-rooted, `/`-separated key of `file` relative to `root`.
fn key_for(root: &Path, file: &Path) -> anyhow::Result<String> {
    let relative = file
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", file.display(), root.display()))?;

    let mut key = String::new();
    for component in relative.components() {
        let part = component
            .as_os_str()
            .to_str()
            .with_context(|| format!("path is not valid UTF-8: {}", file.display()))?;
        key.push('/');
        key.push_str(part);
    }
    Ok(key)
}

#[cfg(unix)]
fn file_mode(path: &Path) -> anyhow::Result<Option<u32>> {
    use std::os::unix::fs::PermissionsExt;

    let meta = std::fs::metadata(path)?;
    Ok(Some(meta.permissions().mode() & 0o777))
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> anyhow::Result<Option<u32>> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_for() {
        let root = Path::new("/tmp/app");
        assert_eq!(
            key_for(root, Path::new("/tmp/app/lib/foo.js")).unwrap(),
            "/lib/foo.js"
        );
        assert!(key_for(root, Path::new("/elsewhere/foo.js")).is_err());
    }

    #[test]
    fn test_collect_files_recurses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("top.js"), "x").unwrap();
        std::fs::write(dir.path().join("a/b/deep.js"), "y").unwrap();

        let mut files = Vec::new();
        collect_files(dir.path(), &mut files).unwrap();
        files.sort();

        let keys: Vec<_> = files
            .iter()
            .map(|f| key_for(dir.path(), f).unwrap())
            .collect();
        assert_eq!(keys, vec!["/a/b/deep.js", "/top.js"]);
    }
}
