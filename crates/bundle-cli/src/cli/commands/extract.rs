use super::super::args::ExtractArgs;
use super::super::helpers::read_bundle;
use crate::exit_codes;
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};

pub fn run(args: ExtractArgs) -> anyhow::Result<i32> {
    let (bundle, _) = read_bundle(&args.bundle, &args.decode)?;

    // Validate every target before touching the filesystem
    let targets = bundle
        .keys()
        .map(|key| -> anyhow::Result<_> { Ok((key, target_for(&args.dir, key)?)) })
        .collect::<anyhow::Result<Vec<_>>>()?;

    for (key, target) in &targets {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let data = bundle.read(key).unwrap_or_default();
        std::fs::write(target, &data)
            .with_context(|| format!("failed to write {}", target.display()))?;
        set_mode(target, bundle.mode(key))?;

        tracing::debug!(path = %key, target = %target.display(), "extracted file");
    }

    eprintln!(
        "Extracted {} files into {}",
        targets.len(),
        args.dir.display()
    );
    Ok(exit_codes::EXIT_SUCCESS)
}

/// Map a `/`-rooted bundle path below `dir`, rejecting anything that would
/// escape it.
fn target_for(dir: &Path, key: &str) -> anyhow::Result<PathBuf> {
    let Some(relative) = key.strip_prefix('/') else {
        bail!("cannot extract '{key}': only /-rooted paths can be extracted (is the bundle mounted?)");
    };

    let mut target = dir.to_path_buf();
    for part in relative.split('/') {
        match part {
            "" | "." => continue,
            ".." => bail!("refusing to extract '{key}': path escapes the target directory"),
            _ if part.contains('\\') || part.contains(':') => {
                bail!("refusing to extract '{key}': unsupported character in path")
            }
            _ => target.push(part),
        }
    }

    if target == dir {
        bail!("cannot extract '{key}': path names the target directory itself");
    }
    Ok(target)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o777))
        .with_context(|| format!("failed to set mode of {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> anyhow::Result<()> {
    Ok(())
}
