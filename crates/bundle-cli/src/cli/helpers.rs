use super::args::{DecodeArgs, EncodeArgs};
use anyhow::Context;
use bundle_core::{Bundle, Bytes, DecodeLimits, DecodeLimitsOverrides, EncodeOptions};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Default limits, with overrides from `--limits` applied.
pub fn load_limits(args: &DecodeArgs) -> anyhow::Result<DecodeLimits> {
    let Some(path) = &args.limits else {
        return Ok(DecodeLimits::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read limits file {}", path.display()))?;
    let overrides: DecodeLimitsOverrides = serde_json::from_str(&text)
        .with_context(|| format!("invalid limits file {}", path.display()))?;

    Ok(DecodeLimits::default().apply(overrides))
}

/// Read and decode a bundle. Returns the raw bytes alongside.
pub fn read_bundle(path: &Path, args: &DecodeArgs) -> anyhow::Result<(Bundle, Bytes)> {
    let limits = load_limits(args)?;
    let raw = Bytes::from(
        std::fs::read(path).with_context(|| format!("failed to read bundle {}", path.display()))?,
    );

    let bundle = bundle_core::decode_with_limits(raw.clone(), &limits)
        .with_context(|| format!("failed to decode bundle {}", path.display()))?;
    tracing::debug!(path = %path.display(), files = bundle.len(), "read bundle");

    Ok((bundle, raw))
}

/// Encode a bundle and write it to `out`. Returns the number of bytes written.
pub fn write_bundle(bundle: &Bundle, out: &Path, args: &EncodeArgs) -> anyhow::Result<usize> {
    let buffer = bundle
        .to_buffer(&EncodeOptions::indent(args.indent))
        .context("failed to encode bundle")?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, &buffer)
        .with_context(|| format!("failed to write bundle {}", out.display()))?;

    Ok(buffer.len())
}

/// `sha256:<hex>` digest of raw bytes.
pub fn digest(data: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(data)))
}

/// Bundle paths given on the command line may omit the leading `/`.
pub fn bundle_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
