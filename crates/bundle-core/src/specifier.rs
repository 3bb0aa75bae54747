//! Path rules for specifiers stored in a bundle.
//!
//! Paths in a bundle are opaque strings until mounted. Mounting turns every
//! path-shaped specifier into an absolute URL below a root:
//!
//! ```text
//! C:\app\foo.js  ->  /C:\app\foo.js  ->  ./C:\app\foo.js  ->  root.join(..)
//! /foo.js        ->  ./foo.js        ->  file:///dir/foo.js
//! lodash         ->  lodash          (bare, untouched)
//! ```
//!
//! Drive letter detection follows the WHATWG URL standard definitions of
//! "Windows drive letter" and "starts with a Windows drive letter".

use crate::error::{BundleError, BundleResult};
use percent_encoding::percent_decode_str;
use url::Url;

/// Returns true if `input` begins with an ASCII letter followed by `:` or `|`.
pub fn is_windows_drive_letter(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && matches!(bytes[1], b':' | b'|')
}

/// Returns true if `input` starts with a drive letter that is either the whole
/// string or followed by `/`, `\`, `?` or `#`.
pub fn starts_with_windows_drive_letter(input: &str) -> bool {
    if !is_windows_drive_letter(input) {
        return false;
    }

    match input.as_bytes().get(2) {
        None => true,
        Some(c) => matches!(c, b'/' | b'\\' | b'?' | b'#'),
    }
}

/// Returns true if the specifier is `./`- or `.\`-relative.
pub fn is_dot_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with(".\\")
}

/// Rewrite a root-absolute or drive-letter path into a `./`-relative one.
///
/// Bare specifiers and already relative specifiers are returned unchanged.
pub fn to_root_relative(specifier: &str) -> String {
    let mut specifier = if starts_with_windows_drive_letter(specifier) {
        format!("/{specifier}")
    } else {
        specifier.to_string()
    };

    if specifier.starts_with('/') || specifier.starts_with('\\') {
        specifier.insert(0, '.');
    }

    specifier
}

/// Mount a single specifier against `root`.
///
/// Path-shaped specifiers resolve to the absolute URL of the path below the
/// root; bare specifiers (package names) are returned unchanged.
pub fn mount_specifier(specifier: &str, root: &Url) -> BundleResult<String> {
    let specifier = to_root_relative(specifier);

    if !is_dot_relative(&specifier) {
        return Ok(specifier);
    }

    root.join(&specifier)
        .map(String::from)
        .map_err(|e| {
            BundleError::invalid_argument(format!(
                "Cannot resolve '{specifier}' against root {root}: {e}"
            ))
        })
}

/// Reverse of [`mount_specifier`]: turn a URL below `root` back into a
/// `/`-rooted path.
///
/// Specifiers outside the root, and bare specifiers, are returned unchanged.
/// The part below the root is percent-decoded, undoing the escaping that
/// URL resolution applies to spaces and non-ASCII characters.
pub fn unmount_specifier(specifier: &str, root: &Url) -> BundleResult<String> {
    let base = directory_of(root)?;

    let Some(rest) = specifier.strip_prefix(base.as_str()) else {
        return Ok(specifier.to_string());
    };

    let rest = percent_decode_str(rest).decode_utf8().map_err(|e| {
        BundleError::invalid_argument(format!(
            "Cannot unmount '{specifier}': escaped path is not valid UTF-8: {e}"
        ))
    })?;
    Ok(format!("/{rest}"))
}

/// The URL that relative specifiers are resolved against: `root` without
/// its last path segment unless it already ends in `/`.
pub(crate) fn directory_of(root: &Url) -> BundleResult<Url> {
    root.join("./").map_err(|e| {
        BundleError::invalid_argument(format!("Root {root} cannot be used as a base: {e}"))
    })
}

/// Validate that `root` can serve as the base of relative resolution.
pub(crate) fn check_root(root: &Url) -> BundleResult<()> {
    if root.cannot_be_a_base() {
        return Err(BundleError::invalid_argument(format!(
            "Root must be a hierarchical URL. Received {root}"
        )));
    }

    Ok(())
}
