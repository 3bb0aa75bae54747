//! Binary encoding of bundles.
//!
//! ```text
//! [#!... \n]                  optional, skipped on decode, never written
//! <decimal length of header>  no delimiter: ends at the first non-digit
//! \n{ header JSON }\n         see [`header`]
//! <file bytes>                concatenated in sorted path order
//! ```
//!
//! # Determinism
//!
//! File keys, `addons` and `assets` are sorted before encoding, so bundles
//! holding the same files and metadata encode to the same bytes regardless
//! of the order in which files were written.
//!
//! # Decoding
//!
//! Decoding is all-or-nothing and goes through the same validating setters
//! as the public API, so a decoded bundle always satisfies the bundle
//! invariants. File contents are zero-copy slices of the input buffer.

pub mod header;
pub mod limits;

pub use header::{compare_keys, FileEntry, Header};
pub use limits::{DecodeLimits, DecodeLimitsOverrides};

use crate::bundle::{Bundle, WriteOptions, VERSION};
use crate::error::{BundleError, BundleResult};
use crate::file::DEFAULT_MODE;
use bytes::Bytes;
use header::HeaderRef;
use limits::json_depth;
use serde::Serialize;
use serde_json::{Map, Value};

/// Options for [`Bundle::to_buffer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Spaces per indentation level of the header JSON; 0 is compact.
    pub indent: usize,
}

impl EncodeOptions {
    pub fn indent(indent: usize) -> Self {
        Self { indent }
    }
}

/// Encode `bundle` into a single buffer.
pub fn encode(bundle: &Bundle, options: &EncodeOptions) -> BundleResult<Vec<u8>> {
    let (header, keys) = HeaderRef::build(bundle);

    let mut json = vec![b'\n'];
    write_json(&mut json, &header, options.indent)?;
    json.push(b'\n');

    let prefix = json.len().to_string();
    let payload_len = bundle.files.total_size();

    let mut buffer = Vec::with_capacity(prefix.len() + json.len() + payload_len);
    buffer.extend_from_slice(prefix.as_bytes());
    buffer.extend_from_slice(&json);

    for key in &keys {
        if let Some(data) = bundle.files.read(key) {
            buffer.extend_from_slice(&data);
        }
    }

    tracing::debug!(
        files = keys.len(),
        header_bytes = json.len(),
        payload_bytes = payload_len,
        "encoded bundle"
    );

    Ok(buffer)
}

fn write_json<T: Serialize>(out: &mut Vec<u8>, value: &T, indent: usize) -> BundleResult<()> {
    if indent == 0 {
        return serde_json::to_writer(out, value).map_err(BundleError::Encode);
    }

    let indent = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut serializer = serde_json::Serializer::with_formatter(out, formatter);
    value.serialize(&mut serializer).map_err(BundleError::Encode)
}

/// Decode a buffer. Only the buffer itself bounds the work done; use
/// [`decode_with_limits`] for untrusted input.
pub fn decode(input: impl Into<Bytes>) -> BundleResult<Bundle> {
    decode_with_limits(input, &DecodeLimits::unlimited())
}

/// Decode a buffer, enforcing `limits`.
pub fn decode_with_limits(input: impl Into<Bytes>, limits: &DecodeLimits) -> BundleResult<Bundle> {
    let (header, payload) = split(input.into(), limits)?;
    let header_len = header.len();

    let object = parse_header(&header)?;
    let files = check_shape(&object, limits)?;

    let mut bundle = Bundle::new();

    if let Some(value) = present_non_empty(&object, "id") {
        bundle.replace_id(value)?;
    }
    if let Some(value) = present_non_empty(&object, "main") {
        bundle.replace_main(value)?;
    }
    if let Some(value) = present(&object, "imports") {
        bundle.replace_imports(value)?;
    }
    if let Some(value) = present(&object, "resolutions") {
        bundle.replace_resolutions(value)?;
    }
    if let Some(value) = present(&object, "addons") {
        bundle.replace_addons(value)?;
    }
    if let Some(value) = present(&object, "assets") {
        bundle.replace_assets(value)?;
    }

    let mut running = 0u64;
    for (path, info) in files {
        let entry = file_entry(path, info, running)?;
        let end = entry
            .offset
            .checked_add(entry.length)
            .filter(|end| *end <= payload.len() as u64)
            .ok_or_else(|| {
                BundleError::invalid_header(format!(
                    "File '{path}' ({} bytes at offset {}) exceeds payload of {} bytes",
                    entry.length,
                    entry.offset,
                    payload.len()
                ))
            })?;

        let data = payload.slice(entry.offset as usize..end as usize);
        bundle.write(path.as_str(), data, &WriteOptions::new().mode(entry.mode))?;
        running = end;
    }

    tracing::debug!(
        files = bundle.len(),
        header_bytes = header_len,
        payload_bytes = payload.len(),
        "decoded bundle"
    );

    Ok(bundle)
}

/// Parse only the header of a buffer, without building a bundle.
///
/// Useful for inspection; the header is not run through the bundle setters.
pub fn peek(input: impl Into<Bytes>) -> BundleResult<Header> {
    let (header, _) = split(input.into(), &DecodeLimits::unlimited())?;
    let text = header_text(&header)?;

    serde_json::from_str(text)
        .map_err(|e| BundleError::invalid_header_json("Header does not match the bundle format", e))
}

/// Split a buffer into header text and payload, skipping a shebang line.
fn split(input: Bytes, limits: &DecodeLimits) -> BundleResult<(Bytes, Bytes)> {
    let input = skip_shebang(input)?;

    let digits = input
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(input.len());

    if digits == 0 {
        return Err(BundleError::invalid_header(
            "Missing header length prefix",
        ));
    }

    // Only ASCII digits were matched above, so this is always valid UTF-8
    let len: u64 = std::str::from_utf8(&input[..digits])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| BundleError::invalid_header("Header length prefix is out of range"))?;

    if len > limits.max_header_bytes {
        return Err(BundleError::LimitExceeded {
            what: "header",
            limit: limits.max_header_bytes,
        });
    }

    let start = digits;
    let end = start
        .checked_add(len as usize)
        .filter(|end| *end <= input.len())
        .ok_or_else(|| {
            BundleError::invalid_header(format!(
                "Header length {len} exceeds buffer of {} bytes",
                input.len() - start
            ))
        })?;

    Ok((input.slice(start..end), input.slice(end..)))
}

fn skip_shebang(input: Bytes) -> BundleResult<Bytes> {
    if !input.starts_with(b"#!") {
        return Ok(input);
    }

    match input[2..].iter().position(|b| *b == b'\n') {
        Some(pos) => Ok(input.slice(pos + 3..)),
        None => Err(BundleError::invalid_header(
            "Shebang line is not terminated",
        )),
    }
}

fn header_text(header: &[u8]) -> BundleResult<&str> {
    std::str::from_utf8(header).map_err(|e| {
        BundleError::invalid_header(format!("Header is not valid UTF-8: {e}"))
    })
}

fn parse_header(header: &[u8]) -> BundleResult<Map<String, Value>> {
    let value: Value = serde_json::from_str(header_text(header)?)
        .map_err(|e| BundleError::invalid_header_json("Header is not valid JSON", e))?;

    match value {
        Value::Object(object) => Ok(object),
        _ => Err(BundleError::invalid_header("Header must be a JSON object")),
    }
}

/// Check version, file table shape and limits; return the file table.
fn check_shape<'a>(
    object: &'a Map<String, Value>,
    limits: &DecodeLimits,
) -> BundleResult<&'a Map<String, Value>> {
    if let Some(version) = present(object, "version") {
        match version.as_u64() {
            Some(v) if v == VERSION as u64 => {}
            _ => {
                return Err(BundleError::invalid_header(format!(
                    "Unsupported bundle version {version}, expected {VERSION}"
                )))
            }
        }
    }

    let Some(Value::Object(files)) = object.get("files") else {
        return Err(BundleError::invalid_header(
            "Header is missing the 'files' object",
        ));
    };

    if files.len() > limits.max_files {
        return Err(BundleError::LimitExceeded {
            what: "file count",
            limit: limits.max_files as u64,
        });
    }

    for key in ["imports", "resolutions"] {
        if let Some(tree) = object.get(key) {
            if json_depth(tree) > limits.max_tree_depth {
                return Err(BundleError::LimitExceeded {
                    what: "tree depth",
                    limit: limits.max_tree_depth as u64,
                });
            }
        }
    }

    Ok(files)
}

fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

/// Like [`present`], but an empty string also counts as absent.
fn present_non_empty<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    present(object, key).filter(|v| v.as_str() != Some(""))
}

/// Read one file table entry. A missing offset continues from the previous
/// file; a missing or zero mode falls back to the default.
fn file_entry(path: &str, info: &Value, running: u64) -> BundleResult<FileEntry> {
    let Value::Object(info) = info else {
        return Err(BundleError::invalid_header(format!(
            "File entry for '{path}' must be an object"
        )));
    };

    let field = |name: &str| -> BundleResult<Option<u64>> {
        match present(info, name) {
            None => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or_else(|| {
                BundleError::invalid_header(format!(
                    "File entry for '{path}' has an invalid {name}: {v}"
                ))
            }),
        }
    };

    let length = field("length")?.ok_or_else(|| {
        BundleError::invalid_header(format!("File entry for '{path}' has no length"))
    })?;
    let offset = field("offset")?.unwrap_or(running);

    let mode = match field("mode")? {
        None => DEFAULT_MODE,
        Some(0) => {
            tracing::warn!(path, "file entry has mode 0, using default");
            DEFAULT_MODE
        }
        Some(mode) => u32::try_from(mode).map_err(|_| {
            BundleError::invalid_header(format!("File entry for '{path}' has an invalid mode"))
        })?,
    };

    Ok(FileEntry {
        offset,
        length,
        mode,
    })
}

/// Values that can be turned into a bundle: encoded buffers and bundles.
pub trait IntoBundle {
    fn into_bundle(self) -> BundleResult<Bundle>;
}

impl IntoBundle for Bundle {
    fn into_bundle(self) -> BundleResult<Bundle> {
        Ok(self)
    }
}

impl IntoBundle for Bytes {
    fn into_bundle(self) -> BundleResult<Bundle> {
        decode(self)
    }
}

impl IntoBundle for Vec<u8> {
    fn into_bundle(self) -> BundleResult<Bundle> {
        decode(self)
    }
}

impl IntoBundle for &[u8] {
    fn into_bundle(self) -> BundleResult<Bundle> {
        decode(Bytes::copy_from_slice(self))
    }
}

impl IntoBundle for String {
    fn into_bundle(self) -> BundleResult<Bundle> {
        decode(self)
    }
}

impl IntoBundle for &str {
    fn into_bundle(self) -> BundleResult<Bundle> {
        decode(Bytes::copy_from_slice(self.as_bytes()))
    }
}

/// Build a bundle from an encoded buffer, or pass a bundle through.
pub fn from(value: impl IntoBundle) -> BundleResult<Bundle> {
    value.into_bundle()
}

impl Bundle {
    /// Encode this bundle. See [`encode`].
    pub fn to_buffer(&self, options: &EncodeOptions) -> BundleResult<Vec<u8>> {
        encode(self, options)
    }

    /// Decode a bundle from a buffer. See [`decode`].
    pub fn from_buffer(input: impl Into<Bytes>) -> BundleResult<Self> {
        decode(input)
    }
}
