//! Bundle header (the JSON text following the length prefix).
//!
//! ```text
//! {
//!   "version": 0,
//!   "id": "app" | null,
//!   "main": "/foo.js" | null,
//!   "imports": { ... },
//!   "resolutions": { "/foo.js": { ... } },
//!   "addons": ["/a.node"],        sorted
//!   "assets": ["/logo.png"],      sorted
//!   "files": { "/foo.js": { "offset": 0, "length": 3, "mode": 420 } }
//! }
//! ```

use crate::bundle::{Bundle, VERSION};
use crate::tree::{Resolutions, TreeMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Location and mode of one file in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub offset: u64,
    pub length: u64,
    pub mode: u32,
}

/// Owned header, as returned by [`peek`](crate::codec::peek).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub imports: TreeMap,
    #[serde(default)]
    pub resolutions: Resolutions,
    #[serde(default)]
    pub addons: Vec<String>,
    #[serde(default)]
    pub assets: Vec<String>,
    pub files: IndexMap<String, FileEntry>,
}

impl Header {
    /// Total payload length described by the file table.
    pub fn payload_len(&self) -> u64 {
        self.files
            .values()
            .map(|f| f.offset.saturating_add(f.length))
            .max()
            .unwrap_or(0)
    }
}

/// Borrowed header written by the encoder. Field order is the wire order.
#[derive(Debug, Serialize)]
pub(crate) struct HeaderRef<'a> {
    pub version: u32,
    pub id: Option<&'a str>,
    pub main: Option<&'a str>,
    pub imports: &'a TreeMap,
    pub resolutions: &'a Resolutions,
    pub addons: Vec<&'a str>,
    pub assets: Vec<&'a str>,
    pub files: IndexMap<&'a str, FileEntry>,
}

impl<'a> HeaderRef<'a> {
    /// Snapshot `bundle`, returning the header and the file keys in payload
    /// order.
    pub fn build(bundle: &'a Bundle) -> (Self, Vec<&'a str>) {
        let mut keys: Vec<&str> = bundle.files.keys().collect();
        keys.sort_by(|a, b| compare_keys(a, b));

        let mut files = IndexMap::with_capacity(keys.len());
        let mut offset = 0u64;
        for key in &keys {
            let length = bundle.files.size(key) as u64;
            files.insert(
                *key,
                FileEntry {
                    offset,
                    length,
                    mode: bundle.files.mode(key),
                },
            );
            offset += length;
        }

        let header = Self {
            version: VERSION,
            id: bundle.id.as_deref(),
            main: bundle.main.as_deref(),
            imports: &bundle.imports,
            resolutions: &bundle.resolutions,
            addons: sorted_list(&bundle.addons),
            assets: sorted_list(&bundle.assets),
            files,
        };

        (header, keys)
    }
}

fn sorted_list(list: &[String]) -> Vec<&str> {
    let mut list: Vec<&str> = list.iter().map(String::as_str).collect();
    list.sort_by(|a, b| compare_keys(a, b));
    list
}

/// Order paths by UTF-16 code units.
///
/// This matches the default string ordering of JavaScript implementations of
/// the format, so both produce byte-identical buffers. It differs from
/// `str::cmp` only for code points above U+FFFF versus U+E000..U+FFFF.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::WriteOptions;

    #[test]
    fn test_compare_keys() {
        assert_eq!(compare_keys("/a.js", "/b.js"), Ordering::Less);
        assert_eq!(compare_keys("/B.js", "/a.js"), Ordering::Less);
        assert_eq!(compare_keys("/a", "/a"), Ordering::Equal);
        // U+1F600 encodes as a surrogate pair (0xD83D ..) which sorts before U+FF01
        assert_eq!(compare_keys("\u{1F600}", "\u{FF01}"), Ordering::Less);
        assert_eq!("\u{1F600}".cmp("\u{FF01}"), Ordering::Greater);
    }

    #[test]
    fn test_build_assigns_sorted_offsets() {
        let mut bundle = Bundle::new();
        bundle
            .write("/c.js", "cc", &WriteOptions::new())
            .unwrap()
            .write("/a.js", "a", &WriteOptions::new().executable())
            .unwrap()
            .write("/b.js", "bbb", &WriteOptions::new())
            .unwrap();

        let (header, keys) = HeaderRef::build(&bundle);
        assert_eq!(keys, vec!["/a.js", "/b.js", "/c.js"]);
        assert_eq!(
            header.files["/a.js"],
            FileEntry {
                offset: 0,
                length: 1,
                mode: 0o755
            }
        );
        assert_eq!(header.files["/b.js"].offset, 1);
        assert_eq!(header.files["/c.js"].offset, 4);
    }

    #[test]
    fn test_header_field_order() {
        let bundle = Bundle::new();
        let (header, _) = HeaderRef::build(&bundle);
        let json = serde_json::to_string(&header).unwrap();
        assert_eq!(
            json,
            r#"{"version":0,"id":null,"main":null,"imports":{},"resolutions":{},"addons":[],"assets":[],"files":{}}"#
        );
    }

    #[test]
    fn test_owned_header_defaults() {
        let header: Header = serde_json::from_str(r#"{"files":{}}"#).unwrap();
        assert_eq!(header.version, 0);
        assert_eq!(header.id, None);
        assert!(header.addons.is_empty());
        assert_eq!(header.payload_len(), 0);
    }
}
