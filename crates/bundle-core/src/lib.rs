//! Single-file program bundles.
//!
//! A [`Bundle`] packages files together with an entry point, import maps and
//! addon/asset tags. Bundles encode deterministically into one buffer
//! ([`Bundle::to_buffer`]), decode back ([`from`], [`decode`]) and can be
//! mounted against a deployment root ([`Bundle::mount`]).

pub mod bundle;
pub mod codec;
pub mod error;
pub mod file;
pub mod mount;
pub mod specifier;
pub mod store;
pub mod tree;

pub use bundle::{Bundle, WriteOptions, VERSION};
pub use codec::{
    compare_keys, decode, decode_with_limits, encode, from, peek, DecodeLimits,
    DecodeLimitsOverrides, EncodeOptions, FileEntry, Header, IntoBundle,
};
pub use error::{BundleError, BundleResult, ErrorCode};
pub use file::{
    memory_file_factory, BundleFile, FileFactory, FileOptions, MemoryFile, DEFAULT_MODE,
    EXECUTABLE_MODE,
};
pub use mount::{MountOptions, DEFAULT_CONDITION};
pub use specifier::{mount_specifier, unmount_specifier};
pub use store::FileStore;
pub use tree::{Resolutions, TreeMap, TreeNode};

// Re-exported so callers can build file contents and roots without extra deps
pub use bytes::Bytes;
pub use url::Url;
