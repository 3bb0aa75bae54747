//! File storage for bundle entries.
//!
//! A bundle only depends on [`BundleFile`]; the default storage is
//! [`MemoryFile`], an immutable in-memory blob. Other storage strategies plug
//! in through a [`FileFactory`] or by writing prebuilt handles with
//! [`Bundle::write_file`](crate::Bundle::write_file).

use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Default permissions of a bundled file.
pub const DEFAULT_MODE: u32 = 0o644;

/// Permissions of a file written with `executable: true`.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Capabilities every bundled file provides.
///
/// Contents are immutable: replacing the contents of a path means replacing
/// the handle, so handles can be shared freely between bundles.
pub trait BundleFile: fmt::Debug + Send + Sync {
    /// Length of the contents in bytes.
    fn size(&self) -> usize;

    /// POSIX permission bits.
    fn mode(&self) -> u32;

    /// The contents.
    fn read(&self) -> Bytes;
}

/// Options controlling the mode of a newly created file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOptions {
    pub executable: bool,
    /// Explicit mode, overriding the `executable` default.
    pub mode: Option<u32>,
}

impl FileOptions {
    /// Resolve the effective mode.
    pub fn resolve_mode(&self) -> u32 {
        match self.mode {
            Some(mode) => mode,
            None if self.executable => EXECUTABLE_MODE,
            None => DEFAULT_MODE,
        }
    }
}

/// Immutable in-memory file.
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryFile {
    data: Bytes,
    mode: u32,
}

impl MemoryFile {
    pub fn new(data: impl Into<Bytes>, options: &FileOptions) -> Self {
        Self::with_mode(data, options.resolve_mode())
    }

    pub fn with_mode(data: impl Into<Bytes>, mode: u32) -> Self {
        Self {
            data: data.into(),
            mode,
        }
    }
}

impl BundleFile for MemoryFile {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn mode(&self) -> u32 {
        self.mode
    }

    fn read(&self) -> Bytes {
        self.data.clone()
    }
}

impl fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFile")
            .field("data", &self.data)
            .field("mode", &format_args!("{:o}", self.mode))
            .finish()
    }
}

/// Constructor for the files created by [`Bundle::write`](crate::Bundle::write).
pub type FileFactory = Arc<dyn Fn(Bytes, u32) -> Arc<dyn BundleFile> + Send + Sync>;

/// The factory producing [`MemoryFile`]s.
pub fn memory_file_factory() -> FileFactory {
    Arc::new(|data: Bytes, mode: u32| -> Arc<dyn BundleFile> {
        Arc::new(MemoryFile::with_mode(data, mode))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_modes() {
        assert_eq!(FileOptions::default().resolve_mode(), 0o644);

        let exec = FileOptions {
            executable: true,
            mode: None,
        };
        assert_eq!(exec.resolve_mode(), 0o755);

        let explicit = FileOptions {
            executable: true,
            mode: Some(0o600),
        };
        assert_eq!(explicit.resolve_mode(), 0o600);
    }

    #[test]
    fn test_memory_file() {
        let file = MemoryFile::new("hello", &FileOptions::default());
        assert_eq!(file.size(), 5);
        assert_eq!(file.mode(), 0o644);
        assert_eq!(&file.read()[..], b"hello");
    }

    #[test]
    fn test_debug_prints_octal_mode() {
        let file = MemoryFile::with_mode("x", 0o755);
        let debug = format!("{file:?}");
        assert!(debug.contains("mode: 755"), "{debug}");
    }

    #[test]
    fn test_factory_builds_memory_files() {
        let factory = memory_file_factory();
        let file = factory(Bytes::from_static(b"abc"), 0o700);
        assert_eq!(file.size(), 3);
        assert_eq!(file.mode(), 0o700);
    }
}
