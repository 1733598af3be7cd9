//! Resource writer seam
//!
//! The two ways a resolver can hand a resource to the emulated filesystem:
//! eager bytes (archive entries) or a lazily fetched URL (loose directory).

use std::future::Future;
use std::sync::Arc;
use xb_core::VfsError;

/// Destination for resolved manifest resources
pub trait ResourceWriter {
    /// Store `bytes` under `name`. Completes once the bytes are in place.
    fn write(&self, name: &str, bytes: Vec<u8>) -> impl Future<Output = Result<(), VfsError>>;

    /// Register `url` as the backing source for `name`. Returns immediately;
    /// the transfer is left to the filesystem.
    fn register_lazy(&self, name: &str, url: &str) -> Result<(), VfsError>;
}

impl<T: ResourceWriter> ResourceWriter for Arc<T> {
    fn write(&self, name: &str, bytes: Vec<u8>) -> impl Future<Output = Result<(), VfsError>> {
        (**self).write(name, bytes)
    }

    fn register_lazy(&self, name: &str, url: &str) -> Result<(), VfsError> {
        (**self).register_lazy(name, url)
    }
}

impl<T: ResourceWriter> ResourceWriter for &T {
    fn write(&self, name: &str, bytes: Vec<u8>) -> impl Future<Output = Result<(), VfsError>> {
        (**self).write(name, bytes)
    }

    fn register_lazy(&self, name: &str, url: &str) -> Result<(), VfsError> {
        (**self).register_lazy(name, url)
    }
}

/// Final path segment of a declared resource path.
///
/// Both `/` and `\` count as separators, so `dir/sub\file.prg` becomes
/// `file.prg`.
pub fn basename(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("a.prg"), "a.prg");
        assert_eq!(basename("sub/dir/a.prg"), "a.prg");
        assert_eq!(basename("C:\\games\\x16\\HELLO.BAS"), "HELLO.BAS");
        assert_eq!(basename("mixed/path\\b.txt"), "b.txt");
        assert_eq!(basename("trailing/"), "");
    }
}
