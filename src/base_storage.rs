use std::time::SystemTime;

use crate::errors::Result;

/// Contract shared by every blob storage adapter.
///
/// Keys are opaque strings compared exactly; a `/` inside a key
/// implies a virtual hierarchy that adapters may project onto their
/// native layout.
pub trait BlobStorage {
    /// Retrieve the payload stored under `key`.
    fn read(&mut self, key: &str) -> Result<Vec<u8>>;

    /// Store `content` under `key`, creating any missing intermediate
    /// directories, and return the number of bytes written.
    fn write(&mut self, key: &str, content: &[u8]) -> Result<u64>;

    /// Check whether `key` currently exists.
    fn exists(&mut self, key: &str) -> Result<bool>;

    /// Enumerate keys, optionally narrowed to those starting with a
    /// literal prefix.
    fn keys(&mut self, pattern: Option<&str>) -> Result<Vec<String>>;

    /// Server-reported modification time of `key`.
    fn mtime(&mut self, key: &str) -> Result<SystemTime>;

    /// Delete `key`, reporting success as a flag instead of an error.
    fn delete(&mut self, key: &str) -> Result<bool>;
}
