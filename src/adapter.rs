use std::io::Cursor;
use std::time::SystemTime;

use crate::base_storage::BlobStorage;
use crate::client::{FtpClient, FtpConnector, TcpConnector};
use crate::errors::{Result, StorageError};
use crate::listing;
use crate::session::{FtpConfig, Session};
use crate::utils;

/// Maps a logical key to the protocol-level path.
///
/// The default mapping is the identity; alternate schemes (prefixing,
/// escaping) plug in through [`FtpStorage::with_resolver`] without
/// touching session or directory handling. Keys are not validated
/// here; a malformed path surfaces as a protocol error downstream.
pub trait PathResolver {
    fn resolve(&self, key: &str) -> String;
}

/// The default key-to-path mapping.
pub struct IdentityResolver;

impl PathResolver for IdentityResolver {
    fn resolve(&self, key: &str) -> String {
        key.to_owned()
    }
}

/// FTP-backed blob storage.
///
/// Presents a remote FTP directory tree as a flat, key-addressed blob
/// store. The protocol session is opened lazily on the first
/// operation and all paths are relative to the configured root
/// directory; see [`Session`] for the lifecycle.
pub struct FtpStorage<T: FtpConnector = TcpConnector> {
    session: Session<T>,
    resolver: Box<dyn PathResolver>,
}

impl FtpStorage {
    /// Adapter over a plain TCP transport.
    pub fn new(config: FtpConfig) -> Self {
        Self::with_connector(TcpConnector, config)
    }
}

impl<T: FtpConnector> FtpStorage<T> {
    /// Adapter over a custom transport.
    pub fn with_connector(connector: T, config: FtpConfig) -> Self {
        Self {
            session: Session::new(connector, config),
            resolver: Box::new(IdentityResolver),
        }
    }

    /// Replace the key-to-path mapping.
    pub fn with_resolver(mut self, resolver: Box<dyn PathResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn session(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Close the underlying session.
    pub fn close(&mut self) {
        self.session.close();
    }

    /// Enumerate file keys one level below `directory`.
    ///
    /// Keys are the directory joined with each plain-file entry name,
    /// trimmed of surrounding separators. `pattern` keeps only keys
    /// that start with it, compared as a literal prefix. A listing the
    /// server refuses (for example a directory that does not exist)
    /// yields no keys. The listing is single-level; nested directories
    /// must be passed in explicitly.
    pub fn list_directory(
        &mut self,
        directory: &str,
        pattern: Option<&str>,
    ) -> Result<Vec<String>> {
        let lines = match self.session.client()?.raw_list(directory) {
            Ok(lines) => lines,
            Err(StorageError::Io(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let entries = listing::parse_raw_listing(&lines);
        let mut keys: Vec<String> = entries
            .values()
            .filter(|entry| entry.is_file())
            .map(|entry| utils::join_key(directory, &entry.name))
            .collect();

        if let Some(prefix) = pattern {
            keys.retain(|key| key.starts_with(prefix));
        }

        Ok(keys)
    }
}

impl<T: FtpConnector> BlobStorage for FtpStorage<T> {
    fn read(&mut self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolver.resolve(key);
        self.session.client()?.download(&path)
    }

    fn write(&mut self, key: &str, content: &[u8]) -> Result<u64> {
        let path = self.resolver.resolve(key);

        // Intermediate directories are always created on write.
        if let Some(parent) = utils::parent(&path) {
            self.session.ensure_directory_exists(parent, true)?;
        }

        let mut buffer = Cursor::new(content);
        self.session.client()?.upload(&path, &mut buffer)
    }

    fn exists(&mut self, key: &str) -> Result<bool> {
        let path = self.resolver.resolve(key);
        let parent = utils::parent(&path).unwrap_or(".");
        let target = utils::basename(&path);

        let names = match self.session.client()?.name_list(parent) {
            Ok(names) => names,
            // A parent that cannot be listed holds no keys.
            Err(StorageError::Io(_)) => return Ok(false),
            Err(err) => return Err(err),
        };

        // Servers differ on whether NLST replies carry full paths or
        // bare names; comparing basenames covers both.
        Ok(names.iter().any(|name| utils::basename(name) == target))
    }

    fn keys(&mut self, pattern: Option<&str>) -> Result<Vec<String>> {
        match pattern {
            Some(prefix) => {
                let directory = prefix
                    .rsplit_once('/')
                    .map(|(parent, _)| parent)
                    .unwrap_or("");
                self.list_directory(directory, Some(prefix))
            }
            None => self.list_directory("", None),
        }
    }

    fn mtime(&mut self, key: &str) -> Result<SystemTime> {
        let path = self.resolver.resolve(key);

        match self.session.client()?.modified_time(&path)? {
            Some(timestamp) => Ok(timestamp),
            None => Err(StorageError::Unsupported(format!(
                "could not get the last modified time of '{}'",
                key
            ))),
        }
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        let path = self.resolver.resolve(key);
        let removed = self
            .session
            .client()?
            .remove(&path)
            .unwrap_or(false);

        Ok(removed)
    }
}
