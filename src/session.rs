use serde::{Deserialize, Serialize};

use crate::client::{FtpClient, FtpConnector};
use crate::errors::{Result, StorageError};
use crate::utils;
use crate::{ANONYMOUS_USER, DEFAULT_FTP_PORT};

/// Connection parameters for an FTP-backed storage adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpConfig {
    /// Directory used as the adapter's logical root.
    pub root: String,
    pub host: String,
    /// Defaults to the anonymous identity when not set.
    pub username: Option<String>,
    /// Defaults to an empty password when not set.
    pub password: Option<String>,
    pub port: u16,
    /// Whether to switch the connection into passive mode.
    pub passive: bool,
    /// Whether to create the root directory when it does not exist.
    pub create_root: bool,
}

impl FtpConfig {
    pub fn new(host: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            host: host.into(),
            username: None,
            password: None,
            port: DEFAULT_FTP_PORT,
            passive: false,
            create_root: false,
        }
    }
}

/// The adapter's protocol session: connection handle, credentials and
/// the logical root directory.
///
/// The connection is opened lazily by [`Session::client`] and released
/// on drop. A session belongs to exactly one adapter and is never
/// shared; every operation takes `&mut self` and the underlying
/// transport serializes all commands.
pub struct Session<T: FtpConnector> {
    connector: T,
    client: Option<T::Client>,
    config: FtpConfig,
}

impl<T: FtpConnector> Session<T> {
    pub fn new(connector: T, config: FtpConfig) -> Self {
        Self {
            connector,
            client: None,
            config,
        }
    }

    pub fn config(&self) -> &FtpConfig {
        &self.config
    }

    /// Whether a live connection handle is held.
    pub fn is_active(&self) -> bool {
        self.client.is_some()
    }

    /// Open the connection, authenticate and enter the root directory.
    ///
    /// Every failure branch releases the transport before returning,
    /// so a failed attempt never leaves a dangling connection behind.
    pub fn connect(&mut self) -> Result<()> {
        let mut client = self
            .connector
            .open(&self.config.host, self.config.port)?;

        let username = self
            .config
            .username
            .clone()
            .unwrap_or_else(|| ANONYMOUS_USER.to_owned());
        let password = self.config.password.clone().unwrap_or_default();

        if let Err(err) = client.login(&username, &password) {
            let _ = client.quit();
            return Err(err);
        }

        if self.config.passive {
            if let Err(err) = client.enter_passive_mode() {
                let _ = client.quit();
                return Err(err);
            }
        }

        // Blobs are opaque bytes; transfer them unmangled.
        if let Err(err) = client.set_binary() {
            let _ = client.quit();
            return Err(err);
        }

        self.client = Some(client);

        if !self.config.root.is_empty() {
            let root = self.config.root.clone();
            let create = self.config.create_root;

            if let Err(err) = self.ensure_directory_exists(&root, create) {
                self.close();
                return Err(err);
            }

            let changed = self.active_client()?.change_dir(&root);
            match changed {
                Ok(true) => {}
                Ok(false) => {
                    self.close();
                    return Err(StorageError::Directory(format!(
                        "could not change into directory '{}'",
                        root
                    )));
                }
                Err(err) => {
                    self.close();
                    return Err(err);
                }
            }
        }

        log::info!(
            "connected to '{}:{}' as '{}'",
            self.config.host,
            self.config.port,
            username
        );
        Ok(())
    }

    /// Hand out the connection handle, connecting lazily on first use.
    pub fn client(&mut self) -> Result<&mut T::Client> {
        if !self.is_active() {
            self.connect()?;
        }
        self.active_client()
    }

    fn active_client(&mut self) -> Result<&mut T::Client> {
        self.client.as_mut().ok_or_else(|| {
            StorageError::Connection("session is not active".to_owned())
        })
    }

    /// Close the connection if one is open. Never fails; a QUIT error
    /// is logged and the handle dropped regardless.
    pub fn close(&mut self) {
        if let Some(mut client) = self.client.take() {
            if let Err(err) = client.quit() {
                log::warn!("failed to close session cleanly: {}", err);
            }
        }
    }

    /// Whether `directory` exists on the server.
    ///
    /// Probing changes the working directory, so it is moved back to
    /// the session root before returning and the probe has no lasting
    /// effect. A refused change means the directory does not exist;
    /// connection-level failures propagate.
    pub fn directory_exists(&mut self, directory: &str) -> Result<bool> {
        let restore = if self.config.root.is_empty() {
            "/".to_owned()
        } else {
            self.config.root.clone()
        };

        let client = self.client()?;
        let found = client.change_dir(directory)?;
        // Best effort: during connect the root may not exist yet.
        let _ = client.change_dir(&restore);

        Ok(found)
    }

    /// Fail unless `directory` exists, creating it when `create` is
    /// set.
    pub fn ensure_directory_exists(
        &mut self,
        directory: &str,
        create: bool,
    ) -> Result<()> {
        if self.directory_exists(directory)? {
            return Ok(());
        }
        if !create {
            return Err(StorageError::Directory(format!(
                "directory '{}' does not exist",
                directory
            )));
        }

        self.create_directory(directory)
    }

    /// Create `directory` and any missing ancestors, top-down, so a
    /// parent always exists before its child is made.
    pub fn create_directory(&mut self, directory: &str) -> Result<()> {
        for ancestor in utils::ancestors(directory) {
            if self.directory_exists(&ancestor)? {
                continue;
            }
            self.client()?.make_dir(&ancestor)?;
            log::debug!("created directory '{}'", ancestor);
        }

        Ok(())
    }
}

impl<T: FtpConnector> Drop for Session<T> {
    fn drop(&mut self) {
        self.close();
    }
}
