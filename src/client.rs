use std::io::Read;
use std::time::SystemTime;

use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Mode};

use crate::errors::{Result, StorageError};

/// Commands of an established FTP control connection.
///
/// The adapter drives the protocol exclusively through this trait, so
/// session, directory and blob logic stay independent of the concrete
/// transport and can be exercised against an in-memory fake.
pub trait FtpClient {
    fn login(&mut self, username: &str, password: &str) -> Result<()>;

    fn enter_passive_mode(&mut self) -> Result<()>;

    fn set_binary(&mut self) -> Result<()>;

    /// Change the working directory. `Ok(false)` means the server
    /// refused (the directory does not exist); `Err` is reserved for
    /// connection-level failures.
    fn change_dir(&mut self, directory: &str) -> Result<bool>;

    fn make_dir(&mut self, directory: &str) -> Result<()>;

    /// Human-readable listing lines for `directory`.
    fn raw_list(&mut self, directory: &str) -> Result<Vec<String>>;

    /// Entry names below `directory`; servers differ on whether these
    /// are bare names or full paths.
    fn name_list(&mut self, directory: &str) -> Result<Vec<String>>;

    fn download(&mut self, path: &str) -> Result<Vec<u8>>;

    fn upload(&mut self, path: &str, content: &mut dyn Read) -> Result<u64>;

    /// Server-reported modification time; `Ok(None)` is the server's
    /// "unsupported" sentinel.
    fn modified_time(&mut self, path: &str) -> Result<Option<SystemTime>>;

    /// Delete a file, reporting success as a flag.
    fn remove(&mut self, path: &str) -> Result<bool>;

    fn quit(&mut self) -> Result<()>;
}

/// Factory for [`FtpClient`] transports, the seam between the adapter
/// and the network.
pub trait FtpConnector {
    type Client: FtpClient;

    fn open(&self, host: &str, port: u16) -> Result<Self::Client>;
}

/// Plain-TCP connector backed by `suppaftp`.
pub struct TcpConnector;

impl FtpConnector for TcpConnector {
    type Client = FtpTransport;

    fn open(&self, host: &str, port: u16) -> Result<FtpTransport> {
        let stream = FtpStream::connect((host, port)).map_err(|err| {
            StorageError::Connection(format!(
                "could not connect to '{}:{}': {}",
                host, port, err
            ))
        })?;

        Ok(FtpTransport { stream })
    }
}

/// An established `suppaftp` control connection.
pub struct FtpTransport {
    stream: FtpStream,
}

impl FtpClient for FtpTransport {
    fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.stream.login(username, password).map_err(|err| {
            StorageError::Authentication(format!(
                "could not login as '{}': {}",
                username, err
            ))
        })
    }

    fn enter_passive_mode(&mut self) -> Result<()> {
        self.stream.set_mode(Mode::Passive);
        Ok(())
    }

    fn set_binary(&mut self) -> Result<()> {
        self.stream
            .transfer_type(FileType::Binary)
            .map_err(connection_error)
    }

    fn change_dir(&mut self, directory: &str) -> Result<bool> {
        match self.stream.cwd(directory) {
            Ok(()) => Ok(true),
            Err(FtpError::UnexpectedResponse(_)) => Ok(false),
            Err(err) => Err(connection_error(err)),
        }
    }

    fn make_dir(&mut self, directory: &str) -> Result<()> {
        match self.stream.mkdir(directory) {
            Ok(()) => Ok(()),
            Err(err @ FtpError::UnexpectedResponse(_)) => {
                Err(StorageError::Directory(format!(
                    "could not create directory '{}': {}",
                    directory, err
                )))
            }
            Err(err) => Err(connection_error(err)),
        }
    }

    fn raw_list(&mut self, directory: &str) -> Result<Vec<String>> {
        match self.stream.list(list_target(directory)) {
            Ok(lines) => Ok(lines),
            Err(err @ FtpError::UnexpectedResponse(_)) => {
                Err(StorageError::Io(format!(
                    "could not list directory '{}': {}",
                    directory, err
                )))
            }
            Err(err) => Err(connection_error(err)),
        }
    }

    fn name_list(&mut self, directory: &str) -> Result<Vec<String>> {
        match self.stream.nlst(list_target(directory)) {
            Ok(names) => Ok(names),
            Err(err @ FtpError::UnexpectedResponse(_)) => {
                Err(StorageError::Io(format!(
                    "could not list directory '{}': {}",
                    directory, err
                )))
            }
            Err(err) => Err(connection_error(err)),
        }
    }

    fn download(&mut self, path: &str) -> Result<Vec<u8>> {
        let buffer = self.stream.retr_as_buffer(path).map_err(|err| {
            StorageError::Io(format!(
                "could not read file '{}': {}",
                path, err
            ))
        })?;

        Ok(buffer.into_inner())
    }

    fn upload(
        &mut self,
        path: &str,
        mut content: &mut dyn Read,
    ) -> Result<u64> {
        self.stream.put_file(path, &mut content).map_err(|err| {
            StorageError::Io(format!(
                "could not write file '{}': {}",
                path, err
            ))
        })
    }

    fn modified_time(&mut self, path: &str) -> Result<Option<SystemTime>> {
        match self.stream.mdtm(path) {
            Ok(datetime) => Ok(Some(SystemTime::from(datetime.and_utc()))),
            // Any negative completion is the MDTM "unsupported" sentinel.
            Err(FtpError::UnexpectedResponse(_)) => Ok(None),
            Err(err) => Err(connection_error(err)),
        }
    }

    fn remove(&mut self, path: &str) -> Result<bool> {
        Ok(self.stream.rm(path).is_ok())
    }

    fn quit(&mut self) -> Result<()> {
        self.stream
            .quit()
            .map_err(|err| StorageError::Connection(err.to_string()))
    }
}

fn connection_error(err: FtpError) -> StorageError {
    StorageError::Connection(err.to_string())
}

fn list_target(directory: &str) -> Option<&str> {
    if directory.is_empty() {
        None
    } else {
        Some(directory)
    }
}
