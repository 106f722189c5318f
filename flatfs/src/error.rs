use thiserror::Error;

/// Outcomes a caller can recover from by adjusting input and trying again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("file already exists: {0}")]
    AlreadyExists(String),
    #[error("found no file named {0}")]
    NotFound(String),
    #[error("disk space full: needed {needed} blocks, obtained {obtained}")]
    DiskFull { needed: usize, obtained: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
