use std::io;

#[derive(Debug, thiserror::Error)]
pub enum HelloError {
    #[error("{0}")]
    Opt(#[from] copperfuse::Error),

    #[error("no mountpoint specified")]
    NoMountpoint,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, HelloError>;
