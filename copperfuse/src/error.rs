use std::collections::TryReserveError;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("memory allocation failed")]
    Alloc(#[from] TryReserveError),

    #[error("missing argument after `{0}'")]
    MissingArg(String),

    #[error("invalid parameter in option `{arg}' (expected {format})")]
    InvalidParam { arg: String, format: String },

    #[error("bad mount point `{mountpoint}': {source}")]
    InvalidMountpoint {
        mountpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid argument `{0}'")]
    DuplicateMountpoint(String),

    #[error("bad option template `{template}': {reason}")]
    BadTemplate { template: String, reason: String },

    #[error("argument {0:?} contains a nul byte")]
    NulInArg(String),

    #[error("cannot append to a borrowed argument list")]
    BorrowedArgs,

    #[error("insert position {pos} is past the end of {len} arguments")]
    InsertOutOfRange { pos: usize, len: usize },

    #[error("{0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, Error>;
