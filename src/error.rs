use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("index out of range")]
    OutOfRange,
    #[error("block size mismatch")]
    SizeMismatch,
    #[error("file system version mismatch")]
    VersionMismatch,
    #[error("file not found")]
    NotFound,
    #[error("file already exists")]
    AlreadyExists,
    #[error("the maximum number of open files was exceeded")]
    TooManyOpenFiles,
    #[error("no free {0} left")]
    NoSpace(&'static str),
    #[error("{0}")]
    ReadWrite(&'static str),
    #[error("invalid file name")]
    InvalidName,
    #[error("invalid parameters: {0}")]
    InvalidParams(&'static str),
}

pub type Result<T> = core::result::Result<T, FsError>;
