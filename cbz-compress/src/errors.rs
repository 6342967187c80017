use std::io;

use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cbz error: {0}")]
    Cbz(#[from] cbz::Error),

    #[error("Page {entry} couldn't be transcoded: {source}")]
    Page {
        entry: String,
        #[source]
        source: cbz::Error,
    },

    #[error("IO error {0}")]
    IO(#[from] io::Error),

    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("Max height must be greater than 0")]
    InvalidMaxHeight,

    #[error("{0} is not a directory")]
    NotADirectory(Utf8PathBuf),

    #[error("{0} has no file name")]
    NoFileName(Utf8PathBuf),

    #[error("{0} already exists")]
    TargetExists(Utf8PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
