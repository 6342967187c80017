use std::{io, path::PathBuf, result};

use zip::result::ZipError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error {0}")]
    IO(#[from] io::Error),

    #[error("Archive read error {0}")]
    ArchiveRead(#[from] ZipError),

    #[error("Cbz entry name {0:?} points outside of the archive")]
    UnsafeEntryName(String),

    #[error("Path {0:?} is not valid utf-8")]
    NonUtf8Path(PathBuf),

    #[error("Cbz is too large, it can contain a maximum of {0} files")]
    CbzTooLarge(usize),

    #[error("Cbz file insertion: no bytes set")]
    CbzInsertionNoBytes,

    #[error("Cbz file insertion: name is empty")]
    CbzInsertionNoName,

    #[error("Image decode error in {path}: {source}")]
    ImageDecode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Image encode error {0}")]
    ImageEncode(image::ImageError),

    #[error("Cbz couldn't be moved into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T, E = Error> = result::Result<T, E>;
