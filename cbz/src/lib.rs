#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::{
    fs::File,
    io::{self, Cursor, Read, Seek, Write},
    ops::{Deref, DerefMut},
    path::Path,
    result,
};

use zip::{read::ZipFile, write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

pub use crate::errors::{Error, Result};
pub use crate::extract::{CbzEntry, ExtractedCbz};

pub mod errors;
pub mod extract;
pub mod image;

/// We artificially limit the amount of accepted files to 65535 files per Cbz
/// First as it'd be rather impractical for the user to read such enormous Cbz
/// Also, this size has been chosen as it was the limit of the very first zip format
pub static MAX_FILE_NUMBER: usize = u16::MAX as usize;

/// Options used for every entry written by this crate: deflate, the storage
/// method comic readers universally support
#[must_use]
pub fn compressed_file_options() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Deflated)
}

pub trait Cbz {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait CbzRead: Cbz {
    /// Entry names in archive order
    fn file_names(&mut self) -> Result<Vec<String>>;

    /// Access the entry stored at `index` and returns a `CbzFile`
    ///
    /// ## Errors
    ///
    /// Fails if the index is out of bounds or if the entry header can't be read
    fn read_by_index(&mut self, index: usize) -> Result<CbzFile<'_>>;

    /// Iterate over the entries in archive order.
    /// If the closure returns an error, this error is returned immediately.
    ///
    /// ## Errors
    ///
    /// Returns an error immediately if the provided closure returns an error
    fn try_for_each<F, E>(&mut self, mut f: F) -> result::Result<(), E>
    where
        F: FnMut(Result<CbzFile<'_>>) -> result::Result<(), E>,
    {
        for index in 0..self.len() {
            f(self.read_by_index(index))?;
        }

        Ok(())
    }
}

pub trait CbzWrite {
    fn size(&self) -> usize;

    /// High level `insert` method, prefer this over the raw `insert_from_bytes_slice_with_options` method
    ///
    /// ## Errors
    ///
    /// Same behavior as `insert_from_bytes_slice_with_options`
    fn insert(&mut self, insertion: CbzWriterInsertion<'_>) -> Result<()> {
        self.insert_from_bytes_slice_with_options(
            insertion.name,
            &insertion.bytes,
            insertion.file_options,
        )
    }

    /// Adds a directory entry, `name` is expected to end with a `/`
    ///
    /// ## Errors
    ///
    /// Fails if the Cbz writer can't be written or if it's full
    fn insert_dir(&mut self, name: impl Into<String>, file_options: FileOptions) -> Result<()>;

    /// This is the method ultimately called to insert the bytes into the Cbz
    ///
    /// ## Errors
    ///
    /// This fails if the Cbz writer can't be written or if it's full (i.e. its size equals `MAX_FILE_NUMBER`)
    fn insert_from_bytes_slice_with_options(
        &mut self,
        filename: impl Into<String>,
        bytes: &[u8],
        file_options: FileOptions,
    ) -> Result<()>;
}

pub struct CbzFile<'a>(ZipFile<'a>);

impl<'a> CbzFile<'a> {
    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn is_dir(&self) -> bool {
        self.0.is_dir()
    }

    /// The entry path, relative to the extraction root, or `None` when the
    /// name is absolute or climbs above the root with `..`
    pub fn enclosed_name(&self) -> Option<&Path> {
        self.0.enclosed_name()
    }

    /// Copy the content of the file to the provided `Write`
    ///
    /// ## Errors
    ///
    /// Fails if copy itself fails
    pub fn copy_to(&mut self, writer: &mut impl Write) -> Result<u64> {
        io::copy(&mut self.0, writer).map_err(Into::into)
    }
}

impl<'a> From<ZipFile<'a>> for CbzFile<'a> {
    fn from(zip_file: ZipFile<'a>) -> Self {
        Self(zip_file)
    }
}

#[derive(Debug)]
pub struct CbzReader<R> {
    archive: ZipArchive<R>,
}

impl<R> CbzReader<R> {
    pub fn new(archive: ZipArchive<R>) -> Self {
        Self { archive }
    }
}

impl<R> CbzReader<R>
where
    R: Read + Seek,
{
    /// Creates `CbzReader` from a `Read`
    ///
    /// ## Errors
    ///
    /// Fails if the underlying `ZipArchive` can't be created
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;

        Ok(Self::new(archive))
    }
}

impl CbzReader<File> {
    /// Creates `CbzReader` from a path
    ///
    /// ## Errors
    ///
    /// Fails if the file can't be opened or isn't a valid zip archive
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;

        Self::from_reader(file)
    }
}

impl<'b> CbzReader<Cursor<&'b [u8]>> {
    /// Creates `CbzReader` from a bytes slice
    ///
    /// ## Errors
    ///
    /// Fails if the underlying `ZipArchive` can't be created
    pub fn from_bytes_slice(bytes: &'b [u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);

        Self::from_reader(cursor)
    }
}

impl<R> Cbz for CbzReader<R>
where
    R: Read + Seek,
{
    fn len(&self) -> usize {
        self.archive.len()
    }
}

impl<R> CbzRead for CbzReader<R>
where
    R: Read + Seek,
{
    fn file_names(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(self.len());

        self.try_for_each(|cbz_file| {
            names.push(cbz_file?.name().to_string());

            Ok::<(), Error>(())
        })?;

        Ok(names)
    }

    fn read_by_index(&mut self, index: usize) -> Result<CbzFile<'_>> {
        let archive_file = self.archive.by_index(index)?;

        Ok(archive_file.into())
    }
}

impl<R> Deref for CbzReader<R> {
    type Target = ZipArchive<R>;

    fn deref(&self) -> &Self::Target {
        &self.archive
    }
}

impl<R> DerefMut for CbzReader<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.archive
    }
}

pub struct CbzWriter<W: Write + Seek> {
    archive: ZipWriter<W>,
    size: usize,
}

impl<W> CbzWriter<W>
where
    W: Write + Seek,
{
    pub fn new(archive: ZipWriter<W>) -> Self {
        Self { archive, size: 0 }
    }

    /// Creates a `CbzWriter` from a `Write`
    pub fn from_writer(writer: W) -> Self {
        let archive = ZipWriter::new(writer);

        Self::new(archive)
    }

    /// Terminates the Cbz archiving, called on drop anyway but error can't be handled
    ///
    /// ## Errors
    ///
    /// Same errors as the underlying `ZipWriter::finish` method
    pub fn finish(&mut self) -> Result<CbzWriterFinished<W>> {
        let writer = self.archive.finish()?;

        Ok(CbzWriterFinished::new(writer))
    }

    fn ensure_capacity(&self) -> Result<()> {
        if self.size >= MAX_FILE_NUMBER {
            return Err(Error::CbzTooLarge(MAX_FILE_NUMBER));
        }

        Ok(())
    }
}

impl Default for CbzWriter<Cursor<Vec<u8>>> {
    fn default() -> Self {
        Self::from_writer(Cursor::new(Vec::new()))
    }
}

impl<W> Cbz for CbzWriter<W>
where
    W: Write + Seek,
{
    fn len(&self) -> usize {
        self.size
    }
}

impl<W> CbzWrite for CbzWriter<W>
where
    W: Write + Seek,
{
    fn size(&self) -> usize {
        self.size
    }

    fn insert_dir(&mut self, name: impl Into<String>, file_options: FileOptions) -> Result<()> {
        self.ensure_capacity()?;

        self.archive.add_directory(name, file_options)?;

        self.size += 1;

        Ok(())
    }

    fn insert_from_bytes_slice_with_options(
        &mut self,
        filename: impl Into<String>,
        bytes: &[u8],
        file_options: FileOptions,
    ) -> Result<()> {
        self.ensure_capacity()?;

        self.archive.start_file(filename, file_options)?;

        self.archive.write_all(bytes)?;

        self.size += 1;

        Ok(())
    }
}

pub struct CbzWriterInsertion<'a> {
    name: &'a str,
    file_options: FileOptions,
    bytes: Vec<u8>,
}

/// Describes a single entry to insert, keeping its name untouched
pub struct CbzWriterInsertionBuilder<'a> {
    name: &'a str,
    file_options: Option<FileOptions>,
    bytes: Option<Vec<u8>>,
}

impl<'a> CbzWriterInsertionBuilder<'a> {
    pub fn from_name(name: &'a (impl AsRef<str> + ?Sized)) -> Self {
        Self {
            name: name.as_ref(),
            file_options: None,
            bytes: None,
        }
    }

    #[must_use]
    pub fn set_file_options(mut self, file_options: FileOptions) -> Self {
        self.file_options = Some(file_options);

        self
    }

    #[must_use]
    pub fn set_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.bytes = Some(bytes.into());

        self
    }

    /// Set the `bytes` field from the provided `Read`
    ///
    /// ## Errors
    ///
    /// Can fail when reading the provided `Read`
    pub fn set_bytes_from_reader(mut self, mut reader: impl Read) -> Result<Self> {
        let mut buf = Vec::new();

        reader.read_to_end(&mut buf)?;

        self.bytes = Some(buf);

        Ok(self)
    }

    /// Builds a `CbzWriterInsertion`, file options default to `compressed_file_options`
    ///
    /// ## Errors
    ///
    /// Fails if the `bytes` field hasn't been populated or if the name is empty
    pub fn build(self) -> Result<CbzWriterInsertion<'a>> {
        let Some(bytes) = self.bytes else {
            return Err(Error::CbzInsertionNoBytes);
        };

        if self.name.is_empty() {
            return Err(Error::CbzInsertionNoName);
        }

        Ok(CbzWriterInsertion {
            name: self.name,
            file_options: self.file_options.unwrap_or_else(compressed_file_options),
            bytes,
        })
    }
}

pub struct CbzWriterFinished<W> {
    writer: W,
}

impl<W> CbzWriterFinished<W> {
    fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
