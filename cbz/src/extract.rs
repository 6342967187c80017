use std::{
    fs::{self, File},
    io::{self, Read, Seek},
};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::{
    compressed_file_options, Cbz, CbzRead, CbzReader, CbzWrite, CbzWriter,
    CbzWriterInsertionBuilder, Error, Result,
};

/// One entry of an extracted Cbz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbzEntry {
    /// Name exactly as stored in the archive, directories end with `/`
    pub name: String,
    /// Location relative to the extraction root
    pub relative_path: Utf8PathBuf,
    pub is_dir: bool,
}

impl<R> CbzReader<R>
where
    R: Read + Seek,
{
    /// Writes every entry under `root` and returns the entries in archive order
    ///
    /// ## Errors
    ///
    /// Fails if an entry can't be read, if its name would land outside of `root`,
    /// or if the files can't be written
    pub fn extract_to(&mut self, root: &Utf8Path) -> Result<Vec<CbzEntry>> {
        let mut entries = Vec::with_capacity(self.len());

        self.try_for_each(|cbz_file| {
            let mut cbz_file = cbz_file?;
            let name = cbz_file.name().to_string();
            let is_dir = cbz_file.is_dir();

            let Some(relative_path) = cbz_file.enclosed_name().map(ToOwned::to_owned) else {
                return Err(Error::UnsafeEntryName(name));
            };
            let relative_path =
                Utf8PathBuf::from_path_buf(relative_path).map_err(Error::NonUtf8Path)?;
            let out_path = root.join(&relative_path);

            if is_dir {
                fs::create_dir_all(&out_path)?;
            } else {
                if let Some(parent) = out_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&out_path)?;
                let written = cbz_file.copy_to(&mut out)?;
                debug!("extracted {name} ({written} bytes)");
            }

            entries.push(CbzEntry {
                name,
                relative_path,
                is_dir,
            });

            Ok(())
        })?;

        Ok(entries)
    }
}

/// A Cbz unpacked into its own temporary directory.
/// The directory and everything in it is removed when this value is dropped.
#[derive(Debug)]
pub struct ExtractedCbz {
    root: Utf8PathBuf,
    entries: Vec<CbzEntry>,
    _dir: TempDir,
}

impl ExtractedCbz {
    /// ## Errors
    ///
    /// Fails if the archive can't be opened or read, or if the temporary directory can't be created
    pub fn extract(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = CbzReader::from_path(path)?;

        let dir = tempfile::Builder::new().prefix("cbz-").tempdir()?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(Error::NonUtf8Path)?;

        let entries = reader.extract_to(&root)?;
        debug!("extracted {} entries from {path} into {root}", entries.len());

        Ok(Self {
            root,
            entries,
            _dir: dir,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn entries(&self) -> &[CbzEntry] {
        &self.entries
    }

    /// Entries that are files, directories excluded
    pub fn files(&self) -> impl Iterator<Item = &CbzEntry> {
        self.entries.iter().filter(|entry| !entry.is_dir)
    }

    #[must_use]
    pub fn path_of(&self, entry: &CbzEntry) -> Utf8PathBuf {
        self.root.join(&entry.relative_path)
    }

    /// Packs the extracted entries, in their original order and under their original names,
    /// into a new Cbz at `output`.
    /// The archive is built in a temporary file next to `output` and only moved onto it once complete,
    /// so `output` may be the path this Cbz was extracted from.
    /// Returns the size in bytes of the written archive.
    ///
    /// ## Errors
    ///
    /// Fails if an entry can't be read back, the archive can't be written or moved into place
    pub fn pack_to_path(&self, output: impl AsRef<Utf8Path>) -> Result<u64> {
        let output = output.as_ref();
        let outdir = output
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));

        let tmp = tempfile::Builder::new()
            .prefix(".cbz-")
            .suffix(".tmp")
            .tempfile_in(outdir)?;
        let mut writer = CbzWriter::from_writer(tmp);
        let file_options = compressed_file_options();

        for entry in &self.entries {
            if entry.is_dir {
                writer.insert_dir(entry.name.as_str(), file_options)?;
                continue;
            }

            let file = File::open(self.path_of(entry))?;
            let insertion = CbzWriterInsertionBuilder::from_name(&entry.name)
                .set_file_options(file_options)
                .set_bytes_from_reader(file)?
                .build()?;
            writer.insert(insertion)?;
        }

        let tmp = writer.finish()?.into_inner();
        // the temporary file is created 0600, an existing output keeps its mode
        match fs::metadata(output) {
            Ok(metadata) => tmp.as_file().set_permissions(metadata.permissions())?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        tmp.as_file().sync_all()?;
        debug!("moving packed cbz to {output}");
        let file = tmp.persist(output)?;

        Ok(file.metadata()?.len())
    }
}
