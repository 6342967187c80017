use std::{fmt::Display, fs};

use camino::{Utf8Path, Utf8PathBuf};
use glob::{glob_with, MatchOptions, Pattern};
use tracing::{error, info, warn};

use crate::{
    compress::{compress_cbz, saved_bytes},
    config::{CompressOptions, Config},
    errors::{Error, Result},
    naming::{NamingPolicy, Sequence},
};

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn to_megabytes(bytes: i64) -> f64 {
    bytes as f64 / BYTES_PER_MEGABYTE
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub original_name: String,
    pub new_name: String,
    pub original_size: u64,
    pub compressed_size: u64,
}

impl FileReport {
    #[must_use]
    pub fn saved_bytes(&self) -> i64 {
        saved_bytes(self.original_size, self.compressed_size)
    }

    #[must_use]
    pub fn is_renamed(&self) -> bool {
        self.original_name != self.new_name
    }
}

impl Display for FileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} (saved {:.2} MB)",
            self.original_name,
            self.new_name,
            to_megabytes(self.saved_bytes())
        )
    }
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: Utf8PathBuf,
    pub error: Error,
}

impl Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn total_saved_bytes(&self) -> i64 {
        self.processed.iter().map(FileReport::saved_bytes).sum()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub enum BatchEvent<'a> {
    Init(usize),
    Processed(&'a FileReport),
    Failed(&'a FileFailure),
    Done,
}

/// Regular files ending in `.cbz` (any case) directly under `dir`, sorted by path
///
/// ## Errors
///
/// Fails if `dir` isn't a directory or can't be listed
pub fn list_cbz_files(dir: impl AsRef<Utf8Path>) -> Result<Vec<Utf8PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_owned()));
    }

    let pattern = format!(
        "{}/*.cbz",
        Pattern::escape(dir.as_str().trim_end_matches('/'))
    );
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut files = Vec::new();
    for path in glob_with(&pattern, options)? {
        let path = path?;
        let path = match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => path,
            Err(path) => {
                warn!("{path:?} is not a valid utf-8 path, skipping");
                continue;
            }
        };
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Compresses the archive at `path` in place, then renames it following `naming`.
/// `sequence` only advances when the file went through entirely.
///
/// ## Errors
///
/// Fails if the new name is taken by another file, or if compression or renaming fails.
/// The archive at `path` is left untouched when compression fails.
pub fn process_file(
    path: &Utf8Path,
    naming: &NamingPolicy,
    sequence: &mut Sequence,
    options: CompressOptions,
) -> Result<FileReport> {
    let Some(original_name) = path.file_name() else {
        return Err(Error::NoFileName(path.to_owned()));
    };

    let new_name = naming.file_name(original_name, *sequence);
    let new_path = path.with_file_name(&new_name);
    if new_path.as_path() != path && new_path.exists() {
        return Err(Error::TargetExists(new_path));
    }

    info!("compressing {original_name}");
    let outcome = compress_cbz(path, path, options)?;

    if new_path.as_path() != path {
        fs::rename(path, &new_path)?;
    }
    sequence.advance();

    Ok(FileReport {
        original_name: original_name.to_string(),
        new_name,
        original_size: outcome.original_size,
        compressed_size: outcome.compressed_size,
    })
}

/// Processes every archive of the configured directory one after the other.
/// A failing archive is recorded in the report and the batch moves on to the next one.
///
/// ## Errors
///
/// Only fails when the input directory can't be listed
pub fn run_batch(
    config: &Config,
    mut on_event: impl FnMut(BatchEvent<'_>),
) -> Result<BatchReport> {
    let files = list_cbz_files(&config.input_dir)?;
    info!("found {} archives in {}", files.len(), config.input_dir);
    on_event(BatchEvent::Init(files.len()));

    let mut sequence = Sequence::new(config.start);
    let mut report = BatchReport::default();

    for path in files {
        match process_file(&path, &config.naming, &mut sequence, config.options) {
            Ok(file_report) => {
                on_event(BatchEvent::Processed(&file_report));
                report.processed.push(file_report);
            }
            Err(error) => {
                error!("{path} failed: {error}");
                let failure = FileFailure { path, error };
                on_event(BatchEvent::Failed(&failure));
                report.failures.push(failure);
            }
        }
    }

    on_event(BatchEvent::Done);

    Ok(report)
}
