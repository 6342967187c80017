use std::fs;

use camino::Utf8Path;
use cbz::{
    image::{is_transcodable, Image},
    ExtractedCbz,
};
use tracing::{debug, info};

use crate::{
    config::CompressOptions,
    errors::{Error, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOutcome {
    pub original_size: u64,
    pub compressed_size: u64,
    pub transcoded_pages: usize,
}

impl CompressOutcome {
    /// Negative when the repacked archive ended up larger
    #[must_use]
    pub fn saved_bytes(&self) -> i64 {
        saved_bytes(self.original_size, self.compressed_size)
    }
}

pub(crate) fn saved_bytes(original_size: u64, compressed_size: u64) -> i64 {
    i64::try_from(original_size)
        .unwrap_or(i64::MAX)
        .saturating_sub(i64::try_from(compressed_size).unwrap_or(i64::MAX))
}

/// Extracts `input`, re-encodes its pages and packs everything into `output`.
/// `output` is only replaced once the new archive is complete, it may be `input` itself.
///
/// ## Errors
///
/// Fails if the archive can't be read, if any page can't be decoded or encoded,
/// or if the new archive can't be written. Nothing is written to `output` in that case.
pub fn compress_cbz(
    input: impl AsRef<Utf8Path>,
    output: impl AsRef<Utf8Path>,
    options: CompressOptions,
) -> Result<CompressOutcome> {
    let input = input.as_ref();
    let output = output.as_ref();
    let original_size = fs::metadata(input)?.len();

    let extracted = ExtractedCbz::extract(input)?;
    let transcoded_pages = transcode_pages(&extracted, options)?;
    let compressed_size = extracted.pack_to_path(output)?;

    info!("compressed {input}: {original_size} -> {compressed_size} bytes");

    Ok(CompressOutcome {
        original_size,
        compressed_size,
        transcoded_pages,
    })
}

/// Re-encodes in place every png/jpeg entry of the extracted archive, other entries are left alone.
/// Returns the number of pages transcoded.
///
/// ## Errors
///
/// Stops at the first page that can't be decoded, encoded or written
pub fn transcode_pages(extracted: &ExtractedCbz, options: CompressOptions) -> Result<usize> {
    let mut transcoded_pages = 0;

    for entry in extracted.files() {
        if !is_transcodable(&entry.name) {
            debug!("keeping {} as is", entry.name);
            continue;
        }

        transcode_page(&extracted.path_of(entry), options).map_err(|source| Error::Page {
            entry: entry.name.clone(),
            source,
        })?;
        debug!("transcoded {}", entry.name);
        transcoded_pages += 1;
    }

    Ok(transcoded_pages)
}

fn transcode_page(path: &Utf8Path, options: CompressOptions) -> cbz::Result<()> {
    Image::open(path)?
        .normalize_color()
        .fit_height(options.max_height)
        .write_jpeg_to_path(path, options.quality.get())
}
