#![allow(dead_code)]

use std::{
    fs::File,
    io::{Cursor, Read, Write},
};

use camino::{Utf8Path, Utf8PathBuf};
use image::{DynamicImage, GenericImageView, GrayAlphaImage, ImageFormat, LumaA, Rgb, RgbImage};
use tempfile::TempDir;
use zip::{write::FileOptions, ZipArchive, ZipWriter};

pub fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

/// A png page with smooth gradients and some grain, roughly what a scan looks like
pub fn scanned_page(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        let mut seed = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
        seed ^= seed >> 13;
        seed = seed.wrapping_mul(0x5bd1_e995);
        seed ^= seed >> 15;
        let grain = (seed % 24) as u8;
        let base = ((x + y) * 255 / (width + height)) as u8;
        Rgb([
            base.saturating_add(grain),
            (255 - base).saturating_add(grain / 2),
            (base / 2).saturating_add(grain),
        ])
    });

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// A grayscale png with an alpha channel
pub fn gray_alpha_page(width: u32, height: u32) -> Vec<u8> {
    let image = GrayAlphaImage::from_fn(width, height, |x, y| {
        LumaA([((x * 7 + y) % 256) as u8, if (x + y) % 2 == 0 { 255 } else { 96 }])
    });

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLumaA8(image)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// An indexed color png (color type 3), which the `image` encoder can't produce itself.
/// `pixels` holds one palette index per pixel, row by row.
pub fn palette_page(width: u32, height: u32, palette: &[[u8; 3]], pixels: &[u8]) -> Vec<u8> {
    assert_eq!(pixels.len(), (width * height) as usize);

    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    // 8 bits depth, indexed color, deflate, adaptive filtering, no interlace
    ihdr.extend_from_slice(&[8, 3, 0, 0, 0]);

    let plte = palette.iter().flatten().copied().collect::<Vec<_>>();

    let mut scanlines = Vec::new();
    for row in pixels.chunks(width as usize) {
        scanlines.push(0);
        scanlines.extend_from_slice(row);
    }

    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png_chunk(&mut png, b"IHDR", &ihdr);
    png_chunk(&mut png, b"PLTE", &plte);
    png_chunk(&mut png, b"IDAT", &zlib_stored(&scanlines));
    png_chunk(&mut png, b"IEND", &[]);
    png
}

fn png_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);
    let crc = crc32(kind.iter().chain(data));
    png.extend_from_slice(&crc.to_be_bytes());
}

/// Zlib stream made of a single uncompressed block
fn zlib_stored(data: &[u8]) -> Vec<u8> {
    let len = u16::try_from(data.len()).unwrap();
    let mut out = vec![0x78, 0x01, 0x01];
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(data);

    let (mut a, mut b) = (1u32, 0u32);
    for byte in data {
        a = (a + u32::from(*byte)) % 65_521;
        b = (b + a) % 65_521;
    }
    out.extend_from_slice(&((b << 16) | a).to_be_bytes());
    out
}

fn crc32<'a>(bytes: impl IntoIterator<Item = &'a u8>) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for byte in bytes {
        crc ^= u32::from(*byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xedb8_8320 & mask);
        }
    }
    !crc
}

pub fn write_cbz(path: &Utf8Path, entries: &[(&str, Vec<u8>)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, FileOptions::default()).unwrap();
        } else {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(bytes).unwrap();
        }
    }
    zip.finish().unwrap();
}

pub fn read_cbz(path: &Utf8Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).unwrap();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).unwrap();
        entries.push((file.name().to_string(), bytes));
    }
    entries
}

pub fn entry<'a>(entries: &'a [(String, Vec<u8>)], name: &str) -> &'a [u8] {
    entries
        .iter()
        .find(|(entry_name, _)| entry_name == name)
        .map(|(_, bytes)| bytes.as_slice())
        .unwrap()
}

pub fn dimensions(bytes: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory(bytes).unwrap();
    (image.width(), image.height())
}

pub fn dir_listing(dir: &Utf8Path) -> Vec<String> {
    let mut names = dir
        .read_dir_utf8()
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string())
        .collect::<Vec<_>>();
    names.sort();
    names
}
