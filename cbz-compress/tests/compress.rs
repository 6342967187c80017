mod common;

use std::fs;

use cbz_compress::{compress_cbz, CompressOptions, Error};
use image::{ColorType, ImageFormat};

use crate::common::{
    dimensions, dir_listing, entry, gray_alpha_page, palette_page, read_cbz, scanned_page,
    utf8_tempdir, write_cbz,
};

#[test]
fn compress_in_place_keeps_entries_and_shrinks_pages() {
    let (_dir, root) = utf8_tempdir();
    let path = root.join("book.cbz");
    let info = b"<ComicInfo><Title>Book</Title></ComicInfo>".to_vec();
    write_cbz(
        &path,
        &[
            ("pages/", Vec::new()),
            ("pages/001.png", scanned_page(400, 600)),
            ("pages/002.PNG", scanned_page(400, 600)),
            ("ComicInfo.xml", info.clone()),
        ],
    );

    let outcome = compress_cbz(&path, &path, CompressOptions::new(50, 1024).unwrap()).unwrap();

    assert_eq!(outcome.transcoded_pages, 2);
    assert_eq!(outcome.compressed_size, fs::metadata(&path).unwrap().len());
    assert!(outcome.compressed_size < outcome.original_size);
    assert!(outcome.saved_bytes() > 0);

    let entries = read_cbz(&path);
    let names = entries.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["pages/", "pages/001.png", "pages/002.PNG", "ComicInfo.xml"]
    );
    assert_eq!(entry(&entries, "ComicInfo.xml"), info.as_slice());
    for name in ["pages/001.png", "pages/002.PNG"] {
        let page = entry(&entries, name);
        assert_eq!(image::guess_format(page).unwrap(), ImageFormat::Jpeg);
        assert_eq!(dimensions(page), (400, 600));
    }

    assert_eq!(dir_listing(&root), vec!["book.cbz"]);
}

#[test]
fn tall_pages_are_fitted_to_max_height() {
    let (_dir, root) = utf8_tempdir();
    let input = root.join("tall.cbz");
    let output = root.join("out.cbz");
    write_cbz(
        &input,
        &[
            ("001.jpg", scanned_page(333, 1200)),
            ("002.png", scanned_page(300, 900)),
        ],
    );

    compress_cbz(&input, &output, CompressOptions::new(80, 1000).unwrap()).unwrap();

    let entries = read_cbz(&output);
    assert_eq!(dimensions(entry(&entries, "001.jpg")), (277, 1000));
    assert_eq!(dimensions(entry(&entries, "002.png")), (300, 900));
    assert_eq!(read_cbz(&input).len(), 2);
}

#[test]
fn palette_and_gray_alpha_pages_become_plain_jpeg() {
    let (_dir, root) = utf8_tempdir();
    let path = root.join("colors.cbz");
    let palette = [[255, 0, 0], [0, 0, 255]];
    write_cbz(
        &path,
        &[
            ("pal.png", palette_page(2, 2, &palette, &[0, 1, 1, 0])),
            ("la.png", gray_alpha_page(8, 2000)),
        ],
    );

    compress_cbz(&path, &path, CompressOptions::new(80, 1000).unwrap()).unwrap();

    let entries = read_cbz(&path);
    let pal = entry(&entries, "pal.png");
    assert_eq!(image::guess_format(pal).unwrap(), ImageFormat::Jpeg);
    assert_eq!(dimensions(pal), (2, 2));
    assert_eq!(image::load_from_memory(pal).unwrap().color(), ColorType::Rgb8);

    let la = entry(&entries, "la.png");
    assert_eq!(image::guess_format(la).unwrap(), ImageFormat::Jpeg);
    assert_eq!(dimensions(la), (4, 1000));
    assert_eq!(image::load_from_memory(la).unwrap().color(), ColorType::L8);
}

#[test]
fn corrupt_page_leaves_the_archive_untouched() {
    let (_dir, root) = utf8_tempdir();
    let path = root.join("broken.cbz");
    let mut truncated = scanned_page(64, 64);
    truncated.truncate(48);
    write_cbz(
        &path,
        &[
            ("001.png", scanned_page(64, 64)),
            ("002.png", truncated),
        ],
    );
    let before = fs::read(&path).unwrap();

    let result = compress_cbz(&path, &path, CompressOptions::default());

    assert!(matches!(
        result,
        Err(Error::Page {
            ref entry,
            source: cbz::Error::ImageDecode { .. },
        }) if entry == "002.png"
    ));
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(dir_listing(&root), vec!["broken.cbz"]);
}

#[test]
fn not_a_zip_is_reported_as_an_archive_error() {
    let (_dir, root) = utf8_tempdir();
    let path = root.join("fake.cbz");
    fs::write(&path, b"not a zip at all").unwrap();

    assert!(matches!(
        compress_cbz(&path, &path, CompressOptions::default()),
        Err(Error::Cbz(cbz::Error::ArchiveRead(_)))
    ));
    assert_eq!(fs::read(&path).unwrap(), b"not a zip at all");
}
