use std::{fs, ops::Deref};

use camino::Utf8Path;
use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, io::Reader as ImageReader, ColorType,
    DynamicImage, GenericImageView,
};
use tracing::debug;

use crate::{Error, Result};

/// Extensions of the entries that get re-encoded, compared case-insensitively
pub static TRANSCODABLE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[must_use]
pub fn is_transcodable(name: impl AsRef<str>) -> bool {
    Utf8Path::new(name.as_ref())
        .extension()
        .is_some_and(|extension| {
            TRANSCODABLE_EXTENSIONS
                .iter()
                .any(|allowed| extension.eq_ignore_ascii_case(allowed))
        })
}

/// Dimensions of a `width`x`height` page once fitted into `max_height`, aspect ratio preserved.
/// The width is rounded down and never drops below one pixel.
#[must_use]
pub fn fitted_dimensions(width: u32, height: u32, max_height: u32) -> (u32, u32) {
    if height <= max_height {
        return (width, height);
    }

    let fitted_width = u64::from(width) * u64::from(max_height) / u64::from(height);
    // fitted_width <= width since max_height < height
    let fitted_width = u32::try_from(fitted_width).unwrap_or(width).max(1);

    (fitted_width, max_height)
}

#[derive(Debug, PartialEq)]
pub struct Image(DynamicImage);

impl Deref for Image {
    type Target = DynamicImage;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DynamicImage> for Image {
    fn from(value: DynamicImage) -> Self {
        Self(value)
    }
}

impl Image {
    /// Decodes the image, the format is guessed from the content rather than the extension
    ///
    /// ## Errors
    ///
    /// Fails if the file can't be read or if the image can't be decoded
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let dynamic_image = reader.decode().map_err(|source| Error::ImageDecode {
            path: path.to_string(),
            source,
        })?;

        Ok(Self(dynamic_image))
    }

    /// Jpeg knows neither palettes nor transparency:
    /// grayscale pages become 8 bits luma, everything else 8 bits rgb
    #[must_use]
    pub fn normalize_color(self) -> Self {
        match self.0 {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => self,
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => {
                Self(DynamicImage::ImageLuma8(self.0.to_luma8()))
            }
            _ => Self(DynamicImage::ImageRgb8(self.0.to_rgb8())),
        }
    }

    #[must_use]
    pub fn fit_height(self, max_height: u32) -> Self {
        let (width, height) = fitted_dimensions(self.width(), self.height(), max_height);
        if height == self.height() {
            return self;
        }

        debug!(
            "resizing page from {}x{} to {width}x{height}",
            self.width(),
            self.height()
        );

        Self(self.0.resize_exact(width, height, FilterType::Lanczos3))
    }

    /// ## Errors
    ///
    /// Fails if the encoder rejects the image
    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);

            match &self.0 {
                DynamicImage::ImageLuma8(buffer) => encoder.encode(
                    buffer.as_raw(),
                    buffer.width(),
                    buffer.height(),
                    ColorType::L8,
                ),
                DynamicImage::ImageRgb8(buffer) => encoder.encode(
                    buffer.as_raw(),
                    buffer.width(),
                    buffer.height(),
                    ColorType::Rgb8,
                ),
                dynamic_image => {
                    let buffer = dynamic_image.to_rgb8();
                    encoder.encode(
                        buffer.as_raw(),
                        buffer.width(),
                        buffer.height(),
                        ColorType::Rgb8,
                    )
                }
            }
            .map_err(Error::ImageEncode)?;
        }

        Ok(bytes)
    }

    /// Encodes the image as jpeg and overwrites the file at `path` with it
    ///
    /// ## Errors
    ///
    /// Fails on encoding or write error
    pub fn write_jpeg_to_path(&self, path: impl AsRef<Utf8Path>, quality: u8) -> Result<()> {
        let bytes = self.to_jpeg(quality)?;
        fs::write(path.as_ref(), bytes)?;

        Ok(())
    }
}
