use camino::Utf8PathBuf;

use crate::{
    errors::{Error, Result},
    naming::NamingPolicy,
};

pub static DEFAULT_INPUT_DIR: &str = "./files/";
pub static DEFAULT_START: u32 = 1;
pub static DEFAULT_QUALITY: u8 = 80;
pub static DEFAULT_MAX_HEIGHT: u32 = 1024;

/// Jpeg quality, from 1 (smallest) to 100 (best)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    /// ## Errors
    ///
    /// Fails if `quality` is outside of `1..=100`
    pub fn new(quality: u8) -> Result<Self> {
        if !(1..=100).contains(&quality) {
            return Err(Error::InvalidQuality(quality));
        }

        Ok(Self(quality))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_QUALITY)
    }
}

impl TryFrom<u8> for Quality {
    type Error = Error;

    fn try_from(quality: u8) -> Result<Self> {
        Self::new(quality)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    pub quality: Quality,
    /// Pages taller than this are scaled down to it
    pub max_height: u32,
}

impl CompressOptions {
    /// ## Errors
    ///
    /// Fails on an out of range quality or a zero `max_height`
    pub fn new(quality: u8, max_height: u32) -> Result<Self> {
        if max_height == 0 {
            return Err(Error::InvalidMaxHeight);
        }

        Ok(Self {
            quality: Quality::new(quality)?,
            max_height,
        })
    }
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

/// Everything a batch run needs, nothing left to ask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input_dir: Utf8PathBuf,
    pub naming: NamingPolicy,
    pub start: u32,
    pub options: CompressOptions,
}

/// Values collected from the user, unset ones fall back to their defaults
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<Utf8PathBuf>,
    pub prefix: Option<String>,
    pub clean_names: bool,
    pub start: Option<u32>,
    pub quality: Option<u8>,
    pub max_height: Option<u32>,
}

impl ConfigOverrides {
    /// A missing or empty prefix keeps the cleaned original names.
    /// The prefix is sanitized so that generated names never contain a path separator.
    ///
    /// ## Errors
    ///
    /// Fails on invalid compression options
    pub fn resolve(self) -> Result<Config> {
        let naming = match self.prefix {
            Some(prefix) if !self.clean_names => {
                let prefix = sanitize_filename::sanitize(prefix);
                if prefix.is_empty() {
                    NamingPolicy::Clean
                } else {
                    NamingPolicy::Sequential { prefix }
                }
            }
            _ => NamingPolicy::Clean,
        };

        Ok(Config {
            input_dir: self
                .input_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_INPUT_DIR)),
            naming,
            start: self.start.unwrap_or(DEFAULT_START),
            options: CompressOptions::new(
                self.quality.unwrap_or(DEFAULT_QUALITY),
                self.max_height.unwrap_or(DEFAULT_MAX_HEIGHT),
            )?,
        })
    }
}
