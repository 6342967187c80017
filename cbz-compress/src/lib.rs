#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub use crate::batch::{run_batch, BatchEvent, BatchReport, FileFailure, FileReport};
pub use crate::compress::{compress_cbz, CompressOutcome};
pub use crate::config::{CompressOptions, Config, ConfigOverrides, Quality};
pub use crate::errors::{Error, Result};
pub use crate::naming::{NamingPolicy, Sequence};

pub mod batch;
pub mod compress;
pub mod config;
pub mod errors;
pub mod naming;
