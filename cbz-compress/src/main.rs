#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::io::{self, IsTerminal};

use anyhow::{bail, Context, Result};
use camino::Utf8PathBuf;
use cbz_compress::{
    batch::to_megabytes,
    config::{DEFAULT_INPUT_DIR, DEFAULT_MAX_HEIGHT, DEFAULT_QUALITY, DEFAULT_START},
    run_batch, BatchEvent, ConfigOverrides, FileReport,
};
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Input};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

#[derive(Parser, Debug)]
#[clap(about, author, version)]
pub struct Args {
    /// Directory containing the archives to compress, defaults to ./files/
    #[clap(short, long)]
    pub dir: Option<Utf8PathBuf>,
    /// Prefix of the renamed archives, `MyBook` names them MyBook001.cbz, MyBook002.cbz...
    #[clap(short, long, conflicts_with = "clean_names")]
    pub prefix: Option<String>,
    /// Keep the original names, only dropping parenthesized parts and extra spaces
    #[clap(long, action)]
    pub clean_names: bool,
    /// First sequence number, defaults to 1
    #[clap(short, long)]
    pub start: Option<u32>,
    /// Jpeg quality from 1 to 100, defaults to 80
    #[clap(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,
    /// Pages taller than this are scaled down to it, defaults to 1024
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_height: Option<u32>,
    /// Never prompt, missing values take their defaults
    #[clap(long, action)]
    pub no_input: bool,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            input_dir: args.dir,
            prefix: args.prefix,
            clean_names: args.clean_names,
            start: args.start,
            quality: args.quality,
            max_height: args.max_height,
        }
    }
}

fn prompt_missing(args: &mut Args) -> Result<()> {
    let theme = ColorfulTheme::default();

    if args.dir.is_none() {
        let dir: String = Input::with_theme(&theme)
            .with_prompt("Directory")
            .default(DEFAULT_INPUT_DIR.to_string())
            .interact_text()?;
        args.dir = Some(dir.into());
    }

    if args.prefix.is_none() && !args.clean_names {
        let prefix: String = Input::with_theme(&theme)
            .with_prompt("Prefix (leave empty to keep cleaned names)")
            .allow_empty(true)
            .interact_text()?;
        args.prefix = Some(prefix);
    }

    if args.start.is_none() {
        let start: u32 = Input::with_theme(&theme)
            .with_prompt("Start number")
            .default(DEFAULT_START)
            .interact_text()?;
        args.start = Some(start);
    }

    if args.quality.is_none() {
        let quality: u8 = Input::with_theme(&theme)
            .with_prompt("Quality (1-100)")
            .default(DEFAULT_QUALITY)
            .validate_with(|quality: &u8| -> Result<(), &'static str> {
                if (1..=100).contains(quality) {
                    Ok(())
                } else {
                    Err("quality must be between 1 and 100")
                }
            })
            .interact_text()?;
        args.quality = Some(quality);
    }

    if args.max_height.is_none() {
        let max_height: u32 = Input::with_theme(&theme)
            .with_prompt("Max page height")
            .default(DEFAULT_MAX_HEIGHT)
            .validate_with(|max_height: &u32| -> Result<(), &'static str> {
                if *max_height > 0 {
                    Ok(())
                } else {
                    Err("max height must be greater than 0")
                }
            })
            .interact_text()?;
        args.max_height = Some(max_height);
    }

    Ok(())
}

fn print_report(bar: &ProgressBar, file_report: &FileReport) {
    if bar.is_hidden() {
        println!("{file_report}");
    } else {
        bar.println(file_report.to_string());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let mut args = Args::parse();
    if !args.no_input && io::stdin().is_terminal() {
        prompt_missing(&mut args)?;
    }

    let config = ConfigOverrides::from(args).resolve()?;
    debug!("resolved config {config:?}");

    let bar = ProgressBar::new(0).with_style(ProgressStyle::with_template(
        "[{elapsed_precise}] [{wide_bar}] {pos}/{len}",
    )?);

    let report = run_batch(&config, |event| match event {
        BatchEvent::Init(len) => bar.set_length(u64::try_from(len).unwrap_or(u64::MAX)),
        BatchEvent::Processed(file_report) => {
            print_report(&bar, file_report);
            bar.inc(1);
        }
        BatchEvent::Failed(_) => bar.inc(1),
        BatchEvent::Done => bar.finish_and_clear(),
    })
    .with_context(|| format!("couldn't process {}", config.input_dir))?;

    println!(
        "{} archive(s) compressed, {:.2} MB saved",
        report.processed.len(),
        to_megabytes(report.total_saved_bytes())
    );

    if !report.is_success() {
        let failed = report
            .failures
            .iter()
            .map(|failure| failure.path.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        bail!("{} archive(s) failed: {failed}", report.failures.len());
    }

    Ok(())
}
