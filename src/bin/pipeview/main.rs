mod config;
mod logging;

use config::{Config, ProgressMode};
use log::*;
use num_format::{SystemLocale, ToFormattedString};
use pipeview::{human_duration, Download, FingerprintReader, Relay, ThrottledReader};
use std::{
    fs::File,
    io::{self, Read, Write},
    path::PathBuf,
    time::{Duration, Instant},
};
use structopt::StructOpt;

const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, StructOpt)]
#[structopt(name = APP_NAME, author, about)]
struct Opt {
    /// Enable verbose logging
    #[structopt(short, long)]
    verbose: bool,
    /// Custom path to the app's configuration file. By default the app will use the system-specific user configuration
    /// directory.
    #[structopt(short, long)]
    config: Option<PathBuf>,
    /// The timeout to wait for HTTP connects to succeed in milliseconds. Overrides the configuration file.
    #[structopt(short, long)]
    timeout: Option<u64>,
    /// How to report progress. Overrides the configuration file.
    #[structopt(short, long, possible_values = ProgressMode::VARIANTS)]
    mode: Option<ProgressMode>,
    /// Write the content to this file instead of stdout.
    #[structopt(short, long)]
    output: Option<PathBuf>,
    /// The URL to fetch. `http`, `https` and `file` URLs are supported.
    url: String,
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    setup_logging(&opt)?;
    let cfg = load_config(&opt)?;

    debug!("{:?}", opt);
    debug!("{:?}", cfg);

    let connect_timeout = Duration::from_millis(opt.timeout.unwrap_or(cfg.connect_timeout));
    let read_timeout = Duration::from_millis(cfg.read_timeout);
    let mode = opt.mode.unwrap_or(cfg.mode);

    let start = Instant::now();
    let download = Download::open(&opt.url, connect_timeout, read_timeout)?;

    if let Some(len) = download.length() {
        info!("Reading {} with length {}", opt.url, len)
    } else {
        info!("Reading {} with indeterminate length", opt.url)
    }

    let reader: Box<dyn Read> = match (mode, download.length()) {
        (ProgressMode::Throttled, Some(len)) => Box::new(ThrottledReader::new(download, len, io::stderr())),
        (ProgressMode::Throttled, None) => {
            warn!("Cannot report percentages without a known length, reporting byte counts instead");
            Box::new(Relay::with_chunk_size(download, io::stderr(), cfg.chunk_size)?)
        }
        (ProgressMode::Relay, _) => Box::new(Relay::with_chunk_size(download, io::stderr(), cfg.chunk_size)?),
        (ProgressMode::Quiet, _) => Box::new(download),
    };

    let mut reader = FingerprintReader::new(reader);
    let written = match &opt.output {
        Some(path) => copy_to(&mut reader, File::create(path)?)?,
        None => copy_to(&mut reader, io::stdout().lock())?,
    };

    let locale = SystemLocale::default()?;
    info!(
        "Read {} bytes with fingerprint {} in {}",
        written.to_formatted_string(&locale),
        reader.fingerprint(),
        human_duration(start.elapsed()).to_lowercase()
    );

    Ok(())
}

fn copy_to<R, W>(reader: &mut R, mut writer: W) -> io::Result<u64>
where
    R: Read,
    W: Write,
{
    let written = io::copy(reader, &mut writer)?;
    writer.flush()?;
    Ok(written)
}

fn setup_logging(opt: &Opt) -> anyhow::Result<()> {
    logging::setup_logging(if opt.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    })?;
    Ok(())
}

fn load_config(opt: &Opt) -> anyhow::Result<Config> {
    Ok(match opt.config.as_deref() {
        Some(path) => confy::load_path(path)?,
        None => confy::load(APP_NAME)?,
    })
}
