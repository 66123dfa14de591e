//! Stream instrumentation for download pipelines.
//!
//! The two stream wrappers pass bytes through unchanged while reporting progress to a writable sink:
//!
//! - [`Relay`] copies a source on a background thread and writes `--> <total> bytes` after every chunk.
//! - [`ThrottledReader`] wraps a stream of known length and writes an overwritable percentage line at most once per
//!   percent of progress.
//!
//! ```no_run
//! use pipeview::{Download, Relay};
//! use std::{io, time::Duration};
//!
//! # fn main() -> pipeview::Result<()> {
//! let download = Download::open("https://example.com/", Duration::from_secs(30), Duration::from_secs(10))?;
//! let mut body = Relay::spawn(download, io::stderr())?;
//! io::copy(&mut body, &mut io::sink())?;
//! # Ok(())
//! # }
//! ```

mod duration;
mod error;
mod fetch;
mod fingerprint;
mod relay;
mod task;
mod throttle;

pub use duration::human_duration;
pub use error::{PipeviewError, Result};
pub use fetch::{Download, HTTP_CONNECT_TIMEOUT, HTTP_READ_TIMEOUT};
pub use fingerprint::{fingerprint, random_id, FingerprintReader, FINGERPRINT_LEN};
pub use relay::{Relay, DEFAULT_CHUNK_SIZE};
pub use task::spawn_reporting;
pub use throttle::ThrottledReader;
