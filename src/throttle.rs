use log::*;
use std::io::{self, Read, Write};

/// A reader with a textual progress indicator for a stream of known length.
///
/// Every read is forwarded to the wrapped reader. Once progress has advanced by more than one percent of the expected
/// total since the last report, or the expected total is reached, a line `<read>/<total> (<percent>%)` ending in a
/// carriage return is written to the sink, so that consecutive reports overwrite each other on a terminal. When the
/// wrapped reader reports end of stream, a single newline is written to keep the last report. A stream drained to
/// exactly the expected total reports the full line once more on the end of stream read, right before the newline.
///
/// Failures writing to the sink are logged and otherwise ignored; they never affect the bytes read.
///
/// The expected total is only used for reporting; nothing checks it against the bytes actually delivered. With an
/// expected total of zero every read with progress is reported, at 100%.
pub struct ThrottledReader<R, W> {
    inner: R,
    sink: W,
    total_expected: u64,
    total_read: u64,
    last_reported: u64,
    finished: bool,
}

impl<R, W> ThrottledReader<R, W>
where
    R: Read,
    W: Write,
{
    pub fn new(inner: R, total_expected: u64, sink: W) -> Self {
        Self {
            inner,
            sink,
            total_expected,
            total_read: 0,
            last_reported: 0,
            finished: false,
        }
    }

    /// How many bytes have been read through this reader so far.
    pub fn total_read(&self) -> u64 {
        self.total_read
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps this reader, returning the underlying reader. Dropping either closes the stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn should_report(&self) -> bool {
        let unit = self.total_expected / 100;
        self.total_read - self.last_reported > unit || self.total_read == self.total_expected
    }

    fn report(&mut self) {
        let percent = if self.total_expected == 0 {
            100.0
        } else {
            self.total_read as f64 / self.total_expected as f64 * 100.0
        };

        self.last_reported = self.total_read;
        let written = write!(self.sink, "{}/{} ({:.0}%)\r", self.total_read, self.total_expected, percent)
            .and_then(|_| self.sink.flush());

        if let Err(e) = written {
            warn!("Failed to write read progress: {}", e);
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Err(e) = self.sink.write_all(b"\n").and_then(|_| self.sink.flush()) {
            warn!("Failed to write read progress: {}", e);
        }
    }
}

impl<R, W> Read for ThrottledReader<R, W>
where
    R: Read,
    W: Write,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let amt = self.inner.read(buf)?;

        self.total_read += amt as u64;

        if self.should_report() {
            self.report();
        }

        if amt == 0 && !buf.is_empty() && !self.finished {
            self.finish();
        }

        Ok(amt)
    }
}
