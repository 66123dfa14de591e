use crate::{PipeviewError, Result};
use crossbeam_utils::atomic::AtomicCell;
use log::*;
use std::{
    io::{self, Read, Write},
    sync::{
        mpsc::{self, Receiver, SyncSender},
        Arc,
    },
    thread::{self, JoinHandle},
};

/// How many bytes the relay thread reads from its source at a time: `2048`.
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

enum Message {
    Chunk(Vec<u8>),
    End,
    Failed(io::Error),
}

#[derive(Debug)]
enum Terminal {
    Open,
    Ended,
    Failed(io::ErrorKind, String),
}

/// A pass-through reader that copies its source on a background thread, comparable to the unix command `pv`.
///
/// Reading a `Relay` yields exactly the bytes the source yields, in order. After every chunk read from the source the
/// background thread writes a line `--> <total> bytes` to the progress sink, before the chunk is handed over to the
/// reader. End of stream and read errors from the source reach the reader as-is.
///
/// The hand-off is a rendezvous: the background thread blocks until the chunk is taken, so at most one chunk is in
/// flight. Dropping the `Relay` signals the background thread to stop. A thread blocked inside the source's `read`
/// only notices once that read returns.
pub struct Relay {
    rx: Receiver<Message>,
    chunk: Vec<u8>,
    pos: usize,
    terminal: Terminal,
    done: Arc<AtomicCell<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl Relay {
    /// Starts relaying `source` with the default chunk size, writing progress lines to `sink`.
    pub fn spawn<R, W>(source: R, sink: W) -> Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self::with_chunk_size(source, sink, DEFAULT_CHUNK_SIZE)
    }

    /// Starts relaying `source` reading up to `chunk_size` bytes at a time. A chunk size of zero uses the default.
    pub fn with_chunk_size<R, W>(source: R, sink: W, chunk_size: usize) -> Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let chunk_size = if chunk_size == 0 { DEFAULT_CHUNK_SIZE } else { chunk_size };
        let (tx, rx) = mpsc::sync_channel(0);
        let done = Arc::new(AtomicCell::new(false));

        let producer_done = Arc::clone(&done);
        let handle = thread::Builder::new()
            .name("relay".to_string())
            .spawn(move || relay_thread(source, sink, tx, &producer_done, chunk_size))?;

        Ok(Self {
            rx,
            chunk: Vec::new(),
            pos: 0,
            terminal: Terminal::Open,
            done,
            handle: Some(handle),
        })
    }

    /// Stops the relay and waits for its background thread to exit.
    ///
    /// This blocks for as long as the thread's current read from the source blocks.
    pub fn close(mut self) -> Result<()> {
        let handle = self.handle.take();
        drop(self);

        match handle {
            Some(handle) => handle.join().map_err(|_| PipeviewError::Panicked),
            None => Ok(()),
        }
    }

    fn receive(&mut self) -> io::Result<bool> {
        match self.rx.recv() {
            Ok(Message::Chunk(chunk)) => {
                self.chunk = chunk;
                self.pos = 0;
                Ok(true)
            }
            Ok(Message::End) => {
                self.terminal = Terminal::Ended;
                Ok(false)
            }
            Ok(Message::Failed(e)) => {
                self.terminal = Terminal::Failed(e.kind(), e.to_string());
                Err(e)
            }
            // the sender is only dropped without a terminal message when the thread panicked
            Err(_) => {
                let kind = io::ErrorKind::BrokenPipe;
                let msg = "relay thread exited without reaching the end of the stream".to_string();
                self.terminal = Terminal::Failed(kind, msg.clone());
                Err(io::Error::new(kind, msg))
            }
        }
    }
}

impl Read for Relay {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let pending = &self.chunk[self.pos..];
            if !pending.is_empty() {
                let amt = pending.len().min(buf.len());
                buf[..amt].copy_from_slice(&pending[..amt]);
                self.pos += amt;
                return Ok(amt);
            }

            match &self.terminal {
                Terminal::Open => (),
                Terminal::Ended => return Ok(0),
                Terminal::Failed(kind, msg) => return Err(io::Error::new(*kind, msg.clone())),
            }

            if !self.receive()? {
                return Ok(0);
            }
        }
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        // the receiver is dropped right after, which wakes a thread blocked handing over a chunk
        self.done.store(true);
    }
}

fn relay_thread<R, W>(mut source: R, mut sink: W, tx: SyncSender<Message>, done: &AtomicCell<bool>, chunk_size: usize)
where
    R: Read,
    W: Write,
{
    let mut data = vec![0; chunk_size];
    let mut total_bytes: u64 = 0;

    loop {
        if done.load() {
            debug!("Relay stopped by its reader after {} bytes", total_bytes);
            return;
        }

        let amt = match source.read(&mut data) {
            Ok(0) => {
                trace!("Relay source ended after {} bytes", total_bytes);
                // nobody may be listening anymore, which is fine
                let _ = tx.send(Message::End);
                return;
            }
            Ok(amt) => amt,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("Relay source failed after {} bytes: {}", total_bytes, e);
                let _ = tx.send(Message::Failed(e));
                return;
            }
        };

        total_bytes += amt as u64;
        if let Err(e) = writeln!(sink, "--> {} bytes", total_bytes).and_then(|_| sink.flush()) {
            warn!("Failed to write relay progress: {}", e);
        }

        if done.load() {
            debug!("Relay stopped by its reader after {} bytes", total_bytes);
            return;
        }

        trace!("Relaying {} bytes", amt);
        if tx.send(Message::Chunk(data[..amt].to_vec())).is_err() {
            debug!("Relay reader went away after {} bytes", total_bytes);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Relay;
    use crate::test_util::SharedSink;
    use std::{
        error::Error,
        fmt,
        io::{self, Cursor, Read},
    };

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl Error for Boom {}

    /// Yields `good` bytes, then fails with [`Boom`] on every read.
    struct FailingRead {
        good: Cursor<Vec<u8>>,
    }

    impl Read for FailingRead {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.good.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, Boom)),
                amt => Ok(amt),
            }
        }
    }

    /// Fails with `Interrupted` every other read.
    struct InterruptedRead {
        inner: Cursor<Vec<u8>>,
        interrupt: bool,
    }

    impl Read for InterruptedRead {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                Err(io::ErrorKind::Interrupted.into())
            } else {
                self.inner.read(buf)
            }
        }
    }

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn progress_totals(sink: &SharedSink) -> Vec<u64> {
        sink.contents()
            .lines()
            .map(|line| {
                line.strip_prefix("--> ")
                    .and_then(|l| l.strip_suffix(" bytes"))
                    .expect("malformed progress line")
                    .parse()
                    .expect("progress total is not a number")
            })
            .collect()
    }

    #[test]
    fn relays_bytes_and_reports_every_chunk() {
        let data = payload(5000);
        let sink = SharedSink::default();
        let mut relay = Relay::spawn(Cursor::new(data.clone()), sink.clone()).expect("failed to spawn relay");

        let mut out = Vec::new();
        relay.read_to_end(&mut out).expect("relay read failed");

        assert_eq!(out, data);
        assert_eq!(sink.contents(), "--> 2048 bytes\n--> 4096 bytes\n--> 5000 bytes\n");
    }

    #[test]
    fn small_reads_see_every_byte() {
        let data = payload(10_000);
        let sink = SharedSink::default();
        let mut relay = Relay::with_chunk_size(Cursor::new(data.clone()), sink.clone(), 333).unwrap();

        let mut out = Vec::new();
        let mut buf = [0; 7];
        loop {
            match relay.read(&mut buf).unwrap() {
                0 => break,
                amt => out.extend_from_slice(&buf[..amt]),
            }
        }

        assert_eq!(out, data);

        let totals = progress_totals(&sink);
        assert!(totals.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(totals.last(), Some(&10_000));
    }

    #[test]
    fn empty_source_reports_nothing() {
        let sink = SharedSink::default();
        let mut relay = Relay::spawn(io::empty(), sink.clone()).unwrap();

        let mut out = Vec::new();
        assert_eq!(relay.read_to_end(&mut out).unwrap(), 0);
        assert_eq!(relay.read(&mut [0; 16]).unwrap(), 0);
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn source_error_passes_through_unwrapped() {
        let source = FailingRead {
            good: Cursor::new(payload(3000)),
        };
        let sink = SharedSink::default();
        let mut relay = Relay::spawn(source, sink.clone()).unwrap();

        let mut out = Vec::new();
        let err = relay.read_to_end(&mut out).unwrap_err();

        assert_eq!(out, payload(3000));
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.get_ref().and_then(|e| e.downcast_ref::<Boom>()).is_some());
        // no line for the failed read
        assert_eq!(progress_totals(&sink), vec![2048, 3000]);

        let again = relay.read(&mut [0; 16]).unwrap_err();
        assert_eq!(again.kind(), io::ErrorKind::Other);
        assert_eq!(again.to_string(), "boom");
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let data = payload(4500);
        let source = InterruptedRead {
            inner: Cursor::new(data.clone()),
            interrupt: false,
        };
        let mut relay = Relay::spawn(source, io::sink()).unwrap();

        let mut out = Vec::new();
        relay.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn abandoned_relay_stops_its_thread() {
        let sink = SharedSink::default();
        let mut relay = Relay::spawn(io::repeat(7), sink.clone()).unwrap();

        let mut buf = [0; 100];
        relay.read_exact(&mut buf).unwrap();
        assert!(buf.iter().all(|b| *b == 7));

        relay.close().expect("relay thread did not exit cleanly");
        assert!(!progress_totals(&sink).is_empty());
    }

    #[test]
    fn empty_buffer_reads_nothing() {
        let mut relay = Relay::spawn(Cursor::new(payload(10)), io::sink()).unwrap();
        assert_eq!(relay.read(&mut []).unwrap(), 0);

        let mut out = Vec::new();
        relay.read_to_end(&mut out).unwrap();
        assert_eq!(out, payload(10));
    }
}
