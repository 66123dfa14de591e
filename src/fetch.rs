use crate::{PipeviewError, Result};
use log::*;
use std::{
    fmt,
    fs::File,
    io::{self, Read},
    time::Duration,
};
use url::Url;

/// The default timeout to wait for HTTP connects to succeed: 30 seconds.
pub const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// The default timeout for individual reads of an HTTP response body: 10 seconds.
pub const HTTP_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// An opened download: the response's status, its length if known, and a reader over its body.
///
/// `Download` reads the body itself, so it can be handed straight to [`Relay`](crate::Relay) or
/// [`ThrottledReader`](crate::ThrottledReader).
pub struct Download {
    status: Option<u16>,
    length: Option<u64>,
    reader: Box<dyn Read + Send>,
}

impl Download {
    /// Requests the given URL and returns its body.
    ///
    /// `http` and `https` URLs are fetched with a GET request, `file` URLs are opened from the local filesystem.
    ///
    /// # Errors
    ///
    /// - [`PipeviewError::Url`] if `url` isn't a valid URL.
    /// - [`PipeviewError::HTTP`] on transport failure.
    /// - [`PipeviewError::RequestFailed`] if the server responds with a status of 400 or above.
    /// - [`PipeviewError::UnsupportedUrlScheme`] for any scheme other than `http`, `https` or `file`.
    pub fn open<S>(url: S, connect_timeout: Duration, read_timeout: Duration) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let url = Url::parse(url.as_ref())?;
        Self::open_url(&url, connect_timeout, read_timeout)
    }

    /// Like [`open`](Download::open), with an already parsed URL.
    pub fn open_url(url: &Url, connect_timeout: Duration, read_timeout: Duration) -> Result<Self> {
        match url.scheme() {
            "http" | "https" => {
                let agent = ureq::AgentBuilder::new()
                    .timeout_connect(connect_timeout)
                    .timeout_read(read_timeout)
                    .build();

                let resp = match agent.get(url.as_str()).call() {
                    Ok(resp) => resp,
                    Err(ureq::Error::Status(code, resp)) => {
                        return Err(PipeviewError::RequestFailed(code, resp.into_string()?));
                    }
                    Err(e) => return Err(e.into()),
                };

                // the header names may or may not be lowercased
                let length = resp
                    .header("Content-Length")
                    .or_else(|| resp.header("content-length"))
                    .map(str::parse::<u64>)
                    .transpose()?;

                match length {
                    Some(len) => debug!("Got response status {} with length {}", resp.status(), len),
                    None => debug!("Got response status {} with indeterminate length", resp.status()),
                }

                Ok(Self {
                    status: Some(resp.status()),
                    length,
                    reader: Box::new(resp.into_reader()),
                })
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| PipeviewError::InvalidFilePath(url.as_str().to_string()))?;

                let file = File::open(&path)?;
                let length = file.metadata()?.len();
                debug!("Opened {} with length {}", path.display(), length);

                Ok(Self {
                    status: None,
                    length: Some(length),
                    reader: Box::new(file),
                })
            }
            scheme => Err(PipeviewError::UnsupportedUrlScheme(scheme.to_string())),
        }
    }

    /// The HTTP status code of the response, or `None` for local files.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The length of the body, if known. Servers using chunked transfer encoding don't announce a length.
    pub fn length(&self) -> Option<u64> {
        self.length
    }
}

impl Read for Download {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Download")
            .field("status", &self.status)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
