use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Length of a fingerprint in hex characters: `16`.
pub const FINGERPRINT_LEN: usize = 16;

/// Returns a short, stable identifier for the full content of `reader`.
///
/// The identifier is the first eight bytes of the content's SHA-256 digest as lowercase hex. It only fails if reading
/// fails.
pub fn fingerprint<R>(mut reader: R) -> io::Result<String>
where
    R: Read,
{
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(encode(hasher))
}

/// Returns a fingerprint of freshly generated random bytes.
pub fn random_id() -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{:x}", rand::random::<u64>()));
    encode(hasher)
}

fn encode(hasher: Sha256) -> String {
    hex::encode(&hasher.finalize()[..FINGERPRINT_LEN / 2])
}

/// A pass-through reader that fingerprints everything read through it.
pub struct FingerprintReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R> FingerprintReader<R>
where
    R: Read,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// The fingerprint of the bytes read so far.
    pub fn fingerprint(&self) -> String {
        encode(self.hasher.clone())
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> Read for FingerprintReader<R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let amt = self.inner.read(buf)?;
        self.hasher.update(&buf[..amt]);
        Ok(amt)
    }
}
