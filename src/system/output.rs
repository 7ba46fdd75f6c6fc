// EN: src/system/output.rs

use crate::constants::TRUNCATION_MARKER;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// In-memory sink for captured process output with a byte cap.
///
/// Writes past the cap are accepted and dropped so the producing process never sees
/// a broken pipe; the dropped tail is replaced by a truncation marker on read.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
    limit: usize,
    truncated: bool,
}

impl OutputBuffer {
    /// A buffer holding at most `limit` bytes. `0` disables the cap.
    pub fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
            truncated: false,
        }
    }

    /// Appends as much of `chunk` as the cap allows.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.limit == 0 {
            self.bytes.extend_from_slice(chunk);
            return;
        }
        let remaining = self.limit.saturating_sub(self.bytes.len());
        if chunk.len() > remaining {
            self.truncated = true;
        }
        let take = chunk.len().min(remaining);
        self.bytes.extend_from_slice(chunk.get(..take).unwrap_or_default());
    }

    /// Whether anything was dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The captured text (lossy UTF-8), with the truncation marker when applicable.
    pub fn contents(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.truncated {
            text.push_str(TRUNCATION_MARKER);
        }
        text
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.push(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An [`OutputBuffer`] shared between the pipe-draining threads of one process, so that
/// stdout and stderr land interleaved in a single stream.
#[derive(Debug, Clone, Default)]
pub struct SharedOutput {
    inner: Arc<Mutex<OutputBuffer>>,
}

impl SharedOutput {
    /// A shared buffer capped at `limit` bytes (`0` = unlimited).
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(OutputBuffer::new(limit))),
        }
    }

    /// Copies everything `reader` yields into the buffer on a background thread.
    pub fn drain<R>(&self, mut reader: R) -> io::Result<JoinHandle<()>>
    where
        R: Read + Send + 'static,
    {
        let sink = self.clone();
        thread::Builder::new()
            .name("spellcast-output".to_string())
            .spawn(move || {
                let mut chunk = [0u8; 8192];
                loop {
                    match reader.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => sink.push(chunk.get(..n).unwrap_or_default()),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            log::debug!("Output pipe closed with error: {}", e);
                            break;
                        }
                    }
                }
            })
    }

    /// Appends a chunk.
    pub fn push(&self, chunk: &[u8]) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(chunk);
    }

    /// The captured text so far.
    pub fn contents(&self) -> String {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_truncates_at_limit() {
        let mut buffer = OutputBuffer::new(5);
        buffer.push(b"hello");
        assert!(!buffer.is_truncated());
        buffer.push(b" world");
        assert!(buffer.is_truncated());
        assert_eq!(buffer.contents(), format!("hello{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_partial_chunk_fits_remaining_space() {
        let mut buffer = OutputBuffer::new(8);
        buffer.push(b"abc");
        buffer.push(b"defghij");
        assert!(buffer.is_truncated());
        assert!(buffer.contents().starts_with("abcdefgh"));
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        let mut buffer = OutputBuffer::new(0);
        let big = vec![b'x'; 10_000];
        buffer.write_all(&big).unwrap();
        assert!(!buffer.is_truncated());
        assert_eq!(buffer.contents().len(), 10_000);
    }

    #[test]
    fn test_shared_output_drains_reader() {
        let shared = SharedOutput::new(0);
        let handle = shared.drain(io::Cursor::new(b"from a pipe\n".to_vec())).unwrap();
        handle.join().unwrap();
        assert_eq!(shared.contents(), "from a pipe\n");
    }
}
