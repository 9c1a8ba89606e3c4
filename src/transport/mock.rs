use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// In-memory stand-in for a serial device: replays scripted reads in order.
/// Once the script is exhausted every read returns 0 (end of stream).
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<io::Result<Vec<u8>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.script.push_back(Ok(bytes.as_ref().to_vec()));
        self
    }

    pub fn fail(mut self, kind: io::ErrorKind) -> Self {
        self.script.push_back(Err(io::Error::new(kind, "scripted failure")));
        self
    }
}

impl Read for ScriptedTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.script.pop_front() {
            None => Ok(0),
            Some(Err(e)) => Err(e),
            Some(Ok(mut bytes)) => {
                // Chunks larger than the caller's buffer are split across reads.
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.script.push_front(Ok(bytes.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}

/// Write half that records everything written, or fails every write.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    written: Arc<Mutex<Vec<u8>>>,
    broken: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.broken {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
