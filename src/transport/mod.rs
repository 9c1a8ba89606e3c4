//! Transport seam.
//!
//! The read half is any `std::io::Read` owned by the bridge thread. The write
//! half lives behind `WriteBack` so external callers never touch the reader.

pub mod mock;
pub mod serial;

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

use crate::error::BridgeError;

/// Best-effort write path to the device.
#[derive(Clone)]
pub struct WriteBack {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl WriteBack {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Writes `payload` unchanged. Blocks on the transport.
    pub fn write_blocking(&self, payload: &[u8]) -> Result<usize, BridgeError> {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write_all(payload)
            .and_then(|_| sink.flush())
            .map_err(BridgeError::TransportWrite)?;
        Ok(payload.len())
    }

    /// Runs the write on the blocking pool so async callers are never stalled.
    pub async fn publish(&self, payload: Vec<u8>) -> Result<usize, BridgeError> {
        info!(payload = %String::from_utf8_lossy(&payload), "Write to transport");
        let handle = self.clone();
        let result = tokio::task::spawn_blocking(move || handle.write_blocking(&payload))
            .await
            .map_err(|e| BridgeError::TransportWrite(io::Error::new(io::ErrorKind::Other, e)))?;

        if let Err(e) = &result {
            warn!(error = %e, "Error writing to transport");
        }
        result
    }
}
