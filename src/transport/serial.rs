use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::info;

/// Serial line settings. The device family always runs at 115200 baud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub path: String,
    pub baud_rate: u32,
}

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

// serialport needs a finite timeout; reads that hit it are retried so the
// bridge sees a read that only returns on data or failure.
const POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Read half of an open serial device.
pub struct SerialReader {
    port: Box<dyn SerialPort>,
}

impl Read for SerialReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.port.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                other => return other,
            }
        }
    }
}

/// Write half of an open serial device.
pub struct SerialWriter {
    port: Box<dyn SerialPort>,
}

impl Write for SerialWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

/// Opens the device and splits it into independent read and write handles.
pub fn open(settings: &SerialSettings) -> io::Result<(SerialReader, SerialWriter)> {
    let port = serialport::new(settings.path.as_str(), settings.baud_rate)
        .timeout(POLL_TIMEOUT)
        .open()
        .map_err(io::Error::from)?;
    let writer = port.try_clone().map_err(io::Error::from)?;

    info!(path = %settings.path, baud = settings.baud_rate, "Serial port opened");
    Ok((SerialReader { port }, SerialWriter { port: writer }))
}
