//! Frame capture in candump log format.
//!
//! Each frame becomes one line that `canplayer` and most bus analyzers read:
//!
//! ```text
//! (1700000000.123456) can0 08850225#A5C23C3F15A5D055
//! ```
//!
//! Extended identifiers are written with eight hex digits, standard ones with
//! three.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::protocol::{Error, Result};

/// Thread-safe wrapper around a candump log writer.
#[derive(Clone)]
pub struct CandumpRecorder {
    inner: Arc<Mutex<CandumpWriter>>,
}

impl CandumpRecorder {
    /// Create a recorder that writes to the provided path, truncating any existing file.
    pub fn create(path: &Path, interface: &str) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(Box::new(file), interface))
    }

    /// Create a recorder over any writer.
    #[must_use]
    pub fn from_writer(writer: Box<dyn Write + Send>, interface: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CandumpWriter {
                out: BufWriter::new(writer),
                interface: interface.to_owned(),
            })),
        }
    }

    /// Record a frame with the current system timestamp.
    pub fn record(&self, id: u32, extended: bool, data: &[u8]) -> Result<()> {
        self.record_at(SystemTime::now(), id, extended, data)
    }

    /// Record a frame with an explicit timestamp.
    pub fn record_at(
        &self,
        timestamp: SystemTime,
        id: u32,
        extended: bool,
        data: &[u8],
    ) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::Io(io::Error::other("candump recorder poisoned")))?;
        guard.write_frame(timestamp, id, extended, data)?;
        Ok(())
    }
}

impl std::fmt::Debug for CandumpRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandumpRecorder").finish_non_exhaustive()
    }
}

struct CandumpWriter {
    out: BufWriter<Box<dyn Write + Send>>,
    interface: String,
}

impl CandumpWriter {
    fn write_frame(
        &mut self,
        timestamp: SystemTime,
        id: u32,
        extended: bool,
        data: &[u8],
    ) -> io::Result<()> {
        let line = format_line(timestamp, &self.interface, id, extended, data);
        self.out.write_all(line.as_bytes())?;
        self.out.flush()
    }
}

fn format_line(
    timestamp: SystemTime,
    interface: &str,
    id: u32,
    extended: bool,
    data: &[u8],
) -> String {
    let (sec, usec) = micros(timestamp);
    let mut line = String::with_capacity(48 + data.len() * 2);
    let _ = write!(line, "({sec}.{usec:06}) {interface} ");
    if extended {
        let _ = write!(line, "{:08X}#", id & 0x1FFF_FFFF);
    } else {
        let _ = write!(line, "{:03X}#", id & 0x7FF);
    }
    for byte in data {
        let _ = write!(line, "{byte:02X}");
    }
    line.push('\n');
    line
}

fn micros(timestamp: SystemTime) -> (u64, u32) {
    let duration = timestamp.duration_since(UNIX_EPOCH).unwrap_or_default();
    (duration.as_secs(), duration.subsec_micros())
}
