//! Byte sinks the display link can write frames to.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};

use crate::{LinkError, Result};

/// Write timeout for a single frame.
const WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// A byte-oriented connection a frame can be written to.
pub trait FrameSink: Send {
    /// Whether the sink can currently accept writes.
    fn is_connected(&self) -> bool;

    /// Write one complete frame in a single call.
    fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()>;
}

/// Sink backed by a physical serial port.
pub struct SerialSink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialSink {
    /// Open the serial port at the given baud rate.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|source| LinkError::Open {
                port: path.to_string(),
                source,
            })?;
        info!(path, baud_rate, "serial port opened");
        Ok(Self { port })
    }
}

impl FrameSink for SerialSink {
    fn is_connected(&self) -> bool {
        true
    }

    fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()
    }
}

/// Sink that captures frames in memory. Used in dry-run mode and tests.
#[derive(Default)]
pub struct BufferSink {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for inspecting captured frames after the sink has been moved
    /// into a link.
    pub fn handle(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.frames)
    }
}

impl FrameSink for BufferSink {
    fn is_connected(&self) -> bool {
        true
    }

    fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
        debug!(len = frame.len(), "captured frame");
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(frame.to_vec());
        Ok(())
    }
}

/// Sink representing an absent connection. Never accepts writes.
#[derive(Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn is_connected(&self) -> bool {
        false
    }

    fn write_frame(&mut self, _frame: &[u8]) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "no serial connection",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_captures_frames() {
        let mut sink = BufferSink::new();
        let handle = sink.handle();

        sink.write_frame(&[1, 2, 3]).unwrap();
        sink.write_frame(&[4]).unwrap();

        let frames = handle.lock().unwrap();
        assert_eq!(frames.as_slice(), &[vec![1, 2, 3], vec![4]]);
    }

    #[test]
    fn null_sink_reports_disconnected() {
        let mut sink = NullSink;
        assert!(!sink.is_connected());
        assert!(sink.write_frame(&[0]).is_err());
    }
}
