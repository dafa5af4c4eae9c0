//! Single-writer handle over a frame sink.

use std::sync::Mutex;

use tracing::warn;

use crate::frame::encode_frame;
use crate::sink::{FrameSink, NullSink};
use crate::Result;

/// Shared handle for sending frames to the displays.
///
/// All writes go through one mutex so a frame is always written whole before
/// the next one starts. Sending is best-effort: while disconnected, frames
/// are skipped with a warning instead of failing the render.
pub struct DisplayLink {
    sink: Mutex<Box<dyn FrameSink>>,
}

impl DisplayLink {
    pub fn new(sink: Box<dyn FrameSink>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// A link with no connection; frames are skipped until a sink is
    /// swapped in.
    pub fn disconnected() -> Self {
        Self::new(Box::new(NullSink))
    }

    pub fn is_connected(&self) -> bool {
        self.lock_sink().is_connected()
    }

    /// Swap the underlying sink, e.g. after a reconnect.
    pub fn replace_sink(&self, sink: Box<dyn FrameSink>) {
        *self.lock_sink() = sink;
    }

    /// Frame the payload for `display_index` and write it out.
    ///
    /// A write failure drops the connection; the frame is lost (the next
    /// render supersedes it) and the caller decides what to log.
    pub fn send(&self, display_index: u8, payload: &[u8]) -> Result<()> {
        let mut sink = self.lock_sink();
        if !sink.is_connected() {
            warn!(display_index, "not connected, skipping frame");
            return Ok(());
        }

        let frame = encode_frame(display_index, payload);
        if let Err(err) = sink.write_frame(&frame) {
            *sink = Box::new(NullSink);
            return Err(err.into());
        }
        Ok(())
    }

    fn lock_sink(&self) -> std::sync::MutexGuard<'_, Box<dyn FrameSink>> {
        self.sink.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferSink;

    #[test]
    fn frames_pass_through_while_connected() {
        let sink = BufferSink::new();
        let handle = sink.handle();
        let link = DisplayLink::new(Box::new(sink));

        link.send(2, &[0xAA]).unwrap();

        let frames = handle.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].starts_with(b"<<START>>2|"));
    }

    #[test]
    fn disconnected_link_skips_without_error() {
        let link = DisplayLink::disconnected();
        assert!(!link.is_connected());
        assert!(link.send(0, &[1, 2, 3]).is_ok());
    }

    #[test]
    fn reconnect_swaps_the_sink() {
        let link = DisplayLink::disconnected();

        let sink = BufferSink::new();
        let handle = sink.handle();
        link.replace_sink(Box::new(sink));

        assert!(link.is_connected());
        link.send(1, &[0x55]).unwrap();
        assert_eq!(handle.lock().unwrap().len(), 1);
    }

    #[test]
    fn write_failure_drops_the_connection() {
        struct FailingSink;
        impl FrameSink for FailingSink {
            fn is_connected(&self) -> bool {
                true
            }
            fn write_frame(&mut self, _frame: &[u8]) -> std::io::Result<()> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let link = DisplayLink::new(Box::new(FailingSink));
        assert!(link.send(0, &[1]).is_err());
        assert!(!link.is_connected());
    }
}
