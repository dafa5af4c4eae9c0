//! Serial link to the mixer deck displays.
//!
//! Provides the framed wire protocol, the byte-sink abstraction over the
//! physical serial port, and the single-writer [`DisplayLink`] used by the
//! rendering side to address individual displays.

pub mod frame;
pub mod link;
pub mod sink;

// Re-exports for convenience
pub use frame::{encode_frame, END_MARKER, START_MARKER};
pub use link::DisplayLink;
pub use sink::{BufferSink, FrameSink, SerialSink};

/// Errors that can occur on the display link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    #[error("serial write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Result type alias for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;
