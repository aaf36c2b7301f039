//! Packet acquisition.
//!
//! Sources emit raw frames plus the link-layer type the decoder needs as its
//! entry identifier. All file I/O lives here; the decode engine never touches
//! the filesystem.

mod pcap;

pub use pcap::PcapFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured frame.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    /// Capture timestamp in seconds since the epoch, when the format
    /// provides one.
    pub ts: Option<f64>,
    /// Link-layer type of `data`, the decoder's entry identifier.
    pub linktype: Linktype,
    /// Raw frame bytes.
    pub data: Vec<u8>,
}

/// Pull-based packet supplier; `None` signals end of capture.
pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error ({context}): {message}")]
    Capture {
        context: &'static str,
        message: String,
    },
}
