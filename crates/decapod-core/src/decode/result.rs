use serde::Serialize;

use super::context::LayerRecord;

/// Final status of one packet decode.
///
/// Per-packet conditions are data, never process failures: decoding runs
/// continuously against untrusted input and an error on one packet has no
/// effect on the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DecodeStatus {
    /// Every invoked codec succeeded; unrecognized identifiers stop cleanly
    /// here as well.
    Ok,
    /// A header needed more bytes than the buffer holds.
    Truncated,
    /// A header was internally inconsistent.
    Malformed(String),
    /// The bounded-recursion guard tripped on nested encapsulation.
    EncapsulationLimitExceeded,
}

impl DecodeStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, DecodeStatus::Ok)
    }
}

/// Read-only result of decoding one packet.
///
/// Owns the layer sequence; borrows the trailing payload from the original
/// buffer, so the result cannot outlive the capture data it describes.
///
/// # Examples
/// ```
/// use decapod_core::decode::{CodecRegistry, Decoder, DecodeConfig, ProtocolId};
///
/// let registry = CodecRegistry::with_default_codecs()?;
/// let decoder = Decoder::new(&registry, DecodeConfig::default());
/// let data = [0u8; 4];
/// let packet = decoder.decode(ProtocolId(1), &data);
/// assert!(packet.layers().is_empty());
/// # Ok::<(), decapod_core::decode::RegistryError>(())
/// ```
#[derive(Debug)]
pub struct LayeredPacket<'a> {
    layers: Vec<LayerRecord>,
    status: DecodeStatus,
    payload: &'a [u8],
}

impl<'a> LayeredPacket<'a> {
    pub(crate) fn new(layers: Vec<LayerRecord>, status: DecodeStatus, payload: &'a [u8]) -> Self {
        LayeredPacket {
            layers,
            status,
            payload,
        }
    }

    /// Recognized headers, outermost first.
    pub fn layers(&self) -> &[LayerRecord] {
        &self.layers
    }

    pub fn status(&self) -> &DecodeStatus {
        &self.status
    }

    /// Undecoded trailing bytes (possibly empty).
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Layer chain rendered as `"ethernet > ipv4 > tcp"`; empty string when
    /// nothing was recognized.
    pub fn chain(&self) -> String {
        self.layers
            .iter()
            .map(|layer| layer.codec)
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
