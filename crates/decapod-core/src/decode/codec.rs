use super::context::DecodeContext;
use super::scope::{Claim, ProtocolId};

/// Capability contract implemented once per protocol.
///
/// Codecs are stateless and re-entrant: `decode` receives the identifier it
/// was invoked under (a codec may claim several), the remaining buffer slice
/// starting at the cursor, and a read-only view of the per-packet context.
/// They never mutate shared state, so one codec instance serves every packet
/// on every thread.
pub trait Codec: Send + Sync {
    /// Stable codec name used in layer records and reports.
    fn name(&self) -> &'static str;

    /// Identifiers this codec handles, each within its declared scope.
    ///
    /// Claim sets must be disjoint per scope across all registered codecs;
    /// the registry rejects collisions at build time.
    fn claims(&self) -> Vec<Claim>;

    /// Inspect `data` (the unconsumed tail of the packet) and report how the
    /// dispatch loop should proceed.
    fn decode(&self, id: ProtocolId, data: &[u8], ctx: &DecodeContext) -> DecodeOutcome;
}

/// Result of a single codec invocation.
///
/// Codecs are pure: they report the header length they recognized and the
/// dispatcher alone advances the cursor and appends the layer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Header recognized; look up `next` to keep walking inward.
    Continue { header_len: usize, next: Claim },
    /// Innermost recognized layer; the rest is opaque payload.
    Done { header_len: usize },
    /// Buffer too short for this header; `needed` is the minimum length.
    Truncated { needed: usize },
    /// Header fields are internally inconsistent.
    Malformed { reason: &'static str },
}

impl DecodeOutcome {
    /// Length consumed by a successful outcome, if any.
    pub fn header_len(&self) -> Option<usize> {
        match self {
            DecodeOutcome::Continue { header_len, .. } | DecodeOutcome::Done { header_len } => {
                Some(*header_len)
            }
            _ => None,
        }
    }
}
