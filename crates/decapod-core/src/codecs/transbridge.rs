use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::LINKTYPE_ETHERNET;

/// Transparent Ethernet bridging (ethertype 0x6558): the GRE payload is a
/// complete Ethernet frame with no intermediate header.
const ETHERTYPE_TEB: u32 = 0x6558;

pub(crate) struct TransbridgeCodec;

impl Codec for TransbridgeCodec {
    fn name(&self) -> &'static str {
        "transbridge"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::EtherType, ETHERTYPE_TEB)]
    }

    fn decode(&self, _id: ProtocolId, _data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        // Zero-length marker layer; the inner Ethernet codec does the work.
        DecodeOutcome::Continue {
            header_len: 0,
            next: Claim::new(Scope::Link, LINKTYPE_ETHERNET),
        }
    }
}
