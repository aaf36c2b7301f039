use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::{ETHERTYPE_IPV4, ETHERTYPE_IPV6};

const ETHERTYPE_MPLS_UNICAST: u32 = 0x8847;
const ETHERTYPE_MPLS_MULTICAST: u32 = 0x8848;

const ENTRY_LEN: usize = 4;
const BOTTOM_OF_STACK: u32 = 0x0000_0100;
/// Cap on label stack entries; real stacks rarely exceed a handful.
const MAX_LABELS: usize = 16;

/// MPLS label stacks (RFC 3032). Walks entries to the bottom-of-stack bit,
/// then sniffs the payload version nibble.
pub(crate) struct MplsCodec;

impl Codec for MplsCodec {
    fn name(&self) -> &'static str {
        "mpls"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new(Scope::EtherType, ETHERTYPE_MPLS_UNICAST),
            Claim::new(Scope::EtherType, ETHERTYPE_MPLS_MULTICAST),
        ]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);

    let mut entries = 0;
    loop {
        let entry = reader.u32_be(entries * ENTRY_LEN)?;
        entries += 1;
        if entry & BOTTOM_OF_STACK != 0 {
            break;
        }
        if entries >= MAX_LABELS {
            return Ok(DecodeOutcome::Malformed {
                reason: "MPLS label stack too deep",
            });
        }
    }
    let header_len = entries * ENTRY_LEN;

    // No explicit payload type; sniff the first nibble after the stack.
    let next = match reader.u8(header_len) {
        Ok(byte) => match byte >> 4 {
            4 => Some(ETHERTYPE_IPV4),
            6 => Some(ETHERTYPE_IPV6),
            _ => None,
        },
        Err(_) => None,
    };

    match next {
        Some(ethertype) => Ok(DecodeOutcome::Continue {
            header_len,
            next: Claim::new(Scope::EtherType, ethertype),
        }),
        None => Ok(DecodeOutcome::Done { header_len }),
    }
}
