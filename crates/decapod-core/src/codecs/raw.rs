use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::{ETHERTYPE_IPV4, ETHERTYPE_IPV6};

const LINKTYPE_RAW: u32 = 101;
const LINKTYPE_IPV4: u32 = 228;
const LINKTYPE_IPV6: u32 = 229;

/// Headerless raw-IP captures: the version nibble of the first byte selects
/// the network codec. Appends a zero-length marker layer.
pub(crate) struct RawCodec;

impl Codec for RawCodec {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new(Scope::Link, LINKTYPE_RAW),
            Claim::new(Scope::Link, LINKTYPE_IPV4),
            Claim::new(Scope::Link, LINKTYPE_IPV6),
        ]
    }

    fn decode(&self, id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(id, data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(id: ProtocolId, data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    let version = reader.u8(0)? >> 4;

    let ethertype = match version {
        4 => ETHERTYPE_IPV4,
        6 => ETHERTYPE_IPV6,
        _ => {
            return Ok(DecodeOutcome::Malformed {
                reason: "raw capture payload is neither IPv4 nor IPv6",
            });
        }
    };

    // The version-pinned linktypes must match the observed nibble.
    let pinned = match id.0 {
        LINKTYPE_IPV4 => Some(ETHERTYPE_IPV4),
        LINKTYPE_IPV6 => Some(ETHERTYPE_IPV6),
        _ => None,
    };
    if pinned.is_some_and(|expected| expected != ethertype) {
        return Ok(DecodeOutcome::Malformed {
            reason: "IP version disagrees with capture linktype",
        });
    }

    Ok(DecodeOutcome::Continue {
        header_len: 0,
        next: Claim::new(Scope::EtherType, ethertype),
    })
}
