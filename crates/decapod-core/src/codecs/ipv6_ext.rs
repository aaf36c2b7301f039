use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};

const IPPROTO_HOPOPTS: u32 = 0;
const IPPROTO_ROUTING: u32 = 43;
const IPPROTO_FRAGMENT: u32 = 44;
const IPPROTO_DSTOPTS: u32 = 60;

const FRAGMENT_LEN: usize = 8;
const FRAG_FIELD_OFFSET: usize = 2;
const FRAG_OFFSET_MASK: u16 = 0xFFF8;

/// IPv6 extension headers that keep the next-header chain going: hop-by-hop,
/// routing, fragment, and destination options.
pub(crate) struct Ipv6ExtCodec;

impl Codec for Ipv6ExtCodec {
    fn name(&self) -> &'static str {
        "ipv6_ext"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new(Scope::IpProto, IPPROTO_HOPOPTS),
            Claim::new(Scope::IpProto, IPPROTO_ROUTING),
            Claim::new(Scope::IpProto, IPPROTO_FRAGMENT),
            Claim::new(Scope::IpProto, IPPROTO_DSTOPTS),
        ]
    }

    fn decode(&self, id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(id, data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(id: ProtocolId, data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    let next = reader.u8(0)?;

    if id.0 == IPPROTO_FRAGMENT {
        // Fixed 8-byte header. Non-first fragments end recognition.
        reader.require(FRAGMENT_LEN)?;
        let frag = reader.u16_be(FRAG_FIELD_OFFSET)?;
        if frag & FRAG_OFFSET_MASK != 0 {
            return Ok(DecodeOutcome::Done {
                header_len: FRAGMENT_LEN,
            });
        }
        return Ok(DecodeOutcome::Continue {
            header_len: FRAGMENT_LEN,
            next: Claim::new(Scope::IpProto, next as u32),
        });
    }

    // Options and routing headers carry their length in 8-byte units,
    // excluding the first unit.
    let header_len = (reader.u8(1)? as usize + 1) * 8;
    reader.require(header_len)?;
    Ok(DecodeOutcome::Continue {
        header_len,
        next: Claim::new(Scope::IpProto, next as u32),
    })
}
