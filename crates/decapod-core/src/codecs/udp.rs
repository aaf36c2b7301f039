use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};

const IPPROTO_UDP: u32 = 17;

const HEADER_LEN: usize = 8;
const DST_PORT_OFFSET: usize = 2;
const LENGTH_OFFSET: usize = 4;

/// UDP. Continues into the `udp-port` scope keyed by destination port so
/// registered tunnel codecs (Teredo, GTP-U) can claim their well-known
/// ports; unclaimed ports end as opaque payload.
pub(crate) struct UdpCodec;

impl Codec for UdpCodec {
    fn name(&self) -> &'static str {
        "udp"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::IpProto, IPPROTO_UDP)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(HEADER_LEN)?;

    let length = reader.u16_be(LENGTH_OFFSET)? as usize;
    if length < HEADER_LEN {
        return Ok(DecodeOutcome::Malformed {
            reason: "UDP length below header size",
        });
    }

    let dst_port = reader.u16_be(DST_PORT_OFFSET)?;
    Ok(DecodeOutcome::Continue {
        header_len: HEADER_LEN,
        next: Claim::new(Scope::UdpPort, dst_port as u32),
    })
}
