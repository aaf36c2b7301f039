use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};

const IPPROTO_TCP: u32 = 6;

const MIN_HEADER_LEN: usize = 20;
const DATA_OFFSET_OFFSET: usize = 12;

/// TCP. Innermost recognized layer; the segment payload is opaque here.
pub(crate) struct TcpCodec;

impl Codec for TcpCodec {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::IpProto, IPPROTO_TCP)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(MIN_HEADER_LEN)?;

    let header_len = ((reader.u8(DATA_OFFSET_OFFSET)? >> 4) as usize) * 4;
    if header_len < MIN_HEADER_LEN {
        return Ok(DecodeOutcome::Malformed {
            reason: "TCP data offset below minimum",
        });
    }
    reader.require(header_len)?;
    Ok(DecodeOutcome::Done { header_len })
}
