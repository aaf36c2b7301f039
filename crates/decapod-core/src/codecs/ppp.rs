use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::ETHERTYPE_PPP;

const LINKTYPE_PPP: u32 = 9;

const HDLC_ADDRESS: u8 = 0xFF;
const HDLC_CONTROL: u8 = 0x03;

/// PPP framing shared by the link-layer codec and the GRE-encapsulated
/// variant: optional HDLC address/control, then a protocol field that may be
/// compressed to one byte (PFC).
fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);

    let mut offset = 0;
    if reader.u8(0)? == HDLC_ADDRESS {
        if reader.u8(1)? != HDLC_CONTROL {
            return Ok(DecodeOutcome::Malformed {
                reason: "PPP HDLC address without control byte",
            });
        }
        offset = 2;
    }

    let first = reader.u8(offset)?;
    let (protocol, field_len) = if first & 0x01 != 0 {
        // Protocol field compression: odd first byte is the whole field.
        (first as u16, 1)
    } else {
        (reader.u16_be(offset)?, 2)
    };

    Ok(DecodeOutcome::Continue {
        header_len: offset + field_len,
        next: Claim::new(Scope::PppProto, protocol as u32),
    })
}

/// PPP as a capture link layer.
pub(crate) struct PppCodec;

impl Codec for PppCodec {
    fn name(&self) -> &'static str {
        "ppp"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::Link, LINKTYPE_PPP)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

/// PPP carried inside PPTP GRE (ethertype 0x880B).
pub(crate) struct PppEncapCodec;

impl Codec for PppEncapCodec {
    fn name(&self) -> &'static str {
        "ppp_encap"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::EtherType, ETHERTYPE_PPP)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}
