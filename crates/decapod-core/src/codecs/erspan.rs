use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::LINKTYPE_ETHERNET;

const ETHERTYPE_ERSPAN2: u32 = 0x88BE;
const ETHERTYPE_ERSPAN3: u32 = 0x22EB;

const ERSPAN2_LEN: usize = 8;
const ERSPAN2_VERSION: u16 = 1;

const ERSPAN3_LEN: usize = 12;
const ERSPAN3_VERSION: u16 = 2;
const ERSPAN3_PLATF_LEN: usize = 8;
const ERSPAN3_FLAGS_OFFSET: usize = 10;
const ERSPAN3_OPT_BIT: u16 = 0x0001;

/// ERSPAN type II: mirrored Ethernet frames over GRE.
pub(crate) struct Erspan2Codec;

impl Codec for Erspan2Codec {
    fn name(&self) -> &'static str {
        "erspan2"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::EtherType, ETHERTYPE_ERSPAN2)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse_v2(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse_v2(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(ERSPAN2_LEN)?;

    if reader.u16_be(0)? >> 12 != ERSPAN2_VERSION {
        return Ok(DecodeOutcome::Malformed {
            reason: "ERSPAN type II with wrong version",
        });
    }
    Ok(DecodeOutcome::Continue {
        header_len: ERSPAN2_LEN,
        next: Claim::new(Scope::Link, LINKTYPE_ETHERNET),
    })
}

/// ERSPAN type III, with its optional platform-specific subheader.
pub(crate) struct Erspan3Codec;

impl Codec for Erspan3Codec {
    fn name(&self) -> &'static str {
        "erspan3"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::EtherType, ETHERTYPE_ERSPAN3)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse_v3(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse_v3(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(ERSPAN3_LEN)?;

    if reader.u16_be(0)? >> 12 != ERSPAN3_VERSION {
        return Ok(DecodeOutcome::Malformed {
            reason: "ERSPAN type III with wrong version",
        });
    }

    let mut header_len = ERSPAN3_LEN;
    if reader.u16_be(ERSPAN3_FLAGS_OFFSET)? & ERSPAN3_OPT_BIT != 0 {
        header_len += ERSPAN3_PLATF_LEN;
        reader.require(header_len)?;
    }
    Ok(DecodeOutcome::Continue {
        header_len,
        next: Claim::new(Scope::Link, LINKTYPE_ETHERNET),
    })
}
