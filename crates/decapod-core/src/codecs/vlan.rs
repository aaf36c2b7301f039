use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::ethernet::ETHERTYPE_MIN;
use super::reader::{HeaderReader, NeedBytes};

const ETHERTYPE_8021Q: u32 = 0x8100;
const ETHERTYPE_8021AD: u32 = 0x88A8;
const ETHERTYPE_QINQ_LEGACY: u32 = 0x9100;

const HEADER_LEN: usize = 4;
const INNER_TYPE_OFFSET: usize = 2;

/// 802.1Q / 802.1ad VLAN tags, including stacked (Q-in-Q) tagging.
pub(crate) struct VlanCodec;

impl Codec for VlanCodec {
    fn name(&self) -> &'static str {
        "vlan"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new(Scope::EtherType, ETHERTYPE_8021Q),
            Claim::new(Scope::EtherType, ETHERTYPE_8021AD),
            Claim::new(Scope::EtherType, ETHERTYPE_QINQ_LEGACY),
        ]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(HEADER_LEN)?;
    let inner = reader.u16_be(INNER_TYPE_OFFSET)?;

    if inner < ETHERTYPE_MIN {
        return Ok(DecodeOutcome::Done {
            header_len: HEADER_LEN,
        });
    }

    Ok(DecodeOutcome::Continue {
        header_len: HEADER_LEN,
        next: Claim::new(Scope::EtherType, inner as u32),
    })
}
