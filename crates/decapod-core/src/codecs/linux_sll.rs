use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::ethernet::ETHERTYPE_MIN;
use super::reader::{HeaderReader, NeedBytes};

const LINKTYPE_LINUX_SLL: u32 = 113;
const HEADER_LEN: usize = 16;
const PROTOCOL_OFFSET: usize = 14;

/// Linux "cooked" capture framing (`DLT_LINUX_SLL`).
pub(crate) struct LinuxSllCodec;

impl Codec for LinuxSllCodec {
    fn name(&self) -> &'static str {
        "linux_sll"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::Link, LINKTYPE_LINUX_SLL)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(HEADER_LEN)?;
    let protocol = reader.u16_be(PROTOCOL_OFFSET)?;

    // Non-ethertype protocol values (Novell 802.3, LLC frames) end here.
    if protocol < ETHERTYPE_MIN {
        return Ok(DecodeOutcome::Done {
            header_len: HEADER_LEN,
        });
    }

    Ok(DecodeOutcome::Continue {
        header_len: HEADER_LEN,
        next: Claim::new(Scope::EtherType, protocol as u32),
    })
}
