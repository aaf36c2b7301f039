use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};

const IPPROTO_ICMP: u32 = 1;
const IPPROTO_ICMPV6: u32 = 58;

const ICMP4_HEADER_LEN: usize = 8;
const ICMP6_HEADER_LEN: usize = 4;

/// ICMP for IPv4. The quoted datagram inside error messages is left to
/// consumers, which can re-enter the decoder on the payload.
pub(crate) struct Icmp4Codec;

impl Codec for Icmp4Codec {
    fn name(&self) -> &'static str {
        "icmp4"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::IpProto, IPPROTO_ICMP)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data, ICMP4_HEADER_LEN).unwrap_or_else(DecodeOutcome::from)
    }
}

/// ICMPv6.
pub(crate) struct Icmp6Codec;

impl Codec for Icmp6Codec {
    fn name(&self) -> &'static str {
        "icmp6"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::IpProto, IPPROTO_ICMPV6)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data, ICMP6_HEADER_LEN).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8], header_len: usize) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(header_len)?;
    Ok(DecodeOutcome::Done { header_len })
}
