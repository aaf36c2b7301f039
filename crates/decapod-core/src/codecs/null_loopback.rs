use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::{ETHERTYPE_IPV4, ETHERTYPE_IPV6};

const LINKTYPE_NULL: u32 = 0;
const HEADER_LEN: usize = 4;

const AF_INET: u32 = 2;
// BSD variants disagree on AF_INET6; all three occur in captures.
const AF_INET6_FREEBSD: u32 = 28;
const AF_INET6_DARWIN: u32 = 30;
const AF_INET6_OTHER: u32 = 24;

/// BSD loopback framing: a 4-byte address family in capture-host byte order.
pub(crate) struct NullLoopbackCodec;

impl Codec for NullLoopbackCodec {
    fn name(&self) -> &'static str {
        "null_loopback"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::Link, LINKTYPE_NULL)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn classify(family: u32) -> Option<u32> {
    match family {
        AF_INET => Some(ETHERTYPE_IPV4),
        AF_INET6_FREEBSD | AF_INET6_DARWIN | AF_INET6_OTHER => Some(ETHERTYPE_IPV6),
        _ => None,
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    // The family is written in the capture host's byte order; try both.
    let family = reader.u32_le(0)?;
    let ethertype = classify(family).or_else(|| classify(family.swap_bytes()));

    match ethertype {
        Some(ethertype) => Ok(DecodeOutcome::Continue {
            header_len: HEADER_LEN,
            next: Claim::new(Scope::EtherType, ethertype),
        }),
        None => Ok(DecodeOutcome::Done {
            header_len: HEADER_LEN,
        }),
    }
}
