use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::ETHERTYPE_PPP;

const IPPROTO_GRE: u32 = 47;

const BASE_LEN: usize = 4;
const PROTOCOL_OFFSET: usize = 2;

const FLAG_CHECKSUM: u16 = 0x8000;
const FLAG_ROUTING: u16 = 0x4000;
const FLAG_KEY: u16 = 0x2000;
const FLAG_SEQUENCE: u16 = 0x1000;
const FLAG_ACK: u16 = 0x0080;
const VERSION_MASK: u16 = 0x0007;

/// GRE (RFC 2784/2890) and its PPTP variant (RFC 2637). The protocol field
/// reuses the ethertype space, so the payload lookup re-enters `ether-type`.
pub(crate) struct GreCodec;

impl Codec for GreCodec {
    fn name(&self) -> &'static str {
        "gre"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::IpProto, IPPROTO_GRE)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(BASE_LEN)?;

    let flags = reader.u16_be(0)?;
    let protocol = reader.u16_be(PROTOCOL_OFFSET)?;

    match flags & VERSION_MASK {
        0 => {
            // RFC 2784 reserves the routing bit as zero.
            if flags & FLAG_ROUTING != 0 {
                return Ok(DecodeOutcome::Malformed {
                    reason: "GRE header with routing bit set",
                });
            }
            let mut header_len = BASE_LEN;
            if flags & FLAG_CHECKSUM != 0 {
                header_len += 4;
            }
            if flags & FLAG_KEY != 0 {
                header_len += 4;
            }
            if flags & FLAG_SEQUENCE != 0 {
                header_len += 4;
            }
            reader.require(header_len)?;
            Ok(DecodeOutcome::Continue {
                header_len,
                next: Claim::new(Scope::EtherType, protocol as u32),
            })
        }
        1 => {
            // PPTP enhanced GRE: key is mandatory, payload is PPP.
            if flags & FLAG_KEY == 0 {
                return Ok(DecodeOutcome::Malformed {
                    reason: "PPTP GRE without key flag",
                });
            }
            if protocol as u32 != ETHERTYPE_PPP {
                return Ok(DecodeOutcome::Malformed {
                    reason: "PPTP GRE with non-PPP protocol",
                });
            }
            let mut header_len = BASE_LEN + 4;
            if flags & FLAG_SEQUENCE != 0 {
                header_len += 4;
            }
            if flags & FLAG_ACK != 0 {
                header_len += 4;
            }
            reader.require(header_len)?;
            Ok(DecodeOutcome::Continue {
                header_len,
                next: Claim::new(Scope::EtherType, ETHERTYPE_PPP),
            })
        }
        _ => Ok(DecodeOutcome::Malformed {
            reason: "unknown GRE version",
        }),
    }
}
