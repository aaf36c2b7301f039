use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::{ETHERTYPE_IPV4, ETHERTYPE_IPV6};

const UDP_PORT_GTP_U: u32 = 2152;

const MANDATORY_LEN: usize = 8;
const OPTIONAL_LEN: usize = 4;
const LENGTH_OFFSET: usize = 2;
const NEXT_EXT_OFFSET: usize = 11;

const VERSION_SHIFT: u8 = 5;
const FLAG_PROTO_TYPE: u8 = 0x10;
const FLAG_EXTENSION: u8 = 0x04;
const OPTIONAL_FLAGS: u8 = 0x07;

const MSG_G_PDU: u8 = 255;

/// GTPv1-U (3GPP TS 29.281): user-plane tunneling on UDP 2152. Control
/// messages are leaves; G-PDUs carry an IP datagram selected by version
/// nibble.
pub(crate) struct GtpCodec;

impl Codec for GtpCodec {
    fn name(&self) -> &'static str {
        "gtp"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::UdpPort, UDP_PORT_GTP_U)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(MANDATORY_LEN)?;

    let flags = reader.u8(0)?;
    if flags >> VERSION_SHIFT != 1 {
        return Ok(DecodeOutcome::Malformed {
            reason: "unsupported GTP version",
        });
    }
    if flags & FLAG_PROTO_TYPE == 0 {
        return Ok(DecodeOutcome::Malformed {
            reason: "GTP' framing not supported",
        });
    }

    let msg_type = reader.u8(1)?;
    let length = reader.u16_be(LENGTH_OFFSET)? as usize;
    reader.require(MANDATORY_LEN + length)?;

    let mut header_len = MANDATORY_LEN;
    if flags & OPTIONAL_FLAGS != 0 {
        header_len += OPTIONAL_LEN;
        if flags & FLAG_EXTENSION != 0 {
            let mut next_ext = reader.u8(NEXT_EXT_OFFSET)?;
            while next_ext != 0 {
                let ext_len = reader.u8(header_len)? as usize * 4;
                if ext_len == 0 {
                    return Ok(DecodeOutcome::Malformed {
                        reason: "GTP extension header with zero length",
                    });
                }
                next_ext = reader.u8(header_len + ext_len - 1)?;
                header_len += ext_len;
            }
        }
    }

    if msg_type != MSG_G_PDU {
        return Ok(DecodeOutcome::Done { header_len });
    }

    match reader.u8(header_len)? >> 4 {
        4 => Ok(DecodeOutcome::Continue {
            header_len,
            next: Claim::new(Scope::EtherType, ETHERTYPE_IPV4),
        }),
        6 => Ok(DecodeOutcome::Continue {
            header_len,
            next: Claim::new(Scope::EtherType, ETHERTYPE_IPV6),
        }),
        _ => Ok(DecodeOutcome::Malformed {
            reason: "G-PDU payload is neither IPv4 nor IPv6",
        }),
    }
}
