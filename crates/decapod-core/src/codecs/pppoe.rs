use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};

const ETHERTYPE_PPPOE_DISC: u32 = 0x8863;
const ETHERTYPE_PPPOE_SESS: u32 = 0x8864;

const HEADER_LEN: usize = 6;
const VER_TYPE: u8 = 0x11;
const CODE_OFFSET: usize = 1;
const CODE_SESSION_DATA: u8 = 0x00;
const PPP_PROTO_OFFSET: usize = 6;

/// PPPoE discovery and session stages (RFC 2516). Discovery frames are
/// leaves; session data carries a PPP protocol field with no HDLC framing.
pub(crate) struct PppoeCodec;

impl Codec for PppoeCodec {
    fn name(&self) -> &'static str {
        "pppoe"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new(Scope::EtherType, ETHERTYPE_PPPOE_DISC),
            Claim::new(Scope::EtherType, ETHERTYPE_PPPOE_SESS),
        ]
    }

    fn decode(&self, id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(id, data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(id: ProtocolId, data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(HEADER_LEN)?;

    if reader.u8(0)? != VER_TYPE {
        return Ok(DecodeOutcome::Malformed {
            reason: "PPPoE with unsupported version/type",
        });
    }

    if id.0 == ETHERTYPE_PPPOE_DISC {
        return Ok(DecodeOutcome::Done {
            header_len: HEADER_LEN,
        });
    }

    if reader.u8(CODE_OFFSET)? != CODE_SESSION_DATA {
        return Ok(DecodeOutcome::Malformed {
            reason: "PPPoE session frame with nonzero code",
        });
    }

    let protocol = reader.u16_be(PPP_PROTO_OFFSET)?;
    Ok(DecodeOutcome::Continue {
        header_len: HEADER_LEN + 2,
        next: Claim::new(Scope::PppProto, protocol as u32),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse, ETHERTYPE_PPPOE_DISC, ETHERTYPE_PPPOE_SESS};
    use crate::decode::{Claim, DecodeOutcome, ProtocolId, Scope};

    fn frame(code: u8, ppp_proto: Option<u16>) -> Vec<u8> {
        let mut data = vec![0x11, code, 0x00, 0x01, 0x00, 0x00];
        if let Some(proto) = ppp_proto {
            data.extend_from_slice(&proto.to_be_bytes());
        }
        data
    }

    #[test]
    fn discovery_frame_is_a_leaf() {
        // PADI code 0x09.
        assert_eq!(
            parse(ProtocolId(ETHERTYPE_PPPOE_DISC), &frame(0x09, None)).unwrap(),
            DecodeOutcome::Done { header_len: 6 }
        );
    }

    #[test]
    fn session_data_continues_into_ppp_proto() {
        assert_eq!(
            parse(ProtocolId(ETHERTYPE_PPPOE_SESS), &frame(0x00, Some(0x0021))).unwrap(),
            DecodeOutcome::Continue {
                header_len: 8,
                next: Claim::new(Scope::PppProto, 0x0021),
            }
        );
    }

    #[test]
    fn session_frame_with_discovery_code_is_malformed() {
        assert!(matches!(
            parse(ProtocolId(ETHERTYPE_PPPOE_SESS), &frame(0x09, Some(0x0021))).unwrap(),
            DecodeOutcome::Malformed { .. }
        ));
    }

    #[test]
    fn bad_version_nibbles_are_malformed() {
        let mut data = frame(0x00, Some(0x0021));
        data[0] = 0x21;
        assert!(matches!(
            parse(ProtocolId(ETHERTYPE_PPPOE_SESS), &data).unwrap(),
            DecodeOutcome::Malformed { .. }
        ));
    }
}
