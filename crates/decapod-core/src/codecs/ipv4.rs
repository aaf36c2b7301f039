use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::ETHERTYPE_IPV4;

/// IPv4-in-IP (RFC 2003) arrives under this IP protocol number.
const IPPROTO_IPIP: u32 = 4;
/// PPP protocol field value for IPv4 datagrams.
const PPP_IPV4: u32 = 0x0021;

const MIN_HEADER_LEN: usize = 20;
const TOTAL_LEN_OFFSET: usize = 2;
const FRAG_OFFSET: usize = 6;
const PROTO_OFFSET: usize = 9;

const FRAG_OFFSET_MASK: u16 = 0x1FFF;

/// IPv4. Claims both the ethertype and the IP-in-IP protocol number, so
/// plain and encapsulated datagrams resolve to the same codec.
pub(crate) struct Ipv4Codec;

impl Codec for Ipv4Codec {
    fn name(&self) -> &'static str {
        "ipv4"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new(Scope::EtherType, ETHERTYPE_IPV4),
            Claim::new(Scope::IpProto, IPPROTO_IPIP),
            Claim::new(Scope::PppProto, PPP_IPV4),
        ]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(MIN_HEADER_LEN)?;

    let vhl = reader.u8(0)?;
    if vhl >> 4 != 4 {
        return Ok(DecodeOutcome::Malformed {
            reason: "IPv4 header with wrong version",
        });
    }
    let header_len = ((vhl & 0x0F) as usize) * 4;
    if header_len < MIN_HEADER_LEN {
        return Ok(DecodeOutcome::Malformed {
            reason: "IPv4 header length below minimum",
        });
    }
    reader.require(header_len)?;

    let total_len = reader.u16_be(TOTAL_LEN_OFFSET)? as usize;
    if total_len < header_len {
        return Ok(DecodeOutcome::Malformed {
            reason: "IPv4 total length below header length",
        });
    }

    // Non-first fragments carry a protocol slice with no header; stop here
    // and leave reassembly to a downstream consumer.
    let frag = reader.u16_be(FRAG_OFFSET)?;
    if frag & FRAG_OFFSET_MASK != 0 {
        return Ok(DecodeOutcome::Done { header_len });
    }

    let proto = reader.u8(PROTO_OFFSET)?;
    Ok(DecodeOutcome::Continue {
        header_len,
        next: Claim::new(Scope::IpProto, proto as u32),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse, MIN_HEADER_LEN};
    use crate::decode::{Claim, DecodeOutcome, Scope};

    fn header(proto: u8) -> Vec<u8> {
        let mut data = vec![0u8; MIN_HEADER_LEN];
        data[0] = 0x45;
        data[2..4].copy_from_slice(&20u16.to_be_bytes());
        data[8] = 64;
        data[9] = proto;
        data
    }

    #[test]
    fn minimal_header_continues_into_ip_proto_scope() {
        assert_eq!(
            parse(&header(6)).unwrap(),
            DecodeOutcome::Continue {
                header_len: 20,
                next: Claim::new(Scope::IpProto, 6),
            }
        );
    }

    #[test]
    fn options_extend_the_header() {
        let mut data = header(17);
        data[0] = 0x46;
        data[2..4].copy_from_slice(&24u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 4]);
        assert_eq!(
            parse(&data).unwrap(),
            DecodeOutcome::Continue {
                header_len: 24,
                next: Claim::new(Scope::IpProto, 17),
            }
        );
    }

    #[test]
    fn wrong_version_is_malformed() {
        let mut data = header(6);
        data[0] = 0x65;
        assert_eq!(
            parse(&data).unwrap(),
            DecodeOutcome::Malformed {
                reason: "IPv4 header with wrong version",
            }
        );
    }

    #[test]
    fn ihl_below_five_is_malformed() {
        let mut data = header(6);
        data[0] = 0x43;
        assert_eq!(
            parse(&data).unwrap(),
            DecodeOutcome::Malformed {
                reason: "IPv4 header length below minimum",
            }
        );
    }

    #[test]
    fn total_length_below_header_is_malformed() {
        let mut data = header(6);
        data[2..4].copy_from_slice(&8u16.to_be_bytes());
        assert_eq!(
            parse(&data).unwrap(),
            DecodeOutcome::Malformed {
                reason: "IPv4 total length below header length",
            }
        );
    }

    #[test]
    fn non_first_fragment_is_a_leaf() {
        let mut data = header(6);
        data[6..8].copy_from_slice(&0x0010u16.to_be_bytes());
        assert_eq!(parse(&data).unwrap(), DecodeOutcome::Done { header_len: 20 });
    }

    #[test]
    fn short_buffer_is_truncated() {
        assert_eq!(parse(&[0x45u8; 12]).unwrap_err().needed, MIN_HEADER_LEN);
    }
}
