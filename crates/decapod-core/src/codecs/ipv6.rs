use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::ETHERTYPE_IPV6;

/// IPv6-in-IP (RFC 2473) arrives under this IP protocol number.
const IPPROTO_IPV6: u32 = 41;
/// PPP protocol field value for IPv6 datagrams.
const PPP_IPV6: u32 = 0x0057;

const HEADER_LEN: usize = 40;
const NEXT_HEADER_OFFSET: usize = 6;

/// IPv6 fixed header. Extension headers are separate codecs in the
/// `ip-proto` scope.
pub(crate) struct Ipv6Codec;

impl Codec for Ipv6Codec {
    fn name(&self) -> &'static str {
        "ipv6"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new(Scope::EtherType, ETHERTYPE_IPV6),
            Claim::new(Scope::IpProto, IPPROTO_IPV6),
            Claim::new(Scope::PppProto, PPP_IPV6),
        ]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(HEADER_LEN)?;

    if reader.u8(0)? >> 4 != 6 {
        return Ok(DecodeOutcome::Malformed {
            reason: "IPv6 header with wrong version",
        });
    }

    let next = reader.u8(NEXT_HEADER_OFFSET)?;
    Ok(DecodeOutcome::Continue {
        header_len: HEADER_LEN,
        next: Claim::new(Scope::IpProto, next as u32),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse, HEADER_LEN};
    use crate::decode::{Claim, DecodeOutcome, Scope};

    fn header(next: u8) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data[0] = 0x60;
        data[6] = next;
        data[7] = 64;
        data
    }

    #[test]
    fn fixed_header_continues_with_next_header() {
        assert_eq!(
            parse(&header(58)).unwrap(),
            DecodeOutcome::Continue {
                header_len: HEADER_LEN,
                next: Claim::new(Scope::IpProto, 58),
            }
        );
    }

    #[test]
    fn wrong_version_is_malformed() {
        let mut data = header(6);
        data[0] = 0x40;
        assert!(matches!(
            parse(&data).unwrap(),
            DecodeOutcome::Malformed { .. }
        ));
    }

    #[test]
    fn short_buffer_is_truncated() {
        assert_eq!(parse(&[0x60u8; 24]).unwrap_err().needed, HEADER_LEN);
    }
}
