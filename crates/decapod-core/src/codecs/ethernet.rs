use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};
use super::LINKTYPE_ETHERNET;

pub(crate) const HEADER_LEN: usize = 14;
pub(crate) const ETHERTYPE_OFFSET: usize = 12;
/// Values below this are IEEE 802.3 length fields, not ethertypes.
pub(crate) const ETHERTYPE_MIN: u16 = 0x0600;

/// Ethernet II framing.
pub(crate) struct EthernetCodec;

impl Codec for EthernetCodec {
    fn name(&self) -> &'static str {
        "ethernet"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::Link, LINKTYPE_ETHERNET)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(HEADER_LEN)?;
    let ethertype = reader.u16_be(ETHERTYPE_OFFSET)?;

    // 802.3 length framing (LLC payload) ends recognition here.
    if ethertype < ETHERTYPE_MIN {
        return Ok(DecodeOutcome::Done {
            header_len: HEADER_LEN,
        });
    }

    Ok(DecodeOutcome::Continue {
        header_len: HEADER_LEN,
        next: Claim::new(Scope::EtherType, ethertype as u32),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse, HEADER_LEN};
    use crate::decode::{Claim, DecodeOutcome, Scope};

    fn frame(ethertype: u16) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN + 4];
        data[12..14].copy_from_slice(&ethertype.to_be_bytes());
        data
    }

    #[test]
    fn ipv4_ethertype_continues_into_ether_type_scope() {
        let outcome = parse(&frame(0x0800)).unwrap();
        assert_eq!(
            outcome,
            DecodeOutcome::Continue {
                header_len: HEADER_LEN,
                next: Claim::new(Scope::EtherType, 0x0800),
            }
        );
    }

    #[test]
    fn length_field_frame_is_opaque() {
        let outcome = parse(&frame(0x0100)).unwrap();
        assert_eq!(
            outcome,
            DecodeOutcome::Done {
                header_len: HEADER_LEN
            }
        );
    }

    #[test]
    fn short_frame_is_truncated() {
        let err = parse(&[0u8; 10]).unwrap_err();
        assert_eq!(err.needed, HEADER_LEN);
    }
}
