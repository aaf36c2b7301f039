use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};

const ETHERTYPE_ARP: u32 = 0x0806;
const ETHERTYPE_RARP: u32 = 0x8035;

const FIXED_LEN: usize = 8;
const HLN_OFFSET: usize = 4;
const PLN_OFFSET: usize = 5;

/// ARP / RARP. Always a leaf layer; trailing bytes are frame padding.
pub(crate) struct ArpCodec;

impl Codec for ArpCodec {
    fn name(&self) -> &'static str {
        "arp"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![
            Claim::new(Scope::EtherType, ETHERTYPE_ARP),
            Claim::new(Scope::EtherType, ETHERTYPE_RARP),
        ]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(FIXED_LEN)?;

    let hln = reader.u8(HLN_OFFSET)? as usize;
    let pln = reader.u8(PLN_OFFSET)? as usize;
    if hln == 0 || pln == 0 {
        return Ok(DecodeOutcome::Malformed {
            reason: "ARP with zero-length address field",
        });
    }

    let header_len = FIXED_LEN + 2 * (hln + pln);
    reader.require(header_len)?;
    Ok(DecodeOutcome::Done { header_len })
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::decode::DecodeOutcome;

    fn request() -> Vec<u8> {
        // Ethernet/IPv4 ARP request: hln 6, pln 4.
        let mut data = vec![0, 1, 8, 0, 6, 4, 0, 1];
        data.extend_from_slice(&[0u8; 20]);
        data
    }

    #[test]
    fn ethernet_ipv4_request_is_28_bytes() {
        assert_eq!(
            parse(&request()).unwrap(),
            DecodeOutcome::Done { header_len: 28 }
        );
    }

    #[test]
    fn zero_address_length_is_malformed() {
        let mut data = request();
        data[4] = 0;
        assert!(matches!(
            parse(&data).unwrap(),
            DecodeOutcome::Malformed { .. }
        ));
    }

    #[test]
    fn truncated_addresses_need_full_header() {
        let data = &request()[..20];
        assert_eq!(parse(data).unwrap_err().needed, 28);
    }
}
