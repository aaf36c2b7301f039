use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};

const IPPROTO_ESP: u32 = 50;
const IPPROTO_AH: u32 = 51;

const ESP_HEADER_LEN: usize = 8;
const AH_MIN_LEN: usize = 12;
const AH_LEN_OFFSET: usize = 1;

/// ESP (RFC 4303). Everything past SPI and sequence number is ciphertext.
pub(crate) struct EspCodec;

impl Codec for EspCodec {
    fn name(&self) -> &'static str {
        "esp"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::IpProto, IPPROTO_ESP)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        let reader = HeaderReader::new(data);
        match reader.require(ESP_HEADER_LEN) {
            Ok(()) => DecodeOutcome::Done {
                header_len: ESP_HEADER_LEN,
            },
            Err(err) => err.into(),
        }
    }
}

/// Authentication Header (RFC 4302); keeps the next-header chain going.
pub(crate) struct AhCodec;

impl Codec for AhCodec {
    fn name(&self) -> &'static str {
        "ah"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::IpProto, IPPROTO_AH)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse_ah(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse_ah(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);
    reader.require(AH_MIN_LEN)?;

    let next = reader.u8(0)?;
    // Payload length is in 4-byte units minus two.
    let header_len = (reader.u8(AH_LEN_OFFSET)? as usize + 2) * 4;
    if header_len < AH_MIN_LEN {
        return Ok(DecodeOutcome::Malformed {
            reason: "AH payload length below minimum",
        });
    }
    reader.require(header_len)?;

    Ok(DecodeOutcome::Continue {
        header_len,
        next: Claim::new(Scope::IpProto, next as u32),
    })
}

#[cfg(test)]
mod tests {
    use super::parse_ah;
    use crate::decode::{Claim, DecodeOutcome, Scope};

    #[test]
    fn ah_with_96_bit_icv() {
        let mut data = vec![0u8; 24];
        data[0] = 6;
        data[1] = 4;
        assert_eq!(
            parse_ah(&data).unwrap(),
            DecodeOutcome::Continue {
                header_len: 24,
                next: Claim::new(Scope::IpProto, 6),
            }
        );
    }

    #[test]
    fn ah_length_below_minimum_is_malformed() {
        let mut data = vec![0u8; 12];
        data[1] = 0;
        assert_eq!(
            parse_ah(&data).unwrap(),
            DecodeOutcome::Malformed {
                reason: "AH payload length below minimum",
            }
        );
    }
}
