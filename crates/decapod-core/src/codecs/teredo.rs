use crate::decode::{Claim, Codec, DecodeContext, DecodeOutcome, ProtocolId, Scope};

use super::reader::{HeaderReader, NeedBytes};

const UDP_PORT_TEREDO: u32 = 3544;

const AUTH_INDICATOR: u16 = 0x0001;
const ORIGIN_INDICATOR: u16 = 0x0000;
/// Auth indicator: type(2) + id-len(1) + auth-len(1) + nonce(8) + confirm(1).
const AUTH_FIXED_LEN: usize = 13;
const ORIGIN_LEN: usize = 8;

const IPPROTO_IPV6: u32 = 41;

/// Teredo (RFC 4380): IPv6 over UDP/IPv4. Skips the optional authentication
/// and origin indicators, then hands the inner IPv6 datagram to the
/// `ip-proto` scope.
pub(crate) struct TeredoCodec;

impl Codec for TeredoCodec {
    fn name(&self) -> &'static str {
        "teredo"
    }

    fn claims(&self) -> Vec<Claim> {
        vec![Claim::new(Scope::UdpPort, UDP_PORT_TEREDO)]
    }

    fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
        parse(data).unwrap_or_else(DecodeOutcome::from)
    }
}

fn parse(data: &[u8]) -> Result<DecodeOutcome, NeedBytes> {
    let reader = HeaderReader::new(data);

    // Indicators precede the datagram; an IPv6 header can never start with
    // 0x0000 or 0x0001, so this cannot misfire on plain payloads.
    let mut offset = 0;
    loop {
        match reader.u16_be(offset) {
            Ok(AUTH_INDICATOR) => {
                let id_len = reader.u8(offset + 2)? as usize;
                let auth_len = reader.u8(offset + 3)? as usize;
                offset += AUTH_FIXED_LEN + id_len + auth_len;
            }
            Ok(ORIGIN_INDICATOR) => offset += ORIGIN_LEN,
            _ => break,
        }
    }

    if reader.u8(offset)? >> 4 != 6 {
        return Ok(DecodeOutcome::Malformed {
            reason: "Teredo payload is not IPv6",
        });
    }

    Ok(DecodeOutcome::Continue {
        header_len: offset,
        next: Claim::new(Scope::IpProto, IPPROTO_IPV6),
    })
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::decode::{Claim, DecodeOutcome, Scope};

    #[test]
    fn bare_ipv6_payload() {
        let data = [0x60, 0, 0, 0];
        assert_eq!(
            parse(&data).unwrap(),
            DecodeOutcome::Continue {
                header_len: 0,
                next: Claim::new(Scope::IpProto, 41),
            }
        );
    }

    #[test]
    fn origin_indicator_is_skipped() {
        let mut data = vec![0x00, 0x00, 0x12, 0x34, 1, 2, 3, 4];
        data.push(0x60);
        assert_eq!(
            parse(&data).unwrap(),
            DecodeOutcome::Continue {
                header_len: 8,
                next: Claim::new(Scope::IpProto, 41),
            }
        );
    }

    #[test]
    fn auth_then_origin_indicators() {
        let mut data = vec![0x00, 0x01, 2, 3];
        data.extend_from_slice(&[0u8; 9 + 2 + 3]);
        data.extend_from_slice(&[0x00, 0x00, 0, 0, 0, 0, 0, 0]);
        data.push(0x60);
        assert_eq!(
            parse(&data).unwrap(),
            DecodeOutcome::Continue {
                header_len: 26,
                next: Claim::new(Scope::IpProto, 41),
            }
        );
    }

    #[test]
    fn non_ipv6_payload_is_malformed() {
        let data = [0x45, 0, 0, 20];
        assert_eq!(
            parse(&data).unwrap(),
            DecodeOutcome::Malformed {
                reason: "Teredo payload is not IPv6",
            }
        );
    }

    #[test]
    fn indicator_cut_short_is_truncated() {
        let data = [0x00, 0x00, 0x12];
        assert_eq!(parse(&data).unwrap_err().needed, 9);
    }
}
