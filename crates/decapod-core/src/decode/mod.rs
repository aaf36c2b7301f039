//! Layered packet decode engine.
//!
//! A [`Decoder`] walks a raw buffer through a chain of protocol codecs
//! looked up in an immutable [`CodecRegistry`]: each codec recognizes one
//! header and names the claim of the next layer, until the chain ends in
//! opaque payload or a well-defined failure. The loop is iterative, never
//! recursive, so the encapsulation guard is a counter check rather than a
//! stack-depth concern.
//!
//! Invariants:
//! - The cursor only moves forward; `offset + remaining` equals the buffer
//!   length after every step.
//! - Each iteration appends at most one layer record, so decoding terminates
//!   in at most `max_layers` codec invocations.
//! - Per-packet failures are surfaced as [`DecodeStatus`] values, never as
//!   panics or process errors.

mod codec;
mod context;
mod registry;
mod result;
mod scope;

pub use codec::{Codec, DecodeOutcome};
pub use context::{DecodeContext, LayerRecord};
pub use registry::{CodecRegistry, RegistryBuilder, RegistryError};
pub use result::{DecodeStatus, LayeredPacket};
pub use scope::{Claim, ProtocolId, Scope};

/// Default bound on tunnel-scope transitions per packet.
pub const DEFAULT_MAX_ENCAP_DEPTH: usize = 10;
/// Default hard ceiling on layer records per packet.
pub const DEFAULT_MAX_LAYERS: usize = 32;

const OVERRUN_REASON: &str = "header length exceeds remaining buffer";

/// Decode policy knobs.
///
/// # Examples
/// ```
/// use decapod_core::decode::DecodeConfig;
///
/// let config = DecodeConfig::default();
/// assert_eq!(config.max_encap_depth, 10);
/// ```
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Stop with [`DecodeStatus::EncapsulationLimitExceeded`] once more than
    /// this many tunnel-scope transitions have been traversed.
    pub max_encap_depth: usize,
    /// Scopes whose entry counts as an encapsulation transition. Every
    /// GRE/ERSPAN/Teredo/GTP/PPPoE round-trip crosses at least one of the
    /// defaults; plain frames cost one or two transitions at most.
    pub tunnel_scopes: Vec<Scope>,
    /// Hard ceiling on layer records per packet, independent of codec
    /// behavior.
    pub max_layers: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        DecodeConfig {
            max_encap_depth: DEFAULT_MAX_ENCAP_DEPTH,
            tunnel_scopes: vec![Scope::EtherType, Scope::UdpPort, Scope::PppProto],
            max_layers: DEFAULT_MAX_LAYERS,
        }
    }
}

/// The decode dispatcher: selects codecs from the registry and threads the
/// per-packet context through the chain.
///
/// Holds only shared immutable state, so one `Decoder` serves any number of
/// threads; each call owns its context and result exclusively.
pub struct Decoder<'r> {
    registry: &'r CodecRegistry,
    config: DecodeConfig,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r CodecRegistry, config: DecodeConfig) -> Self {
        Decoder { registry, config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode a captured frame, entering at the link layer.
    ///
    /// `link` is the capture link-layer type (pcap linktype number).
    pub fn decode<'a>(&self, link: ProtocolId, data: &'a [u8]) -> LayeredPacket<'a> {
        self.decode_from(Scope::Link, link, data)
    }

    /// Decode starting from an arbitrary claim.
    ///
    /// Used by tests and by consumers re-dissecting an inner payload, e.g.
    /// the IP datagram quoted inside an ICMP error message.
    pub fn decode_from<'a>(
        &self,
        scope: Scope,
        id: ProtocolId,
        data: &'a [u8],
    ) -> LayeredPacket<'a> {
        let mut ctx = DecodeContext::new(data.len());
        let mut claim = Claim { scope, id };

        let status = loop {
            // Unrecognized identifier: the rest is opaque payload, not an error.
            let Some(codec) = self.registry.lookup(claim.scope, claim.id) else {
                break DecodeStatus::Ok;
            };

            // The cap bounds codec invocations, so decoding terminates even
            // over zero-length marker layers.
            if ctx.layers().len() >= self.config.max_layers {
                break DecodeStatus::EncapsulationLimitExceeded;
            }

            match codec.decode(claim.id, &data[ctx.offset()..], &ctx) {
                DecodeOutcome::Continue { header_len, next } => {
                    if header_len > ctx.remaining() {
                        break DecodeStatus::Malformed(OVERRUN_REASON.to_string());
                    }
                    ctx.accept(codec.name(), claim, header_len);
                    if self.config.tunnel_scopes.contains(&next.scope)
                        && ctx.bump_depth() > self.config.max_encap_depth
                    {
                        break DecodeStatus::EncapsulationLimitExceeded;
                    }
                    claim = next;
                }
                DecodeOutcome::Done { header_len } => {
                    if header_len > ctx.remaining() {
                        break DecodeStatus::Malformed(OVERRUN_REASON.to_string());
                    }
                    ctx.accept(codec.name(), claim, header_len);
                    break DecodeStatus::Ok;
                }
                DecodeOutcome::Truncated { .. } => break DecodeStatus::Truncated,
                DecodeOutcome::Malformed { reason } => {
                    break DecodeStatus::Malformed(reason.to_string());
                }
            }
        };

        let payload = &data[ctx.offset()..];
        LayeredPacket::new(ctx.into_layers(), status, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Claim, Codec, CodecRegistry, DecodeConfig, DecodeContext, DecodeOutcome, DecodeStatus,
        Decoder, ProtocolId, RegistryBuilder, Scope,
    };

    // Minimal synthetic codecs so dispatcher behavior is tested independent
    // of real protocol parsing.

    struct FixedCodec {
        name: &'static str,
        claims: Vec<Claim>,
        header_len: usize,
        next: Option<Claim>,
    }

    impl Codec for FixedCodec {
        fn name(&self) -> &'static str {
            self.name
        }

        fn claims(&self) -> Vec<Claim> {
            self.claims.clone()
        }

        fn decode(&self, _id: ProtocolId, data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
            if data.len() < self.header_len {
                return DecodeOutcome::Truncated {
                    needed: self.header_len,
                };
            }
            match self.next {
                Some(next) => DecodeOutcome::Continue {
                    header_len: self.header_len,
                    next,
                },
                None => DecodeOutcome::Done {
                    header_len: self.header_len,
                },
            }
        }
    }

    struct LyingCodec;

    impl Codec for LyingCodec {
        fn name(&self) -> &'static str {
            "liar"
        }

        fn claims(&self) -> Vec<Claim> {
            vec![Claim::new(Scope::Link, 1)]
        }

        fn decode(&self, _id: ProtocolId, _data: &[u8], _ctx: &DecodeContext) -> DecodeOutcome {
            DecodeOutcome::Done { header_len: 1 << 20 }
        }
    }

    fn registry(codecs: Vec<Box<dyn Codec>>) -> CodecRegistry {
        RegistryBuilder::new()
            .register_all(codecs)
            .build()
            .expect("test registry")
    }

    #[test]
    fn unregistered_entry_identifier_is_clean_payload() {
        let registry = registry(vec![]);
        let decoder = Decoder::new(&registry, DecodeConfig::default());
        let data = [1u8, 2, 3, 4];

        let packet = decoder.decode(ProtocolId(147), &data);
        assert!(packet.status().is_ok());
        assert!(packet.layers().is_empty());
        assert_eq!(packet.payload(), &data);
    }

    #[test]
    fn chain_stops_cleanly_on_unregistered_next_claim() {
        let registry = registry(vec![Box::new(FixedCodec {
            name: "outer",
            claims: vec![Claim::new(Scope::Link, 1)],
            header_len: 4,
            next: Some(Claim::new(Scope::IpProto, 253)),
        })]);
        let decoder = Decoder::new(&registry, DecodeConfig::default());
        let data = [0u8; 10];

        let packet = decoder.decode(ProtocolId(1), &data);
        assert!(packet.status().is_ok());
        assert_eq!(packet.layers().len(), 1);
        assert_eq!(packet.payload().len(), 6);
    }

    #[test]
    fn cursor_is_monotonic_and_accounts_for_every_byte() {
        let registry = registry(vec![
            Box::new(FixedCodec {
                name: "a",
                claims: vec![Claim::new(Scope::Link, 1)],
                header_len: 3,
                next: Some(Claim::new(Scope::IpProto, 9)),
            }),
            Box::new(FixedCodec {
                name: "b",
                claims: vec![Claim::new(Scope::IpProto, 9)],
                header_len: 5,
                next: None,
            }),
        ]);
        let decoder = Decoder::new(&registry, DecodeConfig::default());
        let data = [0u8; 12];

        let packet = decoder.decode(ProtocolId(1), &data);
        assert!(packet.status().is_ok());

        let mut expected_offset = 0;
        for layer in packet.layers() {
            assert_eq!(layer.offset, expected_offset);
            expected_offset += layer.header_len;
        }
        assert_eq!(expected_offset + packet.payload().len(), data.len());
    }

    #[test]
    fn truncated_entry_yields_empty_layer_stack() {
        let registry = registry(vec![Box::new(FixedCodec {
            name: "outer",
            claims: vec![Claim::new(Scope::Link, 1)],
            header_len: 14,
            next: None,
        })]);
        let decoder = Decoder::new(&registry, DecodeConfig::default());

        let packet = decoder.decode(ProtocolId(1), &[0u8; 3]);
        assert_eq!(*packet.status(), DecodeStatus::Truncated);
        assert!(packet.layers().is_empty());
    }

    #[test]
    fn self_referential_tunnel_chain_hits_depth_limit() {
        // One codec that keeps re-entering its own tunnel scope.
        let registry = registry(vec![Box::new(FixedCodec {
            name: "loop",
            claims: vec![Claim::new(Scope::Link, 1), Claim::new(Scope::EtherType, 7)],
            header_len: 1,
            next: Some(Claim::new(Scope::EtherType, 7)),
        })]);
        let config = DecodeConfig {
            max_encap_depth: 4,
            ..DecodeConfig::default()
        };
        let decoder = Decoder::new(&registry, config);
        let data = [0u8; 256];

        let packet = decoder.decode(ProtocolId(1), &data);
        assert_eq!(*packet.status(), DecodeStatus::EncapsulationLimitExceeded);
        // Entry layer plus one per permitted transition.
        assert_eq!(packet.layers().len(), 5);
    }

    #[test]
    fn layer_cap_bounds_zero_length_chains() {
        // Zero-length headers in a non-tunnel scope: only max_layers stops this.
        let registry = registry(vec![Box::new(FixedCodec {
            name: "spin",
            claims: vec![Claim::new(Scope::Link, 1), Claim::new(Scope::IpProto, 1)],
            header_len: 0,
            next: Some(Claim::new(Scope::IpProto, 1)),
        })]);
        let config = DecodeConfig {
            max_layers: 8,
            ..DecodeConfig::default()
        };
        let decoder = Decoder::new(&registry, config);

        let packet = decoder.decode(ProtocolId(1), &[0u8; 4]);
        assert_eq!(*packet.status(), DecodeStatus::EncapsulationLimitExceeded);
        assert_eq!(packet.layers().len(), 8);
    }

    #[test]
    fn codec_overrun_is_reported_malformed_not_panic() {
        let registry = registry(vec![Box::new(LyingCodec)]);
        let decoder = Decoder::new(&registry, DecodeConfig::default());

        let packet = decoder.decode(ProtocolId(1), &[0u8; 16]);
        match packet.status() {
            DecodeStatus::Malformed(reason) => {
                assert!(reason.contains("exceeds remaining"));
            }
            other => panic!("expected malformed, got {other:?}"),
        }
        assert!(packet.layers().is_empty());
        assert_eq!(packet.payload().len(), 16);
    }

    #[test]
    fn decode_is_safe_across_threads_sharing_one_registry() {
        let registry = registry(vec![Box::new(FixedCodec {
            name: "outer",
            claims: vec![Claim::new(Scope::Link, 1)],
            header_len: 2,
            next: None,
        })]);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let decoder = Decoder::new(&registry, DecodeConfig::default());
                    for _ in 0..100 {
                        let data = [0u8; 8];
                        let packet = decoder.decode(ProtocolId(1), &data);
                        assert!(packet.status().is_ok());
                        assert_eq!(packet.layers().len(), 1);
                    }
                });
            }
        });
    }
}
