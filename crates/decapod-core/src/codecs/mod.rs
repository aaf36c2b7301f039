//! Compiled-in protocol codecs.
//!
//! One module per protocol. Each follows the same structure: layout
//! constants as the source of truth, parsing through a shared bounds-checked
//! reader (no direct byte indexing in parse logic), and a
//! [`Codec`](crate::decode::Codec) impl that maps parse results onto decode
//! outcomes. Codecs hold no state; one instance serves every packet.

mod arp;
mod erspan;
mod ethernet;
mod gre;
mod gtp;
mod icmp;
mod ipsec;
mod ipv4;
mod ipv6;
mod ipv6_ext;
mod linux_sll;
mod mpls;
mod null_loopback;
mod ppp;
mod pppoe;
mod raw;
mod reader;
mod tcp;
mod teredo;
mod transbridge;
mod udp;
mod vlan;

use crate::decode::Codec;

// Identifiers shared across codec modules. Single-use constants stay local
// to their module.
pub(crate) const LINKTYPE_ETHERNET: u32 = 1;
pub(crate) const ETHERTYPE_IPV4: u32 = 0x0800;
pub(crate) const ETHERTYPE_IPV6: u32 = 0x86DD;
pub(crate) const ETHERTYPE_PPP: u32 = 0x880B;

/// The static compiled-in codec list.
///
/// Feed this to a [`RegistryBuilder`](crate::decode::RegistryBuilder), or use
/// [`CodecRegistry::with_default_codecs`](crate::decode::CodecRegistry::with_default_codecs).
pub fn default_codecs() -> Vec<Box<dyn Codec>> {
    vec![
        // link-layer entry codecs
        Box::new(ethernet::EthernetCodec),
        Box::new(linux_sll::LinuxSllCodec),
        Box::new(null_loopback::NullLoopbackCodec),
        Box::new(ppp::PppCodec),
        Box::new(raw::RawCodec),
        // network-layer codecs
        Box::new(arp::ArpCodec),
        Box::new(ipv4::Ipv4Codec),
        Box::new(ipv6::Ipv6Codec),
        Box::new(ipv6_ext::Ipv6ExtCodec),
        Box::new(mpls::MplsCodec),
        Box::new(vlan::VlanCodec),
        // transport-layer codecs
        Box::new(icmp::Icmp4Codec),
        Box::new(icmp::Icmp6Codec),
        Box::new(ipsec::AhCodec),
        Box::new(ipsec::EspCodec),
        Box::new(tcp::TcpCodec),
        Box::new(udp::UdpCodec),
        // tunnel / encapsulation codecs
        Box::new(erspan::Erspan2Codec),
        Box::new(erspan::Erspan3Codec),
        Box::new(gre::GreCodec),
        Box::new(gtp::GtpCodec),
        Box::new(ppp::PppEncapCodec),
        Box::new(pppoe::PppoeCodec),
        Box::new(teredo::TeredoCodec),
        Box::new(transbridge::TransbridgeCodec),
    ]
}
