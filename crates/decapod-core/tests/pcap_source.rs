//! File-level pipeline tests over a synthesized legacy PCAP capture.

use std::fs;
use std::io::Write as _;

use decapod_core::decode::DecodeConfig;
use decapod_core::{PacketSource, PcapFileSource, dissect_pcap_file};

const LEGACY_MAGIC: u32 = 0xA1B2_C3D4;
const LINKTYPE_ETHERNET: u32 = 1;

fn udp_packet() -> Vec<u8> {
    let builder = etherparse::PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([192, 168, 0, 1], [192, 168, 0, 2], 64)
        .udp(6000, 53);
    let payload = [1u8, 2, 3];
    let mut packet = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut packet, &payload).expect("build packet");
    packet
}

fn write_legacy_pcap(packets: &[(u32, Vec<u8>)]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".pcap")
        .tempfile()
        .expect("tempfile");

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&LEGACY_MAGIC.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&4u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&65535u32.to_le_bytes());
    bytes.extend_from_slice(&LINKTYPE_ETHERNET.to_le_bytes());

    for (ts_sec, data) in packets {
        bytes.extend_from_slice(&ts_sec.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(data);
    }

    file.write_all(&bytes).expect("write pcap");
    file.flush().expect("flush pcap");
    file
}

#[test]
fn source_yields_packets_with_linktype_and_timestamps() {
    let file = write_legacy_pcap(&[(100, udp_packet()), (101, udp_packet())]);
    let mut source = PcapFileSource::open(file.path()).expect("open pcap");

    let first = source.next_packet().expect("read").expect("first packet");
    assert_eq!(first.linktype.0, 1);
    assert_eq!(first.ts, Some(100.0));
    assert_eq!(first.data, udp_packet());

    let second = source.next_packet().expect("read").expect("second packet");
    assert_eq!(second.ts, Some(101.0));

    assert!(source.next_packet().expect("read").is_none());
}

#[test]
fn dissecting_a_capture_file_builds_a_stable_report() {
    let file = write_legacy_pcap(&[(100, udp_packet()), (101, udp_packet())]);

    let report =
        dissect_pcap_file(file.path(), DecodeConfig::default()).expect("dissect capture");

    assert_eq!(report.report_version, decapod_core::REPORT_VERSION);
    assert_eq!(report.tool.name, "decapod");
    assert_eq!(
        report.input.bytes,
        fs::metadata(file.path()).expect("metadata").len()
    );

    let summary = report.capture_summary.expect("capture summary");
    assert_eq!(summary.packets_total, 2);
    assert_eq!(summary.time_start.as_deref(), Some("1970-01-01T00:01:40Z"));
    assert_eq!(summary.time_end.as_deref(), Some("1970-01-01T00:01:41Z"));

    assert_eq!(report.statuses.ok, 2);
    assert_eq!(report.chains.len(), 1);
    assert_eq!(report.chains[0].chain, "ethernet > ipv4 > udp");

    let codecs: Vec<_> = report.protocols.iter().map(|p| p.codec.as_str()).collect();
    assert_eq!(codecs, ["ethernet", "ipv4", "udp"]);
}

#[test]
fn empty_capture_produces_an_empty_summary() {
    let file = write_legacy_pcap(&[]);

    let report = dissect_pcap_file(file.path(), DecodeConfig::default()).expect("dissect");
    let summary = report.capture_summary.expect("capture summary");
    assert_eq!(summary.packets_total, 0);
    assert!(summary.time_start.is_none());
    assert!(report.protocols.is_empty());
    assert!(report.chains.is_empty());
    assert_eq!(report.generated_at, decapod_core::DEFAULT_GENERATED_AT);
}
