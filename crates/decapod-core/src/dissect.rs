use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::decode::{
    CodecRegistry, DecodeConfig, DecodeStatus, Decoder, ProtocolId, RegistryError,
};
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};
use crate::{
    CaptureSummary, ChainSummary, DEFAULT_GENERATED_AT, ProtocolSummary, Report, base_report,
};

#[derive(Debug, Error)]
pub enum DissectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Dissect a capture file into a deterministic report.
pub fn dissect_pcap_file(path: &Path, config: DecodeConfig) -> Result<Report, DissectError> {
    let source = PcapFileSource::open(path)?;
    dissect_source(path, source, config)
}

/// Dissect packets from any source; split out so tests can inject one.
pub fn dissect_source<S: PacketSource>(
    path: &Path,
    mut source: S,
    config: DecodeConfig,
) -> Result<Report, DissectError> {
    let registry = CodecRegistry::with_default_codecs()?;
    let decoder = Decoder::new(&registry, config);

    let mut packets_total = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut protocol_stats: HashMap<&'static str, ProtocolStats> = HashMap::new();
    let mut chain_stats: HashMap<String, u64> = HashMap::new();

    let mut report = base_report(&path.display().to_string(), path.metadata()?.len());

    while let Some(PacketEvent { ts, linktype, data }) = source.next_packet()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);

        let packet = decoder.decode(ProtocolId(linktype.0 as u32), &data);

        match packet.status() {
            DecodeStatus::Ok => report.statuses.ok += 1,
            DecodeStatus::Truncated => report.statuses.truncated += 1,
            DecodeStatus::Malformed(_) => report.statuses.malformed += 1,
            DecodeStatus::EncapsulationLimitExceeded => {
                report.statuses.encapsulation_limit_exceeded += 1;
            }
        }

        let mut seen = Vec::new();
        for layer in packet.layers() {
            let stats = protocol_stats.entry(layer.codec).or_default();
            stats.headers += 1;
            if !seen.contains(&layer.codec) {
                seen.push(layer.codec);
                stats.packets += 1;
            }
        }

        if !packet.layers().is_empty() {
            *chain_stats.entry(packet.chain()).or_default() += 1;
        }
    }

    report.capture_summary = Some(CaptureSummary {
        packets_total,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

    report.protocols = protocol_stats
        .into_iter()
        .map(|(codec, stats)| ProtocolSummary {
            codec: codec.to_string(),
            packets: stats.packets,
            headers: stats.headers,
        })
        .collect();
    report.protocols.sort_by(|a, b| a.codec.cmp(&b.codec));

    report.chains = chain_stats
        .into_iter()
        .map(|(chain, packets)| ChainSummary { chain, packets })
        .collect();
    report.chains.sort_by(|a, b| a.chain.cmp(&b.chain));

    Ok(report)
}

#[derive(Debug, Default)]
struct ProtocolStats {
    packets: u64,
    headers: u64,
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else { return };
    if first.is_none_or(|current| ts < current) {
        *first = Some(ts);
    }
    if last.is_none_or(|current| ts > current) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1e9) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
