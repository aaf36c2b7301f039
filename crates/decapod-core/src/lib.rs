//! Decapod core library: a layered packet-decode engine for captured
//! traffic.
//!
//! The decode engine walks each raw frame through a chain of protocol codecs
//! (Ethernet, VLAN, MPLS, IPv4/IPv6, TCP/UDP, and tunnel protocols such as
//! GRE, ERSPAN, Teredo and GTP), selected from an immutable registry by
//! layer-scoped protocol identifiers. The result is an ordered layer stack
//! plus the undecoded payload, or a well-defined per-packet failure status.
//! Around the engine sit a pcap/pcapng source and a dissection pipeline that
//! aggregates per-capture reports for the CLI.
//!
//! Invariants:
//! - The codec registry is built once at startup and is read-only afterwards;
//!   registration conflicts fail the build, never a decode.
//! - Per-packet conditions (truncation, malformed headers, encapsulation
//!   limits) are status values; decoding never panics on untrusted input.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use decapod_core::{decode::DecodeConfig, dissect_pcap_file};
//!
//! let report = dissect_pcap_file(Path::new("capture.pcapng"), DecodeConfig::default())?;
//! println!("report version: {}", report.report_version);
//! # Ok::<(), decapod_core::DissectError>(())
//! ```

use serde::{Deserialize, Serialize};

pub mod codecs;
pub mod decode;
mod dissect;
mod source;

pub use dissect::{DissectError, dissect_pcap_file, dissect_source};
pub use source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated dissection report with deterministic ordering.
///
/// # Examples
/// ```
/// use decapod_core::base_report;
///
/// let report = base_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, decapod_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,

    /// Optional capture summary (absent when the capture was empty).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Per-status packet counts.
    pub statuses: StatusSummary,
    /// Per-codec summaries in stable order.
    pub protocols: Vec<ProtocolSummary>,
    /// Distinct layer chains in stable order.
    pub chains: Vec<ChainSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "decapod").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the dissector.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
///
/// # Examples
/// ```
/// use decapod_core::CaptureSummary;
///
/// let summary = CaptureSummary {
///     packets_total: 10,
///     time_start: None,
///     time_end: None,
/// };
/// assert_eq!(summary.packets_total, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Total packet count observed in the capture.
    pub packets_total: u64,
    /// RFC3339 timestamp of the first packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Packet counts per final decode status.
///
/// # Examples
/// ```
/// use decapod_core::StatusSummary;
///
/// let statuses = StatusSummary::default();
/// assert_eq!(statuses.ok, 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Packets that decoded cleanly (including unrecognized payloads).
    pub ok: u64,
    /// Packets cut short inside a header.
    pub truncated: u64,
    /// Packets with an internally inconsistent header.
    pub malformed: u64,
    /// Packets that tripped the nested-encapsulation guard.
    pub encapsulation_limit_exceeded: u64,
}

/// Per-codec aggregate.
///
/// `headers` can exceed `packets` when a protocol appears more than once in
/// a single packet, e.g. stacked VLAN tags or IP-in-IP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolSummary {
    /// Codec name as recorded in layer records.
    pub codec: String,
    /// Packets containing at least one header of this protocol.
    pub packets: u64,
    /// Total headers of this protocol across the capture.
    pub headers: u64,
}

/// Distinct layer chain, rendered as `"ethernet > ipv4 > udp"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSummary {
    /// Rendered chain.
    pub chain: String,
    /// Packets whose full chain matched.
    pub packets: u64,
}

/// Build a report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use decapod_core::base_report;
///
/// let report = base_report("capture.pcapng", 123);
/// assert!(report.protocols.is_empty());
/// assert!(report.capture_summary.is_none());
/// ```
pub fn base_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "decapod".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        statuses: StatusSummary::default(),
        protocols: vec![],
        chains: vec![],
    }
}
