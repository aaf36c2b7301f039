use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use pcap_parser::{
    Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader,
    traits::PcapReaderIterator,
};

use super::{PacketEvent, PacketSource, SourceError};

const READER_BUFFER_SIZE: usize = 65536;
const PCAPNG_SECTION_MAGIC: [u8; 4] = [0x0A, 0x0D, 0x0D, 0x0A];

/// File-backed source for legacy PCAP and PCAPNG captures.
///
/// The format is sniffed from the leading magic; PCAPNG interface
/// descriptions are tracked so each packet reports its own linktype.
pub struct PcapFileSource {
    inner: Reader,
}

enum Reader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Option<Linktype>,
    },
    Ng {
        reader: PcapNGReader<File>,
        linktypes: Vec<Linktype>,
    },
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let mut file = File::open(path)?;
        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        file.seek(SeekFrom::Start(0))?;

        let inner = if magic == PCAPNG_SECTION_MAGIC {
            let reader =
                PcapNGReader::new(READER_BUFFER_SIZE, file).map_err(|e| SourceError::Capture {
                    context: "pcapng reader init",
                    message: e.to_string(),
                })?;
            Reader::Ng {
                reader,
                linktypes: Vec::new(),
            }
        } else {
            let reader = LegacyPcapReader::new(READER_BUFFER_SIZE, file).map_err(|e| {
                SourceError::Capture {
                    context: "pcap reader init",
                    message: e.to_string(),
                }
            })?;
            Reader::Legacy {
                reader,
                linktype: None,
            }
        };
        Ok(PcapFileSource { inner })
    }
}

impl PacketSource for PcapFileSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        loop {
            let step = match &mut self.inner {
                Reader::Legacy { reader, linktype } => {
                    advance(reader, "pcap", |block| match block {
                        PcapBlockOwned::LegacyHeader(header) => {
                            *linktype = Some(header.network);
                            None
                        }
                        PcapBlockOwned::Legacy(packet) => Some(PacketEvent {
                            ts: Some(packet.ts_sec as f64 + packet.ts_usec as f64 * 1e-6),
                            linktype: linktype.unwrap_or(Linktype::ETHERNET),
                            data: packet.data.to_vec(),
                        }),
                        _ => None,
                    })?
                }
                Reader::Ng { reader, linktypes } => {
                    advance(reader, "pcapng", |block| match block {
                        PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                            linktypes.push(intf.linktype);
                            None
                        }
                        PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => {
                            let ts = ((packet.ts_high as u64) << 32) | packet.ts_low as u64;
                            Some(PacketEvent {
                                ts: Some(ts as f64 * 1e-6),
                                linktype: linktypes
                                    .get(packet.if_id as usize)
                                    .copied()
                                    .unwrap_or(Linktype::ETHERNET),
                                data: packet.data.to_vec(),
                            })
                        }
                        _ => None,
                    })?
                }
            };

            match step {
                Step::Packet(event) => return Ok(Some(event)),
                Step::Skipped => {}
                Step::Eof => return Ok(None),
            }
        }
    }
}

enum Step {
    Packet(PacketEvent),
    Skipped,
    Eof,
}

fn advance<R>(
    reader: &mut R,
    context: &'static str,
    mut on_block: impl FnMut(PcapBlockOwned<'_>) -> Option<PacketEvent>,
) -> Result<Step, SourceError>
where
    R: PcapReaderIterator,
{
    match reader.next() {
        Ok((consumed, block)) => {
            let event = on_block(block);
            reader.consume(consumed);
            Ok(match event {
                Some(event) => Step::Packet(event),
                None => Step::Skipped,
            })
        }
        Err(PcapError::Eof) => Ok(Step::Eof),
        Err(PcapError::Incomplete(_)) => {
            reader.refill().map_err(|e| SourceError::Capture {
                context,
                message: e.to_string(),
            })?;
            Ok(Step::Skipped)
        }
        Err(e) => Err(SourceError::Capture {
            context,
            message: e.to_string(),
        }),
    }
}
