use std::io::{Read, Write};

use dirbit_decode::{decode_one, is_carrier, DecodeError, DecodeMode};
use dirbit_elf::TextWindow;
use thiserror::Error;
use tracing::warn;

use crate::bits::{InputBitStream, OutputBitStream};
use crate::rewrite::{extract_bit, rewrite, RewriteOutcome};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("decode failed at .text offset {offset}: {source}")]
    Decode {
        offset: u64,
        #[source]
        source: DecodeError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of a scan pass: raw carrier/instruction counts. See
/// [`ScanReport::capacity_bytes`] and [`ScanReport::percent`] for the
/// derived figures the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub carrier_inst: u64,
    pub total_inst: u64,
}

impl ScanReport {
    pub fn capacity_bytes(&self) -> u64 {
        self.carrier_inst / 8
    }

    pub fn percent(&self) -> u64 {
        if self.total_inst == 0 {
            0
        } else {
            (self.carrier_inst * 100) / self.total_inst
        }
    }
}

/// Result of a write pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub bits_written: u64,
    /// Unread input bits remained after every carrier was exhausted.
    pub capacity_shortfall: bool,
}

impl WriteReport {
    pub fn bytes_written(&self) -> u64 {
        self.bits_written / 8
    }
}

/// Result of a read pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadReport {
    pub bits_extracted: u64,
}

/// Walk `window`'s `.text` section in scan mode: count carriers and total
/// instructions without mutating anything.
pub fn run_scan(window: &TextWindow, mode: DecodeMode) -> Result<ScanReport, CodecError> {
    let text = window.text_bytes();
    let base_va = window.text().base_va;

    let mut offset = 0usize;
    let mut total_inst = 0u64;
    let mut carrier_inst = 0u64;

    while offset < text.len() {
        let decoded = decode_one(mode, base_va + offset as u64, &text[offset..])
            .map_err(|e| CodecError::Decode {
                offset: offset as u64,
                source: e,
            })?;
        total_inst += 1;
        if is_carrier(&decoded) {
            carrier_inst += 1;
        }
        offset += decoded.length;
    }

    Ok(ScanReport {
        carrier_inst,
        total_inst,
    })
}

/// Walk `window`'s `.text` section in write mode, consuming bits from
/// `input` and rewriting each carrier's direction bit in place. Stops
/// cleanly if `input` reaches EOF before carriers run out; if carriers run
/// out first and `input` still has data, `capacity_shortfall` is set.
pub fn run_write<R: Read>(
    window: &mut TextWindow,
    mode: DecodeMode,
    mut input: InputBitStream<R>,
) -> Result<WriteReport, CodecError> {
    let base_va = window.text().base_va;
    let text = window
        .text_bytes_mut()
        .expect("write mode requires a read-write TextWindow");

    let mut offset = 0usize;
    let mut bits_written = 0u64;
    let mut input_eof = false;

    while offset < text.len() && !input_eof {
        let decoded = decode_one(mode, base_va + offset as u64, &text[offset..]).map_err(|e| {
            CodecError::Decode {
                offset: offset as u64,
                source: e,
            }
        })?;
        let length = decoded.length;

        if is_carrier(&decoded) {
            match input.next_bit() {
                Some(bit) => {
                    let slice = &mut text[offset..offset + length];
                    if rewrite(slice, &decoded, bit) == RewriteOutcome::ClassifierViolation {
                        warn!(
                            offset,
                            "carrier instruction had a non-register-addressing ModR/M; left unmodified"
                        );
                    } else {
                        bits_written += 1;
                    }
                }
                None => input_eof = true,
            }
        }

        if !input_eof {
            offset += length;
        }
    }

    // Text ran out before input did: check whether input still has bits.
    let capacity_shortfall = !input_eof && input.next_bit().is_some();

    Ok(WriteReport {
        bits_written,
        capacity_shortfall,
    })
}

/// Walk `window`'s `.text` section in read mode, extracting carriers'
/// direction bits to `output`. `requested_bytes = None` means "until
/// `.text` is exhausted".
pub fn run_read<W: Write>(
    window: &TextWindow,
    mode: DecodeMode,
    requested_bytes: Option<u32>,
    output: OutputBitStream<W>,
) -> Result<ReadReport, CodecError> {
    let requested_bits = requested_bytes.map(|n| n as u64 * 8);
    let text = window.text_bytes();
    let base_va = window.text().base_va;

    let mut offset = 0usize;
    let mut bits_extracted = 0u64;
    let mut output = output;

    while offset < text.len() {
        if let Some(limit) = requested_bits {
            if bits_extracted >= limit {
                break;
            }
        }

        let decoded = decode_one(mode, base_va + offset as u64, &text[offset..])
            .map_err(|e| CodecError::Decode {
                offset: offset as u64,
                source: e,
            })?;

        if is_carrier(&decoded) {
            output.push_bit(extract_bit(&decoded))?;
            bits_extracted += 1;
        }

        offset += decoded.length;
    }

    output.finish()?;

    Ok(ReadReport { bits_extracted })
}
