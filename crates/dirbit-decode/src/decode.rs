use iced_x86::{Code, Decoder, DecoderOptions, Instruction};

use crate::raw::{scan_prefixes, DecodeMode, Rex, MAX_INSTRUCTION_LEN};

pub use crate::raw::DecodeError;

/// One decoded instruction plus the raw byte offsets `dirbit-codec` needs
/// to perform the direction-bit rewrite.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub instruction: Instruction,
    pub length: usize,
    pub opcode_offset: usize,
    pub opcode_byte: u8,
    pub modrm: Option<(usize, u8)>,
    pub rex: Option<(usize, Rex)>,
}

impl Decoded {
    pub fn modrm_offset(&self) -> Option<usize> {
        self.modrm.map(|(off, _)| off)
    }

    pub fn modrm_byte(&self) -> Option<u8> {
        self.modrm.map(|(_, b)| b)
    }
}

/// Decode one instruction starting at `bytes[0]`, reporting its length and
/// the raw offsets of its nominal opcode, ModR/M and REX bytes.
pub fn decode_one(mode: DecodeMode, ip: u64, bytes: &[u8]) -> Result<Decoded, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let bitness = match mode {
        DecodeMode::Bits32 => 32,
        DecodeMode::Bits64 => 64,
    };

    let window = &bytes[..bytes.len().min(MAX_INSTRUCTION_LEN)];
    let mut decoder = Decoder::with_ip(bitness, window, ip, DecoderOptions::NONE);
    let instruction = decoder.decode();

    if instruction.code() == Code::INVALID {
        // iced_x86 cannot distinguish "ran out of bytes" from "truly
        // invalid encoding" through `Instruction` alone; a short window is
        // the more likely explanation and is reported as EOF so callers
        // can tell a truncated `.text` tail from a genuinely bad stream.
        if window.len() < MAX_INSTRUCTION_LEN {
            return Err(DecodeError::UnexpectedEof);
        }
        return Err(DecodeError::InvalidInstruction);
    }

    let length = instruction.len();
    let raw = scan_prefixes(mode, window)?;

    let modrm_offset = raw.opcode_offset + 1;
    let modrm = if modrm_offset < length && modrm_offset < window.len() {
        Some((modrm_offset, window[modrm_offset]))
    } else {
        None
    };

    Ok(Decoded {
        instruction,
        length,
        opcode_offset: raw.opcode_offset,
        opcode_byte: window[raw.opcode_offset],
        modrm,
        rex: raw.rex,
    })
}
