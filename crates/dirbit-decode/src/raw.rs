//! Raw prefix/opcode byte-offset walking.
//!
//! `iced_x86::Decoder` gives us instruction length and semantic fields but
//! does not expose where the nominal opcode and ModR/M bytes actually sit
//! inside the instruction. This module re-derives those offsets with a
//! small legacy-prefix/REX/escape-byte walk, mirroring the bookkeeping a
//! decoder's internal prefix scanner does.

/// Legacy prefix bytes that may precede the REX byte and opcode.
const LEGACY_PREFIXES: [u8; 9] = [
    0x26, 0x2e, 0x36, 0x3e, // segment overrides (ES/CS/SS/DS)
    0x64, 0x65, // FS/GS overrides
    0x66, 0x67, // operand-size / address-size overrides
    0xf0, // LOCK
];
const REP_PREFIXES: [u8; 2] = [0xf2, 0xf3];

/// Upper bound on a single x86 instruction's encoded length.
pub const MAX_INSTRUCTION_LEN: usize = 15;

/// Which decode mode to walk bytes in. Determines whether a `0x40..=0x4F`
/// byte is a REX prefix (64-bit mode) or the one-byte `INC`/`DEC` opcodes
/// (32-bit mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    Bits32,
    Bits64,
}

/// The REX prefix byte, decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rex(pub u8);

impl Rex {
    pub fn w(&self) -> bool {
        self.0 & 0x08 != 0
    }
    pub fn r(&self) -> bool {
        self.0 & 0x04 != 0
    }
    pub fn x(&self) -> bool {
        self.0 & 0x02 != 0
    }
    pub fn b(&self) -> bool {
        self.0 & 0x01 != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty instruction stream")]
    EmptyInput,
    #[error("unexpected end of input while decoding an instruction")]
    UnexpectedEof,
    #[error("decoder rejected instruction bytes")]
    InvalidInstruction,
}

/// Result of walking an instruction's prefixes: where its REX byte lives
/// (if any) and where its nominal opcode byte starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPrefixInfo {
    pub rex: Option<(usize, Rex)>,
    pub opcode_offset: usize,
    pub two_byte_escape: bool,
}

/// Walk legacy prefixes, an optional REX byte, and an optional `0x0F`
/// two-byte-opcode escape, returning the offset of the nominal opcode byte.
pub fn scan_prefixes(mode: DecodeMode, bytes: &[u8]) -> Result<RawPrefixInfo, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let mut offset = 0usize;
    loop {
        let Some(&b) = bytes.get(offset) else {
            return Err(DecodeError::UnexpectedEof);
        };
        if LEGACY_PREFIXES.contains(&b) || REP_PREFIXES.contains(&b) {
            offset += 1;
            continue;
        }
        break;
    }

    let mut rex = None;
    if mode == DecodeMode::Bits64 {
        if let Some(&b) = bytes.get(offset) {
            if (0x40..=0x4f).contains(&b) {
                rex = Some((offset, Rex(b)));
                offset += 1;
            }
        } else {
            return Err(DecodeError::UnexpectedEof);
        }
    }

    let mut two_byte_escape = false;
    match bytes.get(offset) {
        Some(&0x0f) => {
            two_byte_escape = true;
            offset += 1;
            if bytes.get(offset).is_none() {
                return Err(DecodeError::UnexpectedEof);
            }
        }
        Some(_) => {}
        None => return Err(DecodeError::UnexpectedEof),
    }

    Ok(RawPrefixInfo {
        rex,
        opcode_offset: offset,
        two_byte_escape,
    })
}
