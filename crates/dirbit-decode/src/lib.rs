//! x86/x86-64 decoder adapter: wraps `iced-x86` with the raw byte-offset
//! information the direction-bit rewrite needs, and classifies which
//! decoded instructions are eligible bit carriers.

mod classify;
mod decode;
mod raw;

pub use classify::{is_carrier, modrm_is_register_addressing, CARRIER_MNEMONICS};
pub use decode::{decode_one, Decoded};
pub use raw::{DecodeError, DecodeMode, Rex, MAX_INSTRUCTION_LEN};
