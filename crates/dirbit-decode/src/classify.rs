use iced_x86::{Mnemonic, OpKind};

use crate::decode::Decoded;

/// Two-operand instruction classes that expose a direction bit, use
/// ModR/M, and can address two registers: the only encodings where a
/// reg/rm swap plus a direction-bit flip round-trips to an identical
/// instruction.
pub const CARRIER_MNEMONICS: &[Mnemonic] = &[
    Mnemonic::Mov,
    Mnemonic::Add,
    Mnemonic::Sub,
    Mnemonic::Sbb,
    Mnemonic::Cmp,
    Mnemonic::And,
    Mnemonic::Or,
    Mnemonic::Xor,
    Mnemonic::Adc,
];

/// `mod` field of a ModR/M byte: `0b11` means register-to-register
/// addressing, the only form a carrier rewrite is defined for.
pub fn modrm_is_register_addressing(modrm: u8) -> bool {
    (modrm >> 6) == 0b11
}

/// Is this decoded instruction a legal bit carrier?
///
/// All three of: class is in [`CARRIER_MNEMONICS`], a ModR/M byte is
/// present, and both operands are registers.
pub fn is_carrier(decoded: &Decoded) -> bool {
    let ins = &decoded.instruction;

    if !CARRIER_MNEMONICS.contains(&ins.mnemonic()) {
        return false;
    }
    if decoded.modrm.is_none() {
        return false;
    }
    if ins.op_count() != 2 {
        return false;
    }
    ins.op0_kind() == OpKind::Register && ins.op1_kind() == OpKind::Register
}
