use std::fs::File;
use std::io::Read;
use std::path::Path;

use goblin::elf::header::{EM_386, EM_X86_64};
use goblin::elf::section_header::{SHT_PROGBITS, SHT_STRTAB};
use goblin::elf::Elf;

use crate::error::ElfError;

/// Machine bitness, fixed at locate time from the ELF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineMode {
    I386,
    X86_64,
}

/// The `.text` section's address, file offset, and size, plus the
/// machine bitness it was found under.
#[derive(Debug, Clone)]
pub struct TextLocation {
    pub machine: MachineMode,
    pub base_va: u64,
    pub file_off: u64,
    pub size: u64,
}

/// Open `path`, validate it is an `EM_386`/`EM_X86_64` ELF, and return the
/// location of its first `PROGBITS` section named exactly `.text`.
pub fn locate_text(path: &Path) -> Result<TextLocation, ElfError> {
    let mut file = File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;

    let elf = Elf::parse(&buf).map_err(|_| ElfError::NotElf)?;

    let machine = match elf.header.e_machine {
        EM_386 => MachineMode::I386,
        EM_X86_64 => MachineMode::X86_64,
        _ => return Err(ElfError::UnsupportedMachine),
    };

    let shstrtab_shdr = elf
        .section_headers
        .get(elf.header.e_shstrndx as usize)
        .ok_or(ElfError::NoStringTable)?;
    if shstrtab_shdr.sh_type != SHT_STRTAB {
        return Err(ElfError::NoStringTable);
    }

    for sh in &elf.section_headers {
        if sh.sh_type != SHT_PROGBITS {
            continue;
        }
        if elf.shdr_strtab.get_at(sh.sh_name) == Some(".text") {
            let file_len = buf.len() as u64;
            let in_bounds = sh
                .sh_offset
                .checked_add(sh.sh_size)
                .is_some_and(|end| end <= file_len);
            if !in_bounds {
                return Err(ElfError::TextSectionOutOfBounds {
                    file_off: sh.sh_offset,
                    size: sh.sh_size,
                    file_len,
                });
            }
            return Ok(TextLocation {
                machine,
                base_va: sh.sh_addr,
                file_off: sh.sh_offset,
                size: sh.sh_size,
            });
        }
    }

    Err(ElfError::NoTextSection)
}
