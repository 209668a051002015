use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElfError {
    #[error("not an ELF file")]
    NotElf,
    #[error("unsupported machine type (only EM_386 and EM_X86_64 are supported)")]
    UnsupportedMachine,
    #[error("e_shstrndx does not name a STRTAB section")]
    NoStringTable,
    #[error("no PROGBITS section named .text was found")]
    NoTextSection,
    #[error(".text section's file offset/size ({file_off}/{size}) exceeds the file's length ({file_len})")]
    TextSectionOutOfBounds {
        file_off: u64,
        size: u64,
        file_len: u64,
    },
    #[error("failed to memory-map file: {0}")]
    MapFailure(#[source] std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
