//! Minimal ELF64 fixture builder for exercising the full scan/write/read
//! pipeline without a real system binary on disk.

const EM_X86_64: u16 = 62;

pub struct ElfFixture {
    pub bytes: Vec<u8>,
}

pub fn build_elf64(text_data: &[u8]) -> ElfFixture {
    const EHDR_SIZE: u64 = 64;
    const TEXT_ADDR: u64 = 0x1000;

    let text_off = EHDR_SIZE;
    let text_size = text_data.len() as u64;

    let mut shstrtab = vec![0u8];
    let text_name_off = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".text\0");
    let shstrtab_name_off = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".shstrtab\0");
    let shstrtab_off = text_off + text_size;
    let shstrtab_size = shstrtab.len() as u64;

    let shoff_unaligned = shstrtab_off + shstrtab_size;
    let shoff = (shoff_unaligned + 7) & !7;

    let mut buf = Vec::new();
    buf.extend_from_slice(&[0x7f, b'E', b'L', b'F']);
    buf.push(2);
    buf.push(1);
    buf.push(1);
    buf.push(0);
    buf.extend_from_slice(&[0u8; 8]);

    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&EM_X86_64.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&shoff.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&(EHDR_SIZE as u16).to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&64u16.to_le_bytes());
    buf.extend_from_slice(&3u16.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());

    assert_eq!(buf.len() as u64, EHDR_SIZE);

    buf.extend_from_slice(text_data);
    buf.extend_from_slice(&shstrtab);
    while (buf.len() as u64) < shoff {
        buf.push(0);
    }

    buf.extend_from_slice(&[0u8; 64]);
    push_shdr(&mut buf, text_name_off, 1, TEXT_ADDR, text_off, text_size);
    push_shdr(&mut buf, shstrtab_name_off, 3, 0, shstrtab_off, shstrtab_size);

    ElfFixture { bytes: buf }
}

fn push_shdr(buf: &mut Vec<u8>, name: u32, sh_type: u32, addr: u64, offset: u64, size: u64) {
    buf.extend_from_slice(&name.to_le_bytes());
    buf.extend_from_slice(&sh_type.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&addr.to_le_bytes());
    buf.extend_from_slice(&offset.to_le_bytes());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&1u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());
}
