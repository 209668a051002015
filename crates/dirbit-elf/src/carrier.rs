use std::fs::{File, OpenOptions};
use std::path::Path;

use memmap2::{Mmap, MmapMut};

use crate::error::ElfError;
use crate::locate::TextLocation;

/// A memory-mapped view over an ELF file with a `.text` window carved out
/// of it. Read-only windows back scan/read mode; read-write windows back
/// write mode and are always opened over a fresh copy of the input, never
/// the input itself.
pub enum TextWindow {
    ReadOnly { mmap: Mmap, text: TextLocation },
    ReadWrite { mmap: MmapMut, text: TextLocation },
}

impl TextWindow {
    /// Map `path` read-only. Used by scan and read mode, neither of which
    /// is permitted to mutate the input.
    pub fn open_read_only(path: &Path, text: TextLocation) -> Result<Self, ElfError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(ElfError::MapFailure)?;
        Ok(TextWindow::ReadOnly { mmap, text })
    }

    /// Copy `src` to `dst`, then map the copy read-write. Used by write
    /// mode: the original file is never opened for writing.
    pub fn open_copy_for_write(src: &Path, dst: &Path, text: TextLocation) -> Result<Self, ElfError> {
        std::fs::copy(src, dst)?;
        let file = OpenOptions::new().read(true).write(true).open(dst)?;
        let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(ElfError::MapFailure)?;
        Ok(TextWindow::ReadWrite { mmap, text })
    }

    pub fn text(&self) -> &TextLocation {
        match self {
            TextWindow::ReadOnly { text, .. } => text,
            TextWindow::ReadWrite { text, .. } => text,
        }
    }

    pub fn text_bytes(&self) -> &[u8] {
        let t = self.text();
        let start = t.file_off as usize;
        let end = start + t.size as usize;
        match self {
            TextWindow::ReadOnly { mmap, .. } => &mmap[start..end],
            TextWindow::ReadWrite { mmap, .. } => &mmap[start..end],
        }
    }

    /// `None` for a read-only window: scan/read mode never requests a
    /// mutable view in the first place, so this is a defensive contract
    /// rather than a state this crate's own callers ever hit.
    pub fn text_bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            TextWindow::ReadOnly { .. } => None,
            TextWindow::ReadWrite { mmap, text } => {
                let start = text.file_off as usize;
                let end = start + text.size as usize;
                Some(&mut mmap[start..end])
            }
        }
    }

    /// Synchronously flush pending writes to disk. A no-op on read-only
    /// windows.
    pub fn flush(&self) -> Result<(), ElfError> {
        if let TextWindow::ReadWrite { mmap, .. } = self {
            mmap.flush().map_err(ElfError::MapFailure)?;
        }
        Ok(())
    }
}
