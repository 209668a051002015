//! ELF `.text` location and memory-mapped access.

mod carrier;
mod error;
mod locate;

pub use carrier::TextWindow;
pub use error::ElfError;
pub use locate::{locate_text, MachineMode, TextLocation};
