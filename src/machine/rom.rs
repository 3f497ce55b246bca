use thiserror::Error;

use crate::mmu::PAGE_SIZE;

/// Size of the optional copier header some dump tools prepend.
const DUMP_HEADER_SIZE: usize = 512;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("ROM image is empty")]
    Empty,
}

/// Normalize a ROM dump into the physical ROM blob: strip a copier header
/// when the length betrays one, then pad to a whole number of 8 KiB banks
/// so every mapped window is fully backed.
pub fn prepare_rom_image(image: &[u8]) -> Result<Vec<u8>, RomError> {
    if image.is_empty() {
        return Err(RomError::Empty);
    }
    let payload = if image.len() % PAGE_SIZE == DUMP_HEADER_SIZE {
        &image[DUMP_HEADER_SIZE..]
    } else {
        image
    };
    if payload.is_empty() {
        return Err(RomError::Empty);
    }

    let mut rom = payload.to_vec();
    let remainder = rom.len() % PAGE_SIZE;
    if remainder != 0 {
        rom.resize(rom.len() + (PAGE_SIZE - remainder), 0xFF);
    }
    Ok(rom)
}
