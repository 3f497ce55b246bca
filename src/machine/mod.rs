//! Host-facing glue: a processor wired to its mapping unit, with ROM
//! loading, the power-on sequence, a headless run loop and save states.

mod rom;

#[cfg(test)]
mod tests;

pub use rom::{prepare_rom_image, RomError};

use std::error::Error;
use std::path::Path;

use crate::cpu::Cpu;
use crate::errors::CoreError;
use crate::mmu::Mmu;

#[derive(bincode::Encode, bincode::Decode)]
pub struct Machine {
    pub cpu: Cpu,
    pub mmu: Mmu,
    cycles: u64,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            mmu: Mmu::new(),
            cycles: 0,
        }
    }

    /// Load a ROM image blob into the physical ROM region.
    pub fn load_rom_bytes(&mut self, image: &[u8]) -> Result<(), RomError> {
        let rom = rom::prepare_rom_image(image)?;
        log::debug!("rom loaded: {} bytes, {} banks", rom.len(), rom.len() / crate::mmu::PAGE_SIZE);
        self.mmu.load_rom_image(rom);
        Ok(())
    }

    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Box<dyn Error>> {
        let image = std::fs::read(path)?;
        self.load_rom_bytes(&image)?;
        Ok(())
    }

    /// Power-on sequence: seed the flags, force the mapping registers to
    /// their reset state, then pull the program counter from the reset
    /// vector.  The ROM must already be loaded.
    pub fn reset(&mut self) -> Result<(), CoreError> {
        self.mmu.reset_mappings();
        self.mmu.irq.reset();
        self.cpu.reset(&mut self.mmu)?;
        self.cycles = 0;
        Ok(())
    }

    /// Run one scheduling quantum and account its cycles.
    pub fn step(&mut self) -> Result<u32, CoreError> {
        let cycles = self.cpu.step(&mut self.mmu)?;
        if cycles == 0 && self.cpu.waiting() {
            // An idle quantum parked in WAI still consumes time, so cycle
            // budgets keep draining while the core sleeps.
            self.cycles += 1;
        } else {
            self.cycles += cycles as u64;
        }
        Ok(cycles)
    }

    /// Run until the core halts, a fatal condition surfaces, or the
    /// optional cycle budget is exhausted.
    pub fn run_until_halt(&mut self, cycle_budget: Option<u64>) -> Result<(), CoreError> {
        while !self.cpu.halted() {
            let cycles = self.step()?;
            if let Some(budget) = cycle_budget {
                if self.cycles >= budget {
                    break;
                }
            }
            if cycles == 0 && !self.cpu.waiting() {
                break;
            }
        }
        Ok(())
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn save_state_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        let bytes = bincode::encode_to_vec(self, bincode::config::standard())?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load_state_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Box<dyn Error>> {
        let bytes = std::fs::read(path)?;
        let (state, _): (Machine, usize) =
            bincode::decode_from_slice(&bytes, bincode::config::standard())?;
        *self = state;
        Ok(())
    }
}
