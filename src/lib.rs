//! Cycle-accurate HuC6280 CPU and memory-mapper core.
//!
//! Emulates the processor at the heart of the PC Engine: the extended
//! 6502-family instruction set with its remapped zero page, eight-way
//! bank-switched address space, multi-byte block transfers and bit-indexed
//! opcodes, plus the three-source interrupt arbitration that drives it.
//! Video, sound, timer and joypad hardware are external collaborators
//! attached behind the [`mmu::Peripheral`] trait; the core treats them
//! purely as bus-addressable load/store targets.
//!
//! Fidelity over forgiveness: any condition that would make subsequent
//! state untrustworthy (an unassigned opcode, a malformed bank-select
//! mask, an undecoded peripheral offset) stops execution with a typed
//! [`errors::CoreError`] carrying the offending address.

pub mod cpu;
pub mod errors;
pub mod irq;
pub mod machine;
pub mod mmu;

pub use cpu::Cpu;
pub use errors::CoreError;
pub use irq::{IrqController, IrqSource};
pub use machine::Machine;
pub use mmu::Mmu;
