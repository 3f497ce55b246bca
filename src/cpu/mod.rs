//! HuC6280 processor core.
//!
//! Owns the register file, drives fetch-decode-execute over the opcode
//! catalogue, polls the interrupt controller between instructions, and
//! advances in-flight block transfers one byte per step so long copies
//! never block interrupt service.

pub mod disasm;
mod exec;
pub mod opcodes;
mod registers;


pub use disasm::{disassemble, Disasm};
pub use exec::{ExecCtx, STACK_BASE, ZERO_PAGE_BASE};
pub use registers::{BlockMode, BlockTransfer, Registers, Status};

use crate::errors::CoreError;
use crate::mmu::Mmu;

use exec::zero_page_addr;
use opcodes::OPCODES;

pub const VECTOR_RESET: u16 = 0xFFFE;
pub const VECTOR_NMI: u16 = 0xFFFC;

/// Cycles taken by the interrupt vectoring sequence.
const INTERRUPT_CYCLES: u32 = 8;
/// Cycles per byte moved by a block transfer, on top of the setup cost.
const BLOCK_BYTE_CYCLES: u32 = 6;

#[derive(Clone, bincode::Encode, bincode::Decode)]
pub struct Cpu {
    pub regs: Registers,
    nmi_pending: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            nmi_pending: false,
        }
    }

    /// Seed the power-on register state and load the reset vector.  The
    /// caller resets the mapping registers first so the vector is
    /// reachable (window 7 at its forced power-on value).
    pub fn reset(&mut self, mmu: &mut Mmu) -> Result<(), CoreError> {
        self.regs = Registers::new();
        self.nmi_pending = false;
        self.regs.pc = mmu.load_u16(VECTOR_RESET)?;
        log::debug!("reset: pc={:#06X}", self.regs.pc);
        Ok(())
    }

    /// Latch an NMI edge; taken before the next instruction regardless of
    /// the interrupt-disable flag.
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    pub fn halted(&self) -> bool {
        self.regs.halted
    }

    pub fn waiting(&self) -> bool {
        self.regs.waiting
    }

    /// Execute one scheduling quantum: an interrupt dispatch, one byte of
    /// an in-flight block transfer, or one instruction.  Returns the
    /// elapsed cycle count.
    pub fn step(&mut self, mmu: &mut Mmu) -> Result<u32, CoreError> {
        if self.regs.halted {
            return Ok(0);
        }

        if self.nmi_pending {
            self.nmi_pending = false;
            return self.dispatch_interrupt(mmu, VECTOR_NMI);
        }

        // Maskable sources are polled once per instruction boundary.  WAI
        // parks the core until a request arrives, even one the global
        // disable flag would otherwise hold off.
        if mmu.irq.pending() && (!self.regs.status.irq_disable || self.regs.waiting) {
            if let Some(source) = mmu.irq.resolve() {
                mmu.irq.acknowledge(source);
                log::trace!("irq dispatch: {source:?}");
                return self.dispatch_interrupt(mmu, source.vector());
            }
        }

        if self.regs.waiting {
            return Ok(0);
        }

        // An in-flight block transfer advances one byte per quantum, but
        // only once any interrupt service it was suspended by has
        // returned.
        if let Some(transfer) = self.regs.transfers.last() {
            if transfer.depth == self.regs.irq_depth {
                return self.advance_transfer(mmu);
            }
        }

        let op_addr = self.regs.pc;
        let opcode = mmu.load(op_addr)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);

        let Some(attr) = &OPCODES[opcode as usize] else {
            return Err(CoreError::UnimplementedOpcode {
                opcode,
                addr: op_addr,
            });
        };

        // The memory-operation flag is consumed by the instruction that
        // follows SET; clear it before execution so only handlers that
        // care see the armed value.
        let t_active = self.regs.status.memory_op;
        self.regs.status.memory_op = false;

        let mut ctx = ExecCtx {
            regs: &mut self.regs,
            mmu,
        };
        exec::execute(&mut ctx, opcode, op_addr, attr, t_active)
    }

    fn dispatch_interrupt(&mut self, mmu: &mut Mmu, vector: u16) -> Result<u32, CoreError> {
        let mut ctx = ExecCtx {
            regs: &mut self.regs,
            mmu,
        };
        exec::interrupt_entry(&mut ctx, vector, false)?;
        self.regs.irq_depth = self.regs.irq_depth.saturating_add(1);
        self.regs.halted = false;
        Ok(INTERRUPT_CYCLES)
    }

    fn advance_transfer(&mut self, mmu: &mut Mmu) -> Result<u32, CoreError> {
        let Some(mut transfer) = self.regs.transfers.pop() else {
            return Ok(0);
        };

        {
            let mut ctx = ExecCtx {
                regs: &mut self.regs,
                mmu,
            };
            match transfer.mode {
                BlockMode::Tii => {
                    let value = ctx.load(transfer.source)?;
                    ctx.store(transfer.dest, value)?;
                    transfer.source = transfer.source.wrapping_add(1);
                    transfer.dest = transfer.dest.wrapping_add(1);
                }
                BlockMode::Tdd => {
                    let value = ctx.load(transfer.source)?;
                    ctx.store(transfer.dest, value)?;
                    transfer.source = transfer.source.wrapping_sub(1);
                    transfer.dest = transfer.dest.wrapping_sub(1);
                }
                BlockMode::Tin => {
                    let value = ctx.load(transfer.source)?;
                    ctx.store(transfer.dest, value)?;
                    transfer.source = transfer.source.wrapping_add(1);
                }
                BlockMode::Tia => {
                    let value = ctx.load(transfer.source)?;
                    let target = transfer.dest.wrapping_add(transfer.alternate);
                    ctx.store(target, value)?;
                    transfer.source = transfer.source.wrapping_add(1);
                    transfer.alternate ^= 1;
                }
                BlockMode::Tai => {
                    let addr = transfer.source.wrapping_add(transfer.alternate);
                    let value = ctx.load(addr)?;
                    ctx.store(transfer.dest, value)?;
                    transfer.dest = transfer.dest.wrapping_add(1);
                    transfer.alternate ^= 1;
                }
            }

            transfer.remaining -= 1;
            if transfer.remaining == 0 {
                // The hardware restores the working registers it stacked
                // at setup.
                let y = ctx.pop()?;
                let x = ctx.pop()?;
                let a = ctx.pop()?;
                ctx.regs.y = y;
                ctx.regs.x = x;
                ctx.regs.a = a;
            }
        }

        if transfer.remaining > 0 {
            self.regs.transfers.push(transfer);
        }
        Ok(BLOCK_BYTE_CYCLES)
    }
}

/// The remapped zero-page rule in one place, for hosts and tests.
#[inline]
pub const fn zero_page_address(offset: u8) -> u16 {
    zero_page_addr(offset)
}
