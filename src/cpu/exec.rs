//! Execute-side consumer of the opcode catalogue.
//!
//! Every handler works through an [`ExecCtx`]: the register file plus the
//! MMU handle (the interrupt controller is reached through it).  Handlers
//! fetch their own operand bytes, advance the program counter, and return
//! the elapsed cycle count from the catalogue entry.

use crate::errors::CoreError;
use crate::mmu::Mmu;

use super::opcodes::{encoded_bit, AddrMode, OpAttr, OpKind};
use super::registers::{BlockMode, BlockTransfer, Registers, Status};

/// Base of the remapped zero page.  "Zero page" on this chip is the
/// logical window at $2000, not true address zero; every zero-page
/// effective address is `0x2000 | offset`.
pub const ZERO_PAGE_BASE: u16 = 0x2000;
/// The hardware stack page sits right above the zero page.
pub const STACK_BASE: u16 = 0x2100;

#[inline]
pub(crate) const fn zero_page_addr(offset: u8) -> u16 {
    ZERO_PAGE_BASE | offset as u16
}

/// Capability bundle handed to every opcode handler.
pub struct ExecCtx<'a> {
    pub regs: &'a mut Registers,
    pub mmu: &'a mut Mmu,
}

impl<'a> ExecCtx<'a> {
    #[inline]
    pub fn load(&mut self, addr: u16) -> Result<u8, CoreError> {
        self.mmu.load(addr)
    }

    #[inline]
    pub fn store(&mut self, addr: u16, value: u8) -> Result<(), CoreError> {
        self.mmu.store(addr, value)
    }

    pub fn fetch_byte(&mut self) -> Result<u8, CoreError> {
        let value = self.mmu.load(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    pub fn fetch_word(&mut self) -> Result<u16, CoreError> {
        let lo = self.fetch_byte()? as u16;
        let hi = self.fetch_byte()? as u16;
        Ok((hi << 8) | lo)
    }

    pub fn push(&mut self, value: u8) -> Result<(), CoreError> {
        let addr = STACK_BASE | self.regs.sp as u16;
        self.mmu.store(addr, value)?;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u8, CoreError> {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let addr = STACK_BASE | self.regs.sp as u16;
        self.mmu.load(addr)
    }

    fn zp_pointer(&mut self, offset: u8) -> Result<u16, CoreError> {
        let lo = self.load(zero_page_addr(offset))? as u16;
        let hi = self.load(zero_page_addr(offset.wrapping_add(1)))? as u16;
        Ok((hi << 8) | lo)
    }

    /// Effective address for the data addressing modes.  Zero-page index
    /// arithmetic wraps within the offset byte before the window base is
    /// applied; absolute index arithmetic wraps within 16 bits.
    fn effective_address(&mut self, mode: AddrMode) -> Result<u16, CoreError> {
        match mode {
            AddrMode::ZeroPage => Ok(zero_page_addr(self.fetch_byte()?)),
            AddrMode::ZeroPageX => {
                let offset = self.fetch_byte()?.wrapping_add(self.regs.x);
                Ok(zero_page_addr(offset))
            }
            AddrMode::ZeroPageY => {
                let offset = self.fetch_byte()?.wrapping_add(self.regs.y);
                Ok(zero_page_addr(offset))
            }
            AddrMode::Absolute => self.fetch_word(),
            AddrMode::AbsoluteX => {
                let base = self.fetch_word()?;
                Ok(base.wrapping_add(self.regs.x as u16))
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch_word()?;
                Ok(base.wrapping_add(self.regs.y as u16))
            }
            AddrMode::ZpIndirect => {
                let ptr = self.fetch_byte()?;
                self.zp_pointer(ptr)
            }
            AddrMode::ZpIndirectX => {
                let ptr = self.fetch_byte()?.wrapping_add(self.regs.x);
                self.zp_pointer(ptr)
            }
            AddrMode::ZpIndirectY => {
                let ptr = self.fetch_byte()?;
                let base = self.zp_pointer(ptr)?;
                Ok(base.wrapping_add(self.regs.y as u16))
            }
            // Remaining modes never reach the shared address path.
            _ => unreachable!("no effective address for {mode:?}"),
        }
    }

    fn operand_value(&mut self, mode: AddrMode) -> Result<u8, CoreError> {
        if mode == AddrMode::Immediate {
            self.fetch_byte()
        } else {
            let addr = self.effective_address(mode)?;
            self.load(addr)
        }
    }

    fn read_modify_write(
        &mut self,
        mode: AddrMode,
        apply: impl FnOnce(&mut Registers, u8) -> u8,
    ) -> Result<(), CoreError> {
        let addr = self.effective_address(mode)?;
        let value = self.load(addr)?;
        let result = apply(self.regs, value);
        self.store(addr, result)
    }

    fn branch(&mut self, condition: bool, base: u8) -> Result<u32, CoreError> {
        let offset = self.fetch_byte()? as i8;
        if condition {
            self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
            // Taken branches always cost two extra cycles; there is no
            // page-crossing penalty on this chip.
            Ok(base as u32 + 2)
        } else {
            Ok(base as u32)
        }
    }
}

/// Push the return state and take the given vector.  Shared by BRK and
/// the between-instruction interrupt dispatch.
pub(crate) fn interrupt_entry(
    ctx: &mut ExecCtx<'_>,
    vector: u16,
    set_break: bool,
) -> Result<(), CoreError> {
    let pc = ctx.regs.pc;
    ctx.push((pc >> 8) as u8)?;
    ctx.push(pc as u8)?;
    let mut pushed = ctx.regs.status;
    pushed.brk = set_break;
    ctx.push(pushed.to_byte())?;
    ctx.regs.status.irq_disable = true;
    ctx.regs.status.decimal = false;
    ctx.regs.status.memory_op = false;
    ctx.regs.pc = ctx.mmu.load_u16(vector)?;
    ctx.regs.waiting = false;
    Ok(())
}

#[inline]
fn vector_initialized(vector: u16) -> bool {
    vector != 0x0000 && vector != 0xFFFF
}

/// Execute one decoded instruction and return its cycle cost.
///
/// `op_addr` is the address the opcode byte was fetched from, carried for
/// error diagnostics.  `t_active` is the memory-operation flag as it stood
/// before the fetch cleared it.
pub(crate) fn execute(
    ctx: &mut ExecCtx<'_>,
    opcode: u8,
    op_addr: u16,
    attr: &OpAttr,
    t_active: bool,
) -> Result<u32, CoreError> {
    let base = attr.cycles as u32;
    match attr.kind {
        // Loads and stores.
        OpKind::Lda => {
            let value = ctx.operand_value(attr.mode)?;
            ctx.regs.a = value;
            ctx.regs.status.set_zero_negative(value);
            Ok(base)
        }
        OpKind::Ldx => {
            let value = ctx.operand_value(attr.mode)?;
            ctx.regs.x = value;
            ctx.regs.status.set_zero_negative(value);
            Ok(base)
        }
        OpKind::Ldy => {
            let value = ctx.operand_value(attr.mode)?;
            ctx.regs.y = value;
            ctx.regs.status.set_zero_negative(value);
            Ok(base)
        }
        OpKind::Sta => {
            let addr = ctx.effective_address(attr.mode)?;
            ctx.store(addr, ctx.regs.a)?;
            Ok(base)
        }
        OpKind::Stx => {
            let addr = ctx.effective_address(attr.mode)?;
            ctx.store(addr, ctx.regs.x)?;
            Ok(base)
        }
        OpKind::Sty => {
            let addr = ctx.effective_address(attr.mode)?;
            ctx.store(addr, ctx.regs.y)?;
            Ok(base)
        }
        OpKind::Stz => {
            let addr = ctx.effective_address(attr.mode)?;
            ctx.store(addr, 0)?;
            Ok(base)
        }

        // Arithmetic.
        OpKind::Adc => {
            let value = ctx.operand_value(attr.mode)?;
            if t_active {
                adc_memory(ctx, value, opcode, op_addr)?;
            } else {
                adc_accumulator(ctx.regs, value);
            }
            Ok(base)
        }
        OpKind::Sbc => {
            let value = ctx.operand_value(attr.mode)?;
            if t_active {
                sbc_memory(ctx, value, opcode, op_addr)?;
            } else {
                sbc_accumulator(ctx.regs, value);
            }
            Ok(base)
        }
        OpKind::Cmp => {
            let value = ctx.operand_value(attr.mode)?;
            let register = ctx.regs.a;
            compare(ctx.regs, register, value);
            Ok(base)
        }
        OpKind::Cpx => {
            let value = ctx.operand_value(attr.mode)?;
            let register = ctx.regs.x;
            compare(ctx.regs, register, value);
            Ok(base)
        }
        OpKind::Cpy => {
            let value = ctx.operand_value(attr.mode)?;
            let register = ctx.regs.y;
            compare(ctx.regs, register, value);
            Ok(base)
        }

        // Logical operations, with the T-flag redirect through the
        // implicit zero-page operand at $2000+X.
        OpKind::And => {
            let value = ctx.operand_value(attr.mode)?;
            logical(ctx, value, t_active, |a, b| a & b)?;
            Ok(base)
        }
        OpKind::Ora => {
            let value = ctx.operand_value(attr.mode)?;
            logical(ctx, value, t_active, |a, b| a | b)?;
            Ok(base)
        }
        OpKind::Eor => {
            let value = ctx.operand_value(attr.mode)?;
            logical(ctx, value, t_active, |a, b| a ^ b)?;
            Ok(base)
        }
        OpKind::Anc => {
            let value = ctx.operand_value(attr.mode)?;
            ctx.regs.a &= value;
            ctx.regs.status.set_zero_negative(ctx.regs.a);
            ctx.regs.status.carry = ctx.regs.a & 0x80 != 0;
            Ok(base)
        }

        // Bit tests.
        OpKind::Bit => {
            let value = ctx.operand_value(attr.mode)?;
            ctx.regs.status.zero = ctx.regs.a & value == 0;
            ctx.regs.status.negative = value & 0x80 != 0;
            ctx.regs.status.overflow = value & 0x40 != 0;
            Ok(base)
        }
        OpKind::Tst => {
            let mask = ctx.fetch_byte()?;
            let addr = match attr.mode {
                AddrMode::ImmZeroPage => zero_page_addr(ctx.fetch_byte()?),
                AddrMode::ImmZeroPageX => {
                    zero_page_addr(ctx.fetch_byte()?.wrapping_add(ctx.regs.x))
                }
                AddrMode::ImmAbsolute => ctx.fetch_word()?,
                _ => {
                    let base_addr = ctx.fetch_word()?;
                    base_addr.wrapping_add(ctx.regs.x as u16)
                }
            };
            let value = ctx.load(addr)?;
            ctx.regs.status.zero = mask & value == 0;
            ctx.regs.status.negative = value & 0x80 != 0;
            ctx.regs.status.overflow = value & 0x40 != 0;
            Ok(base)
        }
        OpKind::Tsb => {
            let addr = ctx.effective_address(attr.mode)?;
            let value = ctx.load(addr)?;
            ctx.regs.status.zero = ctx.regs.a & value == 0;
            ctx.store(addr, value | ctx.regs.a)?;
            Ok(base)
        }
        OpKind::Trb => {
            let addr = ctx.effective_address(attr.mode)?;
            let value = ctx.load(addr)?;
            ctx.regs.status.zero = ctx.regs.a & value == 0;
            ctx.store(addr, value & !ctx.regs.a)?;
            Ok(base)
        }

        // Shifts and rotates.
        OpKind::Asl => {
            if attr.mode == AddrMode::Accumulator {
                let (result, carry) = asl_value(ctx.regs.a);
                ctx.regs.a = result;
                ctx.regs.status.carry = carry;
                ctx.regs.status.set_zero_negative(result);
            } else {
                ctx.read_modify_write(attr.mode, |regs, value| {
                    let (result, carry) = asl_value(value);
                    regs.status.carry = carry;
                    regs.status.set_zero_negative(result);
                    result
                })?;
            }
            Ok(base)
        }
        OpKind::Lsr => {
            if attr.mode == AddrMode::Accumulator {
                let (result, carry) = lsr_value(ctx.regs.a);
                ctx.regs.a = result;
                ctx.regs.status.carry = carry;
                ctx.regs.status.set_zero_negative(result);
            } else {
                ctx.read_modify_write(attr.mode, |regs, value| {
                    let (result, carry) = lsr_value(value);
                    regs.status.carry = carry;
                    regs.status.set_zero_negative(result);
                    result
                })?;
            }
            Ok(base)
        }
        OpKind::Rol => {
            if attr.mode == AddrMode::Accumulator {
                let carry_in = ctx.regs.status.carry;
                let (result, carry) = rol_value(ctx.regs.a, carry_in);
                ctx.regs.a = result;
                ctx.regs.status.carry = carry;
                ctx.regs.status.set_zero_negative(result);
            } else {
                ctx.read_modify_write(attr.mode, |regs, value| {
                    let (result, carry) = rol_value(value, regs.status.carry);
                    regs.status.carry = carry;
                    regs.status.set_zero_negative(result);
                    result
                })?;
            }
            Ok(base)
        }
        OpKind::Ror => {
            if attr.mode == AddrMode::Accumulator {
                let carry_in = ctx.regs.status.carry;
                let (result, carry) = ror_value(ctx.regs.a, carry_in);
                ctx.regs.a = result;
                ctx.regs.status.carry = carry;
                ctx.regs.status.set_zero_negative(result);
            } else {
                ctx.read_modify_write(attr.mode, |regs, value| {
                    let (result, carry) = ror_value(value, regs.status.carry);
                    regs.status.carry = carry;
                    regs.status.set_zero_negative(result);
                    result
                })?;
            }
            Ok(base)
        }
        OpKind::Rra => {
            // Rotate-right memory, then add the rotated value to A.
            let addr = ctx.effective_address(attr.mode)?;
            let value = ctx.load(addr)?;
            let (rotated, carry) = ror_value(value, ctx.regs.status.carry);
            ctx.store(addr, rotated)?;
            ctx.regs.status.carry = carry;
            adc_accumulator(ctx.regs, rotated);
            Ok(base)
        }

        // Increment / decrement.
        OpKind::Inc => {
            if attr.mode == AddrMode::Accumulator {
                ctx.regs.a = ctx.regs.a.wrapping_add(1);
                ctx.regs.status.set_zero_negative(ctx.regs.a);
            } else {
                ctx.read_modify_write(attr.mode, |regs, value| {
                    let result = value.wrapping_add(1);
                    regs.status.set_zero_negative(result);
                    result
                })?;
            }
            Ok(base)
        }
        OpKind::Dec => {
            if attr.mode == AddrMode::Accumulator {
                ctx.regs.a = ctx.regs.a.wrapping_sub(1);
                ctx.regs.status.set_zero_negative(ctx.regs.a);
            } else {
                ctx.read_modify_write(attr.mode, |regs, value| {
                    let result = value.wrapping_sub(1);
                    regs.status.set_zero_negative(result);
                    result
                })?;
            }
            Ok(base)
        }
        OpKind::Inx => {
            ctx.regs.x = ctx.regs.x.wrapping_add(1);
            ctx.regs.status.set_zero_negative(ctx.regs.x);
            Ok(base)
        }
        OpKind::Iny => {
            ctx.regs.y = ctx.regs.y.wrapping_add(1);
            ctx.regs.status.set_zero_negative(ctx.regs.y);
            Ok(base)
        }
        OpKind::Dex => {
            ctx.regs.x = ctx.regs.x.wrapping_sub(1);
            ctx.regs.status.set_zero_negative(ctx.regs.x);
            Ok(base)
        }
        OpKind::Dey => {
            ctx.regs.y = ctx.regs.y.wrapping_sub(1);
            ctx.regs.status.set_zero_negative(ctx.regs.y);
            Ok(base)
        }

        // Branches.
        OpKind::Bpl => {
            let cond = !ctx.regs.status.negative;
            ctx.branch(cond, attr.cycles)
        }
        OpKind::Bmi => {
            let cond = ctx.regs.status.negative;
            ctx.branch(cond, attr.cycles)
        }
        OpKind::Bvc => {
            let cond = !ctx.regs.status.overflow;
            ctx.branch(cond, attr.cycles)
        }
        OpKind::Bvs => {
            let cond = ctx.regs.status.overflow;
            ctx.branch(cond, attr.cycles)
        }
        OpKind::Bcc => {
            let cond = !ctx.regs.status.carry;
            ctx.branch(cond, attr.cycles)
        }
        OpKind::Bcs => {
            let cond = ctx.regs.status.carry;
            ctx.branch(cond, attr.cycles)
        }
        OpKind::Bne => {
            let cond = !ctx.regs.status.zero;
            ctx.branch(cond, attr.cycles)
        }
        OpKind::Beq => {
            let cond = ctx.regs.status.zero;
            ctx.branch(cond, attr.cycles)
        }
        OpKind::Bra => ctx.branch(true, attr.cycles),
        OpKind::Bbr | OpKind::Bbs => {
            let bit = encoded_bit(opcode);
            let zp = ctx.fetch_byte()?;
            let value = ctx.load(zero_page_addr(zp))?;
            let bit_set = value & (1 << bit) != 0;
            let cond = if attr.kind == OpKind::Bbs {
                bit_set
            } else {
                !bit_set
            };
            ctx.branch(cond, attr.cycles)
        }

        // Bit set/reset on the zero page.
        OpKind::Rmb | OpKind::Smb => {
            let bit = encoded_bit(opcode);
            let addr = zero_page_addr(ctx.fetch_byte()?);
            let value = ctx.load(addr)?;
            let result = if attr.kind == OpKind::Smb {
                value | (1 << bit)
            } else {
                value & !(1 << bit)
            };
            ctx.store(addr, result)?;
            Ok(base)
        }

        // Stack operations.
        OpKind::Pha => {
            ctx.push(ctx.regs.a)?;
            Ok(base)
        }
        OpKind::Phx => {
            ctx.push(ctx.regs.x)?;
            Ok(base)
        }
        OpKind::Phy => {
            ctx.push(ctx.regs.y)?;
            Ok(base)
        }
        OpKind::Php => {
            // The pushed copy always reads with the break bit set.
            let mut pushed = ctx.regs.status;
            pushed.brk = true;
            ctx.push(pushed.to_byte())?;
            Ok(base)
        }
        OpKind::Pla => {
            let value = ctx.pop()?;
            ctx.regs.a = value;
            ctx.regs.status.set_zero_negative(value);
            Ok(base)
        }
        OpKind::Plx => {
            let value = ctx.pop()?;
            ctx.regs.x = value;
            ctx.regs.status.set_zero_negative(value);
            Ok(base)
        }
        OpKind::Ply => {
            let value = ctx.pop()?;
            ctx.regs.y = value;
            ctx.regs.status.set_zero_negative(value);
            Ok(base)
        }
        OpKind::Plp => {
            let value = ctx.pop()?;
            ctx.regs.status = Status::from_byte(value);
            Ok(base)
        }

        // Subroutines and returns.
        OpKind::Jsr => {
            let target = ctx.fetch_word()?;
            let return_addr = ctx.regs.pc.wrapping_sub(1);
            ctx.push((return_addr >> 8) as u8)?;
            ctx.push(return_addr as u8)?;
            ctx.regs.pc = target;
            Ok(base)
        }
        OpKind::Bsr => {
            let offset = ctx.fetch_byte()? as i8;
            let return_addr = ctx.regs.pc.wrapping_sub(1);
            ctx.push((return_addr >> 8) as u8)?;
            ctx.push(return_addr as u8)?;
            ctx.regs.pc = ctx.regs.pc.wrapping_add(offset as u16);
            Ok(base)
        }
        OpKind::Rts => {
            let lo = ctx.pop()? as u16;
            let hi = ctx.pop()? as u16;
            ctx.regs.pc = ((hi << 8) | lo).wrapping_add(1);
            Ok(base)
        }
        OpKind::Rti => {
            // The full saved byte comes back, T flag included, so an
            // interrupted instruction stream resumes exactly where its
            // flags left off.
            let status = ctx.pop()?;
            ctx.regs.status = Status::from_byte(status);
            let lo = ctx.pop()? as u16;
            let hi = ctx.pop()? as u16;
            ctx.regs.pc = (hi << 8) | lo;
            ctx.regs.irq_depth = ctx.regs.irq_depth.saturating_sub(1);
            ctx.regs.waiting = false;
            ctx.regs.halted = false;
            Ok(base)
        }
        OpKind::Brk => {
            // BRK consumes a padding byte.
            ctx.regs.pc = ctx.regs.pc.wrapping_add(1);
            let vector_slot = crate::irq::IrqSource::Irq2.vector();
            let vector = ctx.mmu.load_u16(vector_slot)?;
            if !vector_initialized(vector) {
                // No BRK handler installed: bare test programs end here.
                ctx.regs.halted = true;
                return Ok(base);
            }
            interrupt_entry(ctx, vector_slot, true)?;
            Ok(base)
        }

        // Jumps.
        OpKind::Jmp => {
            let target = match attr.mode {
                AddrMode::Absolute => ctx.fetch_word()?,
                AddrMode::Indirect => {
                    let ptr = ctx.fetch_word()?;
                    let lo = ctx.load(ptr)? as u16;
                    let hi = ctx.load(ptr.wrapping_add(1))? as u16;
                    (hi << 8) | lo
                }
                _ => {
                    let base_ptr = ctx.fetch_word()?;
                    let ptr = base_ptr.wrapping_add(ctx.regs.x as u16);
                    let lo = ctx.load(ptr)? as u16;
                    let hi = ctx.load(ptr.wrapping_add(1))? as u16;
                    (hi << 8) | lo
                }
            };
            ctx.regs.pc = target;
            Ok(base)
        }

        // Flag operations.
        OpKind::Clc => {
            ctx.regs.status.carry = false;
            Ok(base)
        }
        OpKind::Sec => {
            ctx.regs.status.carry = true;
            Ok(base)
        }
        OpKind::Cli => {
            ctx.regs.status.irq_disable = false;
            Ok(base)
        }
        OpKind::Sei => {
            ctx.regs.status.irq_disable = true;
            Ok(base)
        }
        OpKind::Clv => {
            ctx.regs.status.overflow = false;
            Ok(base)
        }
        OpKind::Cld => {
            ctx.regs.status.decimal = false;
            Ok(base)
        }
        OpKind::Sed => {
            ctx.regs.status.decimal = true;
            Ok(base)
        }
        OpKind::Set => {
            ctx.regs.status.memory_op = true;
            Ok(base)
        }

        // Register transfers, swaps and clears.
        OpKind::Tax => {
            ctx.regs.x = ctx.regs.a;
            ctx.regs.status.set_zero_negative(ctx.regs.x);
            Ok(base)
        }
        OpKind::Tay => {
            ctx.regs.y = ctx.regs.a;
            ctx.regs.status.set_zero_negative(ctx.regs.y);
            Ok(base)
        }
        OpKind::Txa => {
            ctx.regs.a = ctx.regs.x;
            ctx.regs.status.set_zero_negative(ctx.regs.a);
            Ok(base)
        }
        OpKind::Tya => {
            ctx.regs.a = ctx.regs.y;
            ctx.regs.status.set_zero_negative(ctx.regs.a);
            Ok(base)
        }
        OpKind::Tsx => {
            ctx.regs.x = ctx.regs.sp;
            ctx.regs.status.set_zero_negative(ctx.regs.x);
            Ok(base)
        }
        OpKind::Txs => {
            ctx.regs.sp = ctx.regs.x;
            Ok(base)
        }
        OpKind::Sax => {
            std::mem::swap(&mut ctx.regs.a, &mut ctx.regs.x);
            Ok(base)
        }
        OpKind::Say => {
            std::mem::swap(&mut ctx.regs.a, &mut ctx.regs.y);
            Ok(base)
        }
        OpKind::Sxy => {
            std::mem::swap(&mut ctx.regs.x, &mut ctx.regs.y);
            Ok(base)
        }
        OpKind::Cla => {
            ctx.regs.a = 0;
            Ok(base)
        }
        OpKind::Clx => {
            ctx.regs.x = 0;
            Ok(base)
        }
        OpKind::Cly => {
            ctx.regs.y = 0;
            Ok(base)
        }

        // Bank-select transfers.
        OpKind::Tam => {
            let mask = ctx.fetch_byte()?;
            let index = bank_index(mask, opcode, op_addr)?;
            ctx.mmu.set_mpr(index, ctx.regs.a);
            Ok(base)
        }
        OpKind::Tma => {
            let mask = ctx.fetch_byte()?;
            let index = bank_index(mask, opcode, op_addr)?;
            ctx.regs.a = ctx.mmu.mpr(index);
            Ok(base)
        }

        // VDC write ports.
        OpKind::St0 | OpKind::St1 | OpKind::St2 => {
            let value = ctx.fetch_byte()?;
            let port = match attr.kind {
                OpKind::St0 => 0,
                OpKind::St1 => 1,
                _ => 2,
            };
            ctx.mmu.store_st_port(port, value)?;
            Ok(base)
        }

        // Block transfers: consume the six-byte operand block, save the
        // working registers the way the hardware does, and leave the copy
        // itself to the step loop so interrupts stay serviceable.
        OpKind::Tii | OpKind::Tdd | OpKind::Tin | OpKind::Tia | OpKind::Tai => {
            let mode = match attr.kind {
                OpKind::Tii => BlockMode::Tii,
                OpKind::Tdd => BlockMode::Tdd,
                OpKind::Tin => BlockMode::Tin,
                OpKind::Tia => BlockMode::Tia,
                _ => BlockMode::Tai,
            };
            let source = ctx.fetch_word()?;
            let dest = ctx.fetch_word()?;
            let length_raw = ctx.fetch_word()?;
            let length = if length_raw == 0 {
                0x1_0000
            } else {
                length_raw as u32
            };
            ctx.push(ctx.regs.a)?;
            ctx.push(ctx.regs.x)?;
            ctx.push(ctx.regs.y)?;
            let depth = ctx.regs.irq_depth;
            ctx.regs.transfers.push(BlockTransfer {
                mode,
                source,
                dest,
                remaining: length,
                alternate: 0,
                depth,
            });
            Ok(base)
        }

        // Clock-speed controls.
        OpKind::Csl => {
            ctx.regs.high_speed = false;
            Ok(base)
        }
        OpKind::Csh => {
            ctx.regs.high_speed = true;
            Ok(base)
        }

        OpKind::Wai => {
            ctx.regs.waiting = true;
            Ok(base)
        }
        OpKind::Stp => {
            ctx.regs.halted = true;
            Ok(base)
        }
        OpKind::Nop => Ok(base),
    }
}

/// Convert a TAM/TMA mask into a mapping-register index.  Exactly one bit
/// must be set; anything else signals a corrupted image or misuse.
fn bank_index(mask: u8, opcode: u8, addr: u16) -> Result<usize, CoreError> {
    if mask == 0 || !mask.is_power_of_two() {
        return Err(CoreError::InvalidBankSelector { mask, opcode, addr });
    }
    Ok(mask.trailing_zeros() as usize)
}

#[inline]
fn asl_value(value: u8) -> (u8, bool) {
    (value.wrapping_shl(1), value & 0x80 != 0)
}

#[inline]
fn lsr_value(value: u8) -> (u8, bool) {
    (value >> 1, value & 0x01 != 0)
}

#[inline]
fn rol_value(value: u8, carry_in: bool) -> (u8, bool) {
    ((value << 1) | carry_in as u8, value & 0x80 != 0)
}

#[inline]
fn ror_value(value: u8, carry_in: bool) -> (u8, bool) {
    ((value >> 1) | ((carry_in as u8) << 7), value & 0x01 != 0)
}

fn compare(regs: &mut Registers, register: u8, value: u8) {
    let result = register.wrapping_sub(value);
    regs.status.carry = register >= value;
    regs.status.set_zero_negative(result);
}

fn adc_accumulator(regs: &mut Registers, value: u8) {
    let carry = regs.status.carry as u16;
    let binary_sum = regs.a as u16 + value as u16 + carry;
    let binary_result = binary_sum as u8;

    regs.status.overflow = (!(regs.a ^ value) & (regs.a ^ binary_result) & 0x80) != 0;
    if regs.status.decimal {
        let mut bcd_sum = binary_sum;
        if (regs.a & 0x0F) as u16 + (value & 0x0F) as u16 + carry > 9 {
            bcd_sum = bcd_sum.wrapping_add(0x06);
        }
        regs.status.carry = bcd_sum > 0x99;
        if bcd_sum > 0x99 {
            bcd_sum = bcd_sum.wrapping_add(0x60);
        }
        regs.a = bcd_sum as u8;
    } else {
        regs.status.carry = binary_sum > 0xFF;
        regs.a = binary_result;
    }
    regs.status.set_zero_negative(regs.a);
}

fn sbc_accumulator(regs: &mut Registers, value: u8) {
    let carry = regs.status.carry as u16;
    let subtrahend = value as u16 + (1 - carry);
    let minuend = regs.a as u16;
    let result = minuend.wrapping_sub(subtrahend);
    let binary_result = result as u8;

    regs.status.overflow = ((regs.a ^ binary_result) & (regs.a ^ value) & 0x80) != 0;
    regs.status.carry = minuend >= subtrahend;
    if regs.status.decimal {
        let borrow = (1 - carry) as i16;
        let mut low = (regs.a & 0x0F) as i16 - (value & 0x0F) as i16 - borrow;
        let mut high = (regs.a >> 4) as i16 - (value >> 4) as i16;
        if low < 0 {
            low -= 6;
            high -= 1;
        }
        if high < 0 {
            high -= 6;
        }
        regs.a = (((high << 4) & 0xF0) | (low & 0x0F)) as u8;
    } else {
        regs.a = binary_result;
    }
    regs.status.set_zero_negative(regs.a);
}

/// T-flag variant of AND/ORA/EOR: read-modify-write on the implicit
/// zero-page operand at $2000+X, accumulator untouched.
fn logical(
    ctx: &mut ExecCtx<'_>,
    value: u8,
    t_active: bool,
    apply: impl FnOnce(u8, u8) -> u8,
) -> Result<(), CoreError> {
    if t_active {
        let addr = zero_page_addr(ctx.regs.x);
        let mem = ctx.load(addr)?;
        let result = apply(value, mem);
        ctx.store(addr, result)?;
        ctx.regs.status.set_zero_negative(result);
    } else {
        let result = apply(ctx.regs.a, value);
        ctx.regs.a = result;
        ctx.regs.status.set_zero_negative(result);
    }
    Ok(())
}

/// T-flag ADC: memory at $2000+X plus operand plus carry, written back to
/// memory.  Decimal mode combined with this redirect is the one addressing
/// variant left unimplemented; it fails fast rather than producing a
/// silently wrong sum.
fn adc_memory(ctx: &mut ExecCtx<'_>, value: u8, opcode: u8, op_addr: u16) -> Result<(), CoreError> {
    if ctx.regs.status.decimal {
        return Err(CoreError::UnimplementedAddressingVariant {
            opcode,
            addr: op_addr,
        });
    }
    let addr = zero_page_addr(ctx.regs.x);
    let mem = ctx.load(addr)?;
    let carry = ctx.regs.status.carry as u16;
    let sum = value as u16 + mem as u16 + carry;
    let result = sum as u8;
    ctx.regs.status.carry = sum > 0xFF;
    ctx.regs.status.overflow = (!(value ^ mem) & (value ^ result) & 0x80) != 0;
    ctx.store(addr, result)?;
    ctx.regs.status.set_zero_negative(result);
    Ok(())
}

fn sbc_memory(ctx: &mut ExecCtx<'_>, value: u8, opcode: u8, op_addr: u16) -> Result<(), CoreError> {
    if ctx.regs.status.decimal {
        return Err(CoreError::UnimplementedAddressingVariant {
            opcode,
            addr: op_addr,
        });
    }
    let addr = zero_page_addr(ctx.regs.x);
    let mem = ctx.load(addr)?;
    let carry = ctx.regs.status.carry as u16;
    let subtrahend = value as u16 + (1 - carry);
    let minuend = mem as u16;
    let result = minuend.wrapping_sub(subtrahend);
    let result_byte = result as u8;
    ctx.regs.status.carry = minuend >= subtrahend;
    ctx.regs.status.overflow = ((mem ^ result_byte) & (mem ^ value) & 0x80) != 0;
    ctx.store(addr, result_byte)?;
    ctx.regs.status.set_zero_negative(result_byte);
    Ok(())
}
