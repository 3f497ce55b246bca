//! Describe-side consumer of the opcode catalogue.
//!
//! Renders the instruction at an address as mnemonic plus operand text
//! using side-effect-free `peek` reads only, and reports its byte length
//! so a tracer can walk the instruction stream without executing it.

use crate::mmu::Mmu;

use super::opcodes::{AddrMode, OPCODES};

/// One decoded instruction, as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disasm {
    pub mnemonic: &'static str,
    pub text: String,
    /// Total instruction length in bytes, operand included.
    pub len: u8,
}

fn peek_word(mmu: &Mmu, addr: u16) -> u16 {
    let lo = mmu.peek(addr) as u16;
    let hi = mmu.peek(addr.wrapping_add(1)) as u16;
    (hi << 8) | lo
}

/// Branch targets are relative to the address just past the instruction.
fn relative_target(addr: u16, len: u8, offset: u8) -> u16 {
    addr.wrapping_add(len as u16).wrapping_add(offset as i8 as u16)
}

/// Decode the opcode at `addr`.  Returns `None` for an unassigned
/// encoding, mirroring the dispatch table's sentinel.
pub fn disassemble(mmu: &Mmu, addr: u16) -> Option<Disasm> {
    let opcode = mmu.peek(addr);
    let attr = OPCODES[opcode as usize].as_ref()?;
    let len = attr.len();
    let operand = addr.wrapping_add(1);

    let text = match attr.mode {
        AddrMode::Implied => attr.mnemonic.to_string(),
        AddrMode::Accumulator => format!("{} A", attr.mnemonic),
        AddrMode::Immediate => format!("{} #${:02X}", attr.mnemonic, mmu.peek(operand)),
        AddrMode::ZeroPage => format!("{} ${:02X}", attr.mnemonic, mmu.peek(operand)),
        AddrMode::ZeroPageX => format!("{} ${:02X},X", attr.mnemonic, mmu.peek(operand)),
        AddrMode::ZeroPageY => format!("{} ${:02X},Y", attr.mnemonic, mmu.peek(operand)),
        AddrMode::Absolute => format!("{} ${:04X}", attr.mnemonic, peek_word(mmu, operand)),
        AddrMode::AbsoluteX => format!("{} ${:04X},X", attr.mnemonic, peek_word(mmu, operand)),
        AddrMode::AbsoluteY => format!("{} ${:04X},Y", attr.mnemonic, peek_word(mmu, operand)),
        AddrMode::Indirect => format!("{} (${:04X})", attr.mnemonic, peek_word(mmu, operand)),
        AddrMode::AbsIndirectX => {
            format!("{} (${:04X},X)", attr.mnemonic, peek_word(mmu, operand))
        }
        AddrMode::ZpIndirect => format!("{} (${:02X})", attr.mnemonic, mmu.peek(operand)),
        AddrMode::ZpIndirectX => format!("{} (${:02X},X)", attr.mnemonic, mmu.peek(operand)),
        AddrMode::ZpIndirectY => format!("{} (${:02X}),Y", attr.mnemonic, mmu.peek(operand)),
        AddrMode::Relative => {
            let target = relative_target(addr, len, mmu.peek(operand));
            format!("{} ${:04X}", attr.mnemonic, target)
        }
        AddrMode::ZpRelative => {
            let zp = mmu.peek(operand);
            let target = relative_target(addr, len, mmu.peek(operand.wrapping_add(1)));
            format!("{} ${:02X},${:04X}", attr.mnemonic, zp, target)
        }
        AddrMode::ImmZeroPage => {
            let mask = mmu.peek(operand);
            let zp = mmu.peek(operand.wrapping_add(1));
            format!("{} #${:02X},${:02X}", attr.mnemonic, mask, zp)
        }
        AddrMode::ImmZeroPageX => {
            let mask = mmu.peek(operand);
            let zp = mmu.peek(operand.wrapping_add(1));
            format!("{} #${:02X},${:02X},X", attr.mnemonic, mask, zp)
        }
        AddrMode::ImmAbsolute => {
            let mask = mmu.peek(operand);
            let target = peek_word(mmu, operand.wrapping_add(1));
            format!("{} #${:02X},${:04X}", attr.mnemonic, mask, target)
        }
        AddrMode::ImmAbsoluteX => {
            let mask = mmu.peek(operand);
            let target = peek_word(mmu, operand.wrapping_add(1));
            format!("{} #${:02X},${:04X},X", attr.mnemonic, mask, target)
        }
        AddrMode::Block => {
            let source = peek_word(mmu, operand);
            let dest = peek_word(mmu, operand.wrapping_add(2));
            let length = peek_word(mmu, operand.wrapping_add(4));
            format!(
                "{} ${:04X},${:04X},${:04X}",
                attr.mnemonic, source, dest, length
            )
        }
    };

    Some(Disasm {
        mnemonic: attr.mnemonic,
        text,
        len,
    })
}
