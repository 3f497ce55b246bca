//! Declarative opcode catalogue.
//!
//! One table entry per assigned opcode byte: mnemonic, addressing-mode
//! tag, semantic effect and base cycle cost.  The execute path
//! (`cpu::exec`) and the describe path (`cpu::disasm`) are two independent
//! consumers of this table, so the opcode-to-semantics mapping is written
//! down exactly once.  Unassigned encodings stay `None` and fault at
//! dispatch time.
//!
//! Cycle costs are the chip's fixed per-form timings; there are no
//! page-crossing penalties anywhere in the matrix.  Branch entries carry
//! the not-taken base; taken branches add two cycles in the handler.

/// Addressing-mode tag.  Determines operand length and, for the execute
/// path, how the effective address is formed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddrMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// JMP ($hhll)
    Indirect,
    /// JMP ($hhll,X)
    AbsIndirectX,
    ZpIndirect,
    ZpIndirectX,
    ZpIndirectY,
    Relative,
    /// BBRi/BBSi: zero-page operand plus relative offset.
    ZpRelative,
    /// TST #imm with a zero-page / absolute second operand.
    ImmZeroPage,
    ImmZeroPageX,
    ImmAbsolute,
    ImmAbsoluteX,
    /// Six-byte source/destination/length operand block.
    Block,
}

impl AddrMode {
    /// Operand bytes following the opcode.
    pub const fn operand_len(self) -> u8 {
        match self {
            AddrMode::Implied | AddrMode::Accumulator => 0,
            AddrMode::Immediate
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::ZpIndirect
            | AddrMode::ZpIndirectX
            | AddrMode::ZpIndirectY
            | AddrMode::Relative => 1,
            AddrMode::Absolute
            | AddrMode::AbsoluteX
            | AddrMode::AbsoluteY
            | AddrMode::Indirect
            | AddrMode::AbsIndirectX
            | AddrMode::ZpRelative
            | AddrMode::ImmZeroPage
            | AddrMode::ImmZeroPageX => 2,
            AddrMode::ImmAbsolute | AddrMode::ImmAbsoluteX => 3,
            AddrMode::Block => 6,
        }
    }
}

/// Semantic effect of an opcode.  Bit-indexed families (RMB/SMB/BBR/BBS)
/// share one kind each; the bit number is encoded in the opcode byte
/// itself and extracted by the handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    Adc,
    Anc,
    And,
    Asl,
    Bbr,
    Bbs,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Bra,
    Brk,
    Bsr,
    Bvc,
    Bvs,
    Cla,
    Clc,
    Cld,
    Cli,
    Clv,
    Clx,
    Cly,
    Cmp,
    Cpx,
    Cpy,
    Csh,
    Csl,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Phx,
    Phy,
    Pla,
    Plp,
    Plx,
    Ply,
    Rmb,
    Rol,
    Ror,
    Rra,
    Rti,
    Rts,
    Sax,
    Say,
    Sbc,
    Sec,
    Sed,
    Sei,
    Set,
    Smb,
    St0,
    St1,
    St2,
    Sta,
    Stp,
    Stx,
    Sty,
    Stz,
    Sxy,
    Tam,
    Tax,
    Tay,
    Tdd,
    Tia,
    Tii,
    Tin,
    Tai,
    Tma,
    Trb,
    Tsb,
    Tst,
    Tsx,
    Txa,
    Txs,
    Tya,
    Wai,
}

/// One catalogue entry.
#[derive(Clone, Copy, Debug)]
pub struct OpAttr {
    pub mnemonic: &'static str,
    pub kind: OpKind,
    pub mode: AddrMode,
    pub cycles: u8,
}

impl OpAttr {
    /// Total instruction length in bytes.
    pub const fn len(&self) -> u8 {
        1 + self.mode.operand_len()
    }
}

const fn op(mnemonic: &'static str, kind: OpKind, mode: AddrMode, cycles: u8) -> Option<OpAttr> {
    Some(OpAttr {
        mnemonic,
        kind,
        mode,
        cycles,
    })
}

pub static OPCODES: [Option<OpAttr>; 256] = build_table();

#[rustfmt::skip]
const fn build_table() -> [Option<OpAttr>; 256] {
    use AddrMode::*;
    use OpKind as K;

    let mut t: [Option<OpAttr>; 256] = [None; 256];

    t[0x00] = op("BRK", K::Brk, Implied, 8);
    t[0x01] = op("ORA", K::Ora, ZpIndirectX, 7);
    t[0x02] = op("SXY", K::Sxy, Implied, 3);
    t[0x03] = op("ST0", K::St0, Immediate, 5);
    t[0x04] = op("TSB", K::Tsb, ZeroPage, 6);
    t[0x05] = op("ORA", K::Ora, ZeroPage, 4);
    t[0x06] = op("ASL", K::Asl, ZeroPage, 6);
    t[0x07] = op("RMB0", K::Rmb, ZeroPage, 7);
    t[0x08] = op("PHP", K::Php, Implied, 3);
    t[0x09] = op("ORA", K::Ora, Immediate, 2);
    t[0x0A] = op("ASL", K::Asl, Accumulator, 2);
    t[0x0B] = op("ANC", K::Anc, Immediate, 2);
    t[0x0C] = op("TSB", K::Tsb, Absolute, 6);
    t[0x0D] = op("ORA", K::Ora, Absolute, 5);
    t[0x0E] = op("ASL", K::Asl, Absolute, 6);
    t[0x0F] = op("BBR0", K::Bbr, ZpRelative, 6);
    t[0x10] = op("BPL", K::Bpl, Relative, 2);
    t[0x11] = op("ORA", K::Ora, ZpIndirectY, 7);
    t[0x12] = op("ORA", K::Ora, ZpIndirect, 7);
    t[0x13] = op("ST1", K::St1, Immediate, 5);
    t[0x14] = op("TRB", K::Trb, ZeroPage, 6);
    t[0x15] = op("ORA", K::Ora, ZeroPageX, 4);
    t[0x16] = op("ASL", K::Asl, ZeroPageX, 6);
    t[0x17] = op("RMB1", K::Rmb, ZeroPage, 7);
    t[0x18] = op("CLC", K::Clc, Implied, 2);
    t[0x19] = op("ORA", K::Ora, AbsoluteY, 5);
    t[0x1A] = op("INC", K::Inc, Accumulator, 2);
    t[0x1C] = op("TRB", K::Trb, Absolute, 6);
    t[0x1D] = op("ORA", K::Ora, AbsoluteX, 5);
    t[0x1E] = op("ASL", K::Asl, AbsoluteX, 7);
    t[0x1F] = op("BBR1", K::Bbr, ZpRelative, 6);
    t[0x20] = op("JSR", K::Jsr, Absolute, 7);
    t[0x21] = op("AND", K::And, ZpIndirectX, 7);
    t[0x22] = op("SAX", K::Sax, Implied, 3);
    t[0x23] = op("ST2", K::St2, Immediate, 5);
    t[0x24] = op("BIT", K::Bit, ZeroPage, 4);
    t[0x25] = op("AND", K::And, ZeroPage, 4);
    t[0x26] = op("ROL", K::Rol, ZeroPage, 6);
    t[0x27] = op("RMB2", K::Rmb, ZeroPage, 7);
    t[0x28] = op("PLP", K::Plp, Implied, 4);
    t[0x29] = op("AND", K::And, Immediate, 2);
    t[0x2A] = op("ROL", K::Rol, Accumulator, 2);
    t[0x2B] = op("ANC", K::Anc, Immediate, 2);
    t[0x2C] = op("BIT", K::Bit, Absolute, 5);
    t[0x2D] = op("AND", K::And, Absolute, 5);
    t[0x2E] = op("ROL", K::Rol, Absolute, 6);
    t[0x2F] = op("BBR2", K::Bbr, ZpRelative, 6);
    t[0x30] = op("BMI", K::Bmi, Relative, 2);
    t[0x31] = op("AND", K::And, ZpIndirectY, 7);
    t[0x32] = op("AND", K::And, ZpIndirect, 7);
    t[0x34] = op("BIT", K::Bit, ZeroPageX, 4);
    t[0x35] = op("AND", K::And, ZeroPageX, 4);
    t[0x36] = op("ROL", K::Rol, ZeroPageX, 6);
    t[0x37] = op("RMB3", K::Rmb, ZeroPage, 7);
    t[0x38] = op("SEC", K::Sec, Implied, 2);
    t[0x39] = op("AND", K::And, AbsoluteY, 5);
    t[0x3A] = op("DEC", K::Dec, Accumulator, 2);
    t[0x3C] = op("BIT", K::Bit, AbsoluteX, 5);
    t[0x3D] = op("AND", K::And, AbsoluteX, 5);
    t[0x3E] = op("ROL", K::Rol, AbsoluteX, 7);
    t[0x3F] = op("BBR3", K::Bbr, ZpRelative, 6);
    t[0x40] = op("RTI", K::Rti, Implied, 7);
    t[0x41] = op("EOR", K::Eor, ZpIndirectX, 7);
    t[0x42] = op("SAY", K::Say, Implied, 3);
    t[0x43] = op("TMA", K::Tma, Immediate, 4);
    t[0x44] = op("BSR", K::Bsr, Relative, 8);
    t[0x45] = op("EOR", K::Eor, ZeroPage, 4);
    t[0x46] = op("LSR", K::Lsr, ZeroPage, 6);
    t[0x47] = op("RMB4", K::Rmb, ZeroPage, 7);
    t[0x48] = op("PHA", K::Pha, Implied, 3);
    t[0x49] = op("EOR", K::Eor, Immediate, 2);
    t[0x4A] = op("LSR", K::Lsr, Accumulator, 2);
    t[0x4C] = op("JMP", K::Jmp, Absolute, 4);
    t[0x4D] = op("EOR", K::Eor, Absolute, 5);
    t[0x4E] = op("LSR", K::Lsr, Absolute, 6);
    t[0x4F] = op("BBR4", K::Bbr, ZpRelative, 6);
    t[0x50] = op("BVC", K::Bvc, Relative, 2);
    t[0x51] = op("EOR", K::Eor, ZpIndirectY, 7);
    t[0x52] = op("EOR", K::Eor, ZpIndirect, 7);
    t[0x53] = op("TAM", K::Tam, Immediate, 5);
    t[0x54] = op("CSL", K::Csl, Implied, 3);
    t[0x55] = op("EOR", K::Eor, ZeroPageX, 4);
    t[0x56] = op("LSR", K::Lsr, ZeroPageX, 6);
    t[0x57] = op("RMB5", K::Rmb, ZeroPage, 7);
    t[0x58] = op("CLI", K::Cli, Implied, 2);
    t[0x59] = op("EOR", K::Eor, AbsoluteY, 5);
    t[0x5A] = op("PHY", K::Phy, Implied, 3);
    t[0x5D] = op("EOR", K::Eor, AbsoluteX, 5);
    t[0x5E] = op("LSR", K::Lsr, AbsoluteX, 7);
    t[0x5F] = op("BBR5", K::Bbr, ZpRelative, 6);
    t[0x60] = op("RTS", K::Rts, Implied, 7);
    t[0x61] = op("ADC", K::Adc, ZpIndirectX, 7);
    t[0x62] = op("CLA", K::Cla, Implied, 2);
    t[0x64] = op("STZ", K::Stz, ZeroPage, 4);
    t[0x65] = op("ADC", K::Adc, ZeroPage, 4);
    t[0x66] = op("ROR", K::Ror, ZeroPage, 6);
    t[0x67] = op("RMB6", K::Rmb, ZeroPage, 7);
    t[0x68] = op("PLA", K::Pla, Implied, 4);
    t[0x69] = op("ADC", K::Adc, Immediate, 2);
    t[0x6A] = op("ROR", K::Ror, Accumulator, 2);
    t[0x6C] = op("JMP", K::Jmp, Indirect, 7);
    t[0x6D] = op("ADC", K::Adc, Absolute, 5);
    t[0x6E] = op("ROR", K::Ror, Absolute, 6);
    t[0x6F] = op("BBR6", K::Bbr, ZpRelative, 6);
    t[0x70] = op("BVS", K::Bvs, Relative, 2);
    t[0x71] = op("ADC", K::Adc, ZpIndirectY, 7);
    t[0x72] = op("ADC", K::Adc, ZpIndirect, 7);
    t[0x73] = op("TII", K::Tii, Block, 17);
    t[0x74] = op("STZ", K::Stz, ZeroPageX, 4);
    t[0x75] = op("ADC", K::Adc, ZeroPageX, 4);
    t[0x76] = op("ROR", K::Ror, ZeroPageX, 6);
    t[0x77] = op("RMB7", K::Rmb, ZeroPage, 7);
    t[0x78] = op("SEI", K::Sei, Implied, 2);
    t[0x79] = op("ADC", K::Adc, AbsoluteY, 5);
    t[0x7A] = op("PLY", K::Ply, Implied, 4);
    t[0x7B] = op("RRA", K::Rra, AbsoluteY, 8);
    t[0x7C] = op("JMP", K::Jmp, AbsIndirectX, 7);
    t[0x7D] = op("ADC", K::Adc, AbsoluteX, 5);
    t[0x7E] = op("ROR", K::Ror, AbsoluteX, 7);
    t[0x7F] = op("BBR7", K::Bbr, ZpRelative, 6);
    t[0x80] = op("BRA", K::Bra, Relative, 2);
    t[0x81] = op("STA", K::Sta, ZpIndirectX, 7);
    t[0x82] = op("CLX", K::Clx, Implied, 2);
    t[0x83] = op("TST", K::Tst, ImmZeroPage, 8);
    t[0x84] = op("STY", K::Sty, ZeroPage, 4);
    t[0x85] = op("STA", K::Sta, ZeroPage, 4);
    t[0x86] = op("STX", K::Stx, ZeroPage, 4);
    t[0x87] = op("SMB0", K::Smb, ZeroPage, 7);
    t[0x88] = op("DEY", K::Dey, Implied, 2);
    t[0x89] = op("BIT", K::Bit, Immediate, 2);
    t[0x8A] = op("TXA", K::Txa, Implied, 2);
    t[0x8C] = op("STY", K::Sty, Absolute, 5);
    t[0x8D] = op("STA", K::Sta, Absolute, 5);
    t[0x8E] = op("STX", K::Stx, Absolute, 5);
    t[0x8F] = op("BBS0", K::Bbs, ZpRelative, 6);
    t[0x90] = op("BCC", K::Bcc, Relative, 2);
    t[0x91] = op("STA", K::Sta, ZpIndirectY, 7);
    t[0x92] = op("STA", K::Sta, ZpIndirect, 7);
    t[0x93] = op("TST", K::Tst, ImmAbsolute, 8);
    t[0x94] = op("STY", K::Sty, ZeroPageX, 4);
    t[0x95] = op("STA", K::Sta, ZeroPageX, 4);
    t[0x96] = op("STX", K::Stx, ZeroPageY, 4);
    t[0x97] = op("SMB1", K::Smb, ZeroPage, 7);
    t[0x98] = op("TYA", K::Tya, Implied, 2);
    t[0x99] = op("STA", K::Sta, AbsoluteY, 5);
    t[0x9A] = op("TXS", K::Txs, Implied, 2);
    t[0x9C] = op("STZ", K::Stz, Absolute, 5);
    t[0x9D] = op("STA", K::Sta, AbsoluteX, 5);
    t[0x9E] = op("STZ", K::Stz, AbsoluteX, 5);
    t[0x9F] = op("BBS1", K::Bbs, ZpRelative, 6);
    t[0xA0] = op("LDY", K::Ldy, Immediate, 2);
    t[0xA1] = op("LDA", K::Lda, ZpIndirectX, 7);
    t[0xA2] = op("LDX", K::Ldx, Immediate, 2);
    t[0xA3] = op("TST", K::Tst, ImmZeroPageX, 8);
    t[0xA4] = op("LDY", K::Ldy, ZeroPage, 4);
    t[0xA5] = op("LDA", K::Lda, ZeroPage, 4);
    t[0xA6] = op("LDX", K::Ldx, ZeroPage, 4);
    t[0xA7] = op("SMB2", K::Smb, ZeroPage, 7);
    t[0xA8] = op("TAY", K::Tay, Implied, 2);
    t[0xA9] = op("LDA", K::Lda, Immediate, 2);
    t[0xAA] = op("TAX", K::Tax, Implied, 2);
    t[0xAC] = op("LDY", K::Ldy, Absolute, 5);
    t[0xAD] = op("LDA", K::Lda, Absolute, 5);
    t[0xAE] = op("LDX", K::Ldx, Absolute, 5);
    t[0xAF] = op("BBS2", K::Bbs, ZpRelative, 6);
    t[0xB0] = op("BCS", K::Bcs, Relative, 2);
    t[0xB1] = op("LDA", K::Lda, ZpIndirectY, 7);
    t[0xB2] = op("LDA", K::Lda, ZpIndirect, 7);
    t[0xB3] = op("TST", K::Tst, ImmAbsoluteX, 8);
    t[0xB4] = op("LDY", K::Ldy, ZeroPageX, 4);
    t[0xB5] = op("LDA", K::Lda, ZeroPageX, 4);
    t[0xB6] = op("LDX", K::Ldx, ZeroPageY, 4);
    t[0xB7] = op("SMB3", K::Smb, ZeroPage, 7);
    t[0xB8] = op("CLV", K::Clv, Implied, 2);
    t[0xB9] = op("LDA", K::Lda, AbsoluteY, 5);
    t[0xBA] = op("TSX", K::Tsx, Implied, 2);
    t[0xBC] = op("LDY", K::Ldy, AbsoluteX, 5);
    t[0xBD] = op("LDA", K::Lda, AbsoluteX, 5);
    t[0xBE] = op("LDX", K::Ldx, AbsoluteY, 5);
    t[0xBF] = op("BBS3", K::Bbs, ZpRelative, 6);
    t[0xC0] = op("CPY", K::Cpy, Immediate, 2);
    t[0xC1] = op("CMP", K::Cmp, ZpIndirectX, 7);
    t[0xC2] = op("CLY", K::Cly, Implied, 2);
    t[0xC3] = op("TDD", K::Tdd, Block, 17);
    t[0xC4] = op("CPY", K::Cpy, ZeroPage, 4);
    t[0xC5] = op("CMP", K::Cmp, ZeroPage, 4);
    t[0xC6] = op("DEC", K::Dec, ZeroPage, 6);
    t[0xC7] = op("SMB4", K::Smb, ZeroPage, 7);
    t[0xC8] = op("INY", K::Iny, Implied, 2);
    t[0xC9] = op("CMP", K::Cmp, Immediate, 2);
    t[0xCA] = op("DEX", K::Dex, Implied, 2);
    t[0xCB] = op("WAI", K::Wai, Implied, 3);
    t[0xCC] = op("CPY", K::Cpy, Absolute, 5);
    t[0xCD] = op("CMP", K::Cmp, Absolute, 5);
    t[0xCE] = op("DEC", K::Dec, Absolute, 6);
    t[0xCF] = op("BBS4", K::Bbs, ZpRelative, 6);
    t[0xD0] = op("BNE", K::Bne, Relative, 2);
    t[0xD1] = op("CMP", K::Cmp, ZpIndirectY, 7);
    t[0xD2] = op("CMP", K::Cmp, ZpIndirect, 7);
    t[0xD3] = op("TIN", K::Tin, Block, 17);
    t[0xD4] = op("CSH", K::Csh, Implied, 3);
    t[0xD5] = op("CMP", K::Cmp, ZeroPageX, 4);
    t[0xD6] = op("DEC", K::Dec, ZeroPageX, 6);
    t[0xD7] = op("SMB5", K::Smb, ZeroPage, 7);
    t[0xD8] = op("CLD", K::Cld, Implied, 2);
    t[0xD9] = op("CMP", K::Cmp, AbsoluteY, 5);
    t[0xDA] = op("PHX", K::Phx, Implied, 3);
    t[0xDB] = op("STP", K::Stp, Implied, 3);
    t[0xDD] = op("CMP", K::Cmp, AbsoluteX, 5);
    t[0xDE] = op("DEC", K::Dec, AbsoluteX, 7);
    t[0xDF] = op("BBS5", K::Bbs, ZpRelative, 6);
    t[0xE0] = op("CPX", K::Cpx, Immediate, 2);
    t[0xE1] = op("SBC", K::Sbc, ZpIndirectX, 7);
    t[0xE3] = op("TIA", K::Tia, Block, 17);
    t[0xE4] = op("CPX", K::Cpx, ZeroPage, 4);
    t[0xE5] = op("SBC", K::Sbc, ZeroPage, 4);
    t[0xE6] = op("INC", K::Inc, ZeroPage, 6);
    t[0xE7] = op("SMB6", K::Smb, ZeroPage, 7);
    t[0xE8] = op("INX", K::Inx, Implied, 2);
    t[0xE9] = op("SBC", K::Sbc, Immediate, 2);
    t[0xEA] = op("NOP", K::Nop, Implied, 2);
    t[0xEB] = op("SBC", K::Sbc, Immediate, 2);
    t[0xEC] = op("CPX", K::Cpx, Absolute, 5);
    t[0xED] = op("SBC", K::Sbc, Absolute, 5);
    t[0xEE] = op("INC", K::Inc, Absolute, 6);
    t[0xEF] = op("BBS6", K::Bbs, ZpRelative, 6);
    t[0xF0] = op("BEQ", K::Beq, Relative, 2);
    t[0xF1] = op("SBC", K::Sbc, ZpIndirectY, 7);
    t[0xF2] = op("SBC", K::Sbc, ZpIndirect, 7);
    t[0xF3] = op("TAI", K::Tai, Block, 17);
    t[0xF4] = op("SET", K::Set, Implied, 2);
    t[0xF5] = op("SBC", K::Sbc, ZeroPageX, 4);
    t[0xF6] = op("INC", K::Inc, ZeroPageX, 6);
    t[0xF7] = op("SMB7", K::Smb, ZeroPage, 7);
    t[0xF8] = op("SED", K::Sed, Implied, 2);
    t[0xF9] = op("SBC", K::Sbc, AbsoluteY, 5);
    t[0xFA] = op("PLX", K::Plx, Implied, 4);
    t[0xFD] = op("SBC", K::Sbc, AbsoluteX, 5);
    t[0xFE] = op("INC", K::Inc, AbsoluteX, 7);
    t[0xFF] = op("BBS7", K::Bbs, ZpRelative, 6);

    t
}

/// Bit number carried in the opcode byte of the RMB/SMB/BBR/BBS families.
#[inline]
pub const fn encoded_bit(opcode: u8) -> u8 {
    (opcode & 0x70) >> 4
}
