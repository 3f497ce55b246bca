//! Register file, status flags and in-flight block-transfer state.

/// Processor status, one named field per flag.
///
/// The packed byte layout (bit 0 upward: C Z I D B T V N) only exists at
/// the pack/unpack boundary used by PHP/PLP, interrupt entry and RTI; all
/// flag tests and updates go through the named fields.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Status {
    pub carry: bool,
    pub zero: bool,
    pub irq_disable: bool,
    pub decimal: bool,
    pub brk: bool,
    /// Memory-operation (T) flag: the next instruction operates on the
    /// implicit zero-page location instead of the accumulator.
    pub memory_op: bool,
    pub overflow: bool,
    pub negative: bool,
}

impl Status {
    pub fn to_byte(self) -> u8 {
        let mut value = 0;
        if self.carry {
            value |= 0x01;
        }
        if self.zero {
            value |= 0x02;
        }
        if self.irq_disable {
            value |= 0x04;
        }
        if self.decimal {
            value |= 0x08;
        }
        if self.brk {
            value |= 0x10;
        }
        if self.memory_op {
            value |= 0x20;
        }
        if self.overflow {
            value |= 0x40;
        }
        if self.negative {
            value |= 0x80;
        }
        value
    }

    pub fn from_byte(value: u8) -> Self {
        Self {
            carry: value & 0x01 != 0,
            zero: value & 0x02 != 0,
            irq_disable: value & 0x04 != 0,
            decimal: value & 0x08 != 0,
            brk: value & 0x10 != 0,
            memory_op: value & 0x20 != 0,
            overflow: value & 0x40 != 0,
            negative: value & 0x80 != 0,
        }
    }

    #[inline]
    pub fn set_zero_negative(&mut self, value: u8) {
        self.zero = value == 0;
        self.negative = value & 0x80 != 0;
    }
}

/// Stepping rule applied to the source and destination pointers of a block
/// transfer, one variant per opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub enum BlockMode {
    /// Source and destination both increment.
    Tii,
    /// Source and destination both decrement.
    Tdd,
    /// Source increments, destination fixed.
    Tin,
    /// Source increments, destination alternates +0/+1.
    Tia,
    /// Source alternates +0/+1, destination increments.
    Tai,
}

/// Progress of an in-flight block transfer.
///
/// A transfer can span up to 65,536 bytes, so it lives here in
/// processor-owned state and is advanced one byte per step rather than run
/// as a single uninterruptible loop; interrupts taken mid-copy find the
/// progress intact when the handler returns.
#[derive(Clone, Copy, Debug, bincode::Encode, bincode::Decode)]
pub struct BlockTransfer {
    pub mode: BlockMode,
    pub source: u16,
    pub dest: u16,
    pub remaining: u32,
    /// Alternation phase for the Tia/Tai rules.
    pub alternate: u16,
    /// Interrupt-service depth at which the transfer was started; the
    /// transfer only advances once the processor is back at this depth.
    pub depth: u8,
}

#[derive(Clone, bincode::Encode, bincode::Decode)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: Status,
    /// CSL/CSH clock-mode bit; exposed so the host can derive bus timing.
    pub high_speed: bool,
    pub(crate) halted: bool,
    pub(crate) waiting: bool,
    /// Suspended and in-flight block transfers, innermost last.
    pub(crate) transfers: Vec<BlockTransfer>,
    /// Nesting depth of interrupt service, maintained by dispatch and RTI.
    pub(crate) irq_depth: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: Status {
                irq_disable: true,
                ..Status::default()
            },
            high_speed: false,
            halted: false,
            waiting: false,
            transfers: Vec::new(),
            irq_depth: 0,
        }
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn waiting(&self) -> bool {
        self.waiting
    }

    /// True while a block transfer still has bytes to move.
    pub fn transfer_in_progress(&self) -> bool {
        !self.transfers.is_empty()
    }
}
