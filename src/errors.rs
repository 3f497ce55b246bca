use thiserror::Error;

/// Fatal execution conditions.
///
/// The core trades graceful recovery for hardware fidelity: once any of
/// these occurs the machine state can no longer be trusted to match the
/// emulated chip, so execution stops and the condition is surfaced to the
/// host with enough context to locate the offending code in the ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The dispatch table has no handler for the fetched byte.  `addr` is
    /// the address the opcode was fetched from (post-fetch PC minus one).
    #[error("unimplemented opcode {opcode:#04X} at {addr:#06X}")]
    UnimplementedOpcode { opcode: u8, addr: u16 },

    /// A bank-select transfer (TAM/TMA) was given a mask that is zero or
    /// has more than one bit set.  This signals a corrupted program image
    /// or opcode misuse and is never silently tolerated.
    #[error("invalid bank selector mask {mask:#010b} for opcode {opcode:#04X} at {addr:#06X}")]
    InvalidBankSelector { mask: u8, opcode: u8, addr: u16 },

    /// An addressing combination the handler recognizes but does not
    /// implement (decimal-mode arithmetic redirected through the T flag).
    #[error("unimplemented addressing variant for opcode {opcode:#04X} at {addr:#06X}")]
    UnimplementedAddressingVariant { opcode: u8, addr: u16 },

    /// A load or store reached the peripheral window at an offset no
    /// device decodes.
    #[error("peripheral bus fault at hardware-page offset {offset:#06X}")]
    PeripheralBusFault { offset: u16 },
}
