//! Interrupt request and priority arbitration.
//!
//! Three maskable sources share the CPU's interrupt input: the recurring
//! timer, IRQ1 (raised by the video controller) and IRQ2 (raised by
//! expansion hardware and the PSG).  Each source has one request bit and
//! one disable bit; arbitration picks the highest-priority source that is
//! requested and not individually masked.

pub const IRQ_DISABLE_IRQ2: u8 = 0x01;
pub const IRQ_DISABLE_IRQ1: u8 = 0x02;
pub const IRQ_DISABLE_TIMER: u8 = 0x04;
pub const IRQ_REQUEST_IRQ2: u8 = 0x01;
pub const IRQ_REQUEST_IRQ1: u8 = 0x02;
pub const IRQ_REQUEST_TIMER: u8 = 0x04;

const IRQ_MASK_BITS: u8 = IRQ_DISABLE_IRQ2 | IRQ_DISABLE_IRQ1 | IRQ_DISABLE_TIMER;

/// A maskable interrupt source, in descending priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub enum IrqSource {
    Timer,
    Irq1,
    Irq2,
}

impl IrqSource {
    #[inline]
    pub fn request_bit(self) -> u8 {
        match self {
            IrqSource::Timer => IRQ_REQUEST_TIMER,
            IrqSource::Irq1 => IRQ_REQUEST_IRQ1,
            IrqSource::Irq2 => IRQ_REQUEST_IRQ2,
        }
    }

    #[inline]
    pub fn disable_bit(self) -> u8 {
        match self {
            IrqSource::Timer => IRQ_DISABLE_TIMER,
            IrqSource::Irq1 => IRQ_DISABLE_IRQ1,
            IrqSource::Irq2 => IRQ_DISABLE_IRQ2,
        }
    }

    /// Vector slot holding the handler address for this source.
    #[inline]
    pub fn vector(self) -> u16 {
        match self {
            IrqSource::Timer => 0xFFFA,
            IrqSource::Irq1 => 0xFFF8,
            IrqSource::Irq2 => 0xFFF6,
        }
    }
}

/// Request/disable register pair with fixed-priority arbitration.
#[derive(Clone, Copy, Default, bincode::Encode, bincode::Decode)]
pub struct IrqController {
    request: u8,
    disable: u8,
}

impl IrqController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.request = 0;
        self.disable = 0;
    }

    /// Latch a request.  Called by peripheral collaborators; the bit stays
    /// set until the CPU acknowledges the source.
    pub fn request(&mut self, source: IrqSource) {
        self.request |= source.request_bit();
    }

    /// Drop a request without dispatching (level-style sources deassert
    /// their line when the device condition clears).
    pub fn withdraw(&mut self, source: IrqSource) {
        self.request &= !source.request_bit();
    }

    /// Highest-priority source that is requested and not individually
    /// masked: Timer > IRQ1 > IRQ2.  Masked-but-requested sources are
    /// skipped here but stay latched, so they dispatch once unmasked.
    pub fn resolve(&self) -> Option<IrqSource> {
        let pending = self.request & !self.disable;
        if pending & IRQ_REQUEST_TIMER != 0 {
            return Some(IrqSource::Timer);
        }
        if pending & IRQ_REQUEST_IRQ1 != 0 {
            return Some(IrqSource::Irq1);
        }
        if pending & IRQ_REQUEST_IRQ2 != 0 {
            return Some(IrqSource::Irq2);
        }
        None
    }

    /// True when any unmasked request is pending.
    #[inline]
    pub fn pending(&self) -> bool {
        self.request & !self.disable != 0
    }

    /// True when any request is latched at all, masked or not.
    #[inline]
    pub fn any_requested(&self) -> bool {
        self.request != 0
    }

    /// Part of the CPU's dispatch sequence: the chosen source's request
    /// bit is cleared as the vector is taken.
    pub fn acknowledge(&mut self, source: IrqSource) {
        self.request &= !source.request_bit();
    }

    /// Disable-mask register ($1402 in the peripheral window).
    pub fn read_disable(&self) -> u8 {
        self.disable
    }

    pub fn write_disable(&mut self, value: u8) {
        self.disable = value & IRQ_MASK_BITS;
    }

    /// Request-status register ($1403).
    pub fn read_request(&self) -> u8 {
        self.request
    }

    /// On real hardware any write to the status port clears the timer
    /// request, regardless of the value written.
    pub fn write_request(&mut self, _value: u8) {
        self.request &= !IRQ_REQUEST_TIMER;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_orders_timer_above_irq1_above_irq2() {
        let mut irq = IrqController::new();
        irq.request(IrqSource::Irq2);
        assert_eq!(irq.resolve(), Some(IrqSource::Irq2));
        irq.request(IrqSource::Irq1);
        assert_eq!(irq.resolve(), Some(IrqSource::Irq1));
        irq.request(IrqSource::Timer);
        assert_eq!(irq.resolve(), Some(IrqSource::Timer));
    }

    #[test]
    fn masked_sources_are_skipped_but_stay_latched() {
        let mut irq = IrqController::new();
        irq.request(IrqSource::Timer);
        irq.request(IrqSource::Irq1);
        irq.write_disable(IRQ_DISABLE_TIMER);

        assert_eq!(irq.resolve(), Some(IrqSource::Irq1));
        assert_eq!(irq.read_request() & IRQ_REQUEST_TIMER, IRQ_REQUEST_TIMER);

        irq.write_disable(0);
        assert_eq!(irq.resolve(), Some(IrqSource::Timer));
    }

    #[test]
    fn resolve_returns_none_with_everything_masked() {
        let mut irq = IrqController::new();
        irq.request(IrqSource::Timer);
        irq.request(IrqSource::Irq2);
        irq.write_disable(IRQ_DISABLE_TIMER | IRQ_DISABLE_IRQ1 | IRQ_DISABLE_IRQ2);
        assert_eq!(irq.resolve(), None);
        assert!(!irq.pending());
        assert!(irq.any_requested());
    }

    #[test]
    fn acknowledge_clears_only_the_chosen_source() {
        let mut irq = IrqController::new();
        irq.request(IrqSource::Timer);
        irq.request(IrqSource::Irq2);
        irq.acknowledge(IrqSource::Timer);
        assert_eq!(irq.resolve(), Some(IrqSource::Irq2));
    }

    #[test]
    fn status_write_acknowledges_the_timer_only() {
        let mut irq = IrqController::new();
        irq.request(IrqSource::Timer);
        irq.request(IrqSource::Irq1);
        irq.write_request(0x00);
        assert_eq!(irq.read_request(), IRQ_REQUEST_IRQ1);
    }

    #[test]
    fn disable_register_masks_to_its_three_bits() {
        let mut irq = IrqController::new();
        irq.write_disable(0xFF);
        assert_eq!(
            irq.read_disable(),
            IRQ_DISABLE_TIMER | IRQ_DISABLE_IRQ1 | IRQ_DISABLE_IRQ2
        );
    }

    #[test]
    fn vectors_match_the_fixed_slots() {
        assert_eq!(IrqSource::Irq2.vector(), 0xFFF6);
        assert_eq!(IrqSource::Irq1.vector(), 0xFFF8);
        assert_eq!(IrqSource::Timer.vector(), 0xFFFA);
    }
}
