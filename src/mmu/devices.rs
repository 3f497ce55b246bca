use crate::errors::CoreError;

/// Bus-addressable register block behind the peripheral window.
///
/// `offset` is the address within the device's own decoded sub-range (the
/// window decoder has already applied the device's register mask).  A
/// device that does not decode the given offset reports a
/// [`CoreError::PeripheralBusFault`] with the window offset restored by the
/// caller.
pub trait Peripheral {
    fn load(&mut self, offset: u16) -> Result<u8, CoreError>;
    fn store(&mut self, offset: u16, value: u8) -> Result<(), CoreError>;
}

/// Placeholder for a peripheral slot the host has not attached.  Any
/// access faults: the core refuses to guess what absent hardware would
/// have answered.
#[derive(Default)]
pub struct Unattached;

impl Peripheral for Unattached {
    fn load(&mut self, offset: u16) -> Result<u8, CoreError> {
        Err(CoreError::PeripheralBusFault { offset })
    }

    fn store(&mut self, offset: u16, _value: u8) -> Result<(), CoreError> {
        Err(CoreError::PeripheralBusFault { offset })
    }
}

/// The five external register blocks reachable through the window.
/// Device state belongs to the host and is not part of save states: the
/// slots encode as zero bytes and decode back to unattached, mirroring how
/// transient fields are handled elsewhere in the machine tree.
pub struct DeviceSlots {
    pub vdc: Box<dyn Peripheral>,
    pub vce: Box<dyn Peripheral>,
    pub psg: Box<dyn Peripheral>,
    pub timer: Box<dyn Peripheral>,
    pub io: Box<dyn Peripheral>,
}

impl Default for DeviceSlots {
    fn default() -> Self {
        Self {
            vdc: Box::new(Unattached),
            vce: Box::new(Unattached),
            psg: Box::new(Unattached),
            timer: Box::new(Unattached),
            io: Box::new(Unattached),
        }
    }
}

impl bincode::Encode for DeviceSlots {
    fn encode<E: bincode::enc::Encoder>(
        &self,
        _encoder: &mut E,
    ) -> Result<(), bincode::error::EncodeError> {
        Ok(()) // write nothing
    }
}

impl<Context> bincode::Decode<Context> for DeviceSlots {
    fn decode<D: bincode::de::Decoder>(
        _decoder: &mut D,
    ) -> Result<Self, bincode::error::DecodeError> {
        Ok(Self::default())
    }
}

impl<'de, Context> bincode::BorrowDecode<'de, Context> for DeviceSlots {
    fn borrow_decode<D: bincode::de::BorrowDecoder<'de>>(
        _decoder: &mut D,
    ) -> Result<Self, bincode::error::DecodeError> {
        Ok(Self::default())
    }
}
