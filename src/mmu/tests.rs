use super::*;
use crate::errors::CoreError;

/// Register-latch stand-in for a peripheral block: remembers the last
/// value stored per decoded offset.
#[derive(Default)]
struct Latch {
    cells: [u8; 16],
}

impl Peripheral for Latch {
    fn load(&mut self, offset: u16) -> Result<u8, CoreError> {
        Ok(self.cells[offset as usize])
    }

    fn store(&mut self, offset: u16, value: u8) -> Result<(), CoreError> {
        self.cells[offset as usize] = value;
        Ok(())
    }
}

fn mmu_with_rom(pages: usize) -> Mmu {
    let mut mmu = Mmu::new();
    let mut rom = vec![0u8; pages * PAGE_SIZE];
    for (index, byte) in rom.iter_mut().enumerate() {
        *byte = (index / PAGE_SIZE) as u8; // each bank filled with its number
    }
    mmu.load_rom_image(rom);
    mmu
}

#[test]
fn translate_combines_bank_register_and_low_bits() {
    let mut mmu = mmu_with_rom(8);
    mmu.set_mpr(2, 0x05);
    assert_eq!(
        mmu.translate(0x4123),
        Physical::Rom(0x05 * PAGE_SIZE + 0x123)
    );
    assert_eq!(mmu.load(0x4123).unwrap(), 0x05);
}

#[test]
fn power_on_mapping_exposes_rom_bank_zero_everywhere() {
    let mmu = mmu_with_rom(4);
    for window in 0..8u16 {
        let addr = window << 13;
        assert_eq!(mmu.translate(addr), Physical::Rom((addr & 0x1FFF) as usize));
    }
    // Window 7 reaches the vectors in bank 0.
    assert_eq!(mmu.translate(0xFFFE), Physical::Rom(0x1FFE));
}

#[test]
fn ram_banks_mirror_the_work_ram_page() {
    let mut mmu = Mmu::new();
    mmu.set_mpr(1, 0xF8);
    mmu.set_mpr(2, 0xF9);
    mmu.set_mpr(3, 0xFB);

    mmu.store(0x2044, 0x99).unwrap();
    // $F9 and $FB alias the same 8 KiB on the stock console.
    assert_eq!(mmu.load(0x4044).unwrap(), 0x99);
    assert_eq!(mmu.load(0x6044).unwrap(), 0x99);
}

#[test]
fn non_power_of_two_roms_mirror_in_split_halves() {
    // 48 banks: lower 32 mirror below the midpoint, upper 16 above it.
    let mut mmu = mmu_with_rom(48);

    mmu.set_mpr(2, 48);
    assert_eq!(mmu.load(0x4000).unwrap(), 16, "bank 48 mirrors to 48 % 32");

    mmu.set_mpr(2, 64);
    assert_eq!(mmu.load(0x4000).unwrap(), 32, "bank 64 starts the upper half");

    mmu.set_mpr(2, 64 + 20);
    assert_eq!(mmu.load(0x4000).unwrap(), 32 + 4, "upper half mirrors mod 16");
}

#[test]
fn rom_reads_past_the_image_float_high() {
    let mut mmu = Mmu::new();
    mmu.load_rom_image(vec![0x12; 100]);
    assert_eq!(mmu.load(0x0010).unwrap(), 0x12);
    assert_eq!(mmu.load(0x0100).unwrap(), 0xFF);
}

#[test]
fn rom_stores_are_ignored() {
    let mut mmu = mmu_with_rom(1);
    mmu.store(0x0010, 0xAA).unwrap();
    assert_eq!(mmu.load(0x0010).unwrap(), 0x00);
}

#[test]
fn unattached_peripheral_slot_faults() {
    let mut mmu = Mmu::new();
    mmu.set_mpr(2, 0xFF);
    let err = mmu.load(0x4000).expect_err("no device attached");
    assert!(matches!(err, CoreError::PeripheralBusFault { .. }));
}

#[test]
fn undecoded_window_offsets_fault() {
    let mut mmu = Mmu::new();
    mmu.set_mpr(2, 0xFF);
    mmu.devices.vdc = Box::new(Latch::default());

    // $1800-$1FFF decodes to no device at all.
    let err = mmu.load(0x5900).expect_err("hole in the window");
    assert_eq!(err, CoreError::PeripheralBusFault { offset: 0x1900 });

    // The IRQ block only decodes its two registers.
    let err = mmu.store(0x5400, 0x00).expect_err("irq offset 0");
    assert_eq!(err, CoreError::PeripheralBusFault { offset: 0x1400 });
}

#[test]
fn device_slots_receive_masked_offsets() {
    let mut mmu = Mmu::new();
    mmu.set_mpr(2, 0xFF);
    mmu.devices.vdc = Box::new(Latch::default());
    mmu.devices.timer = Box::new(Latch::default());

    // VDC decodes two address bits; $0102 aliases register 2.
    mmu.store(0x4102, 0xAB).unwrap();
    assert_eq!(mmu.load(0x4002).unwrap(), 0xAB);

    // Timer decodes one bit; $0C03 aliases register 1.
    mmu.store(0x4C03, 0x55).unwrap();
    assert_eq!(mmu.load(0x4C01).unwrap(), 0x55);
}

#[test]
fn irq_registers_are_reachable_through_the_window() {
    let mut mmu = Mmu::new();
    mmu.set_mpr(2, 0xFF);

    mmu.store(0x5402, 0x05).unwrap();
    assert_eq!(mmu.irq.read_disable(), 0x05);
    assert_eq!(mmu.load(0x5402).unwrap(), 0x05);

    mmu.irq.request(crate::irq::IrqSource::Timer);
    assert_eq!(mmu.load(0x5403).unwrap(), 0x04);

    // Any write to the status port acknowledges the timer.
    mmu.store(0x5403, 0xFF).unwrap();
    assert_eq!(mmu.load(0x5403).unwrap(), 0x00);
}

#[test]
fn st_ports_store_into_the_vdc_write_registers() {
    let mut mmu = Mmu::new();
    mmu.devices.vdc = Box::new(Latch::default());
    mmu.set_mpr(2, 0xFF);

    mmu.store_st_port(0, 0x11).unwrap();
    mmu.store_st_port(1, 0x22).unwrap();
    mmu.store_st_port(2, 0x33).unwrap();

    assert_eq!(mmu.load(0x4000).unwrap(), 0x11);
    assert_eq!(mmu.load(0x4002).unwrap(), 0x22);
    assert_eq!(mmu.load(0x4003).unwrap(), 0x33);
}

#[test]
fn peek_never_touches_the_peripheral_window() {
    let mut mmu = Mmu::new();
    mmu.set_mpr(2, 0xFF);
    // Even with nothing attached, a peek must not fault or reach a device.
    assert_eq!(mmu.peek(0x4000), 0xFF);
}

#[test]
fn load_u16_is_little_endian() {
    let mut mmu = Mmu::new();
    mmu.set_mpr(1, 0xF8);
    mmu.store(0x2300, 0x34).unwrap();
    mmu.store(0x2301, 0x12).unwrap();
    assert_eq!(mmu.load_u16(0x2300).unwrap(), 0x1234);
}
