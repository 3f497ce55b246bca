use super::*;
use crate::mmu::PAGE_SIZE;

fn rom_with_program(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; PAGE_SIZE];
    rom[..program.len()].copy_from_slice(program);
    rom[0x1FFE] = 0x00;
    rom[0x1FFF] = 0xE0;
    rom
}

fn machine_with_program(program: &[u8]) -> Machine {
    let mut machine = Machine::new();
    machine.load_rom_bytes(&rom_with_program(program)).unwrap();
    machine.reset().unwrap();
    machine
}

#[test]
fn prepare_strips_a_copier_header() {
    let mut image = vec![0u8; 512 + PAGE_SIZE];
    image[512] = 0x7E;
    let rom = prepare_rom_image(&image).unwrap();
    assert_eq!(rom.len(), PAGE_SIZE);
    assert_eq!(rom[0], 0x7E);
}

#[test]
fn prepare_pads_partial_banks_with_open_bus() {
    let rom = prepare_rom_image(&[0x01, 0x02, 0x03]).unwrap();
    assert_eq!(rom.len(), PAGE_SIZE);
    assert_eq!(&rom[..3], &[0x01, 0x02, 0x03]);
    assert_eq!(rom[3], 0xFF);
}

#[test]
fn prepare_keeps_whole_bank_images_untouched() {
    let image = vec![0x42u8; 2 * PAGE_SIZE];
    let rom = prepare_rom_image(&image).unwrap();
    assert_eq!(rom, image);
}

#[test]
fn prepare_rejects_an_empty_image() {
    assert!(matches!(prepare_rom_image(&[]), Err(RomError::Empty)));
}

#[test]
fn reset_follows_the_power_on_contract() {
    let machine = machine_with_program(&[0xEA]);
    assert_eq!(machine.cpu.regs.pc, 0xE000, "pc seeded from reset vector");
    assert!(machine.cpu.regs.status.irq_disable);
    assert!(!machine.cpu.regs.status.decimal);
    assert!(!machine.cpu.regs.status.memory_op);
    assert_eq!(machine.mmu.mpr(7), 0x00, "window 7 at its forced value");
    assert_eq!(machine.cycles(), 0);
}

#[test]
fn program_maps_its_own_ram_window_and_runs_to_halt() {
    // The canonical boot prologue: map work RAM at $2000, then use the
    // zero page.  LDA #$F8 ; TAM #$02 ; LDA #$2A ; STA $10 ; BRK
    let mut machine =
        machine_with_program(&[0xA9, 0xF8, 0x53, 0x02, 0xA9, 0x2A, 0x85, 0x10, 0x00]);
    machine.run_until_halt(None).unwrap();

    assert!(machine.cpu.halted());
    assert_eq!(machine.mmu.mpr(1), 0xF8);
    assert_eq!(machine.mmu.peek(0x2010), 0x2A);
    assert_eq!(machine.cpu.regs.a, 0x2A);
    // LDA 2 + TAM 5 + LDA 2 + STA 4 + BRK 8.
    assert_eq!(machine.cycles(), 21);
}

#[test]
fn run_until_halt_honors_the_cycle_budget() {
    let mut machine = machine_with_program(&[0x80, 0xFE]); // BRA self
    machine.run_until_halt(Some(100)).unwrap();
    assert!(!machine.cpu.halted());
    assert!(machine.cycles() >= 100);
}

#[test]
fn fatal_conditions_surface_from_the_run_loop() {
    let mut machine = machine_with_program(&[0x1B]);
    let err = machine.run_until_halt(None).expect_err("unassigned opcode");
    assert_eq!(
        err,
        crate::errors::CoreError::UnimplementedOpcode {
            opcode: 0x1B,
            addr: 0xE000,
        }
    );
}

#[test]
fn save_state_round_trips_machine_state() {
    let mut machine =
        machine_with_program(&[0xA9, 0xF8, 0x53, 0x02, 0xA9, 0x2A, 0x85, 0x10, 0x00]);
    machine.run_until_halt(None).unwrap();

    let path = std::env::temp_dir().join(format!("coregrafx-state-{}.bin", std::process::id()));
    machine.save_state_to_file(&path).unwrap();

    let mut restored = Machine::new();
    restored.load_state_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(restored.cpu.regs.a, machine.cpu.regs.a);
    assert_eq!(restored.cpu.regs.pc, machine.cpu.regs.pc);
    assert_eq!(restored.cycles(), machine.cycles());
    assert_eq!(restored.mmu.mpr(1), 0xF8);
    assert_eq!(restored.mmu.peek(0x2010), 0x2A);
}
