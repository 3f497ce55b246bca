use std::{env, error::Error, path::PathBuf, process::ExitCode};

use coregrafx::cpu::disasm;
use coregrafx::Machine;

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let mut rom_path: Option<PathBuf> = None;
    let mut state_in: Option<PathBuf> = None;
    let mut state_out: Option<PathBuf> = None;
    let mut cycle_limit: Option<u64> = None;
    let mut trace = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--trace" => trace = true,
            "--cycle-limit" => {
                let Some(value) = args.next() else {
                    eprintln!("--cycle-limit requires a value");
                    return Ok(ExitCode::FAILURE);
                };
                match value.parse::<u64>() {
                    Ok(limit) => cycle_limit = Some(limit),
                    Err(_) => {
                        eprintln!("invalid --cycle-limit value: {value}");
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
            "--state-in" => {
                let Some(path) = args.next() else {
                    eprintln!("--state-in requires a file path");
                    return Ok(ExitCode::FAILURE);
                };
                state_in = Some(PathBuf::from(path));
            }
            "--state-out" => {
                let Some(path) = args.next() else {
                    eprintln!("--state-out requires a file path");
                    return Ok(ExitCode::FAILURE);
                };
                state_out = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(ExitCode::SUCCESS);
            }
            _ if rom_path.is_none() => rom_path = Some(PathBuf::from(arg)),
            other => {
                eprintln!("unknown argument: {other}");
                print_usage();
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    let Some(rom_path) = rom_path else {
        print_usage();
        return Ok(ExitCode::FAILURE);
    };

    let mut machine = Machine::new();
    machine.load_rom_file(&rom_path)?;
    machine.reset()?;
    // Seed a RAM window for the zero page and stack, as the boot firmware
    // would before handing control to the program.
    machine.mmu.set_mpr(1, 0xF8);

    if let Some(path) = state_in {
        machine.load_state_from_file(&path)?;
    }

    let budget = cycle_limit.unwrap_or(50_000);
    let outcome = loop {
        if machine.cpu.halted() || machine.cycles() >= budget {
            break Ok(());
        }
        if trace && !machine.cpu.regs.transfer_in_progress() {
            let pc = machine.cpu.regs.pc;
            match disasm::disassemble(&machine.mmu, pc) {
                Some(line) => println!("{pc:04X}  {}", line.text),
                None => println!("{pc:04X}  ???"),
            }
        }
        match machine.step() {
            Ok(0) if !machine.cpu.waiting() => break Ok(()),
            Ok(_) => {}
            Err(err) => break Err(err),
        }
    };

    if let Err(err) = outcome {
        eprintln!("fatal: {err}");
        return Ok(ExitCode::FAILURE);
    }

    println!(
        "Finished after {} cycles. A={:#04X} X={:#04X} Y={:#04X} PC={:#06X}",
        machine.cycles(),
        machine.cpu.regs.a,
        machine.cpu.regs.x,
        machine.cpu.regs.y,
        machine.cpu.regs.pc,
    );

    if let Some(path) = state_out {
        machine.save_state_to_file(&path)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn print_usage() {
    eprintln!("Usage: coregrafx <rom> [--trace] [--cycle-limit <n>] [--state-in <file>] [--state-out <file>]");
    eprintln!("  <rom>                 ROM image; a 512-byte copier header is stripped");
    eprintln!("Options:");
    eprintln!("  --trace               Print a disassembly line per instruction");
    eprintln!("  --cycle-limit <n>     Stop after n cycles (default 50000)");
    eprintln!("  --state-in <file>     Restore a save state before running");
    eprintln!("  --state-out <file>    Write a save state after the run");
    eprintln!("  --help                Show this message");
}
