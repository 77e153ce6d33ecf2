use anyhow::{Context, Result};
use clap::Parser;
use emu_core::System;
use emu_pokewalker::{CoreFile, CoreRegister, PokewalkerSystem};
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Headless Pokewalker emulator frontend.
#[derive(Parser)]
#[command(name = "emuwalker", about = "Pokewalker emulator")]
struct Args {
    /// Path to the 48 KiB flash ROM image
    #[arg(long)]
    rom: PathBuf,

    /// Path to the 64 KiB EEPROM image
    #[arg(long)]
    eeprom: PathBuf,

    /// Number of frames to run
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Dump save-state to this file as JSON on exit
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print per-frame register summaries
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Suppress all per-frame output (still writes --save)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<()> {
    emu_core::logging::init_from_env();
    let args = Args::parse();

    let rom = fs::read(&args.rom)
        .with_context(|| format!("reading ROM file {}", args.rom.display()))?;
    let eeprom = fs::read(&args.eeprom)
        .with_context(|| format!("reading EEPROM file {}", args.eeprom.display()))?;

    let mut sys = PokewalkerSystem::new();
    sys.load_file(CoreFile::FlashRom, &rom)
        .with_context(|| format!("loading ROM file {}", args.rom.display()))?;
    sys.load_file(CoreFile::Eeprom, &eeprom)
        .with_context(|| format!("loading EEPROM file {}", args.eeprom.display()))?;
    sys.reset();

    for fnum in 1..=args.frames {
        let frame = sys.step_frame()?;
        if args.quiet {
            continue;
        }
        if args.debug {
            println!("Frame {}: {}x{}", fnum, frame.width, frame.height);
            println!(
                "  PC={:06X} ER7={:08X} CCR={:02X} instructions={}",
                sys.read_register(CoreRegister::Pc),
                sys.read_register(CoreRegister::Er7),
                sys.read_register(CoreRegister::Ccr),
                sys.instructions(),
            );
        }
    }

    if let Some(path) = &args.save {
        let state = sys.save_state();
        let mut f = File::create(path)
            .with_context(|| format!("creating save-state file {}", path.display()))?;
        write!(f, "{}", serde_json::to_string_pretty(&state)?)?;
    }

    Ok(())
}
