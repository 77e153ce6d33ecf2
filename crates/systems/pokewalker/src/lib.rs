//! Pokewalker system implementation.
//!
//! The Pokewalker is built around a Renesas H8/38606 microcontroller (an
//! H8/300H core) with 48 KiB of on-chip flash, 2 KiB of RAM, a synchronous
//! serial unit wired to an external EEPROM and accelerometer, a 96x64
//! monochrome LCD, an IR transceiver and three buttons.
//!
//! This crate provides the cycle-stepped system core: the CPU (from
//! `emu_core`) owning the bus, the bus decoding to flash ROM / RAM / SSU,
//! and a facade with single-instruction stepping, frame advance, file
//! loading and register/memory inspection. The LCD controller, IR, timers
//! and interrupt controller are not modeled; the framebuffer is owned here
//! and exposed read-only, and frame advance runs a fixed deterministic
//! instruction budget in place of real VBlank timing.

mod bus;
mod ram;
mod rom;
mod ssu;

pub use bus::PokewalkerBus;
pub use ram::{Ram, RAM_BASE, RAM_SIZE};
pub use rom::{FlashRom, ROM_SIZE};
pub use ssu::{Ssu, SSSR_ORER, SSSR_RDRF, SSSR_TDRE, SSSR_TEND};

use emu_core::cpu_h8300h::CpuH8300h;
use emu_core::types::Frame;
use emu_core::System;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Flash ROM image size in bytes
pub const FLASH_ROM_SIZE: usize = ROM_SIZE;
/// EEPROM image size in bytes
pub const EEPROM_SIZE: usize = 65536;
/// LCD width in pixels
pub const LCD_WIDTH: u32 = 96;
/// LCD height in pixels
pub const LCD_HEIGHT: u32 = 64;

/// Instructions executed per frame by `step_frame`. The LCD controller is
/// not modeled, so this fixed budget is the VBlank source; it keeps frame
/// advance deterministic for identical inputs.
pub const INSTRUCTIONS_PER_FRAME: u32 = 8192;

/// Loadable file kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreFile {
    FlashRom,
    Eeprom,
}

/// The three hardware buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Left,
    Middle,
    Right,
}

impl InputKey {
    fn index(self) -> usize {
        match self {
            InputKey::Left => 0,
            InputKey::Middle => 1,
            InputKey::Right => 2,
        }
    }
}

/// Button state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Released,
    Pressed,
}

/// Registers visible through the inspection interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreRegister {
    Er0,
    Er1,
    Er2,
    Er3,
    Er4,
    Er5,
    Er6,
    Er7,
    Pc,
    Ccr,
}

#[derive(Debug, Error)]
pub enum PokewalkerError {
    #[error("invalid {kind:?} image size: expected {expected} bytes, got {actual}")]
    BadFileSize {
        kind: CoreFile,
        expected: usize,
        actual: usize,
    },
    #[error("no {0:?} image loaded")]
    NotLoaded(CoreFile),
}

/// Serialized system state (CPU, RAM, SSU; images are reloaded from files)
#[derive(Serialize, Deserialize)]
struct SaveState {
    system: String,
    version: u32,
    regs: [u32; 8],
    pc: u32,
    ccr: u8,
    initialized: bool,
    frames: u64,
    ram: Ram,
    ssu: Ssu,
}

/// Pokewalker system: CPU (owning the bus), retained EEPROM image,
/// framebuffer and input latch.
pub struct PokewalkerSystem {
    cpu: CpuH8300h<PokewalkerBus>,
    eeprom: Option<Vec<u8>>,
    video: Vec<u32>,
    inputs: [InputState; 3],
    frames: u64,
    rom_loaded: bool,
}

impl Default for PokewalkerSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl PokewalkerSystem {
    /// Create an empty system; no images are installed yet.
    pub fn new() -> Self {
        Self {
            cpu: CpuH8300h::new(PokewalkerBus::new()),
            eeprom: None,
            video: vec![0; (LCD_WIDTH * LCD_HEIGHT) as usize],
            inputs: [InputState::Released; 3],
            frames: 0,
            rom_loaded: false,
        }
    }

    /// Install a file image. Sizes are fixed by the hardware: 49,152 bytes
    /// of flash, 65,536 bytes of EEPROM.
    pub fn load_file(&mut self, kind: CoreFile, data: &[u8]) -> Result<(), PokewalkerError> {
        let expected = match kind {
            CoreFile::FlashRom => FLASH_ROM_SIZE,
            CoreFile::Eeprom => EEPROM_SIZE,
        };
        if data.len() != expected {
            return Err(PokewalkerError::BadFileSize {
                kind,
                expected,
                actual: data.len(),
            });
        }
        match kind {
            CoreFile::FlashRom => {
                self.cpu.memory.rom.load(data);
                self.rom_loaded = true;
            }
            CoreFile::Eeprom => self.eeprom = Some(data.to_vec()),
        }
        Ok(())
    }

    /// Copy a retained image back out (for host-side persistence).
    pub fn save_file(&self, kind: CoreFile) -> Result<Vec<u8>, PokewalkerError> {
        match kind {
            CoreFile::FlashRom => {
                if !self.rom_loaded {
                    return Err(PokewalkerError::NotLoaded(kind));
                }
                Ok(self.cpu.memory.rom.image().to_vec())
            }
            CoreFile::Eeprom => self
                .eeprom
                .clone()
                .ok_or(PokewalkerError::NotLoaded(kind)),
        }
    }

    /// Execute exactly one CPU instruction and advance the bus one tick.
    pub fn step(&mut self) {
        self.cpu.step();
        self.cpu.memory.cycle();
    }

    /// Run until the next VBlank (one fixed instruction budget).
    pub fn frame_advance(&mut self) {
        for _ in 0..INSTRUCTIONS_PER_FRAME {
            self.step();
        }
        self.frames = self.frames.wrapping_add(1);
    }

    /// Borrowed view of the 96x64 RGBA framebuffer.
    pub fn video_buffer(&self) -> &[u32] {
        &self.video
    }

    /// Frames advanced since reset
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn set_input(&mut self, key: InputKey, state: InputState) {
        self.inputs[key.index()] = state;
    }

    pub fn input(&self, key: InputKey) -> InputState {
        self.inputs[key.index()]
    }

    pub fn read_register(&self, reg: CoreRegister) -> u32 {
        match reg {
            CoreRegister::Er0 => self.cpu.regs[0],
            CoreRegister::Er1 => self.cpu.regs[1],
            CoreRegister::Er2 => self.cpu.regs[2],
            CoreRegister::Er3 => self.cpu.regs[3],
            CoreRegister::Er4 => self.cpu.regs[4],
            CoreRegister::Er5 => self.cpu.regs[5],
            CoreRegister::Er6 => self.cpu.regs[6],
            CoreRegister::Er7 => self.cpu.regs[7],
            CoreRegister::Pc => self.cpu.pc,
            CoreRegister::Ccr => self.cpu.ccr as u32,
        }
    }

    pub fn write_register(&mut self, reg: CoreRegister, val: u32) {
        match reg {
            CoreRegister::Er0 => self.cpu.regs[0] = val,
            CoreRegister::Er1 => self.cpu.regs[1] = val,
            CoreRegister::Er2 => self.cpu.regs[2] = val,
            CoreRegister::Er3 => self.cpu.regs[3] = val,
            CoreRegister::Er4 => self.cpu.regs[4] = val,
            CoreRegister::Er5 => self.cpu.regs[5] = val,
            CoreRegister::Er6 => self.cpu.regs[6] = val,
            CoreRegister::Er7 => self.cpu.regs[7] = val,
            CoreRegister::Pc => self.cpu.pc = val,
            CoreRegister::Ccr => self.cpu.ccr = val as u8,
        }
    }

    /// Read a byte through the bus (with peripheral side effects).
    pub fn read_memory(&mut self, addr: u16) -> u8 {
        self.cpu.memory.read8(addr)
    }

    /// Write a byte through the bus.
    pub fn write_memory(&mut self, addr: u16, val: u8) {
        self.cpu.memory.write8(addr, val);
    }

    /// Borrow the bus (ROM, RAM, SSU)
    pub fn bus(&self) -> &PokewalkerBus {
        &self.cpu.memory
    }

    pub fn bus_mut(&mut self) -> &mut PokewalkerBus {
        &mut self.cpu.memory
    }

    /// Instructions executed since reset
    pub fn instructions(&self) -> u64 {
        self.cpu.instructions
    }
}

impl System for PokewalkerSystem {
    type Error = PokewalkerError;

    /// Reset CPU, RAM and SSU. The flash image and EEPROM survive.
    fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.memory.reset();
        self.inputs = [InputState::Released; 3];
        self.frames = 0;
        self.video.fill(0);
    }

    fn step_frame(&mut self) -> Result<Frame, Self::Error> {
        if !self.rom_loaded {
            return Err(PokewalkerError::NotLoaded(CoreFile::FlashRom));
        }
        self.frame_advance();
        Ok(Frame::from_pixels(LCD_WIDTH, LCD_HEIGHT, self.video.clone()))
    }

    fn save_state(&self) -> Value {
        let state = SaveState {
            system: "pokewalker".to_string(),
            version: 1,
            regs: self.cpu.regs,
            pc: self.cpu.pc,
            ccr: self.cpu.ccr,
            initialized: self.cpu.initialized,
            frames: self.frames,
            ram: self.cpu.memory.ram.clone(),
            ssu: self.cpu.memory.ssu.clone(),
        };
        serde_json::to_value(state).unwrap_or_default()
    }

    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        let state: SaveState = serde_json::from_value(v.clone())?;
        self.cpu.regs = state.regs;
        self.cpu.pc = state.pc;
        self.cpu.ccr = state.ccr;
        self.cpu.initialized = state.initialized;
        self.frames = state.frames;
        self.cpu.memory.ram = state.ram;
        self.cpu.memory.ssu = state.ssu;
        Ok(())
    }
}
