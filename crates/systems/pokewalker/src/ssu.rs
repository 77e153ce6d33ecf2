//! Synchronous serial unit (SSU).
//!
//! A byte-oriented shift-register serial interface clocked by the bus tick.
//! Seven registers are CPU-visible; the shift register SSTRSR and the
//! prescaler/bit counters are internal state. No peer device is attached in
//! this core, so a completed transfer receives 0xFF (an undriven line).
//!
//! The prescaler accumulates `1 << CKS` per bus tick and one data bit is
//! shifted every time it crosses 256, so a full byte takes `8 * 256 >> CKS`
//! ticks. With CKS = 0 that is exactly 2048 ticks.

use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};

/// SSU control register H
pub const SSCRH_ADDR: u16 = 0xF0E0;
/// SSU control register L
pub const SSCRL_ADDR: u16 = 0xF0E1;
/// SSU mode register
pub const SSMR_ADDR: u16 = 0xF0E2;
/// SSU enable register
pub const SSER_ADDR: u16 = 0xF0E3;
/// SSU status register
pub const SSSR_ADDR: u16 = 0xF0E4;
/// SSU receive data register
pub const SSRDR_ADDR: u16 = 0xF0E9;
/// SSU transmit data register
pub const SSTDR_ADDR: u16 = 0xF0EB;

/// SSSR: conflict error
pub const SSSR_CE: u8 = 0x01;
/// SSSR: receive data register full
pub const SSSR_RDRF: u8 = 0x02;
/// SSSR: transmit end (set while the unit is idle)
pub const SSSR_TEND: u8 = 0x04;
/// SSSR: transmit data register empty
pub const SSSR_TDRE: u8 = 0x08;
/// SSSR: overrun error
pub const SSSR_ORER: u8 = 0x40;

/// SSMR clock-select field
const SSMR_CKS_MASK: u8 = 0x07;

/// SSU state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ssu {
    sscrh: u8,
    sscrl: u8,
    ssmr: u8,
    sser: u8,
    sssr: u8,
    ssrdr: u8,
    sstdr: u8,
    /// Shift register; not CPU-addressable
    sstrsr: u8,
    /// Prescaler accumulator; one bit is shifted per 256 accumulated
    clock_counter: u16,
    /// Bits shifted in the current byte (0..8)
    bit_counter: u8,
}

impl Default for Ssu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ssu {
    pub fn new() -> Self {
        let mut ssu = Self {
            sscrh: 0,
            sscrl: 0,
            ssmr: 0,
            sser: 0,
            sssr: 0,
            ssrdr: 0,
            sstdr: 0,
            sstrsr: 0,
            clock_counter: 0,
            bit_counter: 0,
        };
        ssu.reset();
        ssu
    }

    pub fn reset(&mut self) {
        self.sscrh = 0x08;
        self.sscrl = 0x00;
        self.ssmr = 0x00;
        self.sser = 0x00;
        self.sssr = SSSR_TEND;
        self.ssrdr = 0x00;
        self.sstdr = 0x00;
        self.sstrsr = 0x00;
        self.clock_counter = 0;
        self.bit_counter = 0;
    }

    /// Raw SSSR value, for tests and state inspection
    pub fn status(&self) -> u8 {
        self.sssr
    }

    /// Register read with side effects; defined bits only.
    pub fn read8(&mut self, addr: u16) -> u8 {
        match addr {
            SSCRH_ADDR => self.sscrh,
            SSCRL_ADDR => self.sscrl & 0x78,
            SSMR_ADDR => self.ssmr & 0xE7,
            SSER_ADDR => self.sser & 0xEF,
            SSSR_ADDR => self.sssr & 0x4F,
            SSRDR_ADDR => {
                // Reading the receive register releases it.
                self.sssr &= !SSSR_RDRF;
                self.ssrdr
            }
            SSTDR_ADDR => self.sstdr,
            _ => 0xFF,
        }
    }

    pub fn write8(&mut self, addr: u16, val: u8) {
        match addr {
            SSCRH_ADDR => self.sscrh = val,
            SSCRL_ADDR => self.sscrl = val,
            SSMR_ADDR => self.ssmr = val,
            SSER_ADDR => self.sser = val,
            // Write-0-to-clear: the stored byte becomes old & written.
            SSSR_ADDR => self.sssr &= val,
            SSRDR_ADDR => {}
            SSTDR_ADDR => self.write_sstdr(val),
            _ => {}
        }
    }

    fn write_sstdr(&mut self, val: u8) {
        self.sstdr = val;
        if self.sssr & SSSR_TEND != 0 {
            // Idle: the byte goes straight into the shift register and a
            // new transfer starts.
            self.sstrsr = val;
            self.sssr &= !SSSR_TEND;
            self.sssr |= SSSR_TDRE;
            self.clock_counter = 0;
            self.bit_counter = 0;
        } else {
            // A transfer is running; the byte waits in SSTDR.
            self.sssr &= !SSSR_TDRE;
        }
    }

    /// Advance the unit by one bus tick.
    pub fn cycle(&mut self) {
        if self.sssr & SSSR_TEND != 0 {
            return;
        }

        self.clock_counter += 1 << (self.ssmr & SSMR_CKS_MASK);
        if self.clock_counter < 256 {
            return;
        }
        self.clock_counter -= 256;
        self.bit_counter += 1;
        if self.bit_counter < 8 {
            return;
        }

        // A full byte has been shifted out (and in).
        if self.sssr & SSSR_TDRE == 0 {
            // Another byte is buffered; keep the clock running.
            self.sstrsr = self.sstdr;
            self.sssr |= SSSR_TDRE;
        } else {
            self.sssr |= SSSR_TEND;
        }

        if self.sssr & SSSR_RDRF != 0 {
            // The previous byte was never read; the new one is lost.
            self.sssr |= SSSR_ORER;
            log(LogCategory::Ssu, LogLevel::Warn, || {
                "receive overrun, ORER set".to_string()
            });
        } else {
            // No peer drives the data line, so it reads all ones.
            self.ssrdr = 0xFF;
        }
        self.sssr |= SSSR_RDRF;
        self.bit_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Ssu {
        let mut ssu = Ssu::new();
        ssu.write8(SSCRH_ADDR, 0x8C);
        ssu.write8(SSCRL_ADDR, 0x40);
        ssu.write8(SSER_ADDR, 0x80); // TE
        ssu.write8(SSMR_ADDR, 0x00); // CKS = 0
        ssu
    }

    #[test]
    fn reset_values() {
        let mut ssu = Ssu::new();
        assert_eq!(ssu.read8(SSCRH_ADDR), 0x08);
        assert_eq!(ssu.read8(SSSR_ADDR), SSSR_TEND);
        assert_eq!(ssu.read8(SSMR_ADDR), 0x00);
        assert_eq!(ssu.read8(SSRDR_ADDR), 0x00);
    }

    #[test]
    fn idle_unit_ignores_cycles() {
        let mut ssu = Ssu::new();
        for _ in 0..10_000 {
            ssu.cycle();
        }
        assert_eq!(ssu.status(), SSSR_TEND);
    }

    #[test]
    fn single_byte_takes_2048_cycles() {
        let mut ssu = configured();
        ssu.write8(SSTDR_ADDR, 0x5A);
        assert_eq!(ssu.status() & SSSR_TEND, 0);

        for _ in 0..2047 {
            ssu.cycle();
        }
        assert_eq!(ssu.status() & SSSR_TEND, 0);
        assert_eq!(ssu.status() & SSSR_RDRF, 0);

        ssu.cycle();
        assert_ne!(ssu.status() & SSSR_TEND, 0);
        assert_ne!(ssu.status() & SSSR_RDRF, 0);
        assert_eq!(ssu.status() & SSSR_ORER, 0);

        // The received byte reads back once and clears RDRF.
        assert_eq!(ssu.read8(SSRDR_ADDR), 0xFF);
        assert_eq!(ssu.status() & SSSR_RDRF, 0);
    }

    #[test]
    fn prescaler_scales_with_cks() {
        let mut ssu = configured();
        ssu.write8(SSMR_ADDR, 0x01); // CKS = 1: double rate
        ssu.write8(SSTDR_ADDR, 0xA5);
        for _ in 0..1024 {
            ssu.cycle();
        }
        assert_ne!(ssu.status() & SSSR_TEND, 0);
    }

    #[test]
    fn buffered_byte_keeps_transfer_running() {
        let mut ssu = configured();
        ssu.write8(SSTDR_ADDR, 0x11);
        // Buffer a second byte mid-transfer; TDRE drops.
        for _ in 0..100 {
            ssu.cycle();
        }
        ssu.write8(SSTDR_ADDR, 0x22);
        assert_eq!(ssu.status() & SSSR_TDRE, 0);

        // End of first byte: transfer continues, TDRE set again.
        for _ in 0..1948 {
            ssu.cycle();
        }
        assert_eq!(ssu.status() & SSSR_TEND, 0);
        assert_ne!(ssu.status() & SSSR_TDRE, 0);
        assert_ne!(ssu.status() & SSSR_RDRF, 0);

        // Drain the receive register so the second byte does not overrun.
        ssu.read8(SSRDR_ADDR);

        for _ in 0..2048 {
            ssu.cycle();
        }
        assert_ne!(ssu.status() & SSSR_TEND, 0);
        assert_eq!(ssu.status() & SSSR_ORER, 0);
    }

    #[test]
    fn unread_byte_causes_overrun() {
        let mut ssu = configured();
        ssu.write8(SSTDR_ADDR, 0x11);
        for _ in 0..100 {
            ssu.cycle();
        }
        ssu.write8(SSTDR_ADDR, 0x22);
        // Run both bytes to completion without ever reading SSRDR.
        for _ in 0..4096 {
            ssu.cycle();
        }
        assert_ne!(ssu.status() & SSSR_ORER, 0);

        // ORER is sticky until software clears it through SSSR.
        ssu.read8(SSRDR_ADDR);
        assert_ne!(ssu.status() & SSSR_ORER, 0);
        ssu.write8(SSSR_ADDR, !SSSR_ORER);
        assert_eq!(ssu.status() & SSSR_ORER, 0);
    }

    #[test]
    fn sssr_writes_can_only_clear() {
        let mut ssu = configured();
        ssu.write8(SSTDR_ADDR, 0x01);
        for _ in 0..2048 {
            ssu.cycle();
        }
        let before = ssu.status();
        // Writing all ones keeps every bit; writing zero clears them.
        ssu.write8(SSSR_ADDR, 0xFF);
        assert_eq!(ssu.status(), before);
        ssu.write8(SSSR_ADDR, 0x00);
        assert_eq!(ssu.status(), 0x00);
    }

    #[test]
    fn read_masks_hide_reserved_bits() {
        let mut ssu = Ssu::new();
        ssu.write8(SSCRL_ADDR, 0xFF);
        ssu.write8(SSMR_ADDR, 0xFF);
        ssu.write8(SSER_ADDR, 0xFF);
        assert_eq!(ssu.read8(SSCRL_ADDR), 0x78);
        assert_eq!(ssu.read8(SSMR_ADDR), 0xE7);
        assert_eq!(ssu.read8(SSER_ADDR), 0xEF);
        // SSSR mask: write-0-to-clear limits the stored value anyway
        assert_eq!(ssu.read8(SSSR_ADDR) & !0x4F, 0);
    }

    #[test]
    fn tdr_reads_back_written_value() {
        let mut ssu = configured();
        ssu.write8(SSTDR_ADDR, 0x5A);
        assert_eq!(ssu.read8(SSTDR_ADDR), 0x5A);
    }
}
