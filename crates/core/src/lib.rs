//! Shared emulator building blocks: the traits frontends drive a machine
//! through, the framebuffer container, the H8/300H interpreter and the
//! logging facility.

pub mod cpu_h8300h;
pub mod logging;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// One rendered frame: 32-bit RGBA pixels in row-major order.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        /// A black frame of the given dimensions.
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }

        /// Wrap an existing pixel buffer. The length must match the
        /// dimensions.
        pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Self {
            debug_assert_eq!(pixels.len(), (width * height) as usize);
            Self {
                width,
                height,
                pixels,
            }
        }
    }
}

use serde_json::Value;

/// An instruction-stepped CPU core.
///
/// `step` executes one instruction and reports how far the machine
/// advanced. The cores in this workspace are instruction-stepped rather
/// than cycle-accurate, so the unit is instructions.
pub trait Cpu {
    fn reset(&mut self);
    fn step(&mut self) -> u32;
}

/// A complete emulated machine as a frontend holds it: reset it, run it a
/// frame at a time, snapshot and restore its state as JSON.
pub trait System {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return to power-on state.
    fn reset(&mut self);

    /// Run until the next frame boundary and hand back the framebuffer.
    fn step_frame(&mut self) -> Result<types::Frame, Self::Error>;

    /// Snapshot the machine state for save states and debugging.
    fn save_state(&self) -> Value;

    /// Restore a snapshot produced by `save_state`.
    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error>;
}
