//! On-chip SRAM: 2 KiB mapped at 0xF780-0xFF7F.

use serde::{Deserialize, Serialize};

/// First RAM address on the bus
pub const RAM_BASE: u16 = 0xF780;
/// RAM size in bytes
pub const RAM_SIZE: usize = 2048;

mod serde_arrays {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(arr: &[u8; super::RAM_SIZE], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        arr.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; super::RAM_SIZE], D::Error>
    where
        D: Deserializer<'de>,
    {
        let vec = Vec::<u8>::deserialize(deserializer)?;
        if vec.len() != super::RAM_SIZE {
            return Err(serde::de::Error::invalid_length(vec.len(), &"2048 bytes"));
        }
        let mut arr = [0u8; super::RAM_SIZE];
        arr.copy_from_slice(&vec);
        Ok(arr)
    }
}

/// On-chip SRAM state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ram {
    #[serde(with = "serde_arrays")]
    data: [u8; RAM_SIZE],
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    pub fn new() -> Self {
        Self {
            data: [0; RAM_SIZE],
        }
    }

    /// Zero the RAM contents
    pub fn reset(&mut self) {
        self.data = [0; RAM_SIZE];
    }

    pub fn read8(&self, addr: u16) -> u8 {
        self.data[(addr - RAM_BASE) as usize]
    }

    /// Big-endian word read; the caller does not have to align the address.
    pub fn read16(&self, addr: u16) -> u16 {
        let idx = (addr - RAM_BASE) as usize;
        ((self.data[idx] as u16) << 8) | self.data[idx + 1] as u16
    }

    pub fn write8(&mut self, addr: u16, val: u8) {
        self.data[(addr - RAM_BASE) as usize] = val;
    }

    pub fn write16(&mut self, addr: u16, val: u16) {
        let idx = (addr - RAM_BASE) as usize;
        self.data[idx] = (val >> 8) as u8;
        self.data[idx + 1] = val as u8;
    }
}
