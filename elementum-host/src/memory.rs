//! Access to the host's linear memory.

use std::collections::HashMap;

use crate::error::HostError;

/// A growable byte region owned by the host, plus its exported scalars.
///
/// The region may be reallocated whenever it grows. Nothing outside the
/// bridge holds on to offsets into it.
pub trait ForeignMemory {
    fn byte_len(&self) -> usize;

    /// Current value of the exported global `name`: an address or a scalar.
    fn export_value(&mut self, name: &str) -> Result<u32, HostError>;

    fn bytes(&self) -> &[u8];

    fn bytes_mut(&mut self) -> &mut [u8];
}

/// Reads the little-endian `u32` at `addr`.
pub fn read_u32(mem: &dyn ForeignMemory, addr: usize) -> Result<u32, HostError> {
    let bytes = mem.bytes();
    let end = addr.checked_add(4).filter(|end| *end <= bytes.len());
    let Some(end) = end else {
        return Err(HostError::OutOfBounds {
            offset: addr,
            len: 4,
            memory: bytes.len(),
        });
    };
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[addr..end]);
    Ok(u32::from_le_bytes(word))
}

/// Plain `Vec`-backed memory. Growing it allocates a fresh buffer, the same
/// way a wasm memory may move when it grows.
#[derive(Debug, Clone, Default)]
pub struct LinearMemory {
    data: Vec<u8>,
    exports: HashMap<String, u32>,
}

impl LinearMemory {
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![0; len],
            exports: HashMap::new(),
        }
    }

    pub fn set_export(&mut self, name: &str, value: u32) {
        self.exports.insert(name.to_string(), value);
    }

    pub fn grow(&mut self, extra: usize) {
        let mut moved = Vec::with_capacity(self.data.len() + extra);
        moved.extend_from_slice(&self.data);
        moved.resize(self.data.len() + extra, 0);
        self.data = moved;
    }

    /// Panics if the range is outside the memory.
    pub fn write(&mut self, addr: usize, bytes: &[u8]) {
        self.data[addr..addr + bytes.len()].copy_from_slice(bytes);
    }

    pub fn write_u32(&mut self, addr: usize, value: u32) {
        self.write(addr, &value.to_le_bytes());
    }
}

impl ForeignMemory for LinearMemory {
    fn byte_len(&self) -> usize {
        self.data.len()
    }

    fn export_value(&mut self, name: &str) -> Result<u32, HostError> {
        self.exports
            .get(name)
            .copied()
            .ok_or_else(|| HostError::MissingExport(name.to_string()))
    }

    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
