//! Flat 64 KiB address space owned by the base machine.

/// Size in bytes of the flat architectural address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;

/// Allocates a canonical zeroed 64 KiB address-space backing store.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; ADDRESS_SPACE_BYTES].into_boxed_slice()
}

/// Byte-addressable memory indexed by a 16-bit address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpace {
    bytes: Box<[u8]>,
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressSpace {
    /// Creates a zero-filled address space.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: new_address_space(),
        }
    }

    /// Reads the byte at `addr`.
    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[usize::from(addr)]
    }

    /// Writes the byte at `addr`.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[usize::from(addr)] = value;
    }

    /// Zeroes every byte.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Copies `image` starting at `offset`, wrapping past the top of memory.
    pub fn load_at(&mut self, offset: u16, image: &[u8]) {
        let mut addr = offset;
        for byte in image {
            self.write(addr, *byte);
            addr = addr.wrapping_add(1);
        }
    }

    /// Returns the full backing store.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}
