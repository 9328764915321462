//! Flat binary program images and their validation.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::{ImageError, LoadError, ADDRESS_SPACE_BYTES, ENTRY_ADDR};

/// Largest image that fits between [`ENTRY_ADDR`] and the top of memory.
pub const MAX_PROGRAM_BYTES: usize = ADDRESS_SPACE_BYTES - ENTRY_ADDR as usize;

/// A validated program image, between 1 and [`MAX_PROGRAM_BYTES`] bytes long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    bytes: Vec<u8>,
}

impl ProgramImage {
    /// Validates an in-memory image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Empty`] for a zero-length image and
    /// [`ImageError::TooLarge`] when it exceeds [`MAX_PROGRAM_BYTES`].
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, ImageError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > MAX_PROGRAM_BYTES {
            return Err(ImageError::TooLarge {
                len: bytes.len(),
                max: MAX_PROGRAM_BYTES,
            });
        }
        Ok(Self { bytes })
    }

    /// Reads and validates the image stored at `path`.
    ///
    /// At most one byte past [`MAX_PROGRAM_BYTES`] is read, enough to tell an
    /// oversized file apart without slurping it whole.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the file cannot be opened or read, or when
    /// its contents are empty or too large.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut bytes = Vec::new();
        file.take(MAX_PROGRAM_BYTES as u64 + 1)
            .read_to_end(&mut bytes)
            .map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), len = bytes.len(), "read program file");

        Self::from_bytes(bytes).map_err(|err| LoadError::from_image(path, err))
    }

    /// Image bytes in load order.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Image length in bytes; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`: empty images are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
