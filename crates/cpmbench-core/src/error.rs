use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Rejection reasons for an in-memory program image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ImageError {
    /// The image has no bytes.
    #[error("program image is empty")]
    Empty,
    /// The image does not fit between the entry address and the top of memory.
    #[error("program image is too large ({len} bytes, at most {max} fit)")]
    TooLarge {
        /// Image length in bytes.
        len: usize,
        /// Largest loadable length in bytes.
        max: usize,
    },
}

/// Fatal failures while loading a program file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened.
    #[error("cannot open file '{}': {source}", path.display())]
    Open {
        /// Path as given by the caller.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file was opened but reading it failed.
    #[error("cannot read file '{}': {source}", path.display())]
    Read {
        /// Path as given by the caller.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file holds no bytes.
    #[error("program file '{}' is empty", path.display())]
    Empty {
        /// Path as given by the caller.
        path: PathBuf,
    },
    /// The file does not fit between the entry address and the top of memory.
    #[error("program file '{}' is too large", path.display())]
    TooLarge {
        /// Path as given by the caller.
        path: PathBuf,
    },
}

impl LoadError {
    /// Attaches `path` to an image validation failure.
    #[must_use]
    pub fn from_image(path: impl Into<PathBuf>, err: ImageError) -> Self {
        let path = path.into();
        match err {
            ImageError::Empty => Self::Empty { path },
            ImageError::TooLarge { .. } => Self::TooLarge { path },
        }
    }
}

/// An engine name that matches no [`crate::EngineKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("unknown engine '{name}'")]
pub struct UnknownEngine {
    /// The name that failed to parse.
    pub name: String,
}
