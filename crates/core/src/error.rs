//! Error kinds shared by every decoder in the workspace.

use std::fmt;
use thiserror::Error;

/// Size constraint a region failed to meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRequirement {
    Exactly(usize),
    AtLeast(usize),
}

impl fmt::Display for SizeRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeRequirement::Exactly(n) => write!(f, "expected exactly {} bytes", n),
            SizeRequirement::AtLeast(n) => write!(f, "expected at least {} bytes", n),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{region}: invalid size {actual} ({requirement})")]
    InvalidInputSize {
        region: &'static str,
        requirement: SizeRequirement,
        actual: usize,
    },

    #[error("{region}: region is present but carries no data")]
    EmptyData { region: &'static str },

    #[error("{what} index {index} out of range (limit {limit})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("Unsupported system: {0}")]
    UnsupportedSystem(String),
}

impl DecodeError {
    pub fn exact_size(region: &'static str, expected: usize, actual: usize) -> Self {
        DecodeError::InvalidInputSize {
            region,
            requirement: SizeRequirement::Exactly(expected),
            actual,
        }
    }

    pub fn min_size(region: &'static str, minimum: usize, actual: usize) -> Self {
        DecodeError::InvalidInputSize {
            region,
            requirement: SizeRequirement::AtLeast(minimum),
            actual,
        }
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;
