//! Binary format constants and enumerated header codes

use std::fmt;

/// Size of every scalar on disk (i32 fields and f32 payload values)
pub const WORD_SIZE: usize = 4;

/// Raw width of the units buffer
pub const UNITS_LEN: usize = 7;

/// Header version of the legacy layout, decoded but not validated against
pub const LEGACY_VERSION: i32 = 1;

static_assertions::const_assert_eq!(std::mem::size_of::<i32>(), WORD_SIZE);
static_assertions::const_assert_eq!(std::mem::size_of::<f32>(), WORD_SIZE);

/// Intra-stage subdivision kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum BlockKind {
    /// Load blocks
    Block = 0,
    /// Hours
    Hour = 1,
}

impl BlockKind {
    /// Decode the on-disk code (0 is `Block`, anything else `Hour`)
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            Self::Block
        } else {
            Self::Hour
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => f.write_str("Block"),
            Self::Hour => f.write_str("Hour"),
        }
    }
}

/// Stage period kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StageKind {
    /// Weekly stages
    Weekly = 1,
    /// Monthly stages
    Monthly = 2,
}

impl StageKind {
    /// Decode the on-disk code, `None` for unknown codes
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Weekly),
            2 => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => f.write_str("Weekly"),
            Self::Monthly => f.write_str("Monthly"),
        }
    }
}
