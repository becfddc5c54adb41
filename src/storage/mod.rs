//! Header/payload result file format

mod format;
mod header;
mod layout;
mod offset;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use format::{BlockKind, StageKind, LEGACY_VERSION, UNITS_LEN, WORD_SIZE};
pub use header::{decode_header, Header};
pub use layout::{open_file_set, FileSet};
pub use offset::{blocks_in_stage, record_index, record_offset, Coordinate, Coordinates};
pub use session::{BinarySession, PayloadMode};

use crate::Result;

/// Validate the structural invariants of a decoded header
///
/// # Errors
///
/// Returns error if the offsets table has the wrong length, decreases, or
/// yields a stage without blocks
pub fn validate_header(header: &Header) -> Result<()> {
    let expected = i64::from(header.max_stage) - i64::from(header.min_stage) + 2;
    if header.stage_offsets.len() as i64 != expected {
        return Err(crate::GrafError::InvalidFormat(format!(
            "Stage offsets table has {} entries, expected {expected}",
            header.stage_offsets.len()
        )));
    }

    if header.scenario_count < 1 {
        return Err(crate::GrafError::InvalidFormat(format!(
            "Scenario count {} must be positive",
            header.scenario_count
        )));
    }

    let min_step = i64::from(header.varies_by_block);
    for (i, pair) in header.stage_offsets.windows(2).enumerate() {
        if i64::from(pair[1]) - i64::from(pair[0]) < min_step {
            return Err(crate::GrafError::InvalidFormat(format!(
                "Stage offsets not increasing at stage {}: {} then {}",
                i64::from(header.min_stage) + i as i64,
                pair[0],
                pair[1]
            )));
        }
    }

    Ok(())
}
