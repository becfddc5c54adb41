//! Record addressing
//!
//! Records are laid out stage by stage. Inside a stage every scenario holds
//! `blocks_in_stage` consecutive records, and each record is `agent_count`
//! consecutive floats. `stage_offsets[i]` counts the blocks of all stages
//! before stage `i`, so the first record of a stage sits at
//! `stage_offsets[i] * scenario_count`.

use super::format::WORD_SIZE;
use super::Header;
use crate::error::Dimension;
use crate::{GrafError, Result};

/// One (stage, scenario, block) address, all 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    /// Stage number, between `min_stage` and `max_stage`
    pub stage: i32,
    /// Scenario number
    pub scenario: i32,
    /// Block or hour number within the stage
    pub block: i32,
}

impl Coordinate {
    /// Create a coordinate
    #[must_use]
    pub const fn new(stage: i32, scenario: i32, block: i32) -> Self {
        Self {
            stage,
            scenario,
            block,
        }
    }
}

fn out_of_range(dimension: Dimension, value: i32, min: i32, max: i32) -> GrafError {
    GrafError::OutOfRange {
        dimension,
        value,
        min,
        max,
    }
}

/// Zero-based position of `stage` in the offsets table
fn stage_delta(header: &Header, stage: i32) -> Result<usize> {
    if stage < header.min_stage || stage > header.max_stage {
        return Err(out_of_range(
            Dimension::Stage,
            stage,
            header.min_stage,
            header.max_stage,
        ));
    }
    Ok((i64::from(stage) - i64::from(header.min_stage)) as usize)
}

fn blocks_at(header: &Header, delta: usize) -> i32 {
    if header.varies_by_block {
        header.stage_offsets[delta + 1] - header.stage_offsets[delta]
    } else {
        1
    }
}

/// Number of blocks in a 1-based stage, 1 when values do not vary by block
///
/// # Errors
///
/// Returns `OutOfRange` if the stage is outside the header's stage range
pub fn blocks_in_stage(header: &Header, stage: i32) -> Result<i32> {
    stage_delta(header, stage).map(|delta| blocks_at(header, delta))
}

/// Linear record number of a coordinate, counted in whole records
///
/// # Errors
///
/// Returns `OutOfRange` if any dimension falls outside the header's bounds,
/// or `InvalidFormat` if the offsets table places the record before the start
pub fn record_index(header: &Header, coordinate: Coordinate) -> Result<u64> {
    let delta = stage_delta(header, coordinate.stage)?;
    if coordinate.scenario < 1 || coordinate.scenario > header.scenario_count {
        return Err(out_of_range(
            Dimension::Scenario,
            coordinate.scenario,
            1,
            header.scenario_count,
        ));
    }
    let blocks = blocks_at(header, delta);
    if coordinate.block < 1 || coordinate.block > blocks {
        return Err(out_of_range(Dimension::Block, coordinate.block, 1, blocks));
    }

    let linear = i64::from(header.stage_offsets[delta]) * i64::from(header.scenario_count)
        + i64::from(blocks) * i64::from(coordinate.scenario - 1)
        + i64::from(coordinate.block - 1);
    u64::try_from(linear).map_err(|_| {
        GrafError::InvalidFormat(format!(
            "Negative record index {linear} for stage {}",
            coordinate.stage
        ))
    })
}

/// Absolute byte offset of a record in a payload starting at `base`
///
/// # Errors
///
/// See [`record_index`]
pub fn record_offset(header: &Header, base: u64, coordinate: Coordinate) -> Result<u64> {
    let index = record_index(header, coordinate)?;
    index
        .checked_mul(header.agent_count() as u64)
        .and_then(|fields| fields.checked_mul(WORD_SIZE as u64))
        .and_then(|bytes| bytes.checked_add(base))
        .ok_or_else(|| {
            GrafError::InvalidFormat(format!("Record offset overflows at {coordinate:?}"))
        })
}

/// Iterator over every valid coordinate in file order
#[derive(Debug, Clone)]
pub struct Coordinates<'a> {
    header: &'a Header,
    next: Option<Coordinate>,
}

impl Iterator for Coordinates<'_> {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Coordinate> {
        let current = self.next?;
        let header = self.header;
        let delta = (i64::from(current.stage) - i64::from(header.min_stage)) as usize;

        self.next = if current.block < blocks_at(header, delta) {
            Some(Coordinate {
                block: current.block + 1,
                ..current
            })
        } else if current.scenario < header.scenario_count {
            Some(Coordinate::new(current.stage, current.scenario + 1, 1))
        } else if current.stage < header.max_stage {
            Some(Coordinate::new(current.stage + 1, 1, 1))
        } else {
            None
        };

        Some(current)
    }
}

impl Header {
    /// Number of blocks in a 1-based stage
    ///
    /// # Errors
    ///
    /// See [`blocks_in_stage`]
    pub fn blocks(&self, stage: i32) -> Result<i32> {
        blocks_in_stage(self, stage)
    }

    /// Every valid coordinate, stage by stage, then scenario, then block
    #[must_use]
    pub fn coordinates(&self) -> Coordinates<'_> {
        Coordinates {
            header: self,
            next: Some(Coordinate::new(self.min_stage, 1, 1)),
        }
    }

    /// Total number of records in the payload
    #[must_use]
    pub fn record_count(&self) -> u64 {
        let first = i64::from(self.stage_offsets[0]);
        let last = i64::from(self.stage_offsets[self.stage_offsets.len() - 1]);
        if self.varies_by_block {
            ((last - first) * i64::from(self.scenario_count)) as u64
        } else {
            self.stage_count() as u64 * self.scenario_count as u64
        }
    }
}
