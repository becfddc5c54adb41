//! Header/payload fixtures encoded exactly as the files lay them out
//!
//! Shared by the unit tests, the integration tests and the benches so there
//! is a single encoder to keep in step with the decoder.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Raw header fields and agent names of one result
#[derive(Debug, Clone)]
pub struct ResultFixture {
    pub version: i32,
    pub min_stage: i32,
    pub max_stage: i32,
    pub scenarios: i32,
    pub varies_by_scenario: bool,
    pub varies_by_block: bool,
    pub block_kind: i32,
    pub stage_kind: i32,
    pub case_initial_stage: i32,
    pub initial_year: i32,
    pub units_raw: [u8; 7],
    pub max_name_length: i32,
    pub stage_offsets: Vec<i32>,
    pub agent_names: Vec<Vec<u8>>,
}

/// Values stored at (2, 10, 1) of the thermal result
pub const THERMAL_SAMPLE: [f32; 3] = [7.44, 0.744, 0.368_069_32];

impl ResultFixture {
    /// Twelve monthly stages, fifty scenarios, one block, three agents
    pub fn thermal() -> Self {
        Self {
            version: 2,
            min_stage: 1,
            max_stage: 12,
            scenarios: 50,
            varies_by_scenario: true,
            varies_by_block: false,
            block_kind: 0,
            stage_kind: 2,
            case_initial_stage: 1,
            initial_year: 2013,
            units_raw: *b"GWh\0\0\0\0",
            max_name_length: 12,
            stage_offsets: (0..=12).collect(),
            agent_names: vec![
                b"Thermal 1 ".to_vec(),
                b"Thermal 2 ".to_vec(),
                b"Thermal 3 ".to_vec(),
            ],
        }
    }

    /// Three weekly stages with 3, 2 and 4 hours, two scenarios, two agents
    pub fn hourly() -> Self {
        Self {
            version: 2,
            min_stage: 1,
            max_stage: 3,
            scenarios: 2,
            varies_by_scenario: true,
            varies_by_block: true,
            block_kind: 1,
            stage_kind: 1,
            case_initial_stage: 5,
            initial_year: 2020,
            units_raw: *b"m3/s\0\0\0",
            max_name_length: 8,
            stage_offsets: vec![0, 3, 5, 9],
            agent_names: vec![b"Plant A".to_vec(), b"Plant B".to_vec()],
        }
    }

    /// Four weekly stages of 168 hours, three scenarios, two agents
    pub fn weekly_hours() -> Self {
        Self {
            version: 2,
            min_stage: 1,
            max_stage: 4,
            scenarios: 3,
            varies_by_scenario: true,
            varies_by_block: true,
            block_kind: 1,
            stage_kind: 1,
            case_initial_stage: 1,
            initial_year: 2024,
            units_raw: *b"m3/s   ",
            max_name_length: 24,
            stage_offsets: vec![0, 168, 336, 504, 672],
            agent_names: vec![b"Furnas".to_vec(), b"Itumbiara".to_vec()],
        }
    }

    /// Header bytes in on-disk field order
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let put = |out: &mut Vec<u8>, value: i32| out.extend_from_slice(&value.to_le_bytes());

        // ignored, version, ignored x2
        put(&mut out, 0);
        put(&mut out, self.version);
        put(&mut out, 0);
        put(&mut out, 0);
        put(&mut out, self.min_stage);
        put(&mut out, self.max_stage);
        put(&mut out, self.scenarios);
        put(&mut out, self.agent_names.len() as i32);
        put(&mut out, i32::from(self.varies_by_scenario));
        put(&mut out, i32::from(self.varies_by_block));
        put(&mut out, self.block_kind);
        put(&mut out, self.stage_kind);
        put(&mut out, self.case_initial_stage);
        put(&mut out, self.initial_year);
        out.extend_from_slice(&self.units_raw);
        put(&mut out, self.max_name_length);

        // offsets table, bracketed by two ignored words before and one after
        put(&mut out, 0);
        put(&mut out, 0);
        for &offset in &self.stage_offsets {
            put(&mut out, offset);
        }
        put(&mut out, 0);

        // length-prefixed names, each followed by an ignored word
        for name in &self.agent_names {
            put(&mut out, name.len() as i32);
            out.extend_from_slice(name);
            put(&mut out, 0);
        }
        out
    }

    /// Payload in file order, `value(stage, scenario, block, agent)` per field
    pub fn payload_bytes(&self, value: impl Fn(i32, i32, i32, usize) -> f32) -> Vec<u8> {
        let scenarios = if self.varies_by_scenario { self.scenarios } else { 1 };
        let mut out = Vec::new();
        for (delta, stage) in (self.min_stage..=self.max_stage).enumerate() {
            let blocks = if self.varies_by_block {
                self.stage_offsets[delta + 1] - self.stage_offsets[delta]
            } else {
                1
            };
            for scenario in 1..=scenarios {
                for block in 1..=blocks {
                    for agent in 0..self.agent_names.len() {
                        out.extend_from_slice(&value(stage, scenario, block, agent).to_le_bytes());
                    }
                }
            }
        }
        out
    }

    /// Write `<name>.hdr` and `<name>.bin`, returning the extensionless path
    pub fn write_split(
        &self,
        dir: &Path,
        name: &str,
        value: impl Fn(i32, i32, i32, usize) -> f32,
    ) -> PathBuf {
        let base = dir.join(name);
        fs::write(base.with_extension("hdr"), self.header_bytes()).unwrap();
        fs::write(base.with_extension("bin"), self.payload_bytes(value)).unwrap();
        base
    }

    /// Write `<name>.dat` holding header then payload
    pub fn write_combined(
        &self,
        dir: &Path,
        name: &str,
        value: impl Fn(i32, i32, i32, usize) -> f32,
    ) -> PathBuf {
        let path = dir.join(name).with_extension("dat");
        let mut bytes = self.header_bytes();
        bytes.extend(self.payload_bytes(value));
        fs::write(&path, bytes).unwrap();
        path
    }
}

/// Distinct value per coordinate
pub fn coordinate_value(stage: i32, scenario: i32, block: i32, agent: usize) -> f32 {
    (stage * 100_000 + scenario * 1_000 + block) as f32 + agent as f32 / 4.0
}

/// [`coordinate_value`], with the sample record at (2, 10, 1)
pub fn thermal_value(stage: i32, scenario: i32, block: i32, agent: usize) -> f32 {
    if (stage, scenario, block) == (2, 10, 1) {
        THERMAL_SAMPLE[agent]
    } else {
        coordinate_value(stage, scenario, block, agent)
    }
}
