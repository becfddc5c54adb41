#[path = "../tests/common/mod.rs"]
mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::ResultFixture;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graf::{decode_header, BinarySession, TextEncoding};
use tempfile::TempDir;

const STAGES: i32 = 60;
const SCENARIOS: i32 = 200;
const AGENTS: usize = 150;

fn write_result(dir: &Path) -> PathBuf {
    let mut fixture = ResultFixture::thermal();
    fixture.max_stage = STAGES;
    fixture.scenarios = SCENARIOS;
    fixture.units_raw = *b"MW\0\0\0\0\0";
    fixture.stage_offsets = (0..=STAGES).collect();
    fixture.agent_names = (0..AGENTS)
        .map(|agent| format!("Agent {agent:>5}").into_bytes())
        .collect();
    fixture.write_split(dir, "bench", |stage, scenario, _, agent| {
        ((stage * SCENARIOS + scenario) as usize * AGENTS + agent) as f32
    })
}

fn bench_decode_header(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let path = write_result(dir.path()).with_extension("hdr");

    c.bench_function("decode_header_150_agents", |b| {
        b.iter(|| decode_header(black_box(&path), TextEncoding::latin_1()).unwrap());
    });
}

fn bench_random_reads(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let base = write_result(dir.path());
    let header =
        Arc::new(decode_header(&base.with_extension("hdr"), TextEncoding::latin_1()).unwrap());
    let mut session = BinarySession::open_separate(&base.with_extension("bin"), header).unwrap();

    c.bench_function("read_record_scattered", |b| {
        let mut i = 0i32;
        b.iter(|| {
            i = i.wrapping_add(7919);
            let stage = 1 + i.rem_euclid(STAGES);
            let scenario = 1 + i.rem_euclid(SCENARIOS);
            let record = session.read(black_box(stage), black_box(scenario), 1).unwrap();
            black_box(record[0]);
        });
    });

    c.bench_function("read_all_scenarios_of_stage", |b| {
        b.iter(|| {
            for scenario in 1..=SCENARIOS {
                black_box(session.read(30, scenario, 1).unwrap()[AGENTS - 1]);
            }
        });
    });
}

criterion_group!(benches, bench_decode_header, bench_random_reads);
criterion_main!(benches);
