//! Header decoding
//!
//! The header is a flat sequence of 4-byte little-endian integers with a
//! fixed-width units buffer, the stage offsets table and one length-prefixed
//! name per agent. It is decoded once into an immutable [`Header`].

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use super::format::{BlockKind, StageKind, LEGACY_VERSION, UNITS_LEN, WORD_SIZE};
use crate::codec::TextEncoding;
use crate::config::LimitsConfig;
use crate::{GrafError, Result};

/// Decoded header metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub(crate) version: i32,
    pub(crate) min_stage: i32,
    pub(crate) max_stage: i32,
    pub(crate) scenario_count: i32,
    pub(crate) case_initial_stage: i32,
    pub(crate) initial_year: i32,
    pub(crate) varies_by_scenario: bool,
    pub(crate) varies_by_block: bool,
    pub(crate) block_kind: BlockKind,
    pub(crate) stage_kind: StageKind,
    pub(crate) units: String,
    pub(crate) max_name_length: i32,
    pub(crate) agent_names: Vec<String>,
    pub(crate) stage_offsets: Vec<i32>,
    pub(crate) payload_base_offset: u64,
    pub(crate) encoding: TextEncoding,
}

/// Decode a header file with default limits
///
/// # Errors
///
/// Returns `Open` if the file cannot be opened, `Truncated` if it ends before
/// the layout does, `InvalidFormat` on structural problems and `Decode` if a
/// name is invalid in `encoding`
pub fn decode_header(path: &Path, encoding: TextEncoding) -> Result<Header> {
    Header::decode(path, encoding, &LimitsConfig::default())
}

impl Header {
    /// Decode a header file
    ///
    /// # Errors
    ///
    /// See [`decode_header`]
    pub fn decode(path: &Path, encoding: TextEncoding, limits: &LimitsConfig) -> Result<Self> {
        let file = File::open(path).map_err(|source| GrafError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, path, encoding, limits)
    }

    /// Decode a header from any byte stream positioned at its first field
    ///
    /// `path` only labels errors. On success the stream is left just past the
    /// last agent record, and that position is stored as the payload base
    /// offset for single-file layouts.
    ///
    /// # Errors
    ///
    /// See [`decode_header`]
    pub fn read_from<R: Read>(
        reader: &mut R,
        path: &Path,
        encoding: TextEncoding,
        limits: &LimitsConfig,
    ) -> Result<Self> {
        let mut fields = FieldReader::new(reader, path);

        fields.skip_word()?;
        let version = fields.read_i32()?;
        fields.skip_word()?;
        fields.skip_word()?;
        let min_stage = fields.read_i32()?;
        let max_stage = fields.read_i32()?;
        let raw_scenarios = fields.read_i32()?;
        let agent_total = fields.read_i32()?;
        let varies_by_scenario = fields.read_i32()? == 1;
        let varies_by_block = fields.read_i32()? == 1;
        let block_code = fields.read_i32()?;
        let stage_code = fields.read_i32()?;
        let case_initial_stage = fields.read_i32()?;
        let initial_year = fields.read_i32()?;
        let units_raw = fields.read_bytes(UNITS_LEN)?;
        let max_name_length = fields.read_i32()?;

        if version == LEGACY_VERSION {
            warn!("Header version {version} uses the legacy layout, decoding anyway");
        }

        let stage_count = i64::from(max_stage) - i64::from(min_stage) + 1;
        if stage_count < 1 {
            return Err(GrafError::InvalidFormat(format!(
                "max_stage {max_stage} precedes min_stage {min_stage}"
            )));
        }
        let stage_count = usize::try_from(stage_count)
            .ok()
            .filter(|&count| count <= limits.max_stages)
            .ok_or_else(|| {
                GrafError::InvalidFormat(format!(
                    "{stage_count} stages exceeds limit of {}",
                    limits.max_stages
                ))
            })?;
        let agent_total = usize::try_from(agent_total).map_err(|_| {
            GrafError::InvalidFormat(format!("negative agent count {agent_total}"))
        })?;
        if agent_total > limits.max_agents {
            return Err(GrafError::InvalidFormat(format!(
                "{agent_total} agents exceeds limit of {}",
                limits.max_agents
            )));
        }

        let scenario_count = if varies_by_scenario {
            if raw_scenarios < 1 {
                return Err(GrafError::InvalidFormat(format!(
                    "scenario count {raw_scenarios} must be positive"
                )));
            }
            raw_scenarios
        } else {
            1
        };

        let stage_kind = StageKind::from_code(stage_code).unwrap_or_else(|| {
            warn!("Unknown stage kind code {stage_code}, assuming monthly stages");
            StageKind::Monthly
        });

        let units_raw = match units_raw.iter().position(|&b| b == 0) {
            Some(nul) => &units_raw[..nul],
            None => &units_raw[..],
        };
        let units = encoding.decode_trimmed(units_raw)?;

        // Offsets table, bracketed by two ignored words before and one after
        fields.skip_word()?;
        fields.skip_word()?;
        let table_len = stage_count + 1;
        let mut stage_offsets = Vec::with_capacity(table_len);
        for _ in 0..table_len {
            stage_offsets.push(fields.read_i32()?);
        }
        fields.skip_word()?;

        let mut agent_names = Vec::with_capacity(agent_total);
        for index in 0..agent_total {
            let length = fields.read_i32()?;
            let length = usize::try_from(length)
                .ok()
                .filter(|&len| len <= limits.max_name_length)
                .ok_or_else(|| {
                    GrafError::InvalidFormat(format!(
                        "agent {index} name length {length} outside 0..={}",
                        limits.max_name_length
                    ))
                })?;
            let raw = fields.read_bytes(length)?;
            agent_names.push(encoding.decode_trimmed(&raw)?);
            fields.skip_word()?;
        }

        let header = Self {
            version,
            min_stage,
            max_stage,
            scenario_count,
            case_initial_stage,
            initial_year,
            varies_by_scenario,
            varies_by_block,
            block_kind: BlockKind::from_code(block_code),
            stage_kind,
            units,
            max_name_length,
            agent_names,
            stage_offsets,
            payload_base_offset: fields.position(),
            encoding,
        };
        super::validate_header(&header)?;

        if header.varies_by_block {
            let widest = header
                .stage_offsets
                .windows(2)
                .map(|pair| i64::from(pair[1]) - i64::from(pair[0]))
                .max()
                .unwrap_or(0);
            if widest > i64::try_from(limits.max_blocks).unwrap_or(i64::MAX) {
                return Err(GrafError::InvalidFormat(format!(
                    "{widest} blocks in one stage exceeds limit of {}",
                    limits.max_blocks
                )));
            }
        }

        debug!(
            "Decoded header {}: stages {}..={}, {} scenarios, {} agents, payload at {}",
            path.display(),
            header.min_stage,
            header.max_stage,
            header.scenario_count,
            header.agent_count(),
            header.payload_base_offset
        );

        Ok(header)
    }

    /// Header layout version
    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// First stage number
    #[must_use]
    pub fn min_stage(&self) -> i32 {
        self.min_stage
    }

    /// Last stage number
    #[must_use]
    pub fn max_stage(&self) -> i32 {
        self.max_stage
    }

    /// Number of stages (`max_stage - min_stage + 1`)
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stage_offsets.len() - 1
    }

    /// Number of scenarios, 1 when values do not vary by scenario
    #[must_use]
    pub fn scenario_count(&self) -> i32 {
        self.scenario_count
    }

    /// Initial stage of the study case
    #[must_use]
    pub fn case_initial_stage(&self) -> i32 {
        self.case_initial_stage
    }

    /// Initial year of the study case
    #[must_use]
    pub fn initial_year(&self) -> i32 {
        self.initial_year
    }

    /// Whether values differ per scenario
    #[must_use]
    pub fn varies_by_scenario(&self) -> bool {
        self.varies_by_scenario
    }

    /// Whether stages have more than one block
    #[must_use]
    pub fn varies_by_block(&self) -> bool {
        self.varies_by_block
    }

    /// Intra-stage subdivision kind
    #[must_use]
    pub fn block_kind(&self) -> BlockKind {
        self.block_kind
    }

    /// Stage period kind
    #[must_use]
    pub fn stage_kind(&self) -> StageKind {
        self.stage_kind
    }

    /// Units label
    #[must_use]
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Stored maximum name length (informational)
    #[must_use]
    pub fn max_name_length(&self) -> i32 {
        self.max_name_length
    }

    /// Agent names, in record column order
    #[must_use]
    pub fn agent_names(&self) -> &[String] {
        &self.agent_names
    }

    /// Number of values per record
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agent_names.len()
    }

    /// Cumulative block table, `stage_count() + 1` entries
    #[must_use]
    pub fn stage_offsets(&self) -> &[i32] {
        &self.stage_offsets
    }

    /// Byte position just past the header in the file it was decoded from
    #[must_use]
    pub fn payload_base_offset(&self) -> u64 {
        self.payload_base_offset
    }

    /// Encoding used for names and units
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Size in bytes of one record
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.agent_count() * WORD_SIZE
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Header data:")?;
        writeln!(f, "  Binary file version: {}", self.version)?;
        writeln!(f, "  First stage: {}", self.min_stage)?;
        writeln!(f, "  Number of stages: {}", self.stage_count())?;
        writeln!(f, "  Number of scenarios: {}", self.scenario_count)?;
        writeln!(f, "  Number of agents: {}", self.agent_count())?;
        writeln!(f, "  Varies per scenario: {}", self.varies_by_scenario)?;
        writeln!(f, "  Varies per block/hour: {}", self.varies_by_block)?;
        writeln!(f, "  Type of data: {}", self.block_kind)?;
        writeln!(f, "  Type of stage: {}", self.stage_kind)?;
        writeln!(f, "  Initial month/week: {}", self.case_initial_stage)?;
        writeln!(f, "  Initial year: {}", self.initial_year)?;
        writeln!(f, "  Units: {}", self.units)?;
        write!(f, "  Stored name length: {}", self.max_name_length)
    }
}

/// Sequential reader of fixed-width header fields
struct FieldReader<'a, R> {
    inner: &'a mut R,
    path: &'a Path,
    position: u64,
}

impl<'a, R: Read> FieldReader<'a, R> {
    fn new(inner: &'a mut R, path: &'a Path) -> Self {
        Self {
            inner,
            path,
            position: 0,
        }
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn read_word(&mut self) -> Result<[u8; WORD_SIZE]> {
        let mut word = [0u8; WORD_SIZE];
        self.fill(&mut word)?;
        Ok(word)
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.read_word().map(i32::from_le_bytes)
    }

    fn skip_word(&mut self) -> Result<()> {
        self.read_word().map(drop)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner
            .read_exact(buf)
            .map_err(|err| GrafError::truncated(buf.len(), self.path, err))?;
        self.position += buf.len() as u64;
        Ok(())
    }
}
