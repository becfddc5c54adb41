//! Payload sessions
//!
//! A session owns one handle to a payload file and reads whole records by
//! coordinate. Sessions are cheap; open one per concurrent reader instead of
//! sharing one behind a lock.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::format::WORD_SIZE;
use super::offset::{blocks_in_stage, record_offset, Coordinate};
use super::Header;
use crate::codec::TextEncoding;
use crate::config::LimitsConfig;
use crate::{GrafError, Result};

/// Where the payload starts relative to the file it lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// Payload-only file (`.bin`), records start at byte 0
    Separate,
    /// Header and payload share one file (`.dat`), records start right after the header
    Combined,
}

impl PayloadMode {
    fn base_offset(self, header: &Header) -> u64 {
        match self {
            Self::Separate => 0,
            Self::Combined => header.payload_base_offset,
        }
    }
}

/// Open payload file bound to a decoded header
#[derive(Debug)]
pub struct BinarySession<R = File> {
    inner: Option<R>,
    path: PathBuf,
    header: Arc<Header>,
    mode: PayloadMode,
    base: u64,
    buffer: Vec<f32>,
}

impl BinarySession<File> {
    /// Open a payload file in the given mode
    ///
    /// # Errors
    ///
    /// Returns `Open` if the file cannot be opened
    pub fn open(path: &Path, header: Arc<Header>, mode: PayloadMode) -> Result<Self> {
        let file = File::open(path).map_err(|source| GrafError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(file, path, header, mode))
    }

    /// Open a payload-only file, records start at byte 0
    ///
    /// # Errors
    ///
    /// Returns `Open` if the file cannot be opened
    pub fn open_separate(path: &Path, header: Arc<Header>) -> Result<Self> {
        Self::open(path, header, PayloadMode::Separate)
    }

    /// Reopen the single file `header` was decoded from
    ///
    /// # Errors
    ///
    /// Returns `Open` if the file cannot be opened
    pub fn open_combined(path: &Path, header: Arc<Header>) -> Result<Self> {
        Self::open(path, header, PayloadMode::Combined)
    }

    /// Decode the header of a single-file layout and keep its handle for the payload
    ///
    /// # Errors
    ///
    /// Returns any error of [`Header::read_from`], or `Open` if the file
    /// cannot be opened
    pub fn decode_combined(
        path: &Path,
        encoding: TextEncoding,
        limits: &LimitsConfig,
    ) -> Result<(Arc<Header>, Self)> {
        let file = File::open(path).map_err(|source| GrafError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        let header = Arc::new(Header::read_from(&mut reader, path, encoding, limits)?);
        // Buffered read-ahead is harmless, every record read seeks absolutely.
        let file = reader.into_inner();
        let session = Self::from_reader(file, path, Arc::clone(&header), PayloadMode::Combined);
        Ok((header, session))
    }
}

impl<R: Read + Seek> BinarySession<R> {
    /// Wrap an already open payload stream
    ///
    /// `path` only labels errors and logs.
    pub fn from_reader(reader: R, path: &Path, header: Arc<Header>, mode: PayloadMode) -> Self {
        let base = mode.base_offset(&header);
        debug!(
            "Opened payload {} ({:?}, base offset {base})",
            path.display(),
            mode
        );
        Self {
            inner: Some(reader),
            path: path.to_path_buf(),
            buffer: Vec::with_capacity(header.agent_count()),
            header,
            mode,
            base,
        }
    }

    /// Read the record at a 1-based (stage, scenario, block)
    ///
    /// The returned slice is overwritten by the next read; copy it to keep it.
    ///
    /// # Errors
    ///
    /// Returns `Closed` after [`close`](Self::close), `OutOfRange` for
    /// coordinates outside the header, and `Truncated` if the payload ends
    /// before the record does
    pub fn read(&mut self, stage: i32, scenario: i32, block: i32) -> Result<&[f32]> {
        self.read_at(Coordinate::new(stage, scenario, block))
    }

    /// Read the record at a coordinate
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read)
    pub fn read_at(&mut self, coordinate: Coordinate) -> Result<&[f32]> {
        let reader = self.inner.as_mut().ok_or(GrafError::Closed)?;
        let offset = record_offset(&self.header, self.base, coordinate)?;

        self.buffer.clear();
        self.buffer.resize(self.header.agent_count(), 0.0);
        read_floats(reader, offset, &mut self.buffer, &self.path)?;

        debug!(
            "Read {:?} at byte {offset} from {}",
            coordinate,
            self.path.display()
        );
        Ok(&self.buffer)
    }

    /// Read every block of one (stage, scenario), one vector per agent
    ///
    /// Each inner vector holds the agent's value for blocks `1..=blocks(stage)`.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read), with the block dimension implied. A stage
    /// larger than what remains of the payload is `Truncated` before anything
    /// is allocated for it.
    pub fn read_blocks(&mut self, stage: i32, scenario: i32) -> Result<Vec<Vec<f32>>> {
        let reader = self.inner.as_mut().ok_or(GrafError::Closed)?;
        let offset = record_offset(&self.header, self.base, Coordinate::new(stage, scenario, 1))?;
        let blocks = usize::try_from(blocks_in_stage(&self.header, stage)?).unwrap_or(0);
        let agents = self.header.agent_count();

        let count = blocks
            .checked_mul(agents)
            .filter(|count| count.checked_mul(WORD_SIZE).is_some())
            .ok_or_else(|| {
                GrafError::InvalidFormat(format!(
                    "stage {stage} holds {blocks} blocks of {agents} agents, too large to address"
                ))
            })?;
        let requested = count * WORD_SIZE;

        // The payload must hold the whole stage before the buffer is sized from it
        let available = reader.seek(SeekFrom::End(0))?.saturating_sub(offset);
        if u64::try_from(requested).map_or(true, |bytes| bytes > available) {
            return Err(GrafError::Truncated {
                requested,
                path: self.path.clone(),
                source: None,
            });
        }

        let mut values = vec![0.0f32; count];
        read_floats(reader, offset, &mut values, &self.path)?;

        let per_agent = (0..agents)
            .map(|agent| values.iter().skip(agent).step_by(agents.max(1)).copied().collect())
            .collect();
        Ok(per_agent)
    }

    /// Number of blocks in a 1-based stage
    ///
    /// # Errors
    ///
    /// Returns `Closed` after [`close`](Self::close), or `OutOfRange` for an
    /// unknown stage
    pub fn blocks(&self, stage: i32) -> Result<i32> {
        if self.inner.is_none() {
            return Err(GrafError::Closed);
        }
        blocks_in_stage(&self.header, stage)
    }

    /// Release the payload handle; calling it again is a no-op
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            info!("Closed payload {}", self.path.display());
        } else {
            debug!("Payload {} already closed", self.path.display());
        }
    }

    /// Whether the handle is still held
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Header used for addressing
    #[must_use]
    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    /// Agent names, in record column order
    #[must_use]
    pub fn agent_names(&self) -> &[String] {
        self.header.agent_names()
    }

    /// Payload addressing mode
    #[must_use]
    pub fn mode(&self) -> PayloadMode {
        self.mode
    }

    /// Byte offset of the first record
    #[must_use]
    pub fn base_offset(&self) -> u64 {
        self.base
    }

    /// Path of the payload file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Seek to `offset` and fill `out` with little-endian floats
fn read_floats<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    out: &mut [f32],
    path: &Path,
) -> Result<()> {
    reader.seek(SeekFrom::Start(offset))?;
    let bytes: &mut [u8] = bytemuck::cast_slice_mut(out);
    let requested = bytes.len();
    reader
        .read_exact(bytes)
        .map_err(|err| GrafError::truncated(requested, path, err))?;
    debug_assert_eq!(requested, out.len() * WORD_SIZE);
    for value in out.iter_mut() {
        *value = f32::from_bits(u32::from_le(value.to_bits()));
    }
    Ok(())
}
