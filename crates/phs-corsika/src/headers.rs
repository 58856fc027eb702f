//! Loader for CORSIKA run and event header blocks.
//!
//! The on-disk layout is a stream of 273-word `f32` blocks. Some CORSIKA
//! builds wrap the stream in Fortran sequential records (a 4-byte length
//! word before and after each record payload); the loader strips that
//! framing when present. Blocks are classified by the ASCII marker in
//! word 0: exactly one leading `RUNH`, then `EVTH` rows in file order,
//! terminated by `RUNE`. Particle-data, `EVTE` and `LONG` blocks are
//! skipped — only the header table matters here.

use std::borrow::Cow;
use std::path::Path;

use phs_error::{PhsError, Result};
use tracing::debug;

use crate::layout::{
    CORSIKA_BLOCK_BYTES, CORSIKA_BLOCK_FLOATS, EVTH_MARKER, HeaderLayout, RUNE_MARKER, RUNH_MARKER,
};

/// EVTH word offset of the primary particle id.
const EVTH_PARTICLE_ID: usize = 2;
/// EVTH word offset of the total primary energy in GeV.
const EVTH_TOTAL_ENERGY_GEV: usize = 3;
/// EVTH word offset of the first-interaction height in cm.
const EVTH_FIRST_INTERACTION_HEIGHT_CM: usize = 6;
/// EVTH word offset of the zenith angle in rad.
const EVTH_ZENITH_RAD: usize = 10;
/// EVTH word offset of the azimuth angle in rad.
const EVTH_AZIMUTH_RAD: usize = 11;

/// One raw 273-word CORSIKA block.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBlock {
    words: Box<[f32; CORSIKA_BLOCK_FLOATS]>,
}

impl HeaderBlock {
    /// Decode a block from exactly [`CORSIKA_BLOCK_BYTES`] little-endian bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != CORSIKA_BLOCK_BYTES {
            return Err(PhsError::structural(format!(
                "CORSIKA block must be {CORSIKA_BLOCK_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        let mut words = Box::new([0.0_f32; CORSIKA_BLOCK_FLOATS]);
        for (word, raw) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = f32::from_le_bytes(raw.try_into().expect("4-byte chunk"));
        }
        Ok(Self { words })
    }

    /// Raw word at `index`.
    #[must_use]
    pub fn word(&self, index: usize) -> f32 {
        self.words[index]
    }

    /// All 273 words of the block.
    #[must_use]
    pub fn words(&self) -> &[f32; CORSIKA_BLOCK_FLOATS] {
        &self.words
    }

    /// Identifier field: CORSIKA stores counters as integral `f32` values.
    fn id_field(&self, index: usize) -> u32 {
        self.words[index].round() as u32
    }
}

/// The RUNH block describing one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunHeader {
    block: HeaderBlock,
}

impl RunHeader {
    /// Run number under the given offset table.
    #[must_use]
    pub fn run_number(&self, layout: &HeaderLayout) -> u32 {
        self.block.id_field(layout.runh_run_number)
    }

    /// Raw block access for downstream analysis code.
    #[must_use]
    pub fn block(&self) -> &HeaderBlock {
        &self.block
    }
}

/// One EVTH block: the ground truth of one simulated air shower variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EventHeader {
    block: HeaderBlock,
}

impl EventHeader {
    /// Run number under the given offset table.
    #[must_use]
    pub fn run_number(&self, layout: &HeaderLayout) -> u32 {
        self.block.id_field(layout.evth_run_number)
    }

    /// Event number under the given offset table.
    #[must_use]
    pub fn event_number(&self, layout: &HeaderLayout) -> u32 {
        self.block.id_field(layout.evth_event_number)
    }

    /// Reuse number under the given offset table.
    #[must_use]
    pub fn reuse_number(&self, layout: &HeaderLayout) -> u32 {
        self.block.id_field(layout.evth_reuse_number)
    }

    /// CORSIKA id of the primary particle.
    #[must_use]
    pub fn particle_id(&self) -> u32 {
        self.block.id_field(EVTH_PARTICLE_ID)
    }

    /// Total energy of the primary particle in GeV.
    #[must_use]
    pub fn total_energy_gev(&self) -> f32 {
        self.block.word(EVTH_TOTAL_ENERGY_GEV)
    }

    /// Height of the first interaction in cm.
    #[must_use]
    pub fn first_interaction_height_cm(&self) -> f32 {
        self.block.word(EVTH_FIRST_INTERACTION_HEIGHT_CM)
    }

    /// Zenith angle of the primary trajectory in rad.
    #[must_use]
    pub fn zenith_rad(&self) -> f32 {
        self.block.word(EVTH_ZENITH_RAD)
    }

    /// Azimuth angle of the primary trajectory in rad.
    #[must_use]
    pub fn azimuth_rad(&self) -> f32 {
        self.block.word(EVTH_AZIMUTH_RAD)
    }

    /// Raw block access for downstream analysis code.
    #[must_use]
    pub fn block(&self) -> &HeaderBlock {
        &self.block
    }
}

/// Loader output: the run header and the ordered event-header table.
#[derive(Debug, Clone, PartialEq)]
pub struct CorsikaHeaders {
    pub run_header: RunHeader,
    pub event_headers: Vec<EventHeader>,
}

/// Read the RUNH block and all EVTH blocks from a CORSIKA run file.
///
/// The first block must be `RUNH`; `EVTH` rows are collected in file
/// order; parsing stops at `RUNE`. Everything else (particle data,
/// `EVTE`, `LONG`) is skipped.
pub fn read_corsika_headers(
    path: impl AsRef<Path>,
    layout: &HeaderLayout,
) -> Result<CorsikaHeaders> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let headers = parse_corsika_headers(&bytes, layout)?;
    debug!(
        path = %path.display(),
        run_number = headers.run_header.run_number(layout),
        event_headers = headers.event_headers.len(),
        "parsed CORSIKA headers"
    );
    Ok(headers)
}

/// Parse run and event headers from raw CORSIKA file bytes.
pub fn parse_corsika_headers(bytes: &[u8], layout: &HeaderLayout) -> Result<CorsikaHeaders> {
    if layout.max_offset() >= CORSIKA_BLOCK_FLOATS {
        return Err(PhsError::structural(format!(
            "header layout offset {} exceeds the {CORSIKA_BLOCK_FLOATS}-word block",
            layout.max_offset()
        )));
    }

    let payload = strip_fortran_records(bytes)?;
    if payload.len() % CORSIKA_BLOCK_BYTES != 0 {
        return Err(PhsError::structural(format!(
            "file is not a whole number of {CORSIKA_BLOCK_BYTES}-byte blocks \
             ({} trailing bytes)",
            payload.len() % CORSIKA_BLOCK_BYTES
        )));
    }

    let mut run_header: Option<RunHeader> = None;
    let mut event_headers = Vec::new();

    for (block_no, raw) in payload.chunks_exact(CORSIKA_BLOCK_BYTES).enumerate() {
        let marker = u32::from_le_bytes(raw[..4].try_into().expect("4-byte marker"));
        match marker {
            RUNH_MARKER => {
                if run_header.is_some() {
                    return Err(PhsError::structural(format!(
                        "second RUNH block at block {block_no}"
                    )));
                }
                if block_no != 0 {
                    return Err(PhsError::structural(format!(
                        "RUNH must be the first block, found at block {block_no}"
                    )));
                }
                run_header = Some(RunHeader {
                    block: HeaderBlock::from_bytes(raw)?,
                });
            }
            EVTH_MARKER => {
                if run_header.is_none() {
                    return Err(PhsError::structural(format!(
                        "EVTH at block {block_no} before any RUNH"
                    )));
                }
                event_headers.push(EventHeader {
                    block: HeaderBlock::from_bytes(raw)?,
                });
            }
            RUNE_MARKER => break,
            // EVTE, LONG, and unmarked particle-data blocks.
            _ => {}
        }
    }

    let run_header =
        run_header.ok_or_else(|| PhsError::structural("no RUNH block in file"))?;
    Ok(CorsikaHeaders {
        run_header,
        event_headers,
    })
}

/// Strip Fortran sequential-record framing when present.
///
/// A framed file is a sequence of `[len: u32][payload][len: u32]`
/// records. Bare block streams are already a whole number of blocks;
/// anything else must parse as records or the file is corrupt.
fn strip_fortran_records(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    if bytes.len() % CORSIKA_BLOCK_BYTES == 0 {
        return Ok(Cow::Borrowed(bytes));
    }

    let mut payload = Vec::with_capacity(bytes.len());
    let mut cursor = 0_usize;
    while cursor < bytes.len() {
        if bytes.len() - cursor < 4 {
            return Err(PhsError::structural(format!(
                "truncated Fortran record head at byte {cursor}"
            )));
        }
        let head =
            u32::from_le_bytes(bytes[cursor..cursor + 4].try_into().expect("4-byte head"));
        let record_len = usize::try_from(head).map_err(|_| {
            PhsError::structural("Fortran record length does not fit in usize")
        })?;
        let body_start = cursor + 4;
        let body_end = body_start
            .checked_add(record_len)
            .ok_or_else(|| PhsError::structural("Fortran record length overflow"))?;
        if body_end + 4 > bytes.len() {
            return Err(PhsError::structural(format!(
                "truncated Fortran record of {record_len} bytes at byte {cursor}"
            )));
        }
        let tail =
            u32::from_le_bytes(bytes[body_end..body_end + 4].try_into().expect("4-byte tail"));
        if tail != head {
            return Err(PhsError::structural(format!(
                "Fortran record framing mismatch at byte {cursor}: head {head}, tail {tail}"
            )));
        }
        payload.extend_from_slice(&bytes[body_start..body_end]);
        cursor = body_end + 4;
    }
    Ok(Cow::Owned(payload))
}
