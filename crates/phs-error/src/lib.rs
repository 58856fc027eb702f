//! Shared error taxonomy for the photon-stream workspace.
//!
//! Three fatal families plus transparent I/O and JSON decode wrappers:
//! - structural: the CORSIKA header table itself is malformed,
//! - consistency: a photon-stream event disagrees with the header it matched,
//! - lookup: no header row exists for an event's composite key.
//!
//! End-of-stream is never an error; readers signal it as `None`.

use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T> = std::result::Result<T, PhsError>;

/// All fatal conditions raised by the photon-stream crates.
#[derive(Debug, Error)]
pub enum PhsError {
    /// File-level failure while reading an event container or header file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A line of the JSON-lines event container failed to decode.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A decoded event-container line has an impossible shape (neither
    /// simulation identifiers nor complete observation bookkeeping).
    #[error("malformed photon-stream event record: {detail}")]
    MalformedEventRecord { detail: String },

    /// The CORSIKA header table is malformed (truncated block, missing
    /// RUNH, bad record framing). Raised by the loader or at index
    /// construction; never recoverable.
    #[error("corrupt CORSIKA header table: {detail}")]
    Structural { detail: String },

    /// Two event-header rows share one (event-number, reuse-number) key.
    /// A duplicate would make one physical row permanently unmatchable and
    /// silently skew the trigger fraction, so construction refuses it.
    #[error(
        "duplicate CORSIKA composite key (event {event}, reuse {reuse}): \
         rows {first_row} and {second_row}"
    )]
    DuplicateCompositeKey {
        event: u32,
        reuse: u32,
        first_row: usize,
        second_row: usize,
    },

    /// Run-number mismatch between a photon-stream event and the CORSIKA
    /// run header.
    #[error(
        "run-number mismatch: photon-stream event says {photon_stream}, \
         CORSIKA run header says {run_header}"
    )]
    RunNumberMismatch { photon_stream: u32, run_header: u32 },

    /// The matched event-header row disagrees with the event's embedded
    /// identifiers on one named field.
    #[error(
        "CORSIKA event header mismatch on {field} at row {row}: \
         photon-stream event says {photon_stream}, header says {event_header}"
    )]
    HeaderFieldMismatch {
        field: &'static str,
        photon_stream: u32,
        event_header: u32,
        row: usize,
    },

    /// No CORSIKA event header exists for the given composite key.
    #[error("no matching CORSIKA event header for (event {event}, reuse {reuse})")]
    NoMatchingEventHeader { event: u32, reuse: u32 },

    /// A photon-stream event without an embedded (run, event, reuse)
    /// triple reached the merge iterator.
    #[error("photon-stream event carries no simulation truth to merge on")]
    MissingSimulationTruth,
}

impl PhsError {
    /// Build a [`PhsError::Structural`] from anything displayable.
    pub fn structural(detail: impl Into<String>) -> Self {
        Self::Structural {
            detail: detail.into(),
        }
    }
}
