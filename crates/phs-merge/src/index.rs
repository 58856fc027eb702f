//! Composite-key index over the CORSIKA event-header table.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use phs_corsika::{AirShowerTruth, CorsikaHeaders, EventHeader, HeaderLayout, RunHeader};
use phs_error::{PhsError, Result};
use tracing::debug;

/// The (event-number, reuse-number) pair identifying one simulated
/// air-shower variant within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    pub event: u32,
    pub reuse: u32,
}

/// Lookup index from composite key to header-table row, plus the
/// matched-flags vector ("did this shower ever pass the trigger").
///
/// The mapping is built once at construction and never mutated; the
/// flags start all-false and are set (never reset) by the merge
/// iterator. One flag per physical row, whether or not a photon-stream
/// event ever arrives for it.
#[derive(Debug, Clone)]
pub struct SimulationTruthIndex {
    layout: HeaderLayout,
    run_header: Arc<RunHeader>,
    event_headers: Arc<[EventHeader]>,
    id_to_row: HashMap<CompositeKey, usize>,
    passed_trigger: Vec<bool>,
}

impl SimulationTruthIndex {
    /// Build the index over a parsed header table.
    ///
    /// An empty table is legal and yields an empty index (every lookup
    /// fails). A duplicate composite key is refused: the shadowed row
    /// could never be matched and would silently skew the trigger
    /// fraction.
    pub fn new(headers: CorsikaHeaders, layout: &HeaderLayout) -> Result<Self> {
        let event_headers: Arc<[EventHeader]> = headers.event_headers.into();
        let mut id_to_row = HashMap::with_capacity(event_headers.len());

        for (row, header) in event_headers.iter().enumerate() {
            let key = CompositeKey {
                event: header.event_number(layout),
                reuse: header.reuse_number(layout),
            };
            match id_to_row.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(row);
                }
                Entry::Occupied(first) => {
                    return Err(PhsError::DuplicateCompositeKey {
                        event: key.event,
                        reuse: key.reuse,
                        first_row: *first.get(),
                        second_row: row,
                    });
                }
            }
        }

        let passed_trigger = vec![false; event_headers.len()];
        debug!(
            run_number = headers.run_header.run_number(layout),
            rows = event_headers.len(),
            "built simulation-truth index"
        );
        Ok(Self {
            layout: *layout,
            run_header: Arc::new(headers.run_header),
            event_headers,
            id_to_row,
            passed_trigger,
        })
    }

    /// The field-offset table this index was built with.
    #[must_use]
    pub const fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    /// The CORSIKA run header.
    #[must_use]
    pub fn run_header(&self) -> &RunHeader {
        &self.run_header
    }

    /// The ordered event-header table.
    #[must_use]
    pub fn event_headers(&self) -> &[EventHeader] {
        &self.event_headers
    }

    /// Number of event-header rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.event_headers.len()
    }

    /// Whether the header table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event_headers.is_empty()
    }

    /// Row position for a composite key, if any.
    #[must_use]
    pub fn lookup(&self, key: CompositeKey) -> Option<usize> {
        self.id_to_row.get(&key).copied()
    }

    /// Matched flags, one per header row, addressable by row position.
    #[must_use]
    pub fn passed_trigger(&self) -> &[bool] {
        &self.passed_trigger
    }

    /// Number of rows matched so far.
    #[must_use]
    pub fn num_matched(&self) -> usize {
        self.passed_trigger.iter().filter(|&&flag| flag).count()
    }

    /// Fraction of simulated showers that triggered the detector.
    /// Zero for an empty table.
    #[must_use]
    pub fn trigger_fraction(&self) -> f64 {
        if self.passed_trigger.is_empty() {
            return 0.0;
        }
        self.num_matched() as f64 / self.passed_trigger.len() as f64
    }

    /// Set the matched flag for a row. Idempotent; never reset.
    pub(crate) fn mark_matched(&mut self, row: usize) {
        self.passed_trigger[row] = true;
    }

    /// Truth view onto `event_headers[row]`, sharing the tables.
    pub(crate) fn truth_for(&self, row: usize) -> AirShowerTruth {
        AirShowerTruth::new(
            Arc::clone(&self.run_header),
            Arc::clone(&self.event_headers),
            row,
        )
    }
}
