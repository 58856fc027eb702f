//! Streaming merge of photon-stream events with CORSIKA ground truth.

use std::path::Path;

use phs_corsika::{HeaderLayout, read_corsika_headers};
use phs_error::{PhsError, Result};
use phs_io::JsonLinesReader;
use phs_types::Event;
use tracing::{debug, trace};

use crate::index::{CompositeKey, SimulationTruthIndex};

/// Lifecycle of a [`SimulationReader`]. `Exhausted` and `Failed` are
/// terminal: once reached, `next()` yields `None` forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    Ready,
    Exhausted,
    Failed,
}

/// Forward-only, single-pass merge iterator.
///
/// Pulls one decoded event at a time from the photon-stream source,
/// verifies it against the CORSIKA header table, marks the matched row,
/// and yields the event enriched with its air-shower truth. Fatal
/// conditions (consistency or lookup failures) are yielded once and end
/// the iteration; re-iterating requires a new construction.
#[derive(Debug)]
pub struct SimulationReader<I> {
    events: I,
    index: SimulationTruthIndex,
    state: MergeState,
}

impl SimulationReader<JsonLinesReader> {
    /// Open a photon-stream container and its CORSIKA run file under the
    /// MMCS field offsets.
    pub fn open(
        phs_path: impl AsRef<Path>,
        corsika_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let layout = HeaderLayout::MMCS;
        let events = JsonLinesReader::open(&phs_path)?;
        let headers = read_corsika_headers(&corsika_path, &layout)?;
        let index = SimulationTruthIndex::new(headers, &layout)?;
        debug!(
            phs = %phs_path.as_ref().display(),
            corsika = %corsika_path.as_ref().display(),
            "opened simulation reader"
        );
        Ok(Self::new(events, index))
    }
}

impl<I> SimulationReader<I>
where
    I: Iterator<Item = Result<Event>>,
{
    /// Merge events from any pull-one-event producer against a
    /// pre-built index.
    pub fn new(events: I, index: SimulationTruthIndex) -> Self {
        Self {
            events,
            index,
            state: MergeState::Ready,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> MergeState {
        self.state
    }

    /// The underlying index, for matched-flag reporting.
    #[must_use]
    pub const fn index(&self) -> &SimulationTruthIndex {
        &self.index
    }

    /// Give up the iterator and keep the index with its matched flags.
    #[must_use]
    pub fn into_index(self) -> SimulationTruthIndex {
        self.index
    }

    /// Verify one event against the header table and enrich it.
    ///
    /// Ordering matters: all verifications precede the matched-flag
    /// mutation, so a failed event leaves the flags untouched.
    fn merge(&mut self, mut event: Event) -> Result<Event> {
        let truth = event
            .simulation_truth
            .as_mut()
            .ok_or(PhsError::MissingSimulationTruth)?;
        let layout = *self.index.layout();

        let run_header_run = self.index.run_header().run_number(&layout);
        if truth.run != run_header_run {
            return Err(PhsError::RunNumberMismatch {
                photon_stream: truth.run,
                run_header: run_header_run,
            });
        }

        let key = CompositeKey {
            event: truth.event,
            reuse: truth.reuse,
        };
        let row = self
            .index
            .lookup(key)
            .ok_or(PhsError::NoMatchingEventHeader {
                event: key.event,
                reuse: key.reuse,
            })?;

        // Cross-check the located row against the event's embedded ids,
        // guarding against index corruption and field-order bugs.
        let header = &self.index.event_headers()[row];
        let checks: [(&'static str, u32, u32); 3] = [
            ("run-number", truth.run, header.run_number(&layout)),
            ("event-number", truth.event, header.event_number(&layout)),
            ("reuse-number", truth.reuse, header.reuse_number(&layout)),
        ];
        for (field, from_event, from_header) in checks {
            if from_event != from_header {
                return Err(PhsError::HeaderFieldMismatch {
                    field,
                    photon_stream: from_event,
                    event_header: from_header,
                    row,
                });
            }
        }

        self.index.mark_matched(row);
        truth.air_shower = Some(self.index.truth_for(row));
        trace!(
            event = key.event,
            reuse = key.reuse,
            row,
            "merged photon-stream event with air-shower truth"
        );
        Ok(event)
    }
}

impl<I> Iterator for SimulationReader<I>
where
    I: Iterator<Item = Result<Event>>,
{
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != MergeState::Ready {
            return None;
        }
        let event = match self.events.next() {
            None => {
                self.state = MergeState::Exhausted;
                debug!(
                    matched = self.index.num_matched(),
                    rows = self.index.len(),
                    "photon-stream exhausted"
                );
                return None;
            }
            Some(Err(err)) => {
                self.state = MergeState::Failed;
                return Some(Err(err));
            }
            Some(Ok(event)) => event,
        };
        match self.merge(event) {
            Ok(enriched) => Some(Ok(enriched)),
            Err(err) => {
                self.state = MergeState::Failed;
                Some(Err(err))
            }
        }
    }
}
