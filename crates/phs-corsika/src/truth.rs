//! Shared air-shower truth view attached to merged events.

use std::sync::Arc;

use crate::headers::{EventHeader, RunHeader};

/// Ground truth of one simulated air shower: the run header plus the
/// matched event-header row.
///
/// The wrapper shares the immutable header tables instead of copying
/// rows; every merged event of a run points into the same two tables.
#[derive(Debug, Clone)]
pub struct AirShowerTruth {
    run_header: Arc<RunHeader>,
    event_headers: Arc<[EventHeader]>,
    row: usize,
}

impl AirShowerTruth {
    /// View onto `event_headers[row]` under the shared `run_header`.
    #[must_use]
    pub fn new(run_header: Arc<RunHeader>, event_headers: Arc<[EventHeader]>, row: usize) -> Self {
        debug_assert!(row < event_headers.len());
        Self {
            run_header,
            event_headers,
            row,
        }
    }

    /// The CORSIKA run header of the whole run.
    #[must_use]
    pub fn run_header(&self) -> &RunHeader {
        &self.run_header
    }

    /// The matched EVTH row.
    #[must_use]
    pub fn event_header(&self) -> &EventHeader {
        &self.event_headers[self.row]
    }

    /// Row position of the matched header in the event-header table.
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Total energy of the primary particle in GeV.
    #[must_use]
    pub fn total_energy_gev(&self) -> f32 {
        self.event_header().total_energy_gev()
    }

    /// CORSIKA id of the primary particle.
    #[must_use]
    pub fn particle_id(&self) -> u32 {
        self.event_header().particle_id()
    }

    /// Zenith angle of the primary trajectory in rad.
    #[must_use]
    pub fn zenith_rad(&self) -> f32 {
        self.event_header().zenith_rad()
    }

    /// Azimuth angle of the primary trajectory in rad.
    #[must_use]
    pub fn azimuth_rad(&self) -> f32 {
        self.event_header().azimuth_rad()
    }
}
