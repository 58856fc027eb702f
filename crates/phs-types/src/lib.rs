//! Photon-stream event model and FACT detector constants.
//!
//! An [`Event`] is one recorded detector readout: per-pixel photon arrival
//! time slices plus either observation bookkeeping (night/run/event ids,
//! trigger, timestamp) or simulation truth (run/event/reuse ids, optionally
//! enriched with CORSIKA air-shower truth by the merge iterator).

use phs_corsika::AirShowerTruth;

/// Number of pixels in the imaging camera.
pub const NUMBER_OF_PIXELS: usize = 1440;
/// Number of time slices per readout window.
pub const NUMBER_OF_TIME_SLICES: usize = 100;
/// Duration of one photon-arrival time slice in nanoseconds.
pub const TIME_SLICE_DURATION_NS: f64 = 0.5;

/// Per-pixel photon arrival times, in units of time slices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhotonStream {
    /// Slice duration in nanoseconds (0.5 ns for the FACT container).
    pub slice_duration_ns: f64,
    /// Arrival time slices of the single photons, one list per pixel.
    pub raw: Vec<Vec<u16>>,
}

impl PhotonStream {
    /// Total number of detected photons across all pixels.
    #[must_use]
    pub fn number_of_photons(&self) -> usize {
        self.raw.iter().map(Vec::len).sum()
    }
}

/// Identifiers a simulated event carries from its production chain,
/// enriched with the matched air-shower truth after merging.
#[derive(Debug, Clone)]
pub struct SimulationTruth {
    /// CORSIKA run number.
    pub run: u32,
    /// CORSIKA event number.
    pub event: u32,
    /// Reuse number: which re-sampling of the shower this event is.
    pub reuse: u32,
    /// Ground-truth shower parameters; `None` until merged.
    pub air_shower: Option<AirShowerTruth>,
}

/// Bookkeeping of one observed (non-simulated) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationInfo {
    pub night: u32,
    pub run: u32,
    pub event: u32,
    pub unix_time_s: u64,
    pub unix_time_us: u32,
    pub trigger_type: u32,
}

/// One photon-stream event, simulated or observed.
#[derive(Debug, Clone)]
pub struct Event {
    /// Pointing zenith distance in degrees.
    pub zd_deg: f64,
    /// Pointing azimuth in degrees.
    pub az_deg: f64,
    /// Pixels whose readout saturated in this event.
    pub saturated_pixels: Vec<u16>,
    /// Per-pixel photon arrival times.
    pub photon_stream: PhotonStream,
    /// Present on simulated events.
    pub simulation_truth: Option<SimulationTruth>,
    /// Present on observed events.
    pub observation_info: Option<ObservationInfo>,
}
