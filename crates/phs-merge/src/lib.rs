//! Merge simulated photon-stream events with CORSIKA air-shower truth.
//!
//! Two components, consumed in order:
//! - [`SimulationTruthIndex`]: composite-key index over the parsed CORSIKA
//!   event-header table plus the matched-flags vector (one slot per
//!   physical row, all false until merged).
//! - [`SimulationReader`]: forward-only iterator pairing each
//!   photon-stream event with its header row, verifying the embedded
//!   identifiers against the row, marking the row matched, and attaching
//!   an `AirShowerTruth` view before yielding the event.

pub mod index;
pub mod reader;

pub use index::{CompositeKey, SimulationTruthIndex};
pub use reader::{MergeState, SimulationReader};
