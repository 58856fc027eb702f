//! Block geometry, ASCII markers, and the named field-offset table.
//!
//! The run/event/reuse identifier offsets are deliberately bundled into
//! [`HeaderLayout`] and passed explicitly to the loader and the
//! simulation-truth index, so the binary format and the merge core agree
//! on field positions through one value instead of scattered constants.

/// Words (`f32`) per CORSIKA block.
pub const CORSIKA_BLOCK_FLOATS: usize = 273;
/// Bytes per CORSIKA block.
pub const CORSIKA_BLOCK_BYTES: usize = CORSIKA_BLOCK_FLOATS * 4;

/// `RUNH` run-header marker as the little-endian word it occupies.
pub const RUNH_MARKER: u32 = u32::from_le_bytes(*b"RUNH");
/// `EVTH` event-header marker.
pub const EVTH_MARKER: u32 = u32::from_le_bytes(*b"EVTH");
/// `EVTE` event-end marker.
pub const EVTE_MARKER: u32 = u32::from_le_bytes(*b"EVTE");
/// `RUNE` run-end marker.
pub const RUNE_MARKER: u32 = u32::from_le_bytes(*b"RUNE");
/// `LONG` longitudinal-profile marker.
pub const LONG_MARKER: u32 = u32::from_le_bytes(*b"LONG");

/// Word offsets of the identifier fields inside RUNH and EVTH blocks.
///
/// All offsets are zero-based word indices, the marker being word 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    /// Run number inside the RUNH block.
    pub runh_run_number: usize,
    /// Run number inside an EVTH block.
    pub evth_run_number: usize,
    /// Event number inside an EVTH block.
    pub evth_event_number: usize,
    /// Reuse number (CORSIKA "number of uses") inside an EVTH block.
    pub evth_reuse_number: usize,
}

impl HeaderLayout {
    /// Offsets of CORSIKA as patched for MMCS detector simulations.
    pub const MMCS: Self = Self {
        runh_run_number: 1,
        evth_run_number: 43,
        evth_event_number: 1,
        evth_reuse_number: 97,
    };

    /// Largest word offset this layout touches, for block-size validation.
    #[must_use]
    pub const fn max_offset(&self) -> usize {
        let mut max = self.runh_run_number;
        if self.evth_run_number > max {
            max = self.evth_run_number;
        }
        if self.evth_event_number > max {
            max = self.evth_event_number;
        }
        if self.evth_reuse_number > max {
            max = self.evth_reuse_number;
        }
        max
    }
}
