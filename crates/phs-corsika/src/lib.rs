//! CORSIKA/MMCS binary header access for photon-stream merging.
//!
//! A CORSIKA run file is a stream of fixed 273-word (`f32`) blocks, each
//! tagged by a 4-byte ASCII marker in word 0 (`RUNH`, `EVTH`, `EVTE`,
//! `RUNE`, ...). This crate loads the run header and the ordered table of
//! event headers, exposes the identifier fields through an explicit
//! [`HeaderLayout`] offset table, and provides the shared [`AirShowerTruth`]
//! view handed out by the merge iterator.

pub mod headers;
pub mod layout;
pub mod truth;

pub use headers::{
    CorsikaHeaders, EventHeader, HeaderBlock, RunHeader, parse_corsika_headers,
    read_corsika_headers,
};
pub use layout::{
    CORSIKA_BLOCK_BYTES, CORSIKA_BLOCK_FLOATS, EVTE_MARKER, EVTH_MARKER, HeaderLayout, LONG_MARKER,
    RUNE_MARKER, RUNH_MARKER,
};
pub use truth::AirShowerTruth;
