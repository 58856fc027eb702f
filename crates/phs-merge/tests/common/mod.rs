//! Shared fixtures: synthetic CORSIKA byte streams and in-memory events.
#![allow(dead_code)]

use phs_corsika::{CORSIKA_BLOCK_FLOATS, CorsikaHeaders, HeaderLayout, parse_corsika_headers};
use phs_error::Result;
use phs_types::{Event, PhotonStream, SimulationTruth, TIME_SLICE_DURATION_NS};

pub const LAYOUT: HeaderLayout = HeaderLayout::MMCS;

pub fn block_bytes(marker: &[u8; 4], fields: &[(usize, f32)]) -> Vec<u8> {
    let mut bytes = vec![0_u8; CORSIKA_BLOCK_FLOATS * 4];
    bytes[..4].copy_from_slice(marker);
    for &(index, value) in fields {
        bytes[index * 4..index * 4 + 4].copy_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// A run file with one RUNH, one EVTH per key, and a closing RUNE.
pub fn corsika_bytes(run: u32, keys: &[(u32, u32)]) -> Vec<u8> {
    corsika_bytes_with_row_run(run, &keys.iter().map(|&(e, r)| (run, e, r)).collect::<Vec<_>>())
}

/// Same, but each EVTH row gets its own run-number word (for forging
/// rows that disagree with the run header).
pub fn corsika_bytes_with_row_run(run: u32, rows: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut bytes = block_bytes(b"RUNH", &[(LAYOUT.runh_run_number, run as f32)]);
    for &(row_run, event, reuse) in rows {
        bytes.extend(block_bytes(
            b"EVTH",
            &[
                (LAYOUT.evth_run_number, row_run as f32),
                (LAYOUT.evth_event_number, event as f32),
                (LAYOUT.evth_reuse_number, reuse as f32),
            ],
        ));
    }
    bytes.extend(block_bytes(b"RUNE", &[]));
    bytes
}

pub fn corsika_headers(run: u32, keys: &[(u32, u32)]) -> CorsikaHeaders {
    parse_corsika_headers(&corsika_bytes(run, keys), &LAYOUT).expect("synthetic headers parse")
}

pub fn simulated_event(run: u32, event: u32, reuse: u32) -> Event {
    Event {
        zd_deg: 12.5,
        az_deg: -80.0,
        saturated_pixels: Vec::new(),
        photon_stream: PhotonStream {
            slice_duration_ns: TIME_SLICE_DURATION_NS,
            raw: vec![vec![30, 31], vec![55]],
        },
        simulation_truth: Some(SimulationTruth {
            run,
            event,
            reuse,
            air_shower: None,
        }),
        observation_info: None,
    }
}

pub fn event_source(events: Vec<Event>) -> std::vec::IntoIter<Result<Event>> {
    events
        .into_iter()
        .map(Ok)
        .collect::<Vec<_>>()
        .into_iter()
}
