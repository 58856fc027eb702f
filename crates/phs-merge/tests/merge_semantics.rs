//! Merge-iterator behavior over in-memory event sources.

mod common;

use common::{corsika_headers, event_source, simulated_event, LAYOUT};
use phs_corsika::parse_corsika_headers;
use phs_error::PhsError;
use phs_merge::{MergeState, SimulationReader, SimulationTruthIndex};
use phs_types::{Event, ObservationInfo, PhotonStream};

fn index(run: u32, keys: &[(u32, u32)]) -> SimulationTruthIndex {
    SimulationTruthIndex::new(corsika_headers(run, keys), &LAYOUT).expect("index")
}

#[test]
fn matched_events_mark_their_own_rows() {
    let idx = index(7, &[(3, 1), (3, 2), (4, 1)]);
    let source = event_source(vec![simulated_event(7, 3, 2), simulated_event(7, 4, 1)]);
    let mut reader = SimulationReader::new(source, idx);

    for item in reader.by_ref() {
        item.expect("both events have matching rows");
    }

    assert_eq!(reader.state(), MergeState::Exhausted);
    assert_eq!(reader.index().passed_trigger(), &[false, true, true]);
    assert_eq!(reader.index().num_matched(), 2);
    let fraction = reader.index().trigger_fraction();
    assert!((fraction - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn events_arriving_out_of_table_order_still_match() {
    let idx = index(7, &[(3, 1), (3, 2)]);
    let source = event_source(vec![simulated_event(7, 3, 2), simulated_event(7, 3, 1)]);
    let reader = SimulationReader::new(source, idx);

    let events: Vec<Event> = reader.map(|item| item.expect("merge")).collect();
    assert_eq!(events.len(), 2);

    let first = events[0].simulation_truth.as_ref().expect("truth");
    let shower = first.air_shower.as_ref().expect("air shower attached");
    assert_eq!(shower.row(), 1);
    assert_eq!(shower.event_header().reuse_number(&LAYOUT), 2);

    let second = events[1].simulation_truth.as_ref().expect("truth");
    assert_eq!(second.air_shower.as_ref().expect("air shower").row(), 0);
}

#[test]
fn enriched_event_exposes_shared_header_tables() {
    let idx = index(7, &[(3, 1)]);
    let source = event_source(vec![simulated_event(7, 3, 1)]);
    let mut reader = SimulationReader::new(source, idx);

    let event = reader.next().expect("one event").expect("merge");
    let shower = event
        .simulation_truth
        .expect("truth")
        .air_shower
        .expect("air shower");
    assert_eq!(shower.run_header().run_number(&LAYOUT), 7);
    assert_eq!(shower.event_header().event_number(&LAYOUT), 3);
}

#[test]
fn run_number_mismatch_fails_without_marking() {
    let idx = index(7, &[(3, 1)]);
    let source = event_source(vec![simulated_event(8, 3, 1)]);
    let mut reader = SimulationReader::new(source, idx);

    let err = reader.next().expect("one item").unwrap_err();
    match err {
        PhsError::RunNumberMismatch {
            photon_stream,
            run_header,
        } => {
            assert_eq!(photon_stream, 8);
            assert_eq!(run_header, 7);
        }
        other => panic!("expected RunNumberMismatch, got {other}"),
    }
    assert_eq!(reader.state(), MergeState::Failed);
    assert!(reader.index().passed_trigger().iter().all(|&flag| !flag));
}

#[test]
fn absent_composite_key_fails_without_marking() {
    let idx = index(7, &[(3, 1), (3, 2)]);
    let source = event_source(vec![simulated_event(7, 3, 3)]);
    let mut reader = SimulationReader::new(source, idx);

    let err = reader.next().expect("one item").unwrap_err();
    match err {
        PhsError::NoMatchingEventHeader { event, reuse } => {
            assert_eq!((event, reuse), (3, 3));
        }
        other => panic!("expected NoMatchingEventHeader, got {other}"),
    }
    assert!(reader.index().passed_trigger().iter().all(|&flag| !flag));
}

#[test]
fn header_row_disagreeing_with_run_header_is_reported_by_field() {
    // The row carries run 8 while the run header says 7. An event
    // claiming run 7 passes the run-header check but trips the
    // row-level cross-check.
    let bytes = common::corsika_bytes_with_row_run(7, &[(8, 3, 1)]);
    let headers = parse_corsika_headers(&bytes, &LAYOUT).expect("parse");
    let idx = SimulationTruthIndex::new(headers, &LAYOUT).expect("index");
    let source = event_source(vec![simulated_event(7, 3, 1)]);
    let mut reader = SimulationReader::new(source, idx);

    let err = reader.next().expect("one item").unwrap_err();
    match err {
        PhsError::HeaderFieldMismatch {
            field,
            photon_stream,
            event_header,
            row,
        } => {
            assert_eq!(field, "run-number");
            assert_eq!(photon_stream, 7);
            assert_eq!(event_header, 8);
            assert_eq!(row, 0);
        }
        other => panic!("expected HeaderFieldMismatch, got {other}"),
    }
    assert!(reader.index().passed_trigger().iter().all(|&flag| !flag));
}

#[test]
fn event_without_simulation_truth_is_refused() {
    let idx = index(7, &[(3, 1)]);
    let observation = Event {
        zd_deg: 10.0,
        az_deg: 20.0,
        saturated_pixels: Vec::new(),
        photon_stream: PhotonStream {
            slice_duration_ns: 0.5,
            raw: vec![vec![40]],
        },
        simulation_truth: None,
        observation_info: Some(ObservationInfo {
            night: 20_160_101,
            run: 11,
            event: 3,
            unix_time_s: 1_451_606_400,
            unix_time_us: 0,
            trigger_type: 4,
        }),
    };
    let mut reader = SimulationReader::new(event_source(vec![observation]), idx);

    let err = reader.next().expect("one item").unwrap_err();
    assert!(matches!(err, PhsError::MissingSimulationTruth));
    assert_eq!(reader.state(), MergeState::Failed);
}

#[test]
fn exhaustion_is_reported_once_then_fused() {
    let idx = index(7, &[(3, 1)]);
    let mut reader = SimulationReader::new(event_source(Vec::new()), idx);

    assert_eq!(reader.state(), MergeState::Ready);
    assert!(reader.next().is_none());
    assert_eq!(reader.state(), MergeState::Exhausted);
    assert!(reader.next().is_none());
    assert!(reader.next().is_none());
    assert_eq!(reader.state(), MergeState::Exhausted);
}

#[test]
fn failed_reader_yields_nothing_more() {
    let idx = index(7, &[(3, 1), (4, 1)]);
    // The bad event comes first; the good one behind it must never
    // be reached.
    let source = event_source(vec![simulated_event(7, 9, 9), simulated_event(7, 3, 1)]);
    let mut reader = SimulationReader::new(source, idx);

    assert!(reader.next().expect("error item").is_err());
    assert_eq!(reader.state(), MergeState::Failed);
    assert!(reader.next().is_none());
    assert_eq!(reader.index().num_matched(), 0);
}

#[test]
fn source_errors_propagate_and_fail_the_reader() {
    let idx = index(7, &[(3, 1)]);
    let source = vec![Err(PhsError::structural("truncated line"))].into_iter();
    let mut reader = SimulationReader::new(source, idx);

    let err = reader.next().expect("error item").unwrap_err();
    assert!(matches!(err, PhsError::Structural { .. }));
    assert_eq!(reader.state(), MergeState::Failed);
    assert!(reader.next().is_none());
}

#[test]
fn into_index_keeps_the_matched_flags() {
    let idx = index(7, &[(3, 1), (3, 2)]);
    let source = event_source(vec![simulated_event(7, 3, 1)]);
    let mut reader = SimulationReader::new(source, idx);
    reader.next().expect("one event").expect("merge");

    let idx = reader.into_index();
    assert_eq!(idx.passed_trigger(), &[true, false]);
    assert!((idx.trigger_fraction() - 0.5).abs() < f64::EPSILON);
}
