//! Pull-one-event reader for photon-stream JSON-lines containers.
//!
//! A `.phs.jsonl.gz` file holds one JSON object per line. The reader
//! sniffs the gzip magic so plain `.jsonl` files work too, decodes each
//! line into an [`Event`], and signals end of stream as `None`. File
//! handles are scoped to the reader and released on drop no matter how
//! iteration ends.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use phs_error::{PhsError, Result};
use phs_types::{Event, ObservationInfo, PhotonStream, SimulationTruth, TIME_SLICE_DURATION_NS};
use serde::Deserialize;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Wire shape of one container line (FACT phs key names).
#[derive(Debug, Deserialize)]
struct EventRecord {
    #[serde(rename = "Zd_deg")]
    zd_deg: f64,
    #[serde(rename = "Az_deg")]
    az_deg: f64,
    #[serde(rename = "Run")]
    run: u32,
    #[serde(rename = "Event")]
    event: u32,
    #[serde(rename = "Reuse")]
    reuse: Option<u32>,
    #[serde(rename = "Night")]
    night: Option<u32>,
    #[serde(rename = "UnixTime_s_us")]
    unix_time_s_us: Option<(u64, u32)>,
    #[serde(rename = "Trigger")]
    trigger: Option<u32>,
    #[serde(rename = "SaturatedPixels", default)]
    saturated_pixels: Vec<u16>,
    #[serde(rename = "PhotonArrivals_500ps", default)]
    photon_arrivals_500ps: Vec<Vec<u16>>,
}

impl EventRecord {
    /// Lift the wire record into the event model.
    ///
    /// A `Reuse` key marks a simulated event; otherwise the record must
    /// carry complete observation bookkeeping.
    fn into_event(self) -> Result<Event> {
        let (simulation_truth, observation_info) = if let Some(reuse) = self.reuse {
            let truth = SimulationTruth {
                run: self.run,
                event: self.event,
                reuse,
                air_shower: None,
            };
            (Some(truth), None)
        } else {
            let night = self.night.ok_or_else(|| PhsError::MalformedEventRecord {
                detail: "observation event without Night key".to_owned(),
            })?;
            let (unix_time_s, unix_time_us) =
                self.unix_time_s_us
                    .ok_or_else(|| PhsError::MalformedEventRecord {
                        detail: "observation event without UnixTime_s_us key".to_owned(),
                    })?;
            let trigger_type = self.trigger.ok_or_else(|| PhsError::MalformedEventRecord {
                detail: "observation event without Trigger key".to_owned(),
            })?;
            let info = ObservationInfo {
                night,
                run: self.run,
                event: self.event,
                unix_time_s,
                unix_time_us,
                trigger_type,
            };
            (None, Some(info))
        };

        Ok(Event {
            zd_deg: self.zd_deg,
            az_deg: self.az_deg,
            saturated_pixels: self.saturated_pixels,
            photon_stream: PhotonStream {
                slice_duration_ns: TIME_SLICE_DURATION_NS,
                raw: self.photon_arrivals_500ps,
            },
            simulation_truth,
            observation_info,
        })
    }
}

#[derive(Debug)]
enum LineSource {
    Plain(BufReader<File>),
    Gzip(BufReader<MultiGzDecoder<File>>),
}

impl LineSource {
    fn read_line(&mut self, buf: &mut String) -> std::io::Result<usize> {
        match self {
            Self::Plain(reader) => reader.read_line(buf),
            Self::Gzip(reader) => reader.read_line(buf),
        }
    }
}

/// Forward-only reader over a photon-stream JSON-lines container.
#[derive(Debug)]
pub struct JsonLinesReader {
    source: LineSource,
    path: PathBuf,
}

impl JsonLinesReader {
    /// Open a container file, transparently handling gzip compression.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;

        let mut magic = [0_u8; 2];
        let sniffed = file.read(&mut magic)?;
        file.seek(SeekFrom::Start(0))?;
        let gzip = sniffed == GZIP_MAGIC.len() && magic == GZIP_MAGIC;

        debug!(path = %path.display(), gzip, "opened photon-stream container");
        let source = if gzip {
            LineSource::Gzip(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            LineSource::Plain(BufReader::new(file))
        };
        Ok(Self { source, path })
    }

    /// Path of the underlying container file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next non-blank line, or `None` at end of stream.
    fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            let mut line = String::new();
            if self.source.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
    }
}

impl Iterator for JsonLinesReader {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => return None,
            Err(err) => return Some(Err(err.into())),
        };
        let record: EventRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into())),
        };
        Some(record.into_event())
    }
}
