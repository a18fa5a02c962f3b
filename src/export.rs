// 📤 Result Sink - limit + CSV/JSON export
//
// Everything here pulls from the query stream one record at a time:
// `limit` stops the upstream once n records went through, and both writers
// serialize each record as it arrives instead of collecting the stream.

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

use crate::catalog::ApproachRecord;
use crate::entities::NearEarthObject;
use crate::error::ExportError;
use crate::temporal::datetime_to_str;

// ============================================================================
// LIMIT
// ============================================================================

/// Stream adapter yielding at most `n` items
///
/// Created by [`limit`]. Holds no buffer; once the cap is reached the inner
/// iterator is not polled again.
#[derive(Debug, Clone)]
pub struct Limit<I> {
    inner: I,
    remaining: Option<usize>,
}

/// Cap a stream at `n` items; `None` or `Some(0)` passes everything through
pub fn limit<I: Iterator>(iter: I, n: Option<usize>) -> Limit<I> {
    Limit {
        inner: iter,
        remaining: n.filter(|&n| n > 0),
    }
}

impl<I: Iterator> Iterator for Limit<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.remaining.as_mut() {
            None => self.inner.next(),
            Some(0) => None,
            Some(remaining) => {
                *remaining -= 1;
                self.inner.next()
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.inner.size_hint();
        match self.remaining {
            None => (lower, upper),
            Some(n) => (
                lower.min(n),
                Some(upper.map_or(n, |upper| upper.min(n))),
            ),
        }
    }
}

// ============================================================================
// CSV (flat: approach + NEO fields in one row)
// ============================================================================

/// One exported CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedRow {
    pub datetime_utc: String,
    pub distance_au: f64,
    pub velocity_km_s: f64,
    pub designation: String,
    pub name: String,
    pub diameter_km: Option<f64>,
    pub potentially_hazardous: Option<bool>,
}

impl<'a> From<ApproachRecord<'a>> for ExportedRow {
    fn from(record: ApproachRecord<'a>) -> Self {
        let neo = record.neo;
        ExportedRow {
            datetime_utc: record.approach.time.as_ref().map(datetime_to_str).unwrap_or_default(),
            distance_au: record.approach.distance,
            velocity_km_s: record.approach.velocity,
            designation: record.designation().to_string(),
            name: neo.and_then(|n| n.name.clone()).unwrap_or_default(),
            diameter_km: neo.and_then(|n| n.diameter),
            potentially_hazardous: neo.map(|n| n.hazardous),
        }
    }
}

/// Write records as CSV; returns the number of rows written
pub fn write_csv<'a, W, I>(results: I, writer: W) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = ApproachRecord<'a>>,
{
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record([
        "datetime_utc",
        "distance_au",
        "velocity_km_s",
        "designation",
        "name",
        "diameter_km",
        "potentially_hazardous",
    ])?;

    let mut written = 0;
    for record in results {
        wtr.serialize(ExportedRow::from(record))?;
        written += 1;
    }

    wtr.flush()?;
    Ok(written)
}

/// Write records to a CSV file
pub fn write_to_csv<'a, I>(results: I, path: &Path) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = ApproachRecord<'a>>,
{
    let file = File::create(path)?;
    let written = write_csv(results, BufWriter::new(file))?;
    info!(rows = written, path = ?path, "Wrote CSV results");
    Ok(written)
}

/// Re-parse CSV produced by [`write_csv`]
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<ExportedRow>, ExportError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows = rdr.deserialize().collect::<Result<Vec<ExportedRow>, _>>()?;
    Ok(rows)
}

// ============================================================================
// JSON (nested: NEO object inside each approach)
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonNeo<'a> {
    designation: &'a str,
    name: &'a str,
    diameter_km: Option<f64>,
    potentially_hazardous: bool,
}

impl<'a> From<&'a NearEarthObject> for JsonNeo<'a> {
    fn from(neo: &'a NearEarthObject) -> Self {
        JsonNeo {
            designation: neo.designation(),
            name: neo.name.as_deref().unwrap_or(""),
            diameter_km: neo.diameter,
            potentially_hazardous: neo.hazardous,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonApproach<'a> {
    designation: &'a str,
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    neo: Option<JsonNeo<'a>>,
}

impl<'a> From<ApproachRecord<'a>> for JsonApproach<'a> {
    fn from(record: ApproachRecord<'a>) -> Self {
        JsonApproach {
            designation: record.designation(),
            datetime_utc: record.approach.time.as_ref().map(datetime_to_str).unwrap_or_default(),
            distance_au: record.approach.distance,
            velocity_km_s: record.approach.velocity,
            neo: record.neo.map(JsonNeo::from),
        }
    }
}

/// Write records as a pretty-printed JSON array; returns the number of elements
pub fn write_json<'a, W, I>(results: I, writer: W) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = ApproachRecord<'a>>,
{
    let mut writer = writer;
    let mut written = 0usize;

    {
        let mut ser = serde_json::Serializer::pretty(&mut writer);
        let elements = results.into_iter().map(|record| {
            written += 1;
            JsonApproach::from(record)
        });
        (&mut ser).collect_seq(elements)?;
    }

    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(written)
}

/// Write records to a JSON file
pub fn write_to_json<'a, I>(results: I, path: &Path) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = ApproachRecord<'a>>,
{
    let file = File::create(path)?;
    let written = write_json(results, BufWriter::new(file))?;
    info!(records = written, path = ?path, "Wrote JSON results");
    Ok(written)
}

// ============================================================================
// FORMAT DISPATCH
// ============================================================================

/// Pick the serializer from the file extension (.csv or .json)
pub fn write_results<'a, I>(results: I, path: &Path) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = ApproachRecord<'a>>,
{
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => write_to_csv(results, path),
        Some("json") => write_to_json(results, path),
        _ => Err(ExportError::UnsupportedFormat(path.to_path_buf())),
    }
}

// ============================================================================
// TESTS
// ============================================================================
