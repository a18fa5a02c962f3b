// 📥 Loaders - NEO CSV + close-approach JSON
// Turns the two NASA source files into entity collections for the catalog
//
// NEO file (neos.csv): header row, columns located by name
//   pdes (required) · name · diameter · pha
// Close-approach file (cad.json): {"fields": [...], "data": [[...], ...]}
//   des · cd · dist · v_rel, located through "fields"

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::entities::{CloseApproach, NearEarthObject};

// ============================================================================
// NEO CSV
// ============================================================================

#[derive(Debug, Deserialize)]
struct NeoRow {
    #[serde(default)]
    pdes: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    diameter: Option<String>,
    #[serde(default)]
    pha: Option<String>,
}

/// Load NEOs from a CSV file
pub fn load_neos(neo_csv_path: &Path) -> Result<Vec<NearEarthObject>> {
    let file = File::open(neo_csv_path)
        .with_context(|| format!("Failed to open NEO file: {:?}", neo_csv_path))?;

    let neos = read_neos(BufReader::new(file))
        .with_context(|| format!("Failed to load NEOs from {:?}", neo_csv_path))?;

    info!(count = neos.len(), path = ?neo_csv_path, "Loaded NEOs");
    Ok(neos)
}

/// Read NEOs from CSV text; rows without a primary designation are dropped
pub fn read_neos<R: Read>(reader: R) -> Result<Vec<NearEarthObject>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut neos = Vec::new();

    for (index, result) in rdr.deserialize::<NeoRow>().enumerate() {
        let row = result.with_context(|| format!("Failed to deserialize NEO row {}", index + 1))?;

        let designation = row.pdes.as_deref().unwrap_or("").trim();
        if designation.is_empty() {
            debug!(row = index + 1, "Dropping NEO row without primary designation");
            continue;
        }

        neos.push(NearEarthObject::from_raw(
            designation,
            row.name.as_deref().unwrap_or(""),
            row.diameter.as_deref().unwrap_or(""),
            row.pha.as_deref().unwrap_or(""),
        ));
    }

    Ok(neos)
}

// ============================================================================
// CLOSE-APPROACH JSON
// ============================================================================

#[derive(Debug, Deserialize)]
struct CadFile {
    #[serde(default)]
    fields: Option<Vec<String>>,
    data: Vec<Vec<Value>>,
}

/// Column positions inside a cad.json data row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CadColumns {
    des: usize,
    cd: usize,
    dist: usize,
    v_rel: usize,
}

impl Default for CadColumns {
    fn default() -> Self {
        // Layout of the SBDB close-approach API
        CadColumns {
            des: 0,
            cd: 3,
            dist: 4,
            v_rel: 7,
        }
    }
}

impl CadColumns {
    fn from_fields(fields: Option<&[String]>) -> Result<Self> {
        let fields = match fields {
            Some(fields) => fields,
            None => return Ok(CadColumns::default()),
        };

        let position = |name: &str| {
            fields
                .iter()
                .position(|f| f == name)
                .ok_or_else(|| anyhow!("Close-approach file has no '{}' field", name))
        };

        Ok(CadColumns {
            des: position("des")?,
            cd: position("cd")?,
            dist: position("dist")?,
            v_rel: position("v_rel")?,
        })
    }
}

/// Load close approaches from a JSON file
pub fn load_approaches(cad_json_path: &Path) -> Result<Vec<CloseApproach>> {
    let file = File::open(cad_json_path)
        .with_context(|| format!("Failed to open close-approach file: {:?}", cad_json_path))?;

    let approaches = read_approaches(BufReader::new(file))
        .with_context(|| format!("Failed to load close approaches from {:?}", cad_json_path))?;

    info!(count = approaches.len(), path = ?cad_json_path, "Loaded close approaches");
    Ok(approaches)
}

/// Read close approaches from cad.json text
pub fn read_approaches<R: Read>(reader: R) -> Result<Vec<CloseApproach>> {
    let cad: CadFile = serde_json::from_reader(reader).context("Failed to parse close-approach JSON")?;
    let columns = CadColumns::from_fields(cad.fields.as_deref())?;

    cad.data
        .iter()
        .enumerate()
        .map(|(index, row)| {
            parse_approach_row(row, columns).with_context(|| format!("Invalid close-approach row {}", index))
        })
        .collect()
}

fn parse_approach_row(row: &[Value], columns: CadColumns) -> Result<CloseApproach> {
    let designation = cell(row, columns.des);
    let calendar_date = cell(row, columns.cd);

    let distance = cell(row, columns.dist)
        .parse::<f64>()
        .with_context(|| format!("Invalid distance: {:?}", cell(row, columns.dist)))?;
    let velocity = cell(row, columns.v_rel)
        .parse::<f64>()
        .with_context(|| format!("Invalid velocity: {:?}", cell(row, columns.v_rel)))?;

    CloseApproach::from_calendar_date(designation, &calendar_date, distance, velocity)
}

/// Cell text; null and missing cells read as empty
fn cell(row: &[Value], index: usize) -> String {
    match row.get(index) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NEOS_CSV: &str = "\
id,spkid,full_name,pdes,name,prefix,neo,pha,diameter,albedo
a0000433,2000433,\"   433 Eros (A898 PA)\",433,Eros,,Y,N,16.84,0.25
a0000719,2000719,\"   719 Albert (A911 TB)\",719,Albert,,Y,N,,
bK20A00B,3840000,\"       (2020 AB)\",2020 AB,,,Y,Y,,
x,0,\"   nameless\",,Ghost,,Y,N,1.0,
";

    const CAD_JSON: &str = r#"{
        "signature": {"version": "1.1", "source": "NASA/JPL SBDB Close Approach Data API"},
        "count": "3",
        "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", "v_inf", "t_sigma_f", "h"],
        "data": [
            ["170903", "105", "2415020.507669610", "1900-Jan-01 00:11", "0.0921795123769547", "0.0912006569517418", "0.0931589328621254", "16.7523040362574", "16.7505784933163", "01:00", "18.1"],
            ["433", "659", "2415033.980044540", "1900-Jan-14 11:31", "0.314929371455641", "0.314925101917928", "0.314933640987213", "6.46178153592243", "6.44757016165136", "< 00:01", "10.4"],
            ["2020 AB", "1", "2458850.000000000", "2020-Jan-01 12:00", "0.02", "0.01", "0.03", "12.0", "11.9", "00:05", null]
        ]
    }"#;

    #[test]
    fn test_read_neos() {
        let neos = read_neos(NEOS_CSV.as_bytes()).unwrap();

        // Row without pdes is dropped
        assert_eq!(neos.len(), 3);

        assert_eq!(neos[0].designation(), "433");
        assert_eq!(neos[0].name.as_deref(), Some("Eros"));
        assert_eq!(neos[0].diameter, Some(16.84));
        assert!(!neos[0].hazardous);

        assert_eq!(neos[1].designation(), "719");
        assert_eq!(neos[1].diameter, None);

        assert_eq!(neos[2].designation(), "2020 AB");
        assert_eq!(neos[2].name, None);
        assert!(neos[2].hazardous);
    }

    #[test]
    fn test_read_approaches() {
        let approaches = read_approaches(CAD_JSON.as_bytes()).unwrap();

        assert_eq!(approaches.len(), 3);
        assert_eq!(approaches[0].designation(), "170903");
        assert_eq!(approaches[0].time_str(), "1900-01-01 00:11");
        assert!((approaches[0].distance - 0.0921795123769547).abs() < 1e-12);
        assert!((approaches[0].velocity - 16.7523040362574).abs() < 1e-12);
        assert_eq!(approaches[2].designation(), "2020 AB");
    }

    #[test]
    fn test_read_approaches_without_fields_uses_default_layout() {
        let json = r#"{"data": [["433", "659", "2415033.98", "1900-Jan-14 11:31", "0.31", "0.30", "0.32", "6.46"]]}"#;
        let approaches = read_approaches(json.as_bytes()).unwrap();

        assert_eq!(approaches.len(), 1);
        assert_eq!(approaches[0].designation(), "433");
        assert_eq!(approaches[0].distance, 0.31);
        assert_eq!(approaches[0].velocity, 6.46);
    }

    #[test]
    fn test_read_approaches_reorders_by_fields() {
        let json = r#"{"fields": ["v_rel", "dist", "cd", "des"], "data": [["6.5", "0.3", "2000-Feb-29 23:59", "433"]]}"#;
        let approaches = read_approaches(json.as_bytes()).unwrap();

        assert_eq!(approaches[0].designation(), "433");
        assert_eq!(approaches[0].time_str(), "2000-02-29 23:59");
        assert_eq!(approaches[0].velocity, 6.5);
    }

    #[test]
    fn test_bad_rows_are_errors() {
        let json = r#"{"fields": ["des", "cd", "dist", "v_rel"], "data": [["433", "1900-Jan-14 11:31", "far", "6.46"]]}"#;
        let err = read_approaches(json.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("row 0"));

        let json = r#"{"fields": ["des", "cd", "v_rel"], "data": []}"#;
        assert!(read_approaches(json.as_bytes()).is_err());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();

        let neo_path = dir.path().join("neos.csv");
        File::create(&neo_path).unwrap().write_all(NEOS_CSV.as_bytes()).unwrap();
        let cad_path = dir.path().join("cad.json");
        File::create(&cad_path).unwrap().write_all(CAD_JSON.as_bytes()).unwrap();

        assert_eq!(load_neos(&neo_path).unwrap().len(), 3);
        assert_eq!(load_approaches(&cad_path).unwrap().len(), 3);

        assert!(load_neos(&dir.path().join("missing.csv")).is_err());
    }
}
