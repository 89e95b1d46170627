use std::{fmt, io::Read, ops::RangeInclusive};

use csv::StringRecord;
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    dms::format_coordinate,
    error::ProcedureResult,
    runway::RunwayGeometry,
    settings::{AirportAllowList, BoundingBox},
    table::{TableRecord, read_with_encodings},
};

const NAVAID_MIN_FIELDS: usize = 8;
const WAYPOINT_MIN_FIELDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavaidKind {
    Vor,
    Ndb,
}

impl NavaidKind {
    /// VOR frequencies are in MHz, NDB frequencies in kHz.
    pub fn frequency_range(&self) -> RangeInclusive<f64> {
        match self {
            Self::Vor => 108.0..=118.0,
            Self::Ndb => 190.0..=1750.0,
        }
    }
}

impl fmt::Display for NavaidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vor => write!(f, "VOR"),
            Self::Ndb => write!(f, "NDB"),
        }
    }
}

/// A line of `Navaids.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct Navaid {
    pub ident: String,
    /// Kept as written so the output repeats the source precision.
    pub frequency: String,
    pub frequency_value: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Navaid {
    pub fn is_kind(&self, kind: NavaidKind) -> bool {
        kind.frequency_range().contains(&self.frequency_value)
    }

    fn from_record(record: &StringRecord) -> Option<Self> {
        let number = |index: usize| record.get(index)?.parse::<f64>().ok();
        match (number(2), number(6), number(7)) {
            (Some(frequency_value), Some(latitude), Some(longitude)) => Some(Self {
                ident: record[0].to_string(),
                frequency: record[2].to_string(),
                frequency_value,
                latitude,
                longitude,
            }),
            _ => {
                warn!(line = ?record, "Skipping navaid with unparsable numbers");
                None
            }
        }
    }
}

/// A line of `waypoints.txt`: `ident,lat,lon`.
#[derive(Debug, Clone, PartialEq)]
pub struct FixPoint {
    pub ident: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl FixPoint {
    fn from_record(record: &StringRecord) -> Option<Self> {
        let number = |index: usize| record.get(index)?.parse::<f64>().ok();
        match (number(1), number(2)) {
            (Some(latitude), Some(longitude)) => Some(Self {
                ident: record[0].to_string(),
                latitude,
                longitude,
            }),
            _ => {
                warn!(line = ?record, "Skipping waypoint with unparsable coordinates");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaypointRow {
    #[serde(rename = "Ident")]
    pub ident: String,
    #[serde(rename = "LAT")]
    pub latitude: f64,
    #[serde(rename = "LON")]
    pub longitude: f64,
}

impl TableRecord for WaypointRow {
    const TABLE: &'static str = "waypoint.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["Ident", "LAT", "LON"];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirportRow {
    #[serde(rename = "ICAO")]
    pub icao: String,
    #[serde(rename = "LAT")]
    pub latitude: f64,
    #[serde(rename = "LON")]
    pub longitude: f64,
}

impl TableRecord for AirportRow {
    const TABLE: &'static str = "airport.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["ICAO", "LAT", "LON"];
}

/// Reads headerless comma separated lines, dropping the ones with too few fields.
fn read_records<R: Read>(reader: &mut R, min_fields: usize) -> ProcedureResult<Vec<StringRecord>> {
    let text = read_with_encodings(reader)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.len() < min_fields {
            debug!(line = ?record, min_fields, "Skipping short line");
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

pub fn read_navaids<R: Read>(reader: &mut R) -> ProcedureResult<Vec<Navaid>> {
    let navaids = read_records(reader, NAVAID_MIN_FIELDS)?
        .iter()
        .filter_map(Navaid::from_record)
        .collect_vec();
    debug!(navaids = navaids.len(), "Read navaids");
    Ok(navaids)
}

pub fn read_fix_points<R: Read>(reader: &mut R) -> ProcedureResult<Vec<FixPoint>> {
    let points = read_records(reader, WAYPOINT_MIN_FIELDS)?
        .iter()
        .filter_map(FixPoint::from_record)
        .collect_vec();
    debug!(points = points.len(), "Read waypoints");
    Ok(points)
}

/// `VNO  114.900 N054.38.34.800 E025.17.24.000`
pub fn navaid_lines(navaids: &[Navaid], kind: NavaidKind, bbox: &BoundingBox) -> Vec<String> {
    let lines = navaids
        .iter()
        .filter(|navaid| navaid.is_kind(kind))
        .filter(|navaid| bbox.contains(navaid.latitude, navaid.longitude))
        .map(|navaid| {
            format!(
                "{:<4} {} {}",
                navaid.ident,
                navaid.frequency,
                format_coordinate(navaid.latitude, navaid.longitude)
            )
        })
        .collect_vec();
    debug!(%kind, lines = lines.len(), "Extracted navaids");
    lines
}

/// All `waypoint.csv` rows, then the `waypoints.txt` points inside the box.
pub fn fix_lines(rows: &[WaypointRow], points: &[FixPoint], bbox: &BoundingBox) -> Vec<String> {
    let own = rows
        .iter()
        .map(|row| (row.ident.as_str(), row.latitude, row.longitude));
    let navdata = points
        .iter()
        .filter(|point| bbox.contains(point.latitude, point.longitude))
        .map(|point| (point.ident.as_str(), point.latitude, point.longitude));

    own.chain(navdata)
        .map(|(ident, latitude, longitude)| {
            format!("{ident:<10} {}", format_coordinate(latitude, longitude))
        })
        .collect()
}

pub fn airport_lines(rows: &[AirportRow], allowed: &AirportAllowList) -> Vec<String> {
    rows.iter()
        .filter(|row| allowed.matches(&row.icao))
        .map(|row| {
            format!(
                "{} 000.000 {} D",
                row.icao,
                format_coordinate(row.latitude, row.longitude)
            )
        })
        .collect()
}

pub fn runway_lines(rows: &[RunwayGeometry], allowed: &AirportAllowList) -> Vec<String> {
    rows.iter()
        .filter(|row| allowed.matches(&row.icao))
        .map(|row| {
            format!(
                "{} {} {} {} {} {} {}",
                row.ident1,
                row.ident2,
                row.course1,
                row.course2,
                format_coordinate(row.lat1, row.lon1),
                format_coordinate(row.lat2, row.lon2),
                row.icao
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tracing_test::traced_test;

    use super::*;
    use crate::table::load_table;

    fn bbox() -> BoundingBox {
        BoundingBox {
            min_lat: 53.5,
            max_lat: 56.5,
            min_lon: 20.9,
            max_lon: 26.9,
        }
    }

    fn navaids() -> Vec<Navaid> {
        let mut reader = Cursor::new(include_str!("../test_data/Navaids.txt"));
        read_navaids(&mut reader).unwrap()
    }

    #[test]
    #[traced_test]
    fn test_read_navaids_skips_bad_lines() {
        let navaids = navaids();
        assert_eq!(
            navaids.iter().map(|n| n.ident.as_str()).collect_vec(),
            vec!["VNO", "KNA", "RIA", "BA", "LA", "EDGE"]
        );
        assert!(logs_contain("Skipping navaid with unparsable numbers"));
        assert!(logs_contain("Skipping short line"));
    }

    #[test]
    fn test_vor_lines() {
        assert_eq!(
            navaid_lines(&navaids(), NavaidKind::Vor, &bbox()),
            vec![
                "VNO  114.900 N054.38.34.800 E025.17.24.000",
                "KNA  113.400 N054.54.09.000 E023.54.27.000",
                "EDGE 118.000 N054.30.00.000 E025.00.00.000",
            ]
        );
    }

    #[test]
    fn test_ndb_lines() {
        assert_eq!(
            navaid_lines(&navaids(), NavaidKind::Ndb, &bbox()),
            vec![
                "BA   399.000 N054.42.00.000 E025.30.00.000",
                "LA   1750.000 N055.00.00.000 E026.00.00.000",
            ]
        );
    }

    #[test]
    fn test_fix_lines_filter_only_navdata() {
        let mut rows = Cursor::new(include_str!("../test_data/waypoint.csv"));
        let rows = load_table::<WaypointRow, _>(&mut rows).unwrap();
        let mut points = Cursor::new(include_str!("../test_data/waypoints.txt"));
        let points = read_fix_points(&mut points).unwrap();
        assert_eq!(
            fix_lines(&rows, &points, &bbox()),
            vec![
                "VI610      N054.37.12.000 E025.16.48.000",
                "FARAWAY    N060.00.00.000 E030.00.00.000",
                "TEXAS      N054.48.45.000 E025.24.45.000",
                "BALTI      N054.54.45.000 E025.36.45.000",
            ]
        );
    }

    #[test]
    fn test_airport_lines_use_allow_list() {
        let mut reader = Cursor::new(include_str!("../test_data/airport.csv"));
        let rows = load_table::<AirportRow, _>(&mut reader).unwrap();
        assert_eq!(
            airport_lines(&rows, &AirportAllowList::parse("EYV, EYKA")),
            vec![
                "EYVI 000.000 N054.38.06.000 E025.17.06.000 D",
                "EYKA 000.000 N054.57.36.000 E024.05.06.000 D",
            ]
        );
    }

    #[test]
    fn test_runway_lines() {
        let mut reader = Cursor::new(include_str!("../test_data/runway.csv"));
        let rows = load_table::<RunwayGeometry, _>(&mut reader).unwrap();
        assert_eq!(
            runway_lines(&rows, &AirportAllowList::parse("EYVI")),
            vec![
                "01 19 12 192 N054.37.12.000 E025.16.48.000 N054.39.09.000 E025.17.33.000 EYVI"
            ]
        );
    }
}
