use std::{fmt, str::FromStr};

use serde::Deserialize;
use tracing::warn;

use crate::{
    error::{ProcedureError, ProcedureResult},
    table::TableRecord,
};

pub const ALL_RUNWAYS: &str = "ALL";
pub const SKIP_ROUTE_TYPE: char = '*';
pub const APPROACH_TRANSITION_ROUTE_TYPE: &str = "A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcType {
    Sid,
    Star,
    App,
}

impl ProcType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sid => "SID",
            Self::Star => "STAR",
            Self::App => "APP",
        }
    }

    /// Whether a leg of `leg_type` may continue a chain built for `self`.
    ///
    /// Approach legs double as STAR continuations.
    pub fn accepts_leg(&self, leg_type: ProcType) -> bool {
        match self {
            Self::Star => matches!(leg_type, Self::Star | Self::App),
            Self::Sid | Self::App => leg_type == Self::Sid,
        }
    }
}

impl FromStr for ProcType {
    type Err = ProcedureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SID" => Ok(Self::Sid),
            "STAR" => Ok(Self::Star),
            "APP" => Ok(Self::App),
            other => Err(ProcedureError::InvalidProcType(other.to_string())),
        }
    }
}

impl fmt::Display for ProcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureLeg {
    pub row: usize,
    pub icao: String,
    pub proc_type: ProcType,
    pub route_type: String,
    pub runway: String,
    pub proc_ident: String,
    pub waypoints: Vec<String>,
    pub draw_coordinates: Vec<DrawCoordinate>,
}

impl ProcedureLeg {
    pub fn is_final_segment(&self) -> bool {
        self.proc_type == ProcType::App && self.route_type != APPROACH_TRANSITION_ROUTE_TYPE
    }

    pub fn applies_to_all_runways(&self) -> bool {
        self.runway == ALL_RUNWAYS
    }

    pub fn first_waypoint_starts_with(&self, prefix: &str) -> bool {
        self.waypoints
            .first()
            .is_some_and(|waypoint| waypoint.starts_with(prefix))
    }

    pub fn last_waypoint(&self) -> Option<&str> {
        self.waypoints.last().map(String::as_str)
    }
}

/// Raw row of `Procedure.csv`.
#[derive(Debug, Deserialize)]
pub struct ProcedureRow {
    #[serde(rename = "ICAO")]
    pub icao: String,
    #[serde(rename = "Proctype")]
    pub proc_type: String,
    #[serde(rename = "Routetype", default)]
    pub route_type: String,
    #[serde(rename = "Runway", default)]
    pub runway: String,
    #[serde(rename = "Procident")]
    pub proc_ident: String,
    #[serde(rename = "Waypoints", default)]
    pub waypoints: String,
    #[serde(rename = "Drawcoordinates", default)]
    pub draw_coordinates: String,
}

impl TableRecord for ProcedureRow {
    const TABLE: &'static str = "Procedure.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "ICAO",
        "Proctype",
        "Routetype",
        "Runway",
        "Procident",
        "Waypoints",
        "Drawcoordinates",
    ];
}

impl ProcedureRow {
    /// Fails only on an unknown `Proctype`. Unreadable draw coordinates leave
    /// the leg without a drawing.
    pub fn into_leg(self, row: usize) -> ProcedureResult<ProcedureLeg> {
        let proc_type = self.proc_type.parse()?;
        let draw_coordinates = parse_draw_coordinates(&self.draw_coordinates, &self.proc_ident)
            .unwrap_or_else(|e| {
                warn!(icao = %self.icao, row, "Dropping draw coordinates: {e}");
                Vec::new()
            });
        Ok(ProcedureLeg {
            row,
            icao: self.icao,
            proc_type,
            route_type: self.route_type,
            runway: self.runway,
            proc_ident: self.proc_ident,
            waypoints: self.waypoints.split_whitespace().map(str::to_owned).collect(),
            draw_coordinates,
        })
    }
}

/// Legs in table order. Rows with an unknown `Proctype` are skipped.
pub fn legs_from_rows(rows: Vec<ProcedureRow>) -> Vec<ProcedureLeg> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(row, raw)| {
            let icao = raw.icao.clone();
            raw.into_leg(row)
                .inspect_err(|e| warn!(icao = %icao, row, "Skipping procedure leg: {e}"))
                .ok()
        })
        .collect()
}

/// Parses `lat|lon lat|lon ...`.
fn parse_draw_coordinates(cell: &str, proc_ident: &str) -> ProcedureResult<Vec<DrawCoordinate>> {
    cell.split_whitespace()
        .map(|token| {
            let invalid = || ProcedureError::InvalidDrawCoordinate {
                proc_ident: proc_ident.to_string(),
                token: token.to_string(),
            };
            let (lat, lon) = token.split_once('|').ok_or_else(invalid)?;
            Ok(DrawCoordinate {
                latitude: lat.parse().map_err(|_| invalid())?,
                longitude: lon.parse().map_err(|_| invalid())?,
            })
        })
        .collect()
}
