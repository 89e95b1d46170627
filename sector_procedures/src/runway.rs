use serde::Deserialize;

use crate::table::TableRecord;

/// Both ends of one physical runway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunwayRecord {
    #[serde(rename = "ICAO")]
    pub icao: String,
    #[serde(rename = "Ident1")]
    pub ident1: String,
    #[serde(rename = "Ident2")]
    pub ident2: String,
}

impl TableRecord for RunwayRecord {
    const TABLE: &'static str = "runway.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["ICAO", "Ident1", "Ident2"];
}

impl RunwayRecord {
    pub fn idents(&self) -> [&str; 2] {
        [&self.ident1, &self.ident2]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunwayGeometry {
    #[serde(rename = "ICAO")]
    pub icao: String,
    #[serde(rename = "Ident1")]
    pub ident1: String,
    #[serde(rename = "Ident2")]
    pub ident2: String,
    #[serde(rename = "Course1")]
    pub course1: String,
    #[serde(rename = "Course2")]
    pub course2: String,
    #[serde(rename = "LAT1")]
    pub lat1: f64,
    #[serde(rename = "LON1")]
    pub lon1: f64,
    #[serde(rename = "LAT2")]
    pub lat2: f64,
    #[serde(rename = "LON2")]
    pub lon2: f64,
}

impl TableRecord for RunwayGeometry {
    const TABLE: &'static str = "runway.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "ICAO", "Ident1", "Ident2", "Course1", "Course2", "LAT1", "LON1", "LAT2", "LON2",
    ];
}
