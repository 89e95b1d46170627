use serde::Deserialize;

use crate::table::TableRecord;

/// The single row of `setting.csv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(rename = "minLat")]
    pub min_lat: f64,
    #[serde(rename = "maxLat")]
    pub max_lat: f64,
    #[serde(rename = "minLon")]
    pub min_lon: f64,
    #[serde(rename = "maxLon")]
    pub max_lon: f64,
    #[serde(rename = "SidStarAirports", default)]
    pub sid_star_airports: String,
    #[serde(rename = "Airac", default)]
    pub airac: String,
    #[serde(rename = "AirportRWY", default)]
    pub airport_runways: Option<String>,
}

impl TableRecord for Settings {
    const TABLE: &'static str = "setting.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "minLat",
        "maxLat",
        "minLon",
        "maxLon",
        "SidStarAirports",
        "Airac",
    ];
}

impl Settings {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat,
            max_lat: self.max_lat,
            min_lon: self.min_lon,
            max_lon: self.max_lon,
        }
    }

    pub fn airports(&self) -> AirportAllowList {
        AirportAllowList::parse(&self.sid_star_airports)
    }

    /// Falls back to the SID/STAR airports when no runway list is configured.
    pub fn runway_airports(&self) -> AirportAllowList {
        match &self.airport_runways {
            Some(list) => AirportAllowList::parse(list),
            None => self.airports(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Points on an edge are outside.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.min_lat < latitude
            && latitude < self.max_lat
            && self.min_lon < longitude
            && longitude < self.max_lon
    }
}

/// Comma separated ICAO prefixes, e.g. `EY, ESSA`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirportAllowList {
    prefixes: Vec<String>,
}

impl AirportAllowList {
    /// An empty entry, including an entirely empty list, allows every airport.
    pub fn parse(list: &str) -> Self {
        let compact = list.replace(' ', "");
        Self {
            prefixes: compact.split(',').map(str::to_owned).collect(),
        }
    }

    pub fn matches(&self, icao: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| icao.starts_with(prefix.as_str()))
    }
}
