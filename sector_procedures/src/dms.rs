use nom::{
    Finish, IResult, Parser,
    bytes::complete::take,
    character::complete::{char, one_of, u32},
    combinator::{all_consuming, map_opt, map_parser},
    number::complete::double,
};

use crate::error::{ProcedureError, ProcedureResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    pub fn of(value: f64, is_latitude: bool) -> Self {
        match (is_latitude, value < 0.0) {
            (true, false) => Self::North,
            (true, true) => Self::South,
            (false, false) => Self::East,
            (false, true) => Self::West,
        }
    }

    pub const fn letter(&self) -> char {
        match self {
            Self::North => 'N',
            Self::South => 'S',
            Self::East => 'E',
            Self::West => 'W',
        }
    }

    const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'N' => Some(Self::North),
            'S' => Some(Self::South),
            'E' => Some(Self::East),
            'W' => Some(Self::West),
            _ => None,
        }
    }

    const fn sign(&self) -> f64 {
        match self {
            Self::North | Self::East => 1.0,
            Self::South | Self::West => -1.0,
        }
    }
}

/// Formats decimal degrees as `N054.41.23.399`.
///
/// Degrees and minutes are truncated, only the seconds go through decimal
/// rounding when printed with three fractional digits.
pub fn format_dms(value: f64, is_latitude: bool) -> String {
    let hemisphere = Hemisphere::of(value, is_latitude);
    let magnitude = value.abs();
    let degrees = magnitude.floor();
    let minutes_float = (magnitude - degrees) * 60.0;
    let minutes = minutes_float.floor();
    let seconds = (minutes_float - minutes) * 60.0;
    format!(
        "{}{:03}.{:02}.{:06.3}",
        hemisphere.letter(),
        degrees as u32,
        minutes as u32,
        seconds
    )
}

/// Latitude and longitude separated by a single space.
pub fn format_coordinate(latitude: f64, longitude: f64) -> String {
    format!(
        "{} {}",
        format_dms(latitude, true),
        format_dms(longitude, false)
    )
}

fn nom_dms(input: &str) -> IResult<&str, f64> {
    (
        map_opt(one_of("NSEW"), Hemisphere::from_letter),
        map_parser(take(3usize), all_consuming(u32)),
        char('.'),
        map_parser(take(2usize), all_consuming(u32)),
        char('.'),
        double,
    )
        .map(|(hemisphere, degrees, _, minutes, _, seconds)| {
            hemisphere.sign() * (degrees as f64 + minutes as f64 / 60.0 + seconds / 3600.0)
        })
        .parse(input)
}

pub fn parse_dms(text: &str) -> ProcedureResult<f64> {
    all_consuming(nom_dms)
        .parse(text)
        .finish()
        .map(|(_, value)| value)
        .map_err(|_: nom::error::Error<&str>| ProcedureError::InvalidDms(text.to_string()))
}
