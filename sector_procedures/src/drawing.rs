use std::fmt;

use itertools::Itertools;

use crate::{
    dms::format_coordinate,
    procedure::{DrawCoordinate, ProcType, ProcedureLeg},
};

/// Width of the `ICAO TYPE RUNWAY IDENT` column in drawing lines.
pub const DRAW_HEADER_WIDTH: usize = 41;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSection {
    Sid,
    Star,
    App,
    Final,
}

impl DrawSection {
    pub const ALL: [DrawSection; 4] = [Self::Sid, Self::Star, Self::App, Self::Final];

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Sid => "SID",
            Self::Star => "STAR",
            Self::App => "APP",
            Self::Final => "FINAL",
        }
    }

    /// Approach legs are split between transitions (`APP`) and final segments (`FINAL`).
    pub fn includes(&self, leg: &ProcedureLeg) -> bool {
        match self {
            Self::Sid => leg.proc_type == ProcType::Sid,
            Self::Star => leg.proc_type == ProcType::Star,
            Self::App => leg.proc_type == ProcType::App && !leg.is_final_segment(),
            Self::Final => leg.is_final_segment(),
        }
    }
}

impl fmt::Display for DrawSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn segment(from: &DrawCoordinate, to: &DrawCoordinate) -> String {
    format!(
        "{} {}",
        format_coordinate(from.latitude, from.longitude),
        format_coordinate(to.latitude, to.longitude)
    )
}

/// One line per consecutive coordinate pair, the first one carrying the header.
pub fn leg_draw_lines(leg: &ProcedureLeg, section: DrawSection) -> Vec<String> {
    let header = format!(
        "{} {} {} {}",
        leg.icao,
        section.label(),
        leg.runway,
        leg.proc_ident
    );
    leg.draw_coordinates
        .iter()
        .tuple_windows()
        .enumerate()
        .map(|(index, (from, to))| {
            let prefix = if index == 0 { header.as_str() } else { "" };
            format!("{prefix:<DRAW_HEADER_WIDTH$}{}", segment(from, to))
        })
        .collect()
}

pub fn procedure_draw_lines(legs: &[ProcedureLeg], section: DrawSection) -> Vec<String> {
    legs.iter()
        .filter(|leg| section.includes(leg))
        .flat_map(|leg| leg_draw_lines(leg, section))
        .collect()
}
