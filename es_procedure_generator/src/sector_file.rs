use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use itertools::Itertools;
use sector_procedures::{
    drawing::{DrawSection, procedure_draw_lines},
    navdata::{
        AirportRow, NavaidKind, WaypointRow, airport_lines, fix_lines, navaid_lines,
        read_fix_points, read_navaids, runway_lines,
    },
    runway::RunwayGeometry,
    settings::Settings,
    store::ProcedureStore,
    table::{TableRecord, load_table_file},
};
use tracing::{debug, info};

use crate::{
    config::GeneratorConfig,
    error::{ApplicationError, ApplicationResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectorSection {
    Vor,
    Ndb,
    Fixes,
    Airport,
    Runway,
    Drawing(DrawSection),
}

impl SectorSection {
    pub fn all() -> impl Iterator<Item = SectorSection> {
        [Self::Vor, Self::Ndb, Self::Fixes, Self::Airport, Self::Runway]
            .into_iter()
            .chain(DrawSection::ALL.into_iter().map(Self::Drawing))
    }

    pub fn file_name(&self) -> String {
        let name = match self {
            Self::Vor => "VOR",
            Self::Ndb => "NDB",
            Self::Fixes => "FIXES",
            Self::Airport => "AIRPORT",
            Self::Runway => "RUNWAY",
            Self::Drawing(section) => section.label(),
        };
        format!("{name}.txt")
    }
}

pub(crate) fn load_settings(path: &Path) -> ApplicationResult<Settings> {
    load_table_file::<Settings, _>(path)?
        .into_iter()
        .next()
        .ok_or(ApplicationError::EmptyTable(Settings::TABLE))
}

fn write_section_file(path: &Path, lines: &[String]) -> ApplicationResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

fn section_lines(
    section: SectorSection,
    config: &GeneratorConfig,
    settings: &Settings,
    store: &ProcedureStore,
) -> ApplicationResult<Vec<String>> {
    let bbox = settings.bounding_box();
    let lines = match section {
        SectorSection::Vor | SectorSection::Ndb => {
            let kind = if section == SectorSection::Vor {
                NavaidKind::Vor
            } else {
                NavaidKind::Ndb
            };
            let navaids = read_navaids(&mut File::open(config.navaids_path())?)?;
            navaid_lines(&navaids, kind, &bbox)
        }
        SectorSection::Fixes => {
            let rows = load_table_file::<WaypointRow, _>(config.waypoint_table_path())?;
            let points = read_fix_points(&mut File::open(config.navdata_waypoints_path())?)?;
            fix_lines(&rows, &points, &bbox)
        }
        SectorSection::Airport => {
            let rows = load_table_file::<AirportRow, _>(config.airport_table_path())?;
            airport_lines(&rows, &settings.airports())
        }
        SectorSection::Runway => {
            let rows = load_table_file::<RunwayGeometry, _>(config.runway_table_path())?;
            runway_lines(&rows, &settings.runway_airports())
        }
        SectorSection::Drawing(draw_section) => procedure_draw_lines(store.legs(), draw_section),
    };
    Ok(lines)
}

/// Writes every enabled section file into the output folder.
pub(crate) fn write_sector_sections(
    config: &GeneratorConfig,
    store: &ProcedureStore,
) -> ApplicationResult<Vec<SectorSection>> {
    let settings = load_settings(&config.settings_table_path())?;
    info!(airac = %settings.airac, "Writing sector sections");

    let (enabled, disabled): (Vec<_>, Vec<_>) =
        SectorSection::all().partition(|section| config.is_section_enabled(*section));
    if !disabled.is_empty() {
        debug!(sections = ?disabled.iter().map(SectorSection::file_name).collect_vec(), "Sections disabled");
    }

    for section in &enabled {
        let lines = section_lines(*section, config, &settings, store)?;
        let path = config.section_path(*section);
        write_section_file(&path, &lines)?;
        info!(file = %path.display(), lines = lines.len(), "Wrote section");
    }
    Ok(enabled)
}
