use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use tracing::debug;

use crate::{
    error::ProcedureResult,
    procedure::{ALL_RUNWAYS, ProcType, ProcedureLeg, ProcedureRow, legs_from_rows},
    runway::RunwayRecord,
    table::load_table_file,
};

/// Read-only view over the procedure and runway tables, indexed once per run.
#[derive(Debug, Default)]
pub struct ProcedureStore {
    legs: Vec<ProcedureLeg>,
    by_route: IndexMap<(String, String), Vec<usize>>,
    runways: IndexMap<String, Vec<RunwayRecord>>,
}

/// What a single resolver step asks the store for.
#[derive(Debug, Clone, Copy)]
pub struct LegQuery<'a> {
    pub icao: &'a str,
    pub route_type: char,
    pub runway: &'a str,
    pub proc_type: ProcType,
    pub last_waypoint: Option<&'a str>,
}

impl ProcedureStore {
    pub fn new(legs: Vec<ProcedureLeg>, runways: Vec<RunwayRecord>) -> Self {
        let mut by_route: IndexMap<(String, String), Vec<usize>> = IndexMap::new();
        for (index, leg) in legs.iter().enumerate() {
            if leg.waypoints.is_empty() {
                debug!(
                    leg.icao,
                    leg.proc_ident,
                    leg.row,
                    "Leg without waypoints does not take part in combining"
                );
                continue;
            }
            by_route
                .entry((leg.icao.clone(), leg.route_type.clone()))
                .or_default()
                .push(index);
        }

        let mut runways_by_icao: IndexMap<String, Vec<RunwayRecord>> = IndexMap::new();
        for runway in runways {
            runways_by_icao
                .entry(runway.icao.clone())
                .or_default()
                .push(runway);
        }

        Self {
            legs,
            by_route,
            runways: runways_by_icao,
        }
    }

    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        procedure_file: P,
        runway_file: Q,
    ) -> ProcedureResult<Self> {
        let legs = legs_from_rows(load_table_file::<ProcedureRow, _>(procedure_file)?);
        let runways = load_table_file::<RunwayRecord, _>(runway_file)?;
        Ok(Self::new(legs, runways))
    }

    pub fn legs(&self) -> &[ProcedureLeg] {
        &self.legs
    }

    /// Legs continuing a chain, in table order.
    pub fn matching_legs<'s>(
        &'s self,
        query: LegQuery<'s>,
    ) -> impl Iterator<Item = &'s ProcedureLeg> + 's {
        let key = (query.icao.to_string(), query.route_type.to_string());
        self.by_route
            .get(&key)
            .into_iter()
            .flatten()
            .map(|&index| &self.legs[index])
            .filter(move |leg| {
                (leg.runway == query.runway
                    || leg.applies_to_all_runways()
                    || query.runway == ALL_RUNWAYS)
                    && query.proc_type.accepts_leg(leg.proc_type)
                    && query
                        .last_waypoint
                        .is_none_or(|last| leg.first_waypoint_starts_with(last))
            })
    }

    /// Every runway end at `icao`, sorted ascending.
    pub fn runway_idents(&self, icao: &str) -> Vec<String> {
        self.runways
            .get(icao)
            .into_iter()
            .flatten()
            .flat_map(RunwayRecord::idents)
            .map(str::to_owned)
            .sorted()
            .collect()
    }
}
