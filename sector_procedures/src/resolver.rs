use std::fmt;

use itertools::Itertools;
use tracing::debug;

use crate::{
    procedure::{ALL_RUNWAYS, ProcType, ProcedureLeg, SKIP_ROUTE_TYPE},
    store::{LegQuery, ProcedureStore},
};

/// A fully chained procedure, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProcedure {
    pub proc_type: ProcType,
    pub icao: String,
    pub runway: String,
    pub full_id: String,
    pub display_id: String,
    pub waypoints: Vec<String>,
    pub combiner: String,
}

impl ResolvedProcedure {
    pub fn new(
        proc_type: ProcType,
        icao: String,
        runway: String,
        full_id: String,
        display_id: String,
        waypoints: Vec<String>,
    ) -> Self {
        Self {
            proc_type,
            icao,
            runway,
            full_id,
            display_id,
            waypoints: remove_duplicate_waypoints(waypoints),
            combiner: String::new(),
        }
    }

    pub fn with_combiner(mut self, combiner: &str) -> Self {
        self.combiner = combiner.to_string();
        self
    }

    /// Identity used for deduplication. The runway is not part of it.
    pub fn dedup_key(&self) -> (String, String, Vec<String>) {
        (
            self.icao.clone(),
            self.display_id.clone(),
            self.waypoints.clone(),
        )
    }
}

impl fmt::Display for ResolvedProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}; Combiner={} | ID={}",
            self.proc_type,
            self.icao,
            self.runway,
            self.display_id,
            self.waypoints.join(" "),
            self.combiner,
            self.full_id
        )
    }
}

/// Removes repeated waypoints, keeping the first occurrence.
pub fn remove_duplicate_waypoints(waypoints: Vec<String>) -> Vec<String> {
    waypoints.into_iter().unique().collect()
}

/// Everything carried from one resolver step to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainState {
    pub runway: String,
    pub last_waypoint: Option<String>,
    pub waypoints: Vec<String>,
    pub full_id: Option<String>,
    pub display_id: Option<String>,
    pub skip_next_ident: bool,
}

fn join_ident(chain: Option<&str>, ident: &str) -> String {
    match chain {
        Some(chain) if !chain.is_empty() => format!("{chain}x{ident}"),
        _ => ident.to_string(),
    }
}

impl ChainState {
    pub fn new(runway: &str) -> Self {
        Self {
            runway: runway.to_string(),
            ..Self::default()
        }
    }

    fn extended_with(&self, leg: &ProcedureLeg) -> Self {
        let display_id = if self.skip_next_ident {
            self.display_id.clone()
        } else {
            Some(join_ident(self.display_id.as_deref(), &leg.proc_ident))
        };
        let runway = if leg.runway.is_empty() || leg.applies_to_all_runways() {
            self.runway.clone()
        } else {
            leg.runway.clone()
        };
        Self {
            runway,
            last_waypoint: leg.last_waypoint().map(str::to_owned),
            waypoints: self
                .waypoints
                .iter()
                .chain(&leg.waypoints)
                .cloned()
                .collect(),
            full_id: Some(join_ident(self.full_id.as_deref(), &leg.proc_ident)),
            display_id,
            skip_next_ident: false,
        }
    }
}

/// Expands combiner strings such as `1*A` into every chain of legs they describe.
#[derive(Debug, Clone, Copy)]
pub struct CombinerResolver<'a> {
    store: &'a ProcedureStore,
}

impl<'a> CombinerResolver<'a> {
    pub fn new(store: &'a ProcedureStore) -> Self {
        Self { store }
    }

    pub fn resolve(
        &self,
        codes: &[char],
        icao: &str,
        runway: &str,
        proc_type: ProcType,
    ) -> Vec<ResolvedProcedure> {
        self.resolve_from(codes, icao, proc_type, ChainState::new(runway))
    }

    pub fn resolve_from(
        &self,
        codes: &[char],
        icao: &str,
        proc_type: ProcType,
        state: ChainState,
    ) -> Vec<ResolvedProcedure> {
        let Some((&route_type, remaining)) = codes.split_first() else {
            return self.finish(icao, proc_type, state);
        };

        if route_type == SKIP_ROUTE_TYPE {
            debug!(icao, full_id = ?state.full_id, "Skipping ident of next leg");
            return self.resolve_from(
                remaining,
                icao,
                proc_type,
                ChainState {
                    skip_next_ident: true,
                    ..state
                },
            );
        }

        let query = LegQuery {
            icao,
            route_type,
            runway: &state.runway,
            proc_type,
            last_waypoint: state.last_waypoint.as_deref(),
        };
        let legs = self.store.matching_legs(query).collect_vec();
        if legs.is_empty() {
            debug!(
                icao,
                %route_type,
                runway = %state.runway,
                last_waypoint = ?state.last_waypoint,
                full_id = ?state.full_id,
                "No matching legs"
            );
            return Vec::new();
        }

        debug!(icao, %route_type, runway = %state.runway, legs = legs.len(), "Resolving route type");
        legs.into_iter()
            .flat_map(|leg| {
                self.resolve_from(remaining, icao, proc_type, state.extended_with(leg))
            })
            .collect()
    }

    fn finish(&self, icao: &str, proc_type: ProcType, state: ChainState) -> Vec<ResolvedProcedure> {
        let full_id = state.full_id.unwrap_or_default();
        let display_id = state.display_id.unwrap_or_default();
        let runways = if state.runway == ALL_RUNWAYS {
            let runways = self.store.runway_idents(icao);
            if runways.is_empty() {
                debug!(icao, full_id, "No runways to expand ALL into");
            }
            runways
        } else {
            vec![state.runway]
        };

        runways
            .into_iter()
            .map(|runway| {
                let resolved = ResolvedProcedure::new(
                    proc_type,
                    icao.to_string(),
                    runway.clone(),
                    format!("{runway}x{full_id}"),
                    display_id.clone(),
                    state.waypoints.clone(),
                );
                debug!(icao, full_id = %resolved.full_id, "Finished resolving");
                resolved
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{runway::RunwayRecord, store::tests::make_test_store};

    fn leg(proc_type: ProcType, route_type: &str, runway: &str, ident: &str, waypoints: &[&str]) -> ProcedureLeg {
        ProcedureLeg {
            row: 0,
            icao: "X".to_string(),
            proc_type,
            route_type: route_type.to_string(),
            runway: runway.to_string(),
            proc_ident: ident.to_string(),
            waypoints: waypoints.iter().map(|w| w.to_string()).collect(),
            draw_coordinates: Vec::new(),
        }
    }

    fn runway(ident1: &str, ident2: &str) -> RunwayRecord {
        RunwayRecord {
            icao: "X".to_string(),
            ident1: ident1.to_string(),
            ident2: ident2.to_string(),
        }
    }

    fn codes(combiner: &str) -> Vec<char> {
        combiner.chars().collect()
    }

    #[test]
    fn test_single_leg() {
        let store = ProcedureStore::new(
            vec![leg(ProcType::Sid, "A", "09", "AB1", &["W1", "W2"])],
            vec![],
        );
        let resolved = CombinerResolver::new(&store).resolve(&codes("A"), "X", "09", ProcType::Sid);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].full_id, "09xAB1");
        assert_eq!(resolved[0].display_id, "AB1");
        assert_eq!(resolved[0].waypoints, vec!["W1", "W2"]);
        assert_eq!(resolved[0].runway, "09");
    }

    #[test]
    fn test_all_runways_expand_sorted() {
        let store = ProcedureStore::new(
            vec![leg(ProcType::Sid, "A", "ALL", "AB1", &["W1", "W2"])],
            vec![runway("09", "27"), runway("18", "36")],
        );
        let resolved = CombinerResolver::new(&store).resolve(&codes("A"), "X", "ALL", ProcType::Sid);
        assert_eq!(
            resolved.iter().map(|p| p.runway.as_str()).collect_vec(),
            vec!["09", "18", "27", "36"]
        );
        assert_eq!(
            resolved.iter().map(|p| p.full_id.as_str()).collect_vec(),
            vec!["09xAB1", "18xAB1", "27xAB1", "36xAB1"]
        );
        assert!(resolved.iter().all(|p| p.display_id == "AB1"));
        assert!(resolved.iter().all(|p| p.waypoints == vec!["W1", "W2"]));
    }

    #[test]
    fn test_concrete_leg_runway_replaces_all() {
        let store = ProcedureStore::new(
            vec![leg(ProcType::Sid, "A", "09", "AB1", &["W1", "W2"])],
            vec![runway("09", "27"), runway("18", "36")],
        );
        let resolved = CombinerResolver::new(&store).resolve(&codes("A"), "X", "ALL", ProcType::Sid);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].runway, "09");
    }

    #[test]
    fn test_all_without_runway_records_is_empty() {
        let store = ProcedureStore::new(
            vec![leg(ProcType::Sid, "A", "ALL", "AB1", &["W1"])],
            vec![],
        );
        let resolved = CombinerResolver::new(&store).resolve(&codes("A"), "X", "ALL", ProcType::Sid);
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_skip_marker_hides_next_ident() {
        let store = ProcedureStore::new(
            vec![
                leg(ProcType::Sid, "1", "09", "AB1", &["W1", "W2"]),
                leg(ProcType::Sid, "A", "09", "CD2", &["W2", "W3"]),
            ],
            vec![],
        );
        let resolver = CombinerResolver::new(&store);

        let leading = resolver.resolve(&codes("*A"), "X", "09", ProcType::Sid);
        assert_eq!(leading.len(), 1);
        assert_eq!(leading[0].display_id, "");
        assert_eq!(leading[0].full_id, "09xCD2");

        let middle = resolver.resolve(&codes("1*A"), "X", "09", ProcType::Sid);
        assert_eq!(middle.len(), 1);
        assert_eq!(middle[0].display_id, "AB1");
        assert_eq!(middle[0].full_id, "09xAB1xCD2");
        assert_eq!(middle[0].waypoints, vec!["W1", "W2", "W3"]);
    }

    #[test]
    fn test_missing_route_type_is_empty() {
        let store = make_test_store();
        let resolver = CombinerResolver::new(&store);
        assert!(resolver.resolve(&codes("Z"), "EYVI", "01", ProcType::Sid).is_empty());
        assert!(resolver.resolve(&codes("1Z"), "EYVI", "01", ProcType::Sid).is_empty());
    }

    #[test]
    fn test_chain_follows_last_waypoint() {
        let store = make_test_store();
        let resolved =
            CombinerResolver::new(&store).resolve(&codes("1A"), "EYVI", "ALL", ProcType::Sid);
        assert_eq!(
            resolved.iter().map(|p| p.full_id.as_str()).collect_vec(),
            vec![
                "01xTEXAS1AxTEXAS",
                "01xTEXAS1AxTEXASX",
                "19xTEXAS1BxTEXAS",
                "19xTEXAS1BxTEXASX",
            ]
        );
        assert_eq!(resolved[0].display_id, "TEXAS1AxTEXAS");
        assert_eq!(resolved[0].waypoints, vec!["VI610", "VI620", "TEXAS", "BALTI"]);
        assert_eq!(
            resolved[1].waypoints,
            vec!["VI610", "VI620", "TEXAS", "TEXASX", "ERGAK"]
        );
    }

    #[test]
    fn test_star_chains_into_approach() {
        let store = make_test_store();
        let resolved =
            CombinerResolver::new(&store).resolve(&codes("1A"), "EYVI", "ALL", ProcType::Star);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].runway, "01");
        assert_eq!(resolved[0].full_id, "01xBALTI1VxVI520A");
        assert_eq!(resolved[0].waypoints, vec!["BALTI", "VI520", "VI510", "VI501"]);
    }

    #[test]
    fn test_empty_combiner_resolves_immediately() {
        let store = make_test_store();
        let state = ChainState {
            full_id: Some("AB1".to_string()),
            display_id: Some("AB1".to_string()),
            waypoints: vec!["W1".to_string(), "W1".to_string()],
            ..ChainState::new("01")
        };
        let resolved = CombinerResolver::new(&store).resolve_from(&[], "EYVI", ProcType::Sid, state);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].full_id, "01xAB1");
        assert_eq!(resolved[0].waypoints, vec!["W1"]);
    }

    #[test]
    fn test_waypoint_dedup_idempotent() {
        let waypoints = ["A", "B", "A", "C", "B"].map(str::to_owned).to_vec();
        let once = remove_duplicate_waypoints(waypoints);
        assert_eq!(once, vec!["A", "B", "C"]);
        assert_eq!(remove_duplicate_waypoints(once.clone()), once);
    }

    #[test]
    fn test_format_line() {
        let procedure = ResolvedProcedure::new(
            ProcType::Sid,
            "EYVI".to_string(),
            "01".to_string(),
            "01xTEXAS1AxTEXAS".to_string(),
            "TEXAS1A".to_string(),
            vec!["VI620".to_string(), "TEXAS".to_string()],
        )
        .with_combiner("1*A");
        assert_eq!(
            procedure.to_string(),
            "SID:EYVI:01:TEXAS1A:VI620 TEXAS; Combiner=1*A | ID=01xTEXAS1AxTEXAS"
        );
    }
}
