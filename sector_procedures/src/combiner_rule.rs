use itertools::Itertools;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{ProcedureError, ProcedureResult},
    procedure::ProcType,
    table::TableRecord,
};

/// Raw row of `ProceduresCombiner.csv`.
#[derive(Debug, Deserialize)]
pub struct CombinerRuleRow {
    #[serde(rename = "Active", default)]
    pub active: String,
    #[serde(rename = "Type")]
    pub proc_type: String,
    #[serde(rename = "ICAO")]
    pub icao: String,
    #[serde(rename = "Sortorder", default)]
    pub sort_order: String,
    #[serde(rename = "Regex", default)]
    pub include_regex: String,
    #[serde(rename = "Iregex", default)]
    pub exclude_regex: String,
    #[serde(rename = "Combine", default)]
    pub combine: String,
    #[serde(rename = "Runway", default)]
    pub runway: String,
    #[serde(rename = "Namesortorder", default)]
    pub name_sort_order: String,
}

impl TableRecord for CombinerRuleRow {
    const TABLE: &'static str = "ProceduresCombiner.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "Active",
        "Type",
        "ICAO",
        "Sortorder",
        "Regex",
        "Iregex",
        "Combine",
        "Runway",
        "Namesortorder",
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinerRule {
    pub icao: String,
    pub proc_type: ProcType,
    pub runway: String,
    pub combine: Vec<String>,
    pub include_regex: Option<String>,
    pub exclude_regex: Option<String>,
    pub name_sort_order: Option<String>,
    /// Compared as text, so `10` comes before `2`.
    pub sort_order: String,
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

impl CombinerRuleRow {
    pub fn is_active(&self) -> bool {
        self.active == "1"
    }

    pub fn into_rule(self) -> ProcedureResult<CombinerRule> {
        Ok(CombinerRule {
            proc_type: self.proc_type.parse()?,
            icao: self.icao,
            runway: self.runway,
            combine: self
                .combine
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
            include_regex: non_empty(self.include_regex),
            exclude_regex: non_empty(self.exclude_regex),
            name_sort_order: non_empty(self.name_sort_order),
            sort_order: self.sort_order,
        })
    }
}

/// Active rules of a combiner table, plus the active rows that could not become a rule.
#[derive(Debug, Default)]
pub struct RuleSet {
    pub rules: Vec<CombinerRule>,
    pub rejected: Vec<ProcedureError>,
}

/// Active rules in application order: `(type, icao, sort order)`, ties keep table order.
///
/// A row with an unknown `Type` is rejected on its own; the remaining rules are kept.
pub fn active_rules(rows: Vec<CombinerRuleRow>) -> RuleSet {
    let total = rows.len();
    let (rules, rejected): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .filter(CombinerRuleRow::is_active)
        .map(|row| {
            let icao = row.icao.clone();
            row.into_rule().inspect_err(|e| {
                warn!(icao = %icao, "Ignoring combiner rule: {e}");
            })
        })
        .partition_result();
    debug!(
        active = rules.len(),
        rejected = rejected.len(),
        total,
        "Selected active combiner rules"
    );
    RuleSet {
        rules: rules
            .into_iter()
            .sorted_by(|a, b| {
                (a.proc_type.as_str(), &a.icao, &a.sort_order).cmp(&(
                    b.proc_type.as_str(),
                    &b.icao,
                    &b.sort_order,
                ))
            })
            .collect(),
        rejected,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Keep,
    NotIncluded,
    Excluded,
}

#[derive(Debug)]
pub struct RuleFilters {
    pub include: Option<Regex>,
    pub exclude: Option<Regex>,
    pub name_sort_order: Vec<Regex>,
}

impl RuleFilters {
    /// Include takes precedence when both filters are set.
    pub fn decide(&self, full_id: &str) -> FilterDecision {
        match (&self.include, &self.exclude) {
            (Some(include), _) if include.is_match(full_id) => FilterDecision::Keep,
            (Some(_), _) => FilterDecision::NotIncluded,
            (None, Some(exclude)) if exclude.is_match(full_id) => FilterDecision::Excluded,
            _ => FilterDecision::Keep,
        }
    }
}

impl CombinerRule {
    fn compile(&self, column: &'static str, pattern: &str) -> ProcedureResult<Regex> {
        Regex::new(pattern).map_err(|source| ProcedureError::InvalidRegex {
            icao: self.icao.clone(),
            proc_type: self.proc_type.to_string(),
            column,
            source,
        })
    }

    pub fn compile_filters(&self) -> ProcedureResult<RuleFilters> {
        let include = self
            .include_regex
            .as_deref()
            .map(|pattern| self.compile("Regex", pattern))
            .transpose()?;
        let exclude = self
            .exclude_regex
            .as_deref()
            .map(|pattern| self.compile("Iregex", pattern))
            .transpose()?;
        let name_sort_order = self
            .name_sort_order
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(|pattern| self.compile("Namesortorder", pattern))
            .collect::<ProcedureResult<Vec<_>>>()?;
        Ok(RuleFilters {
            include,
            exclude,
            name_sort_order,
        })
    }
}
