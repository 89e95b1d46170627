use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

use itertools::Itertools;
use tracing::{debug, error, info};

use crate::{
    combiner_rule::{CombinerRule, FilterDecision},
    error::{ProcedureError, ProcedureResult},
    resolver::{CombinerResolver, ResolvedProcedure},
    sorting::{remove_duplicate_procedures, sort_procedures},
    store::ProcedureStore,
};

#[derive(Debug, Default)]
pub struct CombinerSummary {
    pub rules_processed: usize,
    pub procedures_written: usize,
    pub failed_rules: Vec<ProcedureError>,
}

/// Resolves every combiner string of `rule` and returns the kept procedures in output order.
///
/// Deduplication happens per combiner string, the include/exclude filter and
/// the name sort order apply to the rule as a whole.
#[tracing::instrument(skip_all, fields(icao = %rule.icao, proc_type = %rule.proc_type, runway = %rule.runway))]
pub fn combine_rule(
    resolver: &CombinerResolver<'_>,
    rule: &CombinerRule,
) -> ProcedureResult<Vec<ResolvedProcedure>> {
    let filters = rule.compile_filters()?;
    let mut procedures = Vec::new();

    for combiner in &rule.combine {
        let codes = combiner.chars().collect_vec();
        let resolved = resolver.resolve(&codes, &rule.icao, &rule.runway, rule.proc_type);
        let total = resolved.len();
        let unique = remove_duplicate_procedures(resolved);
        debug!(combiner, unique = unique.len(), total, "Resolved combiner");

        for procedure in unique {
            match filters.decide(&procedure.full_id) {
                FilterDecision::Keep => procedures.push(procedure.with_combiner(combiner)),
                FilterDecision::NotIncluded => info!(
                    combiner,
                    full_id = %procedure.full_id,
                    regex = ?rule.include_regex,
                    "Skipping due to include regex"
                ),
                FilterDecision::Excluded => info!(
                    combiner,
                    full_id = %procedure.full_id,
                    regex = ?rule.exclude_regex,
                    "Skipping due to exclude regex"
                ),
            }
        }
    }

    Ok(sort_procedures(procedures, &filters.name_sort_order))
}

pub fn write_procedures<W: Write>(
    writer: &mut W,
    procedures: &[ResolvedProcedure],
) -> io::Result<()> {
    for procedure in procedures {
        writeln!(writer, "{procedure}")?;
    }
    Ok(())
}

/// Runs all rules in order, appending their procedures to `writer`.
///
/// A rule with a broken regex is skipped and reported in the summary.
pub fn generate_combined_procedures<W: Write>(
    store: &ProcedureStore,
    rules: &[CombinerRule],
    writer: &mut W,
) -> ProcedureResult<CombinerSummary> {
    let resolver = CombinerResolver::new(store);
    let mut summary = CombinerSummary::default();

    for rule in rules {
        match combine_rule(&resolver, rule) {
            Ok(procedures) => {
                write_procedures(writer, &procedures)?;
                summary.rules_processed += 1;
                summary.procedures_written += procedures.len();
            }
            Err(e) => {
                error!(icao = %rule.icao, proc_type = %rule.proc_type, "Skipping combiner rule: {e}");
                summary.failed_rules.push(e);
            }
        }
    }
    writer.flush()?;

    Ok(summary)
}

pub fn open_for_append<P: AsRef<Path>>(path: P) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;
    Ok(BufWriter::new(file))
}
