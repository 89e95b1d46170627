use std::fs::File;

use sector_procedures::{
    combiner::{CombinerSummary, generate_combined_procedures, open_for_append},
    combiner_rule::{CombinerRuleRow, active_rules},
    store::ProcedureStore,
    table::load_table_file,
};
use tracing::{info, warn};

use crate::{config::GeneratorConfig, error::ApplicationResult};

/// Runs every active combiner rule and writes the result to the combiner output file.
///
/// The output file is truncated once, then rules append to it. Rows that could
/// not become a rule are reported with the failed rules.
pub(crate) fn generate_procedures(
    config: &GeneratorConfig,
    store: &ProcedureStore,
) -> ApplicationResult<CombinerSummary> {
    let rule_set = active_rules(load_table_file::<CombinerRuleRow, _>(
        config.combiner_table_path(),
    )?);
    let output_path = config.combiner_output_path();
    File::create(&output_path)?;

    let mut writer = open_for_append(&output_path)?;
    let mut summary = generate_combined_procedures(store, &rule_set.rules, &mut writer)?;
    summary.failed_rules.extend(rule_set.rejected);

    info!(
        file = %output_path.display(),
        rules = summary.rules_processed,
        procedures = summary.procedures_written,
        "Wrote combined procedures"
    );
    for failed in &summary.failed_rules {
        warn!("Rule skipped: {failed}");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use tracing_test::traced_test;

    use super::*;

    #[test]
    #[traced_test]
    fn test_generate_truncates_previous_output() {
        let output = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::new_for_test(
            Path::new("../sector_procedures/test_data"),
            output.path(),
        );
        let store =
            ProcedureStore::load(config.procedure_table_path(), config.runway_table_path()).unwrap();
        fs::write(config.combiner_output_path(), "stale line\n").unwrap();

        let summary = generate_procedures(&config, &store).unwrap();
        assert_eq!(summary.procedures_written, 8);
        let content = fs::read_to_string(config.combiner_output_path()).unwrap();
        assert!(!content.contains("stale line"));
        assert_eq!(content.lines().count(), 8);
        assert_eq!(
            content.lines().next(),
            Some("SID:EYKA:08:KAUN1A:KA080 KAUNA; Combiner=1 | ID=08xKAUN1A")
        );

        generate_procedures(&config, &store).unwrap();
        let again = fs::read_to_string(config.combiner_output_path()).unwrap();
        assert_eq!(again, content);
        assert!(logs_contain("Wrote combined procedures"));
    }

    #[test]
    #[traced_test]
    fn test_unknown_rule_type_is_reported_and_others_write() {
        let data = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let fixtures = Path::new("../sector_procedures/test_data");
        for table in ["Procedure.csv", "runway.csv"] {
            fs::copy(fixtures.join(table), data.path().join(table)).unwrap();
        }
        fs::write(
            data.path().join("ProceduresCombiner.csv"),
            "Active,Type,ICAO,Sortorder,Regex,Iregex,Combine,Runway,Namesortorder\n\
             1,TRANS,EYVI,1,,,1,01,\n\
             1,SID,EYVI,1,,,1,01,\n",
        )
        .unwrap();
        let config = GeneratorConfig::new_for_test(data.path(), output.path());
        let store =
            ProcedureStore::load(config.procedure_table_path(), config.runway_table_path()).unwrap();

        let summary = generate_procedures(&config, &store).unwrap();
        assert_eq!(summary.rules_processed, 1);
        assert_eq!(summary.failed_rules.len(), 1);
        assert_eq!(
            fs::read_to_string(config.combiner_output_path()).unwrap(),
            "SID:EYVI:01:TEXAS1A:VI610 VI620 TEXAS; Combiner=1 | ID=01xTEXAS1A\n"
        );
        assert!(logs_contain("Rule skipped"));
    }
}
