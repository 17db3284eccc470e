//! One-call facade: parse, validate and apply a status string.

use crate::apply::{Applicator, ApplyReport};
use crate::chart::Chart;
use crate::config::ChartConfig;
use crate::grammar::diag::Diagnostic;
use crate::grammar::parser::{ParseResult, parse_status_with};
use crate::validate::{ValidationResult, validate_records};
use odontogram_tables::ReferenceTables;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upstream patient record. Only `status` is consumed; every other field is
/// kept verbatim in `identifiers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Comma-separated status string; absent and `null` are both "no findings".
    #[serde(default)]
    pub status: Option<String>,
    /// Identifier fields passed through untouched.
    #[serde(flatten)]
    pub identifiers: BTreeMap<String, serde_json::Value>,
}

/// Everything produced by [`load_status`].
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Parser output.
    pub parse: ParseResult,
    /// Validator output.
    pub validation: ValidationResult,
    /// Applicator output.
    pub apply: ApplyReport,
}

impl LoadReport {
    /// All diagnostics, in pipeline order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.parse
            .diagnostics
            .iter()
            .chain(&self.validation.issues)
            .chain(&self.apply.diagnostics)
    }

    /// `true` when any token or record was dropped.
    pub fn has_errors(&self) -> bool {
        self.diagnostics().any(Diagnostic::is_error)
    }
}

/// Parse, validate and apply `raw` to `chart`.
///
/// An absent status resets the chart like an empty one. The chart's lock
/// does not apply: batch loading always replaces the chart's state.
pub fn load_status(
    chart: &mut Chart,
    raw: Option<&str>,
    tables: &ReferenceTables,
    config: &ChartConfig,
) -> LoadReport {
    let parse = parse_status_with(raw.unwrap_or_default(), config.grammar, tables.max_finding);
    let validation = validate_records(&parse.records, tables);
    let apply = Applicator::with_config(tables, config).apply_batch(chart, &validation.records);
    LoadReport {
        parse,
        validation,
        apply,
    }
}

/// [`load_status`] for an upstream record.
pub fn load_record(
    chart: &mut Chart,
    record: &PatientRecord,
    tables: &ReferenceTables,
    config: &ChartConfig,
) -> LoadReport {
    load_status(chart, record.status.as_deref(), tables, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_identifiers() {
        let rec: PatientRecord =
            serde_json::from_str(r#"{"id": 7, "name": "x", "status": "1155"}"#).unwrap();
        assert_eq!(rec.status.as_deref(), Some("1155"));
        assert_eq!(rec.identifiers.len(), 2);
        assert_eq!(rec.identifiers["id"], serde_json::json!(7));
    }

    #[test]
    fn record_without_status_is_empty() {
        let rec: PatientRecord = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert!(rec.status.is_none());
        let rec: PatientRecord = serde_json::from_str(r#"{"status": null}"#).unwrap();
        assert!(rec.status.is_none());
    }
}
