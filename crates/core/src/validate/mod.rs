//! Record validation against the reference tables.
//!
//! Rules run in a fixed order: finding range, tooth membership, then face
//! letter filtering. The first two reject the record; the third only drops
//! the unrecognized letters and keeps the record.

pub use crate::grammar::diag::Diagnostic;
use crate::grammar::{
    diag::{self, Span, codes},
    parser::RawRecord,
};
use odontogram_tables::{ReferenceTables, ToothId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// A record that passed validation and is ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingRecord {
    /// Finding code, within `1..=max_finding`.
    pub finding: u8,
    /// Tooth identifier, a member of the tooth set.
    pub tooth: ToothId,
    /// Face letters, restricted to the known set (may be empty).
    pub faces: String,
    /// Byte span of the source token.
    pub span: Span,
}

/// Result of validating a stream of raw records.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// `true` if no record was rejected (warnings and info are allowed).
    pub ok: bool,
    /// Records that passed, in input order.
    pub records: Vec<FindingRecord>,
    /// Rejections and warnings produced during validation.
    pub issues: Vec<Diagnostic>,
}

/// Validate one raw record.
///
/// Returns `None` when the record is rejected. Every rejection or warning is
/// pushed onto `issues` (and logged).
pub fn validate_record(
    raw: &RawRecord,
    tables: &ReferenceTables,
    issues: &mut Vec<Diagnostic>,
) -> Option<FindingRecord> {
    if !tables.finding_in_range(raw.finding) {
        diag::report(
            issues,
            Diagnostic::for_code(
                codes::FINDING_OUT_OF_RANGE,
                format!(
                    "finding {} on tooth {} is outside 1..={}",
                    raw.finding, raw.tooth, tables.max_finding
                ),
                Some(raw.span),
            )
            .with_context(ctx!(
                "finding" => raw.finding.to_string(),
                "tooth" => raw.tooth.to_string(),
                "max" => tables.max_finding.to_string(),
            )),
        );
        return None;
    }

    if !tables.is_tooth(raw.tooth) {
        diag::report(
            issues,
            Diagnostic::for_code(
                codes::UNKNOWN_TOOTH,
                format!("tooth {} is not in the tooth set", raw.tooth),
                Some(raw.span),
            )
            .with_context(ctx!(
                "finding" => raw.finding.to_string(),
                "tooth" => raw.tooth.to_string(),
            )),
        );
        return None;
    }

    let (faces, dropped): (String, String) =
        raw.faces.chars().partition(|&c| tables.is_face_letter(c));
    if !dropped.is_empty() {
        diag::report(
            issues,
            Diagnostic::for_code(
                codes::UNKNOWN_FACE_LETTER,
                format!(
                    "dropped unknown face letters `{dropped}` on tooth {}",
                    raw.tooth
                ),
                Some(raw.span),
            )
            .with_context(ctx!(
                "tooth" => raw.tooth.to_string(),
                "dropped" => dropped.clone(),
                "kept" => faces.clone(),
            )),
        );
    }

    Some(FindingRecord {
        finding: raw.finding,
        tooth: raw.tooth,
        faces,
        span: raw.span,
    })
}

/// Validate every record of a stream.
pub fn validate_records<'a, I>(raws: I, tables: &ReferenceTables) -> ValidationResult
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut issues = Vec::new();
    let records: Vec<FindingRecord> = raws
        .into_iter()
        .filter_map(|raw| validate_record(raw, tables, &mut issues))
        .collect();
    let ok = !issues.iter().any(Diagnostic::is_error);
    tracing::debug!(
        accepted = records.len(),
        issues = issues.len(),
        "validated records"
    );
    ValidationResult {
        ok,
        records,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(finding: u8, tooth: u8, faces: &str) -> RawRecord {
        RawRecord {
            finding,
            tooth: ToothId(tooth),
            faces: faces.to_string(),
            span: Span::new(0, 3),
        }
    }

    #[test]
    fn accepts_valid_record() {
        let t = ReferenceTables::standard();
        let mut issues = Vec::new();
        let rec = validate_record(&raw(1, 17, "OV"), &t, &mut issues).unwrap();
        assert_eq!(rec.faces, "OV");
        assert!(issues.is_empty());
    }

    #[test]
    fn range_check_runs_before_tooth_check() {
        let t = ReferenceTables::standard();
        let mut issues = Vec::new();
        assert!(validate_record(&raw(0, 99, ""), &t, &mut issues).is_none());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, codes::FINDING_OUT_OF_RANGE);
    }

    #[test]
    fn unknown_letters_are_filtered_not_rejected() {
        let t = ReferenceTables::standard();
        let mut issues = Vec::new();
        let rec = validate_record(&raw(1, 17, "OZ"), &t, &mut issues).unwrap();
        assert_eq!(rec.faces, "O");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, codes::UNKNOWN_FACE_LETTER);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn result_is_ok_with_only_warnings() {
        let t = ReferenceTables::standard();
        let raws = [raw(1, 17, "OZ"), raw(4, 11, "")];
        let res = validate_records(&raws, &t);
        assert!(res.ok);
        assert_eq!(res.records.len(), 2);
    }

    #[test]
    fn result_is_not_ok_when_a_record_is_dropped() {
        let t = ReferenceTables::standard();
        let raws = [raw(20, 17, ""), raw(4, 11, "")];
        let res = validate_records(&raws, &t);
        assert!(!res.ok);
        assert_eq!(res.records.len(), 1);
        assert_eq!(res.records[0].tooth, ToothId(11));
    }
}
