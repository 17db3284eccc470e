//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. The `ODN1xxx` block is reserved for the status codec
//! (parser and validator), `ODN12xx` for chart application and `ODN13xx` for
//! interactive edits.

use crate::Severity;

/// Status token does not match `<findingDigits><toothDigits><faceLetters>`.
pub const MALFORMED_TOKEN: &str = "ODN1001";

/// Status string contained no tokens.
pub const NO_FINDINGS: &str = "ODN1002";

/// Finding code outside `1..=max_finding`.
pub const FINDING_OUT_OF_RANGE: &str = "ODN1101";

/// Tooth identifier not present in the reference tooth set.
pub const UNKNOWN_TOOTH: &str = "ODN1102";

/// Face letters outside the valid set were filtered from a record.
pub const UNKNOWN_FACE_LETTER: &str = "ODN1103";

/// Finding reached the applicator without a matching dispatch action.
pub const UNHANDLED_FINDING: &str = "ODN1201";

/// Record targets a tooth the chart does not contain.
pub const TOOTH_NOT_IN_CHART: &str = "ODN1202";

/// Prosthesis label already present on the tooth's channel.
pub const DUPLICATE_LABEL: &str = "ODN1203";

/// Interactive edit attempted on a locked chart.
pub const CHART_LOCKED: &str = "ODN1301";

/// Every known diagnostic code, in numeric order.
pub const ALL: &[&str] = &[
    MALFORMED_TOKEN,
    NO_FINDINGS,
    FINDING_OUT_OF_RANGE,
    UNKNOWN_TOOTH,
    UNKNOWN_FACE_LETTER,
    UNHANDLED_FINDING,
    TOOTH_NOT_IN_CHART,
    DUPLICATE_LABEL,
    CHART_LOCKED,
];

pub(crate) fn explain(id: &str) -> Option<&'static str> {
    match id {
        MALFORMED_TOKEN => Some(
            "A status token must be 3 or 4 digits (finding code followed by a two-digit tooth) \
             optionally followed by face letters, e.g. `117OV`. The token was dropped.",
        ),
        NO_FINDINGS => Some("The status string was empty; the chart was reset to its blank state."),
        FINDING_OUT_OF_RANGE => Some(
            "The finding code is outside the range accepted by the reference tables. \
             The record was dropped.",
        ),
        UNKNOWN_TOOTH => Some(
            "The last two digits of the token are not a tooth in the chart's tooth set. \
             The record was dropped.",
        ),
        UNKNOWN_FACE_LETTER => Some(
            "Only the face letters M, D, V, B, L, P, I and O are recognized. Other letters were \
             removed; the record was still applied with the remaining faces.",
        ),
        UNHANDLED_FINDING => Some(
            "The finding code has no entry in the reference tables or no action in the dispatch \
             table. Nothing was applied for it.",
        ),
        TOOTH_NOT_IN_CHART => {
            Some("The record names a tooth that the chart was not built with. It was skipped.")
        }
        DUPLICATE_LABEL => Some(
            "The prosthesis label is already shown on this tooth's channel; labels are never \
             repeated.",
        ),
        CHART_LOCKED => Some("The chart is locked (read-only); interactive edits are ignored."),
        _ => None,
    }
}

pub(crate) fn severity_for(id: &str) -> Option<Severity> {
    match id {
        MALFORMED_TOKEN | FINDING_OUT_OF_RANGE | UNKNOWN_TOOTH => Some(Severity::Error),
        UNKNOWN_FACE_LETTER | UNHANDLED_FINDING | TOOTH_NOT_IN_CHART | CHART_LOCKED => {
            Some(Severity::Warn)
        }
        NO_FINDINGS | DUPLICATE_LABEL => Some(Severity::Info),
        _ => None,
    }
}
