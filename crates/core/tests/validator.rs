//! Tests for the record validator.

mod common;

use common::{TABLES, diag_codes, find_diag};
use odontogram_core::{
    FindingName, ReferenceTables, ToothId, codes, parse_status, validate_records,
};

#[test]
fn unknown_tooth_is_dropped() {
    let p = parse_status("199,117");
    let v = validate_records(&p.records, &TABLES);
    assert!(!v.ok);
    assert_eq!(v.records.len(), 1);
    assert_eq!(v.records[0].tooth, ToothId(17));
    let d = find_diag(&v.issues, codes::UNKNOWN_TOOTH);
    assert_eq!(d.context.as_ref().unwrap()["tooth"], "99");
}

#[test]
fn finding_zero_and_above_max_are_dropped() {
    let p = parse_status("011,2011,1911");
    let v = validate_records(&p.records, &TABLES);
    assert_eq!(v.records.len(), 1);
    assert_eq!(v.records[0].finding, 19);
    assert_eq!(
        diag_codes(&v.issues),
        vec![codes::FINDING_OUT_OF_RANGE, codes::FINDING_OUT_OF_RANGE]
    );
}

#[test]
fn unknown_face_letter_is_filtered_and_record_kept() {
    let p = parse_status("117OZ");
    let v = validate_records(&p.records, &TABLES);
    assert!(v.ok);
    assert_eq!(v.records.len(), 1);
    assert_eq!(v.records[0].faces, "O");
    let d = find_diag(&v.issues, codes::UNKNOWN_FACE_LETTER);
    assert_eq!(d.context.as_ref().unwrap()["dropped"], "Z");
    assert_eq!(d.span, Some(p.records[0].span));
}

#[test]
fn every_face_letter_is_accepted() {
    let p = parse_status("111MDVBLPIO");
    let v = validate_records(&p.records, &TABLES);
    assert!(v.issues.is_empty());
    assert_eq!(v.records[0].faces, "MDVBLPIO");
}

#[test]
fn custom_tables_change_the_rules() {
    let json = r#"{
        "max_finding": 2,
        "findings": [
            {"code": 1, "name": "filling"},
            {"code": 2, "name": "caries"}
        ],
        "rows": [[11, 21]],
        "face_letters": [{"letter": "O", "face": "center"}]
    }"#;
    let tables = ReferenceTables::from_json(json).unwrap();
    assert_eq!(tables.finding(2).map(|f| f.name), Some(FindingName::Caries));

    let p = parse_status("111OM,321,112");
    let v = validate_records(&p.records, &tables);
    assert_eq!(v.records.len(), 1);
    assert_eq!(v.records[0].faces, "O");
    assert_eq!(
        diag_codes(&v.issues),
        vec![
            codes::UNKNOWN_FACE_LETTER,
            codes::FINDING_OUT_OF_RANGE,
            codes::UNKNOWN_TOOTH
        ]
    );
}
