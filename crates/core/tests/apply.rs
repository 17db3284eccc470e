//! Tests for batch application: accumulation, painting, overlays, labels,
//! idempotence and skipped records.

mod common;

use common::{TABLES, chart, diag_codes, loaded, tooth};
use odontogram_core::{
    Applicator, DispatchTable, FacePosition, Fill, FindingName, FindingRecord, LabelChannel,
    Overlay, ReferenceTables, Span, ToothId, apply_batch, codes, load_status,
};

fn rec(finding: u8, tooth: u8, faces: &str) -> FindingRecord {
    FindingRecord {
        finding,
        tooth: ToothId(tooth),
        faces: faces.to_string(),
        span: Span::empty(0),
    }
}

// ─── Painting ───────────────────────────────────────────────────────────────

#[test]
fn filling_paints_only_selected_faces() {
    let (c, report) = loaded("117OV");
    assert!(!report.has_errors());
    let t = tooth(&c, 17);
    assert_eq!(t.face(FacePosition::Center).fill, Fill::Restored);
    assert_eq!(t.face(FacePosition::Top).fill, Fill::Restored);
    assert_eq!(t.face(FacePosition::Left).fill, Fill::Blank);
    assert_eq!(t.face(FacePosition::Right).fill, Fill::Blank);
    assert_eq!(t.face(FacePosition::Bottom).fill, Fill::Blank);
}

#[test]
fn paint_without_faces_paints_everything() {
    let (c, _) = loaded("1536");
    assert!(tooth(&c, 36).faces.iter().all(|f| f.fill == Fill::Decayed));
}

#[test]
fn aliased_letters_paint_the_same_face_once() {
    let (c, _) = loaded("111VB");
    let t = tooth(&c, 11);
    assert_eq!(t.face(FacePosition::Top).fill, Fill::Restored);
    assert_eq!(t.faces.iter().filter(|f| f.is_selected()).count(), 1);
}

#[test]
fn filtered_letters_do_not_block_the_record() {
    let (c, report) = loaded("117OZ");
    assert!(!report.has_errors());
    assert_eq!(
        diag_codes(report.diagnostics()),
        vec![codes::UNKNOWN_FACE_LETTER]
    );
    let t = tooth(&c, 17);
    assert_eq!(t.face(FacePosition::Center).fill, Fill::Restored);
    assert_eq!(t.faces.iter().filter(|f| f.is_selected()).count(), 1);
}

// ─── Accumulation ───────────────────────────────────────────────────────────

#[test]
fn findings_accumulate_per_tooth_in_arrival_order() {
    let (c, _) = loaded("416,116M,1516D,716");
    let t = tooth(&c, 16);
    assert!(t.overlays.crown);
    assert!(t.overlays.sealant);
    assert_eq!(t.face(FacePosition::Left).fill, Fill::Restored);
    assert_eq!(t.face(FacePosition::Right).fill, Fill::Decayed);
}

#[test]
fn later_paint_overwrites_earlier_paint() {
    let (c, _) = loaded("116O,1516O");
    assert_eq!(tooth(&c, 16).face(FacePosition::Center).fill, Fill::Decayed);
}

#[test]
fn none_resets_what_came_before_on_that_tooth() {
    // Finding 0 never passes validation; it only reaches the applicator directly.
    let mut c = chart();
    let records = [rec(4, 16, ""), rec(0, 16, ""), rec(7, 16, ""), rec(4, 21, "")];
    let report = apply_batch(&mut c, &records, &TABLES);
    assert_eq!(report.applied, 4);
    let t = tooth(&c, 16);
    assert!(!t.overlays.crown);
    assert!(t.overlays.sealant);
    assert!(tooth(&c, 21).overlays.crown);
}

#[test]
fn every_overlay_finding_sets_its_flag() {
    let (c, report) = loaded("211,312,413,514,715,816,1417");
    assert!(report.diagnostics().next().is_none());
    assert!(tooth(&c, 11).overlays.get(Overlay::CongenitallyAbsent));
    assert!(tooth(&c, 12).overlays.missing);
    assert!(tooth(&c, 13).overlays.crown);
    assert!(tooth(&c, 14).overlays.implant);
    assert!(tooth(&c, 15).overlays.sealant);
    assert!(tooth(&c, 16).overlays.physiologically_absent);
    assert!(tooth(&c, 17).overlays.extraction);
}

#[test]
fn supernumerary_sets_marker_and_label_together() {
    let (c, _) = loaded("1355");
    assert_eq!(tooth(&c, 55).supernumerary.as_deref(), Some("S"));
    assert!(tooth(&c, 54).supernumerary.is_none());
}

// ─── Prosthesis labels ──────────────────────────────────────────────────────

#[test]
fn prosthesis_labels_go_to_their_channel() {
    let (c, _) = loaded("911,1211,1611");
    let t = tooth(&c, 11);
    assert_eq!(t.labels.existing, vec!["PRS", "PCI"]);
    assert_eq!(t.labels.required, vec!["PRS"]);
    assert_eq!(t.label_blocks.len(), 2);
    assert_eq!(t.label_blocks[0].text, "PRS PCI");
    assert_eq!(t.label_blocks[1].channel, LabelChannel::Required);
}

#[test]
fn repeated_prosthesis_label_appears_once() {
    let (c, report) = loaded("911,911");
    let t = tooth(&c, 11);
    assert_eq!(t.labels.existing, vec!["PRS"]);
    assert_eq!(report.apply.applied, 1);
    let codes_seen = diag_codes(report.diagnostics());
    assert_eq!(codes_seen, vec![codes::DUPLICATE_LABEL]);
    assert!(!report.has_errors());
}

#[test]
fn label_blocks_never_overlap_the_tooth_or_each_other() {
    let (c, _) = loaded("938,1038,1138,1238,1638,1738,1838,1938");
    let t = tooth(&c, 38);
    let [existing, required] = t.label_blocks.as_slice() else {
        panic!("expected two label blocks");
    };
    assert!(existing.bottom() <= t.geometry.y);
    assert!(required.bottom() <= existing.y);
    for b in &t.label_blocks {
        let centre = b.x + b.width / 2.0;
        assert_eq!(centre, t.geometry.center_x());
    }
}

// ─── Idempotence ────────────────────────────────────────────────────────────

#[test]
fn applying_twice_gives_identical_chart() {
    let status = "1155,117OV,1418M,911,1611,611,621,1336,1536MD";
    let (first, _) = loaded(status);

    let mut again = first.clone();
    let report = load_status(&mut again, Some(status), &TABLES, &Default::default());
    assert!(!report.has_errors());
    assert_eq!(again, first);
    assert_eq!(
        serde_json::to_string(&again).unwrap(),
        serde_json::to_string(&first).unwrap()
    );
}

#[test]
fn batch_replaces_previous_state() {
    let (mut c, _) = loaded("418,118,618");
    load_status(&mut c, Some("421"), &TABLES, &Default::default());
    assert!(tooth(&c, 18).is_blank());
    assert!(tooth(&c, 21).overlays.crown);
    assert!(c.bridges().is_empty());
}

#[test]
fn empty_and_absent_status_blank_the_chart() {
    for status in [Some(""), None] {
        let (mut c, _) = loaded("418,618,1355");
        let report = load_status(&mut c, status, &TABLES, &Default::default());
        assert!(c.teeth().all(|t| t.is_blank()));
        assert!(c.bridges().is_empty());
        assert_eq!(report.apply.applied, 0);
        assert_eq!(diag_codes(report.diagnostics()), vec![codes::NO_FINDINGS]);
    }
}

#[test]
fn locked_chart_still_accepts_batch_loads() {
    let mut c = chart();
    c.set_locked(true);
    load_status(&mut c, Some("418"), &TABLES, &Default::default());
    assert!(tooth(&c, 18).overlays.crown);
}

// ─── Skipped records ────────────────────────────────────────────────────────

#[test]
fn code_without_table_entry_is_unhandled() {
    let findings = TABLES.findings.iter().filter(|f| f.code != 7).cloned().collect();
    let tables = ReferenceTables::new(
        TABLES.max_finding,
        findings,
        TABLES.rows.clone(),
        TABLES.face_letters.clone(),
    );
    let mut c = chart();
    let report = apply_batch(&mut c, &[rec(7, 11, ""), rec(4, 11, "")], &tables);
    assert_eq!(report.applied, 1);
    assert_eq!(diag_codes(&report.diagnostics), vec![codes::UNHANDLED_FINDING]);
    assert!(tooth(&c, 11).overlays.crown);
    assert!(!tooth(&c, 11).overlays.sealant);
}

#[test]
fn name_without_dispatch_entry_is_unhandled() {
    let mut dispatch = DispatchTable::standard();
    dispatch.remove(FindingName::Implant);
    let applicator = Applicator::new(&TABLES).with_dispatch(dispatch);
    let mut c = chart();
    let report = applicator.apply_batch(&mut c, &[rec(5, 11, ""), rec(3, 12, "")]);
    assert_eq!(report.applied, 1);
    let d = &report.diagnostics[0];
    assert_eq!(d.id, codes::UNHANDLED_FINDING);
    assert_eq!(d.context.as_ref().unwrap()["name"], "implant");
    assert!(tooth(&c, 12).overlays.missing);
}

#[test]
fn tooth_missing_from_chart_is_skipped() {
    // A record for a tooth the chart was not built with can only arrive when
    // validation ran against different tables.
    let mut c = chart();
    let report = apply_batch(&mut c, &[rec(4, 19, ""), rec(4, 11, "")], &TABLES);
    assert_eq!(report.applied, 1);
    assert_eq!(diag_codes(&report.diagnostics), vec![codes::TOOTH_NOT_IN_CHART]);
}

#[test]
fn report_serializes_for_front_ends() {
    let (c, report) = loaded("117OV,199");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["validation"]["ok"], false);
    assert_eq!(json["apply"]["applied"], 1);
    let snapshot = serde_json::to_value(&c).unwrap();
    assert_eq!(snapshot["rows"].as_array().unwrap().len(), 4);
    assert_eq!(snapshot["rows"][0][5]["id"], 13);
    assert_eq!(snapshot["locked"], false);
}
