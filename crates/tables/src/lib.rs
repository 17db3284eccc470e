//! Odontogram reference tables.
//!
//! Defines the immutable reference data the status codec and the chart
//! engine are parameterized over: the set of charted teeth and their row
//! layout, the finding-code table (code → finding name → short label) and
//! the face-letter map. The built-in table is [`ReferenceTables::standard`];
//! alternate tables can be loaded from JSON with
//! [`ReferenceTables::from_json`], which validates them before use.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Current format version for the reference table JSON schema.
pub const TABLE_FORMAT_VERSION: &str = "1.0.0";

/// Largest finding code accepted by the standard table.
pub const STANDARD_MAX_FINDING: u8 = 19;

// ─── Identifiers ────────────────────────────────────────────────────────────

/// Two-digit FDI tooth identifier (e.g. `18`, `55`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToothId(pub u8);

impl std::fmt::Display for ToothId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the five clickable regions of a tooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacePosition {
    /// Vestibular / buccal face.
    Top,
    /// Distal face.
    Right,
    /// Lingual / palatal face.
    Bottom,
    /// Mesial face.
    Left,
    /// Occlusal / incisal face.
    Center,
}

impl FacePosition {
    /// All positions, in storage order.
    pub const ALL: [FacePosition; 5] = [
        FacePosition::Top,
        FacePosition::Right,
        FacePosition::Bottom,
        FacePosition::Left,
        FacePosition::Center,
    ];

    /// Index of this position in [`FacePosition::ALL`].
    pub fn index(self) -> usize {
        match self {
            FacePosition::Top => 0,
            FacePosition::Right => 1,
            FacePosition::Bottom => 2,
            FacePosition::Left => 3,
            FacePosition::Center => 4,
        }
    }
}

impl std::fmt::Display for FacePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacePosition::Top => write!(f, "top"),
            FacePosition::Right => write!(f, "right"),
            FacePosition::Bottom => write!(f, "bottom"),
            FacePosition::Left => write!(f, "left"),
            FacePosition::Center => write!(f, "center"),
        }
    }
}

/// Visual channel a prosthesis label is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelChannel {
    /// Prosthesis already present in the mouth (drawn red).
    Existing,
    /// Prosthesis the patient requires (drawn blue).
    Required,
}

impl LabelChannel {
    /// Resolve a channel from a finding-name suffix.
    ///
    /// `r` is the existing channel. `b` is the required channel; `a` is the
    /// suffix older tables used for it.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "r" => Some(LabelChannel::Existing),
            "b" | "a" => Some(LabelChannel::Required),
            _ => None,
        }
    }
}

impl std::fmt::Display for LabelChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelChannel::Existing => write!(f, "existing"),
            LabelChannel::Required => write!(f, "required"),
        }
    }
}

// ─── Finding names ──────────────────────────────────────────────────────────

/// Closed set of clinical findings the chart knows how to show.
///
/// Prosthesis names carry their label channel as a suffix: `_r` for the
/// existing channel, `_b` for the required one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingName {
    /// Clears the tooth.
    None,
    /// Restoration (filling); paints faces.
    Filling,
    /// Congenital absence.
    Agenesis,
    /// Missing tooth (cross).
    Missing,
    /// Crown (circle).
    Crown,
    /// Implant (`IMP` text).
    Implant,
    /// Bridge abutment or pontic.
    Bridge,
    /// Sealant (dot).
    Sealant,
    /// Physiological absence (dotted circle).
    PhysiologicalAbsence,
    /// Existing removable upper prosthesis.
    PrsR,
    /// Existing removable lower prosthesis.
    PriR,
    /// Existing complete upper prosthesis.
    PcsR,
    /// Existing complete lower prosthesis.
    PciR,
    /// Supernumerary tooth.
    Supernumerary,
    /// Extraction required.
    Extraction,
    /// Caries; paints faces.
    Caries,
    /// Required removable upper prosthesis.
    #[serde(alias = "prs_a")]
    PrsB,
    /// Required removable lower prosthesis.
    #[serde(alias = "pri_a")]
    PriB,
    /// Required complete upper prosthesis.
    #[serde(alias = "pcs_a")]
    PcsB,
    /// Required complete lower prosthesis.
    #[serde(alias = "pci_a")]
    PciB,
}

impl FindingName {
    /// Canonical snake_case name, as used in table JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            FindingName::None => "none",
            FindingName::Filling => "filling",
            FindingName::Agenesis => "agenesis",
            FindingName::Missing => "missing",
            FindingName::Crown => "crown",
            FindingName::Implant => "implant",
            FindingName::Bridge => "bridge",
            FindingName::Sealant => "sealant",
            FindingName::PhysiologicalAbsence => "physiological_absence",
            FindingName::PrsR => "prs_r",
            FindingName::PriR => "pri_r",
            FindingName::PcsR => "pcs_r",
            FindingName::PciR => "pci_r",
            FindingName::Supernumerary => "supernumerary",
            FindingName::Extraction => "extraction",
            FindingName::Caries => "caries",
            FindingName::PrsB => "prs_b",
            FindingName::PriB => "pri_b",
            FindingName::PcsB => "pcs_b",
            FindingName::PciB => "pci_b",
        }
    }

    /// `true` for the eight prosthesis findings.
    pub fn is_prosthesis(self) -> bool {
        matches!(
            self,
            FindingName::PrsR
                | FindingName::PriR
                | FindingName::PcsR
                | FindingName::PciR
                | FindingName::PrsB
                | FindingName::PriB
                | FindingName::PcsB
                | FindingName::PciB
        )
    }

    /// Label channel of a prosthesis finding, taken from its name suffix.
    ///
    /// Returns `None` for every non-prosthesis finding.
    pub fn channel(self) -> Option<LabelChannel> {
        if !self.is_prosthesis() {
            return None;
        }
        let (_, suffix) = self.as_str().rsplit_once('_')?;
        LabelChannel::from_suffix(suffix)
    }
}

impl std::fmt::Display for FindingName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Table entries ──────────────────────────────────────────────────────────

/// One row of the finding-code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingEntry {
    /// Numeric code used in status strings.
    pub code: u8,
    /// Finding this code stands for.
    pub name: FindingName,
    /// Short label drawn above the tooth (prosthesis findings only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FindingEntry {
    fn new(code: u8, name: FindingName) -> Self {
        Self {
            code,
            name,
            label: None,
        }
    }

    fn labelled(code: u8, name: FindingName, label: &str) -> Self {
        Self {
            code,
            name,
            label: Some(label.to_string()),
        }
    }
}

/// Mapping from a face letter to the face it paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceLetter {
    /// Upper-case ASCII letter.
    pub letter: char,
    /// Face painted by this letter.
    pub face: FacePosition,
}

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Reasons reference tables can be rejected.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TablesError {
    /// The JSON document could not be deserialized.
    #[error("failed to parse reference tables: {0}")]
    Parse(#[from] serde_json::Error),
    /// The tables were written for an incompatible format version.
    #[error("unsupported table format version {found} (expected {expected})")]
    FormatVersion {
        /// Version found in the document.
        found: String,
        /// Version this crate understands.
        expected: &'static str,
    },
    /// No tooth rows were defined.
    #[error("reference tables define no teeth")]
    NoTeeth,
    /// A tooth identifier occurs more than once across the rows.
    #[error("tooth {0} appears more than once")]
    DuplicateTooth(ToothId),
    /// A finding code occurs more than once.
    #[error("finding code {0} appears more than once")]
    DuplicateFinding(u8),
    /// A finding code is larger than `max_finding`.
    #[error("finding code {code} exceeds max_finding {max}")]
    FindingOutOfRange {
        /// Offending code.
        code: u8,
        /// Declared maximum.
        max: u8,
    },
    /// A prosthesis finding has no short label.
    #[error("prosthesis finding {0} has no short label")]
    MissingLabel(FindingName),
    /// A face letter is mapped twice, or is not an upper-case ASCII letter.
    #[error("face letter '{0}' is duplicated or not an upper-case ASCII letter")]
    BadFaceLetter(char),
}

// ─── Tables ─────────────────────────────────────────────────────────────────

/// Immutable reference data for the codec and the chart.
///
/// Lookup caches are built on first use. Mutating the public fields after a
/// lookup leaves the caches stale; build a new value with
/// [`ReferenceTables::new`] instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReferenceTables {
    /// Table format version for compatibility checks.
    #[serde(default = "default_format_version")]
    pub format_version: String,
    /// Largest finding code the validator accepts (the smallest is 1).
    pub max_finding: u8,
    /// Finding-code table.
    pub findings: Vec<FindingEntry>,
    /// Tooth identifiers per chart row, in positional order.
    pub rows: Vec<Vec<ToothId>>,
    /// Face-letter map.
    pub face_letters: Vec<FaceLetter>,

    /// Cached set of all tooth identifiers (lazily initialized).
    #[serde(skip)]
    tooth_set: OnceLock<HashSet<ToothId>>,
    /// Cached map from finding code → index into `findings` (lazily initialized).
    #[serde(skip)]
    finding_map: OnceLock<HashMap<u8, usize>>,
}

fn default_format_version() -> String {
    TABLE_FORMAT_VERSION.to_string()
}

impl ReferenceTables {
    /// Create tables from their parts. Caches are initialized lazily.
    ///
    /// The result is not validated; call [`ReferenceTables::validate`].
    pub fn new(
        max_finding: u8,
        findings: Vec<FindingEntry>,
        rows: Vec<Vec<ToothId>>,
        face_letters: Vec<FaceLetter>,
    ) -> Self {
        Self {
            format_version: TABLE_FORMAT_VERSION.to_string(),
            max_finding,
            findings,
            rows,
            face_letters,
            tooth_set: OnceLock::new(),
            finding_map: OnceLock::new(),
        }
    }

    /// The built-in table: 52 teeth in four rows, findings `0..=19` and the
    /// `MDVBLPIO` face letters.
    pub fn standard() -> Self {
        use FindingName as F;

        let findings = vec![
            FindingEntry::new(0, F::None),
            FindingEntry::new(1, F::Filling),
            FindingEntry::new(2, F::Agenesis),
            FindingEntry::new(3, F::Missing),
            FindingEntry::new(4, F::Crown),
            FindingEntry::new(5, F::Implant),
            FindingEntry::new(6, F::Bridge),
            FindingEntry::new(7, F::Sealant),
            FindingEntry::new(8, F::PhysiologicalAbsence),
            FindingEntry::labelled(9, F::PrsR, "PRS"),
            FindingEntry::labelled(10, F::PriR, "PRI"),
            FindingEntry::labelled(11, F::PcsR, "PCS"),
            FindingEntry::labelled(12, F::PciR, "PCI"),
            FindingEntry::labelled(13, F::Supernumerary, "S"),
            FindingEntry::new(14, F::Extraction),
            FindingEntry::new(15, F::Caries),
            FindingEntry::labelled(16, F::PrsB, "PRS"),
            FindingEntry::labelled(17, F::PriB, "PRI"),
            FindingEntry::labelled(18, F::PcsB, "PCS"),
            FindingEntry::labelled(19, F::PciB, "PCI"),
        ];

        let row = |ids: &[u8]| ids.iter().copied().map(ToothId).collect::<Vec<_>>();
        let rows = vec![
            // permanent upper
            row(&[18, 17, 16, 15, 14, 13, 12, 11, 21, 22, 23, 24, 25, 26, 27, 28]),
            // temporary upper
            row(&[55, 54, 53, 52, 51, 61, 62, 63, 64, 65]),
            // temporary lower
            row(&[85, 84, 83, 82, 81, 71, 72, 73, 74, 75]),
            // permanent lower
            row(&[48, 47, 46, 45, 44, 43, 42, 41, 31, 32, 33, 34, 35, 36, 37, 38]),
        ];

        let face_letters = [
            ('M', FacePosition::Left),
            ('D', FacePosition::Right),
            ('V', FacePosition::Top),
            ('B', FacePosition::Top),
            ('L', FacePosition::Bottom),
            ('P', FacePosition::Bottom),
            ('I', FacePosition::Center),
            ('O', FacePosition::Center),
        ]
        .into_iter()
        .map(|(letter, face)| FaceLetter { letter, face })
        .collect();

        Self::new(STANDARD_MAX_FINDING, findings, rows, face_letters)
    }

    /// Deserialize tables from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, TablesError> {
        let tables: ReferenceTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Check the structural invariants the chart and the codec rely on.
    pub fn validate(&self) -> Result<(), TablesError> {
        if self.format_version.split('.').next() != TABLE_FORMAT_VERSION.split('.').next() {
            return Err(TablesError::FormatVersion {
                found: self.format_version.clone(),
                expected: TABLE_FORMAT_VERSION,
            });
        }

        if self.rows.iter().all(Vec::is_empty) {
            return Err(TablesError::NoTeeth);
        }
        let mut teeth = HashSet::new();
        for id in self.rows.iter().flatten() {
            if !teeth.insert(*id) {
                return Err(TablesError::DuplicateTooth(*id));
            }
        }

        let mut codes = HashSet::new();
        for entry in &self.findings {
            if !codes.insert(entry.code) {
                return Err(TablesError::DuplicateFinding(entry.code));
            }
            if entry.code > self.max_finding {
                return Err(TablesError::FindingOutOfRange {
                    code: entry.code,
                    max: self.max_finding,
                });
            }
            let has_label = entry.label.as_deref().is_some_and(|l| !l.is_empty());
            if entry.name.is_prosthesis() && !has_label {
                return Err(TablesError::MissingLabel(entry.name));
            }
        }

        let mut letters = HashSet::new();
        for fl in &self.face_letters {
            if !fl.letter.is_ascii_uppercase() || !letters.insert(fl.letter) {
                return Err(TablesError::BadFaceLetter(fl.letter));
            }
        }

        Ok(())
    }

    /// Returns the cached set of all tooth identifiers.
    pub fn tooth_set(&self) -> &HashSet<ToothId> {
        self.tooth_set
            .get_or_init(|| self.rows.iter().flatten().copied().collect())
    }

    /// `true` when `id` is a charted tooth.
    pub fn is_tooth(&self, id: ToothId) -> bool {
        self.tooth_set().contains(&id)
    }

    /// Total number of charted teeth.
    pub fn tooth_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    fn finding_map(&self) -> &HashMap<u8, usize> {
        self.finding_map.get_or_init(|| {
            self.findings
                .iter()
                .enumerate()
                .map(|(i, f)| (f.code, i))
                .collect()
        })
    }

    /// Look up a finding entry by code.
    pub fn finding(&self, code: u8) -> Option<&FindingEntry> {
        self.finding_map().get(&code).map(|&i| &self.findings[i])
    }

    /// `true` when `code` lies in the accepted range `1..=max_finding`.
    pub fn finding_in_range(&self, code: u8) -> bool {
        (1..=self.max_finding).contains(&code)
    }

    /// Face painted by a letter (case-insensitive), if the letter is known.
    pub fn face_for_letter(&self, letter: char) -> Option<FacePosition> {
        let upper = letter.to_ascii_uppercase();
        self.face_letters
            .iter()
            .find(|fl| fl.letter == upper)
            .map(|fl| fl.face)
    }

    /// `true` when `letter` (case-insensitive) is a known face letter.
    pub fn is_face_letter(&self, letter: char) -> bool {
        self.face_for_letter(letter).is_some()
    }
}

impl Clone for ReferenceTables {
    fn clone(&self) -> Self {
        Self {
            format_version: self.format_version.clone(),
            ..Self::new(
                self.max_finding,
                self.findings.clone(),
                self.rows.clone(),
                self.face_letters.clone(),
            )
        }
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tables_are_valid() {
        let t = ReferenceTables::standard();
        t.validate().expect("standard tables must validate");
        assert_eq!(t.tooth_count(), 52);
        assert_eq!(t.tooth_set().len(), 52);
        assert_eq!(t.rows.len(), 4);
        assert_eq!(t.max_finding, 19);
        assert_eq!(t.findings.len(), 20);
    }

    #[test]
    fn finding_lookup_by_code() {
        let t = ReferenceTables::standard();
        assert_eq!(t.finding(1).map(|f| f.name), Some(FindingName::Filling));
        assert_eq!(t.finding(13).map(|f| f.name), Some(FindingName::Supernumerary));
        assert_eq!(
            t.finding(18).and_then(|f| f.label.as_deref()),
            Some("PCS")
        );
        assert!(t.finding(20).is_none());
    }

    #[test]
    fn finding_range_excludes_zero() {
        let t = ReferenceTables::standard();
        assert!(!t.finding_in_range(0));
        assert!(t.finding_in_range(1));
        assert!(t.finding_in_range(19));
        assert!(!t.finding_in_range(20));
    }

    #[test]
    fn face_letters_are_many_to_one() {
        let t = ReferenceTables::standard();
        assert_eq!(t.face_for_letter('V'), Some(FacePosition::Top));
        assert_eq!(t.face_for_letter('b'), Some(FacePosition::Top));
        assert_eq!(t.face_for_letter('O'), Some(FacePosition::Center));
        assert_eq!(t.face_for_letter('I'), Some(FacePosition::Center));
        assert_eq!(t.face_for_letter('G'), None);
        assert!(!t.is_face_letter('Z'));
    }

    #[test]
    fn prosthesis_channel_comes_from_suffix() {
        assert_eq!(FindingName::PrsR.channel(), Some(LabelChannel::Existing));
        assert_eq!(FindingName::PciB.channel(), Some(LabelChannel::Required));
        assert_eq!(FindingName::Crown.channel(), None);
        assert_eq!(FindingName::Filling.channel(), None);
    }

    #[test]
    fn legacy_a_suffix_deserializes_as_required() {
        let name: FindingName = serde_json::from_str(r#""pcs_a""#).unwrap();
        assert_eq!(name, FindingName::PcsB);
        assert_eq!(name.channel(), Some(LabelChannel::Required));
    }

    #[test]
    fn face_position_index_matches_all() {
        for (i, pos) in FacePosition::ALL.iter().enumerate() {
            assert_eq!(pos.index(), i);
        }
    }

    #[test]
    fn json_round_trip_preserves_lookups() {
        let json = serde_json::to_string(&ReferenceTables::standard()).unwrap();
        let t = ReferenceTables::from_json(&json).unwrap();
        assert!(t.is_tooth(ToothId(55)));
        assert!(!t.is_tooth(ToothId(99)));
        assert_eq!(t.finding(6).map(|f| f.name), Some(FindingName::Bridge));
    }

    #[test]
    fn duplicate_tooth_is_rejected() {
        let json = r#"{
            "max_finding": 3,
            "findings": [{"code": 1, "name": "filling"}],
            "rows": [[11, 12], [12]],
            "face_letters": []
        }"#;
        let err = ReferenceTables::from_json(json).unwrap_err();
        assert!(matches!(err, TablesError::DuplicateTooth(ToothId(12))));
    }

    #[test]
    fn prosthesis_without_label_is_rejected() {
        let json = r#"{
            "max_finding": 3,
            "findings": [{"code": 2, "name": "prs_r"}],
            "rows": [[11]],
            "face_letters": []
        }"#;
        let err = ReferenceTables::from_json(json).unwrap_err();
        assert!(matches!(err, TablesError::MissingLabel(FindingName::PrsR)));
    }

    #[test]
    fn code_above_max_is_rejected() {
        let json = r#"{
            "max_finding": 3,
            "findings": [{"code": 4, "name": "crown"}],
            "rows": [[11]],
            "face_letters": []
        }"#;
        let err = ReferenceTables::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            TablesError::FindingOutOfRange { code: 4, max: 3 }
        ));
    }

    #[test]
    fn incompatible_format_version_is_rejected() {
        let json = r#"{
            "format_version": "2.0.0",
            "max_finding": 1,
            "findings": [],
            "rows": [[11]],
            "face_letters": []
        }"#;
        let err = ReferenceTables::from_json(json).unwrap_err();
        assert!(matches!(err, TablesError::FormatVersion { .. }));
    }

    #[test]
    fn clone_rebuilds_caches() {
        let t = ReferenceTables::standard();
        assert!(t.finding(7).is_some());
        let mut c = t.clone();
        c.findings.retain(|f| f.code != 7);
        assert!(c.finding(7).is_none());
        assert_eq!(c.finding(8).map(|f| f.name), Some(FindingName::PhysiologicalAbsence));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = ReferenceTables::from_json("{not json").unwrap_err();
        assert!(matches!(err, TablesError::Parse(_)));
    }
}
