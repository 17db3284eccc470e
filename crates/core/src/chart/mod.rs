//! In-memory odontogram: rows of teeth with faces, overlay flags, prosthesis
//! labels and bridge state.
//!
//! Teeth are created once from the reference tables and never added or
//! removed. All mutation goes through [`crate::apply`]; this module only
//! offers the primitive operations those actions are built from.

/// Tooth placement and prosthesis label block layout.
pub mod layout;

use crate::bridge::BridgeSegment;
use crate::config::{ChartLayout, ConfigError};
use odontogram_tables::{FacePosition, LabelChannel, ReferenceTables, ToothId};
use serde::Serialize;
use std::collections::HashMap;

pub use layout::{Geometry, LabelBlock};

/// Paint state of one face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    /// Unpainted.
    #[default]
    Blank,
    /// Painted as a restoration.
    Restored,
    /// Painted as decay.
    Decayed,
}

/// One of the five faces of a tooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToothFace {
    /// Which face this is.
    pub position: FacePosition,
    /// Current paint.
    pub fill: Fill,
}

impl ToothFace {
    /// A face is selected whenever it is painted.
    pub fn is_selected(&self) -> bool {
        self.fill != Fill::Blank
    }
}

/// Binary overlay markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    /// Cross over the tooth.
    Missing,
    /// Crown circle.
    Crown,
    /// `IMP` text.
    Implant,
    /// Sealant dot.
    Sealant,
    /// Congenital absence.
    CongenitallyAbsent,
    /// Physiological absence.
    PhysiologicallyAbsent,
    /// Extraction required.
    Extraction,
}

/// Overlay flags of a tooth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Overlays {
    /// See [`Overlay::Missing`].
    pub missing: bool,
    /// See [`Overlay::Crown`].
    pub crown: bool,
    /// See [`Overlay::Implant`].
    pub implant: bool,
    /// See [`Overlay::Sealant`].
    pub sealant: bool,
    /// See [`Overlay::CongenitallyAbsent`].
    pub congenitally_absent: bool,
    /// See [`Overlay::PhysiologicallyAbsent`].
    pub physiologically_absent: bool,
    /// See [`Overlay::Extraction`].
    pub extraction: bool,
}

impl Overlays {
    fn slot(&mut self, overlay: Overlay) -> &mut bool {
        match overlay {
            Overlay::Missing => &mut self.missing,
            Overlay::Crown => &mut self.crown,
            Overlay::Implant => &mut self.implant,
            Overlay::Sealant => &mut self.sealant,
            Overlay::CongenitallyAbsent => &mut self.congenitally_absent,
            Overlay::PhysiologicallyAbsent => &mut self.physiologically_absent,
            Overlay::Extraction => &mut self.extraction,
        }
    }

    /// Current state of one flag.
    pub fn get(&self, overlay: Overlay) -> bool {
        match overlay {
            Overlay::Missing => self.missing,
            Overlay::Crown => self.crown,
            Overlay::Implant => self.implant,
            Overlay::Sealant => self.sealant,
            Overlay::CongenitallyAbsent => self.congenitally_absent,
            Overlay::PhysiologicallyAbsent => self.physiologically_absent,
            Overlay::Extraction => self.extraction,
        }
    }

    /// Set one flag.
    pub fn set(&mut self, overlay: Overlay, on: bool) {
        *self.slot(overlay) = on;
    }

    /// `true` when any flag is set.
    pub fn any(&self) -> bool {
        *self != Overlays::default()
    }
}

/// Prosthesis short labels per channel, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProsthesisLabels {
    /// Labels of prostheses already present.
    pub existing: Vec<String>,
    /// Labels of prostheses the patient requires.
    pub required: Vec<String>,
}

impl ProsthesisLabels {
    /// Labels of one channel.
    pub fn channel(&self, channel: LabelChannel) -> &[String] {
        match channel {
            LabelChannel::Existing => &self.existing,
            LabelChannel::Required => &self.required,
        }
    }

    /// Append `label` to `channel` unless it is already there.
    ///
    /// Returns `false` for a repeat.
    pub fn push(&mut self, channel: LabelChannel, label: &str) -> bool {
        let list = match channel {
            LabelChannel::Existing => &mut self.existing,
            LabelChannel::Required => &mut self.required,
        };
        if list.iter().any(|l| l == label) {
            return false;
        }
        list.push(label.to_string());
        true
    }

    /// `true` when neither channel has a label.
    pub fn is_empty(&self) -> bool {
        self.existing.is_empty() && self.required.is_empty()
    }
}

/// A tooth of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooth {
    /// Two-digit tooth identifier.
    pub id: ToothId,
    /// Faces in [`FacePosition::ALL`] order.
    pub faces: [ToothFace; 5],
    /// Overlay flags.
    pub overlays: Overlays,
    /// Supernumerary marker label; `Some` means the marker is shown.
    pub supernumerary: Option<String>,
    /// Prosthesis labels per channel.
    pub labels: ProsthesisLabels,
    /// Laid-out label blocks, derived from `labels`.
    pub label_blocks: Vec<LabelBlock>,
    /// Bridge abutment or pontic.
    pub has_bridge: bool,
    /// Position and size in chart coordinates.
    pub geometry: Geometry,
}

impl Tooth {
    /// Create a blank tooth.
    pub fn new(id: ToothId, geometry: Geometry) -> Self {
        Self {
            id,
            faces: FacePosition::ALL.map(|position| ToothFace {
                position,
                fill: Fill::Blank,
            }),
            overlays: Overlays::default(),
            supernumerary: None,
            labels: ProsthesisLabels::default(),
            label_blocks: Vec::new(),
            has_bridge: false,
            geometry,
        }
    }

    /// Return the tooth to its blank state. Identity and geometry are kept.
    pub fn reset(&mut self) {
        *self = Tooth::new(self.id, self.geometry);
    }

    /// `true` when nothing is shown on the tooth.
    pub fn is_blank(&self) -> bool {
        self.faces.iter().all(|f| !f.is_selected())
            && !self.overlays.any()
            && self.supernumerary.is_none()
            && self.labels.is_empty()
            && !self.has_bridge
    }

    /// Face at `position`.
    pub fn face(&self, position: FacePosition) -> &ToothFace {
        &self.faces[position.index()]
    }

    /// Paint one face.
    pub fn paint(&mut self, position: FacePosition, fill: Fill) {
        self.faces[position.index()].fill = fill;
    }

    /// Paint all five faces.
    pub fn paint_all(&mut self, fill: Fill) {
        for face in &mut self.faces {
            face.fill = fill;
        }
    }

    /// Toggle one face between blank and `fill`.
    ///
    /// A face painted with a different fill is repainted with `fill`.
    pub fn toggle(&mut self, position: FacePosition, fill: Fill) {
        let face = &mut self.faces[position.index()];
        face.fill = if face.fill == fill { Fill::Blank } else { fill };
    }
}

/// The odontogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    rows: Vec<Vec<Tooth>>,
    bridges: Vec<BridgeSegment>,
    locked: bool,
    #[serde(skip)]
    index: HashMap<ToothId, (usize, usize)>,
}

impl Chart {
    /// Build a blank chart with one tooth per entry of `tables.rows`.
    pub fn new(tables: &ReferenceTables, layout: &ChartLayout) -> Result<Self, ConfigError> {
        layout.check_rows(tables)?;
        let placed = layout::place_rows(tables, layout);
        let rows: Vec<Vec<Tooth>> = tables
            .rows
            .iter()
            .zip(placed)
            .map(|(ids, geoms)| {
                ids.iter()
                    .zip(geoms)
                    .map(|(&id, g)| Tooth::new(id, g))
                    .collect()
            })
            .collect();
        let index = rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, t)| (t.id, (r, c))))
            .collect();
        tracing::debug!(rows = rows.len(), "built chart");
        Ok(Self {
            rows,
            bridges: Vec::new(),
            locked: false,
            index,
        })
    }

    /// Rows of teeth, in positional order.
    pub fn rows(&self) -> &[Vec<Tooth>] {
        &self.rows
    }

    /// All teeth, row by row.
    pub fn teeth(&self) -> impl Iterator<Item = &Tooth> {
        self.rows.iter().flatten()
    }

    /// Look up a tooth.
    pub fn tooth(&self, id: ToothId) -> Option<&Tooth> {
        let &(r, c) = self.index.get(&id)?;
        Some(&self.rows[r][c])
    }

    /// Look up a tooth for mutation.
    pub fn tooth_mut(&mut self, id: ToothId) -> Option<&mut Tooth> {
        let &(r, c) = self.index.get(&id)?;
        Some(&mut self.rows[r][c])
    }

    /// `true` when the chart has a tooth with this identifier.
    pub fn contains(&self, id: ToothId) -> bool {
        self.index.contains_key(&id)
    }

    /// Reset every tooth. Bridge segments are left for the caller to recompute.
    pub fn reset_all(&mut self) {
        for tooth in self.rows.iter_mut().flatten() {
            tooth.reset();
        }
    }

    /// Segments from the last bridge resolver run.
    pub fn bridges(&self) -> &[BridgeSegment] {
        &self.bridges
    }

    pub(crate) fn set_bridges(&mut self, bridges: Vec<BridgeSegment>) {
        self.bridges = bridges;
    }

    /// `true` when interactive edits are rejected.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lock or unlock the chart against interactive edits.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}
