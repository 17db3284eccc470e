//! State application: the dispatch table and the batch and edit entry points.
//!
//! [`DispatchTable`] is the single map from finding name to behaviour. Batch
//! loading ([`Applicator::apply_batch`]) and interactive edits
//! ([`Applicator::apply_edit`]) both resolve a finding through it and run the
//! resulting [`Action`], differing only in the [`Target`] they pass.

use crate::bridge::{self, BridgeStyle};
use crate::chart::{Chart, Fill, Overlay, Tooth, layout};
use crate::config::{ChartConfig, LabelMetrics};
use crate::grammar::diag::{self, Diagnostic, codes};
use crate::validate::FindingRecord;
use odontogram_diagnostics::Span;
use odontogram_tables::{FacePosition, FindingEntry, FindingName, LabelChannel, ReferenceTables, ToothId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Label used for the supernumerary marker when the table entry has none.
const SUPERNUMERARY_LABEL: &str = "S";

/// Behaviour attached to a finding name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "arg")]
pub enum Action {
    /// Paint the selected faces (all faces when none are given).
    PaintFaces(Fill),
    /// Turn an overlay flag on.
    Overlay(Overlay),
    /// Add the entry's short label to a label channel.
    Prosthesis(LabelChannel),
    /// Show the supernumerary marker.
    Supernumerary,
    /// Mark the tooth as part of a bridge.
    Bridge,
    /// Return the tooth to its blank state.
    Reset,
}

/// Where an action comes from; decides the edit semantics of paint and bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'r> {
    /// Batch application with the record's face letters.
    Batch {
        /// Validated face letters (may be empty).
        faces: &'r str,
    },
    /// Interactive click, optionally on a single face.
    Click {
        /// Clicked face, if the click hit one.
        face: Option<FacePosition>,
    },
}

/// What an [`Action`] did to a tooth.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The tooth was updated.
    Applied,
    /// The prosthesis label was already on that channel; nothing changed.
    DuplicateLabel {
        /// Channel that already holds the label.
        channel: LabelChannel,
        /// The repeated label.
        label: String,
    },
}

impl Action {
    /// Run this action against `tooth`.
    ///
    /// `entry` is the table entry the action was resolved from; prosthesis and
    /// supernumerary actions take their label from it.
    pub fn apply(
        self,
        tooth: &mut Tooth,
        entry: &FindingEntry,
        target: Target<'_>,
        tables: &ReferenceTables,
        metrics: &LabelMetrics,
    ) -> Outcome {
        match self {
            Action::PaintFaces(fill) => match target {
                Target::Click { face: Some(face) } => tooth.toggle(face, fill),
                Target::Batch { faces } if !faces.is_empty() => {
                    for face in faces.chars().filter_map(|c| tables.face_for_letter(c)) {
                        tooth.paint(face, fill);
                    }
                }
                _ => tooth.paint_all(fill),
            },
            Action::Overlay(overlay) => tooth.overlays.set(overlay, true),
            Action::Prosthesis(channel) => {
                let label = entry.label.as_deref().unwrap_or(entry.name.as_str());
                if !tooth.labels.push(channel, label) {
                    return Outcome::DuplicateLabel {
                        channel,
                        label: label.to_string(),
                    };
                }
                tooth.label_blocks = layout::label_blocks(tooth, metrics);
            }
            Action::Supernumerary => {
                let label = entry.label.as_deref().unwrap_or(SUPERNUMERARY_LABEL);
                tooth.supernumerary = Some(label.to_string());
            }
            Action::Bridge => match target {
                Target::Batch { .. } => tooth.has_bridge = true,
                Target::Click { .. } => tooth.has_bridge = !tooth.has_bridge,
            },
            Action::Reset => tooth.reset(),
        }
        Outcome::Applied
    }
}

/// Map from finding name to [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchTable {
    actions: BTreeMap<FindingName, Action>,
}

impl DispatchTable {
    /// An empty table; every finding is unhandled.
    pub fn empty() -> Self {
        Self {
            actions: BTreeMap::new(),
        }
    }

    /// The standard mapping covering every [`FindingName`].
    pub fn standard() -> Self {
        use FindingName as F;

        let mut t = Self::empty();
        t.insert(F::None, Action::Reset);
        t.insert(F::Filling, Action::PaintFaces(Fill::Restored));
        t.insert(F::Caries, Action::PaintFaces(Fill::Decayed));
        t.insert(F::Agenesis, Action::Overlay(Overlay::CongenitallyAbsent));
        t.insert(F::Missing, Action::Overlay(Overlay::Missing));
        t.insert(F::Crown, Action::Overlay(Overlay::Crown));
        t.insert(F::Implant, Action::Overlay(Overlay::Implant));
        t.insert(F::Sealant, Action::Overlay(Overlay::Sealant));
        t.insert(
            F::PhysiologicalAbsence,
            Action::Overlay(Overlay::PhysiologicallyAbsent),
        );
        t.insert(F::Extraction, Action::Overlay(Overlay::Extraction));
        t.insert(F::Supernumerary, Action::Supernumerary);
        t.insert(F::Bridge, Action::Bridge);
        for name in [
            F::PrsR,
            F::PriR,
            F::PcsR,
            F::PciR,
            F::PrsB,
            F::PriB,
            F::PcsB,
            F::PciB,
        ] {
            if let Some(channel) = name.channel() {
                t.insert(name, Action::Prosthesis(channel));
            }
        }
        t
    }

    /// Register or replace the action for `name`, returning the previous one.
    pub fn insert(&mut self, name: FindingName, action: Action) -> Option<Action> {
        self.actions.insert(name, action)
    }

    /// Remove the action for `name`.
    pub fn remove(&mut self, name: FindingName) -> Option<Action> {
        self.actions.remove(&name)
    }

    /// Action registered for `name`.
    pub fn get(&self, name: FindingName) -> Option<Action> {
        self.actions.get(&name).copied()
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// `true` when no action is registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// An interactive edit: apply `finding` to `tooth`, optionally on one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCommand {
    /// Finding code to apply.
    pub finding: u8,
    /// Target tooth.
    pub tooth: ToothId,
    /// Clicked face, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<FacePosition>,
}

/// Result of a batch or edit application.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    /// Records (or edits) that changed the chart.
    pub applied: usize,
    /// Skipped records and notes.
    pub diagnostics: Vec<Diagnostic>,
}

/// Applies findings to a chart using a dispatch table.
#[derive(Debug, Clone)]
pub struct Applicator<'t> {
    tables: &'t ReferenceTables,
    dispatch: DispatchTable,
    labels: LabelMetrics,
    bridge_style: BridgeStyle,
}

/// A finding resolved to its table entry and action.
struct Resolved<'t> {
    entry: &'t FindingEntry,
    action: Action,
}

impl<'t> Applicator<'t> {
    /// Applicator with the standard dispatch table and default configuration.
    pub fn new(tables: &'t ReferenceTables) -> Self {
        Self {
            tables,
            dispatch: DispatchTable::standard(),
            labels: LabelMetrics::default(),
            bridge_style: BridgeStyle::default(),
        }
    }

    /// Applicator using the label metrics and bridge style of `config`.
    pub fn with_config(tables: &'t ReferenceTables, config: &ChartConfig) -> Self {
        Self {
            labels: config.labels.clone(),
            bridge_style: config.bridge_style,
            ..Self::new(tables)
        }
    }

    /// Replace the dispatch table.
    pub fn with_dispatch(mut self, dispatch: DispatchTable) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Replace the bridge style.
    pub fn with_bridge_style(mut self, style: BridgeStyle) -> Self {
        self.bridge_style = style;
        self
    }

    /// The dispatch table in use.
    pub fn dispatch(&self) -> &DispatchTable {
        &self.dispatch
    }

    /// Reset the chart and apply `records` to it.
    ///
    /// Records are grouped by tooth and applied in arrival order within each
    /// tooth. Applying the same records again yields the same chart.
    pub fn apply_batch(&self, chart: &mut Chart, records: &[FindingRecord]) -> ApplyReport {
        let mut report = ApplyReport::default();

        let mut pending: BTreeMap<ToothId, Vec<&FindingRecord>> = BTreeMap::new();
        for rec in records {
            if chart.contains(rec.tooth) {
                pending.entry(rec.tooth).or_default().push(rec);
            } else {
                diag::report(
                    &mut report.diagnostics,
                    not_in_chart(rec.tooth, rec.finding, Some(rec.span)),
                );
            }
        }

        chart.reset_all();

        for (id, recs) in pending {
            for rec in recs {
                let Some(resolved) =
                    self.resolve(rec.finding, rec.tooth, Some(rec.span), &mut report.diagnostics)
                else {
                    continue;
                };
                let Some(tooth) = chart.tooth_mut(id) else {
                    continue;
                };
                let target = Target::Batch { faces: &rec.faces };
                self.run(resolved, tooth, target, Some(rec.span), &mut report);
            }
        }

        let segments = bridge::recompute_bridges_with(chart, self.bridge_style);
        tracing::debug!(
            records = records.len(),
            applied = report.applied,
            segments = segments.len(),
            "applied batch"
        );
        chart.set_bridges(segments);
        report
    }

    /// Apply one interactive edit.
    ///
    /// Locked charts are left untouched. Bridges are recomputed after every
    /// applied edit.
    pub fn apply_edit(&self, chart: &mut Chart, cmd: EditCommand) -> ApplyReport {
        let mut report = ApplyReport::default();

        if chart.is_locked() {
            diag::report(
                &mut report.diagnostics,
                Diagnostic::for_code(
                    codes::CHART_LOCKED,
                    format!("chart is locked; ignored edit on tooth {}", cmd.tooth),
                    None,
                )
                .with_context(ctx!(
                    "tooth" => cmd.tooth.to_string(),
                    "finding" => cmd.finding.to_string(),
                )),
            );
            return report;
        }

        let Some(resolved) = self.resolve(cmd.finding, cmd.tooth, None, &mut report.diagnostics)
        else {
            return report;
        };
        let Some(tooth) = chart.tooth_mut(cmd.tooth) else {
            diag::report(
                &mut report.diagnostics,
                not_in_chart(cmd.tooth, cmd.finding, None),
            );
            return report;
        };
        self.run(resolved, tooth, Target::Click { face: cmd.face }, None, &mut report);

        let segments = bridge::recompute_bridges_with(chart, self.bridge_style);
        chart.set_bridges(segments);
        report
    }

    fn resolve(
        &self,
        code: u8,
        tooth: ToothId,
        span: Option<Span>,
        out: &mut Vec<Diagnostic>,
    ) -> Option<Resolved<'t>> {
        let tables: &'t ReferenceTables = self.tables;
        let Some(entry) = tables.finding(code) else {
            diag::report(
                out,
                Diagnostic::for_code(
                    codes::UNHANDLED_FINDING,
                    format!("finding {code} on tooth {tooth} has no table entry"),
                    span,
                )
                .with_context(ctx!("finding" => code.to_string(), "tooth" => tooth.to_string())),
            );
            return None;
        };
        let Some(action) = self.dispatch.get(entry.name) else {
            diag::report(
                out,
                Diagnostic::for_code(
                    codes::UNHANDLED_FINDING,
                    format!("finding `{}` on tooth {tooth} has no action", entry.name),
                    span,
                )
                .with_context(ctx!(
                    "finding" => code.to_string(),
                    "name" => entry.name.as_str(),
                    "tooth" => tooth.to_string(),
                )),
            );
            return None;
        };
        Some(Resolved { entry, action })
    }

    fn run(
        &self,
        resolved: Resolved<'_>,
        tooth: &mut Tooth,
        target: Target<'_>,
        span: Option<Span>,
        report: &mut ApplyReport,
    ) {
        let id = tooth.id;
        match resolved
            .action
            .apply(tooth, resolved.entry, target, self.tables, &self.labels)
        {
            Outcome::Applied => report.applied += 1,
            Outcome::DuplicateLabel { channel, label } => diag::report(
                &mut report.diagnostics,
                Diagnostic::for_code(
                    codes::DUPLICATE_LABEL,
                    format!("label {label} already shown on the {channel} channel of tooth {id}"),
                    span,
                )
                .with_context(ctx!(
                    "tooth" => id.to_string(),
                    "label" => label,
                    "channel" => channel.to_string(),
                )),
            ),
        }
    }
}

fn not_in_chart(tooth: ToothId, finding: u8, span: Option<Span>) -> Diagnostic {
    Diagnostic::for_code(
        codes::TOOTH_NOT_IN_CHART,
        format!("tooth {tooth} is not part of this chart"),
        span,
    )
    .with_context(ctx!("tooth" => tooth.to_string(), "finding" => finding.to_string()))
}

/// Reset `chart` and apply `records` with the standard dispatch table.
pub fn apply_batch(
    chart: &mut Chart,
    records: &[FindingRecord],
    tables: &ReferenceTables,
) -> ApplyReport {
    Applicator::new(tables).apply_batch(chart, records)
}

/// Apply one interactive edit with the standard dispatch table.
pub fn apply_edit(chart: &mut Chart, cmd: EditCommand, tables: &ReferenceTables) -> ApplyReport {
    Applicator::new(tables).apply_edit(chart, cmd)
}
