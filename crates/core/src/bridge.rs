//! Bridge connector synthesis.
//!
//! Segments are a pure function of the teeth's `has_bridge` flags and
//! geometry; every run recomputes them from scratch.

use crate::chart::{Chart, Tooth};
use odontogram_tables::ToothId;
use serde::{Deserialize, Serialize};

/// Horizontal overhang of a bar past the outer edges of its teeth.
const BAR_INSET: f64 = 5.0;

/// How bridged teeth are turned into segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeStyle {
    /// One bar per bridged tooth.
    #[default]
    PerTooth,
    /// One bar per run of positionally adjacent bridged teeth, with end caps.
    Merged,
}

/// Orientation of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Horizontal connector bar.
    Bar,
    /// Vertical end cap of a merged run.
    Cap,
}

/// A line segment in chart coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeSegment {
    /// Bar or cap.
    pub kind: SegmentKind,
    /// Start x.
    pub x1: f64,
    /// Start y.
    pub y1: f64,
    /// End x.
    pub x2: f64,
    /// End y.
    pub y2: f64,
    /// Teeth this segment belongs to, in positional order.
    pub teeth: Vec<ToothId>,
}

/// Recompute segments with the per-tooth style.
pub fn recompute_bridges(chart: &Chart) -> Vec<BridgeSegment> {
    recompute_bridges_with(chart, BridgeStyle::PerTooth)
}

/// Recompute segments with an explicit style.
pub fn recompute_bridges_with(chart: &Chart, style: BridgeStyle) -> Vec<BridgeSegment> {
    let mut out = Vec::new();
    for row in chart.rows() {
        match style {
            BridgeStyle::PerTooth => {
                for tooth in row.iter().filter(|t| t.has_bridge) {
                    out.push(bar(std::slice::from_ref(tooth)));
                }
            }
            BridgeStyle::Merged => {
                for run in row
                    .chunk_by(|a, b| a.has_bridge == b.has_bridge)
                    .filter(|run| run[0].has_bridge)
                {
                    out.push(bar(run));
                    if let [first, .., last] = run {
                        out.push(cap(first));
                        out.push(cap(last));
                    }
                }
            }
        }
    }
    tracing::debug!(?style, segments = out.len(), "recomputed bridges");
    out
}

fn bar_y(tooth: &Tooth) -> f64 {
    let g = tooth.geometry;
    g.y + g.size / 6.0 + g.size / 2.0 - 10.0
}

fn bar(run: &[Tooth]) -> BridgeSegment {
    let first = &run[0];
    let last = &run[run.len() - 1];
    let y = bar_y(first);
    BridgeSegment {
        kind: SegmentKind::Bar,
        x1: first.geometry.x - BAR_INSET,
        y1: y,
        x2: last.geometry.x + last.geometry.size + BAR_INSET,
        y2: y,
        teeth: run.iter().map(|t| t.id).collect(),
    }
}

fn cap(tooth: &Tooth) -> BridgeSegment {
    let x = tooth.geometry.center_x();
    BridgeSegment {
        kind: SegmentKind::Cap,
        x1: x,
        y1: bar_y(tooth),
        x2: x,
        y2: tooth.geometry.y,
        teeth: vec![tooth.id],
    }
}
