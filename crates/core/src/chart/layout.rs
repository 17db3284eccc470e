use super::Tooth;
use crate::config::{ChartLayout, LabelMetrics};
use odontogram_tables::{LabelChannel, ReferenceTables};
use serde::Serialize;

/// Square a tooth occupies, in chart coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Edge length.
    pub size: f64,
}

impl Geometry {
    /// Horizontal centre.
    pub fn center_x(&self) -> f64 {
        self.x + self.size / 2.0
    }
}

/// A laid-out prosthesis label block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelBlock {
    /// Channel the block belongs to.
    pub channel: LabelChannel,
    /// The channel's labels joined with a space.
    pub text: String,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Block width.
    pub width: f64,
    /// Block height.
    pub height: f64,
}

impl LabelBlock {
    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Compute the geometry of every tooth, row by row.
///
/// The widest row starts at `origin_x`; narrower rows are centred on it.
/// Callers must have checked that `layout.row_y` covers every row.
pub(crate) fn place_rows(tables: &ReferenceTables, layout: &ChartLayout) -> Vec<Vec<Geometry>> {
    let step = layout.tooth_size + layout.margin;
    let row_width = |n: usize| {
        if n == 0 {
            0.0
        } else {
            n as f64 * step - layout.margin
        }
    };
    let widest = tables.rows.iter().map(Vec::len).max().unwrap_or(0);
    let full = row_width(widest);

    tables
        .rows
        .iter()
        .zip(&layout.row_y)
        .map(|(row, &y)| {
            let x0 = layout.origin_x + (full - row_width(row.len())) / 2.0;
            (0..row.len())
                .map(|i| Geometry {
                    x: x0 + i as f64 * step,
                    y,
                    size: layout.tooth_size,
                })
                .collect()
        })
        .collect()
}

/// Lay out the label blocks of `tooth`.
///
/// The `existing` block sits `gap` above the tooth; the `required` block
/// sits `gap` above the `existing` block, or above the tooth when there is
/// no `existing` block. Both are centred on the tooth.
pub fn label_blocks(tooth: &Tooth, metrics: &LabelMetrics) -> Vec<LabelBlock> {
    let g = tooth.geometry;
    let mut blocks = Vec::with_capacity(2);
    let mut floor = g.y;
    for channel in [LabelChannel::Existing, LabelChannel::Required] {
        let labels = tooth.labels.channel(channel);
        if labels.is_empty() {
            continue;
        }
        let text = labels.join(" ");
        let width = text.chars().count() as f64 * metrics.char_width;
        let height = metrics.line_height;
        let y = floor - metrics.gap - height;
        blocks.push(LabelBlock {
            channel,
            x: g.center_x() - width / 2.0,
            y,
            width,
            height,
            text,
        });
        floor = y;
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use odontogram_tables::ToothId;

    #[test]
    fn narrow_rows_are_centred() {
        let tables = ReferenceTables::standard();
        let rows = place_rows(&tables, &ChartLayout::default());
        // 16 teeth: 16 * 50 - 10 = 790 wide; 10 teeth: 490 wide.
        assert_eq!(rows[0][0].x, 50.0);
        assert_eq!(rows[0][15].x, 50.0 + 15.0 * 50.0);
        assert_eq!(rows[1][0].x, 50.0 + 150.0);
        assert_eq!(rows[1][0].y, 200.0);
        assert_eq!(rows[3][0].y, 500.0);
    }

    fn tooth() -> Tooth {
        Tooth::new(
            ToothId(11),
            Geometry {
                x: 100.0,
                y: 200.0,
                size: 40.0,
            },
        )
    }

    #[test]
    fn no_labels_no_blocks() {
        assert!(label_blocks(&tooth(), &LabelMetrics::default()).is_empty());
    }

    #[test]
    fn existing_block_sits_above_tooth() {
        let mut t = tooth();
        t.labels.push(LabelChannel::Existing, "PRS");
        t.labels.push(LabelChannel::Existing, "PCI");
        let blocks = label_blocks(&t, &LabelMetrics::default());
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!(b.text, "PRS PCI");
        assert_eq!(b.width, 63.0);
        assert_eq!(b.x, 120.0 - 31.5);
        assert_eq!(b.y, 200.0 - 5.0 - 18.0);
        assert!(b.bottom() < t.geometry.y);
    }

    #[test]
    fn required_block_stacks_above_existing() {
        let mut t = tooth();
        t.labels.push(LabelChannel::Existing, "PRS");
        t.labels.push(LabelChannel::Required, "PCS");
        let blocks = label_blocks(&t, &LabelMetrics::default());
        assert_eq!(blocks.len(), 2);
        let (existing, required) = (&blocks[0], &blocks[1]);
        assert_eq!(required.channel, LabelChannel::Required);
        assert!(required.bottom() < existing.y);
        assert_eq!(required.y, existing.y - 5.0 - 18.0);
    }

    #[test]
    fn required_alone_sits_directly_above_tooth() {
        let mut t = tooth();
        t.labels.push(LabelChannel::Required, "PRI");
        let blocks = label_blocks(&t, &LabelMetrics::default());
        assert_eq!(blocks[0].y, 200.0 - 5.0 - 18.0);
    }
}
