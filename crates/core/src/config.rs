//! Configuration types for chart construction and state application.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration.

use crate::bridge::BridgeStyle;
use crate::grammar::parser::TokenGrammar;
use odontogram_tables::ReferenceTables;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete chart configuration.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Tooth placement.
    pub layout: ChartLayout,
    /// Prosthesis label block metrics.
    pub labels: LabelMetrics,
    /// How bridged teeth are turned into connector segments.
    pub bridge_style: BridgeStyle,
    /// How status token digits are split.
    pub grammar: TokenGrammar,
}

/// Tooth placement in chart coordinates.
///
/// Rows narrower than the widest row are centred horizontally.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    /// Edge length of a tooth's square.
    pub tooth_size: f64,
    /// Horizontal gap between neighbouring teeth.
    pub margin: f64,
    /// Left edge of the widest row.
    pub origin_x: f64,
    /// Top edge of each row, one entry per row.
    pub row_y: Vec<f64>,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            tooth_size: 40.0,
            margin: 10.0,
            origin_x: 50.0,
            row_y: vec![50.0, 200.0, 350.0, 500.0],
        }
    }
}

/// Text metrics used to size prosthesis label blocks.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelMetrics {
    /// Advance width of one character.
    pub char_width: f64,
    /// Height of one line of label text.
    pub line_height: f64,
    /// Vertical gap between a block and whatever lies below it.
    pub gap: f64,
}

impl Default for LabelMetrics {
    fn default() -> Self {
        Self {
            char_width: 9.0,
            line_height: 18.0,
            gap: 5.0,
        }
    }
}

/// Configuration loading and consistency errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}")]
    Read {
        /// File that was attempted.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration JSON could not be deserialized.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A numeric field holds a value the chart cannot use.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// The layout has fewer row positions than the tables have rows.
    #[error("layout defines {found} row positions but the tables have {expected} rows")]
    MissingRowPosition {
        /// Rows in the reference tables.
        expected: usize,
        /// Entries in `layout.row_y`.
        found: usize,
    },
}

impl ChartConfig {
    /// Deserialize a configuration from JSON and check its values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: ChartConfig = serde_json::from_str(json)?;
        cfg.check()?;
        Ok(cfg)
    }

    /// Read and deserialize a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check value ranges that do not depend on the reference tables.
    pub fn check(&self) -> Result<(), ConfigError> {
        positive("layout.tooth_size", self.layout.tooth_size)?;
        non_negative("layout.margin", self.layout.margin)?;
        positive("labels.char_width", self.labels.char_width)?;
        positive("labels.line_height", self.labels.line_height)?;
        non_negative("labels.gap", self.labels.gap)?;
        Ok(())
    }
}

impl ChartLayout {
    /// Check that every row of `tables` has a vertical position.
    pub fn check_rows(&self, tables: &ReferenceTables) -> Result<(), ConfigError> {
        if self.row_y.len() < tables.rows.len() {
            return Err(ConfigError::MissingRowPosition {
                expected: tables.rows.len(),
                found: self.row_y.len(),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{v} must be a positive number"),
        })
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{v} must not be negative"),
        })
    }
}
