//! Odontogram core library.
//!
//! Decodes compact dental status strings (`"1155,117OV,1418M"`) into
//! finding records, validates them against the reference tables and applies
//! them to an in-memory chart. The main entry points are [`parse_status`]
//! for parsing, [`validate_records`] for validation, [`Applicator`] for
//! batch loads and interactive edits, and [`load_status`] for all three in
//! one call.

#![warn(missing_docs)]

/// State application: dispatch table, batch loads and interactive edits.
pub mod apply;
/// Bridge connector synthesis.
pub mod bridge;
/// Chart model and layout.
pub mod chart;
/// Chart configuration.
pub mod config;
/// Status grammar: lexer, token decoding and diagnostics re-exports.
pub mod grammar;
/// Parse/validate/apply facade.
pub mod pipeline;
/// Record validation.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Parser
pub use grammar::parser::{
    ParseResult, RawRecord, TokenGrammar, TokenStream, parse_status, parse_status_with, tokens,
    tokens_with,
};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, Severity, Span, codes};

// Validator
pub use validate::{FindingRecord, ValidationResult, validate_record, validate_records};

// Chart
pub use chart::{Chart, Fill, Geometry, LabelBlock, Overlay, Overlays, Tooth, ToothFace};

// Application
pub use apply::{
    Action, Applicator, ApplyReport, DispatchTable, EditCommand, Target, apply_batch, apply_edit,
};

// Bridges
pub use bridge::{BridgeSegment, BridgeStyle, recompute_bridges, recompute_bridges_with};

// Configuration
pub use config::{ChartConfig, ChartLayout, ConfigError, LabelMetrics};

// Pipeline
pub use pipeline::{LoadReport, PatientRecord, load_record, load_status};

// Tables
pub use odontogram_tables::{FacePosition, FindingName, LabelChannel, ReferenceTables, ToothId};
