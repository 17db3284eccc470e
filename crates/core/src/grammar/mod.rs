/// Re-exports from the diagnostics crate.
pub mod diag;
/// Status lexer: splits a status string into borrowed, span-tagged tokens.
pub mod lexer;
/// Token decoding into raw finding records.
pub mod parser;
