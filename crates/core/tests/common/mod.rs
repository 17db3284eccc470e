//! Shared test helpers for `odontogram_core` integration tests.

#![allow(unreachable_pub)]

use odontogram_core::{
    Chart, ChartConfig, ChartLayout, Diagnostic, LoadReport, ReferenceTables, Tooth, ToothId,
    load_status,
};
use std::sync::LazyLock;

/// Standard tables built once per test binary.
pub static TABLES: LazyLock<ReferenceTables> = LazyLock::new(ReferenceTables::standard);

/// A blank chart over the standard tables with the default layout.
#[allow(dead_code)]
pub fn chart() -> Chart {
    Chart::new(&TABLES, &ChartLayout::default()).expect("default layout covers standard rows")
}

/// A chart loaded from `status` with the default configuration.
#[allow(dead_code)]
pub fn loaded(status: &str) -> (Chart, LoadReport) {
    loaded_with(status, &ChartConfig::default())
}

/// A chart loaded from `status` with an explicit configuration.
#[allow(dead_code)]
pub fn loaded_with(status: &str, config: &ChartConfig) -> (Chart, LoadReport) {
    let mut c = chart();
    let report = load_status(&mut c, Some(status), &TABLES, config);
    (c, report)
}

/// Tooth lookup that panics with the tooth id on a miss.
#[allow(dead_code)]
pub fn tooth(chart: &Chart, id: u8) -> &Tooth {
    chart
        .tooth(ToothId(id))
        .unwrap_or_else(|| panic!("tooth {id} not in chart"))
}

/// Collect diagnostic codes.
#[allow(dead_code)]
pub fn diag_codes<'a>(diags: impl IntoIterator<Item = &'a Diagnostic>) -> Vec<String> {
    diags.into_iter().map(|d| d.id.to_string()).collect()
}

/// Find first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(diags: impl IntoIterator<Item = &'a Diagnostic>, code: &str) -> &'a Diagnostic {
    diags
        .into_iter()
        .find(|d| d.id == code)
        .unwrap_or_else(|| panic!("no diagnostic with code {code}"))
}
