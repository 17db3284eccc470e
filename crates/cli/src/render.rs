//! Pretty diagnostic rendering using ariadne.
//!
//! Converts [`Diagnostic`]s into ariadne [`Report`]s that underline the
//! offending token in the status string. Also renders the per-row chart
//! summary printed by `apply` in pretty mode.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use odontogram_core::{Chart, Fill, Overlay, Tooth};
use odontogram_diagnostics::{Diagnostic, Severity};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for diagnostic rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// The explicit `--output` value, else pretty on a TTY and JSON otherwise.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Diagnostics ─────────────────────────────────────────────────────────

fn style(severity: &Severity) -> (ReportKind<'static>, Color) {
    match severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Info => (ReportKind::Advice, Color::Blue),
        _ => (ReportKind::Warning, Color::Yellow),
    }
}

fn context_line(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Render diagnostics against the status string to stderr.
///
/// Spanned diagnostics underline their token, labelled with the context
/// (`finding=1, tooth=99`). The rest are reported without a label.
pub(crate) fn render_diagnostics_pretty(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let (kind, color) = style(&diag.severity);
        let context = context_line(diag);
        let span = diag.span.map_or(0..0, |s| {
            let start = s.start.min(source.len());
            start..s.end.clamp(start, source.len())
        });

        let mut report = Report::build(kind, (filename, span.clone()))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(Config::default().with_compact(false));
        if diag.span.is_some() {
            let text = context.clone().unwrap_or_else(|| diag.message.clone());
            report = report.with_label(
                Label::new((filename, span))
                    .with_message(text)
                    .with_color(color),
            );
        } else if let Some(note) = context {
            report = report.with_note(note);
        }
        if let Some(explanation) = diag.explain() {
            report = report.with_help(explanation);
        }
        report.finish().eprint(&mut cache).ok();
    }
}

// ── JSON rendering ──────────────────────────────────────────────────────

/// Print a JSON value to stdout.
pub(crate) fn print_json(value: &serde_json::Value) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured count line such as `2 errors, 1 warning`.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    use ariadne::Fmt;

    let (mut errors, mut warnings, mut infos) = (0usize, 0usize, 0usize);
    for d in diagnostics {
        match d.severity {
            Severity::Error => errors += 1,
            Severity::Info => infos += 1,
            _ => warnings += 1,
        }
    }

    if diagnostics.is_empty() {
        return;
    }

    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{errors} error{s}").fg(Color::Red)));
    }
    if warnings > 0 {
        let s = if warnings == 1 { "" } else { "s" };
        parts.push(format!(
            "{}",
            format!("{warnings} warning{s}").fg(Color::Yellow)
        ));
    }
    if infos > 0 {
        parts.push(format!("{}", format!("{infos} info").fg(Color::Blue)));
    }
    eprintln!("{}", parts.join(", "));
}

// ── Chart summary ───────────────────────────────────────────────────────

/// Print one line per non-blank tooth, grouped by row, then the bridge count.
pub(crate) fn print_chart(chart: &Chart) {
    for (i, row) in chart.rows().iter().enumerate() {
        let lines: Vec<String> = row
            .iter()
            .filter(|t| !t.is_blank())
            .map(describe_tooth)
            .collect();
        if lines.is_empty() {
            println!("row {}: blank", i + 1);
            continue;
        }
        println!("row {}:", i + 1);
        for line in lines {
            println!("  {line}");
        }
    }
    println!("bridge segments: {}", chart.bridges().len());
    if chart.is_locked() {
        println!("locked");
    }
}

const OVERLAY_NAMES: [(Overlay, &str); 7] = [
    (Overlay::Missing, "missing"),
    (Overlay::Crown, "crown"),
    (Overlay::Implant, "implant"),
    (Overlay::Sealant, "sealant"),
    (Overlay::CongenitallyAbsent, "agenesis"),
    (Overlay::PhysiologicallyAbsent, "physiological absence"),
    (Overlay::Extraction, "extraction"),
];

fn describe_tooth(tooth: &Tooth) -> String {
    let mut parts = Vec::new();
    for (fill, name) in [(Fill::Restored, "restored"), (Fill::Decayed, "decayed")] {
        let faces: Vec<String> = tooth
            .faces
            .iter()
            .filter(|f| f.fill == fill)
            .map(|f| f.position.to_string())
            .collect();
        if !faces.is_empty() {
            parts.push(format!("{name} {}", faces.join("/")));
        }
    }
    for (overlay, name) in OVERLAY_NAMES {
        if tooth.overlays.get(overlay) {
            parts.push(name.to_string());
        }
    }
    if let Some(label) = &tooth.supernumerary {
        parts.push(format!("supernumerary {label}"));
    }
    if !tooth.labels.existing.is_empty() {
        parts.push(format!("existing {}", tooth.labels.existing.join(" ")));
    }
    if !tooth.labels.required.is_empty() {
        parts.push(format!("required {}", tooth.labels.required.join(" ")));
    }
    if tooth.has_bridge {
        parts.push("bridge".to_string());
    }
    format!("{}: {}", tooth.id, parts.join(", "))
}
