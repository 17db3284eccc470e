pub use odontogram_diagnostics::*;

/// Emit a diagnostic as a `tracing` event at the level matching its severity.
pub(crate) fn trace(d: &Diagnostic) {
    let (start, end) = d.span.map_or((None, None), |s| (Some(s.start), Some(s.end)));
    match d.severity {
        Severity::Error => tracing::error!(code = %d.id, ?start, ?end, "{}", d.message),
        Severity::Info => tracing::info!(code = %d.id, ?start, ?end, "{}", d.message),
        _ => tracing::warn!(code = %d.id, ?start, ?end, "{}", d.message),
    }
}

/// Log `d` and push it onto `out`.
pub(crate) fn report(out: &mut Vec<Diagnostic>, d: Diagnostic) {
    trace(&d);
    out.push(d);
}
