mod logging;
mod render;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use odontogram_core::{
    BridgeStyle, Chart, ChartConfig, PatientRecord, TokenGrammar, load_status, parse_status_with,
    validate_records,
};
use odontogram_diagnostics::{self as diag, Diagnostic, Severity};
use odontogram_tables::ReferenceTables;

use crate::logging::{LogConfig, init_logging};
use crate::render::{Format, print_chart, print_json, print_summary, render_diagnostics_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "odontogram",
    version,
    about = "Odontogram toolchain: decode, check and apply dental status strings"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Reference tables JSON. Defaults to the built-in standard tables.
    #[arg(long, global = true)]
    tables: Option<PathBuf>,

    /// Chart configuration JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured token grammar.
    #[arg(long, global = true, value_enum)]
    grammar: Option<GrammarArg>,

    /// Override the configured bridge style.
    #[arg(long, global = true, value_enum)]
    bridge_style: Option<BridgeStyleArg>,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode a status string and print its records.
    Parse {
        /// Comma-separated status string, or "-" to read stdin.
        status: String,
    },

    /// Decode and validate a status string (exit 1 if any record is dropped).
    Check {
        /// Comma-separated status string, or "-" to read stdin.
        status: String,
    },

    /// Apply a status string to a blank chart and print the chart.
    Apply {
        /// Comma-separated status string, or "-" to read stdin. Omit for a
        /// blank chart.
        #[arg(conflicts_with = "record")]
        status: Option<String>,
        /// Patient record JSON; its `status` field is applied.
        #[arg(long)]
        record: Option<PathBuf>,
        /// Mark the resulting chart read-only.
        #[arg(long)]
        lock: bool,
    },

    /// Explain a diagnostic ID (e.g. ODN1102).
    Explain { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GrammarArg {
    /// Last two digits are the tooth.
    TrailingTooth,
    /// Greedy finding-first split with backtracking.
    LegacyFindingFirst,
}

impl From<GrammarArg> for TokenGrammar {
    fn from(g: GrammarArg) -> Self {
        match g {
            GrammarArg::TrailingTooth => TokenGrammar::TrailingTooth,
            GrammarArg::LegacyFindingFirst => TokenGrammar::LegacyFindingFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BridgeStyleArg {
    /// One bar per bridged tooth.
    PerTooth,
    /// One bar per run of adjacent bridged teeth.
    Merged,
}

impl From<BridgeStyleArg> for BridgeStyle {
    fn from(s: BridgeStyleArg) -> Self {
        match s {
            BridgeStyleArg::PerTooth => BridgeStyle::PerTooth,
            BridgeStyleArg::Merged => BridgeStyle::Merged,
        }
    }
}

/// Tables and configuration shared by every command.
struct Env {
    tables: ReferenceTables,
    config: ChartConfig,
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose));
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Cmd::Explain { id } = &cli.cmd {
        return cmd_explain(id, format);
    }

    let env = Env {
        tables: load_tables(cli.tables.as_deref())?,
        config: load_config(cli.config.as_deref(), cli.grammar, cli.bridge_style)?,
    };

    match cli.cmd {
        Cmd::Parse { status } => cmd_parse(&read_status(status)?, &env, format)?,
        Cmd::Check { status } => cmd_check(&read_status(status)?, &env, format)?,
        Cmd::Apply {
            status,
            record,
            lock,
        } => cmd_apply(status, record.as_deref(), lock, &env, format)?,
        Cmd::Explain { .. } => {}
    }
    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(status: &str, env: &Env, format: Format) -> Result<()> {
    let res = parse_status_with(status, env.config.grammar, env.tables.max_finding);

    match format {
        Format::Json => {
            print_json(&serde_json::json!({
                "records": res.records,
                "diagnostics": res.diagnostics,
            }))?;
        }
        Format::Pretty => {
            for r in &res.records {
                let faces = if r.faces.is_empty() { "-" } else { r.faces.as_str() };
                println!("finding {:>2}  tooth {}  faces {}", r.finding, r.tooth, faces);
            }
            render_diagnostics_pretty(status, "status", &res.diagnostics);
            print_summary(&res.diagnostics);
        }
    }

    exit_on_errors(&res.diagnostics);
    Ok(())
}

fn cmd_check(status: &str, env: &Env, format: Format) -> Result<()> {
    let parsed = parse_status_with(status, env.config.grammar, env.tables.max_finding);
    let vr = validate_records(&parsed.records, &env.tables);

    let mut issues = parsed.diagnostics;
    issues.extend(vr.issues);
    let ok = !issues.iter().any(Diagnostic::is_error);

    match format {
        Format::Json => {
            print_json(&serde_json::json!({
                "ok": ok,
                "records": vr.records,
                "issues": issues,
            }))?;
        }
        Format::Pretty => {
            render_diagnostics_pretty(status, "status", &issues);
            print_summary(&issues);
            if ok {
                eprintln!("status ok: {} records", vr.records.len());
            }
        }
    }

    exit_on_errors(&issues);
    Ok(())
}

fn cmd_apply(
    status: Option<String>,
    record: Option<&Path>,
    lock: bool,
    env: &Env,
    format: Format,
) -> Result<()> {
    let (source, name) = match (status, record) {
        (_, Some(path)) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read record '{}'", path.display()))?;
            let rec: PatientRecord = serde_json::from_str(&json)
                .with_context(|| format!("failed to parse record '{}'", path.display()))?;
            (rec.status, path.display().to_string())
        }
        (Some(status), None) => (Some(read_status(status)?), "status".to_string()),
        (None, None) => (None, "status".to_string()),
    };

    let mut chart = Chart::new(&env.tables, &env.config.layout)
        .context("chart layout does not fit the reference tables")?;
    let report = load_status(&mut chart, source.as_deref(), &env.tables, &env.config);
    chart.set_locked(lock);
    tracing::info!(
        source = %name,
        applied = report.apply.applied,
        locked = lock,
        "applied status"
    );

    let diagnostics: Vec<Diagnostic> = report.diagnostics().cloned().collect();
    match format {
        Format::Json => {
            print_json(&serde_json::json!({
                "applied": report.apply.applied,
                "diagnostics": diagnostics,
                "chart": chart,
            }))?;
        }
        Format::Pretty => {
            print_chart(&chart);
            render_diagnostics_pretty(source.as_deref().unwrap_or_default(), &name, &diagnostics);
            print_summary(&diagnostics);
        }
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            print_json(&serde_json::json!({
                "id": id,
                "severity": diag::severity_for_code(id),
                "explanation": diag::explain(id),
            }))?;
        }
        Format::Pretty => {
            // The explanation is the command output, so it goes to stdout.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{}: (no explanation available)", id);
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Exit with code 1 if any diagnostic is an error.
/// Warnings and info do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}

/// Return `arg`, or stdin when it is `-`.
fn read_status(arg: String) -> Result<String> {
    if arg != "-" {
        return Ok(arg);
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read status from stdin")?;
    Ok(buf)
}

/// Load tables from `path`, or the built-in standard tables.
fn load_tables(path: Option<&Path>) -> Result<ReferenceTables> {
    let Some(path) = path else {
        return Ok(ReferenceTables::standard());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read tables file '{}'", path.display()))?;
    let tables = ReferenceTables::from_json(&json)
        .with_context(|| format!("invalid tables file '{}'", path.display()))?;
    tracing::info!(
        path = %path.display(),
        teeth = tables.tooth_count(),
        findings = tables.findings.len(),
        "loaded reference tables"
    );
    Ok(tables)
}

/// Load the configuration file (if any) and apply command-line overrides.
fn load_config(
    path: Option<&Path>,
    grammar: Option<GrammarArg>,
    bridge_style: Option<BridgeStyleArg>,
) -> Result<ChartConfig> {
    let mut config = match path {
        Some(path) => ChartConfig::load(path)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        None => ChartConfig::default(),
    };
    if let Some(g) = grammar {
        config.grammar = g.into();
    }
    if let Some(s) = bridge_style {
        config.bridge_style = s.into();
    }
    Ok(config)
}
