use std::fs;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use pwf_core::{Diagnostics, SchemaRegistry, Severity};
use pwf_io::{
    case_title, default_registry, fold_shunts, parse, registry_from_json, render_dat, serialize,
};

mod cli;
use cli::{Cli, OutputFormat};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let bytes = fs::read(&cli.pwf_file)
        .with_context(|| format!("reading input file '{}'", cli.pwf_file.display()))?;
    let text = decode_text(bytes);

    let owned_registry;
    let registry: &SchemaRegistry = match &cli.mapping {
        Some(path) => {
            let spec = fs::read_to_string(path)
                .with_context(|| format!("reading mapping file '{}'", path.display()))?;
            owned_registry = registry_from_json(&spec)
                .with_context(|| format!("building registry from '{}'", path.display()))?;
            &owned_registry
        }
        None => default_registry(),
    };

    info!("parsing {}", cli.pwf_file.display());
    let outcome = parse(&text, registry);
    let mut diagnostics = outcome.diagnostics;
    let mut document = outcome.document;
    report(&diagnostics);
    info!(
        "parsed {} records across {} record types",
        document.record_count(),
        document.record_types().count()
    );

    if !cli.no_fold {
        let (folded, diag) = fold_shunts(&document);
        report(&diag);
        diagnostics.merge(diag);
        document = folded;
    }

    let rendered = match cli.format {
        OutputFormat::Json => {
            let mut root = match serde_json::to_value(&document).context("encoding document")? {
                serde_json::Value::Object(map) => map,
                _ => serde_json::Map::new(),
            };
            root.insert(
                "metadata".to_string(),
                json!({
                    "file_path": cli.pwf_file.display().to_string(),
                    "status": "parsed",
                    "title": case_title(&document),
                }),
            );
            let mut text = serde_json::to_string_pretty(&serde_json::Value::Object(root))?;
            text.push('\n');
            text
        }
        OutputFormat::Dat => render_dat(&document),
        OutputFormat::Pwf => {
            let rendered = serialize(&document, registry);
            report(&rendered.diagnostics);
            diagnostics.merge(rendered.diagnostics);
            rendered.text
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("writing output file '{}'", path.display()))?;
            info!("results saved to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    if cli.strict && diagnostics.has_errors() {
        bail!(
            "{} record(s) could not be processed",
            diagnostics.error_count()
        );
    }
    Ok(())
}

fn report(diagnostics: &Diagnostics) {
    for issue in &diagnostics.issues {
        let line = issue
            .line
            .map(|n| format!(" (line {n})"))
            .unwrap_or_default();
        match issue.severity {
            Severity::Warning => warn!("{}{line}: {}", issue.category, issue.message),
            Severity::Error => error!("{}{line}: {}", issue.category, issue.message),
        }
    }
}

/// Decode file bytes as UTF-8, falling back to Latin-1 for the legacy
/// encodings these files circulate in (every byte maps to one code point).
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
