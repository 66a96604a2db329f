use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Parse ANAREDE (PWF) power system files", long_about = None)]
pub struct Cli {
    /// Path to the PWF/ANAREDE file to parse
    pub pwf_file: PathBuf,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Mapping specification JSON overriding the built-in ANAREDE mapping
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Keep records as parsed (skip folding shunt devices into bus data)
    #[arg(long)]
    pub no_fold: bool,

    /// Exit non-zero when any record had to be discarded
    #[arg(long)]
    pub strict: bool,

    /// Run with additional verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Parsed records as a JSON object keyed by record type
    Json,
    /// AMPL-style optimization data tables
    Dat,
    /// Canonical fixed-width PWF rendering
    Pwf,
}
