//! AMPL-style DAT rendering of a parsed document.
//!
//! Writes AMPL optimization-model data tables:
//! system base power, bus, circuit, generator and compensator tables, with
//! per-unit conversions applied (voltages already decode to pu; percent
//! impedances divide by 100; Mvar charging divides by the base power).
//! Disconnected elements (state other than `L`) are excluded.

use std::fmt::Write as _;

use pwf_core::constants::{BASE_POWER_MVA, DEFAULT_VMAX, DEFAULT_VMIN};
use pwf_core::{NetworkDocument, Record};

/// Render the document as an AMPL data file.
pub fn render_dat(document: &NetworkDocument) -> String {
    let mut out = String::new();

    out.push_str("# ANAREDE network data\n");
    if let Some(title) = case_title(document) {
        let _ = writeln!(out, "# {title}");
    }
    let _ = writeln!(out, "param BASE := {BASE_POWER_MVA:.0};");
    out.push('\n');

    render_buses(&mut out, document);
    render_circuits(&mut out, document);
    render_generators(&mut out, document);
    render_series_compensators(&mut out, document);
    render_reactive_compensators(&mut out, document);

    out
}

/// Joined TITU lines, if the case carried a title.
pub fn case_title(document: &NetworkDocument) -> Option<String> {
    let titles: Vec<&str> = document
        .records("TITU")
        .iter()
        .filter_map(|r| r.text("title"))
        .filter(|t| !t.is_empty())
        .collect();
    (!titles.is_empty()).then(|| titles.join(" "))
}

fn is_connected(record: &Record) -> bool {
    record.text("state").unwrap_or("L") == "L"
}

fn render_buses(out: &mut String, document: &NetworkDocument) {
    out.push_str(
        "param: DBAR: type voltage angle p_gen q_gen p_load q_load shunt area vmin vmax :=\n",
    );
    for bus in document.records("DBAR").iter().filter(|r| is_connected(r)) {
        let _ = writeln!(
            out,
            "{:>5} {:>2} {:.3} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>3} {:.3} {:.3}",
            bus.int("number").unwrap_or(0),
            bus.int("type").unwrap_or(0),
            bus.float("voltage").unwrap_or(1.0),
            bus.float("angle").unwrap_or(0.0),
            bus.float("active_generation").unwrap_or(0.0),
            bus.float("reactive_generation").unwrap_or(0.0),
            bus.float("active_load").unwrap_or(0.0),
            bus.float("reactive_load").unwrap_or(0.0),
            bus.float("capacitor_reactor").unwrap_or(0.0),
            bus.int("area").unwrap_or(1),
            DEFAULT_VMIN,
            DEFAULT_VMAX,
        );
    }
    out.push_str(";\n\n");
}

fn render_circuits(out: &mut String, document: &NetworkDocument) {
    out.push_str("param: DLIN: resistance reactance susceptance tap capacity :=\n");
    for line in document.records("DLIN").iter().filter(|r| is_connected(r)) {
        let _ = writeln!(
            out,
            "{:>5} {:>5} {:>2} {:.6} {:.6} {:.6} {:.3} {:>8.2}",
            line.int("from_bus").unwrap_or(0),
            line.int("to_bus").unwrap_or(0),
            line.int("circuit").unwrap_or(1),
            line.float("resistance").unwrap_or(0.0) / 100.0,
            line.float("reactance").unwrap_or(0.0) / 100.0,
            line.float("susceptance").unwrap_or(0.0) / BASE_POWER_MVA,
            line.float("tap").unwrap_or(1.0),
            line.float("normal_capacity").unwrap_or(0.0),
        );
    }
    out.push_str(";\n\n");
}

fn render_generators(out: &mut String, document: &NetworkDocument) {
    out.push_str("param: DGER: p_min p_max participation :=\n");
    for gen in document.records("DGER").iter() {
        let _ = writeln!(
            out,
            "{:>5} {:>8.2} {:>8.2} {:>6.2}",
            gen.int("number").unwrap_or(0),
            gen.float("min_active_generation").unwrap_or(0.0),
            gen.float("max_active_generation").unwrap_or(0.0),
            gen.float("participation_factor").unwrap_or(0.0),
        );
    }
    out.push_str(";\n\n");
}

fn render_series_compensators(out: &mut String, document: &NetworkDocument) {
    out.push_str("param: DCSC: min_reactance max_reactance control_mode :=\n");
    for csc in document.records("DCSC").iter().filter(|r| is_connected(r)) {
        let _ = writeln!(
            out,
            "{:>5} {:>5} {:>2} {:>10.2} {:>10.2} {}",
            csc.int("from_bus").unwrap_or(0),
            csc.int("to_bus").unwrap_or(0),
            csc.int("circuit").unwrap_or(1),
            csc.float("min_reactance").unwrap_or(0.0),
            csc.float("max_reactance").unwrap_or(0.0),
            csc.text("control_mode").unwrap_or("X"),
        );
    }
    out.push_str(";\n\n");
}

fn render_reactive_compensators(out: &mut String, document: &NetworkDocument) {
    out.push_str("param: DCER: units slope q_min q_max :=\n");
    for cer in document.records("DCER").iter().filter(|r| is_connected(r)) {
        let _ = writeln!(
            out,
            "{:>5} {:>3} {:>8.3} {:>8.2} {:>8.2}",
            cer.int("bus").unwrap_or(0),
            cer.int("units").unwrap_or(1),
            cer.float("slope").unwrap_or(0.0),
            cer.float("min_reactive_generation").unwrap_or(0.0),
            cer.float("max_reactive_generation").unwrap_or(0.0),
        );
    }
    out.push_str(";\n");
}
