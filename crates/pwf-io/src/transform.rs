//! Post-parse document transforms.
//!
//! `fold_shunts` applies the usual load-flow preprocessing of shunt devices:
//! DBSH bank totals and DSHL circuit shunts are added onto the referenced
//! bus's `capacitor_reactor` field. Records are immutable, so the transform
//! produces a new document; unmatched buses or circuits produce warnings and
//! the offending device is ignored.

use std::collections::HashMap;

use pwf_core::{Diagnostics, FieldMap, NetworkDocument, Record, Value};

/// Fold DBSH and DSHL shunt contributions into DBAR `capacitor_reactor`.
pub fn fold_shunts(document: &NetworkDocument) -> (NetworkDocument, Diagnostics) {
    let mut diag = Diagnostics::new();
    let mut additions: HashMap<i64, f64> = HashMap::new();

    fold_shunt_banks(document, &mut additions, &mut diag);
    fold_circuit_shunts(document, &mut additions, &mut diag);

    let mut out = NetworkDocument::new();
    for (record_type, records) in document.sections() {
        for record in records {
            if record_type == "DBAR" {
                let number = record.int("number").unwrap_or(0);
                if let Some(delta) = additions.get(&number).filter(|d| **d != 0.0) {
                    let current = record.float("capacitor_reactor").unwrap_or(0.0);
                    out.push(record.with_field("capacitor_reactor", Value::Float(current + delta)));
                    continue;
                }
            }
            out.push(record.clone());
        }
    }

    (out, diag)
}

fn fold_shunt_banks(
    document: &NetworkDocument,
    additions: &mut HashMap<i64, f64>,
    diag: &mut Diagnostics,
) {
    for (idx, record) in document.records("DBSH").iter().enumerate() {
        let from_bus = record.int("from_bus").unwrap_or(0);
        let terminal = match record.int("terminal_bus") {
            Some(bus) if bus != 0 => bus,
            _ => from_bus,
        };

        if !bus_exists(document, terminal) {
            diag.add_warning_with_record(
                "transform",
                format!("shunt bank record {} references unknown bus {terminal}", idx + 1),
                "DBSH",
            );
            continue;
        }

        *additions.entry(terminal).or_insert(0.0) += bank_total(record);
    }
}

/// Connected banks contribute units × unit reactive power.
fn bank_total(record: &Record) -> f64 {
    record
        .list("banks")
        .unwrap_or(&[])
        .iter()
        .filter(|bank| is_connected(bank, "state"))
        .map(|bank| {
            let units = bank.get("units_in_operation").and_then(Value::as_int).unwrap_or(1);
            let power = bank
                .get("unit_reactive_power")
                .and_then(Value::as_float)
                .unwrap_or(0.0);
            units as f64 * power
        })
        .sum()
}

fn fold_circuit_shunts(
    document: &NetworkDocument,
    additions: &mut HashMap<i64, f64>,
    diag: &mut Diagnostics,
) {
    for (idx, record) in document.records("DSHL").iter().enumerate() {
        let from_bus = record.int("from_bus").unwrap_or(0);
        let to_bus = record.int("to_bus").unwrap_or(0);

        let circuit = document.records("DLIN").iter().find(|line| {
            let de = line.int("from_bus").unwrap_or(0);
            let pa = line.int("to_bus").unwrap_or(0);
            (de == from_bus && pa == to_bus) || (de == to_bus && pa == from_bus)
        });
        let Some(circuit) = circuit else {
            diag.add_warning_with_record(
                "transform",
                format!("no circuit {from_bus}-{to_bus} for shunt device {}", idx + 1),
                "DSHL",
            );
            continue;
        };
        if circuit.text("state") != Some("L") {
            continue;
        }

        for (bus, shunt_field, state_field) in [
            (from_bus, "shunt_from", "state_from"),
            (to_bus, "shunt_to", "state_to"),
        ] {
            if record.text(state_field) != Some("L") {
                continue;
            }
            if !bus_exists(document, bus) {
                diag.add_warning_with_record(
                    "transform",
                    format!("shunt device {} references unknown bus {bus}", idx + 1),
                    "DSHL",
                );
                continue;
            }
            *additions.entry(bus).or_insert(0.0) += record.float(shunt_field).unwrap_or(0.0);
        }
    }
}

fn bus_exists(document: &NetworkDocument, number: i64) -> bool {
    document
        .records("DBAR")
        .iter()
        .any(|bus| bus.int("number") == Some(number))
}

fn is_connected(fields: &FieldMap, state_field: &str) -> bool {
    fields.get(state_field).and_then(Value::as_str) == Some("L")
}
