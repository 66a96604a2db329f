//! Integration tests over complete case files.

use crate::mapping::default_registry;
use crate::parse::parse;
use crate::serialize::serialize;
use crate::{case_title, fold_shunts};

const NINE_BUS_SAMPLE: &str = "\
TITU
Sistema-Teste de 9 Barras - Caso Inicial
DOPC IMPR
99999
DBAR
(No )OETGb(   nome   )Gl( V)( A)( Pg)( Qg)( Qn)( Qm)(Bc  )( Pl)( Ql)( Sh)Are(Vf)
    1  2 A BAR-1 GER1  A1000  0.230.2 35.4-99999999.                       11000
    2  1 A BAR-2 GER2  A1000-8.4 100.24.48-99999999.                       11000
    3    E BAR-3       A 989-7.1                                           11000
99999
DLIN
(De )d O d(Pa )NcEP ( R% )( X% )(Mvar)(Tap)(Tmn)(Tmx)(Phs)(Bc  )(Cn)(Ce)Ns
    1         3 1           5.34         1.                      300 300
    2         4 1           7.68         1.                      230 230
99999
DGER
(No ) O (Pmn ) (Pmx ) ( Fp) (FpR) (FPn) (Fa) (Fr) (Ag) ( Xq) (Sno)
    1       0.   650.    0.  100.
    2       0.  1350.    0.  100.
99999
DCSC
    1  A     2 1 L F D      -9999.      9999.       0. X       0.     1   1
99999
DCER
    1 A 1  1     1      5.      0.   -100.    100. I L
99999
FIM
";

#[test]
fn parses_all_sections_of_the_nine_bus_sample() {
    let outcome = parse(NINE_BUS_SAMPLE, default_registry());

    assert_eq!(outcome.document.records("TITU").len(), 1);
    assert_eq!(outcome.document.records("DBAR").len(), 3);
    assert_eq!(outcome.document.records("DLIN").len(), 2);
    assert_eq!(outcome.document.records("DGER").len(), 2);
    assert_eq!(outcome.document.records("DCSC").len(), 1);
    assert_eq!(outcome.document.records("DCER").len(), 1);

    assert!(!outcome.diagnostics.has_errors());
    // One warning: the unsupported DOPC section.
    assert_eq!(outcome.diagnostics.warning_count(), 1);
    assert!(outcome.diagnostics.issues[0].message.contains("DOPC"));
}

#[test]
fn decodes_bus_fields_including_scaled_voltage() {
    let outcome = parse(NINE_BUS_SAMPLE, default_registry());
    let buses = outcome.document.records("DBAR");

    assert_eq!(buses[0].int("number"), Some(1));
    assert_eq!(buses[0].int("type"), Some(2));
    assert_eq!(buses[0].text("name"), Some("BAR-1 GER1"));
    assert_eq!(buses[0].float("voltage"), Some(1.0));
    assert_eq!(buses[0].float("active_generation"), Some(230.2));
    assert_eq!(buses[0].float("reactive_generation"), Some(35.4));
    assert_eq!(buses[0].float("min_reactive_generation"), Some(-9999.0));
    assert_eq!(buses[0].int("area"), Some(1));

    assert_eq!(buses[1].float("angle"), Some(-8.4));
    assert_eq!(buses[1].float("active_generation"), Some(100.0));
    assert_eq!(buses[1].float("reactive_generation"), Some(24.48));

    // Bus 3 leaves most columns blank: defaults apply.
    assert_eq!(buses[2].float("voltage"), Some(0.989));
    assert_eq!(buses[2].float("angle"), Some(-7.1));
    assert_eq!(buses[2].text("state"), Some("L"));
    assert_eq!(buses[2].float("active_generation"), Some(0.0));
    assert!(outcome.diagnostics.stats.defaulted_values > 0);
}

#[test]
fn every_declared_field_is_present_on_every_record() {
    let registry = default_registry();
    let outcome = parse(NINE_BUS_SAMPLE, registry);

    for (record_type, records) in outcome.document.sections() {
        let schema = registry.lookup(record_type).unwrap();
        for record in records {
            for spec in &schema.fields {
                assert!(
                    record.get(&spec.name).is_some(),
                    "{record_type} record is missing field '{}'",
                    spec.name
                );
            }
        }
    }
}

#[test]
fn decodes_line_generator_and_compensator_records() {
    let outcome = parse(NINE_BUS_SAMPLE, default_registry());

    let lines = outcome.document.records("DLIN");
    assert_eq!(lines[0].int("from_bus"), Some(1));
    assert_eq!(lines[0].int("to_bus"), Some(3));
    assert_eq!(lines[0].int("circuit"), Some(1));
    assert_eq!(lines[0].float("reactance"), Some(5.34));
    assert_eq!(lines[0].float("tap"), Some(1.0));
    assert_eq!(lines[0].float("normal_capacity"), Some(300.0));
    assert_eq!(lines[1].float("reactance"), Some(7.68));

    let gens = outcome.document.records("DGER");
    assert_eq!(gens[0].float("min_active_generation"), Some(0.0));
    assert_eq!(gens[0].float("max_active_generation"), Some(650.0));
    assert_eq!(gens[1].float("max_active_generation"), Some(1350.0));
    assert_eq!(gens[1].float("remote_participation_factor"), Some(100.0));

    let cscs = outcome.document.records("DCSC");
    assert_eq!(cscs[0].int("from_bus"), Some(1));
    assert_eq!(cscs[0].int("to_bus"), Some(2));
    assert_eq!(cscs[0].text("state"), Some("L"));
    assert_eq!(cscs[0].float("min_reactance"), Some(-9999.0));
    assert_eq!(cscs[0].float("max_reactance"), Some(9999.0));
    assert_eq!(cscs[0].text("control_mode"), Some("X"));
    assert_eq!(cscs[0].int("number_of_stages"), Some(1));

    let cers = outcome.document.records("DCER");
    assert_eq!(cers[0].int("bus"), Some(1));
    assert_eq!(cers[0].int("units"), Some(1));
    assert_eq!(cers[0].float("slope"), Some(5.0));
    assert_eq!(cers[0].float("min_reactive_generation"), Some(-100.0));
    assert_eq!(cers[0].float("max_reactive_generation"), Some(100.0));
    assert_eq!(cers[0].text("control_mode"), Some("I"));
}

#[test]
fn case_title_joins_titu_records() {
    let outcome = parse(NINE_BUS_SAMPLE, default_registry());
    assert_eq!(
        case_title(&outcome.document).as_deref(),
        Some("Sistema-Teste de 9 Barras - Caso Inicial")
    );
}

#[test]
fn round_trip_preserves_decoded_values() {
    let registry = default_registry();
    let first = parse(NINE_BUS_SAMPLE, registry);
    let rendered = serialize(&first.document, registry);
    assert!(!rendered.diagnostics.has_errors());

    let second = parse(&rendered.text, registry);
    assert!(!second.diagnostics.has_errors());
    assert_eq!(second.document, first.document);

    // Canonical rendering is a fixed point.
    let rendered_again = serialize(&second.document, registry);
    assert_eq!(rendered_again.text, rendered.text);
}

#[test]
fn bad_enumerated_code_skips_only_that_record() {
    let text = "\
DCER
    7 A 1  1     1      5.      0.   -100.    100. Z L
    8 A 1  1     1      5.      0.   -100.    100. I L
99999
FIM
";
    let outcome = parse(text, default_registry());
    let cers = outcome.document.records("DCER");
    assert_eq!(cers.len(), 1);
    assert_eq!(cers[0].int("bus"), Some(8));
    assert_eq!(outcome.diagnostics.error_count(), 1);
    assert_eq!(outcome.diagnostics.stats.skipped_records, 1);
    assert!(outcome.diagnostics.issues[0].message.contains("control_mode"));
}

#[test]
fn truncated_shunt_bank_group_is_reported_and_omitted() {
    let text = "\
DBAR
   10
   20
99999
DBSH
   10
 1    L       2    50.
FBAN
   20
 1    L       1    25.
99999
DSHL
   10       20 1    20.   10.
99999
DCAR
BARR    10
99999
FIM
";
    let outcome = parse(text, default_registry());

    // Well-formed sections are all present.
    assert_eq!(outcome.document.records("DBAR").len(), 2);
    assert_eq!(outcome.document.records("DSHL").len(), 1);
    assert_eq!(outcome.document.records("DCAR").len(), 1);
    assert_eq!(
        outcome.document.records("DCAR")[0].text("set_type_1"),
        Some("BARR")
    );

    // The second shunt record never saw its FBAN: assembly error, omitted.
    let shunts = outcome.document.records("DBSH");
    assert_eq!(shunts.len(), 1);
    assert_eq!(shunts[0].int("from_bus"), Some(10));
    assert_eq!(outcome.diagnostics.error_count(), 1);
    assert!(outcome.diagnostics.issues.iter().any(|i| {
        i.category == "assembly" && i.message.contains("never terminated")
    }));
}

#[test]
fn shunt_folding_composes_with_parse() {
    let text = "\
DBAR
   10
99999
DBSH
   10
 1    L       2    50.
FBAN
99999
FIM
";
    let outcome = parse(text, default_registry());
    let (folded, diag) = fold_shunts(&outcome.document);
    assert!(!diag.has_issues());
    assert_eq!(
        folded.records("DBAR")[0].float("capacitor_reactor"),
        Some(100.0)
    );
    // Bank sub-groups are retained on the record itself.
    let banks = folded.records("DBSH")[0].list("banks").unwrap();
    assert_eq!(banks.len(), 1);
}

#[test]
fn document_serializes_to_ordered_json() {
    let outcome = parse(NINE_BUS_SAMPLE, default_registry());
    let json = serde_json::to_value(&outcome.document).unwrap();

    let buses = json.get("DBAR").and_then(|v| v.as_array()).unwrap();
    assert_eq!(buses.len(), 3);
    assert_eq!(buses[0].get("number").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(buses[0].get("name").and_then(|v| v.as_str()), Some("BAR-1 GER1"));
    assert_eq!(
        buses[2].get("voltage").and_then(|v| v.as_f64()),
        Some(0.989)
    );
}
