use chrono::NaiveDate;
use corep_assistant::*;
use serde_json::{json, Number, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn manifest_path(relative: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn reporting_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
}

fn ca1_schema() -> TemplateSchema {
    load_template_schema(&manifest_path("data/template_schema.json")).unwrap()
}

fn untagged_regulations() -> Vec<RegulationSection> {
    serde_json::from_value(json!([
        {"id": "LIQ", "title": "Liquidity", "text": "Liquidity buffer of liquid assets."},
        {"id": "T2", "title": "Tier 2", "text": "Tier 2 items consist of subordinated loans."},
        {"id": "LEV", "title": "Leverage", "text": "Leverage exposure measure."}
    ]))
    .unwrap()
}

fn full_scenario() -> Scenario {
    serde_json::from_value(json!({
        "entity_id": "XYZ-9",
        "cet1_gbp_thousands": 100,
        "at1_gbp_thousands": 20,
        "t2_gbp_thousands": 5
    }))
    .unwrap()
}

fn run(
    regulations: &[RegulationSection],
    scenario: &Scenario,
    question: &str,
) -> Report {
    let schema = ca1_schema();
    let mapping = MappingTable::corep_ca1();
    ReportingAssistant::new(regulations, &schema, &mapping).process(&ReportRequest {
        question,
        scenario,
        retrieval_limit: DEFAULT_RETRIEVAL_LIMIT,
        fallback_reporting_date: reporting_date(),
    })
}

#[test]
fn test_single_matching_section_and_consistent_totals() {
    let regulations = untagged_regulations();
    let report = run(&regulations, &full_scenario(), "what about subordinated loans");

    assert_eq!(report.section_audit.len(), 1);
    assert_eq!(
        report.section_audit.entries().get("T2").map(String::as_str),
        Some("Tier 2: Tier 2 items consist of subordinated loans.")
    );
    assert_eq!(report.structured.count_flags(ValidationFlag::TotalMismatch), 0);
    assert_eq!(
        report.structured.field("CA1.060").unwrap().value,
        Some(Number::from(125))
    );
}

#[test]
fn test_missing_tier2_flags_total() {
    let mut scenario = Scenario::default();
    scenario.insert("cet1_gbp_thousands", json!(100));
    scenario.insert("at1_gbp_thousands", json!(20));

    let report = run(&untagged_regulations(), &scenario, "own funds");
    let total = report.structured.field("CA1.060").unwrap();

    assert_eq!(total.value, None);
    assert_eq!(
        total.validation_flags,
        vec![
            ValidationFlag::MissingRequiredValue,
            ValidationFlag::TotalUnavailable
        ]
    );
    let t2 = report.structured.field("CA1.030").unwrap();
    assert!(t2.validation_flags.is_empty());
}

#[test]
fn test_field_order_and_audit_log_follow_schema() {
    let report = run(&untagged_regulations(), &full_scenario(), "");
    let codes: Vec<&str> = report
        .structured
        .fields
        .iter()
        .map(|f| f.field_code.as_str())
        .collect();
    assert_eq!(codes, vec!["CA1.010", "CA1.020", "CA1.030", "CA1.060"]);
    assert_eq!(
        report.structured.audit_log.keys().collect::<Vec<_>>(),
        codes
    );
    for field in &report.structured.fields {
        assert_eq!(field.units, "GBP");
        assert_eq!(report.structured.audit_log.get(&field.field_code), Some(&field.rule_refs));
    }
}

#[test]
fn test_custom_mapping_table_with_float_components() {
    let schema: TemplateSchema = serde_json::from_value(json!({
        "template_id": "XX",
        "template_name": "Custom",
        "currency": "EUR",
        "fields": [
            {"field_code": "A", "line": "1", "label": "A"},
            {"field_code": "B", "line": "2", "label": "B"},
            {"field_code": "T", "line": "3", "label": "Total", "required": true}
        ]
    }))
    .unwrap();
    let mapping = parse_mapping_table(
        "inline",
        r#"{"template_id": "XX", "fields": [
            {"field_code": "A", "source": "scenario", "scenario_key": "a"},
            {"field_code": "B", "source": "scenario", "scenario_key": "b"},
            {"field_code": "T", "source": "total", "components": ["A", "B"], "rule_refs": ["R"]}
        ]}"#,
    )
    .unwrap();
    let scenario: Scenario = serde_json::from_value(json!({"a": 1.5, "b": 2})).unwrap();

    let report = ReportingAssistant::new(&[], &schema, &mapping).process(&ReportRequest {
        question: "anything",
        scenario: &scenario,
        retrieval_limit: 5,
        fallback_reporting_date: reporting_date(),
    });

    let total = report.structured.field("T").unwrap();
    assert_eq!(total.value.as_ref().and_then(Number::as_f64), Some(3.5));
    assert!(total.validation_flags.is_empty());
    assert_eq!(total.units, "EUR");
    assert!(report.section_audit.is_empty());
}

#[test]
fn test_artifacts_written_and_round_trip() {
    let regulations = load_regulations(&manifest_path("data/regulations.json")).unwrap();
    let scenario = load_scenario(&manifest_path("data/scenario_example.json")).unwrap();
    let report = run(&regulations, &scenario, "How is total own funds calculated for CA1?");

    let tmp = TempDir::new().unwrap();
    let artifacts = render_all(&report.structured, &report.section_audit).unwrap();
    let paths = write_artifacts(tmp.path(), &artifacts).unwrap();

    let structured: StructuredOutput =
        serde_json::from_str(&fs::read_to_string(&paths.structured).unwrap()).unwrap();
    assert_eq!(structured, report.structured);
    assert_eq!(structured.entity_id, "GB-BANK-0042");
    assert_eq!(structured.reporting_date, "2024-12-31");

    let markdown = fs::read_to_string(&paths.template).unwrap();
    assert!(markdown.starts_with("# COREP CA1 - Own Funds"));
    assert!(markdown.contains("| 060 | Total own funds | 1,750,000 | GBP |  | PRA_OF_001, EBA_CA1_001 |"));

    let audit: Value = serde_json::from_str(&fs::read_to_string(&paths.audit).unwrap()).unwrap();
    let audit = audit.as_object().unwrap();
    assert!(!audit.is_empty() && audit.len() <= DEFAULT_RETRIEVAL_LIMIT);
    assert!(audit.contains_key("PRA_OF_001"));
    assert!(!audit.contains_key("PRA_LIQ_001"));
}

#[test]
fn test_identical_inputs_give_identical_artifacts() {
    let regulations = load_regulations(&manifest_path("data/regulations.json")).unwrap();
    let scenario = load_scenario(&manifest_path("data/scenario_example.json")).unwrap();

    let first = run(&regulations, &scenario, "tier 2 capital");
    let second = run(&regulations, &scenario, "tier 2 capital");

    assert_eq!(
        render_all(&first.structured, &first.section_audit).unwrap(),
        render_all(&second.structured, &second.section_audit).unwrap()
    );
}
