use serde_json::json;

use super::*;

fn cost_rule() -> Value {
    json!({
        "name": "Costo alto",
        "target_table": "provider",
        "condition_field": "cost_usd",
        "threshold": 5000,
        "comparison": ">",
        "message": "El costo superó el límite",
    })
}

#[test]
fn full_rule_gets_defaults() {
    let rule = validate_rule(&cost_rule()).unwrap();
    assert_eq!(rule.target_table, TargetTable::Provider);
    assert_eq!(rule.rule_type, "alert");
    assert!(rule.active);
    assert!((rule.threshold - 5000.0).abs() < f64::EPSILON);
}

#[test]
fn serialized_rule_uses_backend_names() {
    let mut raw = cost_rule();
    raw["type"] = json!("warning");
    raw["unexpected"] = json!(true);
    let json = serde_json::to_value(validate_rule(&raw).unwrap()).unwrap();
    assert_eq!(json["type"], "warning");
    assert_eq!(json["target_table"], "provider");
    assert!(json.get("unexpected").is_none());
}

#[test]
fn field_must_belong_to_table() {
    let mut raw = cost_rule();
    raw["target_table"] = json!("entorno");
    assert_eq!(
        validate_rule(&raw),
        Err(RuleError::FieldNotInTable { table: "entorno", field: "cost_usd".into() })
    );

    raw["target_table"] = json!("evc_q");
    raw["condition_field"] = json!("allocated_percentage");
    assert!(validate_rule(&raw).is_ok());
}

#[test]
fn every_table_accepts_its_own_fields() {
    for table in TargetTable::ALL {
        for field in table.fields() {
            let mut raw = cost_rule();
            raw["target_table"] = json!(table.as_str());
            raw["condition_field"] = json!(field);
            assert!(validate_rule(&raw).is_ok(), "{} / {field}", table.as_str());
        }
    }
}

#[test]
fn rejects_unknown_values() {
    let mut raw = cost_rule();
    raw["target_table"] = json!("users");
    assert_eq!(validate_rule(&raw), Err(RuleError::UnknownTable("users".into())));

    let mut raw = cost_rule();
    raw["comparison"] = json!("!=");
    assert_eq!(validate_rule(&raw), Err(RuleError::UnknownComparison("!=".into())));

    let mut raw = cost_rule();
    raw["type"] = json!("critical");
    assert_eq!(validate_rule(&raw), Err(RuleError::UnknownType("critical".into())));

    let mut raw = cost_rule();
    raw["threshold"] = json!("mucho");
    assert_eq!(validate_rule(&raw), Err(RuleError::BadThreshold));
}

#[test]
fn missing_fields_are_named() {
    let mut raw = cost_rule();
    raw["message"] = json!("  ");
    assert_eq!(validate_rule(&raw), Err(RuleError::Missing("message")));
    assert_eq!(validate_rule(&raw).unwrap_err().to_string(), "El campo message es requerido");
    assert_eq!(validate_rule(&json!([])), Err(RuleError::Malformed));
}

#[test]
fn threshold_accepts_numeric_string() {
    let mut raw = cost_rule();
    raw["threshold"] = json!("12.5");
    assert!((validate_rule(&raw).unwrap().threshold - 12.5).abs() < f64::EPSILON);
}

#[test]
fn patch_checks_only_present_keys() {
    assert!(validate_patch(&json!({"active": false})).is_ok());
    assert!(validate_patch(&json!({"condition_field": "anything"})).is_ok());
    assert_eq!(
        validate_patch(&json!({"target_table": "evc", "condition_field": "country"})),
        Err(RuleError::FieldNotInTable { table: "evc", field: "country".into() })
    );
    assert_eq!(validate_patch(&json!({"comparison": "=<"})), Err(RuleError::UnknownComparison("=<".into())));
}

#[test]
fn bulk_requires_array_and_stops_at_first_bad_rule() {
    let rules = validate_bulk(&json!([cost_rule(), cost_rule()])).unwrap();
    assert_eq!(rules.len(), 2);

    let mut bad = cost_rule();
    bad["type"] = json!("nope");
    assert_eq!(validate_bulk(&json!([cost_rule(), bad])), Err(RuleError::UnknownType("nope".into())));
    assert_eq!(validate_bulk(&cost_rule()), Err(RuleError::Malformed));
}
