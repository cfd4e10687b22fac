use serde_json::json;

use super::*;

fn catalog() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Ana Torres", "role": "Backend", "company": "Acme", "country": "Colombia",
               "category": "Talento", "line": "Pagos", "email": "ana@acme.co", "cost_usd": 40.0}),
        json!({"id": 2, "name": "Luis Pérez", "role": "Frontend", "company": "Globant", "country": "México",
               "category": "Talento", "line": "Core", "email": "luis@globant.com", "cost_usd": "55.5"}),
        json!({"id": 3, "name": "Servicios Cloud", "company": "AWS", "country": "USA",
               "category": "Infraestructura", "email": "billing@aws.com"}),
    ]
}

fn ids(providers: &[Value]) -> Vec<i64> {
    providers.iter().filter_map(|p| p["id"].as_i64()).collect()
}

#[test]
fn empty_filter_keeps_everything() {
    assert_eq!(ids(&ProviderFilter::default().apply(catalog())), vec![1, 2, 3]);
}

#[test]
fn text_match_is_case_insensitive_substring() {
    let filter = ProviderFilter { company: "GLOB".into(), ..ProviderFilter::default() };
    assert_eq!(ids(&filter.apply(catalog())), vec![2]);

    let filter = ProviderFilter { category: "talento".into(), line: "pa".into(), ..ProviderFilter::default() };
    assert_eq!(ids(&filter.apply(catalog())), vec![1]);
}

#[test]
fn missing_field_only_matches_blank_filter() {
    let filter = ProviderFilter { role: "end".into(), ..ProviderFilter::default() };
    assert_eq!(ids(&filter.apply(catalog())), vec![1, 2]);
}

#[test]
fn cost_bounds_accept_numbers_and_numeric_strings() {
    let filter = ProviderFilter { cost_usd_min: Some("50".into()), ..ProviderFilter::default() };
    assert_eq!(ids(&filter.apply(catalog())), vec![2, 3]);

    let filter = ProviderFilter { cost_usd_max: Some("50".into()), ..ProviderFilter::default() };
    assert_eq!(ids(&filter.apply(catalog())), vec![1, 3]);
}

#[test]
fn unparseable_bounds_are_ignored() {
    let filter = ProviderFilter {
        cost_usd_min: Some("abc".into()),
        cost_usd_max: Some(String::new()),
        ..ProviderFilter::default()
    };
    assert_eq!(ids(&filter.apply(catalog())), vec![1, 2, 3]);
}

#[test]
fn filter_reads_query_string_names() {
    let filter: ProviderFilter =
        serde_json::from_value(json!({"country": "col", "cost_usd_min": "10", "cost_usd_max": "45"})).unwrap();
    assert_eq!(ids(&filter.apply(catalog())), vec![1]);
}

// =============================================================================
// bulk upload
// =============================================================================

fn sheet_row_json(name: &str, cost: Value) -> Value {
    json!({"Nombre": name, "Rol": "QA", "Proveedor": "Acme", "País": "Perú",
           "Costo USD": cost, "Categoría": "Talento", "Línea": "", "Correo": "qa@acme.co"})
}

#[test]
fn bulk_records_pass_through() {
    let rows = vec![json!({"name": "Ana", "cost_usd": 10})];
    assert_eq!(normalize_bulk(rows.clone()).unwrap(), rows);
}

#[test]
fn bulk_sheet_rows_are_mapped() {
    let mapped = normalize_bulk(vec![sheet_row_json("Eva", json!(30)), sheet_row_json("Leo", Value::Null)]).unwrap();
    assert_eq!(mapped[0]["name"], "Eva");
    assert_eq!(mapped[0]["company"], "Acme");
    assert_eq!(mapped[0]["country"], "Perú");
    assert_eq!(mapped[0]["cost_usd"], 30);
    assert_eq!(mapped[0]["line"], "");
    assert_eq!(mapped[1]["cost_usd"], 0);
    assert!(mapped[0].get("Nombre").is_none());
}

#[test]
fn bulk_sheet_missing_columns_are_listed() {
    let mut row = sheet_row_json("Eva", json!(30));
    row.as_object_mut().unwrap().remove("Correo");
    row.as_object_mut().unwrap().remove("Rol");
    let err = normalize_bulk(vec![row]).unwrap_err();
    assert_eq!(err, BulkError::MissingColumns(vec!["Rol", "Correo"]));
    assert_eq!(err.to_string(), "El archivo Excel no tiene las siguientes columnas requeridas: Rol, Correo");
}

#[test]
fn bulk_rejects_empty_and_non_objects() {
    assert_eq!(normalize_bulk(Vec::new()), Err(BulkError::Empty));
    assert_eq!(normalize_bulk(vec![json!("x")]), Err(BulkError::NotAnObject));
}
