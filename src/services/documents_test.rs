use serde_json::json;

use super::*;

fn doc(id: usize, file: &str, provider: Option<&str>, uploaded: &str) -> Value {
    let provider = provider.map(|name| json!({"id": 1, "name": name}));
    json!({"id": id, "file_name": file, "provider": provider, "uploaded_at": uploaded})
}

fn many(n: usize) -> Vec<Value> {
    (1..=n).map(|i| doc(i, &format!("doc-{i}.pdf"), Some("Acme"), "2025-01-01T00:00:00")).collect()
}

#[test]
fn filter_by_file_name_ignores_case() {
    let docs = vec![
        doc(1, "Contrato.PDF", Some("Acme"), "2025-01-02T10:00:00"),
        doc(2, "factura.pdf", Some("Globant"), "2025-02-03T10:00:00"),
    ];
    let hits = filter(docs, DocumentField::FileName, "contrato");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], 1);
}

#[test]
fn filter_by_provider_name_handles_missing_provider() {
    let docs = vec![doc(1, "a.pdf", None, "2025-01-02T10:00:00"), doc(2, "b.pdf", Some("Globant"), "2025-02-03")];
    let hits = filter(docs, DocumentField::ProviderName, "GLOB");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], 2);
}

#[test]
fn filter_by_upload_date_uses_day_part() {
    let docs = vec![doc(1, "a.pdf", None, "2025-01-02T10:00:00"), doc(2, "b.pdf", None, "2025-02-03T10:00:00")];
    assert_eq!(filter(docs.clone(), DocumentField::UploadedAt, "2025-02").len(), 1);
    assert!(filter(docs, DocumentField::UploadedAt, "10:00").is_empty());
}

#[test]
fn blank_needle_keeps_all() {
    assert_eq!(filter(many(3), DocumentField::FileName, "  ").len(), 3);
}

#[test]
fn pagination_splits_into_tens() {
    let page = paginate(many(23), 3);
    assert_eq!(page.total, 23);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[0]["id"], 21);
}

#[test]
fn page_zero_and_past_end() {
    assert_eq!(paginate(many(5), 0).page, 1);
    let past = paginate(many(5), 4);
    assert!(past.items.is_empty());
    assert_eq!(past.total_pages, 1);
    assert_eq!(paginate(Vec::new(), 1).total_pages, 0);
}

#[test]
fn query_decodes_snake_case_field() {
    let query: DocumentQuery = serde_json::from_value(json!({"field": "provider_name", "q": "acme", "page": 2})).unwrap();
    assert_eq!(query.field, DocumentField::ProviderName);
    let page = list(many(15), &query);
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 5);
}

#[test]
fn huge_page_number_is_an_empty_page() {
    let page = paginate(many(5), usize::MAX);
    assert!(page.items.is_empty());
    assert_eq!(page.page, usize::MAX);
    assert_eq!(page.total, 5);
}
