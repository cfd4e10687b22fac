//! Provider document listing: filter by one column, then paginate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentField {
    #[default]
    FileName,
    ProviderName,
    /// Matched against the `YYYY-MM-DD` part of the upload timestamp.
    UploadedAt,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentQuery {
    #[serde(default)]
    pub field: DocumentField,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPage {
    pub items: Vec<Value>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

fn column(document: &Value, field: DocumentField) -> String {
    match field {
        DocumentField::FileName => document.get("file_name").and_then(Value::as_str).unwrap_or("").to_lowercase(),
        DocumentField::ProviderName => document
            .get("provider")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase(),
        DocumentField::UploadedAt => document
            .get("uploaded_at")
            .and_then(Value::as_str)
            .map(|ts| ts.get(..10).unwrap_or(ts).to_string())
            .unwrap_or_default(),
    }
}

/// Case-insensitive substring filter on one column. An empty needle keeps all.
#[must_use]
pub fn filter(documents: Vec<Value>, field: DocumentField, needle: &str) -> Vec<Value> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return documents;
    }
    documents
        .into_iter()
        .filter(|doc| column(doc, field).contains(&needle))
        .collect()
}

/// One-based page of `PAGE_SIZE` items. Page 0 reads as page 1; a page past
/// the end, however large, is empty.
#[must_use]
pub fn paginate(documents: Vec<Value>, page: usize) -> DocumentPage {
    let page = page.max(1);
    let total = documents.len();
    let items = documents
        .into_iter()
        .skip((page - 1).saturating_mul(PAGE_SIZE))
        .take(PAGE_SIZE)
        .collect();
    DocumentPage { items, page, per_page: PAGE_SIZE, total, total_pages: total.div_ceil(PAGE_SIZE) }
}

#[must_use]
pub fn list(documents: Vec<Value>, query: &DocumentQuery) -> DocumentPage {
    paginate(filter(documents, query.field, &query.q), query.page.unwrap_or(1))
}

#[cfg(test)]
#[path = "documents_test.rs"]
mod tests;
