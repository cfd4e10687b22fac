//! Provider list filtering and bulk-upload row mapping.
//!
//! Providers pass through as raw JSON; only the filtered text fields and
//! `cost_usd` are read.

use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Text fields matched by case-insensitive substring, in column order.
pub const TEXT_FIELDS: [&str; 7] = ["name", "role", "company", "country", "category", "line", "email"];

/// Query-string filter. Blank text filters match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub line: String,
    #[serde(default)]
    pub email: String,
    /// Kept as text; an unparseable bound is ignored.
    #[serde(default)]
    pub cost_usd_min: Option<String>,
    #[serde(default)]
    pub cost_usd_max: Option<String>,
}

impl ProviderFilter {
    fn needle(&self, field: &str) -> &str {
        match field {
            "name" => &self.name,
            "role" => &self.role,
            "company" => &self.company,
            "country" => &self.country,
            "category" => &self.category,
            "line" => &self.line,
            "email" => &self.email,
            _ => "",
        }
    }

    #[must_use]
    pub fn matches(&self, provider: &Value) -> bool {
        let text_ok = TEXT_FIELDS.iter().all(|field| {
            let needle = self.needle(field);
            needle.is_empty() || text_field(provider, field).to_lowercase().contains(&needle.to_lowercase())
        });
        if !text_ok {
            return false;
        }

        // A provider without a readable cost is never excluded by the bounds.
        let Some(cost) = provider.get("cost_usd").and_then(number_like) else {
            return true;
        };
        if let Some(min) = parse_bound(self.cost_usd_min.as_deref()) {
            if cost < min {
                return false;
            }
        }
        if let Some(max) = parse_bound(self.cost_usd_max.as_deref()) {
            if cost > max {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn apply(&self, providers: Vec<Value>) -> Vec<Value> {
        providers.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Missing or non-string fields read as empty.
fn text_field<'a>(provider: &'a Value, field: &str) -> &'a str {
    provider.get(field).and_then(Value::as_str).unwrap_or("")
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_bound(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

// =============================================================================
// BULK UPLOAD
// =============================================================================

/// Spreadsheet header → provider field, in sheet order.
pub const SHEET_COLUMNS: [(&str, &str); 8] = [
    ("Nombre", "name"),
    ("Rol", "role"),
    ("Proveedor", "company"),
    ("País", "country"),
    ("Costo USD", "cost_usd"),
    ("Categoría", "category"),
    ("Línea", "line"),
    ("Correo", "email"),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BulkError {
    #[error("No hay proveedores para cargar")]
    Empty,

    #[error("El archivo Excel no tiene las siguientes columnas requeridas: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Cada fila debe ser un objeto")]
    NotAnObject,
}

/// Accept provider records as-is, or spreadsheet rows keyed by the Spanish
/// headers. Sheet mode is detected from the first row and requires every
/// header there; blank cells become `""` (`0` for the cost).
///
/// # Errors
///
/// An empty upload, a non-object row, or missing sheet headers.
pub fn normalize_bulk(rows: Vec<Value>) -> Result<Vec<Value>, BulkError> {
    let first = rows.first().ok_or(BulkError::Empty)?;
    let first = first.as_object().ok_or(BulkError::NotAnObject)?;
    if !first.contains_key(SHEET_COLUMNS[0].0) {
        return Ok(rows);
    }

    let missing: Vec<&'static str> = SHEET_COLUMNS
        .iter()
        .map(|(header, _)| *header)
        .filter(|header| !first.contains_key(*header))
        .collect();
    if !missing.is_empty() {
        return Err(BulkError::MissingColumns(missing));
    }

    rows.iter()
        .map(|row| row.as_object().map(sheet_row).ok_or(BulkError::NotAnObject))
        .collect()
}

fn sheet_row(row: &Map<String, Value>) -> Value {
    let mut provider = Map::new();
    for (header, field) in SHEET_COLUMNS {
        let blank = if field == "cost_usd" { json!(0) } else { json!("") };
        let value = match row.get(header) {
            None | Some(Value::Null) => blank,
            Some(Value::String(s)) if s.is_empty() => blank,
            Some(v) => v.clone(),
        };
        provider.insert(field.to_string(), value);
    }
    Value::Object(provider)
}

#[cfg(test)]
#[path = "providers_test.rs"]
mod tests;
