//! Notification rule validation.
//!
//! DESIGN
//! ======
//! Rules are evaluated by the backend; the gateway only refuses rules the
//! backend could never evaluate. Each target table exposes a fixed set of
//! condition fields, and a rule must pair a table with one of its own fields.
//! Validated rules are re-serialized, so unknown keys never reach the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTable {
    Provider,
    Evc,
    Entorno,
    EvcQ,
}

impl TargetTable {
    pub const ALL: [Self; 4] = [Self::Provider, Self::Evc, Self::Entorno, Self::EvcQ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Evc => "evc",
            Self::Entorno => "entorno",
            Self::EvcQ => "evc_q",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }

    /// Condition fields the backend can evaluate for this table.
    #[must_use]
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Provider => &["cost_usd", "category", "country"],
            Self::Evc => &["status", "allocated_budget"],
            Self::Entorno => &["status"],
            Self::EvcQ => &["allocated_percentage", "allocated_budget"],
        }
    }
}

pub const COMPARISONS: [&str; 5] = [">", "<", "==", ">=", "<="];
pub const RULE_TYPES: [&str; 3] = ["alert", "warning", "info"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("El cuerpo de la regla es inválido")]
    Malformed,

    #[error("El campo {0} es requerido")]
    Missing(&'static str),

    #[error("Tabla objetivo desconocida: {0}")]
    UnknownTable(String),

    #[error("El campo {field} no pertenece a la tabla {table}")]
    FieldNotInTable { table: &'static str, field: String },

    #[error("Comparación inválida: {0}")]
    UnknownComparison(String),

    #[error("Tipo de notificación inválido: {0}")]
    UnknownType(String),

    #[error("El umbral debe ser numérico")]
    BadThreshold,
}

/// A rule the backend can evaluate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRule {
    pub name: String,
    pub target_table: TargetTable,
    pub condition_field: String,
    pub threshold: f64,
    pub comparison: String,
    pub message: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub active: bool,
}

fn object(raw: &Value) -> Result<&Map<String, Value>, RuleError> {
    raw.as_object().ok_or(RuleError::Malformed)
}

fn required_text<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, RuleError> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(RuleError::Missing(key))
}

fn check_table(raw: &str) -> Result<TargetTable, RuleError> {
    TargetTable::parse(raw).ok_or_else(|| RuleError::UnknownTable(raw.to_string()))
}

fn check_field(table: TargetTable, field: &str) -> Result<(), RuleError> {
    if table.fields().contains(&field) {
        Ok(())
    } else {
        Err(RuleError::FieldNotInTable { table: table.as_str(), field: field.to_string() })
    }
}

fn check_comparison(raw: &str) -> Result<(), RuleError> {
    if COMPARISONS.contains(&raw) { Ok(()) } else { Err(RuleError::UnknownComparison(raw.to_string())) }
}

fn check_type(raw: &str) -> Result<(), RuleError> {
    if RULE_TYPES.contains(&raw) { Ok(()) } else { Err(RuleError::UnknownType(raw.to_string())) }
}

fn threshold(value: &Value) -> Result<f64, RuleError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(RuleError::BadThreshold),
        Value::String(s) => s.trim().parse().map_err(|_| RuleError::BadThreshold),
        _ => Err(RuleError::BadThreshold),
    }
}

/// Validate a full rule for creation. `type` defaults to `alert`, `active`
/// to `true`.
///
/// # Errors
///
/// The first rule violation found.
pub fn validate_rule(raw: &Value) -> Result<NotificationRule, RuleError> {
    let obj = object(raw)?;
    let name = required_text(obj, "name")?;
    let table = check_table(required_text(obj, "target_table")?)?;
    let field = required_text(obj, "condition_field")?;
    check_field(table, field)?;
    let comparison = required_text(obj, "comparison")?;
    check_comparison(comparison)?;
    let threshold = threshold(obj.get("threshold").ok_or(RuleError::Missing("threshold"))?)?;
    let message = required_text(obj, "message")?;

    let rule_type = match obj.get("type").and_then(Value::as_str) {
        Some(t) => {
            check_type(t)?;
            t
        }
        None => "alert",
    };
    let active = obj.get("active").and_then(Value::as_bool).unwrap_or(true);

    Ok(NotificationRule {
        name: name.to_string(),
        target_table: table,
        condition_field: field.to_string(),
        threshold,
        comparison: comparison.to_string(),
        message: message.to_string(),
        rule_type: rule_type.to_string(),
        active,
    })
}

/// Validate a partial update. Only present keys are checked; the table and
/// field are checked as a pair when both are present.
///
/// # Errors
///
/// The first rule violation found.
pub fn validate_patch(raw: &Value) -> Result<(), RuleError> {
    let obj = object(raw)?;
    let table = match obj.get("target_table").and_then(Value::as_str) {
        Some(t) => Some(check_table(t)?),
        None => None,
    };
    if let (Some(table), Some(field)) = (table, obj.get("condition_field").and_then(Value::as_str)) {
        check_field(table, field)?;
    }
    if let Some(comparison) = obj.get("comparison").and_then(Value::as_str) {
        check_comparison(comparison)?;
    }
    if let Some(rule_type) = obj.get("type").and_then(Value::as_str) {
        check_type(rule_type)?;
    }
    if let Some(value) = obj.get("threshold") {
        threshold(value)?;
    }
    Ok(())
}

/// # Errors
///
/// `Malformed` unless the body is an array; otherwise the first bad rule.
pub fn validate_bulk(raw: &Value) -> Result<Vec<NotificationRule>, RuleError> {
    raw.as_array()
        .ok_or(RuleError::Malformed)?
        .iter()
        .map(validate_rule)
        .collect()
}

#[cfg(test)]
#[path = "notification_rules_test.rs"]
mod tests;
