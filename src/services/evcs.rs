//! EVC screen helpers: entorno filter, the providers assigned across an
//! EVC's quarters, and provider-to-quarter assignment.
//!
//! EVC records pass through as raw JSON. An EVC carries its quarters in
//! `evc_qs`, each with the provider assignments in `evc_financials`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MSG_SELECT_PROVIDER: &str = "Seleccione un proveedor";
pub const MSG_SELECT_QUARTER: &str = "Seleccione un trimestre";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvcQuery {
    /// Blank means no filter.
    #[serde(default)]
    pub entorno_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvcError {
    #[error("entorno_id inválido: {0}")]
    BadEntorno(String),
    #[error("{}", MSG_SELECT_PROVIDER)]
    MissingProvider,
    #[error("{}", MSG_SELECT_QUARTER)]
    MissingQuarter,
}

impl EvcQuery {
    /// # Errors
    ///
    /// `BadEntorno` when the id is present but not an integer.
    pub fn entorno(&self) -> Result<Option<i64>, EvcError> {
        match self.entorno_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| EvcError::BadEntorno(raw.to_string())),
        }
    }
}

/// EVCs whose `entorno_id` equals `entorno_id`. EVCs without one never match.
#[must_use]
pub fn filter_by_entorno(evcs: Vec<Value>, entorno_id: i64) -> Vec<Value> {
    evcs.into_iter()
        .filter(|evc| evc.get("entorno_id").and_then(Value::as_i64) == Some(entorno_id))
        .collect()
}

/// Every provider assigned to any quarter of `evc`, once each, in order of
/// first appearance. A later record for the same id replaces the earlier one.
#[must_use]
pub fn evc_providers(evc: &Value) -> Vec<Value> {
    let mut ids: Vec<String> = Vec::new();
    let mut providers: Vec<Value> = Vec::new();

    let assigned = evc
        .get("evc_qs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|quarter| quarter.get("evc_financials").and_then(Value::as_array))
        .flatten()
        .filter_map(|financial| financial.get("provider"))
        .filter(|provider| provider.is_object());

    for provider in assigned {
        let id = provider.get("id").map(Value::to_string).unwrap_or_default();
        match ids.iter().position(|seen| *seen == id) {
            Some(i) => providers[i] = provider.clone(),
            None => {
                ids.push(id);
                providers.push(provider.clone());
            }
        }
    }
    providers
}

/// What the "assign provider" control submits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinancialRequest {
    #[serde(default)]
    pub evc_q_id: Option<i64>,
    #[serde(default)]
    pub provider_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialPayload {
    pub evc_q_id: i64,
    pub provider_id: i64,
}

/// # Errors
///
/// `MissingQuarter` or `MissingProvider` when either id is absent.
pub fn plan_financial(request: &FinancialRequest) -> Result<FinancialPayload, EvcError> {
    let evc_q_id = request.evc_q_id.ok_or(EvcError::MissingQuarter)?;
    let provider_id = request.provider_id.ok_or(EvcError::MissingProvider)?;
    Ok(FinancialPayload { evc_q_id, provider_id })
}

#[cfg(test)]
#[path = "evcs_test.rs"]
mod tests;
