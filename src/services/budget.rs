//! Budget pockets — summaries, per-year grouping, and allocation planning.
//!
//! DESIGN
//! ======
//! The backend stores pockets and allocations; the gateway only adds them up.
//! Records are decoded with the few fields the arithmetic needs and keep every
//! other field in `rest`, so responses carry the full backend record.
//!
//! ALLOCATION
//! ==========
//! One allocation is two backend writes: the pocket allocation itself and the
//! EVC quarter that receives the budget. `plan_allocation` builds both
//! payloads up front so the route either sends both or neither is attempted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MSG_INCOMPLETE_ALLOCATION: &str = "Por favor complete todos los campos";
pub const MSG_NO_BUDGET_LEFT: &str = "La bolsa no tiene presupuesto disponible";

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPocket {
    pub id: i64,
    pub year: i32,
    pub agreed_value: f64,
    #[serde(default)]
    pub total_allocated: f64,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvcRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub evc_id: i64,
    pub allocated_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evc: Option<EvcRef>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

// =============================================================================
// SUMMARY
// =============================================================================

/// All allocations made to one EVC from one pocket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvcAllocations {
    pub evc_id: i64,
    pub name: Option<String>,
    pub total: f64,
    pub allocations: Vec<Allocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PocketSummary {
    pub pocket: BudgetPocket,
    pub total_allocated: f64,
    pub remaining: f64,
    pub allocated_percentage: f64,
    pub by_evc: Vec<EvcAllocations>,
}

#[must_use]
pub fn total_allocated(allocations: &[Allocation]) -> f64 {
    allocations.iter().map(|a| a.allocated_value).sum()
}

/// Percentage of `agreed` already allocated; 0 for an empty pocket.
#[must_use]
pub fn allocated_percentage(agreed: f64, allocated: f64) -> f64 {
    if agreed == 0.0 { 0.0 } else { allocated / agreed * 100.0 }
}

/// Group by EVC id, ascending. The EVC name comes from the first allocation
/// that carries one.
#[must_use]
pub fn group_by_evc(allocations: Vec<Allocation>) -> Vec<EvcAllocations> {
    let mut groups: BTreeMap<i64, EvcAllocations> = BTreeMap::new();
    for allocation in allocations {
        let group = groups.entry(allocation.evc_id).or_insert_with(|| EvcAllocations {
            evc_id: allocation.evc_id,
            name: None,
            total: 0.0,
            allocations: Vec::new(),
        });
        if group.name.is_none() {
            group.name = allocation.evc.as_ref().map(|evc| evc.name.clone());
        }
        group.total += allocation.allocated_value;
        group.allocations.push(allocation);
    }
    groups.into_values().collect()
}

#[must_use]
pub fn summarize(pocket: BudgetPocket, allocations: Vec<Allocation>) -> PocketSummary {
    let total = total_allocated(&allocations);
    PocketSummary {
        remaining: pocket.agreed_value - total,
        allocated_percentage: allocated_percentage(pocket.agreed_value, total),
        total_allocated: total,
        by_evc: group_by_evc(allocations),
        pocket,
    }
}

// =============================================================================
// BY YEAR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearGroup {
    pub year: i32,
    pub agreed_total: f64,
    pub allocated_total: f64,
    pub pockets: Vec<BudgetPocket>,
}

/// Pockets bucketed by year, oldest first. Totals use each pocket's own
/// `total_allocated`.
#[must_use]
pub fn group_by_year(pockets: Vec<BudgetPocket>) -> Vec<YearGroup> {
    let mut years: BTreeMap<i32, YearGroup> = BTreeMap::new();
    for pocket in pockets {
        let group = years.entry(pocket.year).or_insert_with(|| YearGroup {
            year: pocket.year,
            agreed_total: 0.0,
            allocated_total: 0.0,
            pockets: Vec::new(),
        });
        group.agreed_total += pocket.agreed_value;
        group.allocated_total += pocket.total_allocated;
        group.pockets.push(pocket);
    }
    years.into_values().collect()
}

// =============================================================================
// ALLOCATION PLAN
// =============================================================================

/// What the allocation dialog submits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocationRequest {
    #[serde(default)]
    pub evc_id: Option<i64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub is_total_allocation: bool,
    #[serde(default)]
    pub quarter: Option<u8>,
    /// Defaults to the pocket's year.
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PocketAllocationPayload {
    pub budget_pocket_id: i64,
    pub evc_id: i64,
    pub allocated_value: f64,
    pub is_total_allocation: bool,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvcQuarterPayload {
    pub evc_id: i64,
    pub year: i32,
    pub q: u8,
    pub allocated_budget: f64,
    pub allocated_percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPlan {
    pub pocket: PocketAllocationPayload,
    pub evc_quarter: EvcQuarterPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("{}", MSG_INCOMPLETE_ALLOCATION)]
    Incomplete,
    #[error("{}", MSG_NO_BUDGET_LEFT)]
    NoBudgetLeft,
}

/// Validate the request and build both backend payloads.
///
/// A total allocation takes whatever the pocket has left; `current_total` is
/// the sum of the pocket's existing allocations.
///
/// # Errors
///
/// `PlanError::Incomplete` when the EVC, quarter, or amount is missing or out
/// of range; `PlanError::NoBudgetLeft` for a total allocation on a pocket
/// with nothing remaining.
pub fn plan_allocation(
    pocket: &BudgetPocket,
    current_total: f64,
    request: &AllocationRequest,
) -> Result<AllocationPlan, PlanError> {
    let evc_id = request.evc_id.ok_or(PlanError::Incomplete)?;
    let quarter = request
        .quarter
        .filter(|q| (1..=4).contains(q))
        .ok_or(PlanError::Incomplete)?;

    let value = if request.is_total_allocation {
        let remaining = pocket.agreed_value - current_total;
        if !(remaining.is_finite() && remaining > 0.0) {
            return Err(PlanError::NoBudgetLeft);
        }
        remaining
    } else {
        request
            .amount
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or(PlanError::Incomplete)?
    };

    let comments = request
        .comments
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok(AllocationPlan {
        pocket: PocketAllocationPayload {
            budget_pocket_id: pocket.id,
            evc_id,
            allocated_value: value,
            is_total_allocation: request.is_total_allocation,
            comments,
        },
        evc_quarter: EvcQuarterPayload {
            evc_id,
            year: request.year.unwrap_or(pocket.year),
            q: quarter,
            allocated_budget: value,
            allocated_percentage: 0.0,
        },
    })
}

#[cfg(test)]
#[path = "budget_test.rs"]
mod tests;
