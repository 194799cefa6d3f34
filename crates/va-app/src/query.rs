//! Query helpers for reading sweep results back out of a store.

use va_core::{FlowCondition, ResultId};
use va_results::{ResultRecord, ResultStore, names};

use crate::error::{AppError, AppResult};

/// Converged coefficients of one history case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSummary {
    pub id: ResultId,
    pub flow: Option<FlowCondition>,
    pub cl: Option<f64>,
    pub cdtot: Option<f64>,
    pub cmy: Option<f64>,
    pub l_over_d: Option<f64>,
}

/// Per-name record counts of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSummary {
    pub total: usize,
    pub counts: Vec<(String, usize)>,
}

fn parse_ids(record: &ResultRecord, field: &str) -> AppResult<Vec<ResultId>> {
    record
        .str_slice(field)
        .unwrap_or_default()
        .iter()
        .map(|s| {
            s.parse()
                .map_err(|_| AppError::InvalidInput(format!("bad result id '{s}' in {field}")))
        })
        .collect()
}

/// Child ids of the latest `VSPAERO_Wrapper`.
pub fn wrapper_children(store: &ResultStore) -> AppResult<Vec<ResultId>> {
    let id = store
        .find_latest(names::WRAPPER)
        .ok_or_else(|| AppError::CantFindName(names::WRAPPER.to_string()))?;
    parse_ids(store.require(id)?, "ResultsVec")
}

/// Case ids of the latest `CpSlicer_Wrapper`.
pub fn slice_children(store: &ResultStore) -> AppResult<Vec<ResultId>> {
    let id = store
        .find_latest(names::SLICE_WRAPPER)
        .ok_or_else(|| AppError::CantFindName(names::SLICE_WRAPPER.to_string()))?;
    parse_ids(store.require(id)?, "CpSlice_Case_ID_Vec")
}

fn last(record: &ResultRecord, field: &str) -> Option<f64> {
    record.f64_slice(field).and_then(|v| v.last().copied())
}

/// Final-iteration coefficients of every history case in the latest sweep.
pub fn history_summaries(store: &ResultStore) -> AppResult<Vec<CaseSummary>> {
    let children = wrapper_children(store)?;
    Ok(children
        .into_iter()
        .filter_map(|id| store.get(id))
        .filter(|r| r.name == names::HISTORY)
        .map(|r| CaseSummary {
            id: r.id,
            flow: r.header.map(|h| h.flow),
            cl: last(r, "CL"),
            cdtot: last(r, "CDtot"),
            cmy: last(r, "CMy"),
            l_over_d: last(r, "L/D"),
        })
        .collect())
}

pub fn summarize_store(store: &ResultStore) -> StoreSummary {
    let counts = store
        .names()
        .into_iter()
        .map(|name| (name.to_string(), store.count(name)))
        .collect();
    StoreSummary {
        total: store.len(),
        counts,
    }
}
