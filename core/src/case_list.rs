//! Case list projection. Server order, no filtering, no state of its own.

use crate::{
    case_store::CaseStore,
    model::Case,
    risk::classify,
    types::{CaseId, EntityId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseListRow {
    pub case_id:            CaseId,
    pub short_id:           String,
    pub customer_id:        EntityId,
    pub primary_account_id: EntityId,
    pub risk_label:         String,
    pub risk_score:         f64,
    pub selected:           bool,
}

pub struct CaseListViewModel;

impl CaseListViewModel {
    /// Each call starts a fresh pass over the store's current cases.
    pub fn rows(store: &CaseStore) -> impl Iterator<Item = CaseListRow> + '_ {
        let selected = store.selected_id();
        store
            .current_cases()
            .iter()
            .map(move |case| row(case, selected == Some(case.case_id.as_str())))
    }
}

fn row(case: &Case, selected: bool) -> CaseListRow {
    let risk = classify(case.risk_score);
    CaseListRow {
        case_id:            case.case_id.clone(),
        short_id:           case.short_id(),
        customer_id:        case.customer_id.clone(),
        primary_account_id: case.primary_account_id.clone(),
        risk_label:         risk.label,
        risk_score:         risk.score,
        selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str, score: f64) -> Case {
        Case {
            case_id:            id.into(),
            customer_id:        format!("CUST-{id}"),
            primary_account_id: format!("ACC-{id}"),
            transactions:       vec![],
            risk_score:         score,
            signals:            vec![],
        }
    }

    #[test]
    fn rows_keep_server_order_without_sorting() {
        let mut store = CaseStore::new();
        store.replace_cases(vec![
            case("low-risk-case", 0.1),
            case("critical-case", 0.95),
            case("medium-case", 0.5),
        ]);
        let labels: Vec<_> = CaseListViewModel::rows(&store).map(|r| r.risk_label).collect();
        assert_eq!(labels, ["Low", "Critical", "Medium"]);
    }

    #[test]
    fn rows_are_restartable_and_track_selection() {
        let mut store = CaseStore::new();
        store.replace_cases(vec![case("aaaaaaaa-1111", 0.7), case("bbbbbbbb-2222", 0.3)]);

        let first: Vec<_> = CaseListViewModel::rows(&store).collect();
        let second: Vec<_> = CaseListViewModel::rows(&store).collect();
        assert_eq!(first, second);
        assert!(first[0].selected && !first[1].selected);
        assert_eq!(first[0].short_id, "aaaaaaaa");

        store.select_case("bbbbbbbb-2222").unwrap();
        let selected: Vec<_> = CaseListViewModel::rows(&store).filter(|r| r.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].customer_id, "CUST-bbbbbbbb-2222");
    }

    #[test]
    fn empty_store_yields_no_rows() {
        let store = CaseStore::new();
        assert_eq!(CaseListViewModel::rows(&store).count(), 0);
    }
}
