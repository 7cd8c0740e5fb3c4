//! UI snapshot — everything a frontend needs to draw the desk, as one JSON value.
//!
//! Purely derived from DeskState at capture time. Holds no state of its own.

use crate::{
    case_detail::CaseDetailView,
    case_list::{CaseListRow, CaseListViewModel},
    event::ActivityEntry,
    session::{AnalysisStatus, DeskState},
    types::{CaseId, Generation},
};
use serde::{Deserialize, Serialize};

/// Most recent activity entries carried in a snapshot.
pub const SNAPSHOT_ACTIVITY: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeskSnapshot {
    pub analysis:         AnalysisStatus,
    pub generation:       Generation,
    pub cases:            Vec<CaseListRow>,
    pub selected_case_id: Option<CaseId>,
    pub detail:           Option<CaseDetailView>,
    pub recent_activity:  Vec<ActivityEntry>,
}

impl DeskSnapshot {
    pub fn capture(state: &DeskState) -> Self {
        let skip = state.activity.len().saturating_sub(SNAPSHOT_ACTIVITY);
        Self {
            analysis:         state.analysis.clone(),
            generation:       state.store.generation(),
            cases:            CaseListViewModel::rows(&state.store).collect(),
            selected_case_id: state.store.selected_id().map(str::to_string),
            detail:           state.detail.view(&state.store),
            recent_activity:  state.activity.entries().skip(skip).cloned().collect(),
        }
    }
}
