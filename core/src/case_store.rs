//! Case store — the single source of truth for the active case set.
//!
//! RULES:
//!   - The case set is only ever replaced whole. No merge, no partial update.
//!   - The selection, if any, always names a case in the current set.
//!   - Summaries belong to a generation and vanish with it.

use crate::{
    error::{DeskError, DeskResult},
    model::{Case, Summary},
    types::{CaseId, Generation},
};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CaseStore {
    cases:      Vec<Case>,
    selected:   Option<usize>,
    summaries:  HashMap<CaseId, Summary>,
    generation: Generation,
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new case set. Selection moves to the first case, or none.
    pub fn replace_cases(&mut self, cases: Vec<Case>) {
        self.selected = if cases.is_empty() { None } else { Some(0) };
        self.cases = cases;
        self.summaries.clear();
        self.generation += 1;
        log::debug!(
            "case set replaced: generation={} cases={}",
            self.generation,
            self.cases.len()
        );
    }

    /// Select by id. Unknown ids leave the selection untouched.
    pub fn select_case(&mut self, case_id: &str) -> DeskResult<&Case> {
        let idx = self
            .position(case_id)
            .ok_or_else(|| DeskError::NotFound { case_id: case_id.to_string() })?;
        self.selected = Some(idx);
        Ok(&self.cases[idx])
    }

    pub fn current_cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn current_selection(&self) -> Option<&Case> {
        self.selected.map(|idx| &self.cases[idx])
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.current_selection().map(|c| c.case_id.as_str())
    }

    pub fn is_selected(&self, case_id: &str) -> bool {
        self.selected_id() == Some(case_id)
    }

    pub fn case(&self, case_id: &str) -> Option<&Case> {
        self.position(case_id).map(|idx| &self.cases[idx])
    }

    /// Bumped on every replacement; correlates in-flight work with its case set.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn attach_summary(&mut self, case_id: &str, summary: Summary) -> DeskResult<()> {
        if self.position(case_id).is_none() {
            return Err(DeskError::NotFound { case_id: case_id.to_string() });
        }
        self.summaries.insert(case_id.to_string(), summary);
        Ok(())
    }

    pub fn summary_for(&self, case_id: &str) -> Option<&Summary> {
        self.summaries.get(case_id)
    }

    fn position(&self, case_id: &str) -> Option<usize> {
        self.cases.iter().position(|c| c.case_id == case_id)
    }
}
