//! Search/filter input surface.
//!
//! The panel holds a draft the user edits freely and the committed criteria
//! the table is filtered by. The draft only replaces the committed criteria
//! on an explicit apply (button or Enter); keystrokes never touch the table.

use serde::{Deserialize, Serialize};

use crate::filter::FilterCriteria;
use crate::query::{format_search_query, parse_search_query};

/// Keys the panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelKey {
    Enter,
    Escape,
    Other,
}

/// Draft/committed filter state for the search panel.
#[derive(Debug, Clone, Default)]
pub struct FilterPanel {
    committed: FilterCriteria,
    draft: FilterCriteria,
    visible: bool,
}

impl FilterPanel {
    pub fn new(committed: FilterCriteria) -> Self {
        Self {
            draft: committed.clone(),
            committed,
            visible: false,
        }
    }

    /// Open the panel. The draft is re-synchronized from the committed
    /// criteria, discarding edits left over from the previous session.
    pub fn show(&mut self) {
        self.draft = self.committed.clone();
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn committed(&self) -> &FilterCriteria {
        &self.committed
    }

    pub fn draft(&self) -> &FilterCriteria {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut FilterCriteria {
        &mut self.draft
    }

    /// Replace the draft from a search-bar expression.
    pub fn set_query(&mut self, text: &str) {
        self.draft = parse_search_query(text);
    }

    /// The draft rendered as a search-bar expression.
    pub fn query_text(&self) -> String {
        format_search_query(&self.draft)
    }

    /// Whether the draft has edits that have not been applied.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.committed
    }

    /// Commit the draft and return the new criteria for the view.
    pub fn apply(&mut self) -> FilterCriteria {
        self.committed = self.draft.clone();
        tracing::debug!(empty = self.committed.is_empty(), "filter criteria applied");
        self.committed.clone()
    }

    /// Reset both draft and committed criteria to the canonical empty shape.
    pub fn clear(&mut self) -> FilterCriteria {
        self.draft = FilterCriteria::default();
        self.committed = FilterCriteria::default();
        tracing::debug!("filter criteria cleared");
        self.committed.clone()
    }

    /// Enter applies, Escape closes without applying.
    pub fn handle_key(&mut self, key: PanelKey) -> Option<FilterCriteria> {
        match key {
            PanelKey::Enter => Some(self.apply()),
            PanelKey::Escape => {
                self.hide();
                None
            }
            PanelKey::Other => None,
        }
    }
}
