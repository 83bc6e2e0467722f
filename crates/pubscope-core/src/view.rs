//! The data view behind the publications table.
//!
//! Control flow is synchronous: committing criteria or changing the sort
//! re-filters the full dataset, re-sorts the matches, and the presentation
//! consumers re-render from [`DataView::snapshot`].

use std::fmt;
use std::sync::Arc;

use crate::config::ViewConfig;
use crate::domain::{Pmid, Publication};
use crate::filter::{filter_indices, FilterCriteria};
use crate::sort::{sort_indices, SortField, SortKey};

/// Callback invoked with the newly selected record (or `None`).
pub type SelectionListener = Box<dyn FnMut(Option<&Publication>)>;

/// What presentation components (table, timeline, tree, summary viewer)
/// render from.
#[derive(Debug, Clone)]
pub struct ViewSnapshot<'a> {
    pub rows: Vec<&'a Publication>,
    pub selected: Option<&'a Publication>,
    pub sort: SortKey,
    pub total: usize,
}

impl ViewSnapshot<'_> {
    /// No matching records: a valid, displayed empty state.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct DataView {
    records: Arc<[Publication]>,
    criteria: FilterCriteria,
    sort: SortKey,
    /// Restored by `clear_criteria`.
    default_sort: SortKey,
    /// Matching dataset indices in dataset order.
    matched: Vec<usize>,
    /// `matched` in sort order.
    rows: Vec<usize>,
    selected: Option<usize>,
    listeners: Vec<SelectionListener>,
}

impl fmt::Debug for DataView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataView")
            .field("records", &self.records.len())
            .field("criteria", &self.criteria)
            .field("sort", &self.sort)
            .field("default_sort", &self.default_sort)
            .field("rows", &self.rows.len())
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl DataView {
    /// Build a view over the dataset with empty criteria and the default
    /// sort (title ascending).
    pub fn new(records: impl Into<Arc<[Publication]>>) -> Self {
        Self::with_sort(records, SortKey::default())
    }

    /// Build a view whose default sort is `sort`.
    pub fn with_sort(records: impl Into<Arc<[Publication]>>, sort: SortKey) -> Self {
        let mut view = Self {
            records: records.into(),
            criteria: FilterCriteria::default(),
            sort,
            default_sort: sort,
            matched: Vec::new(),
            rows: Vec::new(),
            selected: None,
            listeners: Vec::new(),
        };
        view.refilter();
        view
    }

    pub fn from_config(records: impl Into<Arc<[Publication]>>, config: &ViewConfig) -> Self {
        Self::with_sort(records, config.default_sort)
    }

    /// The full, unfiltered dataset.
    pub fn records(&self) -> &[Publication] {
        &self.records
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    pub fn default_sort(&self) -> SortKey {
        self.default_sort
    }

    /// Matching records in display order.
    pub fn rows(&self) -> Vec<&Publication> {
        self.rows.iter().map(|&i| &self.records[i]).collect()
    }

    /// Dataset indices of the matching records in display order.
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace the committed criteria as a whole and recompute.
    pub fn apply_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refilter();
    }

    /// Back to the canonical empty criteria and the default sort.
    pub fn clear_criteria(&mut self) {
        self.criteria = FilterCriteria::default();
        self.sort = self.default_sort;
        self.refilter();
    }

    /// Column-header click.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.set_sort(self.sort.toggle(field));
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.resort();
    }

    pub fn selected(&self) -> Option<&Publication> {
        self.selected.map(|i| &self.records[i])
    }

    /// Select the visible record with this PMID. Returns the selection, or
    /// `None` (leaving the selection unchanged) if no visible row has it.
    pub fn select(&mut self, pmid: &Pmid) -> Option<&Publication> {
        let index = self
            .rows
            .iter()
            .copied()
            .find(|&i| &self.records[i].pmid == pmid)?;
        self.set_selected(Some(index));
        self.selected()
    }

    /// Select by display row.
    pub fn select_row(&mut self, row: usize) -> Option<&Publication> {
        let index = *self.rows.get(row)?;
        self.set_selected(Some(index));
        self.selected()
    }

    pub fn clear_selection(&mut self) {
        self.set_selected(None);
    }

    /// Register a selection-changed callback.
    pub fn on_selection_changed(&mut self, listener: SelectionListener) {
        self.listeners.push(listener);
    }

    pub fn snapshot(&self) -> ViewSnapshot<'_> {
        ViewSnapshot {
            rows: self.rows(),
            selected: self.selected(),
            sort: self.sort,
            total: self.records.len(),
        }
    }

    fn refilter(&mut self) {
        self.matched = filter_indices(&self.records, &self.criteria);
        self.resort();
    }

    fn resort(&mut self) {
        self.rows = sort_indices(&self.records, &self.matched, self.sort);
        tracing::debug!(
            total = self.records.len(),
            visible = self.rows.len(),
            sort = %self.sort.field,
            "view recomputed"
        );

        // A selection that is no longer visible is dropped.
        if let Some(i) = self.selected {
            if !self.rows.contains(&i) {
                self.set_selected(None);
            }
        }
    }

    fn set_selected(&mut self, index: Option<usize>) {
        if self.selected == index {
            return;
        }
        self.selected = index;
        let records = Arc::clone(&self.records);
        let current = index.map(|i| &records[i]);
        for listener in self.listeners.iter_mut() {
            listener(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dataset() -> Vec<Publication> {
        vec![
            Publication::new("Gamma", "", "300"),
            Publication::new("Alpha", "", "100"),
            Publication::new("Beta", "", "200"),
        ]
    }

    fn titles(view: &DataView) -> Vec<String> {
        view.rows().iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn default_view_is_title_ascending() {
        let view = DataView::new(dataset());
        assert_eq!(titles(&view), vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn toggle_sort_flips_then_resets() {
        let mut view = DataView::new(dataset());
        view.toggle_sort(SortField::Title);
        assert_eq!(titles(&view), vec!["Gamma", "Beta", "Alpha"]);

        view.toggle_sort(SortField::Pmid);
        assert_eq!(titles(&view), vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn clear_restores_default_sort() {
        let mut view = DataView::new(dataset());
        view.apply_criteria(FilterCriteria {
            pmid_min: "150".to_string(),
            ..Default::default()
        });
        view.toggle_sort(SortField::Title);
        assert_eq!(titles(&view), vec!["Gamma", "Beta"]);

        view.clear_criteria();
        assert_eq!(view.sort_key(), SortKey::default());
        assert_eq!(titles(&view), vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn configured_default_sort_survives_clear() {
        let config = ViewConfig {
            default_sort: SortKey::descending(SortField::Pmid),
        };
        let mut view = DataView::from_config(dataset(), &config);
        assert_eq!(titles(&view), vec!["Gamma", "Beta", "Alpha"]);

        view.toggle_sort(SortField::Title);
        view.clear_criteria();
        assert_eq!(view.sort_key(), config.default_sort);
        assert_eq!(titles(&view), vec!["Gamma", "Beta", "Alpha"]);
    }

    #[test]
    fn selection_notifies_only_on_change() {
        let mut view = DataView::new(dataset());
        let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::default();
        let sink = Rc::clone(&seen);
        view.on_selection_changed(Box::new(move |p: Option<&Publication>| {
            sink.borrow_mut().push(p.map(|p| p.title.clone()));
        }));

        view.select(&Pmid::from("200"));
        view.select(&Pmid::from("200"));
        view.clear_selection();

        assert_eq!(*seen.borrow(), vec![Some("Beta".to_string()), None]);
    }

    #[test]
    fn filtering_out_the_selection_drops_it() {
        let mut view = DataView::new(dataset());
        view.select(&Pmid::from("100"));
        assert_eq!(view.selected().map(|p| p.title.as_str()), Some("Alpha"));

        view.apply_criteria(FilterCriteria {
            pmid_min: "150".to_string(),
            ..Default::default()
        });
        assert!(view.selected().is_none());
    }

    #[test]
    fn selecting_hidden_record_is_rejected() {
        let mut view = DataView::new(dataset());
        view.apply_criteria(FilterCriteria {
            title: "gamma".to_string(),
            ..Default::default()
        });
        assert!(view.select(&Pmid::from("100")).is_none());
        assert!(view.select_row(0).is_some());
        assert!(view.select_row(5).is_none());
    }

    #[test]
    fn empty_result_is_a_state_not_an_error() {
        let mut view = DataView::new(dataset());
        view.apply_criteria(FilterCriteria {
            title: "nothing matches this".to_string(),
            ..Default::default()
        });
        let snap = view.snapshot();
        assert!(snap.is_empty());
        assert_eq!(snap.total, 3);
    }
}
