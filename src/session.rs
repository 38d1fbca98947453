//! Session context: the built dataset plus the user's selection state.
//!
//! The session never talks to a renderer. State changes are queued as
//! [`SessionEvent`]s which the front end drains and applies.

use crate::dataset::{Bounds, Dataset, EnrichedFeature, Indicator, Match, Rgb};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Something the rendering layer should react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Bring a country into view
    Focus {
        index: usize,
        code: String,
        bounds: Bounds,
    },
    /// Active color layer switched
    IndicatorChanged(Indicator),
    SelectionCleared,
}

pub struct Session {
    dataset: Dataset,
    indicator: Indicator,
    selected: Option<usize>,
    events: VecDeque<SessionEvent>,
}

impl Session {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            indicator: Indicator::Gdp,
            selected: None,
            events: VecDeque::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&EnrichedFeature> {
        self.selected.and_then(|i| self.dataset.features.get(i))
    }

    /// Prefix suggestions for the search box
    pub fn suggestions(&self, query: &str) -> Vec<Match<'_>> {
        self.dataset.search.prefix(query)
    }

    /// Select the country whose name equals `query`. Returns whether one
    /// matched.
    pub fn submit(&mut self, query: &str) -> bool {
        match self.dataset.search.exact(query).map(|m| m.index) {
            Some(index) => {
                self.select(index);
                true
            }
            None => {
                debug!(query, "no exact match");
                false
            }
        }
    }

    /// Select a country and request focus on its bounds
    pub fn select(&mut self, index: usize) {
        let Some(country) = self.dataset.search.get(index) else {
            return;
        };
        info!(code = %country.code, name = %country.name, "country selected");
        let event = SessionEvent::Focus {
            index,
            code: country.code.clone(),
            bounds: country.bounds,
        };
        self.selected = Some(index);
        self.events.push_back(event);
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.events.push_back(SessionEvent::SelectionCleared);
        }
    }

    pub fn toggle_indicator(&mut self) {
        self.indicator = self.indicator.toggled();
        info!(indicator = self.indicator.label(), "layer toggled");
        self.events
            .push_back(SessionEvent::IndicatorChanged(self.indicator));
    }

    /// Fill color of a feature in the active layer
    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.dataset.color(index, self.indicator)
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BoundaryFeature;
    use crate::dataset::{DatasetBuilder, RawRow};

    fn session() -> Session {
        let boundaries = vec![
            BoundaryFeature::named("France", "FRA"),
            BoundaryFeature::named("Gabon", "GAB"),
            BoundaryFeature::named("Germany", "DEU"),
        ];
        let gdp: Vec<RawRow> = vec![[
            ("Country Code".to_string(), "FRA".to_string()),
            ("2018".to_string(), "2.7e12".to_string()),
        ]
        .into()];
        Session::new(DatasetBuilder::default().build(&boundaries, &gdp, &[]))
    }

    #[test]
    fn test_submit_exact_emits_focus() {
        let mut s = session();
        assert!(s.submit("Germany"));
        assert_eq!(s.selected_index(), Some(2));
        let events = s.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            SessionEvent::Focus { index, code, .. } => {
                assert_eq!(*index, 2);
                assert_eq!(code, "DEU");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_submit_partial_selects_nothing() {
        let mut s = session();
        assert!(!s.submit("Ger"));
        assert!(s.selected().is_none());
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_suggestions() {
        let s = session();
        let names: Vec<_> = s
            .suggestions("G")
            .iter()
            .map(|m| m.country.name.clone())
            .collect();
        assert_eq!(names, vec!["Gabon", "Germany"]);
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut s = session();
        s.select(0);
        s.toggle_indicator();
        s.clear_selection();
        s.clear_selection();
        let events = s.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], SessionEvent::IndicatorChanged(Indicator::Population));
        assert_eq!(events[2], SessionEvent::SelectionCleared);
        assert_eq!(s.indicator(), Indicator::Population);
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut s = session();
        s.select(99);
        assert!(s.selected().is_none());
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_color_follows_layer() {
        let mut s = session();
        let gdp = s.color(0).unwrap();
        s.toggle_indicator();
        let pop = s.color(0).unwrap();
        assert_ne!(gdp, pop);
    }
}
