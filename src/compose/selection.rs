//! Selection Module
//! Named interactive inputs that views filter on. A selection is written
//! only by the interaction handler and read by every dependent view on each
//! render.

use crate::compose::ComposeError;
use crate::data::loader;
use polars::prelude::DataFrame;
use std::collections::BTreeMap;

/// How the user drives a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionBinding {
    /// Widget-driven: single value picked from an enumerated option list.
    Dropdown,
    /// Legend-driven: a category swatch toggles the value.
    Legend,
}

/// A named single-value selection over one schema field.
#[derive(Debug, Clone)]
pub struct Selection {
    pub name: String,
    /// Field the filter predicate applies to.
    pub field: String,
    pub binding: SelectionBinding,
    /// The values the user can pick from.
    pub options: Vec<String>,
    value: Option<String>,
}

impl Selection {
    /// Current value; `None` means unset (dependent views pass through).
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Owns every selection of one session. Passed to views at render time so
/// selection state never lives in ambient globals.
#[derive(Debug, Default)]
pub struct SessionState {
    selections: BTreeMap<String, Selection>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a widget-driven selection over an enumerated option list.
    /// The value stays unset until the user picks an option.
    pub fn bind_dropdown(
        &mut self,
        name: &str,
        field: &str,
        options: Vec<String>,
    ) -> Result<(), ComposeError> {
        if options.is_empty() {
            return Err(ComposeError::EmptyOptions(name.to_string()));
        }
        self.insert(Selection {
            name: name.to_string(),
            field: field.to_string(),
            binding: SelectionBinding::Dropdown,
            options,
            value: None,
        })
    }

    /// Bind a legend-driven selection to the distinct values of `field`.
    pub fn bind_legend(
        &mut self,
        name: &str,
        field: &str,
        df: &DataFrame,
    ) -> Result<(), ComposeError> {
        if !loader::has_column(df, field) {
            return Err(ComposeError::UnknownField {
                owner: format!("selection '{name}'"),
                field: field.to_string(),
            });
        }
        let mut options = loader::unique_values(df, field);
        options.sort();
        if options.is_empty() {
            return Err(ComposeError::EmptyOptions(name.to_string()));
        }
        self.insert(Selection {
            name: name.to_string(),
            field: field.to_string(),
            binding: SelectionBinding::Legend,
            options,
            value: None,
        })
    }

    fn insert(&mut self, selection: Selection) -> Result<(), ComposeError> {
        if self.selections.contains_key(&selection.name) {
            return Err(ComposeError::DuplicateSelection(selection.name));
        }
        self.selections.insert(selection.name.clone(), selection);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Selection> {
        self.selections.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.selections.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.selections.get(name).and_then(|s| s.value())
    }

    /// Set or unset a selection's current value.
    pub fn set(&mut self, name: &str, value: Option<String>) {
        if let Some(selection) = self.selections.get_mut(name) {
            log::debug!("selection '{name}' set to {value:?}");
            selection.value = value;
        }
    }

    /// Legend-click semantics: picking the current value clears it.
    pub fn toggle(&mut self, name: &str, value: &str) {
        let next = match self.value(name) {
            Some(current) if current == value => None,
            _ => Some(value.to_string()),
        };
        self.set(name, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{self, tests::five_rows};

    #[test]
    fn dropdown_rejects_empty_options() {
        let mut session = SessionState::new();
        let err = session.bind_dropdown("xvar", "column", Vec::new()).unwrap_err();
        assert!(matches!(err, ComposeError::EmptyOptions(_)));
    }

    #[test]
    fn legend_rejects_unknown_field() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();

        let mut session = SessionState::new();
        let err = session.bind_legend("disorder", "Disorder", &df).unwrap_err();
        assert!(matches!(err, ComposeError::UnknownField { .. }));
    }

    #[test]
    fn legend_captures_sorted_distinct_values() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();

        let mut session = SessionState::new();
        session.bind_legend("disorder", "Sleep Disorder", &df).unwrap();

        let selection = session.get("disorder").unwrap();
        assert_eq!(selection.options, ["Insomnia", "None", "Sleep Apnea"]);
        assert_eq!(selection.value(), None);
    }

    #[test]
    fn toggle_clears_on_second_click() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();

        let mut session = SessionState::new();
        session.bind_legend("disorder", "Sleep Disorder", &df).unwrap();

        session.toggle("disorder", "Insomnia");
        assert_eq!(session.value("disorder"), Some("Insomnia"));
        session.toggle("disorder", "Insomnia");
        assert_eq!(session.value("disorder"), None);
        session.toggle("disorder", "Insomnia");
        session.toggle("disorder", "Sleep Apnea");
        assert_eq!(session.value("disorder"), Some("Sleep Apnea"));
    }
}
