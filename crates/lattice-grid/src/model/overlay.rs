//! Overlay state.

use serde::{Deserialize, Serialize};

/// Which overlay, if any, is open on top of the grid.
///
/// At most one overlay is open at a time, so opening one replaces the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GridOverlayState {
    /// Nothing is open.
    #[default]
    Closed,
    /// The menu of one column header is open.
    #[serde(rename_all = "camelCase")]
    ColumnMenuOpen {
        /// Field of the column whose menu is open.
        field: String,
    },
    /// The filter panel is open.
    #[serde(rename_all = "camelCase")]
    FilterPanelOpen {
        /// Column the panel was opened for, if any.
        target_field: Option<String>,
    },
}

impl GridOverlayState {
    /// Returns `true` when nothing is open.
    pub fn is_closed(&self) -> bool {
        matches!(self, GridOverlayState::Closed)
    }

    /// Field of the open column menu.
    pub fn column_menu_field(&self) -> Option<&str> {
        match self {
            GridOverlayState::ColumnMenuOpen { field } => Some(field),
            _ => None,
        }
    }

    /// Returns `true` while the filter panel is open.
    pub fn is_filter_panel_open(&self) -> bool {
        matches!(self, GridOverlayState::FilterPanelOpen { .. })
    }

    /// State after a click on a column's menu button: opens the menu, or
    /// closes it when the same column's menu is already open.
    pub fn toggled_column_menu(&self, field: &str) -> Self {
        if self.column_menu_field() == Some(field) {
            GridOverlayState::Closed
        } else {
            GridOverlayState::ColumnMenuOpen {
                field: field.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_menu_toggles() {
        let open = GridOverlayState::Closed.toggled_column_menu("name");
        assert_eq!(open.column_menu_field(), Some("name"));

        let switched = open.toggled_column_menu("age");
        assert_eq!(switched.column_menu_field(), Some("age"));

        assert!(switched.toggled_column_menu("age").is_closed());
    }

    #[test]
    fn test_json_shape() {
        let state = GridOverlayState::FilterPanelOpen {
            target_field: Some("age".to_string()),
        };
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json, serde_json::json!({ "kind": "filterPanelOpen", "targetField": "age" }));
        assert!(!state.is_closed());
        assert!(state.is_filter_panel_open());
    }
}
