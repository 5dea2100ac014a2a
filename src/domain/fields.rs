//! Custom field sets - the saved column/filter/sort configuration of the dashboard

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    None,
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::None => "none",
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SortOrder::None)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SortOrder::None),
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

/// Persisted display mode of a field set or field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Card,
    #[default]
    Row,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Card => "card",
            DisplayMode::Row => "row",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the dashboard is currently rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Card,
    Table,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Card => "card",
            ViewMode::Table => "table",
        }
    }

    pub fn toggled(&self) -> ViewMode {
        match self {
            ViewMode::Card => ViewMode::Table,
            ViewMode::Table => ViewMode::Card,
        }
    }
}

impl From<DisplayMode> for ViewMode {
    fn from(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Card => ViewMode::Card,
            DisplayMode::Row => ViewMode::Table,
        }
    }
}

impl From<ViewMode> for DisplayMode {
    fn from(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Card => DisplayMode::Card,
            ViewMode::Table => DisplayMode::Row,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(ViewMode::Card),
            "table" | "row" => Ok(ViewMode::Table),
            _ => Err(format!("Unknown view mode: {}", s)),
        }
    }
}

/// A single configurable column of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_visible_in_card: bool,
    #[serde(default)]
    pub is_visible_in_row: bool,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub filter_enabled: bool,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub display_mode: DisplayMode,
}

fn default_field_type() -> String {
    "text".to_string()
}

impl CustomField {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_visible_in_card: true,
            is_visible_in_row: true,
            sort_order: SortOrder::None,
            filter: String::new(),
            filter_enabled: false,
            field_type: default_field_type(),
            display_mode: DisplayMode::Row,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self.filter_enabled = true;
        self
    }

    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn with_visibility(mut self, in_card: bool, in_row: bool) -> Self {
        self.is_visible_in_card = in_card;
        self.is_visible_in_row = in_row;
        self
    }

    /// The filter is applied only when enabled and non-empty
    pub fn has_active_filter(&self) -> bool {
        self.filter_enabled && !self.filter.trim().is_empty()
    }

    pub fn is_visible_in(&self, mode: ViewMode) -> bool {
        match mode {
            ViewMode::Card => self.is_visible_in_card,
            ViewMode::Table => self.is_visible_in_row,
        }
    }

    fn apply(&mut self, update: &FieldUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(visible) = update.is_visible_in_card {
            self.is_visible_in_card = visible;
        }
        if let Some(visible) = update.is_visible_in_row {
            self.is_visible_in_row = visible;
        }
        if let Some(order) = update.sort_order {
            self.sort_order = order;
        }
        if let Some(filter) = &update.filter {
            self.filter = filter.clone();
        }
        if let Some(enabled) = update.filter_enabled {
            self.filter_enabled = enabled;
        }
        if let Some(field_type) = &update.field_type {
            self.field_type = field_type.clone();
        }
        if let Some(mode) = update.display_mode {
            self.display_mode = mode;
        }
    }
}

/// Partial update of a field; `None` leaves the property untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    pub name: Option<String>,
    pub is_visible_in_card: Option<bool>,
    pub is_visible_in_row: Option<bool>,
    pub sort_order: Option<SortOrder>,
    pub filter: Option<String>,
    pub filter_enabled: Option<bool>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub display_mode: Option<DisplayMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardConfig {
    pub show_description: bool,
    pub show_icon: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub compact: bool,
    pub show_icon: bool,
}

/// Presentation settings carried with a field set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub default_view: ViewMode,
    pub card_config: CardConfig,
    pub table_config: TableConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_view: ViewMode::Card,
            card_config: CardConfig {
                show_description: true,
                show_icon: true,
            },
            table_config: TableConfig {
                compact: false,
                show_icon: true,
            },
        }
    }
}

/// A named, ordered collection of fields applied together as one view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<CustomField>,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub view_config: ViewConfig,
}

impl CustomFieldSet {
    pub fn new(id: impl Into<String>, name: impl Into<String>, fields: Vec<CustomField>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields,
            display_mode: DisplayMode::Card,
            view_config: ViewConfig::default(),
        }
    }

    /// Create a new set named `name` whose fields are copies of `source`'s.
    ///
    /// Copied field ids are prefixed with the new set id so they stay unique
    /// across sets.
    pub fn derive(id: impl Into<String>, name: impl Into<String>, source: Option<&CustomFieldSet>) -> Self {
        let id = id.into();
        let fields = source
            .map(|set| {
                set.fields
                    .iter()
                    .map(|field| CustomField {
                        id: format!("{}-{}", id, field.id),
                        ..field.clone()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id,
            name: name.into(),
            fields,
            display_mode: DisplayMode::Row,
            view_config: ViewConfig {
                default_view: ViewMode::Table,
                ..ViewConfig::default()
            },
        }
    }

    pub fn field(&self, field_id: &str) -> Option<&CustomField> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    pub fn has_active_filters(&self) -> bool {
        self.fields.iter().any(CustomField::has_active_filter)
    }

    pub fn has_active_sorts(&self) -> bool {
        self.fields.iter().any(|f| f.sort_order.is_active())
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Swap the field at `index` with its neighbour; no-op at the edges.
    /// Returns whether anything moved.
    pub fn move_field(&mut self, index: usize, direction: MoveDirection) -> bool {
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1),
        };

        match target {
            Some(target) if index < self.fields.len() && target < self.fields.len() => {
                self.fields.swap(index, target);
                true
            }
            _ => false,
        }
    }

    /// Apply a partial update to the field with `field_id`.
    /// Returns false when no such field exists.
    pub fn update_field(&mut self, field_id: &str, update: &FieldUpdate) -> bool {
        match self.fields.iter_mut().find(|f| f.id == field_id) {
            Some(field) => {
                field.apply(update);
                true
            }
            None => false,
        }
    }

    pub fn set_sort_order(&mut self, field_id: &str, order: SortOrder) -> bool {
        self.update_field(
            field_id,
            &FieldUpdate {
                sort_order: Some(order),
                ..Default::default()
            },
        )
    }

    pub fn set_filter(&mut self, field_id: &str, filter: impl Into<String>) -> bool {
        self.update_field(
            field_id,
            &FieldUpdate {
                filter: Some(filter.into()),
                ..Default::default()
            },
        )
    }

    /// Flip a field's filter on or off. Switching it off clears the filter text.
    pub fn toggle_filter(&mut self, field_id: &str) -> bool {
        let Some(field) = self.field(field_id) else {
            return false;
        };

        let update = FieldUpdate {
            filter_enabled: Some(!field.filter_enabled),
            filter: Some(if field.filter_enabled {
                String::new()
            } else {
                field.filter.clone()
            }),
            ..Default::default()
        };
        self.update_field(field_id, &update)
    }

    pub fn toggle_visibility(&mut self, field_id: &str, mode: ViewMode) -> bool {
        let Some(field) = self.field(field_id) else {
            return false;
        };

        let update = match mode {
            ViewMode::Card => FieldUpdate {
                is_visible_in_card: Some(!field.is_visible_in_card),
                ..Default::default()
            },
            ViewMode::Table => FieldUpdate {
                is_visible_in_row: Some(!field.is_visible_in_row),
                ..Default::default()
            },
        };
        self.update_field(field_id, &update)
    }
}
