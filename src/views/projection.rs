//! One projection for every record table in the dashboard.

use serde::Serialize;
use serde_json::Value;

/// Ordered display schema: `(record key, column label)`
pub type FieldMap = [(&'static str, &'static str)];

pub const TICKET_FIELDS: &FieldMap = &[
    ("id", "ID"),
    ("title", "Title"),
    ("status", "Status"),
    ("priority", "Priority"),
    ("technician_name", "Assigned to"),
    ("created_at", "Created"),
    ("updated_at", "Updated"),
];

pub const USER_FIELDS: &FieldMap = &[
    ("id", "ID"),
    ("name", "Name"),
    ("email", "Email"),
    ("role", "Role"),
    ("registered_at", "Registered"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Value of the record's `id`, used to link the row to its detail page
    pub key: String,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Project records onto `fields`, in schema order.
///
/// A column is kept when at least one record carries the attribute; records
/// lacking it get an empty cell. Attributes outside the schema are ignored.
/// Records that do not serialize to a JSON object contribute no cells.
pub fn project_list<T: Serialize>(records: &[T], fields: &FieldMap) -> Table {
    let objects: Vec<serde_json::Map<String, Value>> = records
        .iter()
        .map(|record| match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        })
        .collect();

    let present: Vec<(&'static str, &'static str)> = fields
        .iter()
        .copied()
        .filter(|(key, _)| objects.iter().any(|o| has_value(o.get(*key))))
        .collect();

    let rows = objects
        .iter()
        .map(|object| Row {
            key: object.get("id").map(cell_text).unwrap_or_default(),
            cells: present
                .iter()
                .map(|(key, _)| object.get(*key).map(cell_text).unwrap_or_default())
                .collect(),
        })
        .collect();

    Table {
        columns: present.iter().map(|(_, label)| *label).collect(),
        rows,
    }
}

fn has_value(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
