//! Common types and helpers shared across models.

use serde::{Deserialize, Deserializer, Serializer};

/// Backend identifier of a ticket
pub type TicketId = i64;

/// Backend identifier of a user account
pub type UserId = i64;

/// Enumerations mirrored from the backend.
///
/// `label` is what the dashboard shows, `wire_label` is what the backend
/// stores and expects in request bodies.
pub trait WireLabel {
    fn label(&self) -> &'static str;
    fn wire_label(&self) -> &'static str;
}

/// Normalize a backend label for lenient matching: lowercase, accents folded,
/// separators collapsed to single spaces.
pub fn normalize_label(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'à' | 'â' => 'a',
            'ô' => 'o',
            'î' | 'ï' => 'i',
            'ù' | 'û' => 'u',
            '_' | '-' => ' ',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Serialize an enum with its backend label
pub fn as_wire<T: WireLabel, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.wire_label())
}

/// Serialize an optional enum with its backend label
pub fn as_wire_opt<T: WireLabel, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_str(v.wire_label()),
        None => serializer.serialize_none(),
    }
}

/// Accept a count sent either as a JSON number or as a numeric string.
///
/// MySQL aggregates (`SUM`, `COUNT`) come back as decimal strings through
/// some drivers.
pub fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| f.max(0.0) as u64)
            .unwrap_or(0),
        _ => 0,
    })
}

/// Same as [`lenient_u64`] for fractional values
pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}
