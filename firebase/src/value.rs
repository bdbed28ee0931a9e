//! Firestore REST document and value types, plus JSON conversion.
//!
//! Firestore wraps every field in a one-key object naming its type
//! (`{"stringValue": "x"}`, `{"integerValue": "42"}`). Application code works
//! with plain `serde_json` values; [`fields_from_json`] and [`fields_to_json`]
//! translate at the boundary.

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};

/// Document field map.
pub type Fields = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "nullValue")]
    Null(()),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    /// Firestore sends 64-bit integers as strings.
    #[serde(rename = "integerValue")]
    Integer(String),
    #[serde(rename = "doubleValue")]
    Double(f64),
    /// RFC 3339 timestamp.
    #[serde(rename = "timestampValue")]
    Timestamp(String),
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "bytesValue")]
    Bytes(String),
    #[serde(rename = "referenceValue")]
    Reference(String),
    #[serde(rename = "geoPointValue")]
    GeoPoint(GeoPoint),
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
    #[serde(rename = "mapValue")]
    Map(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Fields>,
}

impl Value {
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    #[must_use]
    pub fn timestamp(rfc3339: impl Into<String>) -> Self {
        Self::Timestamp(rfc3339.into())
    }

    #[must_use]
    pub fn empty_array() -> Self {
        Self::Array(ArrayValue { values: Some(Vec::new()) })
    }

    /// Typed Firestore value for a JSON value. Integral numbers become
    /// `integerValue`, all other numbers `doubleValue`.
    #[must_use]
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Self::Null(()),
            Json::Bool(b) => Self::Boolean(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i.to_string()),
                None => Self::Double(n.as_f64().unwrap_or_default()),
            },
            Json::String(s) => Self::String(s.clone()),
            Json::Array(items) => Self::Array(ArrayValue { values: Some(items.iter().map(Self::from_json).collect()) }),
            Json::Object(map) => Self::Map(MapValue { fields: Some(fields_from_json(map)) }),
        }
    }

    /// Plain JSON for a Firestore value. Timestamps, bytes, and references
    /// become strings; an integer that does not fit `i64` stays a string.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Self::Null(()) => Json::Null,
            Self::Boolean(b) => Json::Bool(*b),
            Self::Integer(s) => s.parse::<i64>().map_or_else(|_| Json::String(s.clone()), Json::from),
            Self::Double(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Timestamp(s) | Self::String(s) | Self::Bytes(s) | Self::Reference(s) => Json::String(s.clone()),
            Self::GeoPoint(p) => serde_json::json!({ "latitude": p.latitude, "longitude": p.longitude }),
            Self::Array(a) => Json::Array(a.values.iter().flatten().map(Self::to_json).collect()),
            Self::Map(m) => Json::Object(m.fields.as_ref().map(fields_to_json).unwrap_or_default()),
        }
    }
}

#[must_use]
pub fn fields_from_json(map: &Map<String, Json>) -> Fields {
    map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect()
}

#[must_use]
pub fn fields_to_json(fields: &Fields) -> Map<String, Json> {
    fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

// =============================================================================
// DOCUMENTS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name: `projects/{p}/databases/{d}/documents/{collection}/{id}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    #[must_use]
    pub fn new(fields: Fields) -> Self {
        Self { name: None, fields, create_time: None, update_time: None }
    }

    /// Document id: the last segment of the resource name.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next()).filter(|id| !id.is_empty())
    }

    #[must_use]
    pub fn to_json(&self) -> Map<String, Json> {
        fields_to_json(&self.fields)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}
