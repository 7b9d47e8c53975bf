use std::collections::HashMap;

use serde::de::{DeserializeOwned, Error as DeError};
use serde::ser::Error as SerError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::FirestoreError;

/// Document as the REST API sends it. `fields` is absent for documents
/// without any fields.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    pub create_time: String,
    pub update_time: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(flatten)]
    pub value_type: ValueType,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    StringValue(String),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    BooleanValue(bool),
    MapValue(MapValue),
    ArrayValue(ArrayValue),
    NullValue(()),
    TimestampValue(String),
    GeoPointValue(GeoPoint),
    BytesValue(String), // base64 encoded
    ReferenceValue(String),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MapValue {
    pub fields: HashMap<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ArrayValue {
    pub values: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// An empty collection comes back as `{}`, without a `documents` key.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    pub next_page_token: Option<String>,
}

/// Plain JSON shape of a document's fields, with the wire tagging folded
/// away.
pub type DocumentData = Map<String, JsonValue>;

/// A fetched document reduced to its id, plain JSON data and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentItem {
    /// Last segment of the resource name.
    pub id: String,
    /// Full resource name, `projects/{p}/databases/(default)/documents/...`.
    pub name: String,
    pub data: DocumentData,
    pub create_time: String,
    pub update_time: String,
}

impl DocumentItem {
    /// Deserializes the document data into a concrete type.
    pub fn to<T: DeserializeOwned>(&self) -> Result<T, FirestoreError> {
        Ok(serde_json::from_value(JsonValue::Object(
            self.data.clone(),
        ))?)
    }
}

impl TryFrom<Document> for DocumentItem {
    type Error = FirestoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let id = doc
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let data = fields_to_data(doc.fields)?;

        Ok(Self {
            id,
            name: doc.name,
            data,
            create_time: doc.create_time,
            update_time: doc.update_time,
        })
    }
}

pub fn fields_to_data(fields: HashMap<String, Value>) -> Result<DocumentData, FirestoreError> {
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key, value_to_json(value)?);
    }
    Ok(map)
}

fn value_to_json(value: Value) -> Result<JsonValue, FirestoreError> {
    use serde_json::json;
    Ok(match value.value_type {
        ValueType::StringValue(s) => JsonValue::String(s),
        ValueType::IntegerValue(s) => {
            let i: i64 = s.parse().map_err(|e| {
                <serde_json::Error as DeError>::custom(format!(
                    "Failed to parse integer string '{}': {}",
                    s, e
                ))
            })?;
            JsonValue::Number(i.into())
        }
        ValueType::DoubleValue(d) => JsonValue::Number(
            serde_json::Number::from_f64(d).ok_or_else(|| {
                <serde_json::Error as DeError>::custom(format!("Invalid f64 value: {}", d))
            })?,
        ),
        ValueType::BooleanValue(b) => JsonValue::Bool(b),
        ValueType::MapValue(map_value) => JsonValue::Object(fields_to_data(map_value.fields)?),
        ValueType::ArrayValue(array_value) => {
            let values = array_value
                .values
                .into_iter()
                .map(value_to_json)
                .collect::<Result<Vec<_>, _>>()?;
            JsonValue::Array(values)
        }
        ValueType::NullValue(_) => JsonValue::Null,
        ValueType::TimestampValue(s) => JsonValue::String(s),
        ValueType::GeoPointValue(gp) => {
            json!({ "latitude": gp.latitude, "longitude": gp.longitude })
        }
        ValueType::BytesValue(s) => JsonValue::String(s),
        ValueType::ReferenceValue(s) => JsonValue::String(s),
    })
}

/// Converts any serializable value into the tagged field map a write
/// request wants. Only objects can be stored as documents.
pub fn fields_from_serializable<T: Serialize>(
    value: &T,
) -> Result<HashMap<String, Value>, FirestoreError> {
    let serde_value = serde_json::to_value(value)?;
    if let JsonValue::Object(map) = serde_value {
        let mut fields = HashMap::new();
        for (k, v) in map {
            fields.insert(k, json_to_value(v)?);
        }
        Ok(fields)
    } else {
        Err(FirestoreError::SerializationError(SerError::custom(
            "Can only set objects as documents",
        )))
    }
}

fn json_to_value(value: JsonValue) -> Result<Value, FirestoreError> {
    let value_type = match value {
        JsonValue::Null => ValueType::NullValue(()),
        JsonValue::Bool(b) => ValueType::BooleanValue(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                ValueType::IntegerValue(i.to_string())
            } else if let Some(f) = n.as_f64() {
                ValueType::DoubleValue(f)
            } else {
                return Err(FirestoreError::SerializationError(SerError::custom(
                    format!("Unsupported number type: {}", n),
                )));
            }
        }
        JsonValue::String(s) => ValueType::StringValue(s),
        JsonValue::Array(a) => {
            let values = a
                .into_iter()
                .map(json_to_value)
                .collect::<Result<Vec<_>, _>>()?;
            ValueType::ArrayValue(ArrayValue { values })
        }
        JsonValue::Object(o) => {
            let mut fields = HashMap::new();
            for (k, v) in o {
                fields.insert(k, json_to_value(v)?);
            }
            ValueType::MapValue(MapValue { fields })
        }
    };
    Ok(Value { value_type })
}
