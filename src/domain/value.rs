//! The per-request root value tree handed to the local executor.

use indexmap::IndexMap;
use serde_json::Value;

use super::JsonMap;

/// Stand-in for a field that failed upstream
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMarker {
    pub message: String,
    pub extensions: Option<JsonMap>,
}

/// A node of the root value tree.
///
/// `Leaf` holds scalars, enum names and `null`. Objects coming from `@examples` are pinned:
/// they are keyed by schema field name rather than by response key.
#[derive(Debug, Clone, PartialEq)]
pub enum RootValue {
    Leaf(Value),
    List(Vec<RootValue>),
    Object(ObjectValue),
    Error(ErrorMarker),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectValue {
    pub fields: IndexMap<String, RootValue>,
    pub pinned: bool,
}

/// Outcome of looking up a requested field in a source object
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Present(&'a RootValue),
    Error(&'a ErrorMarker),
    Absent,
}

impl RootValue {
    pub fn null() -> Self {
        RootValue::Leaf(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RootValue::Leaf(Value::Null))
    }

    /// Converts a literal `@examples` value; objects inside it become pinned
    pub fn pinned(value: Value) -> Self {
        Self::from_json(value, true)
    }

    fn from_json(value: Value, pinned: bool) -> Self {
        match value {
            Value::Object(map) => RootValue::Object(ObjectValue {
                fields: map
                    .into_iter()
                    .map(|(key, value)| (key, Self::from_json(value, pinned)))
                    .collect(),
                pinned,
            }),
            Value::Array(items) => RootValue::List(
                items
                    .into_iter()
                    .map(|item| Self::from_json(item, pinned))
                    .collect(),
            ),
            other => RootValue::Leaf(other),
        }
    }

    /// Plain JSON view of the subtree, used for custom scalars. Error markers become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            RootValue::Leaf(value) => value.clone(),
            RootValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            RootValue::Object(object) => Value::Object(
                object
                    .fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            RootValue::Error(_) => Value::Null,
        }
    }

    /// Turns this node into an object, replacing whatever it held before
    pub fn make_object(&mut self) -> &mut ObjectValue {
        if !matches!(self, RootValue::Object(_)) {
            *self = RootValue::Object(ObjectValue::default());
        }
        match self {
            RootValue::Object(object) => object,
            _ => unreachable!("node was just replaced with an object"),
        }
    }

    /// Turns this node into a list, replacing whatever it held before
    pub fn make_list(&mut self) -> &mut Vec<RootValue> {
        if !matches!(self, RootValue::List(_)) {
            *self = RootValue::List(Vec::new());
        }
        match self {
            RootValue::List(items) => items,
            _ => unreachable!("node was just replaced with a list"),
        }
    }
}

impl From<Value> for RootValue {
    /// Upstream data: objects are not pinned and are looked up by response key
    fn from(value: Value) -> Self {
        Self::from_json(value, false)
    }
}

impl ObjectValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_typename(type_name: &str) -> Self {
        let mut object = Self::default();
        object.fields.insert(
            "__typename".to_string(),
            RootValue::Leaf(Value::String(type_name.to_string())),
        );
        object
    }

    pub fn typename(&self) -> Option<&str> {
        match self.fields.get("__typename") {
            Some(RootValue::Leaf(Value::String(name))) => Some(name),
            _ => None,
        }
    }

    /// Looks a requested field up by response key. Pinned examples are keyed by schema field
    /// name, so they are searched by field name first.
    pub fn lookup(&self, field_name: &str, response_key: &str) -> FieldValue<'_> {
        let found = if self.pinned {
            self.fields
                .get(field_name)
                .or_else(|| self.fields.get(response_key))
        } else {
            self.fields.get(response_key)
        };
        match found {
            Some(RootValue::Error(marker)) => FieldValue::Error(marker),
            Some(value) => FieldValue::Present(value),
            None => FieldValue::Absent,
        }
    }
}

impl From<JsonMap> for ObjectValue {
    fn from(map: JsonMap) -> Self {
        match RootValue::from(Value::Object(map)) {
            RootValue::Object(object) => object,
            _ => ObjectValue::default(),
        }
    }
}
