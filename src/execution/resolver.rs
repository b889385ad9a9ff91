use std::cell::RefCell;

use apollo_compiler::schema::FieldDefinition;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::debug;

use crate::domain::{ErrorMarker, FakerError, FieldValue, JsonMap, ObjectValue, RootValue};
use crate::faker::{is_relay_mutation, FakerSettings, Synthesizer};
use crate::schema::WorkingSchema;

/// A failed field. Turned into a response error located at the field's path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub message: String,
    pub extensions: Option<JsonMap>,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: None,
        }
    }
}

impl From<&ErrorMarker> for FieldError {
    fn from(marker: &ErrorMarker) -> Self {
        Self {
            message: marker.message.clone(),
            extensions: marker.extensions.clone(),
        }
    }
}

impl From<FakerError> for FieldError {
    fn from(error: FakerError) -> Self {
        Self::new(error.to_string())
    }
}

/// What the executor knows about the field being resolved
pub struct ResolveInfo<'a> {
    pub schema: &'a WorkingSchema,
    pub parent_type: &'a str,
    pub field_name: &'a str,
    pub response_key: &'a str,
    pub definition: &'a FieldDefinition,
    /// Coerced argument values
    pub arguments: &'a JsonMap,
}

/// Field and type resolution hooks used by [`execute`](super::execute)
pub trait Resolver {
    /// Resolves one field of `source`. The value is completed against the field type afterwards.
    fn resolve_field(
        &self,
        source: &ObjectValue,
        info: &ResolveInfo<'_>,
    ) -> Result<RootValue, FieldError>;

    /// Concrete object type of `value` where an abstract type is expected
    fn resolve_type(&self, value: &ObjectValue, abstract_type: &str) -> Option<String> {
        let _ = abstract_type;
        value.typename().map(str::to_string)
    }
}

/// Reads real values from the root value tree and synthesizes whatever is absent.
///
/// * an error marker fails the field with the upstream message and extensions
/// * a present value is used as-is
/// * an absent value is synthesized from the field type and its directives
///
/// Relay mutation fields echo their `input` argument merged with the upstream value.
pub struct FakeResolver<'a> {
    schema: &'a WorkingSchema,
    synthesizer: Synthesizer<'a>,
    rng: RefCell<StdRng>,
}

impl<'a> FakeResolver<'a> {
    pub fn new(schema: &'a WorkingSchema, settings: &'a FakerSettings, rng: StdRng) -> Self {
        Self {
            schema,
            synthesizer: Synthesizer::new(schema, settings),
            rng: RefCell::new(rng),
        }
    }
}

impl Resolver for FakeResolver<'_> {
    fn resolve_field(
        &self,
        source: &ObjectValue,
        info: &ResolveInfo<'_>,
    ) -> Result<RootValue, FieldError> {
        let existing = match source.lookup(info.field_name, info.response_key) {
            FieldValue::Error(marker) => return Err(marker.into()),
            FieldValue::Present(value) => Some(value),
            FieldValue::Absent => None,
        };

        if is_relay_mutation(&self.schema.schema, info.parent_type, info.definition) {
            return Ok(relay_echo(info.arguments, existing));
        }
        if let Some(value) = existing {
            return Ok(value.clone());
        }

        let mut rng = self.rng.borrow_mut();
        self.synthesizer
            .synthesize(&info.definition.ty, info.definition, info.parent_type, &mut *rng)
            .map_err(|error| {
                debug!(
                    field = %format!("{}.{}", info.parent_type, info.field_name),
                    %error,
                    "Synthesis failed"
                );
                FieldError::from(error)
            })
    }

    fn resolve_type(&self, value: &ObjectValue, abstract_type: &str) -> Option<String> {
        if let Some(name) = value.typename() {
            return Some(name.to_string());
        }
        self.schema
            .possible_types(abstract_type)
            .choose(&mut *self.rng.borrow_mut())
            .map(|name| name.to_string())
    }
}

/// `input` fields overlaid with the fields of the upstream object, upstream winning
fn relay_echo(arguments: &JsonMap, existing: Option<&RootValue>) -> RootValue {
    let mut echo = match arguments.get("input") {
        Some(Value::Object(input)) => ObjectValue::from(input.clone()),
        _ => ObjectValue::new(),
    };
    if let Some(RootValue::Object(upstream)) = existing {
        echo.fields
            .extend(upstream.fields.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
    RootValue::Object(echo)
}
