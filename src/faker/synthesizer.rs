use apollo_compiler::ast::OperationType;
use apollo_compiler::schema::{ExtendedType, FieldDefinition, Type};
use apollo_compiler::Schema;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use super::directives::{DirectiveSet, ValueDirective};
use super::generators::{FakeOptions, Generator, Locale};
use super::FakerSettings;
use crate::domain::{FakerError, ObjectValue, RootValue};
use crate::schema::WorkingSchema;

/// Produces a value for a declared output type from the directives in effect.
///
/// Object types yield an empty shell whose fields are resolved one by one by the executor.
/// Abstract types yield a shell tagged with a randomly chosen concrete type.
pub struct Synthesizer<'a> {
    schema: &'a WorkingSchema,
    settings: &'a FakerSettings,
}

impl<'a> Synthesizer<'a> {
    pub fn new(schema: &'a WorkingSchema, settings: &'a FakerSettings) -> Self {
        Self { schema, settings }
    }

    pub fn synthesize<R: Rng>(
        &self,
        ty: &Type,
        field: &FieldDefinition,
        owner: &str,
        rng: &mut R,
    ) -> Result<RootValue, FakerError> {
        let directives = DirectiveSet::for_field(&self.schema.schema, field)?;
        self.synthesize_type(ty, &directives, owner, rng)
    }

    fn synthesize_type<R: Rng>(
        &self,
        ty: &Type,
        directives: &DirectiveSet,
        owner: &str,
        rng: &mut R,
    ) -> Result<RootValue, FakerError> {
        match ty {
            Type::List(inner) | Type::NonNullList(inner) => {
                let len = directives
                    .list_length
                    .unwrap_or(self.settings.list_length)
                    .sample(rng);
                (0..len)
                    .map(|_| self.synthesize_type(inner, directives, owner, rng))
                    .collect::<Result<Vec<_>, _>>()
                    .map(RootValue::List)
            }
            Type::Named(name) | Type::NonNullNamed(name) => {
                self.synthesize_named(name, directives, owner, rng)
            }
        }
    }

    fn synthesize_named<R: Rng>(
        &self,
        name: &str,
        directives: &DirectiveSet,
        owner: &str,
        rng: &mut R,
    ) -> Result<RootValue, FakerError> {
        let Some(definition) = self.schema.schema.types.get(name) else {
            return Err(FakerError::UnsupportedType(name.to_string()));
        };
        match definition {
            ExtendedType::Interface(_) | ExtendedType::Union(_) => {
                let Some(concrete) = self.schema.possible_types(name).choose(rng) else {
                    return Ok(RootValue::null());
                };
                let mut object = ObjectValue::with_typename(concrete);
                if let Some(example) = self.example_object(name, directives, rng)? {
                    object.pinned = true;
                    object.fields.extend(example.fields);
                }
                Ok(RootValue::Object(object))
            }
            ExtendedType::Object(_) => Ok(RootValue::Object(
                self.example_object(name, directives, rng)?
                    .unwrap_or_default(),
            )),
            ExtendedType::Scalar(_) | ExtendedType::Enum(_) => self
                .leaf(name, definition, directives, owner, rng)
                .map(RootValue::Leaf),
            ExtendedType::InputObject(_) => Err(FakerError::UnsupportedType(name.to_string())),
        }
    }

    fn example_object<R: Rng>(
        &self,
        type_name: &str,
        directives: &DirectiveSet,
        rng: &mut R,
    ) -> Result<Option<ObjectValue>, FakerError> {
        let Some(examples) = &directives.examples else {
            return Ok(None);
        };
        match examples.choose(rng) {
            None => Ok(None),
            Some(example @ Value::Object(_)) => match RootValue::pinned(example.clone()) {
                RootValue::Object(object) => Ok(Some(object)),
                _ => Ok(None),
            },
            Some(other) => Err(FakerError::InvalidExamples(format!(
                "examples for {type_name} must be objects, got {other}"
            ))),
        }
    }

    fn leaf<R: Rng>(
        &self,
        name: &str,
        definition: &ExtendedType,
        directives: &DirectiveSet,
        owner: &str,
        rng: &mut R,
    ) -> Result<Value, FakerError> {
        match directives.value_directive() {
            ValueDirective::Examples(examples) => {
                Ok(examples.choose(rng).cloned().unwrap_or(Value::Null))
            }
            ValueDirective::Fake(args) => {
                let generator: Generator = args.generator.parse()?;
                let locale = match &args.locale {
                    Some(locale) => locale.parse::<Locale>()?,
                    None => self.settings.locale,
                };
                let options = FakeOptions::from_map(&args.options)?;
                generator.generate(&options, locale, rng)
            }
            ValueDirective::None => match definition {
                ExtendedType::Enum(enum_type) => Ok(enum_type
                    .values
                    .keys()
                    .collect::<Vec<_>>()
                    .choose(rng)
                    .map(|value| Value::String(value.to_string()))
                    .unwrap_or(Value::Null)),
                _ => Ok(self
                    .settings
                    .types
                    .generate(name, owner, rng)
                    .unwrap_or_else(|| Value::String(format!("<{name}>")))),
            },
        }
    }
}

/// A mutation root field taking exactly one non-null input object `input` and returning an object
pub fn is_relay_mutation(schema: &Schema, owner: &str, field: &FieldDefinition) -> bool {
    let is_mutation_root = schema
        .root_operation(OperationType::Mutation)
        .is_some_and(|root| root.as_str() == owner);
    if !is_mutation_root {
        return false;
    }
    let [input] = field.arguments.as_slice() else {
        return false;
    };
    let takes_input_object = input.name.as_str() == "input"
        && match &*input.ty {
            Type::NonNullNamed(name) => {
                matches!(schema.types.get(name), Some(ExtendedType::InputObject(_)))
            }
            _ => false,
        };
    let returns_object = match &field.ty {
        Type::Named(name) | Type::NonNullNamed(name) => {
            matches!(schema.types.get(name), Some(ExtendedType::Object(_)))
        }
        _ => false,
    };
    takes_input_object && returns_object
}
