//! `__schema` and `__type` answered from the Working Schema.
//!
//! Introspection objects are produced lazily: each one is an [`ObjectValue`] carrying hidden
//! `$`-prefixed keys that locate the schema element it describes. Their fields are computed
//! when selected, so cyclic type graphs are never materialized.

use apollo_compiler::ast::{self, DirectiveList, InputValueDefinition};
use apollo_compiler::schema::{ExtendedType, FieldDefinition};
use apollo_compiler::Node;
use serde_json::Value;

use crate::domain::{JsonMap, ObjectValue, RootValue};
use crate::schema::WorkingSchema;

const TYPE: &str = "$type";
const OWNER: &str = "$owner";
const FIELD: &str = "$field";
const ARGUMENT: &str = "$arg";
const DIRECTIVE: &str = "$directive";
const ENUM_VALUE: &str = "$value";

/// Value of the `__schema` meta field
pub fn schema_root() -> RootValue {
    RootValue::Object(ObjectValue::new())
}

/// Value of the `__type(name:)` meta field
pub fn type_root(schema: &WorkingSchema, name: Option<&str>) -> RootValue {
    match name {
        Some(name) if schema.schema.types.contains_key(name) => type_ref(name),
        _ => RootValue::null(),
    }
}

/// Resolves `field_name` on an introspection object of type `type_name`
pub fn resolve(
    schema: &WorkingSchema,
    type_name: &str,
    source: &ObjectValue,
    field_name: &str,
    arguments: &JsonMap,
) -> RootValue {
    let include_deprecated = arguments
        .get("includeDeprecated")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let resolver = Introspector {
        schema,
        source,
        include_deprecated,
    };
    let resolved = match type_name {
        "__Schema" => resolver.schema_field(field_name),
        "__Type" => resolver.type_field(field_name),
        "__Field" => resolver.field_field(field_name),
        "__InputValue" => resolver.input_value_field(field_name),
        "__EnumValue" => resolver.enum_value_field(field_name),
        "__Directive" => resolver.directive_field(field_name),
        _ => None,
    };
    resolved.unwrap_or_else(RootValue::null)
}

struct Introspector<'a> {
    schema: &'a WorkingSchema,
    source: &'a ObjectValue,
    include_deprecated: bool,
}

impl Introspector<'_> {
    fn hidden(&self, key: &str) -> Option<&str> {
        match self.source.fields.get(key) {
            Some(RootValue::Leaf(Value::String(value))) => Some(value),
            _ => None,
        }
    }

    fn schema_field(&self, field_name: &str) -> Option<RootValue> {
        let schema = &self.schema.schema;
        let root = |operation| self.schema.root_type(operation).map(type_ref);
        match field_name {
            "description" => description(schema.schema_definition.description.as_ref()),
            "types" => Some(RootValue::List(
                schema.types.keys().map(|name| type_ref(name)).collect(),
            )),
            "queryType" => root(ast::OperationType::Query),
            "mutationType" => root(ast::OperationType::Mutation),
            "subscriptionType" => root(ast::OperationType::Subscription),
            "directives" => Some(RootValue::List(
                schema
                    .directive_definitions
                    .keys()
                    .map(|name| reference(&[(DIRECTIVE, name.as_str())]))
                    .collect(),
            )),
            _ => None,
        }
    }

    fn type_field(&self, field_name: &str) -> Option<RootValue> {
        let notation = self.hidden(TYPE)?;
        if let Some(inner) = notation.strip_suffix('!') {
            return match field_name {
                "kind" => leaf("NON_NULL"),
                "ofType" => Some(type_ref(inner)),
                _ => None,
            };
        }
        if let Some(inner) = notation
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return match field_name {
                "kind" => leaf("LIST"),
                "ofType" => Some(type_ref(inner)),
                _ => None,
            };
        }

        let name = notation;
        let definition = self.schema.schema.types.get(name)?;
        match field_name {
            "kind" => leaf(kind(definition)),
            "name" => leaf(name),
            "description" => description(definition.description()),
            "specifiedByURL" | "specifiedByUrl" => match definition {
                ExtendedType::Scalar(scalar) => scalar
                    .directives
                    .iter()
                    .find(|directive| directive.name == "specifiedBy")
                    .and_then(|directive| string_argument(&directive.arguments, "url"))
                    .and_then(leaf),
                _ => None,
            },
            "fields" => {
                let fields = match definition {
                    ExtendedType::Object(object) => &object.fields,
                    ExtendedType::Interface(interface) => &interface.fields,
                    _ => return None,
                };
                Some(RootValue::List(
                    fields
                        .values()
                        .filter(|field| self.include_deprecated || !is_deprecated(&field.directives))
                        .map(|field| reference(&[(OWNER, name), (FIELD, field.name.as_str())]))
                        .collect(),
                ))
            }
            "interfaces" => {
                let interfaces = match definition {
                    ExtendedType::Object(object) => &object.implements_interfaces,
                    ExtendedType::Interface(interface) => &interface.implements_interfaces,
                    _ => return None,
                };
                Some(RootValue::List(
                    interfaces.iter().map(|interface| type_ref(&interface.name)).collect(),
                ))
            }
            "possibleTypes" => match definition {
                ExtendedType::Interface(_) | ExtendedType::Union(_) => Some(RootValue::List(
                    self.schema
                        .possible_types(name)
                        .iter()
                        .map(|possible| type_ref(possible))
                        .collect(),
                )),
                _ => None,
            },
            "enumValues" => match definition {
                ExtendedType::Enum(enum_type) => Some(RootValue::List(
                    enum_type
                        .values
                        .values()
                        .filter(|value| self.include_deprecated || !is_deprecated(&value.directives))
                        .map(|value| reference(&[(OWNER, name), (ENUM_VALUE, value.value.as_str())]))
                        .collect(),
                )),
                _ => None,
            },
            "inputFields" => match definition {
                ExtendedType::InputObject(input) => Some(RootValue::List(
                    input
                        .fields
                        .values()
                        .filter(|field| self.include_deprecated || !is_deprecated(&field.directives))
                        .map(|field| reference(&[(OWNER, name), (ARGUMENT, field.name.as_str())]))
                        .collect(),
                )),
                _ => None,
            },
            "isOneOf" => match definition {
                ExtendedType::InputObject(input) => Some(RootValue::Leaf(Value::Bool(
                    input.directives.iter().any(|directive| directive.name == "oneOf"),
                ))),
                _ => None,
            },
            _ => None,
        }
    }

    fn field_definition(&self) -> Option<&Node<FieldDefinition>> {
        let owner = self.hidden(OWNER)?;
        let field = self.hidden(FIELD)?;
        match self.schema.schema.types.get(owner)? {
            ExtendedType::Object(object) => object.fields.get(field).map(|c| &c.node),
            ExtendedType::Interface(interface) => interface.fields.get(field).map(|c| &c.node),
            _ => None,
        }
    }

    fn field_field(&self, field_name: &str) -> Option<RootValue> {
        let field = self.field_definition()?;
        match field_name {
            "name" => leaf(&field.name),
            "description" => description(field.description.as_ref()),
            "args" => Some(self.arguments(&field.arguments, |argument| {
                let owner = self.hidden(OWNER).unwrap_or_default();
                reference(&[(OWNER, owner), (FIELD, field.name.as_str()), (ARGUMENT, argument)])
            })),
            "type" => Some(type_ref(&field.ty.to_string())),
            "isDeprecated" => Some(RootValue::Leaf(Value::Bool(is_deprecated(&field.directives)))),
            "deprecationReason" => deprecation_reason(&field.directives).and_then(leaf),
            _ => None,
        }
    }

    fn arguments(
        &self,
        arguments: &[Node<InputValueDefinition>],
        make: impl Fn(&str) -> RootValue,
    ) -> RootValue {
        RootValue::List(
            arguments
                .iter()
                .filter(|argument| self.include_deprecated || !is_deprecated(&argument.directives))
                .map(|argument| make(&argument.name))
                .collect(),
        )
    }

    /// Field argument, directive argument or input object field
    fn input_value(&self) -> Option<&Node<InputValueDefinition>> {
        let name = self.hidden(ARGUMENT)?;
        if let Some(directive) = self.hidden(DIRECTIVE) {
            let definition = self.schema.schema.directive_definitions.get(directive)?;
            return definition.arguments.iter().find(|argument| argument.name == name);
        }
        if self.hidden(FIELD).is_some() {
            let field = self.field_definition()?;
            return field.arguments.iter().find(|argument| argument.name == name);
        }
        match self.schema.schema.types.get(self.hidden(OWNER)?)? {
            ExtendedType::InputObject(input) => input.fields.get(name).map(|c| &c.node),
            _ => None,
        }
    }

    fn input_value_field(&self, field_name: &str) -> Option<RootValue> {
        let input = self.input_value()?;
        match field_name {
            "name" => leaf(&input.name),
            "description" => description(input.description.as_ref()),
            "type" => Some(type_ref(&input.ty.to_string())),
            "defaultValue" => input
                .default_value
                .as_ref()
                .and_then(|value| leaf(&value.to_string())),
            "isDeprecated" => Some(RootValue::Leaf(Value::Bool(is_deprecated(&input.directives)))),
            "deprecationReason" => deprecation_reason(&input.directives).and_then(leaf),
            _ => None,
        }
    }

    fn enum_value_field(&self, field_name: &str) -> Option<RootValue> {
        let ExtendedType::Enum(enum_type) = self.schema.schema.types.get(self.hidden(OWNER)?)? else {
            return None;
        };
        let value = enum_type.values.get(self.hidden(ENUM_VALUE)?)?;
        match field_name {
            "name" => leaf(&value.value),
            "description" => description(value.description.as_ref()),
            "isDeprecated" => Some(RootValue::Leaf(Value::Bool(is_deprecated(&value.directives)))),
            "deprecationReason" => deprecation_reason(&value.directives).and_then(leaf),
            _ => None,
        }
    }

    fn directive_field(&self, field_name: &str) -> Option<RootValue> {
        let name = self.hidden(DIRECTIVE)?;
        let definition = self.schema.schema.directive_definitions.get(name)?;
        match field_name {
            "name" => leaf(&definition.name),
            "description" => description(definition.description.as_ref()),
            "locations" => Some(RootValue::List(
                definition
                    .locations
                    .iter()
                    .map(|location| RootValue::Leaf(Value::String(location.name().to_string())))
                    .collect(),
            )),
            "args" => Some(self.arguments(&definition.arguments, |argument| {
                reference(&[(DIRECTIVE, name), (ARGUMENT, argument)])
            })),
            "isRepeatable" => Some(RootValue::Leaf(Value::Bool(definition.repeatable))),
            _ => None,
        }
    }
}

/// `__Type` object for a type reference in SDL notation, e.g. `[Pet!]!`
fn type_ref(reference: &str) -> RootValue {
    self::reference(&[(TYPE, reference)])
}

fn reference(keys: &[(&str, &str)]) -> RootValue {
    let mut object = ObjectValue::new();
    for (key, value) in keys {
        object
            .fields
            .insert(key.to_string(), RootValue::Leaf(Value::String(value.to_string())));
    }
    RootValue::Object(object)
}

fn leaf(value: &str) -> Option<RootValue> {
    Some(RootValue::Leaf(Value::String(value.to_string())))
}

fn description(description: Option<&Node<str>>) -> Option<RootValue> {
    description.and_then(|text| leaf(text))
}

fn kind(definition: &ExtendedType) -> &'static str {
    match definition {
        ExtendedType::Scalar(_) => "SCALAR",
        ExtendedType::Object(_) => "OBJECT",
        ExtendedType::Interface(_) => "INTERFACE",
        ExtendedType::Union(_) => "UNION",
        ExtendedType::Enum(_) => "ENUM",
        ExtendedType::InputObject(_) => "INPUT_OBJECT",
    }
}

fn string_argument<'a>(arguments: &'a [Node<ast::Argument>], name: &str) -> Option<&'a str> {
    arguments
        .iter()
        .find(|argument| argument.name == name)
        .and_then(|argument| argument.value.as_str())
}

fn is_deprecated(directives: &DirectiveList) -> bool {
    directives.iter().any(|directive| directive.name == "deprecated")
}

fn deprecation_reason(directives: &DirectiveList) -> Option<&str> {
    let directive = directives
        .iter()
        .find(|directive| directive.name == "deprecated")?;
    Some(string_argument(&directive.arguments, "reason").unwrap_or("No longer supported"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MergeOptions;
    use serde_json::json;

    const SDL: &str = r#"
        type Query {
          pets: [Pet!]!
          old: String @deprecated(reason: "use pets")
        }

        union Pet = Cat | Dog
        type Cat { name: String }
        type Dog { name: String }
    "#;

    fn schema() -> WorkingSchema {
        WorkingSchema::build(SDL.to_string(), None, MergeOptions::default()).unwrap()
    }

    fn object(value: RootValue) -> ObjectValue {
        match value {
            RootValue::Object(object) => object,
            other => panic!("expected an object, got {other:?}"),
        }
    }

    #[test]
    fn test_wrapped_type_references_unwrap() {
        let schema = schema();
        let non_null = object(type_ref("[Pet!]!"));
        let no_args = JsonMap::new();

        assert_eq!(resolve(&schema, "__Type", &non_null, "kind", &no_args).to_json(), json!("NON_NULL"));
        let list = object(resolve(&schema, "__Type", &non_null, "ofType", &no_args));
        assert_eq!(resolve(&schema, "__Type", &list, "kind", &no_args).to_json(), json!("LIST"));
        let item = object(resolve(&schema, "__Type", &list, "ofType", &no_args));
        let named = object(resolve(&schema, "__Type", &item, "ofType", &no_args));
        assert_eq!(resolve(&schema, "__Type", &named, "name", &no_args).to_json(), json!("Pet"));
        assert_eq!(resolve(&schema, "__Type", &named, "kind", &no_args).to_json(), json!("UNION"));
    }

    #[test]
    fn test_deprecated_fields_are_filtered_unless_requested() {
        let schema = schema();
        let query = object(type_root(&schema, Some("Query")));
        let count = |include: bool| {
            let mut arguments = JsonMap::new();
            arguments.insert("includeDeprecated".into(), json!(include));
            match resolve(&schema, "__Type", &query, "fields", &arguments) {
                RootValue::List(fields) => fields.len(),
                other => panic!("expected a list, got {other:?}"),
            }
        };
        assert_eq!(count(false), 1);
        assert_eq!(count(true), 2);
    }

    #[test]
    fn test_unknown_type_is_null() {
        let schema = schema();
        assert!(type_root(&schema, Some("Nope")).is_null());
        assert!(type_root(&schema, None).is_null());
    }
}
