//! Input coercion of variables and arguments, result coercion of leaf values.

use apollo_compiler::ast;
use apollo_compiler::executable::Operation;
use apollo_compiler::schema::{ExtendedType, FieldDefinition, Type};
use apollo_compiler::{Node, Schema};
use serde_json::{Number, Value};

use crate::domain::{GraphQLError, JsonMap};
use crate::schema::values::value_to_json;

/// <https://spec.graphql.org/October2021/#CoerceVariableValues()>
///
/// Collects every problem instead of stopping at the first one.
pub fn coerce_variables(
    schema: &Schema,
    operation: &Operation,
    provided: &JsonMap,
) -> Result<JsonMap, Vec<GraphQLError>> {
    let mut coerced = JsonMap::new();
    let mut errors = Vec::new();
    for definition in &operation.variables {
        let name = definition.name.as_str();
        let ty = &*definition.ty;
        match provided.get(name) {
            None => {
                if let Some(default) = &definition.default_value {
                    coerced.insert(name.to_string(), value_to_json(default, None));
                } else if ty.is_non_null() {
                    errors.push(GraphQLError::new(format!(
                        "Variable \"${name}\" of required type \"{ty}\" was not provided."
                    )));
                }
            }
            Some(value) => match coerce_input(schema, ty, value.clone()) {
                Ok(value) => {
                    coerced.insert(name.to_string(), value);
                }
                Err(reason) => errors.push(GraphQLError::new(format!(
                    "Variable \"${name}\" got invalid value {value}; {reason}"
                ))),
            },
        }
    }
    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

/// <https://spec.graphql.org/October2021/#CoerceArgumentValues()>
///
/// Literals were checked by document validation, so only variables need care: an argument
/// bound to a variable that was not provided falls back to the argument default.
pub fn coerce_arguments(
    definition: &FieldDefinition,
    arguments: &[Node<ast::Argument>],
    variables: &JsonMap,
) -> JsonMap {
    let mut coerced = JsonMap::new();
    for argument_definition in &definition.arguments {
        let name = argument_definition.name.as_str();
        let given = arguments
            .iter()
            .find(|argument| argument.name == argument_definition.name)
            .map(|argument| &*argument.value)
            .filter(|value| match value {
                ast::Value::Variable(variable) => variables.contains_key(variable.as_str()),
                _ => true,
            });
        if let Some(value) = given {
            coerced.insert(name.to_string(), value_to_json(value, Some(variables)));
        } else if let Some(default) = &argument_definition.default_value {
            coerced.insert(name.to_string(), value_to_json(default, None));
        }
    }
    coerced
}

/// Coerces a JSON input value to `ty`, applying input object defaults
pub fn coerce_input(schema: &Schema, ty: &Type, value: Value) -> Result<Value, String> {
    if value.is_null() {
        return if ty.is_non_null() {
            Err(format!("expected non-nullable type \"{ty}\" not to be null"))
        } else {
            Ok(Value::Null)
        };
    }
    match ty {
        Type::List(inner) | Type::NonNullList(inner) => match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| coerce_input(schema, inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            // a single item stands for a one-item list
            single => coerce_input(schema, inner, single).map(|item| Value::Array(vec![item])),
        },
        Type::Named(name) | Type::NonNullNamed(name) => match schema.types.get(name) {
            Some(ExtendedType::Scalar(_)) => coerce_scalar_input(name, value),
            Some(ExtendedType::Enum(enum_type)) => match &value {
                Value::String(variant) if enum_type.values.contains_key(variant.as_str()) => {
                    Ok(value)
                }
                _ => Err(format!("Value {value} does not exist in \"{name}\" enum.")),
            },
            Some(ExtendedType::InputObject(input)) => {
                let Value::Object(mut fields) = value else {
                    return Err(format!("Expected type \"{name}\" to be an object."));
                };
                if let Some(unknown) = fields.keys().find(|key| !input.fields.contains_key(key.as_str())) {
                    return Err(format!("Field \"{unknown}\" is not defined by type \"{name}\"."));
                }
                let mut coerced = JsonMap::new();
                for (field_name, field) in &input.fields {
                    match fields.remove(field_name.as_str()) {
                        Some(value) => {
                            coerced.insert(
                                field_name.to_string(),
                                coerce_input(schema, &field.ty, value)?,
                            );
                        }
                        None => {
                            if let Some(default) = &field.default_value {
                                coerced.insert(field_name.to_string(), value_to_json(default, None));
                            } else if field.ty.is_non_null() {
                                return Err(format!(
                                    "Field \"{field_name}\" of required type \"{}\" was not provided.",
                                    field.ty
                                ));
                            }
                        }
                    }
                }
                Ok(Value::Object(coerced))
            }
            _ => Err(format!("\"{name}\" is not an input type.")),
        },
    }
}

fn coerce_scalar_input(name: &str, value: Value) -> Result<Value, String> {
    let ok = match name {
        "Int" => value.as_i64().is_some_and(|int| i32::try_from(int).is_ok()),
        "Float" => value.is_number(),
        "String" => value.is_string(),
        "Boolean" => value.is_boolean(),
        "ID" => {
            if let Some(int) = value.as_i64() {
                return Ok(Value::String(int.to_string()));
            }
            value.is_string()
        }
        _ => true,
    };
    if ok {
        Ok(value)
    } else {
        Err(format!("{name} cannot represent {value}"))
    }
}

/// <https://spec.graphql.org/October2021/#sec-Scalars.Result-Coercion>
///
/// Lenient in the same way as the reference JavaScript implementation: generated values are
/// often strings (e.g. `money`), so numeric strings coerce to numbers and numbers to strings.
/// Custom scalars pass any JSON value through.
pub fn coerce_result(definition: &ExtendedType, value: Value) -> Result<Value, String> {
    match definition {
        ExtendedType::Enum(enum_type) => match value.as_str() {
            Some(variant) if enum_type.values.contains_key(variant) => Ok(value),
            _ => Err(format!(
                "Enum \"{}\" cannot represent value: {value}",
                enum_type.name
            )),
        },
        ExtendedType::Scalar(scalar) => match scalar.name.as_str() {
            "Int" => coerce_int(value),
            "Float" => coerce_float(value),
            "String" => coerce_string(value),
            "Boolean" => coerce_boolean(value),
            "ID" => coerce_id(value),
            _ => Ok(value),
        },
        _ => Err(format!("Expected a leaf type, got {value}")),
    }
}

fn coerce_int(value: Value) -> Result<Value, String> {
    let int = match &value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    };
    let Some(int) = int else {
        return Err(format!("Int cannot represent non-integer value: {value}"));
    };
    if i32::try_from(int).is_err() {
        return Err(format!(
            "Int cannot represent non 32-bit signed integer value: {value}"
        ));
    }
    Ok(Value::Number(int.into()))
}

fn coerce_float(value: Value) -> Result<Value, String> {
    let float = match &value {
        Value::Number(_) => return Ok(value),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };
    float
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("Float cannot represent non numeric value: {value}"))
}

fn coerce_string(value: Value) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value),
        Value::Number(number) => Ok(Value::String(number.to_string())),
        Value::Bool(flag) => Ok(Value::String(flag.to_string())),
        other => Err(format!("String cannot represent value: {other}")),
    }
}

fn coerce_boolean(value: Value) -> Result<Value, String> {
    match &value {
        Value::Bool(_) => Ok(value),
        Value::Number(number) => Ok(Value::Bool(number.as_f64() != Some(0.0))),
        _ => Err(format!("Boolean cannot represent a non boolean value: {value}")),
    }
}

fn coerce_id(value: Value) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value),
        Value::Number(number) if number.is_i64() || number.is_u64() => {
            Ok(Value::String(number.to_string()))
        }
        other => Err(format!("ID cannot represent value: {other}")),
    }
}
