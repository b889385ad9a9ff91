use std::collections::HashSet;

use apollo_compiler::ast::{DirectiveList, OperationType};
use apollo_compiler::executable::{Field, Selection, SelectionSet};
use apollo_compiler::schema::{ExtendedType, Type};
use apollo_compiler::validation::Valid;
use apollo_compiler::{ExecutableDocument, Node};
use indexmap::IndexMap;
use serde_json::Value;

use super::resolver::{FieldError, ResolveInfo, Resolver};
use super::{coercion, introspection, select_operation};
use crate::domain::{
    GraphQLError, GraphQLResponse, JsonMap, Location, ObjectValue, PathSegment, RootValue,
};
use crate::schema::values::value_to_json;
use crate::schema::WorkingSchema;

/// A validated document plus the inputs of one execution
pub struct ExecutionRequest<'a> {
    pub schema: &'a WorkingSchema,
    pub document: &'a Valid<ExecutableDocument>,
    pub operation_name: Option<&'a str>,
    pub variables: &'a JsonMap,
}

/// Field errors propagate upwards as this until they reach a nullable position
#[derive(Debug, Clone, Copy)]
struct PropagateNull;

/// <https://spec.graphql.org/October2021/#ExecuteRequest()>
///
/// Queries and mutations run against `root`. Subscriptions are rejected.
pub fn execute(
    request: ExecutionRequest<'_>,
    root: &ObjectValue,
    resolver: &dyn Resolver,
) -> GraphQLResponse {
    let operation = match select_operation(request.document, request.operation_name) {
        Ok(operation) => operation,
        Err(error) => return GraphQLResponse::from_errors(vec![error]),
    };
    if operation.operation_type == OperationType::Subscription {
        return GraphQLResponse::from_errors(vec![GraphQLError::new(
            "Subscriptions are not supported",
        )]);
    }
    let variables =
        match coercion::coerce_variables(&request.schema.schema, operation, request.variables) {
            Ok(variables) => variables,
            Err(errors) => return GraphQLResponse::from_errors(errors),
        };
    let Some(root_type) = request.schema.root_type(operation.operation_type) else {
        return GraphQLResponse::from_errors(vec![GraphQLError::new(format!(
            "Schema does not define a {:?} root type",
            operation.operation_type
        ))]);
    };

    let mut executor = Executor {
        schema: request.schema,
        document: request.document,
        variables: &variables,
        resolver,
        errors: Vec::new(),
    };
    let data = match executor.execute_selection_set(root_type, root, &[&operation.selection_set], &[])
    {
        Ok(map) => Value::Object(map),
        Err(PropagateNull) => Value::Null,
    };
    GraphQLResponse {
        data: Some(data),
        errors: executor.errors,
    }
}

struct Executor<'a> {
    schema: &'a WorkingSchema,
    document: &'a Valid<ExecutableDocument>,
    variables: &'a JsonMap,
    resolver: &'a dyn Resolver,
    errors: Vec<GraphQLError>,
}

impl<'a> Executor<'a> {
    /// <https://spec.graphql.org/October2021/#ExecuteSelectionSet()>
    fn execute_selection_set(
        &mut self,
        object_type: &str,
        source: &ObjectValue,
        selection_sets: &[&'a SelectionSet],
        path: &[PathSegment],
    ) -> Result<JsonMap, PropagateNull> {
        let mut grouped: IndexMap<&'a str, Vec<&'a Node<Field>>> = IndexMap::new();
        let mut visited = HashSet::new();
        for selection_set in selection_sets {
            self.collect_fields(object_type, selection_set, &mut grouped, &mut visited);
        }

        let mut response = JsonMap::new();
        for (response_key, fields) in grouped {
            let value = self.execute_field(object_type, source, &fields, path)?;
            response.insert(response_key.to_string(), value);
        }
        Ok(response)
    }

    /// <https://spec.graphql.org/October2021/#CollectFields()>
    fn collect_fields(
        &self,
        object_type: &str,
        selection_set: &'a SelectionSet,
        grouped: &mut IndexMap<&'a str, Vec<&'a Node<Field>>>,
        visited: &mut HashSet<&'a str>,
    ) {
        let document: &'a Valid<ExecutableDocument> = self.document;
        for selection in &selection_set.selections {
            match selection {
                Selection::Field(field) => {
                    if self.should_include(&field.directives) {
                        grouped
                            .entry(field.response_key().as_str())
                            .or_default()
                            .push(field);
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.directives)
                        || !visited.insert(spread.fragment_name.as_str())
                    {
                        continue;
                    }
                    let Some(fragment) = document.fragments.get(&spread.fragment_name) else {
                        continue;
                    };
                    if self
                        .schema
                        .type_applies(fragment.type_condition(), object_type)
                    {
                        self.collect_fields(object_type, &fragment.selection_set, grouped, visited);
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.directives) {
                        continue;
                    }
                    let applies = inline
                        .type_condition
                        .as_ref()
                        .map_or(true, |condition| self.schema.type_applies(condition, object_type));
                    if applies {
                        self.collect_fields(object_type, &inline.selection_set, grouped, visited);
                    }
                }
            }
        }
    }

    /// `@skip(if:)` and `@include(if:)`
    fn should_include(&self, directives: &DirectiveList) -> bool {
        let condition = |name: &str| {
            directives
                .iter()
                .find(|directive| directive.name == name)
                .and_then(|directive| {
                    directive
                        .arguments
                        .iter()
                        .find(|argument| argument.name == "if")
                })
                .map(|argument| value_to_json(&argument.value, Some(self.variables)) == Value::Bool(true))
        };
        condition("skip") != Some(true) && condition("include") != Some(false)
    }

    /// <https://spec.graphql.org/October2021/#ExecuteField()>
    fn execute_field(
        &mut self,
        object_type: &str,
        source: &ObjectValue,
        fields: &[&'a Node<Field>],
        parent_path: &[PathSegment],
    ) -> Result<Value, PropagateNull> {
        let field = fields[0];
        let mut path = parent_path.to_vec();
        path.push(PathSegment::Key(field.response_key().to_string()));

        let field_name = field.name.as_str();
        if field_name == "__typename" {
            return Ok(Value::String(object_type.to_string()));
        }

        let arguments =
            coercion::coerce_arguments(&field.definition, &field.arguments, self.variables);
        let resolved = match field_name {
            "__schema" => Ok(introspection::schema_root()),
            "__type" => Ok(introspection::type_root(
                self.schema,
                arguments.get("name").and_then(Value::as_str),
            )),
            _ if object_type.starts_with("__") => Ok(introspection::resolve(
                self.schema,
                object_type,
                source,
                field_name,
                &arguments,
            )),
            _ => self.resolver.resolve_field(
                source,
                &ResolveInfo {
                    schema: self.schema,
                    parent_type: object_type,
                    field_name,
                    response_key: field.response_key().as_str(),
                    definition: &field.definition,
                    arguments: &arguments,
                },
            ),
        };

        let ty = &field.definition.ty;
        let completed = match resolved {
            Ok(value) => self.complete_value(ty, value, fields, &path),
            Err(error) => Err(self.field_error(error, fields, &path)),
        };
        try_nullify(ty, completed)
    }

    /// <https://spec.graphql.org/October2021/#CompleteValue()>
    fn complete_value(
        &mut self,
        ty: &Type,
        value: RootValue,
        fields: &[&'a Node<Field>],
        path: &[PathSegment],
    ) -> Result<Value, PropagateNull> {
        let value = match value {
            RootValue::Error(marker) => return Err(self.field_error((&marker).into(), fields, path)),
            value if value.is_null() => {
                return if ty.is_non_null() {
                    Err(self.error(format!("Non-null type {ty} resolved to null"), fields, path))
                } else {
                    Ok(Value::Null)
                };
            }
            value => value,
        };

        let type_name = match ty {
            Type::List(inner) | Type::NonNullList(inner) => {
                let RootValue::List(items) = value else {
                    return Err(self.error(
                        format!("Expected a list for type {ty}, got {}", value.to_json()),
                        fields,
                        path,
                    ));
                };
                let mut completed = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let mut item_path = path.to_vec();
                    item_path.push(PathSegment::Index(index));
                    let result = self.complete_value(inner, item, fields, &item_path);
                    // a failed non-null item nullifies the whole list
                    completed.push(try_nullify(inner, result)?);
                }
                return Ok(Value::Array(completed));
            }
            Type::Named(name) | Type::NonNullNamed(name) => name,
        };

        let schema = self.schema;
        let Some(definition) = schema.schema.types.get(type_name) else {
            return Err(self.error(format!("Undefined type {type_name}"), fields, path));
        };
        match definition {
            ExtendedType::Scalar(_) | ExtendedType::Enum(_) => {
                let is_builtin = matches!(definition, ExtendedType::Scalar(scalar) if scalar.is_built_in());
                if is_builtin || matches!(definition, ExtendedType::Enum(_)) {
                    if let RootValue::List(_) | RootValue::Object(_) = value {
                        return Err(self.error(
                            format!("Expected a single value for type {type_name}, got {}", value.to_json()),
                            fields,
                            path,
                        ));
                    }
                }
                coercion::coerce_result(definition, value.to_json())
                    .map_err(|message| self.error(message, fields, path))
            }
            ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_) => {
                let RootValue::Object(object) = value else {
                    return Err(self.error(
                        format!("Expected an object for type {type_name}, got {}", value.to_json()),
                        fields,
                        path,
                    ));
                };
                let object_type = if matches!(definition, ExtendedType::Object(_)) {
                    type_name.to_string()
                } else {
                    match self.resolver.resolve_type(&object, type_name) {
                        Some(concrete)
                            if schema.schema.get_object(&concrete).is_some()
                                && schema.type_applies(type_name, &concrete) =>
                        {
                            concrete
                        }
                        other => {
                            return Err(self.error(
                                format!(
                                    "Abstract type \"{type_name}\" must resolve to an object type at runtime, got {}",
                                    other.as_deref().unwrap_or("nothing")
                                ),
                                fields,
                                path,
                            ))
                        }
                    }
                };
                let selection_sets: Vec<&'a SelectionSet> =
                    fields.iter().map(|&field| &field.selection_set).collect();
                self.execute_selection_set(&object_type, &object, &selection_sets, path)
                    .map(Value::Object)
            }
            ExtendedType::InputObject(_) => Err(self.error(
                format!("Field with input object type {type_name}"),
                fields,
                path,
            )),
        }
    }

    fn error(
        &mut self,
        message: impl Into<String>,
        fields: &[&'a Node<Field>],
        path: &[PathSegment],
    ) -> PropagateNull {
        self.field_error(FieldError::new(message), fields, path)
    }

    fn field_error(
        &mut self,
        error: FieldError,
        fields: &[&'a Node<Field>],
        path: &[PathSegment],
    ) -> PropagateNull {
        let locations = fields[0]
            .line_column_range(&self.document.sources)
            .map(|range| {
                vec![Location {
                    line: range.start.line,
                    column: range.start.column,
                }]
            });
        self.errors.push(GraphQLError {
            message: error.message,
            locations,
            path: Some(path.to_vec()),
            extensions: error.extensions,
        });
        PropagateNull
    }
}

/// A failed field becomes `null` unless its type is non-null, in which case the parent fails
fn try_nullify(ty: &Type, result: Result<Value, PropagateNull>) -> Result<Value, PropagateNull> {
    match result {
        Ok(value) => Ok(value),
        Err(PropagateNull) if ty.is_non_null() => Err(PropagateNull),
        Err(PropagateNull) => Ok(Value::Null),
    }
}
