use apollo_compiler::ast;
use serde_json::{Number, Value};

use crate::domain::JsonMap;

/// Converts a GraphQL literal to JSON, substituting variables when given.
///
/// Enum values become strings. Unbound variables become `null`.
pub fn value_to_json(value: &ast::Value, variables: Option<&JsonMap>) -> Value {
    match value {
        ast::Value::Null => Value::Null,
        ast::Value::Enum(name) => Value::String(name.to_string()),
        ast::Value::Variable(name) => variables
            .and_then(|vars| vars.get(name.as_str()))
            .cloned()
            .unwrap_or(Value::Null),
        ast::Value::String(s) => Value::String(s.clone()),
        ast::Value::Float(f) => number(f.as_str()),
        ast::Value::Int(i) => number(i.as_str()),
        ast::Value::Boolean(b) => Value::Bool(*b),
        ast::Value::List(items) => Value::Array(
            items
                .iter()
                .map(|item| value_to_json(item, variables))
                .collect(),
        ),
        ast::Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), value_to_json(value, variables)))
                .collect(),
        ),
    }
}

fn number(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(int.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Collects the names of variables referenced by a literal
pub fn collect_variables<'a>(value: &'a ast::Value, into: &mut Vec<&'a str>) {
    match value {
        ast::Value::Variable(name) => into.push(name.as_str()),
        ast::Value::List(items) => items.iter().for_each(|item| collect_variables(item, into)),
        ast::Value::Object(fields) => fields
            .iter()
            .for_each(|(_, value)| collect_variables(value, into)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apollo_compiler::ast::Document;
    use serde_json::json;

    fn first_argument(source: &str) -> ast::Value {
        let doc = Document::parse(source, "test.graphql").unwrap();
        let Some(ast::Definition::OperationDefinition(op)) = doc.definitions.first() else {
            panic!("expected an operation");
        };
        let ast::Selection::Field(field) = &op.selection_set[0] else {
            panic!("expected a field");
        };
        (*field.arguments[0].value).clone()
    }

    #[test]
    fn test_literals_convert_to_json() {
        let value = first_argument(
            r#"{ f(a: { int: 3, float: 1.5, s: "x", e: RED, l: [true, null] }) }"#,
        );
        assert_eq!(
            value_to_json(&value, None),
            json!({ "int": 3, "float": 1.5, "s": "x", "e": "RED", "l": [true, null] })
        );
    }

    #[test]
    fn test_variables_are_substituted() {
        let value = first_argument("query($v: Int) { f(a: [$v, $w]) }");
        let mut vars = JsonMap::new();
        vars.insert("v".into(), json!(7));
        assert_eq!(value_to_json(&value, Some(&vars)), json!([7, null]));

        let mut names = Vec::new();
        collect_variables(&value, &mut names);
        assert_eq!(names, vec!["v", "w"]);
    }
}
