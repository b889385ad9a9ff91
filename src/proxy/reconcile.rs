//! Turns an upstream response into the root value tree of the local execution pass.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{ErrorMarker, GraphQLError, ObjectValue, PathSegment, RootValue};

/// The upstream `{ data, errors }` body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "nullable_errors")]
    pub errors: Vec<GraphQLError>,
}

fn nullable_errors<'de, D>(deserializer: D) -> Result<Vec<GraphQLError>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<GraphQLError>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub root: ObjectValue,
    /// Errors without a path. Reported to the caller, never written into `root`.
    pub global_errors: Vec<GraphQLError>,
}

/// Builds the root value tree from `response.data` and plants an [`ErrorMarker`] at the
/// path of every located error.
pub fn reconcile(response: UpstreamResponse) -> Reconciled {
    let mut root = match response.data {
        Some(Value::Object(data)) => RootValue::Object(ObjectValue::from(data)),
        _ => RootValue::Object(ObjectValue::new()),
    };
    let mut global_errors = Vec::new();

    for error in response.errors {
        match error.path.as_deref() {
            Some(path @ [PathSegment::Key(_), ..]) if reachable(&root, path) => {
                let marker = ErrorMarker {
                    message: error.message.clone(),
                    extensions: error.extensions.clone(),
                };
                inject(&mut root, path, marker);
            }
            _ => global_errors.push(error),
        }
    }

    let root = match root {
        RootValue::Object(object) => object,
        _ => ObjectValue::new(),
    };
    Reconciled {
        root,
        global_errors,
    }
}

/// Whether planting at `path` grows no list by more than one item. Indexes further out
/// come from a broken upstream response and would make the tree arbitrarily large.
fn reachable(root: &RootValue, path: &[PathSegment]) -> bool {
    let mut node = Some(root);
    for segment in path {
        node = match segment {
            PathSegment::Key(key) => match node {
                Some(RootValue::Object(object)) => object.fields.get(key),
                _ => None,
            },
            PathSegment::Index(index) => {
                let items: &[RootValue] = match node {
                    Some(RootValue::List(items)) => items,
                    _ => &[],
                };
                if *index > items.len() {
                    return false;
                }
                items.get(*index)
            }
        };
    }
    true
}

/// Walks `path`, creating containers where the tree has none, and sets the last segment
fn inject(node: &mut RootValue, path: &[PathSegment], marker: ErrorMarker) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut node = node;
    for segment in parents {
        node = child(node, segment);
    }
    *child(node, last) = RootValue::Error(marker);
}

fn child<'a>(node: &'a mut RootValue, segment: &PathSegment) -> &'a mut RootValue {
    match segment {
        PathSegment::Key(key) => node
            .make_object()
            .fields
            .entry(key.clone())
            .or_insert_with(RootValue::null),
        PathSegment::Index(index) => {
            let items = node.make_list();
            if items.len() <= *index {
                items.resize(index + 1, RootValue::null());
            }
            &mut items[*index]
        }
    }
}
