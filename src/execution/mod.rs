//! Executes a validated operation against a root value tree.
//!
//! The executor walks the selected operation, collecting fields through fragments and
//! `@skip`/`@include`, and asks a [`Resolver`] for each field value. Values are completed
//! against the declared field types: leaves go through result coercion, non-null violations
//! propagate to the nearest nullable parent and abstract types are resolved to a concrete
//! object type before their selection set runs. Introspection meta fields are answered from
//! the Working Schema.

use apollo_compiler::executable::Operation;
use apollo_compiler::{ExecutableDocument, Node};

use crate::domain::GraphQLError;

pub mod coercion;
mod engine;
pub mod introspection;
pub mod resolver;

pub use engine::{execute, ExecutionRequest};
pub use resolver::{FakeResolver, FieldError, ResolveInfo, Resolver};

/// The operation named `operation_name`, or the only operation of the document
pub fn select_operation<'a>(
    document: &'a ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<&'a Node<Operation>, GraphQLError> {
    document
        .operations
        .get(operation_name)
        .map_err(|_| match operation_name {
            Some(name) => GraphQLError::new(format!("Unknown operation named \"{name}\".")),
            None => GraphQLError::new(
                "Must provide operation name if query contains multiple operations.",
            ),
        })
}
