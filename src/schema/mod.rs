//! The Working Schema: merged type system plus the derived indexes used per request.

use std::collections::HashMap;

use apollo_compiler::ast::OperationType;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::validation::Valid;
use apollo_compiler::{Name, Schema};
use tracing::info;

use crate::domain::SchemaError;

pub mod merge;
pub mod store;
pub mod values;

pub use merge::{ExtensionFieldIndex, MergeOptions};
pub use store::{SchemaMode, SchemaStore};

pub const DEFAULT_SCHEMA: &str = include_str!("default-schema.graphql");
pub const DEFAULT_EXTENSION: &str = include_str!("default-extend.graphql");
pub const ROOT_TYPE_PLACEHOLDER: &str = "<RootTypeName>";

#[derive(Debug)]
pub struct WorkingSchema {
    pub schema: Valid<Schema>,
    pub extensions: ExtensionFieldIndex,
    possible_types: HashMap<Name, Vec<Name>>,
    /// Base document: the local SDL in mock mode, the remote SDL in proxy mode
    pub base_sdl: String,
    /// Local extension document, proxy mode only
    pub extension_sdl: Option<String>,
}

impl WorkingSchema {
    pub fn build(
        base_sdl: String,
        extension_sdl: Option<String>,
        options: MergeOptions,
    ) -> Result<Self, SchemaError> {
        let merged = merge::merge(&base_sdl, extension_sdl.as_deref(), options)?;
        let possible_types = possible_types(&merged.schema);
        info!(
            types = merged.schema.types.len(),
            extension_fields = merged.extensions.field_count(),
            "Schema built"
        );
        Ok(Self {
            schema: merged.schema,
            extensions: merged.extensions,
            possible_types,
            base_sdl,
            extension_sdl,
        })
    }

    /// Concrete object types of an interface or union, in definition order
    pub fn possible_types(&self, abstract_type: &str) -> &[Name] {
        self.possible_types
            .get(abstract_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_abstract(&self, type_name: &str) -> bool {
        matches!(
            self.schema.types.get(type_name),
            Some(ExtendedType::Interface(_) | ExtendedType::Union(_))
        )
    }

    /// Whether `object_type` is `type_condition` or one of its possible types
    pub fn type_applies(&self, type_condition: &str, object_type: &str) -> bool {
        type_condition == object_type
            || self
                .possible_types(type_condition)
                .iter()
                .any(|name| name.as_str() == object_type)
    }

    pub fn is_extension_field(&self, type_name: &str, field_name: &str) -> bool {
        self.extensions.contains(type_name, field_name)
    }

    pub fn root_type(&self, operation: OperationType) -> Option<&str> {
        self.schema
            .root_operation(operation)
            .map(|name| name.as_str())
    }
}

fn possible_types(schema: &Schema) -> HashMap<Name, Vec<Name>> {
    let mut possible: HashMap<Name, Vec<Name>> = HashMap::new();
    for (name, ty) in &schema.types {
        match ty {
            ExtendedType::Object(object) => {
                for interface in &object.implements_interfaces {
                    possible
                        .entry(interface.name.clone())
                        .or_default()
                        .push(name.clone());
                }
            }
            ExtendedType::Union(union_type) => {
                possible
                    .entry(name.clone())
                    .or_default()
                    .extend(union_type.members.iter().map(|member| member.name.clone()));
            }
            _ => {}
        }
    }
    possible
}
