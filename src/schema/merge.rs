//! Merging of the directive vocabulary, a base SDL document and an optional extension.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use apollo_compiler::ast::{self, Definition, Document, OperationType};
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::validation::{DiagnosticList, Valid};
use apollo_compiler::{Node, Schema};

use crate::domain::SchemaError;
use crate::faker::directives::has_override;

pub const VOCABULARY_SDL: &str = include_str!("fake_definition.graphql");
pub const VOCABULARY_SOURCE: &str = "fake_definition.graphql";
pub const BASE_SOURCE: &str = "schema.graphql";
pub const EXTENSION_SOURCE: &str = "extension.graphql";

/// Names defined by the vocabulary. Directive names carry an `@` prefix.
static VOCABULARY_NAMES: LazyLock<HashSet<String>> = LazyLock::new(|| {
    Document::parse(VOCABULARY_SDL, VOCABULARY_SOURCE)
        .map(|doc| doc.definitions.iter().filter_map(definition_key).collect())
        .unwrap_or_default()
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Extension fields replace same-named base fields even without `@override`
    pub override_fields: bool,
}

/// Fields and types whose definition comes from the extension document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFieldIndex {
    fields: HashMap<String, HashSet<String>>,
    types: HashSet<String>,
}

impl ExtensionFieldIndex {
    pub fn contains(&self, type_name: &str, field_name: &str) -> bool {
        self.fields
            .get(type_name)
            .is_some_and(|fields| fields.contains(field_name))
    }

    /// Whether the whole type is defined by the extension document
    pub fn is_extension_type(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    pub fn fields_of(&self, type_name: &str) -> Option<&HashSet<String>> {
        self.fields.get(type_name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.types.is_empty()
    }
}

#[derive(Debug)]
pub struct Merged {
    pub schema: Valid<Schema>,
    pub extensions: ExtensionFieldIndex,
}

/// Merges `base` and `extension` on top of the vocabulary and validates the result.
///
/// All syntax or validation errors are returned together; no partial schema is produced.
pub fn merge(
    base: &str,
    extension: Option<&str>,
    options: MergeOptions,
) -> Result<Merged, SchemaError> {
    let mut base_doc = parse(base, BASE_SOURCE)?;
    let before = base_doc.definitions.len();
    base_doc
        .definitions
        .retain(|def| definition_key(def).map_or(true, |key| !VOCABULARY_NAMES.contains(&key)));
    let mut base_modified = base_doc.definitions.len() != before;

    let mut extension_text = None;
    if let Some(extension) = extension {
        let mut ext_doc = parse(extension, EXTENSION_SOURCE)?;
        let (pruned_base, pruned_ext) = resolve_conflicts(&mut base_doc, &mut ext_doc, options);
        base_modified |= pruned_base;
        extension_text = Some(if pruned_ext {
            ext_doc.to_string()
        } else {
            extension.to_string()
        });
    }

    let base_text = if base_modified {
        base_doc.to_string()
    } else {
        base.to_string()
    };
    let mut builder = Schema::builder()
        .parse(VOCABULARY_SDL, VOCABULARY_SOURCE)
        .parse(base_text, BASE_SOURCE);
    if let Some(extension_text) = extension_text {
        builder = builder.parse(extension_text, EXTENSION_SOURCE);
    }

    let schema = builder
        .build()
        .map_err(|e| SchemaError::Validation(messages(&e.errors)))?
        .validate()
        .map_err(|e| SchemaError::Validation(messages(&e.errors)))?;
    if schema.root_operation(OperationType::Query).is_none() {
        return Err(SchemaError::MissingQueryType);
    }

    let extensions = if extension.is_some() {
        tag_extension_fields(&schema)
    } else {
        ExtensionFieldIndex::default()
    };
    Ok(Merged { schema, extensions })
}

/// Query root type name declared by an SDL document, `Query` by default
pub fn query_root_name(sdl: &str) -> String {
    let Ok(doc) = Document::parse(sdl, BASE_SOURCE) else {
        return "Query".to_string();
    };
    doc.definitions
        .iter()
        .filter_map(|def| match def {
            Definition::SchemaDefinition(schema) => Some(schema),
            _ => None,
        })
        .flat_map(|schema| schema.root_operations.iter())
        .find(|root| root.0 == OperationType::Query)
        .map(|root| root.1.to_string())
        .unwrap_or_else(|| "Query".to_string())
}

fn parse(source: &str, path: &str) -> Result<Document, SchemaError> {
    Document::parse(source, path).map_err(|e| SchemaError::Parse(messages(&e.errors)))
}

fn messages(errors: &DiagnosticList) -> Vec<String> {
    errors
        .iter()
        .map(|diagnostic| {
            let error = diagnostic.to_json();
            match error.locations.first() {
                Some(location) => format!(
                    "{} ({}:{})",
                    error.message, location.line, location.column
                ),
                None => error.message,
            }
        })
        .collect()
}

fn definition_key(def: &Definition) -> Option<String> {
    let name = match def {
        Definition::DirectiveDefinition(d) => return Some(format!("@{}", d.name)),
        Definition::ScalarTypeDefinition(d) => &d.name,
        Definition::ObjectTypeDefinition(d) => &d.name,
        Definition::InterfaceTypeDefinition(d) => &d.name,
        Definition::UnionTypeDefinition(d) => &d.name,
        Definition::EnumTypeDefinition(d) => &d.name,
        Definition::InputObjectTypeDefinition(d) => &d.name,
        _ => return None,
    };
    Some(name.to_string())
}

/// Field names per type added by `extend type` / `extend interface`, with their `@override` flag
fn extended_fields(doc: &Document) -> HashMap<String, HashMap<String, bool>> {
    let mut extended: HashMap<String, HashMap<String, bool>> = HashMap::new();
    for def in &doc.definitions {
        let (name, fields) = match def {
            Definition::ObjectTypeExtension(ext) => (&ext.name, &ext.fields),
            Definition::InterfaceTypeExtension(ext) => (&ext.name, &ext.fields),
            _ => continue,
        };
        let entry = extended.entry(name.to_string()).or_default();
        for field in fields {
            *entry.entry(field.name.to_string()).or_default() |= has_override(field);
        }
    }
    extended
}

/// Applies the override policy to fields defined on both sides.
///
/// Returns whether the base and the extension documents were modified.
fn resolve_conflicts(
    base: &mut Document,
    extension: &mut Document,
    options: MergeOptions,
) -> (bool, bool) {
    let extended = extended_fields(extension);
    if extended.is_empty() {
        return (false, false);
    }

    // (type, field) pairs kept from the base, dropped from the extension
    let mut kept_base: HashSet<(String, String)> = HashSet::new();
    let mut base_modified = false;
    let mut prune = |type_name: &str, fields: &mut Vec<Node<ast::FieldDefinition>>| {
        let Some(ext_fields) = extended.get(type_name) else {
            return;
        };
        fields.retain(|field| match ext_fields.get(field.name.as_str()) {
            None => true,
            Some(&overridden) if options.override_fields || overridden => {
                base_modified = true;
                false
            }
            Some(_) => {
                kept_base.insert((type_name.to_string(), field.name.to_string()));
                true
            }
        });
    };
    for def in &mut base.definitions {
        match def {
            Definition::ObjectTypeDefinition(node) => {
                let node = node.make_mut();
                prune(node.name.as_str(), &mut node.fields);
            }
            Definition::ObjectTypeExtension(node) => {
                let node = node.make_mut();
                prune(node.name.as_str(), &mut node.fields);
            }
            Definition::InterfaceTypeDefinition(node) => {
                let node = node.make_mut();
                prune(node.name.as_str(), &mut node.fields);
            }
            Definition::InterfaceTypeExtension(node) => {
                let node = node.make_mut();
                prune(node.name.as_str(), &mut node.fields);
            }
            _ => {}
        }
    }

    if kept_base.is_empty() {
        return (base_modified, false);
    }
    let drop_shadowed = |type_name: &str, fields: &mut Vec<Node<ast::FieldDefinition>>| {
        fields.retain(|field| !kept_base.contains(&(type_name.to_string(), field.name.to_string())));
        fields.is_empty()
    };
    extension.definitions.retain_mut(|def| match def {
        Definition::ObjectTypeExtension(node) => {
            let node = node.make_mut();
            let emptied = drop_shadowed(node.name.as_str(), &mut node.fields);
            !(emptied && node.directives.is_empty() && node.implements_interfaces.is_empty())
        }
        Definition::InterfaceTypeExtension(node) => {
            let node = node.make_mut();
            let emptied = drop_shadowed(node.name.as_str(), &mut node.fields);
            !(emptied && node.directives.is_empty() && node.implements_interfaces.is_empty())
        }
        _ => true,
    });
    (base_modified, true)
}

fn tag_extension_fields(schema: &Schema) -> ExtensionFieldIndex {
    let Some(extension_file) = schema
        .sources
        .iter()
        .find(|(_, source)| source.path() == Path::new(EXTENSION_SOURCE))
        .map(|(id, _)| *id)
    else {
        return ExtensionFieldIndex::default();
    };

    let mut index = ExtensionFieldIndex::default();
    for (type_name, ty) in &schema.types {
        let defined_in_extension = match ty {
            ExtendedType::Scalar(node) => node.location(),
            ExtendedType::Object(node) => node.location(),
            ExtendedType::Interface(node) => node.location(),
            ExtendedType::Union(node) => node.location(),
            ExtendedType::Enum(node) => node.location(),
            ExtendedType::InputObject(node) => node.location(),
        }
        .is_some_and(|span| span.file_id() == extension_file);
        if defined_in_extension {
            index.types.insert(type_name.to_string());
        }

        let fields = match ty {
            ExtendedType::Object(object) => &object.fields,
            ExtendedType::Interface(interface) => &interface.fields,
            _ => continue,
        };
        for (field_name, field) in fields {
            let from_extension = field
                .node
                .location()
                .is_some_and(|span| span.file_id() == extension_file);
            if from_extension {
                index
                    .fields
                    .entry(type_name.to_string())
                    .or_default()
                    .insert(field_name.to_string());
            }
        }
    }
    index
}
