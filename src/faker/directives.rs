//! Typed lookup of the `@fake`, `@examples`, `@listLength` and `@override` directives.
//!
//! Directives may be applied on a type definition and again on its extensions. The last
//! applied instance of a name wins. For a field, a directive applied on the field beats the
//! same directive applied on the field's named leaf type.

use apollo_compiler::ast::{self, Directive};
use apollo_compiler::schema::{ExtendedType, FieldDefinition};
use apollo_compiler::Schema;
use rand::Rng;
use serde_json::Value;

use crate::domain::{FakerError, JsonMap};
use crate::schema::values::value_to_json;

pub const FAKE: &str = "fake";
pub const EXAMPLES: &str = "examples";
pub const LIST_LENGTH: &str = "listLength";
pub const OVERRIDE: &str = "override";

/// Something directives can be applied on
#[derive(Debug, Clone, Copy)]
pub enum DirectiveTarget<'a> {
    Field(&'a FieldDefinition),
    Type(&'a ExtendedType),
}

impl<'a> DirectiveTarget<'a> {
    /// Applied directives in application order: definition first, then extensions
    fn applied(self) -> Vec<&'a Directive> {
        match self {
            DirectiveTarget::Field(field) => field.directives.iter().map(|d| &**d).collect(),
            DirectiveTarget::Type(ty) => match ty {
                ExtendedType::Scalar(scalar) => {
                    scalar.directives.iter().map(|d| &*d.node).collect()
                }
                ExtendedType::Enum(enum_type) => {
                    enum_type.directives.iter().map(|d| &*d.node).collect()
                }
                _ => Vec::new(),
            },
        }
    }
}

/// Last-applied instance of `name` on `target`
pub fn resolve<'a>(name: &str, target: DirectiveTarget<'a>) -> Option<&'a Directive> {
    target
        .applied()
        .into_iter()
        .rev()
        .find(|directive| directive.name.as_str() == name)
}

/// Whether the field carries `@override`
pub fn has_override(field: &ast::FieldDefinition) -> bool {
    field
        .directives
        .iter()
        .any(|directive| directive.name.as_str() == OVERRIDE)
}

fn argument<'a>(directive: &'a Directive, name: &str) -> Option<&'a ast::Value> {
    directive
        .arguments
        .iter()
        .find(|argument| argument.name.as_str() == name)
        .map(|argument| &*argument.value)
}

fn invalid(directive: &str, reason: impl Into<String>) -> FakerError {
    FakerError::InvalidDirective {
        directive: directive.to_string(),
        reason: reason.into(),
    }
}

/// Arguments of `@fake`
#[derive(Debug, Clone, PartialEq)]
pub struct FakeArgs {
    pub generator: String,
    pub options: JsonMap,
    pub locale: Option<String>,
}

impl FakeArgs {
    pub fn from_directive(directive: &Directive) -> Result<Self, FakerError> {
        let generator = match argument(directive, "type").map(|v| value_to_json(v, None)) {
            Some(Value::String(name)) => name,
            _ => return Err(invalid(FAKE, "missing `type` argument")),
        };
        let options = match argument(directive, "options").map(|v| value_to_json(v, None)) {
            Some(Value::Object(options)) => options,
            None | Some(Value::Null) => JsonMap::new(),
            Some(other) => return Err(invalid(FAKE, format!("`options` must be an object, got {other}"))),
        };
        let locale = match argument(directive, "locale").map(|v| value_to_json(v, None)) {
            Some(Value::String(locale)) => Some(locale),
            _ => None,
        };
        Ok(Self {
            generator,
            options,
            locale,
        })
    }
}

/// Arguments of `@examples`
#[derive(Debug, Clone, PartialEq)]
pub struct ExamplesArgs {
    pub values: Vec<Value>,
}

impl ExamplesArgs {
    pub fn from_directive(directive: &Directive) -> Result<Self, FakerError> {
        match argument(directive, "values").map(|v| value_to_json(v, None)) {
            Some(Value::Array(values)) => Ok(Self { values }),
            // a single value is coerced to a one-item list by input coercion rules
            Some(Value::Null) | None => Err(invalid(EXAMPLES, "missing `values` argument")),
            Some(single) => Ok(Self {
                values: vec![single],
            }),
        }
    }

    /// Uniformly chosen example, `None` when the list is empty
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<&Value> {
        if self.values.is_empty() {
            return None;
        }
        self.values.get(rng.gen_range(0..self.values.len()))
    }
}

/// Inclusive list length bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ListLength {
    pub min: usize,
    pub max: usize,
}

impl Default for ListLength {
    fn default() -> Self {
        Self { min: 2, max: 4 }
    }
}

impl ListLength {
    /// Bounds with `max < min` are repaired to `[min, min + 1]`
    pub fn new(min: usize, max: usize) -> Self {
        if min > max {
            Self { min, max: min + 1 }
        } else {
            Self { min, max }
        }
    }

    pub fn from_directive(directive: &Directive) -> Result<Self, FakerError> {
        let bound = |name: &str| match argument(directive, name).map(|v| value_to_json(v, None)) {
            Some(Value::Number(n)) => n
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| invalid(LIST_LENGTH, format!("`{name}` must be a non-negative integer"))),
            _ => Err(invalid(LIST_LENGTH, format!("missing `{name}` argument"))),
        };
        Ok(Self::new(bound("min")?, bound("max")?))
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.min..=self.max)
    }
}

/// The value directive that decides how a leaf or abstract value is produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueDirective<'a> {
    Examples(&'a ExamplesArgs),
    Fake(&'a FakeArgs),
    None,
}

/// Directives in effect for one field, after applying precedence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveSet {
    pub fake: Option<FakeArgs>,
    pub examples: Option<ExamplesArgs>,
    pub list_length: Option<ListLength>,
}

impl DirectiveSet {
    /// Field-level directives, falling back per directive name to the field's leaf type
    pub fn for_field(schema: &Schema, field: &FieldDefinition) -> Result<Self, FakerError> {
        let leaf_type = schema.types.get(field.ty.inner_named_type());
        let field_target = DirectiveTarget::Field(field);
        let lookup = |name: &str| {
            resolve(name, field_target)
                .or_else(|| leaf_type.and_then(|ty| resolve(name, DirectiveTarget::Type(ty))))
        };

        Ok(Self {
            fake: lookup(FAKE).map(FakeArgs::from_directive).transpose()?,
            examples: lookup(EXAMPLES)
                .map(ExamplesArgs::from_directive)
                .transpose()?,
            list_length: resolve(LIST_LENGTH, field_target)
                .map(ListLength::from_directive)
                .transpose()?,
        })
    }

    /// Directives applied on a type definition only
    pub fn for_type(ty: &ExtendedType) -> Result<Self, FakerError> {
        let target = DirectiveTarget::Type(ty);
        Ok(Self {
            fake: resolve(FAKE, target)
                .map(FakeArgs::from_directive)
                .transpose()?,
            examples: resolve(EXAMPLES, target)
                .map(ExamplesArgs::from_directive)
                .transpose()?,
            list_length: None,
        })
    }

    /// `@examples` beats `@fake`
    pub fn value_directive(&self) -> ValueDirective<'_> {
        match (&self.examples, &self.fake) {
            (Some(examples), _) => ValueDirective::Examples(examples),
            (None, Some(fake)) => ValueDirective::Fake(fake),
            (None, None) => ValueDirective::None,
        }
    }

    pub fn list_length(&self) -> ListLength {
        self.list_length.unwrap_or_default()
    }
}
