//! Strips the fields the upstream server does not know about from an outbound query.

use std::collections::HashSet;

use apollo_compiler::ast::DirectiveList;
use apollo_compiler::executable::{Fragment, Selection, SelectionSet};
use apollo_compiler::{name, ExecutableDocument, Name, Node};
use indexmap::IndexMap;

use crate::domain::{GraphQLError, JsonMap};
use crate::execution::select_operation;
use crate::schema::values::collect_variables;
use crate::schema::WorkingSchema;

/// The reduced query to forward upstream
#[derive(Debug, Clone, PartialEq)]
pub struct Rewritten {
    pub query: String,
    pub variables: JsonMap,
    pub operation_name: Option<String>,
}

/// Rewrites the selected operation of `document` for the upstream server.
///
/// Meta fields and extension fields are dropped, along with fragments on extension-only
/// types. Selection sets that end up empty, or whose parent type is abstract, get a
/// `__typename`. Only the selected operation and the fragments it still uses are kept, and
/// variable definitions it no longer references are pruned from the query and from
/// `variables`.
pub fn rewrite(
    schema: &WorkingSchema,
    document: &ExecutableDocument,
    operation_name: Option<&str>,
    variables: &JsonMap,
) -> Result<Rewritten, GraphQLError> {
    let rewriter = Rewriter { schema, document };

    let mut operation = select_operation(document, operation_name)?.clone();
    rewriter.selection_set(&mut operation.make_mut().selection_set);

    let mut fragments: IndexMap<Name, Node<Fragment>> = IndexMap::new();
    let mut pending = Vec::new();
    spreads(&operation.selection_set, &mut pending);
    while let Some(fragment_name) = pending.pop() {
        if fragments.contains_key(&fragment_name) {
            continue;
        }
        let Some(fragment) = document.fragments.get(&fragment_name) else {
            continue;
        };
        let mut fragment = fragment.clone();
        rewriter.selection_set(&mut fragment.make_mut().selection_set);
        spreads(&fragment.selection_set, &mut pending);
        fragments.insert(fragment_name, fragment);
    }

    let mut used = Vec::new();
    directive_variables(&operation.directives, &mut used);
    selection_variables(&operation.selection_set, &mut used);
    for fragment in fragments.values() {
        directive_variables(&fragment.directives, &mut used);
        selection_variables(&fragment.selection_set, &mut used);
    }
    let used: HashSet<String> = used.into_iter().map(str::to_string).collect();
    operation
        .make_mut()
        .variables
        .retain(|definition| used.contains(definition.name.as_str()));

    let variables = variables
        .iter()
        .filter(|(name, _)| used.contains(name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let operation_name = operation.name.as_ref().map(|name| name.to_string());

    let mut rewritten = ExecutableDocument::new();
    rewritten.operations.insert(operation);
    // keep the original fragment order so the output is stable
    for (fragment_name, _) in &document.fragments {
        if let Some(fragment) = fragments.swap_remove(fragment_name) {
            rewritten.fragments.insert(fragment_name.clone(), fragment);
        }
    }

    Ok(Rewritten {
        query: rewritten.serialize().no_indent().to_string(),
        variables,
        operation_name,
    })
}

struct Rewriter<'a> {
    schema: &'a WorkingSchema,
    document: &'a ExecutableDocument,
}

impl Rewriter<'_> {
    fn selection_set(&self, selection_set: &mut SelectionSet) {
        let parent_type = selection_set.ty.clone();
        selection_set.selections.retain_mut(|selection| match selection {
            Selection::Field(field) => {
                if field.name.starts_with("__")
                    || self.schema.is_extension_field(&parent_type, &field.name)
                {
                    return false;
                }
                // leaf fields have no selection set to rewrite
                if !field.selection_set.selections.is_empty() {
                    self.selection_set(&mut field.make_mut().selection_set);
                }
                true
            }
            Selection::InlineFragment(inline) => {
                if inline
                    .type_condition
                    .as_ref()
                    .is_some_and(|condition| self.is_extension_type(condition))
                {
                    return false;
                }
                self.selection_set(&mut inline.make_mut().selection_set);
                true
            }
            Selection::FragmentSpread(spread) => !self
                .document
                .fragments
                .get(&spread.fragment_name)
                .is_some_and(|fragment| self.is_extension_type(fragment.type_condition())),
        });

        if selection_set.selections.is_empty() || self.schema.is_abstract(&parent_type) {
            if let Ok(typename) = selection_set.new_field(&self.schema.schema, name!("__typename"))
            {
                selection_set.push(Selection::Field(Node::new(typename)));
            }
        }
    }

    fn is_extension_type(&self, type_name: &str) -> bool {
        self.schema.extensions.is_extension_type(type_name)
    }
}

fn spreads(selection_set: &SelectionSet, into: &mut Vec<Name>) {
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => spreads(&field.selection_set, into),
            Selection::FragmentSpread(spread) => into.push(spread.fragment_name.clone()),
            Selection::InlineFragment(inline) => spreads(&inline.selection_set, into),
        }
    }
}

fn selection_variables<'a>(selection_set: &'a SelectionSet, into: &mut Vec<&'a str>) {
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => {
                for argument in &field.arguments {
                    collect_variables(&argument.value, into);
                }
                directive_variables(&field.directives, into);
                selection_variables(&field.selection_set, into);
            }
            Selection::FragmentSpread(spread) => directive_variables(&spread.directives, into),
            Selection::InlineFragment(inline) => {
                directive_variables(&inline.directives, into);
                selection_variables(&inline.selection_set, into);
            }
        }
    }
}

fn directive_variables<'a>(directives: &'a DirectiveList, into: &mut Vec<&'a str>) {
    for directive in directives.iter() {
        for argument in &directive.arguments {
            collect_variables(&argument.value, into);
        }
    }
}
