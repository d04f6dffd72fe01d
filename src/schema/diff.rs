//! Breaking-change detection between two schemas.
//!
//! A change is breaking when a client that worked against the old schema can
//! fail against the new one. Types are walked in the old schema's definition
//! order, then directives, so the output order is stable for a given pair of
//! documents.

use std::fmt;

use super::model::{DirectiveDef, FieldDef, InputValueDef, NamedType, Schema, TypeKind, TypeRef};

/// The category of a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    TypeRemoved,
    TypeChangedKind,
    TypeRemovedFromUnion,
    ValueRemovedFromEnum,
    RequiredInputFieldAdded,
    ImplementedInterfaceRemoved,
    FieldRemoved,
    FieldChangedKind,
    RequiredArgAdded,
    ArgRemoved,
    ArgChangedKind,
    DirectiveRemoved,
    DirectiveArgRemoved,
    RequiredDirectiveArgAdded,
    DirectiveLocationRemoved,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::TypeRemoved => "TYPE_REMOVED",
            ChangeType::TypeChangedKind => "TYPE_CHANGED_KIND",
            ChangeType::TypeRemovedFromUnion => "TYPE_REMOVED_FROM_UNION",
            ChangeType::ValueRemovedFromEnum => "VALUE_REMOVED_FROM_ENUM",
            ChangeType::RequiredInputFieldAdded => "REQUIRED_INPUT_FIELD_ADDED",
            ChangeType::ImplementedInterfaceRemoved => "IMPLEMENTED_INTERFACE_REMOVED",
            ChangeType::FieldRemoved => "FIELD_REMOVED",
            ChangeType::FieldChangedKind => "FIELD_CHANGED_KIND",
            ChangeType::RequiredArgAdded => "REQUIRED_ARG_ADDED",
            ChangeType::ArgRemoved => "ARG_REMOVED",
            ChangeType::ArgChangedKind => "ARG_CHANGED_KIND",
            ChangeType::DirectiveRemoved => "DIRECTIVE_REMOVED",
            ChangeType::DirectiveArgRemoved => "DIRECTIVE_ARG_REMOVED",
            ChangeType::RequiredDirectiveArgAdded => "REQUIRED_DIRECTIVE_ARG_ADDED",
            ChangeType::DirectiveLocationRemoved => "DIRECTIVE_LOCATION_REMOVED",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single breaking change.
///
/// `change_type` is kept as a string key so that the report can fall back on
/// keys it has no presentation rule for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakingChange {
    pub change_type: String,
    pub description: String,
}

impl BreakingChange {
    pub fn new(change_type: ChangeType, description: impl Into<String>) -> Self {
        Self {
            change_type: change_type.as_str().to_string(),
            description: description.into(),
        }
    }
}

/// Lists the breaking changes from `old` to `new`.
pub fn find_breaking_changes(old: &Schema, new: &Schema) -> Vec<BreakingChange> {
    let mut changes = Vec::new();

    for old_type in old.types() {
        match new.get_type(&old_type.name) {
            None => changes.push(BreakingChange::new(
                ChangeType::TypeRemoved,
                format!("{} was removed.", old_type.name),
            )),
            Some(new_type) if !old_type.same_kind(new_type) => changes.push(BreakingChange::new(
                ChangeType::TypeChangedKind,
                format!(
                    "{} changed from {} to {}.",
                    old_type.name,
                    old_type.kind.description(),
                    new_type.kind.description()
                ),
            )),
            Some(new_type) => diff_type(old_type, new_type, &mut changes),
        }
    }

    for old_directive in old.directives() {
        match new.get_directive(&old_directive.name) {
            None => changes.push(BreakingChange::new(
                ChangeType::DirectiveRemoved,
                format!("{} was removed.", old_directive.name),
            )),
            Some(new_directive) => diff_directive(old_directive, new_directive, &mut changes),
        }
    }

    changes
}

fn diff_type(old: &NamedType, new: &NamedType, changes: &mut Vec<BreakingChange>) {
    let name = &old.name;

    match (&old.kind, &new.kind) {
        (TypeKind::Enum { values: old_values }, TypeKind::Enum { values: new_values }) => {
            for value in old_values.iter().filter(|v| !new_values.contains(v)) {
                changes.push(BreakingChange::new(
                    ChangeType::ValueRemovedFromEnum,
                    format!("{} was removed from enum type {}.", value, name),
                ));
            }
        }
        (TypeKind::Union { members: old_members }, TypeKind::Union { members: new_members }) => {
            for member in old_members.iter().filter(|m| !new_members.contains(m)) {
                changes.push(BreakingChange::new(
                    ChangeType::TypeRemovedFromUnion,
                    format!("{} was removed from union type {}.", member, name),
                ));
            }
        }
        (
            TypeKind::InputObject { fields: old_fields },
            TypeKind::InputObject { fields: new_fields },
        ) => {
            diff_input_fields(name, old_fields, new_fields, changes);
        }
        (
            TypeKind::Object {
                fields: old_fields,
                interfaces: old_ifaces,
            },
            TypeKind::Object {
                fields: new_fields,
                interfaces: new_ifaces,
            },
        )
        | (
            TypeKind::Interface {
                fields: old_fields,
                interfaces: old_ifaces,
            },
            TypeKind::Interface {
                fields: new_fields,
                interfaces: new_ifaces,
            },
        ) => {
            diff_fields(name, old_fields, new_fields, changes);
            for iface in old_ifaces.iter().filter(|i| !new_ifaces.contains(i)) {
                changes.push(BreakingChange::new(
                    ChangeType::ImplementedInterfaceRemoved,
                    format!("{} no longer implements interface {}.", name, iface),
                ));
            }
        }
        _ => {}
    }
}

fn diff_input_fields(
    type_name: &str,
    old_fields: &[InputValueDef],
    new_fields: &[InputValueDef],
    changes: &mut Vec<BreakingChange>,
) {
    for old_field in old_fields {
        match new_fields.iter().find(|f| f.name == old_field.name) {
            None => changes.push(BreakingChange::new(
                ChangeType::FieldRemoved,
                format!("{}.{} was removed.", type_name, old_field.name),
            )),
            Some(new_field) if !is_safe_input_change(&old_field.ty, &new_field.ty) => {
                changes.push(BreakingChange::new(
                    ChangeType::FieldChangedKind,
                    format!(
                        "{}.{} changed type from {} to {}.",
                        type_name, old_field.name, old_field.ty, new_field.ty
                    ),
                ))
            }
            Some(_) => {}
        }
    }

    for new_field in new_fields {
        let existed = old_fields.iter().any(|f| f.name == new_field.name);
        if !existed && new_field.is_required() {
            changes.push(BreakingChange::new(
                ChangeType::RequiredInputFieldAdded,
                format!(
                    "A required field {} on input type {} was added.",
                    new_field.name, type_name
                ),
            ));
        }
    }
}

fn diff_fields(
    type_name: &str,
    old_fields: &[FieldDef],
    new_fields: &[FieldDef],
    changes: &mut Vec<BreakingChange>,
) {
    for old_field in old_fields {
        let Some(new_field) = new_fields.iter().find(|f| f.name == old_field.name) else {
            changes.push(BreakingChange::new(
                ChangeType::FieldRemoved,
                format!("{}.{} was removed.", type_name, old_field.name),
            ));
            continue;
        };

        if !is_safe_output_change(&old_field.ty, &new_field.ty) {
            changes.push(BreakingChange::new(
                ChangeType::FieldChangedKind,
                format!(
                    "{}.{} changed type from {} to {}.",
                    type_name, old_field.name, old_field.ty, new_field.ty
                ),
            ));
        }

        diff_args(type_name, old_field, new_field, changes);
    }
}

fn diff_args(
    type_name: &str,
    old_field: &FieldDef,
    new_field: &FieldDef,
    changes: &mut Vec<BreakingChange>,
) {
    let field = &old_field.name;

    for old_arg in &old_field.args {
        match new_field.args.iter().find(|a| a.name == old_arg.name) {
            None => changes.push(BreakingChange::new(
                ChangeType::ArgRemoved,
                format!("{}.{} arg {} was removed.", type_name, field, old_arg.name),
            )),
            Some(new_arg) if !is_safe_input_change(&old_arg.ty, &new_arg.ty) => {
                changes.push(BreakingChange::new(
                    ChangeType::ArgChangedKind,
                    format!(
                        "{}.{} arg {} has changed type from {} to {}.",
                        type_name, field, old_arg.name, old_arg.ty, new_arg.ty
                    ),
                ))
            }
            Some(_) => {}
        }
    }

    for new_arg in &new_field.args {
        let existed = old_field.args.iter().any(|a| a.name == new_arg.name);
        if !existed && new_arg.is_required() {
            changes.push(BreakingChange::new(
                ChangeType::RequiredArgAdded,
                format!(
                    "A required arg {} on {}.{} was added.",
                    new_arg.name, type_name, field
                ),
            ));
        }
    }
}

fn diff_directive(old: &DirectiveDef, new: &DirectiveDef, changes: &mut Vec<BreakingChange>) {
    for old_arg in &old.args {
        if !new.args.iter().any(|a| a.name == old_arg.name) {
            changes.push(BreakingChange::new(
                ChangeType::DirectiveArgRemoved,
                format!("{} was removed from {}.", old_arg.name, old.name),
            ));
        }
    }

    for new_arg in &new.args {
        let existed = old.args.iter().any(|a| a.name == new_arg.name);
        if !existed && new_arg.is_required() {
            changes.push(BreakingChange::new(
                ChangeType::RequiredDirectiveArgAdded,
                format!(
                    "A required arg {} on directive {} was added.",
                    new_arg.name, old.name
                ),
            ));
        }
    }

    for location in old.locations.iter().filter(|l| !new.locations.contains(l)) {
        changes.push(BreakingChange::new(
            ChangeType::DirectiveLocationRemoved,
            format!("{} was removed from {}.", location, old.name),
        ));
    }
}

/// An output position may keep its type, or become stricter by adding
/// non-null wrappers.
fn is_safe_output_change(old: &TypeRef, new: &TypeRef) -> bool {
    match (old, new) {
        (TypeRef::Named(a), TypeRef::Named(b)) => a == b,
        (TypeRef::List(a), TypeRef::List(b)) => is_safe_output_change(a, b),
        (TypeRef::NonNull(a), TypeRef::NonNull(b)) => is_safe_output_change(a, b),
        (old, TypeRef::NonNull(b)) if !old.is_non_null() => is_safe_output_change(old, b),
        _ => false,
    }
}

/// An input position may keep its type, or become more lenient by dropping
/// non-null wrappers.
fn is_safe_input_change(old: &TypeRef, new: &TypeRef) -> bool {
    match (old, new) {
        (TypeRef::Named(a), TypeRef::Named(b)) => a == b,
        (TypeRef::List(a), TypeRef::List(b)) => is_safe_input_change(a, b),
        (TypeRef::NonNull(a), TypeRef::NonNull(b)) => is_safe_input_change(a, b),
        (TypeRef::NonNull(a), new) => is_safe_input_change(a, new),
        _ => false,
    }
}
