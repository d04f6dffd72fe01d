//! A schema representation built from GraphQL SDL.
//!
//! The model keeps only what breaking-change detection looks at: named types
//! with their kinds, fields, arguments, input fields, enum values, union
//! members and implemented interfaces, plus directive definitions. Type
//! extensions are folded into the type they extend. Definition order is
//! preserved so that changes are reported in the order the types appear.

use std::collections::HashMap;
use std::fmt;

use graphql_parser::schema::{
    Definition, Document, EnumValue, Field, InputValue, Type, TypeDefinition, TypeExtension,
};
use thiserror::Error;

/// Scalars every schema has without declaring them.
const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Why a schema could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaBuildError {
    /// The SDL is not syntactically valid.
    #[error("{0}")]
    Syntax(String),

    #[error("There can be only one type named \"{0}\".")]
    DuplicateType(String),

    #[error("There can be only one directive named \"@{0}\".")]
    DuplicateDirective(String),

    #[error("Cannot extend type \"{0}\" because it is not defined.")]
    UndefinedExtension(String),

    #[error("Unknown type \"{name}\" referenced by {location}.")]
    UndefinedType { name: String, location: String },

    /// A type is used where its kind is not allowed, such as an object type
    /// as an argument type.
    #[error("{location} must be {expected} type, but \"{name}\" is not.")]
    UnexpectedType {
        name: String,
        location: String,
        expected: &'static str,
    },
}

impl SchemaBuildError {
    /// Returns true for errors in the SDL document itself, as opposed to a
    /// document that parses but describes an unusable schema.
    pub fn is_syntax_or_structure(&self) -> bool {
        !matches!(self, SchemaBuildError::UnexpectedType { .. })
    }
}

/// A reference to a type, with list and non-null wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// The innermost named type.
    pub fn named(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

impl From<&Type<'_, String>> for TypeRef {
    fn from(ty: &Type<'_, String>) -> Self {
        match ty {
            Type::NamedType(name) => TypeRef::Named(name.clone()),
            Type::ListType(inner) => TypeRef::List(Box::new(TypeRef::from(inner.as_ref()))),
            Type::NonNullType(inner) => TypeRef::NonNull(Box::new(TypeRef::from(inner.as_ref()))),
        }
    }
}

/// An argument or input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValueDef {
    pub name: String,
    pub ty: TypeRef,
    pub has_default: bool,
}

impl InputValueDef {
    /// A value the client must supply: non-null without a default.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && !self.has_default
    }
}

impl From<&InputValue<'_, String>> for InputValueDef {
    fn from(value: &InputValue<'_, String>) -> Self {
        InputValueDef {
            name: value.name.clone(),
            ty: TypeRef::from(&value.value_type),
            has_default: value.default_value.is_some(),
        }
    }
}

/// A field of an object or interface type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub args: Vec<InputValueDef>,
}

impl From<&Field<'_, String>> for FieldDef {
    fn from(field: &Field<'_, String>) -> Self {
        FieldDef {
            name: field.name.clone(),
            ty: TypeRef::from(&field.field_type),
            args: field.arguments.iter().map(InputValueDef::from).collect(),
        }
    }
}

/// The kind-specific part of a named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object {
        fields: Vec<FieldDef>,
        interfaces: Vec<String>,
    },
    Interface {
        fields: Vec<FieldDef>,
        interfaces: Vec<String>,
    },
    Union {
        members: Vec<String>,
    },
    Enum {
        values: Vec<String>,
    },
    InputObject {
        fields: Vec<InputValueDef>,
    },
}

impl TypeKind {
    /// The kind as used in change descriptions, e.g. "an Object type".
    pub fn description(&self) -> &'static str {
        match self {
            TypeKind::Scalar => "a Scalar type",
            TypeKind::Object { .. } => "an Object type",
            TypeKind::Interface { .. } => "an Interface type",
            TypeKind::Union { .. } => "a Union type",
            TypeKind::Enum { .. } => "an Enum type",
            TypeKind::InputObject { .. } => "an Input type",
        }
    }

    fn same_kind(&self, other: &TypeKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn is_input(&self) -> bool {
        matches!(
            self,
            TypeKind::Scalar | TypeKind::Enum { .. } | TypeKind::InputObject { .. }
        )
    }

    fn is_output(&self) -> bool {
        !matches!(self, TypeKind::InputObject { .. })
    }
}

/// A named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    pub name: String,
    pub kind: TypeKind,
}

/// A directive definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDef {
    pub name: String,
    pub args: Vec<InputValueDef>,
    /// Locations such as `FIELD_DEFINITION`.
    pub locations: Vec<String>,
}

/// A built schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    types: Vec<NamedType>,
    index: HashMap<String, usize>,
    directives: Vec<DirectiveDef>,
}

impl Schema {
    /// Parses SDL and builds a schema from it.
    pub fn parse(sdl: &str) -> Result<Self, SchemaBuildError> {
        let document = graphql_parser::parse_schema::<String>(sdl)
            .map_err(|e| SchemaBuildError::Syntax(e.to_string()))?;
        Self::from_document(&document)
    }

    /// User-defined types, in definition order.
    pub fn types(&self) -> &[NamedType] {
        &self.types
    }

    pub fn get_type(&self, name: &str) -> Option<&NamedType> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// User-defined directives, in definition order.
    pub fn directives(&self) -> &[DirectiveDef] {
        &self.directives
    }

    pub fn get_directive(&self, name: &str) -> Option<&DirectiveDef> {
        self.directives.iter().find(|d| d.name == name)
    }

    fn from_document(document: &Document<'_, String>) -> Result<Self, SchemaBuildError> {
        let mut schema = Schema::default();

        for definition in &document.definitions {
            match definition {
                Definition::TypeDefinition(def) => schema.add_type(named_type(def))?,
                Definition::DirectiveDefinition(def) => {
                    if schema.get_directive(&def.name).is_some() {
                        return Err(SchemaBuildError::DuplicateDirective(def.name.clone()));
                    }
                    schema.directives.push(DirectiveDef {
                        name: def.name.clone(),
                        args: def.arguments.iter().map(InputValueDef::from).collect(),
                        locations: def
                            .locations
                            .iter()
                            .map(|l| l.as_str().to_string())
                            .collect(),
                    });
                }
                Definition::SchemaDefinition(_) | Definition::TypeExtension(_) => {}
            }
        }

        // Extensions may precede the definition they extend.
        for definition in &document.definitions {
            if let Definition::TypeExtension(ext) = definition {
                schema.apply_extension(ext)?;
            }
        }

        schema.check_references()?;
        Ok(schema)
    }

    fn add_type(&mut self, ty: NamedType) -> Result<(), SchemaBuildError> {
        if BUILT_IN_SCALARS.contains(&ty.name.as_str()) || self.index.contains_key(&ty.name) {
            return Err(SchemaBuildError::DuplicateType(ty.name));
        }
        self.index.insert(ty.name.clone(), self.types.len());
        self.types.push(ty);
        Ok(())
    }

    fn apply_extension(&mut self, ext: &TypeExtension<'_, String>) -> Result<(), SchemaBuildError> {
        let name = extension_name(ext);
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| SchemaBuildError::UndefinedExtension(name.to_string()))?;
        let target = &mut self.types[idx].kind;

        match (ext, target) {
            (TypeExtension::Scalar(_), TypeKind::Scalar) => {}
            (TypeExtension::Object(ext), TypeKind::Object { fields, interfaces }) => {
                fields.extend(ext.fields.iter().map(FieldDef::from));
                interfaces.extend(ext.implements_interfaces.iter().cloned());
            }
            (TypeExtension::Interface(ext), TypeKind::Interface { fields, interfaces }) => {
                fields.extend(ext.fields.iter().map(FieldDef::from));
                interfaces.extend(ext.implements_interfaces.iter().cloned());
            }
            (TypeExtension::Union(ext), TypeKind::Union { members }) => {
                members.extend(ext.types.iter().cloned());
            }
            (TypeExtension::Enum(ext), TypeKind::Enum { values }) => {
                values.extend(ext.values.iter().map(enum_value_name));
            }
            (TypeExtension::InputObject(ext), TypeKind::InputObject { fields }) => {
                fields.extend(ext.fields.iter().map(InputValueDef::from));
            }
            // Extending a type with the wrong kind of extension.
            _ => return Err(SchemaBuildError::UndefinedExtension(name.to_string())),
        }
        Ok(())
    }

    /// Checks that every referenced type exists and is allowed where it is
    /// used.
    fn check_references(&self) -> Result<(), SchemaBuildError> {
        for ty in &self.types {
            match &ty.kind {
                TypeKind::Object { fields, interfaces }
                | TypeKind::Interface { fields, interfaces } => {
                    for iface in interfaces {
                        let location = format!("\"{}\" implements", ty.name);
                        self.expect_kind(iface, &location, "an Interface", |k| {
                            matches!(k, TypeKind::Interface { .. })
                        })?;
                    }
                    for field in fields {
                        let location = format!("{}.{}", ty.name, field.name);
                        self.expect_kind(
                            field.ty.named(),
                            &location,
                            "an output",
                            TypeKind::is_output,
                        )?;
                        for arg in &field.args {
                            let location = format!("{}.{}({}:)", ty.name, field.name, arg.name);
                            self.expect_kind(
                                arg.ty.named(),
                                &location,
                                "an input",
                                TypeKind::is_input,
                            )?;
                        }
                    }
                }
                TypeKind::Union { members } => {
                    for member in members {
                        let location = format!("union \"{}\"", ty.name);
                        self.expect_kind(member, &location, "an Object", |k| {
                            matches!(k, TypeKind::Object { .. })
                        })?;
                    }
                }
                TypeKind::InputObject { fields } => {
                    for field in fields {
                        let location = format!("{}.{}", ty.name, field.name);
                        self.expect_kind(
                            field.ty.named(),
                            &location,
                            "an input",
                            TypeKind::is_input,
                        )?;
                    }
                }
                TypeKind::Scalar | TypeKind::Enum { .. } => {}
            }
        }

        for directive in &self.directives {
            for arg in &directive.args {
                let location = format!("@{}({}:)", directive.name, arg.name);
                self.expect_kind(arg.ty.named(), &location, "an input", TypeKind::is_input)?;
            }
        }

        Ok(())
    }

    fn expect_kind(
        &self,
        name: &str,
        location: &str,
        expected: &'static str,
        allowed: impl Fn(&TypeKind) -> bool,
    ) -> Result<(), SchemaBuildError> {
        if BUILT_IN_SCALARS.contains(&name) {
            return if allowed(&TypeKind::Scalar) {
                Ok(())
            } else {
                Err(SchemaBuildError::UnexpectedType {
                    name: name.to_string(),
                    location: location.to_string(),
                    expected,
                })
            };
        }

        match self.get_type(name) {
            None => Err(SchemaBuildError::UndefinedType {
                name: name.to_string(),
                location: location.to_string(),
            }),
            Some(ty) if !allowed(&ty.kind) => Err(SchemaBuildError::UnexpectedType {
                name: name.to_string(),
                location: location.to_string(),
                expected,
            }),
            Some(_) => Ok(()),
        }
    }
}

impl NamedType {
    /// Returns true if both types are the same kind (object, enum, ...).
    pub fn same_kind(&self, other: &NamedType) -> bool {
        self.kind.same_kind(&other.kind)
    }
}

fn enum_value_name(value: &EnumValue<'_, String>) -> String {
    value.name.clone()
}

fn named_type(def: &TypeDefinition<'_, String>) -> NamedType {
    let (name, kind) = match def {
        TypeDefinition::Scalar(t) => (t.name.clone(), TypeKind::Scalar),
        TypeDefinition::Object(t) => (
            t.name.clone(),
            TypeKind::Object {
                fields: t.fields.iter().map(FieldDef::from).collect(),
                interfaces: t.implements_interfaces.clone(),
            },
        ),
        TypeDefinition::Interface(t) => (
            t.name.clone(),
            TypeKind::Interface {
                fields: t.fields.iter().map(FieldDef::from).collect(),
                interfaces: t.implements_interfaces.clone(),
            },
        ),
        TypeDefinition::Union(t) => (
            t.name.clone(),
            TypeKind::Union {
                members: t.types.clone(),
            },
        ),
        TypeDefinition::Enum(t) => (
            t.name.clone(),
            TypeKind::Enum {
                values: t.values.iter().map(enum_value_name).collect(),
            },
        ),
        TypeDefinition::InputObject(t) => (
            t.name.clone(),
            TypeKind::InputObject {
                fields: t.fields.iter().map(InputValueDef::from).collect(),
            },
        ),
    };
    NamedType { name, kind }
}

fn extension_name<'e>(ext: &'e TypeExtension<'_, String>) -> &'e str {
    match ext {
        TypeExtension::Scalar(e) => &e.name,
        TypeExtension::Object(e) => &e.name,
        TypeExtension::Interface(e) => &e.name,
        TypeExtension::Union(e) => &e.name,
        TypeExtension::Enum(e) => &e.name,
        TypeExtension::InputObject(e) => &e.name,
    }
}
