//! Object-graph descriptors.
//!
//! Rust has no runtime reflection, so a context type describes its own shape
//! by implementing [`Reflect`]. Fields that point at other types hold the
//! target's `type_info` function rather than its descriptor, which lets the
//! graph contain cycles (`Person.friends: [Person]`) without recursion at
//! construction time.
//!
//! # Example
//!
//! ```
//! use entity_graphql::model::{FieldInfo, ObjectInfo, Reflect, ScalarKind, TypeInfo};
//!
//! struct Person;
//!
//! impl Reflect for Person {
//!     fn type_info() -> TypeInfo {
//!         ObjectInfo::new("Person")
//!             .field(FieldInfo::id("id"))
//!             .field(FieldInfo::scalar("name", ScalarKind::String))
//!             .into()
//!     }
//! }
//!
//! struct Context;
//!
//! impl Reflect for Context {
//!     fn type_info() -> TypeInfo {
//!         ObjectInfo::new("Context")
//!             .field(FieldInfo::list_of::<Person>("people"))
//!             .into()
//!     }
//! }
//! ```

use std::fmt;

use crate::authorization::RequiredAuthorization;

/// Describes a type's shape for schema population.
pub trait Reflect: 'static {
    /// Returns the descriptor of this type.
    fn type_info() -> TypeInfo;
}

/// Built-in and custom scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Id,
    String,
    Int,
    Float,
    Boolean,
    /// A custom scalar, registered in the schema on first use.
    Custom(&'static str),
}

impl ScalarKind {
    /// Returns the GraphQL type name of this scalar.
    #[must_use]
    pub fn graphql_name(&self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::Custom(name) => name,
        }
    }

    /// Returns whether the scalar is one of the GraphQL built-ins.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

/// The type a field points at.
#[derive(Clone, Copy)]
pub enum FieldType {
    Scalar(ScalarKind),
    /// An object or enum type, resolved lazily.
    Named(fn() -> TypeInfo),
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Self::Named(_) => f.write_str("Named(..)"),
        }
    }
}

/// Describes one field of an object type.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub ty: FieldType,
    pub nullable: bool,
    pub list: bool,
    pub required_auth: RequiredAuthorization,
}

impl FieldInfo {
    fn new(name: &'static str, ty: FieldType, list: bool) -> Self {
        Self {
            name,
            description: None,
            ty,
            nullable: false,
            list,
            required_auth: RequiredAuthorization::default(),
        }
    }

    /// A non-null scalar field.
    #[must_use]
    pub fn scalar(name: &'static str, kind: ScalarKind) -> Self {
        Self::new(name, FieldType::Scalar(kind), false)
    }

    /// A non-null `ID` field.
    #[must_use]
    pub fn id(name: &'static str) -> Self {
        Self::scalar(name, ScalarKind::Id)
    }

    /// A list of scalars.
    #[must_use]
    pub fn scalar_list(name: &'static str, kind: ScalarKind) -> Self {
        Self::new(name, FieldType::Scalar(kind), true)
    }

    /// A field pointing at a single object or enum value.
    #[must_use]
    pub fn named<T: Reflect>(name: &'static str) -> Self {
        Self::new(name, FieldType::Named(T::type_info), false)
    }

    /// A collection of objects or enum values.
    #[must_use]
    pub fn list_of<T: Reflect>(name: &'static str) -> Self {
        Self::new(name, FieldType::Named(T::type_info), true)
    }

    /// Marks the field as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the field description.
    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Requires the caller to hold at least one of `roles`.
    #[must_use]
    pub fn requires_any_role(mut self, roles: &[&str]) -> Self {
        self.required_auth = self.required_auth.require_any_role(roles.iter().copied());
        self
    }

    /// Requires at least one of `policies` to pass.
    #[must_use]
    pub fn requires_any_policy(mut self, policies: &[&str]) -> Self {
        self.required_auth = self
            .required_auth
            .require_any_policy(policies.iter().copied());
        self
    }
}

/// Describes an object type.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub fields: Vec<FieldInfo>,
    pub required_auth: RequiredAuthorization,
}

impl ObjectInfo {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            description: None,
            fields: Vec::new(),
            required_auth: RequiredAuthorization::default(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Requires the caller to hold at least one of `roles` to see this type.
    #[must_use]
    pub fn requires_any_role(mut self, roles: &[&str]) -> Self {
        self.required_auth = self.required_auth.require_any_role(roles.iter().copied());
        self
    }

    /// Returns the scalar field named `id` (case-insensitive), if any.
    #[must_use]
    pub fn id_field(&self) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| {
            field.name.eq_ignore_ascii_case("id")
                && !field.list
                && matches!(field.ty, FieldType::Scalar(_))
        })
    }

    pub(crate) fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }
}

/// Describes an enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub values: Vec<&'static str>,
}

impl EnumInfo {
    #[must_use]
    pub fn new(name: &'static str, values: &[&'static str]) -> Self {
        Self {
            name,
            description: None,
            values: values.to_vec(),
        }
    }

    #[must_use]
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// Descriptor returned by [`Reflect::type_info`].
#[derive(Debug, Clone)]
pub enum TypeInfo {
    Object(ObjectInfo),
    Enum(EnumInfo),
}

impl TypeInfo {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Object(object) => object.name,
            Self::Enum(enumeration) => enumeration.name,
        }
    }
}

impl From<ObjectInfo> for TypeInfo {
    fn from(object: ObjectInfo) -> Self {
        Self::Object(object)
    }
}

impl From<EnumInfo> for TypeInfo {
    fn from(enumeration: EnumInfo) -> Self {
        Self::Enum(enumeration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Genre;

    impl Reflect for Genre {
        fn type_info() -> TypeInfo {
            EnumInfo::new("Genre", &["DRAMA", "COMEDY"]).into()
        }
    }

    struct Movie;

    impl Reflect for Movie {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("Movie")
                .field(FieldInfo::id("Id"))
                .field(FieldInfo::scalar("title", ScalarKind::String))
                .field(FieldInfo::named::<Genre>("genre").nullable())
                .into()
        }
    }

    #[test]
    fn test_scalar_names() {
        assert_eq!(ScalarKind::Id.graphql_name(), "ID");
        assert_eq!(ScalarKind::Custom("Date").graphql_name(), "Date");
        assert!(ScalarKind::Boolean.is_builtin());
        assert!(!ScalarKind::Custom("Date").is_builtin());
    }

    #[test]
    fn test_id_field_is_case_insensitive() {
        let TypeInfo::Object(movie) = Movie::type_info() else {
            panic!("Movie should be an object");
        };
        assert_eq!(movie.id_field().map(|f| f.name), Some("Id"));
    }

    #[test]
    fn test_named_field_resolves_lazily() {
        let TypeInfo::Object(movie) = Movie::type_info() else {
            panic!("Movie should be an object");
        };
        let genre = &movie.fields[2];
        assert!(genre.nullable);
        match genre.ty {
            FieldType::Named(info) => assert_eq!(info().name(), "Genre"),
            FieldType::Scalar(_) => panic!("genre should be a named type"),
        }
    }

    #[test]
    fn test_field_requirements() {
        let field = FieldInfo::scalar("salary", ScalarKind::Float)
            .requires_any_role(&["admin", "hr"])
            .requires_any_policy(&["can-see-salary"]);
        assert_eq!(field.required_auth.roles().len(), 1);
        assert_eq!(field.required_auth.policies().len(), 1);
    }
}
