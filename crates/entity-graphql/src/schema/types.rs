//! Schema definitions.

use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;

use crate::authorization::RequiredAuthorization;
use crate::error::SchemaError;

/// The declared return type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnType {
    pub type_name: String,
    pub list: bool,
    pub nullable: bool,
}

impl ReturnType {
    /// A non-null single value.
    #[must_use]
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            list: false,
            nullable: false,
        }
    }

    /// A non-null list of non-null values.
    #[must_use]
    pub fn list_of(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            list: true,
            nullable: false,
        }
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// List items are always non-null; `nullable` applies to the outer type.
    pub(crate) fn to_type_ref(&self) -> TypeRef {
        match (self.list, self.nullable) {
            (false, true) => TypeRef::named(&self.type_name),
            (false, false) => TypeRef::named_nn(&self.type_name),
            (true, true) => TypeRef::named_nn_list(&self.type_name),
            (true, false) => TypeRef::named_nn_list_nn(&self.type_name),
        }
    }
}

/// A field argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDef {
    pub name: String,
    pub type_name: String,
    pub required: bool,
}

impl ArgumentDef {
    #[must_use]
    pub fn required(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: true,
        }
    }

    #[must_use]
    pub fn optional(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: false,
        }
    }

    pub(crate) fn to_type_ref(&self) -> TypeRef {
        if self.required {
            TypeRef::named_nn(&self.type_name)
        } else {
            TypeRef::named(&self.type_name)
        }
    }
}

/// A field on an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub description: Option<String>,
    pub return_type: ReturnType,
    pub arguments: Vec<ArgumentDef>,
    pub required_auth: RequiredAuthorization,
}

impl SchemaField {
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: ReturnType) -> Self {
        Self {
            name: name.into(),
            description: None,
            return_type,
            arguments: Vec::new(),
            required_auth: RequiredAuthorization::default(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: ArgumentDef) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn requires(mut self, required: RequiredAuthorization) -> Self {
        self.required_auth = required;
        self
    }

    #[must_use]
    pub fn argument_named(&self, name: &str) -> Option<&ArgumentDef> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

/// An object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaType {
    pub name: String,
    pub description: Option<String>,
    pub required_auth: RequiredAuthorization,
    fields: IndexMap<String, SchemaField>,
}

impl SchemaType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required_auth: RequiredAuthorization::default(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateField` if the name is taken.
    pub fn add_field(&mut self, field: SchemaField) -> Result<(), SchemaError> {
        if self.fields.contains_key(&field.name) {
            return Err(SchemaError::DuplicateField {
                type_name: self.name.clone(),
                field: field.name,
            });
        }
        self.fields.insert(field.name.clone(), field);
        Ok(())
    }

    /// Adds or overwrites a field, returning the previous definition.
    pub fn replace_field(&mut self, field: SchemaField) -> Option<SchemaField> {
        self.fields.insert(field.name.clone(), field)
    }

    /// Removes a field, keeping the order of the remaining ones.
    pub fn remove_field(&mut self, name: &str) -> Option<SchemaField> {
        self.fields.shift_remove(name)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut SchemaField> {
        self.fields.get_mut(name)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.values()
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// An enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

impl EnumType {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A custom scalar type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
}

impl ScalarType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
