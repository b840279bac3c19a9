//! The schema provider for one context type.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use super::builder::SchemaBuilderConfig;
use super::types::{EnumType, ScalarType, SchemaField, SchemaType};
use crate::authorization::PolicyOrRoleBasedAuthorization;
use crate::error::SchemaError;
use crate::model::Reflect;
use crate::naming::{FieldNamer, is_valid_graphql_name};

/// Name of the root query type.
pub const QUERY_TYPE_NAME: &str = "Query";

const BUILTIN_SCALARS: [&str; 5] = ["ID", "String", "Int", "Float", "Boolean"];

/// GraphQL schema for the context type `C`.
///
/// Created empty, mutated by configuration hooks and
/// [`populate_from_context`](Self::populate_from_context), then shared
/// read-only behind an `Arc`.
pub struct SchemaProvider<C> {
    authorization: Arc<PolicyOrRoleBasedAuthorization>,
    field_namer: FieldNamer,
    builder_config: SchemaBuilderConfig,
    query: SchemaType,
    types: IndexMap<String, SchemaType>,
    enums: IndexMap<String, EnumType>,
    scalars: IndexMap<String, ScalarType>,
    populated: bool,
    _context: PhantomData<fn() -> C>,
}

impl<C> fmt::Debug for SchemaProvider<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaProvider")
            .field("context", &std::any::type_name::<C>())
            .field("authorization", &self.authorization)
            .field("query_fields", &self.query.field_count())
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("enums", &self.enums.keys().collect::<Vec<_>>())
            .field("populated", &self.populated)
            .finish()
    }
}

impl<C: Reflect> SchemaProvider<C> {
    /// Creates an empty provider.
    #[must_use]
    pub fn new(authorization: Arc<PolicyOrRoleBasedAuthorization>, field_namer: FieldNamer) -> Self {
        Self {
            authorization,
            field_namer,
            builder_config: SchemaBuilderConfig::default(),
            query: SchemaType::new(QUERY_TYPE_NAME),
            types: IndexMap::new(),
            enums: IndexMap::new(),
            scalars: IndexMap::new(),
            populated: false,
            _context: PhantomData,
        }
    }

    /// Name of the context type, as it describes itself.
    #[must_use]
    pub fn context_type_name(&self) -> &'static str {
        C::type_info().name()
    }

    #[must_use]
    pub fn authorization(&self) -> &Arc<PolicyOrRoleBasedAuthorization> {
        &self.authorization
    }

    #[must_use]
    pub fn field_namer(&self) -> &FieldNamer {
        &self.field_namer
    }

    /// Applies the field namer to a source name.
    #[must_use]
    pub fn name_field(&self, source_name: &str) -> String {
        (self.field_namer)(source_name)
    }

    #[must_use]
    pub fn builder_config(&self) -> &SchemaBuilderConfig {
        &self.builder_config
    }

    pub fn set_builder_config(&mut self, config: SchemaBuilderConfig) {
        self.builder_config = config;
    }

    /// Returns whether `populate_from_context` has run.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub(super) fn mark_populated(&mut self) {
        self.populated = true;
    }

    #[must_use]
    pub fn query(&self) -> &SchemaType {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut SchemaType {
        &mut self.query
    }

    /// Adds a root query field.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already taken.
    pub fn add_query_field(&mut self, field: SchemaField) -> Result<(), SchemaError> {
        ensure_valid_name(&field.name, || format!("field on {QUERY_TYPE_NAME}"))?;
        trace!(field = %field.name, "Adding query field");
        self.query.add_field(field)
    }

    pub fn remove_query_field(&mut self, name: &str) -> Option<SchemaField> {
        self.query.remove_field(name)
    }

    /// Adds an object type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already used by any type.
    pub fn add_type(&mut self, schema_type: SchemaType) -> Result<(), SchemaError> {
        ensure_valid_name(&schema_type.name, || "object type".to_string())?;
        if self.has_type(&schema_type.name) {
            return Err(SchemaError::DuplicateType(schema_type.name));
        }
        trace!(type_name = %schema_type.name, "Adding object type");
        self.types.insert(schema_type.name.clone(), schema_type);
        Ok(())
    }

    /// Runs `update` against an existing object type.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownType` if no such type exists, or whatever
    /// `update` returns.
    pub fn update_type<F>(&mut self, name: &str, update: F) -> Result<(), SchemaError>
    where
        F: FnOnce(&mut SchemaType) -> Result<(), SchemaError>,
    {
        let schema_type = if name == QUERY_TYPE_NAME {
            &mut self.query
        } else {
            self.types
                .get_mut(name)
                .ok_or_else(|| SchemaError::UnknownType(name.to_string()))?
        };
        update(schema_type)
    }

    /// Removes an object type. Fields pointing at it are left untouched.
    pub fn remove_type(&mut self, name: &str) -> Option<SchemaType> {
        self.types.shift_remove(name)
    }

    /// Adds an enum type.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is invalid or the type name is taken.
    pub fn add_enum(&mut self, enum_type: EnumType) -> Result<(), SchemaError> {
        ensure_valid_name(&enum_type.name, || "enum type".to_string())?;
        for value in &enum_type.values {
            ensure_valid_name(value, || format!("value of enum {}", enum_type.name))?;
        }
        if self.has_type(&enum_type.name) {
            return Err(SchemaError::DuplicateType(enum_type.name));
        }
        trace!(enum_name = %enum_type.name, "Adding enum type");
        self.enums.insert(enum_type.name.clone(), enum_type);
        Ok(())
    }

    /// Adds a custom scalar. Adding the same scalar twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or used by a non-scalar type.
    pub fn add_scalar(&mut self, scalar: ScalarType) -> Result<(), SchemaError> {
        if self.scalars.contains_key(&scalar.name) || BUILTIN_SCALARS.contains(&scalar.name.as_str()) {
            return Ok(());
        }
        ensure_valid_name(&scalar.name, || "scalar type".to_string())?;
        if self.has_type(&scalar.name) {
            return Err(SchemaError::DuplicateType(scalar.name));
        }
        trace!(scalar = %scalar.name, "Adding scalar type");
        self.scalars.insert(scalar.name.clone(), scalar);
        Ok(())
    }

    /// Returns whether any type (object, enum, scalar or built-in) uses `name`.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        name == QUERY_TYPE_NAME
            || BUILTIN_SCALARS.contains(&name)
            || self.types.contains_key(name)
            || self.enums.contains_key(name)
            || self.scalars.contains_key(name)
    }

    #[must_use]
    pub fn type_named(&self, name: &str) -> Option<&SchemaType> {
        if name == QUERY_TYPE_NAME {
            return Some(&self.query);
        }
        self.types.get(name)
    }

    #[must_use]
    pub fn enum_named(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &SchemaType> {
        self.types.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumType> {
        self.enums.values()
    }

    pub fn scalars(&self) -> impl Iterator<Item = &ScalarType> {
        self.scalars.values()
    }

    /// Total number of fields across the query type and all object types.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.query.field_count() + self.types.values().map(SchemaType::field_count).sum::<usize>()
    }
}

pub(super) fn ensure_valid_name(
    name: &str,
    context: impl FnOnce() -> String,
) -> Result<(), SchemaError> {
    if is_valid_graphql_name(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidName {
            name: name.to_string(),
            context: context(),
        })
    }
}
