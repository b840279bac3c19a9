//! Export to an async-graphql dynamic schema.
//!
//! Field resolvers only read the same-named key from the parent value.
//! Fetching data for the root fields belongs to the request layer.

use async_graphql::Value;
use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, InputValue, Object, Scalar, Schema,
};
use tracing::debug;

use super::provider::{QUERY_TYPE_NAME, SchemaProvider};
use super::types::{SchemaField, SchemaType};
use crate::error::SchemaError;
use crate::model::Reflect;

/// Limits applied to the exported schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

impl<C: Reflect> SchemaProvider<C> {
    /// Builds an async-graphql dynamic schema from the current definitions.
    ///
    /// The `Query` type and every object type need at least one field. A
    /// provider registered without auto-build starts with an empty `Query`,
    /// so its hooks must add fields before the schema can be exported.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Build` if async-graphql rejects the schema,
    /// including when `Query` or an object type has no fields.
    pub fn build_schema(&self) -> Result<Schema, SchemaError> {
        debug!(context = self.context_type_name(), "Starting GraphQL schema export");
        let config = self.builder_config();

        let mut builder = Schema::build(QUERY_TYPE_NAME, None, None);

        for scalar in self.scalars() {
            let mut definition = Scalar::new(&scalar.name);
            if let Some(description) = &scalar.description {
                definition = definition.description(description);
            }
            builder = builder.register(definition);
        }

        for enum_type in self.enums() {
            let mut definition = Enum::new(&enum_type.name);
            if let Some(description) = &enum_type.description {
                definition = definition.description(description);
            }
            for value in &enum_type.values {
                definition = definition.item(EnumItem::new(value));
            }
            builder = builder.register(definition);
        }

        for schema_type in self.types() {
            builder = builder.register(object_from(schema_type));
        }
        builder = builder.register(object_from(self.query()));

        builder = builder
            .limit_depth(config.max_depth)
            .limit_complexity(config.max_complexity);
        if !config.introspection_enabled {
            builder = builder.disable_introspection();
        }

        let schema = builder
            .finish()
            .map_err(|e| SchemaError::Build(e.to_string()))?;

        debug!("GraphQL schema export complete");
        Ok(schema)
    }

    /// Renders the schema as SDL.
    ///
    /// # Errors
    ///
    /// Same as [`build_schema`](Self::build_schema).
    pub fn sdl(&self) -> Result<String, SchemaError> {
        Ok(self.build_schema()?.sdl())
    }
}

fn object_from(schema_type: &SchemaType) -> Object {
    let mut object = Object::new(&schema_type.name);
    if let Some(description) = &schema_type.description {
        object = object.description(description);
    }
    for field in schema_type.fields() {
        object = object.field(field_from(field));
    }
    object
}

fn field_from(schema_field: &SchemaField) -> Field {
    let key = schema_field.name.clone();
    let mut field = Field::new(
        &schema_field.name,
        schema_field.return_type.to_type_ref(),
        move |ctx| {
            let key = key.clone();
            FieldFuture::new(async move {
                if let Some(Value::Object(obj)) = ctx.parent_value.as_value() {
                    if let Some(value) = obj.get(key.as_str()) {
                        return Ok(Some(value.clone()));
                    }
                }
                Ok(None)
            })
        },
    );
    if let Some(description) = &schema_field.description {
        field = field.description(description);
    }
    for argument in &schema_field.arguments {
        field = field.argument(InputValue::new(&argument.name, argument.to_type_ref()));
    }
    field
}
