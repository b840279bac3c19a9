//! # entity-graphql
//!
//! GraphQL schema provider built by walking a context type's object graph.
//!
//! An application describes its data model through the [`model::Reflect`]
//! trait. A [`SchemaProvider`] parameterised by the root context type then
//! derives object types, enum types and root query fields from that graph,
//! optionally adding a singular `entity(id: ...)` field for every collection
//! whose element type carries an `id` field.
//!
//! ## Overview
//!
//! The provider keeps plain definitions ([`SchemaType`], [`SchemaField`],
//! [`EnumType`]) so configuration hooks can adjust them freely. Once
//! configured, [`SchemaProvider::build_schema`] exports the definitions
//! through async-graphql's dynamic schema API.
//!
//! ## Configuration
//!
//! ```toml
//! [graphql]
//! auto_create_id_arguments = true
//! auto_create_enum_types = true
//! auto_build_schema_from_context = true
//! field_naming = "lower_camel_case"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Object-graph descriptors the schema is populated from
//! - [`schema`] - Schema provider, definitions and dynamic schema export
//! - [`naming`] - Field naming and pluralisation helpers
//! - [`authorization`] - Role and policy based authorization strategy
//! - [`serialization`] - Default request/response serializers
//! - [`config`] - Configuration options
//! - [`error`] - Error types

pub mod authorization;
pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod schema;
pub mod serialization;

pub use authorization::{
    AuthorizationService, PolicyOrRoleBasedAuthorization, RequiredAuthorization, UserContext,
};
pub use config::{FieldNaming, GraphQLConfig};
pub use error::{ConfigError, SchemaError, SerializationError};
pub use model::{EnumInfo, FieldInfo, FieldType, ObjectInfo, Reflect, ScalarKind, TypeInfo};
pub use naming::{FieldNamer, default_namer};
pub use schema::{
    ArgumentDef, EnumType, QUERY_TYPE_NAME, ReturnType, ScalarType, SchemaBuilderConfig,
    SchemaField, SchemaProvider, SchemaType,
};
pub use serialization::{
    DefaultRequestDeserializer, DefaultResponseSerializer, QueryRequest, RequestDeserializer,
    ResponseSerializer,
};

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
