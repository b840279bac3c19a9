//! Error types for schema construction, serialization and configuration.
//!
//! Nothing here is raised at request time. Every variant surfaces while the
//! application is starting up and is expected to abort the bootstrap.

/// Errors raised while populating, configuring or exporting a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A type, field, argument or enum value name is not a valid GraphQL name.
    #[error("invalid GraphQL name `{name}` for {context}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// What the name was produced for.
        context: String,
    },

    /// Two different definitions share one type name.
    #[error("type `{0}` is already defined with a different shape")]
    DuplicateType(String),

    /// A type referenced by name does not exist in the schema.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// A field with the same name already exists on the type.
    #[error("field `{field}` already exists on type `{type_name}`")]
    DuplicateField {
        /// Owning type.
        type_name: String,
        /// Field name.
        field: String,
    },

    /// The root context type is not an object type.
    #[error("context type `{0}` must be an object type")]
    InvalidContext(String),

    /// async-graphql rejected the exported schema.
    #[error("failed to build GraphQL schema: {0}")]
    Build(String),

    /// A configuration hook failed.
    #[error("schema configuration failed: {0}")]
    Hook(String),
}

impl SchemaError {
    /// Convenience constructor for hooks that want to abort configuration.
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook(message.into())
    }
}

/// Errors raised by the default request deserializer and response serializer.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// The request body is not a valid GraphQL-over-JSON request.
    #[error("malformed GraphQL request: {0}")]
    Request(#[source] serde_json::Error),

    /// The request carried an empty query document.
    #[error("GraphQL request is missing a query")]
    MissingQuery,

    /// The response could not be encoded.
    #[error("failed to serialize GraphQL response: {0}")]
    Response(#[source] serde_json::Error),
}

/// Errors raised while loading the `[graphql]` configuration section.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid graphql configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value failed validation.
    #[error("invalid graphql configuration: {0}")]
    Invalid(String),
}
