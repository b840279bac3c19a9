//! GraphQL schema configuration.
//!
//! Configuration can be read from the `[graphql]` section of the
//! application's TOML file and turned into registration options.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! auto_create_id_arguments = true
//! auto_create_enum_types = false
//! field_naming = "preserve"
//! max_depth = 10
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::naming::{FieldNamer, default_namer, preserve_namer};
use crate::schema::SchemaBuilderConfig;

/// How source field names are exposed in the schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldNaming {
    /// `created_at` becomes `createdAt`.
    #[default]
    LowerCamelCase,
    /// Names are used as written.
    Preserve,
}

impl FieldNaming {
    #[must_use]
    pub fn namer(self) -> FieldNamer {
        match self {
            Self::LowerCamelCase => default_namer(),
            Self::Preserve => preserve_namer(),
        }
    }
}

/// GraphQL schema configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Add a singular `entity(id:)` field for collections whose element type
    /// has an id field.
    /// Default: true
    #[serde(default = "default_true")]
    pub auto_create_id_arguments: bool,

    /// Add enum types found in the context graph.
    /// Default: true
    #[serde(default = "default_true")]
    pub auto_create_enum_types: bool,

    /// Populate the schema from the context graph at all.
    /// Default: true
    #[serde(default = "default_true")]
    pub auto_build_schema_from_context: bool,

    /// Field naming convention.
    /// Default: lower_camel_case
    #[serde(default)]
    pub field_naming: FieldNaming,

    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable introspection queries.
    /// Default: true
    #[serde(default = "default_true")]
    pub introspection: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            auto_create_id_arguments: default_true(),
            auto_create_enum_types: default_true(),
            auto_build_schema_from_context: default_true(),
            field_naming: FieldNaming::default(),
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_true(),
        }
    }
}

impl GraphQLConfig {
    /// Parses and validates a `[graphql]` section body.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is invalid.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("graphql.max_depth must be > 0".into()));
        }
        if self.max_complexity == 0 {
            return Err(ConfigError::Invalid(
                "graphql.max_complexity must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Converts this config to a SchemaBuilderConfig.
    #[must_use]
    pub fn to_schema_builder_config(&self) -> SchemaBuilderConfig {
        SchemaBuilderConfig {
            max_depth: self.max_depth,
            max_complexity: self.max_complexity,
            introspection_enabled: self.introspection,
        }
    }
}
