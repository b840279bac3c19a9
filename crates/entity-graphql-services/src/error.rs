//! Registration errors.

use entity_graphql::{ConfigError, SchemaError};

/// Errors raised while registering a schema.
///
/// Registration itself adds no failure modes; these wrap whatever schema
/// population, a configuration hook or config validation returned.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
