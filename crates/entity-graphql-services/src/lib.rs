//! # entity-graphql-services
//!
//! Registers [`entity_graphql::SchemaProvider`] singletons into an
//! application service registry.
//!
//! Registration runs once during startup. It installs the default request
//! deserializer and response serializer unless the application already
//! provided its own, builds the schema for a context type, and stores it as
//! the singleton for that type, replacing an earlier registration.
//!
//! ## Modules
//!
//! - [`registry`] - Type-keyed singleton registry
//! - [`registration`] - `add_graphql_schema*` extension methods and options
//! - [`error`] - Registration errors

pub mod error;
pub mod registration;
pub mod registry;

pub use error::RegistrationError;
pub use registration::{GraphQLOptionsBuilder, GraphQLServiceCollectionExt, SchemaHook};
pub use registry::{
    ErasedService, ServiceCollection, ServiceDescriptor, ServiceRegistry, ServiceRegistryExt,
};
