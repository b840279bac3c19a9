//! Schema provider and definitions.
//!
//! ## Components
//!
//! - [`SchemaProvider`] - Holds the schema for one context type
//! - [`SchemaType`], [`SchemaField`], [`EnumType`], [`ScalarType`] - Definitions
//!   the provider is made of, editable from configuration hooks
//! - [`SchemaBuilderConfig`] - Limits applied when exporting to async-graphql
//!
//! ## Lifecycle
//!
//! 1. The provider is created empty, with a root `Query` type
//! 2. An optional pre-build hook customises it
//! 3. `populate_from_context` walks the context graph
//! 4. An optional configure hook adjusts the result
//! 5. The provider is shared read-only; `build_schema` exports it

mod builder;
mod populate;
mod provider;
mod types;

pub use builder::SchemaBuilderConfig;
pub use provider::{QUERY_TYPE_NAME, SchemaProvider};
pub use types::{ArgumentDef, EnumType, ReturnType, ScalarType, SchemaField, SchemaType};
