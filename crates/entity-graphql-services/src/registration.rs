//! Schema registration.
//!
//! [`GraphQLServiceCollectionExt`] adds `add_graphql_schema*` methods to every
//! [`ServiceRegistry`]. Each shorthand builds a [`GraphQLOptionsBuilder`] and
//! hands it to [`add_graphql_schema_with`], which does the actual work:
//!
//! 1. Install the default request deserializer and response serializer,
//!    keeping any the application registered earlier
//! 2. Run the caller's options closure
//! 3. Pick the authorization service: the one set on the options, otherwise
//!    whatever is registered at this moment
//! 4. Create the schema, run the pre-build hook, populate it from the
//!    context graph, run the configure hook
//! 5. Register the schema, replacing a previous one for the same context
//!
//! # Example
//!
//! ```ignore
//! let mut services = ServiceCollection::new();
//! services
//!     .add_graphql_schema_configured::<DemoContext, _>(|schema| {
//!         schema.remove_query_field("secrets");
//!         Ok(())
//!     })?
//!     .add_graphql_schema::<AuditContext>()?;
//!
//! let schema = services.resolve::<SchemaProvider<DemoContext>>().unwrap();
//! ```
//!
//! [`add_graphql_schema_with`]: GraphQLServiceCollectionExt::add_graphql_schema_with

use std::fmt;
use std::sync::Arc;

use entity_graphql::{
    AuthorizationService, DefaultRequestDeserializer, DefaultResponseSerializer, FieldNamer,
    GraphQLConfig, PolicyOrRoleBasedAuthorization, Reflect, RequestDeserializer,
    ResponseSerializer, SchemaBuilderConfig, SchemaError, SchemaProvider, default_namer,
};
use tracing::{debug, info};

use crate::error::RegistrationError;
use crate::registry::{ServiceRegistry, ServiceRegistryExt};

/// A hook run against the schema during registration.
pub type SchemaHook<C> = Box<dyn FnOnce(&mut SchemaProvider<C>) -> Result<(), SchemaError> + Send>;

/// Options for registering the schema of context type `C`.
pub struct GraphQLOptionsBuilder<C> {
    /// Add `entity(id:)` lookup fields for collections of types with an id.
    pub auto_create_id_arguments: bool,
    /// Add enum types found in the context graph.
    pub auto_create_enum_types: bool,
    /// Names schema fields. Defaults to lower camel case.
    pub field_namer: FieldNamer,
    /// Runs before the schema is populated from the context.
    pub pre_build_schema_from_context: Option<SchemaHook<C>>,
    /// Runs after the schema is populated from the context.
    pub configure_schema: Option<SchemaHook<C>>,
    /// Populate the schema from the context graph at all.
    pub auto_build_schema_from_context: bool,
    /// Policy service for the authorization strategy. When unset, the one
    /// registered in the registry at registration time is used.
    pub authorization_service: Option<Arc<dyn AuthorizationService>>,
    /// Limits applied when the schema is exported.
    pub builder_config: SchemaBuilderConfig,
}

impl<C> Default for GraphQLOptionsBuilder<C> {
    fn default() -> Self {
        Self {
            auto_create_id_arguments: true,
            auto_create_enum_types: true,
            field_namer: default_namer(),
            pre_build_schema_from_context: None,
            configure_schema: None,
            auto_build_schema_from_context: true,
            authorization_service: None,
            builder_config: SchemaBuilderConfig::default(),
        }
    }
}

impl<C> fmt::Debug for GraphQLOptionsBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQLOptionsBuilder")
            .field("auto_create_id_arguments", &self.auto_create_id_arguments)
            .field("auto_create_enum_types", &self.auto_create_enum_types)
            .field("pre_build_schema_from_context", &self.pre_build_schema_from_context.is_some())
            .field("configure_schema", &self.configure_schema.is_some())
            .field("auto_build_schema_from_context", &self.auto_build_schema_from_context)
            .field("authorization_service", &self.authorization_service.is_some())
            .field("builder_config", &self.builder_config)
            .finish()
    }
}

impl<C> GraphQLOptionsBuilder<C> {
    /// Sets the hook run before population.
    pub fn pre_build<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce(&mut SchemaProvider<C>) -> Result<(), SchemaError> + Send + 'static,
    {
        self.pre_build_schema_from_context = Some(Box::new(hook));
        self
    }

    /// Sets the hook run after population.
    pub fn configure<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce(&mut SchemaProvider<C>) -> Result<(), SchemaError> + Send + 'static,
    {
        self.configure_schema = Some(Box::new(hook));
        self
    }

    /// Uses `service` for policy checks instead of looking one up.
    pub fn authorization_service(&mut self, service: Arc<dyn AuthorizationService>) -> &mut Self {
        self.authorization_service = Some(service);
        self
    }

    /// Copies flags, naming and limits from a `[graphql]` config section.
    pub fn apply_config(&mut self, config: &GraphQLConfig) -> &mut Self {
        self.auto_create_id_arguments = config.auto_create_id_arguments;
        self.auto_create_enum_types = config.auto_create_enum_types;
        self.auto_build_schema_from_context = config.auto_build_schema_from_context;
        self.field_namer = config.field_naming.namer();
        self.builder_config = config.to_schema_builder_config();
        self
    }
}

/// Registers GraphQL schemas into a service registry.
pub trait GraphQLServiceCollectionExt: ServiceRegistry + Sized {
    /// Registers the schema for `C` with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if populating the schema fails.
    fn add_graphql_schema<C: Reflect>(&mut self) -> Result<&mut Self, RegistrationError> {
        self.add_graphql_schema_full::<C>(true, true, None, None)
    }

    /// Registers the schema for `C`, running `configure` after population.
    ///
    /// # Errors
    ///
    /// Returns an error if population or `configure` fails.
    fn add_graphql_schema_configured<C, F>(&mut self, configure: F) -> Result<&mut Self, RegistrationError>
    where
        C: Reflect,
        F: FnOnce(&mut SchemaProvider<C>) -> Result<(), SchemaError> + Send + 'static,
    {
        self.add_graphql_schema_full::<C>(true, true, None, Some(Box::new(configure)))
    }

    /// Registers the schema for `C` with explicit population flags and an
    /// optional field namer.
    ///
    /// # Errors
    ///
    /// Returns an error if populating the schema fails.
    fn add_graphql_schema_with_flags<C: Reflect>(
        &mut self,
        auto_create_id_arguments: bool,
        auto_create_enum_types: bool,
        field_namer: Option<FieldNamer>,
    ) -> Result<&mut Self, RegistrationError> {
        self.add_graphql_schema_full::<C>(auto_create_id_arguments, auto_create_enum_types, field_namer, None)
    }

    /// Registers the schema for `C` with explicit population flags and a
    /// configure hook.
    ///
    /// # Errors
    ///
    /// Returns an error if population or `configure` fails.
    fn add_graphql_schema_with_flags_configured<C, F>(
        &mut self,
        auto_create_id_arguments: bool,
        auto_create_enum_types: bool,
        configure: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        C: Reflect,
        F: FnOnce(&mut SchemaProvider<C>) -> Result<(), SchemaError> + Send + 'static,
    {
        self.add_graphql_schema_full::<C>(
            auto_create_id_arguments,
            auto_create_enum_types,
            None,
            Some(Box::new(configure)),
        )
    }

    /// Registers the schema for `C` with every shorthand option spelled out.
    ///
    /// # Errors
    ///
    /// Returns an error if population or `configure` fails.
    fn add_graphql_schema_full<C: Reflect>(
        &mut self,
        auto_create_id_arguments: bool,
        auto_create_enum_types: bool,
        field_namer: Option<FieldNamer>,
        configure: Option<SchemaHook<C>>,
    ) -> Result<&mut Self, RegistrationError> {
        self.add_graphql_schema_with::<C, _>(move |options| {
            options.auto_create_id_arguments = auto_create_id_arguments;
            options.auto_create_enum_types = auto_create_enum_types;
            options.field_namer = field_namer.unwrap_or_else(default_namer);
            options.configure_schema = configure;
        })
    }

    /// Registers the schema for `C` using options from a `[graphql]` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or population fails.
    fn add_graphql_schema_from_config<C: Reflect>(
        &mut self,
        config: &GraphQLConfig,
    ) -> Result<&mut Self, RegistrationError> {
        config.validate()?;
        self.add_graphql_schema_with::<C, _>(|options| {
            options.apply_config(config);
        })
    }

    /// Registers the schema for `C`, letting `build` set up the options.
    ///
    /// # Errors
    ///
    /// Returns whatever a hook or schema population returns.
    fn add_graphql_schema_with<C, F>(&mut self, build: F) -> Result<&mut Self, RegistrationError>
    where
        C: Reflect,
        F: FnOnce(&mut GraphQLOptionsBuilder<C>),
    {
        let deserializer: Arc<dyn RequestDeserializer> = Arc::new(DefaultRequestDeserializer);
        if self.ensure_present(deserializer) {
            debug!("Registered default GraphQL request deserializer");
        }
        let serializer: Arc<dyn ResponseSerializer> = Arc::new(DefaultResponseSerializer);
        if self.ensure_present(serializer) {
            debug!("Registered default GraphQL response serializer");
        }

        let mut options = GraphQLOptionsBuilder::<C>::default();
        build(&mut options);

        let auth_service = options
            .authorization_service
            .take()
            .or_else(|| self.resolve::<dyn AuthorizationService>());
        debug!(
            context = std::any::type_name::<C>(),
            has_auth_service = auth_service.is_some(),
            auto_build = options.auto_build_schema_from_context,
            "Building GraphQL schema"
        );

        let authorization = Arc::new(PolicyOrRoleBasedAuthorization::new(auth_service));
        let mut schema = SchemaProvider::<C>::new(authorization, options.field_namer);
        schema.set_builder_config(options.builder_config);

        if let Some(pre_build) = options.pre_build_schema_from_context {
            pre_build(&mut schema)?;
        }
        if options.auto_build_schema_from_context {
            schema.populate_from_context(
                options.auto_create_id_arguments,
                options.auto_create_enum_types,
            )?;
        }
        if let Some(configure) = options.configure_schema {
            configure(&mut schema)?;
        }

        if self.replace(Arc::new(schema)).is_some() {
            info!(
                context = std::any::type_name::<C>(),
                "Replaced previously registered GraphQL schema"
            );
        } else {
            info!(context = std::any::type_name::<C>(), "Registered GraphQL schema");
        }
        Ok(self)
    }
}

impl<R: ServiceRegistry> GraphQLServiceCollectionExt for R {}

#[cfg(test)]
mod tests {
    use entity_graphql::{FieldInfo, ObjectInfo, ScalarKind, TypeInfo};

    use super::*;
    use crate::registry::ServiceCollection;

    struct Note;

    impl Reflect for Note {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("Note")
                .field(FieldInfo::id("id"))
                .field(FieldInfo::scalar("body_text", ScalarKind::String))
                .into()
        }
    }

    struct Notebook;

    impl Reflect for Notebook {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("Notebook")
                .field(FieldInfo::list_of::<Note>("notes"))
                .into()
        }
    }

    #[test]
    fn test_default_options() {
        let options = GraphQLOptionsBuilder::<Notebook>::default();
        assert!(options.auto_create_id_arguments);
        assert!(options.auto_create_enum_types);
        assert!(options.auto_build_schema_from_context);
        assert!(options.pre_build_schema_from_context.is_none());
        assert!(options.configure_schema.is_none());
        assert_eq!((options.field_namer)("body_text"), "bodyText");
    }

    #[test]
    fn test_apply_config() {
        let config = GraphQLConfig::from_toml_str(
            r#"
                auto_create_id_arguments = false
                auto_build_schema_from_context = false
                field_naming = "preserve"
                max_depth = 3
            "#,
        )
        .unwrap();

        let mut options = GraphQLOptionsBuilder::<Notebook>::default();
        options.apply_config(&config);

        assert!(!options.auto_create_id_arguments);
        assert!(options.auto_create_enum_types);
        assert!(!options.auto_build_schema_from_context);
        assert_eq!((options.field_namer)("body_text"), "body_text");
        assert_eq!(options.builder_config.max_depth, 3);
    }

    #[test]
    fn test_add_graphql_schema_registers_everything() {
        let mut services = ServiceCollection::new();
        services.add_graphql_schema::<Notebook>().unwrap();

        assert!(services.is_registered::<dyn RequestDeserializer>());
        assert!(services.is_registered::<dyn ResponseSerializer>());

        let schema = services.resolve::<SchemaProvider<Notebook>>().unwrap();
        assert!(schema.is_populated());
        assert!(schema.query().has_field("note"));
        assert!(schema.type_named("Note").unwrap().has_field("bodyText"));
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut services = ServiceCollection::new();
        let config = GraphQLConfig {
            max_complexity: 0,
            ..Default::default()
        };

        let result = services.add_graphql_schema_from_config::<Notebook>(&config);
        assert!(matches!(result, Err(RegistrationError::Config(_))));
        assert!(services.is_empty());
    }

    #[test]
    fn test_from_config_applies_options() {
        let mut services = ServiceCollection::new();
        let config = GraphQLConfig {
            auto_create_id_arguments: false,
            max_depth: 4,
            ..Default::default()
        };
        services.add_graphql_schema_from_config::<Notebook>(&config).unwrap();

        let schema = services.resolve::<SchemaProvider<Notebook>>().unwrap();
        assert!(!schema.query().has_field("note"));
        assert_eq!(schema.builder_config().max_depth, 4);
    }
}
