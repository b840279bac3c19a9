//! Schema population from the context object graph.
//!
//! The walk is breadth-first from the context type. Object types are queued
//! the first time they are seen, so cycles in the graph terminate. Types a
//! pre-build hook already defined are left as they are.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, trace};

use super::provider::{SchemaProvider, ensure_valid_name};
use super::types::{ArgumentDef, EnumType, ReturnType, ScalarType, SchemaField, SchemaType};
use crate::error::SchemaError;
use crate::model::{EnumInfo, FieldInfo, FieldType, ObjectInfo, Reflect, ScalarKind, TypeInfo};
use crate::naming::singularize;

/// Tracks object types discovered during population.
struct GraphWalk {
    auto_create_enum_types: bool,
    /// Object name to its field names, used to detect name clashes.
    seen: HashMap<&'static str, Vec<&'static str>>,
    pending: VecDeque<ObjectInfo>,
}

impl GraphWalk {
    fn new(auto_create_enum_types: bool) -> Self {
        Self {
            auto_create_enum_types,
            seen: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    fn visit_object(&mut self, object: ObjectInfo) -> Result<(), SchemaError> {
        let field_names = object.field_names();
        match self.seen.get(object.name) {
            Some(known) if *known != field_names => {
                Err(SchemaError::DuplicateType(object.name.to_string()))
            }
            Some(_) => Ok(()),
            None => {
                self.seen.insert(object.name, field_names);
                self.pending.push_back(object);
                Ok(())
            }
        }
    }
}

impl<C: Reflect> SchemaProvider<C> {
    /// Populates the schema from the context type's object graph.
    ///
    /// Every field of the context type becomes a root query field and every
    /// reachable object type becomes a schema type. With
    /// `auto_create_id_arguments`, each collection on the context whose
    /// element type has an `id` field also gets a singular lookup field
    /// (`people` adds `person(id: ID!)`). With `auto_create_enum_types`,
    /// reachable enums are added as enum types; otherwise enum-typed fields
    /// are exposed as `String` unless the enum was defined beforehand.
    ///
    /// # Errors
    ///
    /// Returns an error if a produced name is invalid, two different types
    /// share a name, or the context type is not an object.
    pub fn populate_from_context(
        &mut self,
        auto_create_id_arguments: bool,
        auto_create_enum_types: bool,
    ) -> Result<(), SchemaError> {
        let root = match C::type_info() {
            TypeInfo::Object(root) => root,
            TypeInfo::Enum(info) => return Err(SchemaError::InvalidContext(info.name.to_string())),
        };
        debug!(
            context = root.name,
            auto_create_id_arguments,
            auto_create_enum_types,
            "Populating GraphQL schema from context"
        );

        let mut walk = GraphWalk::new(auto_create_enum_types);
        let context_fields: HashSet<String> =
            root.fields.iter().map(|field| self.name_field(field.name)).collect();

        for field in &root.fields {
            let name = self.name_field(field.name);
            if self.query().has_field(&name) {
                trace!(field = %name, "Query field already defined, skipping");
                continue;
            }
            let schema_field = self.field_from_info(field, &mut walk, root.name)?;

            let by_id = if auto_create_id_arguments && field.list {
                self.singular_by_id_field(field, &schema_field, &context_fields)
            } else {
                None
            };

            self.add_query_field(schema_field)?;
            if let Some(by_id) = by_id {
                trace!(field = %by_id.name, "Adding singular lookup field");
                self.add_query_field(by_id)?;
            }
        }

        while let Some(object) = walk.pending.pop_front() {
            if self.type_named(object.name).is_some() {
                trace!(type_name = object.name, "Type already defined, skipping");
                continue;
            }
            let mut schema_type = SchemaType::new(object.name);
            schema_type.description = object.description.map(str::to_string);
            schema_type.required_auth = object.required_auth.clone();
            for field in &object.fields {
                let schema_field = self.field_from_info(field, &mut walk, object.name)?;
                schema_type.add_field(schema_field)?;
            }
            self.add_type(schema_type)?;
        }

        self.mark_populated();
        debug!(
            query_fields = self.query().field_count(),
            types = self.types().count(),
            enums = self.enums().count(),
            "GraphQL schema population complete"
        );
        Ok(())
    }

    fn field_from_info(
        &mut self,
        field: &FieldInfo,
        walk: &mut GraphWalk,
        owner: &str,
    ) -> Result<SchemaField, SchemaError> {
        let name = self.name_field(field.name);
        ensure_valid_name(&name, || format!("field `{}` on {owner}", field.name))?;

        let mut required_auth = field.required_auth.clone();
        let type_name = match field.ty {
            FieldType::Scalar(kind) => {
                if !kind.is_builtin() {
                    self.add_scalar(ScalarType::new(kind.graphql_name()))?;
                }
                kind.graphql_name().to_string()
            }
            FieldType::Named(info) => match info() {
                TypeInfo::Object(object) => {
                    let type_name = object.name.to_string();
                    // Fields returning a protected type carry its requirements too.
                    required_auth.merge(&object.required_auth);
                    walk.visit_object(object)?;
                    type_name
                }
                TypeInfo::Enum(enumeration) => self.enum_type_name(&enumeration, walk)?,
            },
        };

        let mut return_type = if field.list {
            ReturnType::list_of(type_name)
        } else {
            ReturnType::named(type_name)
        };
        return_type.nullable = field.nullable;

        let mut schema_field = SchemaField::new(name, return_type).requires(required_auth);
        if let Some(description) = field.description {
            schema_field = schema_field.description(description);
        }
        Ok(schema_field)
    }

    fn enum_type_name(
        &mut self,
        enumeration: &EnumInfo,
        walk: &GraphWalk,
    ) -> Result<String, SchemaError> {
        if walk.auto_create_enum_types && self.enum_named(enumeration.name).is_none() {
            let mut enum_type = EnumType::new(enumeration.name, enumeration.values.iter().copied());
            enum_type.description = enumeration.description.map(str::to_string);
            self.add_enum(enum_type)?;
        }
        if self.enum_named(enumeration.name).is_some() {
            Ok(enumeration.name.to_string())
        } else {
            Ok(ScalarKind::String.graphql_name().to_string())
        }
    }

    /// Builds `person(id: ID!): Person` for a `people: [Person]` collection.
    ///
    /// Skipped when the singular name is taken by another context field or
    /// an existing query field.
    fn singular_by_id_field(
        &self,
        field: &FieldInfo,
        collection: &SchemaField,
        context_fields: &HashSet<String>,
    ) -> Option<SchemaField> {
        let FieldType::Named(info) = field.ty else {
            return None;
        };
        let TypeInfo::Object(element) = info() else {
            return None;
        };
        let id_field = element.id_field()?;
        let FieldType::Scalar(id_kind) = id_field.ty else {
            return None;
        };

        let singular = self.name_field(&singularize(field.name));
        if singular == collection.name
            || context_fields.contains(&singular)
            || self.query().has_field(&singular)
        {
            debug!(
                collection = %collection.name,
                singular = %singular,
                "Cannot derive a distinct singular field name, skipping lookup field"
            );
            return None;
        }

        Some(
            SchemaField::new(singular, ReturnType::named(element.name).nullable())
                .description(format!("Return a {} by its {}", element.name, id_field.name))
                .argument(ArgumentDef::required(
                    self.name_field(id_field.name),
                    id_kind.graphql_name(),
                ))
                .requires(collection.required_auth.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::naming::default_namer;

    struct Mood;

    impl Reflect for Mood {
        fn type_info() -> TypeInfo {
            EnumInfo::new("Mood", &["HAPPY", "GRUMPY"]).into()
        }
    }

    struct Person;

    impl Reflect for Person {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("Person")
                .field(FieldInfo::id("id"))
                .field(FieldInfo::scalar("first_name", ScalarKind::String))
                .field(FieldInfo::scalar("born", ScalarKind::Custom("Date")).nullable())
                .field(FieldInfo::named::<Mood>("mood"))
                .field(FieldInfo::list_of::<Person>("friends"))
                .into()
        }
    }

    struct Tag;

    impl Reflect for Tag {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("Tag")
                .field(FieldInfo::scalar("label", ScalarKind::String))
                .into()
        }
    }

    struct DemoContext;

    impl Reflect for DemoContext {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("DemoContext")
                .field(FieldInfo::list_of::<Person>("people"))
                .field(FieldInfo::list_of::<Tag>("tags"))
                .into()
        }
    }

    fn provider<C: Reflect>() -> SchemaProvider<C> {
        SchemaProvider::new(Arc::default(), default_namer())
    }

    #[test]
    fn test_populate_walks_graph_with_cycles() {
        let mut schema = provider::<DemoContext>();
        schema.populate_from_context(true, true).unwrap();

        assert!(schema.is_populated());
        let person = schema.type_named("Person").expect("Person type");
        assert!(person.has_field("firstName"));
        assert_eq!(
            person.field("friends").unwrap().return_type,
            ReturnType::list_of("Person")
        );
        assert!(schema.type_named("Tag").is_some());
        assert_eq!(schema.types().count(), 2);
    }

    #[test]
    fn test_id_lookup_field_derived() {
        let mut schema = provider::<DemoContext>();
        schema.populate_from_context(true, true).unwrap();

        let person = schema.query().field("person").expect("person(id) field");
        assert_eq!(person.return_type, ReturnType::named("Person").nullable());
        assert_eq!(person.arguments, vec![ArgumentDef::required("id", "ID")]);

        // Tag has no id field
        assert!(schema.query().field("tag").is_none());

        let names: Vec<_> = schema.query().fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["people", "person", "tags"]);
    }

    #[test]
    fn test_id_lookup_disabled() {
        let mut schema = provider::<DemoContext>();
        schema.populate_from_context(false, true).unwrap();
        assert!(schema.query().field("person").is_none());
    }

    #[test]
    fn test_enum_types_toggle() {
        let mut with_enums = provider::<DemoContext>();
        with_enums.populate_from_context(true, true).unwrap();
        assert!(with_enums.enum_named("Mood").is_some());
        assert_eq!(
            with_enums.type_named("Person").unwrap().field("mood").unwrap().return_type,
            ReturnType::named("Mood")
        );

        let mut without_enums = provider::<DemoContext>();
        without_enums.populate_from_context(true, false).unwrap();
        assert_eq!(without_enums.enums().count(), 0);
        assert_eq!(
            without_enums.type_named("Person").unwrap().field("mood").unwrap().return_type,
            ReturnType::named("String")
        );
    }

    #[test]
    fn test_predefined_enum_used_without_auto_creation() {
        let mut schema = provider::<DemoContext>();
        schema.add_enum(EnumType::new("Mood", ["HAPPY"])).unwrap();
        schema.populate_from_context(true, false).unwrap();

        assert_eq!(
            schema.type_named("Person").unwrap().field("mood").unwrap().return_type,
            ReturnType::named("Mood")
        );
    }

    #[test]
    fn test_custom_scalar_registered() {
        let mut schema = provider::<DemoContext>();
        schema.populate_from_context(true, true).unwrap();

        let scalars: Vec<_> = schema.scalars().map(|s| s.name.as_str()).collect();
        assert_eq!(scalars, ["Date"]);
        assert!(schema.type_named("Person").unwrap().field("born").unwrap().return_type.nullable);
    }

    #[test]
    fn test_predefined_type_kept() {
        let mut schema = provider::<DemoContext>();
        schema.add_type(SchemaType::new("Tag").description("custom")).unwrap();
        schema.populate_from_context(true, true).unwrap();

        let tag = schema.type_named("Tag").unwrap();
        assert_eq!(tag.description.as_deref(), Some("custom"));
        assert_eq!(tag.field_count(), 0);
    }

    struct Clashing;

    impl Reflect for Clashing {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("Person")
                .field(FieldInfo::scalar("other", ScalarKind::Int))
                .into()
        }
    }

    struct ClashContext;

    impl Reflect for ClashContext {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("ClashContext")
                .field(FieldInfo::list_of::<Person>("people"))
                .field(FieldInfo::named::<Clashing>("imposter"))
                .into()
        }
    }

    #[test]
    fn test_type_name_clash_rejected() {
        let mut schema = provider::<ClashContext>();
        let err = schema.populate_from_context(true, true).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType(name) if name == "Person"));
    }

    #[test]
    fn test_invalid_namer_output_rejected() {
        let mut schema: SchemaProvider<DemoContext> =
            SchemaProvider::new(Arc::default(), Arc::new(|name: &str| name.replace('_', "-")));
        let err = schema.populate_from_context(true, true).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidName { name, .. } if name == "first-name"));
    }

    struct Directory;

    impl Reflect for Directory {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("Directory")
                .field(FieldInfo::list_of::<Person>("people"))
                .field(FieldInfo::scalar("person", ScalarKind::String).describe("Directory owner"))
                .into()
        }
    }

    #[test]
    fn test_context_field_not_shadowed_by_lookup() {
        let mut schema = provider::<Directory>();
        schema.populate_from_context(true, true).unwrap();

        let person = schema.query().field("person").expect("person field");
        assert_eq!(person.return_type, ReturnType::named("String"));
        assert_eq!(person.description.as_deref(), Some("Directory owner"));
        assert!(person.arguments.is_empty());

        let names: Vec<_> = schema.query().fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["people", "person"]);
    }

    struct Secret;

    impl Reflect for Secret {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("Secret")
                .requires_any_role(&["admin"])
                .field(FieldInfo::id("id"))
                .into()
        }
    }

    struct Vault;

    impl Reflect for Vault {
        fn type_info() -> TypeInfo {
            ObjectInfo::new("Vault")
                .field(FieldInfo::list_of::<Secret>("secrets").requires_any_role(&["auditor"]))
                .into()
        }
    }

    #[test]
    fn test_type_requirements_flow_into_fields() {
        let mut schema = provider::<Vault>();
        schema.populate_from_context(true, true).unwrap();

        let expected = [vec!["auditor".to_string()], vec!["admin".to_string()]];
        let secrets = schema.query().field("secrets").unwrap();
        assert_eq!(secrets.required_auth.roles(), &expected);
        let secret = schema.query().field("secret").unwrap();
        assert_eq!(secret.required_auth.roles(), &expected);

        let secret_type = schema.type_named("Secret").unwrap();
        assert_eq!(secret_type.required_auth.roles(), &[vec!["admin".to_string()]]);
    }

    #[test]
    fn test_enum_context_rejected() {
        let mut schema = provider::<Mood>();
        assert!(matches!(
            schema.populate_from_context(true, true),
            Err(SchemaError::InvalidContext(_))
        ));
    }
}
