//! The type graph queries are validated and executed against.
//!
//! Types refer to each other by [`Name`]: `Schema::types` is the arena and
//! names are the handles, so cycles (an object implementing an interface whose
//! field returns that object, a self-referential input object) are plain edges.
//!
//! A schema is built programmatically with [`Schema::builder`]
//! and is immutable afterwards.

use crate::ast::OperationType;
use crate::ast::Type;
use crate::resolver::BatchContext;
use crate::resolver::BatchResolver;
use crate::resolver::FieldContext;
use crate::resolver::FieldError;
use crate::resolver::ResolvedValue;
use crate::resolver::Resolver;
use crate::JsonValue;
use crate::Name;
use futures::FutureExt;
use indexmap::IndexMap;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

mod builder;

pub use self::builder::SchemaBuildError;
pub use self::builder::SchemaBuilder;
pub use self::builder::SchemaError;

/// A custom scalar coercion function, for results or for inputs
pub type CoerceFn = Arc<dyn Fn(&JsonValue) -> Result<JsonValue, String> + Send + Sync>;

#[derive(Clone)]
pub struct Schema {
    pub types: IndexMap<Name, ExtendedType>,
    pub query_type: Name,
    pub mutation_type: Option<Name>,
    pub subscription_type: Option<Name>,
    /// Interface name to names of the object types implementing it
    implementers: HashMap<Name, IndexSet<Name>>,
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};

#[derive(Debug, Clone)]
pub enum ExtendedType {
    Scalar(Arc<ScalarType>),
    Object(Arc<ObjectType>),
    Interface(Arc<InterfaceType>),
    Union(Arc<UnionType>),
    Enum(Arc<EnumType>),
    InputObject(Arc<InputObjectType>),
}

#[derive(Clone)]
pub struct ScalarType {
    pub name: Name,
    /// Turns a resolved host value into its serialized form
    pub coerce_result: Option<CoerceFn>,
    /// Turns a literal from a query into the host value given to resolvers
    pub coerce_input: Option<CoerceFn>,
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: Name,
    pub implements_interfaces: IndexSet<Name>,
    pub fields: IndexMap<Name, FieldDefinition>,
}

#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub name: Name,
    pub implements_interfaces: IndexSet<Name>,
    pub fields: IndexMap<Name, FieldDefinition>,
}

#[derive(Debug, Clone)]
pub struct UnionType {
    pub name: Name,
    pub members: IndexSet<Name>,
}

/// An enum type, mapping wire names to host values.
///
/// Input coercion turns a wire name into its host value.
/// Result coercion looks up the wire name of a host value.
#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: Name,
    pub values: IndexMap<Name, JsonValue>,
}

#[derive(Debug, Clone)]
pub struct InputObjectType {
    pub name: Name,
    pub fields: IndexMap<Name, InputValueDefinition>,
}

#[derive(Clone)]
pub struct FieldDefinition {
    pub name: Name,
    pub ty: Type,
    pub arguments: IndexMap<Name, InputValueDefinition>,
    pub resolver: Option<Arc<dyn Resolver>>,
    pub batch_resolver: Option<Arc<dyn BatchResolver>>,
    /// Whether the resolver may return [`ResolvedValue::Lazy`]
    pub lazy: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<JsonValue>,
}

impl Schema {
    /// Returns a new builder with the built-in scalars already defined
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Returns the type with the given name, if it is a object type
    pub fn get_object(&self, name: &str) -> Option<&Arc<ObjectType>> {
        if let Some(ExtendedType::Object(ty)) = self.types.get(name) {
            Some(ty)
        } else {
            None
        }
    }

    /// Returns the type with the given name, if it is a interface type
    pub fn get_interface(&self, name: &str) -> Option<&Arc<InterfaceType>> {
        if let Some(ExtendedType::Interface(ty)) = self.types.get(name) {
            Some(ty)
        } else {
            None
        }
    }

    /// Returns the name of the object type for the root operation with the given operation kind
    pub fn root_operation(&self, operation_type: OperationType) -> Option<&Name> {
        match operation_type {
            OperationType::Query => Some(&self.query_type),
            OperationType::Mutation => self.mutation_type.as_ref(),
            OperationType::Subscription => self.subscription_type.as_ref(),
        }
    }

    /// Returns the definition of a field of an object or interface type
    pub fn type_field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        match self.types.get(type_name)? {
            ExtendedType::Object(ty) => ty.fields.get(field_name),
            ExtendedType::Interface(ty) => ty.fields.get(field_name),
            ExtendedType::Scalar(_)
            | ExtendedType::Union(_)
            | ExtendedType::Enum(_)
            | ExtendedType::InputObject(_) => None,
        }
    }

    /// Returns the names of the object types implementing the given interface
    pub fn implementers(&self, interface: &str) -> impl Iterator<Item = &Name> {
        self.implementers.get(interface).into_iter().flatten()
    }

    /// Returns whether `maybe_subtype` is a subtype of `abstract_type`, which means either:
    ///
    /// * `maybe_subtype` implements the interface `abstract_type`
    /// * `maybe_subtype` is a member of the union type `abstract_type`
    pub fn is_subtype(&self, abstract_type: &str, maybe_subtype: &str) -> bool {
        self.types.get(abstract_type).is_some_and(|ty| match ty {
            ExtendedType::Interface(_) => self.types.get(maybe_subtype).is_some_and(|ty2| {
                match ty2 {
                    ExtendedType::Object(def) => &def.implements_interfaces,
                    ExtendedType::Interface(def) => &def.implements_interfaces,
                    ExtendedType::Scalar(_)
                    | ExtendedType::Union(_)
                    | ExtendedType::Enum(_)
                    | ExtendedType::InputObject(_) => return false,
                }
                .contains(abstract_type)
            }),
            ExtendedType::Union(def) => def.members.contains(maybe_subtype),
            ExtendedType::Scalar(_)
            | ExtendedType::Object(_)
            | ExtendedType::Enum(_)
            | ExtendedType::InputObject(_) => false,
        })
    }

    /// Returns the object types a value of the given composite type can have at runtime.
    ///
    /// Empty for leaf types, input types, and undefined names.
    pub fn possible_types(&self, type_name: &str) -> IndexSet<&Name> {
        match self.types.get_key_value(type_name) {
            Some((name, ExtendedType::Object(_))) => IndexSet::from([name]),
            Some((_, ExtendedType::Interface(_))) => self.implementers(type_name).collect(),
            Some((_, ExtendedType::Union(def))) => def.members.iter().collect(),
            _ => IndexSet::new(),
        }
    }

    /// Returns whether the type `ty` is defined as is an input type
    ///
    /// <https://spec.graphql.org/October2021/#sec-Input-and-Output-Types>
    pub fn is_input_type(&self, ty: &Type) -> bool {
        self.types
            .get(ty.inner_named_type())
            .is_some_and(ExtendedType::is_input_type)
    }

    /// Returns whether the type `ty` is defined as is an output type
    ///
    /// <https://spec.graphql.org/October2021/#sec-Input-and-Output-Types>
    pub fn is_output_type(&self, ty: &Type) -> bool {
        self.types
            .get(ty.inner_named_type())
            .is_some_and(ExtendedType::is_output_type)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("query_type", &self.query_type)
            .field("mutation_type", &self.mutation_type)
            .field("subscription_type", &self.subscription_type)
            .field("types", &self.types)
            .finish()
    }
}

impl ExtendedType {
    pub fn name(&self) -> &Name {
        match self {
            Self::Scalar(def) => &def.name,
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::Union(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::InputObject(def) => &def.name,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "a scalar type",
            Self::Object(_) => "an object type",
            Self::Interface(_) => "an interface type",
            Self::Union(_) => "a union type",
            Self::Enum(_) => "an enum type",
            Self::InputObject(_) => "an input object type",
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns whether this is an object, interface, or union type
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::Union(_))
    }

    /// Returns wether this type is a leaf type: scalar or enum.
    ///
    /// Field selections must have sub-selections if and only if
    /// their inner named type is *not* a leaf field.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    pub fn is_input_type(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    pub fn is_output_type(&self) -> bool {
        !matches!(self, Self::InputObject(_))
    }

    /// Returns the fields of an object or interface type
    pub fn fields(&self) -> Option<&IndexMap<Name, FieldDefinition>> {
        match self {
            Self::Object(def) => Some(&def.fields),
            Self::Interface(def) => Some(&def.fields),
            Self::Scalar(_) | Self::Union(_) | Self::Enum(_) | Self::InputObject(_) => None,
        }
    }
}

impl ScalarType {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            coerce_result: None,
            coerce_input: None,
        }
    }

    pub fn coerce_result(
        mut self,
        coerce: impl Fn(&JsonValue) -> Result<JsonValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.coerce_result = Some(Arc::new(coerce));
        self
    }

    pub fn coerce_input(
        mut self,
        coerce: impl Fn(&JsonValue) -> Result<JsonValue, String> + Send + Sync + 'static,
    ) -> Self {
        self.coerce_input = Some(Arc::new(coerce));
        self
    }

    /// Returns whether this is one of the scalars defined by GraphQL itself
    pub fn is_built_in(&self) -> bool {
        matches!(
            self.name.as_str(),
            "Int" | "Float" | "String" | "Boolean" | "ID"
        )
    }
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .field("coerce_result", &self.coerce_result.is_some())
            .field("coerce_input", &self.coerce_input.is_some())
            .finish()
    }
}

macro_rules! composite_type_builder {
    ($ty: ident) => {
        impl $ty {
            pub fn new(name: Name) -> Self {
                Self {
                    name,
                    implements_interfaces: IndexSet::new(),
                    fields: IndexMap::new(),
                }
            }

            pub fn implements(mut self, interface: Name) -> Self {
                self.implements_interfaces.insert(interface);
                self
            }

            pub fn field(mut self, field: FieldDefinition) -> Self {
                self.fields.insert(field.name.clone(), field);
                self
            }
        }
    };
}

composite_type_builder!(ObjectType);
composite_type_builder!(InterfaceType);

impl UnionType {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            members: IndexSet::new(),
        }
    }

    pub fn member(mut self, object_type: Name) -> Self {
        self.members.insert(object_type);
        self
    }
}

impl EnumType {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            values: IndexMap::new(),
        }
    }

    /// Adds a value whose host value is its own name
    pub fn value(self, name: Name) -> Self {
        let host = JsonValue::from(name.as_str());
        self.value_with_host(name, host)
    }

    pub fn value_with_host(mut self, name: Name, host: impl Into<JsonValue>) -> Self {
        self.values.insert(name, host.into());
        self
    }

    /// Returns the host value of the value with the given wire name
    pub fn host_value(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name)
    }

    /// Returns the wire name of the given host value
    pub fn wire_name(&self, host: &JsonValue) -> Option<&Name> {
        self.values
            .iter()
            .find(|(_, value)| *value == host)
            .map(|(name, _)| name)
    }
}

impl InputObjectType {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, field: InputValueDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

impl FieldDefinition {
    /// A field without resolver: its value is read from the parent value
    pub fn new(name: Name, ty: Type) -> Self {
        Self {
            name,
            ty,
            arguments: IndexMap::new(),
            resolver: None,
            batch_resolver: None,
            lazy: false,
        }
    }

    pub fn argument(mut self, argument: InputValueDefinition) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }

    /// Sets a synchronous resolver
    pub fn resolve(
        mut self,
        resolve: impl Fn(&FieldContext) -> Result<ResolvedValue, FieldError> + Send + Sync + 'static,
    ) -> Self {
        let resolver = move |ctx: FieldContext| futures::future::ready(resolve(&ctx)).boxed();
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets an asynchronous resolver
    pub fn resolve_async<F, Fut>(mut self, resolve: F) -> Self
    where
        F: Fn(FieldContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResolvedValue, FieldError>> + Send + 'static,
    {
        let resolver = move |ctx: FieldContext| resolve(ctx).boxed();
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets a resolver called once for all parent values of a list
    pub fn batch_resolve<F, Fut>(mut self, resolve: F) -> Self
    where
        F: Fn(BatchContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Result<ResolvedValue, FieldError>>, FieldError>>
            + Send
            + 'static,
    {
        let resolver = move |ctx: BatchContext| resolve(ctx).boxed();
        self.batch_resolver = Some(Arc::new(resolver));
        self
    }

    /// Allows the resolver to return [`ResolvedValue::Lazy`]
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("arguments", &self.arguments)
            .field("resolver", &self.resolver.is_some())
            .field("batch_resolver", &self.batch_resolver.is_some())
            .field("lazy", &self.lazy)
            .finish()
    }
}

impl InputValueDefinition {
    pub fn new(name: Name, ty: Type) -> Self {
        Self {
            name,
            ty,
            default_value: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Returns whether the argument or input field must be given explicitly
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}
