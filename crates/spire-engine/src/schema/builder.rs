use super::*;
use crate::name;

/// Collects type definitions, then checks them for consistency in [`build`][Self::build].
#[derive(Clone)]
pub struct SchemaBuilder {
    types: IndexMap<Name, ExtendedType>,
    duplicates: Vec<Name>,
    query_type: Option<Name>,
    mutation_type: Option<Name>,
    subscription_type: Option<Name>,
}

/// The type definitions given to a [`SchemaBuilder`] do not form a sound schema.
///
/// Contains every problem found, in definition order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct SchemaError {
    pub errors: Vec<SchemaBuildError>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaBuildError {
    #[error("type `{name}` is defined more than once")]
    DuplicateType { name: Name },
    #[error("cannot find type `{name}` referenced by `{coordinate}`")]
    UndefinedType { name: Name, coordinate: String },
    #[error("`{coordinate}` must have an output type, found input object type `{ty}`")]
    OutputTypeExpected { coordinate: String, ty: Name },
    #[error("`{coordinate}` must have an input type, found {describe} `{ty}`")]
    InputTypeExpected {
        coordinate: String,
        ty: Name,
        describe: &'static str,
    },
    #[error("`{name}` implements `{interface}`, which is not an interface type")]
    NotAnInterface { name: Name, interface: Name },
    #[error("type `{name}` does not satisfy interface `{interface}`: missing field `{field}`")]
    MissingInterfaceField {
        name: Name,
        interface: Name,
        field: Name,
    },
    #[error("union member `{member}` of `{union}` must be an object type")]
    UnionMemberNotObject { union: Name, member: Name },
    #[error("the {operation_type} root type `{name}` is not defined")]
    MissingRootType {
        operation_type: &'static str,
        name: Name,
    },
    #[error("the {operation_type} root type `{name}` must be an object type")]
    RootTypeNotObject {
        operation_type: &'static str,
        name: Name,
    },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?
            }
            write!(f, "{error}")?
        }
        Ok(())
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            types: IndexMap::new(),
            duplicates: Vec::new(),
            query_type: None,
            mutation_type: None,
            subscription_type: None,
        };
        for name in [
            name!("Int"),
            name!("Float"),
            name!("String"),
            name!("Boolean"),
            name!("ID"),
        ] {
            builder.add(ExtendedType::Scalar(Arc::new(ScalarType::new(name))));
        }
        builder
    }

    fn add(&mut self, def: ExtendedType) {
        let name = def.name().clone();
        if self.types.contains_key(&name) {
            self.duplicates.push(name)
        } else {
            self.types.insert(name, def);
        }
    }

    pub fn scalar(mut self, def: ScalarType) -> Self {
        self.add(ExtendedType::Scalar(Arc::new(def)));
        self
    }

    pub fn object(mut self, def: ObjectType) -> Self {
        self.add(ExtendedType::Object(Arc::new(def)));
        self
    }

    pub fn interface(mut self, def: InterfaceType) -> Self {
        self.add(ExtendedType::Interface(Arc::new(def)));
        self
    }

    pub fn union(mut self, def: UnionType) -> Self {
        self.add(ExtendedType::Union(Arc::new(def)));
        self
    }

    pub fn enum_type(mut self, def: EnumType) -> Self {
        self.add(ExtendedType::Enum(Arc::new(def)));
        self
    }

    pub fn input_object(mut self, def: InputObjectType) -> Self {
        self.add(ExtendedType::InputObject(Arc::new(def)));
        self
    }

    /// Sets the query root type. Defaults to `Query`.
    pub fn query_type(mut self, name: Name) -> Self {
        self.query_type = Some(name);
        self
    }

    /// Sets the mutation root type. Defaults to `Mutation` if such a type is defined.
    pub fn mutation_type(mut self, name: Name) -> Self {
        self.mutation_type = Some(name);
        self
    }

    /// Sets the subscription root type. Defaults to `Subscription` if such a type is defined.
    pub fn subscription_type(mut self, name: Name) -> Self {
        self.subscription_type = Some(name);
        self
    }

    /// Checks type references and returns the immutable schema
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut errors: Vec<SchemaBuildError> = self
            .duplicates
            .iter()
            .map(|name| SchemaBuildError::DuplicateType { name: name.clone() })
            .collect();

        let root = |explicit: Option<Name>, operation_type: OperationType| {
            explicit.or_else(|| {
                let default = operation_type.default_type_name();
                self.types.get_key_value(default).map(|(name, _)| name.clone())
            })
        };
        let query_type = root(self.query_type.clone(), OperationType::Query)
            .unwrap_or_else(|| name!("Query"));
        let mutation_type = root(self.mutation_type.clone(), OperationType::Mutation);
        let subscription_type = root(self.subscription_type.clone(), OperationType::Subscription);
        for (operation_type, name) in [
            (OperationType::Query, Some(&query_type)),
            (OperationType::Mutation, mutation_type.as_ref()),
            (OperationType::Subscription, subscription_type.as_ref()),
        ] {
            let Some(name) = name else { continue };
            let operation_type = operation_type.name();
            match self.types.get(name) {
                Some(ExtendedType::Object(_)) => {}
                Some(_) => errors.push(SchemaBuildError::RootTypeNotObject {
                    operation_type,
                    name: name.clone(),
                }),
                None => errors.push(SchemaBuildError::MissingRootType {
                    operation_type,
                    name: name.clone(),
                }),
            }
        }

        let mut implementers: HashMap<Name, IndexSet<Name>> = HashMap::new();
        for def in self.types.values() {
            match def {
                ExtendedType::Scalar(_) | ExtendedType::Enum(_) => {}
                ExtendedType::Object(def) => {
                    self.check_fields(&mut errors, &def.name, &def.fields);
                    self.check_implements(
                        &mut errors,
                        &def.name,
                        &def.implements_interfaces,
                        &def.fields,
                    );
                    for interface in &def.implements_interfaces {
                        implementers
                            .entry(interface.clone())
                            .or_default()
                            .insert(def.name.clone());
                    }
                }
                ExtendedType::Interface(def) => {
                    self.check_fields(&mut errors, &def.name, &def.fields);
                    self.check_implements(
                        &mut errors,
                        &def.name,
                        &def.implements_interfaces,
                        &def.fields,
                    );
                }
                ExtendedType::Union(def) => {
                    for member in &def.members {
                        match self.types.get(member) {
                            Some(ExtendedType::Object(_)) => {}
                            Some(_) => errors.push(SchemaBuildError::UnionMemberNotObject {
                                union: def.name.clone(),
                                member: member.clone(),
                            }),
                            None => errors.push(SchemaBuildError::UndefinedType {
                                name: member.clone(),
                                coordinate: def.name.to_string(),
                            }),
                        }
                    }
                }
                ExtendedType::InputObject(def) => {
                    for field in def.fields.values() {
                        let coordinate = format!("{}.{}", def.name, field.name);
                        self.check_input_type(&mut errors, coordinate, &field.ty)
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(SchemaError { errors });
        }
        Ok(Schema {
            types: self.types,
            query_type,
            mutation_type,
            subscription_type,
            implementers,
        })
    }

    fn check_fields(
        &self,
        errors: &mut Vec<SchemaBuildError>,
        type_name: &Name,
        fields: &IndexMap<Name, FieldDefinition>,
    ) {
        for field in fields.values() {
            let coordinate = format!("{type_name}.{}", field.name);
            let ty = field.ty.inner_named_type();
            match self.types.get(ty) {
                Some(ExtendedType::InputObject(_)) => {
                    errors.push(SchemaBuildError::OutputTypeExpected {
                        coordinate: coordinate.clone(),
                        ty: ty.clone(),
                    })
                }
                Some(_) => {}
                None => errors.push(SchemaBuildError::UndefinedType {
                    name: ty.clone(),
                    coordinate: coordinate.clone(),
                }),
            }
            for argument in field.arguments.values() {
                let coordinate = format!("{coordinate}({}:)", argument.name);
                self.check_input_type(errors, coordinate, &argument.ty)
            }
        }
    }

    fn check_input_type(&self, errors: &mut Vec<SchemaBuildError>, coordinate: String, ty: &Type) {
        let ty = ty.inner_named_type();
        match self.types.get(ty) {
            Some(def) if def.is_input_type() => {}
            Some(def) => errors.push(SchemaBuildError::InputTypeExpected {
                coordinate,
                ty: ty.clone(),
                describe: def.describe(),
            }),
            None => errors.push(SchemaBuildError::UndefinedType {
                name: ty.clone(),
                coordinate,
            }),
        }
    }

    fn check_implements(
        &self,
        errors: &mut Vec<SchemaBuildError>,
        type_name: &Name,
        implements_interfaces: &IndexSet<Name>,
        fields: &IndexMap<Name, FieldDefinition>,
    ) {
        for interface in implements_interfaces {
            match self.types.get(interface) {
                Some(ExtendedType::Interface(def)) => {
                    for field in def.fields.keys() {
                        if !fields.contains_key(field) {
                            errors.push(SchemaBuildError::MissingInterfaceField {
                                name: type_name.clone(),
                                interface: interface.clone(),
                                field: field.clone(),
                            })
                        }
                    }
                }
                Some(_) => errors.push(SchemaBuildError::NotAnInterface {
                    name: type_name.clone(),
                    interface: interface.clone(),
                }),
                None => errors.push(SchemaBuildError::UndefinedType {
                    name: interface.clone(),
                    coordinate: type_name.to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn ty(name: Name) -> Type {
        Type::Named(name)
    }

    #[test]
    fn builds_with_defaults() {
        let schema = Schema::builder()
            .object(ObjectType::new(name!("Query")).field(FieldDefinition::new(
                name!("pet"),
                ty(name!("Pet")),
            )))
            .interface(
                InterfaceType::new(name!("Pet"))
                    .field(FieldDefinition::new(name!("name"), ty(name!("String")))),
            )
            .object(
                ObjectType::new(name!("Dog"))
                    .implements(name!("Pet"))
                    .field(FieldDefinition::new(name!("name"), ty(name!("String")))),
            )
            .object(ObjectType::new(name!("Mutation")))
            .build()
            .unwrap();
        assert_eq!(schema.query_type, "Query");
        assert_eq!(schema.mutation_type.as_ref().unwrap(), "Mutation");
        assert!(schema.subscription_type.is_none());
        assert!(schema.is_subtype("Pet", "Dog"));
        assert!(!schema.is_subtype("Dog", "Pet"));
        let implementers: Vec<_> = schema.implementers("Pet").collect();
        assert_eq!(implementers, [&name!("Dog")]);
        assert_eq!(schema.possible_types("Query").len(), 1);
        assert!(schema.type_field("Dog", "name").is_some());
        assert!(schema.type_field("String", "name").is_none());
    }

    #[test]
    fn reports_every_inconsistency() {
        let error = Schema::builder()
            .object(
                ObjectType::new(name!("Query"))
                    .implements(name!("Named"))
                    .implements(name!("Query"))
                    .field(
                        FieldDefinition::new(name!("search"), ty(name!("Result"))).argument(
                            InputValueDefinition::new(name!("filter"), ty(name!("Query"))),
                        ),
                    )
                    .field(FieldDefinition::new(name!("input"), ty(name!("Filter")))),
            )
            .interface(
                InterfaceType::new(name!("Named"))
                    .field(FieldDefinition::new(name!("name"), ty(name!("String")))),
            )
            .union(
                UnionType::new(name!("Result"))
                    .member(name!("Named"))
                    .member(name!("Missing")),
            )
            .input_object(
                InputObjectType::new(name!("Filter"))
                    .field(InputValueDefinition::new(name!("nested"), ty(name!("Filter")))),
            )
            .scalar(ScalarType::new(name!("Int")))
            .subscription_type(name!("Subscription"))
            .build()
            .unwrap_err();
        expect![[r#"
            type `Int` is defined more than once
            the subscription root type `Subscription` is not defined
            `Query.search(filter:)` must have an input type, found an object type `Query`
            `Query.input` must have an output type, found input object type `Filter`
            type `Query` does not satisfy interface `Named`: missing field `name`
            `Query` implements `Query`, which is not an interface type
            union member `Named` of `Result` must be an object type
            cannot find type `Missing` referenced by `Result`"#]]
        .assert_eq(&error.to_string());
    }

    #[test]
    fn enum_values_map_both_ways() {
        let def = EnumType::new(name!("Color"))
            .value(name!("RED"))
            .value_with_host(name!("GREEN"), 2);
        assert_eq!(def.host_value("RED"), Some(&JsonValue::from("RED")));
        assert_eq!(def.host_value("GREEN"), Some(&JsonValue::from(2)));
        assert_eq!(def.wire_name(&JsonValue::from(2)), Some(&name!("GREEN")));
        assert_eq!(def.wire_name(&JsonValue::from("BLUE")), None);
    }
}
