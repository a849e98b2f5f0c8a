//! GraphQL [responses](https://spec.graphql.org/October2021/#sec-Response)

use crate::resolver::FieldError;
use crate::JsonMap;
use crate::LineColumn;
use crate::Name;
use crate::SourceSpan;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// A [response](https://spec.graphql.org/October2021/#sec-Response-Format)
/// to a GraphQL request.
///
/// `data` is serialized first. `errors` is serialized as `null` when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// `None`/`null` if a field error was propagated all the way to the root,
    /// or if the request failed before execution started
    pub data: Option<JsonMap>,

    #[serde(serialize_with = "serialize_errors")]
    #[serde(deserialize_with = "deserialize_errors")]
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

/// A serializable [error](https://spec.graphql.org/October2021/#sec-Errors.Error-result-format),
/// as found in a GraphQL response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// Locations in relevant to the error, if any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub locations: Vec<LineColumn>,

    /// If non-empty, the error is a [field error]
    /// for the particular field found at this path in [`Response::data`].
    ///
    /// [field error]: https://spec.graphql.org/October2021/#sec-Errors.Field-errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub path: Vec<PathElement>,

    /// Reserved for any additional information
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    #[serde(default)]
    pub extensions: JsonMap,
}

/// One segment of [`GraphQLError::path`]: an object key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// The relevant key in an object value
    Field(Name),

    /// The index of the relevant item in a list value
    ListItem(usize),
}

/// Possible key in the [`GraphQLError::extensions`] map
pub const EXTENSION_VALIDATION_SHOULD_HAVE_CAUGHT_THIS: &str =
    "SPIRE_VALIDATION_SHOULD_HAVE_CAUGHT_THIS";

pub(crate) type LinkedPath<'a> = Option<&'a LinkedPathElement<'a>>;

/// The response path of the value being completed, as a linked list
/// borrowed from the stack of the callers.
pub(crate) struct LinkedPathElement<'a> {
    pub(crate) element: PathElement,
    pub(crate) next: LinkedPath<'a>,
}

fn serialize_errors<S: Serializer>(errors: &[GraphQLError], serializer: S) -> Result<S::Ok, S::Error> {
    if errors.is_empty() {
        serializer.serialize_none()
    } else {
        errors.serialize(serializer)
    }
}

fn deserialize_errors<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<GraphQLError>, D::Error> {
    Ok(Option::<Vec<GraphQLError>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Response {
    /// A response for a request that failed before execution: `data` is `null`
    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }
}

impl GraphQLError {
    pub fn new(message: impl Into<String>, location: Option<SourceSpan>, source: &str) -> Self {
        Self {
            message: message.into(),
            locations: location
                .into_iter()
                .filter_map(|location| location.line_column(source))
                .collect(),
            path: Vec::new(),
            extensions: JsonMap::new(),
        }
    }

    pub(crate) fn field_error(
        message: impl Into<String>,
        path: LinkedPath<'_>,
        location: Option<SourceSpan>,
        source: &str,
    ) -> Self {
        let mut error = Self::new(message, location, source);
        error.path = path_to_vec(path);
        error
    }

    /// Convert an error returned by a resolver
    pub(crate) fn from_resolver(
        error: FieldError,
        path: LinkedPath<'_>,
        location: Option<SourceSpan>,
        source: &str,
    ) -> Self {
        let mut converted = Self::field_error(error.message, path, location, source);
        converted.extensions = error.extensions;
        converted
    }

    pub(crate) fn validation_should_have_caught_this(mut self) -> Self {
        self.extensions
            .insert(EXTENSION_VALIDATION_SHOULD_HAVE_CAUGHT_THIS, true.into());
        self
    }
}

pub(crate) fn path_to_vec(mut link: LinkedPath<'_>) -> Vec<PathElement> {
    let mut path = Vec::new();
    while let Some(node) = link {
        path.push(node.element.clone());
        link = node.next;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name;
    use expect_test::expect;

    #[test]
    fn serialization_order_and_null_errors() {
        let mut data = JsonMap::new();
        data.insert("hello", "world".into());
        let response = Response {
            data: Some(data),
            errors: Vec::new(),
        };
        expect![[r#"{"data":{"hello":"world"},"errors":null}"#]]
            .assert_eq(&serde_json::to_string(&response).unwrap());

        let parsed: Response =
            serde_json::from_str(r#"{"data":{"hello":"world"},"errors":null}"#).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn error_path_and_locations() {
        let source = "{\n  pets {\n    name\n  }\n}";
        let pets = LinkedPathElement {
            element: PathElement::Field(name!("pets")),
            next: None,
        };
        let item = LinkedPathElement {
            element: PathElement::ListItem(1),
            next: Some(&pets),
        };
        let name = LinkedPathElement {
            element: PathElement::Field(name!("name")),
            next: Some(&item),
        };
        let offset = source.find("name").unwrap();
        let error = GraphQLError::from_resolver(
            FieldError::new("no name").with_extension("code", "MISSING"),
            Some(&name),
            Some(SourceSpan::new(offset, offset + 4)),
            source,
        );
        let response = Response::from_errors(vec![error]);
        expect![[r#"
            {
              "data": null,
              "errors": [
                {
                  "message": "no name",
                  "locations": [
                    {
                      "line": 3,
                      "column": 5
                    }
                  ],
                  "path": [
                    "pets",
                    1,
                    "name"
                  ],
                  "extensions": {
                    "code": "MISSING"
                  }
                }
              ]
            }"#]]
        .assert_eq(&serde_json::to_string_pretty(&response).unwrap());
    }
}
