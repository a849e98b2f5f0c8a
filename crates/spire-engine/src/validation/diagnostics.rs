use crate::ast::DirectiveLocation;
use crate::diagnostic::ToDiagnostic;
use crate::response::GraphQLError;
use crate::Name;
use crate::SourceSpan;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A violation of a validation rule, at a location in the document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub location: Option<SourceSpan>,
    pub data: DiagnosticData,
}

impl ValidationError {
    pub fn new(location: Option<SourceSpan>, data: DiagnosticData) -> Self {
        Self { location, data }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.data.fmt(f)
    }
}

/// Structured data about a diagnostic.
#[derive(Debug, Error, Clone, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiagnosticData {
    #[error("cannot query field `{field}` on type `{type_name}`")]
    UndefinedField { field: Name, type_name: Name },
    #[error("the argument `{name}` is not supported by `{coordinate}`")]
    UndefinedArgument { name: Name, coordinate: String },
    #[error("the argument `{name}` is provided multiple times")]
    UniqueArgument {
        name: Name,
        original_definition: Option<SourceSpan>,
    },
    #[error("the required argument `{coordinate}` is not provided")]
    RequiredArgument { coordinate: String },
    #[error("{message}")]
    InvalidArgumentValue { message: String },
    #[error("field `{field}` of type `{ty}` is a leaf and cannot have a selection set")]
    SubselectionOnLeaf { field: Name, ty: Name },
    #[error("field `{field}` of type `{ty}` must have a selection of subfields")]
    MissingSubselection { field: Name, ty: Name },
    #[error("fields conflict on `{response_key}`: `{first}` and `{second}` are different")]
    ConflictingField {
        response_key: Name,
        first: String,
        second: String,
        first_location: Option<SourceSpan>,
    },
    #[error("cannot find fragment `{name}` in this document")]
    UndefinedFragment { name: Name },
    #[error("`{name}` fragment cannot reference itself")]
    RecursiveFragmentDefinition { name: Name },
    #[error("fragment `{name}` must be used in an operation")]
    UnusedFragment { name: Name },
    #[error("cannot find type `{name}` in the schema")]
    UndefinedDefinition { name: Name },
    #[error("fragments can only be applied to object, interface, or union types, `{name}` is {describe}")]
    InvalidFragmentTarget { name: Name, describe: &'static str },
    #[error("{fragment} with type condition `{type_condition}` cannot be applied to `{parent_type}`")]
    InvalidFragmentSpread {
        /// `fragment \`Name\`` or `inline fragment`
        fragment: String,
        type_condition: Name,
        parent_type: Name,
    },
    #[error("cannot find directive `@{name}` in this document")]
    UndefinedDirective { name: Name },
    #[error("`@{name}` directive is not supported for {location} location")]
    UnsupportedLocation {
        name: Name,
        location: DirectiveLocation,
    },
    #[error("non-repeatable directive `@{name}` can only be used once per location")]
    UniqueDirective {
        name: Name,
        original_definition: Option<SourceSpan>,
    },
    #[error("the schema does not support {operation_type} operations")]
    UnsupportedOperation { operation_type: &'static str },
    #[error("subscription {operation} must select exactly one root field, found {count}")]
    SingleRootField {
        /// `\`Name\`` or `operation`
        operation: String,
        count: usize,
    },
}

impl DiagnosticData {
    /// Short message for the source label
    pub(crate) fn label(&self) -> String {
        match self {
            Self::UndefinedField { field, .. } => format!("field `{field}` selected here"),
            Self::UndefinedArgument { name, .. } => format!("argument `{name}` given here"),
            Self::UniqueArgument { name, .. } => format!("`{name}` provided again here"),
            Self::RequiredArgument { .. } => "missing required argument".to_owned(),
            Self::InvalidArgumentValue { .. } => "invalid value given here".to_owned(),
            Self::SubselectionOnLeaf { .. } => "unexpected selection set".to_owned(),
            Self::MissingSubselection { .. } => "missing selection set".to_owned(),
            Self::ConflictingField { second, .. } => format!("`{second}` selected here"),
            Self::UndefinedFragment { name } => format!("fragment `{name}` spread here"),
            Self::RecursiveFragmentDefinition { name } => {
                format!("`{name}` references itself, directly or through other fragments")
            }
            Self::UnusedFragment { name } => format!("`{name}` is defined here"),
            Self::UndefinedDefinition { name } => format!("`{name}` used here"),
            Self::InvalidFragmentTarget { name, .. } => format!("`{name}` used here"),
            Self::InvalidFragmentSpread { type_condition, .. } => {
                format!("type condition `{type_condition}` does not overlap")
            }
            Self::UndefinedDirective { name } => format!("`@{name}` used here"),
            Self::UnsupportedLocation { name, .. } => format!("`@{name}` used here"),
            Self::UniqueDirective { name, .. } => format!("`@{name}` repeated here"),
            Self::UnsupportedOperation { operation_type } => {
                format!("{operation_type} operation defined here")
            }
            Self::SingleRootField { .. } => "subscription defined here".to_owned(),
        }
    }

    pub(crate) fn help(&self) -> Option<String> {
        match self {
            Self::ConflictingField { response_key, .. } => Some(format!(
                "use different aliases for these fields, or the same field and arguments for `{response_key}`"
            )),
            Self::UnusedFragment { name } => Some(format!("remove the definition of `{name}`")),
            Self::UnsupportedLocation { .. } => {
                Some("`@skip` and `@include` apply to fields and fragment spreads".to_owned())
            }
            _ => None,
        }
    }
}

/// A collection of validation errors for one document.
///
/// `Display` renders every error as a pretty report without colors,
/// `Debug` with colors if stderr is a terminal.
#[derive(Clone)]
pub struct DiagnosticList {
    source: Arc<str>,
    diagnostics: Vec<ValidationError>,
}

impl DiagnosticList {
    pub(crate) fn new(source: Arc<str>) -> Self {
        Self {
            source,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, location: Option<SourceSpan>, data: DiagnosticData) {
        self.diagnostics.push(ValidationError::new(location, data))
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.diagnostics.iter()
    }

    /// Converts every error to the JSON shape of a GraphQL response error
    pub fn to_graphql_errors(&self) -> Vec<GraphQLError> {
        self.diagnostics
            .iter()
            .map(|error| GraphQLError::new(error.to_string(), error.location, &self.source))
            .collect()
    }

    /// Sort by source location, keeping errors without a location last.
    pub(crate) fn sort(&mut self) {
        self.diagnostics
            .sort_by_key(|error| error.location.map_or(usize::MAX, |loc| loc.offset()))
    }

    pub(crate) fn into_result(mut self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            self.sort();
            // Fragments spread in several operations are checked once per operation
            self.diagnostics.dedup();
            Err(self)
        }
    }

    fn fmt_with(&self, f: &mut fmt::Formatter<'_>, debug: bool) -> fmt::Result {
        for error in &self.diagnostics {
            let diagnostic = error.to_diagnostic(self.source.clone());
            if debug {
                fmt::Debug::fmt(&diagnostic, f)?
            } else {
                fmt::Display::fmt(&diagnostic, f)?
            }
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticList {}

impl fmt::Display for DiagnosticList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, false)
    }
}

impl fmt::Debug for DiagnosticList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, true)
    }
}

impl<'a> IntoIterator for &'a DiagnosticList {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
