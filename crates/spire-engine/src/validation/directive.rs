use super::DiagnosticData;
use super::DiagnosticList;
use crate::ast::DirectiveList;
use crate::ast::DirectiveLocation;
use crate::ast::Type;
use crate::execution::coerce_input_value;
use crate::schema::Schema;
use crate::Name;
use crate::SourceSpan;
use std::collections::HashMap;

/// `@skip` and `@include` are the only directives of an executable document.
/// Both take a single `if: Boolean!` argument.
fn is_known_directive(name: &str) -> bool {
    matches!(name, "skip" | "include")
}

fn is_supported_location(location: DirectiveLocation) -> bool {
    matches!(
        location,
        DirectiveLocation::Field
            | DirectiveLocation::FragmentSpread
            | DirectiveLocation::InlineFragment
    )
}

pub(crate) fn validate_directives(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    directives: &DirectiveList,
    location: DirectiveLocation,
) {
    let mut seen = HashMap::<&Name, Option<SourceSpan>>::new();
    for directive in directives {
        let name = &directive.name;
        if !is_known_directive(name) {
            diagnostics.push(
                directive.location(),
                DiagnosticData::UndefinedDirective { name: name.clone() },
            );
            continue;
        }
        if let Some(&original_definition) = seen.get(name) {
            diagnostics.push(
                directive.location(),
                DiagnosticData::UniqueDirective {
                    name: name.clone(),
                    original_definition,
                },
            );
        } else {
            seen.insert(name, directive.location());
        }
        if !is_supported_location(location) {
            diagnostics.push(
                directive.location(),
                DiagnosticData::UnsupportedLocation {
                    name: name.clone(),
                    location,
                },
            );
        }

        let mut seen_arguments = HashMap::<&Name, Option<SourceSpan>>::new();
        for argument in &directive.arguments {
            if argument.name != "if" {
                diagnostics.push(
                    argument.location(),
                    DiagnosticData::UndefinedArgument {
                        name: argument.name.clone(),
                        coordinate: format!("@{name}"),
                    },
                );
            } else if let Some(&original_definition) = seen_arguments.get(&argument.name) {
                diagnostics.push(
                    argument.location(),
                    DiagnosticData::UniqueArgument {
                        name: argument.name.clone(),
                        original_definition,
                    },
                );
            } else {
                seen_arguments.insert(&argument.name, argument.location());
            }
        }

        let coordinate = format!("@{name}(if:)");
        let Some(value) = directive.argument_by_name("if") else {
            diagnostics.push(
                directive.location(),
                DiagnosticData::RequiredArgument { coordinate },
            );
            continue;
        };
        let boolean = Type::NonNullNamed(Name::new_unchecked("Boolean"));
        if let Err(error) = coerce_input_value(schema, &boolean, value) {
            diagnostics.push(
                value.location(),
                DiagnosticData::InvalidArgumentValue {
                    message: format!("invalid value for argument `{coordinate}`: {error}"),
                },
            );
        }
    }
}
