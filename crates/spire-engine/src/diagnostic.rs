//! Pretty-printable diagnostic reports for errors that reference GraphQL documents.
//!
//! # Usage
//! Parse errors and validation errors implement [`ToDiagnostic`]:
//!
//! ```rust
//! use spire_engine::diagnostic::ToDiagnostic;
//! use spire_engine::Document;
//! use spire_engine::JsonMap;
//!
//! let source = "{ field(arg: ) }";
//! let error = Document::parse(source, &JsonMap::new()).unwrap_err();
//! let diagnostic = error.to_diagnostic(source);
//! // `Display` renders without colors, `Debug` with colors if stderr is a terminal
//! let rendered = diagnostic.to_string();
//! assert!(rendered.contains("expected a value, got `)`"));
//! assert_eq!(diagnostic.line_column().unwrap().column, 14);
//! ```

use crate::response::GraphQLError;
use crate::validation::ValidationError;
use crate::LineColumn;
use crate::ParseError;
use crate::SourceSpan;
use ariadne::ColorGenerator;
use ariadne::ReportKind;
use std::fmt;
use std::io;
use std::ops::Range;
use std::sync::Arc;

/// A pretty-printable diagnostic.
pub struct Diagnostic<T> {
    pub source: Arc<str>,
    pub error: T,
}

/// A diagnostic report that can be printed to a CLI with pretty colors and labeled lines of
/// GraphQL source code.
pub struct CliReport {
    source: Arc<str>,
    colors: ColorGenerator,
    report: ariadne::ReportBuilder<'static, MappedSpan>,
}

/// Indicate when to use ANSI colors for printing.
#[derive(Debug, Clone, Copy)]
pub enum Color {
    /// Do not use colors.
    Never,
    /// Use colors if stderr is a terminal.
    StderrIsTerminal,
}

/// Trait for pretty-printing error types.
pub trait ToDiagnostic {
    /// Return the main location for this error. May be `None` if a location doesn't make sense for
    /// the particular error.
    fn location(&self) -> Option<SourceSpan>;

    /// Fill in the report with messages and source code labels.
    fn report(&self, report: &mut CliReport);

    /// Returns a pretty-printable diagnostic for the given source text.
    fn to_diagnostic(self, source: impl Into<Arc<str>>) -> Diagnostic<Self>
    where
        Self: Sized,
    {
        Diagnostic {
            source: source.into(),
            error: self,
        }
    }
}

/// Ariadne needs an identifier for each source, there is only ever one here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId;

type MappedSpan = (SourceId, Range<usize>);

/// Translate a byte-offset location into a char-offset location for use with ariadne.
fn map_span(source: &str, location: SourceSpan) -> Option<MappedSpan> {
    let char_index = |byte_index| Some(source.get(..byte_index)?.chars().count());
    let start = char_index(location.offset())?;
    let end = char_index(location.end_offset())?;
    Some((SourceId, start..end))
}

/// Provide a [`std::io::Write`] API for a [`std::fmt::Formatter`].
struct WriteToFormatter<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
}

impl io::Write for WriteToFormatter<'_, '_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = std::str::from_utf8(buf).map_err(|_| io::ErrorKind::Other)?;
        self.f.write_str(s).map_err(|_| io::ErrorKind::Other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CliReport {
    /// Returns a builder for creating diagnostic reports.
    pub fn builder(source: Arc<str>, location: Option<SourceSpan>) -> Self {
        let (_, range) = location
            .and_then(|location| map_span(&source, location))
            .unwrap_or((SourceId, 0..0));
        Self {
            source,
            colors: ColorGenerator::new(),
            report: ariadne::Report::build(ReportKind::Error, SourceId, range.start),
        }
    }

    fn with_color(self, color: Color) -> Self {
        let enable_color = match color {
            Color::Never => false,
            // Rely on ariadne's `auto-color` feature, which uses `concolor` to enable colors
            // only if stderr is a terminal.
            Color::StderrIsTerminal => true,
        };
        let config = ariadne::Config::default().with_color(enable_color);
        Self {
            report: self.report.with_config(config),
            ..self
        }
    }

    /// Set the main message for the report.
    pub fn with_message(&mut self, message: impl ToString) {
        self.report.set_message(message);
    }

    /// Set the help message for the report, usually a suggestion on how to fix the error.
    pub fn with_help(&mut self, help: impl ToString) {
        self.report.set_help(help);
    }

    /// Add a label at a given location. If the location is `None`, the message is discarded.
    pub fn with_label_opt(&mut self, location: Option<SourceSpan>, message: impl ToString) {
        if let Some(mapped_span) = location.and_then(|location| map_span(&self.source, location)) {
            self.report.add_label(
                ariadne::Label::new(mapped_span)
                    .with_message(message)
                    .with_color(self.colors.next()),
            );
        }
    }

    /// Write the report to a [`Write`].
    ///
    /// [`Write`]: std::io::Write
    pub fn write(self, w: impl std::io::Write) -> std::io::Result<()> {
        let report = self.report.finish();
        report.write(Cache(ariadne::Source::from(self.source.to_string())), w)
    }

    /// Write the report to a [`fmt::Formatter`].
    pub fn fmt(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(WriteToFormatter { f }).map_err(|_| fmt::Error)
    }
}

struct Cache(ariadne::Source<String>);

impl ariadne::Cache<SourceId> for Cache {
    type Storage = String;

    fn fetch(
        &mut self,
        _: &SourceId,
    ) -> Result<&ariadne::Source<Self::Storage>, Box<dyn fmt::Debug + '_>> {
        Ok(&self.0)
    }

    fn display<'a>(&self, _: &'a SourceId) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("query"))
    }
}

impl<T> std::ops::Deref for Diagnostic<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.error
    }
}

impl<T: std::error::Error + ToDiagnostic> std::error::Error for Diagnostic<T> {}

impl<T: ToDiagnostic> ToDiagnostic for &T {
    fn location(&self) -> Option<SourceSpan> {
        ToDiagnostic::location(*self)
    }

    fn report(&self, report: &mut CliReport) {
        ToDiagnostic::report(*self, report)
    }
}

impl<T: ToDiagnostic> Diagnostic<T> {
    /// Get the line and column number where this diagnostic was raised.
    pub fn line_column(&self) -> Option<LineColumn> {
        self.error.location()?.line_column(&self.source)
    }

    /// Get a [`serde`]-serializable version of the current diagnostic. The shape is compatible
    /// with the JSON error shape described in [the GraphQL spec].
    ///
    /// [the GraphQL spec]: https://spec.graphql.org/draft/#sec-Errors
    pub fn to_json(&self) -> GraphQLError
    where
        T: ToString,
    {
        GraphQLError::new(self.error.to_string(), self.error.location(), &self.source)
    }

    /// Produce the diagnostic report, optionally with colors for the CLI.
    fn report(&self, color: Color) -> CliReport {
        let mut report = CliReport::builder(self.source.clone(), self.error.location()).with_color(color);
        self.error.report(&mut report);
        report
    }

    /// Pretty-print the diagnostic to a [`Write`].
    ///
    /// [`Write`]: std::io::Write
    pub fn write(&self, color: Color, w: impl std::io::Write) -> std::io::Result<()> {
        self.report(color).write(w)
    }
}

impl<T: ToDiagnostic> fmt::Debug for Diagnostic<T> {
    /// Pretty-format the diagnostic, with colors for the CLI.
    ///
    /// To output *without* colors, format with `Display`: `format!("{diagnostic}")`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.report(Color::StderrIsTerminal).fmt(f)
    }
}

impl<T: ToDiagnostic> fmt::Display for Diagnostic<T> {
    /// Pretty-format the diagnostic without colors.
    ///
    /// To output *with* colors, format with `Debug`: `eprintln!("{diagnostic:?}")`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.report(Color::Never).fmt(f)
    }
}

impl ToDiagnostic for ParseError {
    fn location(&self) -> Option<SourceSpan> {
        Some(self.span())
    }

    fn report(&self, report: &mut CliReport) {
        report.with_message(self.message());
        report.with_label_opt(Some(self.span()), self.message());
    }
}

impl ToDiagnostic for ValidationError {
    fn location(&self) -> Option<SourceSpan> {
        self.location
    }

    fn report(&self, report: &mut CliReport) {
        report.with_message(&self.data);
        report.with_label_opt(self.location, self.data.label());
        if let Some(help) = self.data.help() {
            report.with_help(help)
        }
    }
}
