//! Error rendering using ariadne
//!
//! Compilation and runtime errors carry diagnostics with spans into the
//! source they were produced from. This module renders them with source
//! snippets, labels for related locations and help notes.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<expression>";

/// Render an error to stderr
///
/// # Example
/// ```no_run
/// use velo::{Engine, EngineOptions, CompilationOptions, render_error};
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
/// let options = EngineOptions {
///     default_compilation_options: CompilationOptions {
///         strong_typing: true,
///         ..CompilationOptions::default()
///     },
///     ..EngineOptions::default()
/// };
/// let engine = Engine::new(&arena, options, |_, _| {});
///
/// if let Err(e) = engine.compile("1 + true", &[]) {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compilation {
            diagnostics,
            source,
        } => render_diagnostics(source, diagnostics, writer, use_color),
        Error::Runtime { diagnostic, source } => {
            render_diagnostics(source, std::slice::from_ref(diagnostic), writer, use_color)
        }
        Error::ResourceExceeded(msg) => {
            writeln!(writer, "Resource limit exceeded: {}", msg)
        }
        Error::Api(msg) => {
            writeln!(writer, "API error: {}", msg)
        }
    }
}

fn render_diagnostics(
    source: &str,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };

        // Spans of runtime errors raised outside any node are empty.
        let span = clamp(diag.span.0.clone(), source.len());
        let mut report = Report::build(kind, (SOURCE_ID, span.clone()))
            .with_message(&diag.message)
            .with_config(ariadne::Config::default().with_color(use_color));

        if let Some(code) = &diag.code {
            report = report.with_code(code);
        }

        report = report.with_label(
            Label::new((SOURCE_ID, span))
                .with_message(&diag.message)
                .with_color(colors.next()),
        );

        for related in &diag.related {
            report = report.with_label(
                Label::new((SOURCE_ID, clamp(related.span.0.clone(), source.len())))
                    .with_message(&related.message)
                    .with_color(colors.next()),
            );
        }

        for help_msg in &diag.help {
            report = report.with_help(help_msg);
        }

        report
            .finish()
            .write((SOURCE_ID, Source::from(source)), &mut *writer)?;
    }

    Ok(())
}

fn clamp(span: std::ops::Range<usize>, len: usize) -> std::ops::Range<usize> {
    span.start.min(len)..span.end.min(len)
}
