use alloc::string::{String, ToString};
use alloc::vec::Vec;
use alloc::{format, vec};

use crate::api::{Diagnostic, Severity};
use crate::parser::{Rule, Span};

/// Parser error with the offending source region.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// Number literal that does not fit its type or has a bad suffix
    InvalidNumber { text: String },
    /// Malformed escape sequence in a string literal
    InvalidEscape { text: String },
    /// Parentheses nested deeper than the configured limit
    MaxDepthExceeded { depth: usize, max_depth: usize },
    /// Other parse errors (catch-all for Pest errors we don't specifically handle)
    Other { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => (
                format!("Expected {}, found {}", expected, found),
                "P001",
                vec![],
            ),
            ParseErrorKind::InvalidNumber { text } => (
                format!("Invalid number literal '{}'", text),
                "P003",
                vec!["Check the number format and suffix (L, f, d, I, B)".to_string()],
            ),
            ParseErrorKind::InvalidEscape { text } => (
                format!("Invalid escape sequence '{}'", text),
                "P005",
                vec![],
            ),
            ParseErrorKind::MaxDepthExceeded { max_depth, .. } => (
                format!(
                    "Expression nesting depth exceeds maximum of {} levels",
                    max_depth
                ),
                "P004",
                vec!["Reduce nesting or simplify the expression".to_string()],
            ),
            ParseErrorKind::Other { message } => (message.clone(), "P999", vec![]),
        };

        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone(),
            related: Vec::new(),
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let diagnostic = self.to_diagnostic();
        write!(f, "{}: {}", diagnostic.severity, diagnostic.message)?;

        if let Some(ref code) = diagnostic.code {
            write!(f, " [{}]", code)?;
        }

        for help_msg in &diagnostic.help {
            write!(f, "\nhelp: {}", help_msg)?;
        }

        Ok(())
    }
}

impl core::error::Error for ParseError {}

/// Convert Pest error to human-readable ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>, _source: &str) -> ParseError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError {
            positives,
            negatives,
        } => ParseErrorKind::UnexpectedToken {
            expected: format_expected_rules(&positives),
            found: format_found_rules(&negatives),
        },
        ErrorVariant::CustomError { message } => ParseErrorKind::Other { message },
    };

    ParseError::new(kind, span)
}

fn concept_of(rule: Rule) -> &'static str {
    match rule {
        Rule::number | Rule::boolean | Rule::string | Rule::null => "literal",
        Rule::ident => "identifier",
        Rule::EOI => "end of input",
        rule if crate::parser::operator_of(rule).is_some() => "operator",
        _ => "expression",
    }
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    let mut concepts: Vec<&str> = Vec::new();
    for rule in rules {
        let concept = concept_of(*rule);
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        None => "something else".to_string(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

/// Format found rules in a human-readable way
fn format_found_rules(rules: &[Rule]) -> String {
    match rules.first() {
        None => "unexpected token".to_string(),
        Some(rule) => concept_of(*rule).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_to_diagnostic() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "expression".to_string(),
                found: "operator".to_string(),
            },
            Span(10..20),
        );

        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Error);
        assert!(diagnostic.message.contains("Expected expression"));
        assert!(diagnostic.message.contains("found operator"));
        assert_eq!(diagnostic.code, Some("P001".to_string()));
    }

    #[test]
    fn test_format_expected_rules() {
        assert_eq!(format_expected_rules(&[Rule::number, Rule::string]), "literal");
        assert_eq!(
            format_expected_rules(&[Rule::number, Rule::ident, Rule::EOI]),
            "literal, identifier or end of input"
        );
        assert_eq!(format_expected_rules(&[]), "something else");
    }

    #[test]
    fn test_depth_error_to_diagnostic() {
        let error = ParseError::new(
            ParseErrorKind::MaxDepthExceeded {
                depth: 11,
                max_depth: 10,
            },
            Span(10..11),
        );
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, Some("P004".to_string()));
        assert!(diagnostic.message.contains("maximum of 10 levels"));
        assert_eq!(diagnostic.help.len(), 1);
    }

    #[test]
    fn test_unexpected_token_from_pest() {
        let err = crate::parser::parse("1 + ").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
        assert_eq!(err.span, Span(4..4));
    }
}
