use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::fmt;

use hashbrown::HashMap;

/// A named text expansion.
pub trait Macro: Send + Sync {
    fn expand(&self) -> String;
}

impl<F> Macro for F
where
    F: Fn() -> String + Send + Sync,
{
    fn expand(&self) -> String {
        self()
    }
}

struct Fixed(String);

impl Macro for Fixed {
    fn expand(&self) -> String {
        self.0.clone()
    }
}

/// Replaces whole identifiers that name a registered macro with the macro's
/// expansion.
///
/// String literals (either quote, with escapes) and comments are copied
/// unchanged, and so is an identifier directly preceded by `.` (a member
/// access, not a macro use).
#[derive(Default)]
pub struct MacroProcessor {
    macros: HashMap<String, Box<dyn Macro>>,
}

impl fmt::Debug for MacroProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroProcessor")
            .field("macros", &self.macros.keys().collect::<alloc::vec::Vec<_>>())
            .finish()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Length of the quoted literal at the start of `s`, closing quote included.
/// An unterminated literal runs to the end of the input.
fn quoted_len(s: &str, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return i + c.len_utf8();
        }
    }
    s.len()
}

impl MacroProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, expansion: impl Macro + 'static) {
        self.macros.insert(name.to_string(), Box::new(expansion));
    }

    /// Register a macro that always expands to `text`.
    pub fn define(&mut self, name: &str, text: &str) {
        self.register(name, Fixed(text.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn parse(&self, raw: &str) -> String {
        if self.macros.is_empty() {
            return raw.to_string();
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        let mut after_dot = false;

        while let Some(c) = rest.chars().next() {
            let len = match c {
                '"' | '\'' => quoted_len(rest, c),
                '/' if rest.starts_with("//") => rest.find('\n').unwrap_or(rest.len()),
                '/' if rest.starts_with("/*") => rest[2..].find("*/").map_or(rest.len(), |i| i + 4),
                c if is_ident_char(c) => {
                    let len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
                    let word = &rest[..len];
                    match self.macros.get(word) {
                        Some(expansion) if is_ident_start(c) && !after_dot => {
                            tracing::trace!(name = word, "expand macro");
                            out.push_str(&expansion.expand());
                            after_dot = false;
                            rest = &rest[len..];
                            continue;
                        }
                        _ => len,
                    }
                }
                c => c.len_utf8(),
            };
            out.push_str(&rest[..len]);
            after_dot = c == '.';
            rest = &rest[len..];
        }
        out
    }
}

/// Expand `source` with a one-off set of fixed-text macros.
pub fn parse_macros(source: &str, macros: &[(&str, &str)]) -> String {
    let mut processor = MacroProcessor::new();
    for (name, text) in macros {
        processor.define(name, text);
    }
    processor.parse(source)
}
