//! Unit tests for the public API.

use super::*;
use crate::conversion::{ConversionError, ConversionHandler};
use crate::debug::{BreakpointRegistry, DebugStep, Debugger, Directive, Frame};
use crate::evaluator::MapResolver;
use crate::types::Type;
use crate::values::{HostValue, Value};
use bumpalo::Bump;
use core::any::Any;
use core::fmt;
use pretty_assertions::assert_eq;

#[derive(Debug, PartialEq)]
struct Date(i64);

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl HostValue for Date {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equals(&self, other: &dyn HostValue) -> bool {
        other.as_any().downcast_ref::<Date>() == Some(self)
    }
}

/// Parses `@<epoch>` strings into dates.
struct DateFromString;

impl ConversionHandler for DateFromString {
    fn can_convert_from(&self, from: &Type<'_>) -> bool {
        *from == Type::Str
    }

    fn convert<'a>(&self, value: &Value<'a>, to: Type<'a>) -> Result<Value<'a>, ConversionError> {
        let unsupported = || ConversionError::Unsupported {
            from: value.ty().to_string(),
            to: to.to_string(),
        };
        let epoch = value
            .as_str()
            .and_then(|s| s.strip_prefix('@'))
            .and_then(|s| s.parse().ok())
            .ok_or_else(unsupported)?;
        Value::object(to, Date(epoch)).ok_or_else(unsupported)
    }
}

fn strong() -> EngineOptions {
    EngineOptions {
        default_compilation_options: CompilationOptions {
            strong_typing: true,
            ..CompilationOptions::default()
        },
        ..EngineOptions::default()
    }
}

#[test]
fn test_compile_and_run() {
    crate::test_utils::init_test_logging();

    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |_, _| {});
    let int = engine.type_manager().int();

    let expr = engine.compile("'n = ' + n", &[("n", int)]).unwrap();
    assert_eq!(expr.return_type(), Type::Str);
    assert_eq!(expr.inputs().collect::<Vec<_>>(), vec![("n", int)]);

    let mut vars = MapResolver::new().with("n", 5);
    assert_eq!(expr.run(&mut vars), Ok(Value::str("n = 5")));
    assert_eq!(
        expr.run_with_args(&[("n", Value::Int(7))]),
        Ok(Value::str("n = 7"))
    );
}

#[test]
fn test_unknown_argument_is_an_api_error() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |_, _| {});
    let int = engine.type_manager().int();
    let expr = engine.compile("n + 1", &[("n", int)]).unwrap();

    let err = expr.run_with_args(&[("m", Value::Int(1))]).unwrap_err();
    assert_eq!(err, Error::Api("Unknown input 'm'".to_string()));
}

#[test]
fn test_equality_between_unrelated_types_needs_a_rule() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |types, _| {
        types.declare_class("Date", None);
    });
    let types = engine.type_manager();
    let date = types.class("Date").unwrap();

    let err = engine
        .compile("s == d", &[("s", types.str()), ("d", date)])
        .err()
        .unwrap();
    assert_eq!(err.code(), Some("T001"));
    let message = &err.diagnostics()[0].message;
    assert!(message.contains("String"), "{}", message);
    assert!(message.contains("Date"), "{}", message);
    assert_eq!(err.source_text(), Some("s == d"));
}

#[test]
fn test_equality_rule_and_conversion_handler() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |types, env| {
        let date = types.declare_class("Date", None);
        env.allow_equality(&types.str(), &date)
            .register_conversion("Date", DateFromString);
    });
    let types = engine.type_manager();
    let date = types.class("Date").unwrap();

    let expr = engine
        .compile("s == d", &[("s", types.str()), ("d", date)])
        .unwrap();
    let today = Value::object(date, Date(86400)).unwrap();

    let mut vars = MapResolver::new().with("s", "@86400").with("d", today.clone());
    assert_eq!(expr.run(&mut vars), Ok(Value::Boolean(true)));

    let mut vars = MapResolver::new().with("s", "@0").with("d", today.clone());
    assert_eq!(expr.run(&mut vars), Ok(Value::Boolean(false)));

    // A string that does not convert is simply unequal.
    let mut vars = MapResolver::new().with("s", "tomorrow").with("d", today);
    assert_eq!(expr.run(&mut vars), Ok(Value::Boolean(false)));
}

#[test]
fn test_macros_expand_before_parsing() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, EngineOptions::default(), |_, env| {
        env.define_macro("ten", "10")
            .register_macro("twice", || "2 *".to_string());
    });

    assert_eq!(engine.expand_macros("twice ten // ten"), "2 * 10 // ten");
    assert_eq!(engine.expand_macros("'ten' + ten"), "'ten' + 10");

    let expr = engine.compile("twice ten + 1", &[]).unwrap();
    assert_eq!(expr.source(), "2 * 10 + 1");
    assert_eq!(expr.run(&mut MapResolver::new()), Ok(Value::Int(21)));
}

#[test]
fn test_runtime_errors_carry_source() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |_, _| {});
    let expr = engine.compile("1 + 10 / 0", &[]).unwrap();

    let err = expr.run(&mut MapResolver::new()).unwrap_err();
    assert_eq!(err.code(), Some("R001"));
    assert_eq!(err.diagnostics()[0].span.0, 4..10);
    assert_eq!(err.source_text(), Some("1 + 10 / 0"));
}

#[test]
fn test_depth_limit_is_a_resource_error() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |_, _| {});
    let expr = engine.compile("1 + (2 + (3 + 4))", &[]).unwrap();

    let err = expr
        .run_with_options(ExecutionOptions { max_depth: 2 }, &mut MapResolver::new())
        .unwrap_err();
    assert!(matches!(err, Error::ResourceExceeded(_)));
    assert!(err.diagnostics().is_empty());
}

#[test]
fn test_deep_nesting_fails_to_compile() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |_, _| {});

    let n = 10_000;
    let source = format!("{}1{}", "(".repeat(n), ")".repeat(n));
    let Err(err) = engine.compile(&source, &[]) else {
        panic!("expected a compilation error");
    };
    assert_eq!(err.code(), Some("P004"));
    assert!(err.diagnostics()[0].message.contains("128"));

    let options = CompilationOptions {
        max_depth: 1,
        ..CompilationOptions::default()
    };
    assert!(engine.compile_with(&options, "(1) + (2)", &[]).is_ok());
    let Err(err) = engine.compile_with(&options, "((1))", &[]) else {
        panic!("expected a compilation error");
    };
    assert_eq!(err.code(), Some("P004"));
    assert_eq!(err.diagnostics()[0].span.0, 1..2);
}

#[test]
fn test_interpreted_mode_is_per_compilation() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |_, _| {});
    let options = CompilationOptions {
        strong_typing: true,
        mode: EvaluationMode::Interpreted,
        ..CompilationOptions::default()
    };

    let expr = engine.compile_with(&options, "1 + 2", &[]).unwrap();
    let err = expr.run(&mut MapResolver::new()).unwrap_err();
    assert_eq!(err.code(), Some("R999"));

    let expr = engine.compile("1 + 2", &[]).unwrap();
    assert_eq!(expr.run(&mut MapResolver::new()), Ok(Value::Int(3)));
}

struct Watch {
    lines: Vec<u32>,
}

impl<'a> Debugger<'a> for Watch {
    fn on_break(&mut self, frame: &Frame<'_, 'a>) -> Directive {
        self.lines.push(frame.line);
        Directive::Step
    }
}

#[test]
fn test_debugging_compiled_expression() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |_, _| {});
    let options = CompilationOptions {
        strong_typing: true,
        debug_symbols: true,
        source_file: Some("calc.mv".to_string()),
        ..CompilationOptions::default()
    };
    let expr = engine
        .compile_with(&options, "a = 2;\nb = a * 3;\na + b", &[])
        .unwrap();

    let breakpoints = BreakpointRegistry::new();
    breakpoints.register("calc.mv", 2);

    let mut vars = MapResolver::new();
    let mut session = expr.debug(&mut vars, &breakpoints);
    assert_eq!(
        session.start(),
        Ok(DebugStep::Suspended {
            source_name: "calc.mv".to_string(),
            line: 2
        })
    );
    assert_eq!(session.resume(Directive::Continue), Ok(DebugStep::Completed(Value::Int(8))));

    let mut watch = Watch { lines: Vec::new() };
    let mut vars = MapResolver::new();
    assert_eq!(
        expr.run_with_debugger(&mut vars, &breakpoints, &mut watch),
        Ok(Value::Int(8))
    );
    assert_eq!(watch.lines, vec![2, 3]);
}

#[test]
fn test_compiled_expressions_are_shareable() {
    fn assert_shareable<T: Send + Sync>() {}
    assert_shareable::<CompiledExpression<'static>>();

    let arena = Bump::new();
    let engine = Engine::new(&arena, strong(), |_, _| {});
    let int = engine.type_manager().int();
    let expr = engine.compile("x * x", &[("x", int)]).unwrap();

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (1..=4)
            .map(|x| {
                let expr = &expr;
                s.spawn(move || expr.run(&mut MapResolver::new().with("x", x)))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(
        results,
        vec![
            Ok(Value::Int(1)),
            Ok(Value::Int(4)),
            Ok(Value::Int(9)),
            Ok(Value::Int(16))
        ]
    );
}
