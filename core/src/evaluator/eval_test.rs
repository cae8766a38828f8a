//! Unit tests for the evaluator.

use super::*;
use crate::ast::{BuildContext, Node};
use crate::compiler::{Program, compile};
use crate::conversion::RejectAll;
use crate::parser::Operator;
use crate::types::{Primitive, Type};
use pretty_assertions::assert_eq;

const INT: Type<'static> = Type::Primitive(Primitive::Int);
const DOUBLE: Type<'static> = Type::Primitive(Primitive::Double);
const BOOLEAN: Type<'static> = Type::Primitive(Primitive::Boolean);

struct Runner {
    conversions: ConversionRegistry,
    strong_typing: bool,
}

impl Runner {
    fn strong() -> Self {
        Self {
            conversions: ConversionRegistry::new(),
            strong_typing: true,
        }
    }

    fn loose() -> Self {
        Self {
            conversions: ConversionRegistry::new(),
            strong_typing: false,
        }
    }

    fn compile(&self, source: &str, inputs: &[(&str, Type<'static>)]) -> Program<'static> {
        let ctx = BuildContext {
            strong_typing: self.strong_typing,
            conversions: &self.conversions,
            equality: &RejectAll,
            source,
            source_file: None,
        };
        compile(inputs, &ctx, false)
            .unwrap_or_else(|e| panic!("Compilation failed: {}\n{}", source, e))
    }

    fn run(
        &self,
        source: &str,
        inputs: &[(&str, Type<'static>)],
        vars: &mut MapResolver<'static>,
    ) -> Result<Value<'static>, ExecutionError> {
        let program = self.compile(source, inputs);
        eval(&program, &self.conversions, vars)
    }

    fn run_with_options(
        &self,
        source: &str,
        options: ExecutionOptions,
        mode: EvaluationMode,
    ) -> Result<Value<'static>, ExecutionError> {
        let program = self.compile(source, &[]);
        eval_with_options(
            &program,
            &self.conversions,
            &mut MapResolver::new(),
            options,
            mode,
        )
    }
}

fn run(source: &str) -> Result<Value<'static>, ExecutionError> {
    Runner::strong().run(source, &[], &mut MapResolver::new())
}

#[test]
fn test_arithmetic() {
    assert_eq!(run("1 + 2 * 3"), Ok(Value::Int(7)));
    assert_eq!(run("(1 + 2) * 3"), Ok(Value::Int(9)));
    assert_eq!(run("2 ** 3 ** 2"), Ok(Value::Int(512)));
    assert_eq!(run("10 - 4 - 3"), Ok(Value::Int(3)));
    assert_eq!(run("7 / 2"), Ok(Value::Int(3)));
    assert_eq!(run("7 / 2.0"), Ok(Value::Double(3.5)));
    assert_eq!(run("1 + 2L"), Ok(Value::Long(3)));
    assert_eq!(run("-3 + 1"), Ok(Value::Int(-2)));
}

#[test]
fn test_comparisons_and_logic() {
    assert_eq!(run("1 < 2 && 2 < 3"), Ok(Value::Boolean(true)));
    assert_eq!(run("1 == 1.0"), Ok(Value::Boolean(true)));
    assert_eq!(run("!(1 > 2) || false"), Ok(Value::Boolean(true)));
    assert_eq!(run("'abc' < 'abd'"), Ok(Value::Boolean(true)));
    assert_eq!(run("null == null"), Ok(Value::Boolean(true)));
}

#[test]
fn test_string_concatenation_with_variable() {
    let mut vars = MapResolver::new().with("n", 5);
    let result = Runner::strong().run("'n = ' + n", &[("n", INT)], &mut vars);
    assert_eq!(result, Ok(Value::str("n = 5")));
}

#[test]
fn test_integral_left_against_floating_literal() {
    let runner = Runner::strong();
    let program = runner.compile("x < 2.0", &[("x", INT)]);
    let root = program.statements[0];
    let binary = program.arena.binary_node(root).unwrap();
    assert_eq!(
        program.arena.node(binary.right),
        &Node::Literal {
            value: Value::Double(2.0),
            ty: Type::Boxed(Primitive::Double)
        }
    );

    let mut vars = MapResolver::new().with("x", 1);
    assert_eq!(
        eval(&program, &runner.conversions, &mut vars),
        Ok(Value::Boolean(true))
    );
    let mut vars = MapResolver::new().with("x", 3);
    assert_eq!(
        eval(&program, &runner.conversions, &mut vars),
        Ok(Value::Boolean(false))
    );
}

#[test]
fn test_floating_left_converts_integral_literal() {
    let mut vars = MapResolver::new().with("d", 1.5);
    let result = Runner::strong().run("d + 1", &[("d", DOUBLE)], &mut vars);
    assert_eq!(result, Ok(Value::Double(2.5)));
}

#[test]
fn test_assignments_reach_the_resolver() {
    let mut vars = MapResolver::new().with("x", 4);
    let result = Runner::strong().run("y = x * 2; y + 1", &[("x", INT)], &mut vars);
    assert_eq!(result, Ok(Value::Int(9)));
    assert_eq!(vars.get("y"), Some(&Value::Int(8)));
}

#[test]
fn test_short_circuit_skips_right_operand() {
    // `b` is declared but never bound, so evaluating it would fail.
    let runner = Runner::strong();
    let inputs = [("a", BOOLEAN), ("b", BOOLEAN)];

    let mut vars = MapResolver::new().with("a", false);
    assert_eq!(runner.run("a && b", &inputs, &mut vars), Ok(Value::Boolean(false)));

    let mut vars = MapResolver::new().with("a", true);
    assert_eq!(runner.run("a || b", &inputs, &mut vars), Ok(Value::Boolean(true)));

    let mut vars = MapResolver::new().with("a", true);
    let err = runner.run("a && b", &inputs, &mut vars).unwrap_err();
    assert_eq!(
        err.kind,
        ExecutionErrorKind::Runtime(RuntimeError::UnboundVariable {
            name: "b".to_string()
        })
    );
    assert_eq!(err.span.unwrap().0, 5..6);
}

#[test]
fn test_loose_typing_coerces_at_runtime() {
    let runner = Runner::loose();

    let mut vars = MapResolver::new().with("a", "21");
    assert_eq!(runner.run("a * 2", &[], &mut vars), Ok(Value::Int(42)));

    let mut vars = MapResolver::new().with("a", "21");
    assert_eq!(runner.run("a + 2", &[], &mut vars), Ok(Value::str("212")));

    let mut vars = MapResolver::new().with("a", 2.5);
    assert_eq!(runner.run("a * 2", &[], &mut vars), Ok(Value::Double(5.0)));

    let mut vars = MapResolver::new().with("a", "x");
    let err = runner.run("a - 1", &[], &mut vars).unwrap_err();
    assert!(matches!(
        err.kind,
        ExecutionErrorKind::Runtime(RuntimeError::Conversion(_))
    ));
}

#[test]
fn test_division_by_zero_is_located() {
    let err = run("1 + 10 / 0").unwrap_err();
    assert_eq!(
        err.kind,
        ExecutionErrorKind::Runtime(RuntimeError::DivisionByZero)
    );
    assert_eq!(err.span.clone().unwrap().0, 4..10);
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("R001"));
}

#[test]
fn test_interpreted_mode() {
    let runner = Runner::strong();
    let options = ExecutionOptions::default();

    assert_eq!(
        runner.run_with_options("x = -5; x", options, EvaluationMode::Interpreted),
        Ok(Value::Int(-5))
    );

    let err = runner
        .run_with_options("1 + 2", options, EvaluationMode::Interpreted)
        .unwrap_err();
    assert!(matches!(err.kind, ExecutionErrorKind::Unsupported { .. }));
    assert_eq!(err.to_diagnostic().code.as_deref(), Some("R999"));
}

#[test]
fn test_stack_depth_limit() {
    let runner = Runner::strong();
    let options = ExecutionOptions { max_depth: 3 };

    let err = runner
        .run_with_options("1 + (2 + (3 + 4))", options, EvaluationMode::Accelerated)
        .unwrap_err();
    assert!(err.is_resource_exceeded());
    assert_eq!(
        err.kind,
        ExecutionErrorKind::ResourceExceeded {
            depth: 3,
            max_depth: 3
        }
    );

    assert_eq!(
        runner.run_with_options("1 + 2", options, EvaluationMode::Accelerated),
        Ok(Value::Int(3))
    );
}

#[test]
fn test_repeated_evaluation_is_idempotent() {
    let runner = Runner::loose();
    let program = runner.compile("a * 2 + b", &[]);
    let before = program.arena.clone();
    let root = program.statements[0];

    let mut results = Vec::new();
    for _ in 0..2 {
        let mut vars = MapResolver::new().with("a", 3).with("b", 1.5);
        results.push(eval(&program, &runner.conversions, &mut vars));
    }

    assert_eq!(results[0], Ok(Value::Double(7.5)));
    assert_eq!(results[0], results[1]);
    assert_eq!(program.arena.binary_node(root), before.binary_node(root));
    assert_eq!(program.arena.binary_node(root).unwrap().op, Operator::Add);
}

#[test]
fn test_empty_program_is_null() {
    assert_eq!(run(""), Ok(Value::Null));
    assert_eq!(run(";;"), Ok(Value::Null));
}

#[test]
fn test_long_chains_do_not_use_the_native_stack() {
    let runner = Runner::strong();
    let terms = 20_000;
    let source = vec!["1"; terms].join(" + ");
    let options = ExecutionOptions {
        max_depth: terms + 1,
    };

    let result = std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(move || runner.run_with_options(&source, options, EvaluationMode::Accelerated))
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(result, Ok(Value::Int(terms as i32)));
}
