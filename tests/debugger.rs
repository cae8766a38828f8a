mod cases;

use std::sync::Arc;

use bumpalo::Bump;
use cases::engine_options;
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use velo::{
    BreakpointRegistry, CompilationOptions, Debugger, DebugStep, Directive, Engine, Frame,
    MapResolver, Value,
};

static BREAKPOINTS: Lazy<Arc<BreakpointRegistry>> =
    Lazy::new(|| Arc::new(BreakpointRegistry::new()));

const SOURCE: &str = "a = 10;\nb = a * 2;\na + b;\n(a + b) * 2";

fn debug_options(source_file: &str) -> CompilationOptions {
    CompilationOptions {
        strong_typing: true,
        debug_symbols: true,
        source_file: Some(source_file.to_string()),
        ..CompilationOptions::default()
    }
}

/// Records each suspension and the value of `b` at that point.
struct Recorder {
    hits: Vec<(String, u32, Option<Value<'static>>)>,
}

impl<'a> Debugger<'a> for Recorder {
    fn on_break(&mut self, frame: &Frame<'_, 'a>) -> Directive {
        let b = match frame.variable("b") {
            Some(Value::Int(b)) => Some(Value::Int(b)),
            _ => None,
        };
        self.hits.push((frame.source_name.to_string(), frame.line, b));
        Directive::Continue
    }
}

#[test]
fn breakpoint_on_third_line_suspends_once() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, engine_options(true), |_, _| {});
    let expr = engine
        .compile_with(&debug_options("test.mv"), SOURCE, &[])
        .unwrap();

    let breakpoints = BreakpointRegistry::new();
    breakpoints.register("test.mv", 3);

    let mut recorder = Recorder { hits: Vec::new() };
    let mut vars = MapResolver::new();
    let result = expr.run_with_debugger(&mut vars, &breakpoints, &mut recorder);

    assert_eq!(result, Ok(Value::Int(60)));
    assert_eq!(
        recorder.hits,
        vec![("test.mv".to_string(), 3, Some(Value::Int(20)))]
    );
}

#[test]
fn session_resumes_only_when_told() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, engine_options(true), |_, _| {});
    let expr = engine
        .compile_with(&debug_options("session.mv"), SOURCE, &[])
        .unwrap();

    let breakpoints = BreakpointRegistry::new();
    breakpoints.register("session.mv", 3);

    let mut vars = MapResolver::new();
    let mut session = expr.debug(&mut vars, &breakpoints);
    assert_eq!(
        session.start(),
        Ok(DebugStep::Suspended {
            source_name: "session.mv".to_string(),
            line: 3
        })
    );
    assert!(session.is_suspended());
    assert_eq!(session.frame().unwrap().variable("a"), Some(Value::Int(10)));

    assert_eq!(
        session.resume(Directive::Step),
        Ok(DebugStep::Suspended {
            source_name: "session.mv".to_string(),
            line: 4
        })
    );
    assert_eq!(
        session.resume(Directive::Continue),
        Ok(DebugStep::Completed(Value::Int(60)))
    );
}

#[test]
fn breakpoints_are_inert_without_a_debugger() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, engine_options(true), |_, _| {});
    let expr = engine
        .compile_with(&debug_options("inert.mv"), SOURCE, &[])
        .unwrap();

    let breakpoints = BreakpointRegistry::new();
    breakpoints.register("inert.mv", 1);
    breakpoints.register("inert.mv", 3);

    assert_eq!(expr.run(&mut MapResolver::new()), Ok(Value::Int(60)));
}

#[test]
fn shared_registry_is_read_while_another_thread_edits_it() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, engine_options(true), |_, _| {});
    let expr = engine
        .compile_with(&debug_options("shared.mv"), SOURCE, &[])
        .unwrap();

    BREAKPOINTS.register("shared.mv", 2);

    std::thread::scope(|s| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let expr = &expr;
                let breakpoints = Arc::clone(&BREAKPOINTS);
                s.spawn(move || {
                    let mut recorder = Recorder { hits: Vec::new() };
                    let mut vars = MapResolver::new();
                    let result = expr.run_with_debugger(&mut vars, &breakpoints, &mut recorder);
                    (result, recorder.hits)
                })
            })
            .collect();

        s.spawn(|| {
            for line in 10..20 {
                BREAKPOINTS.register("other.mv", line);
                BREAKPOINTS.clear("other.mv", line);
            }
        });

        for reader in readers {
            let (result, hits) = reader.join().unwrap();
            assert_eq!(result, Ok(Value::Int(60)));
            assert_eq!(hits, vec![("shared.mv".to_string(), 2, None)]);
        }
    });

    assert_eq!(BREAKPOINTS.lines("shared.mv"), vec![2]);
    assert!(BREAKPOINTS.lines("other.mv").is_empty());
}

#[test]
fn breakpoint_inside_multi_line_statement() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, engine_options(true), |_, _| {});
    let int = engine.type_manager().int();
    let inputs = [("a", int), ("b", int), ("c", int), ("d", int)];
    let expr = engine
        .compile_with(&debug_options("test.mv"), "a +\nb +\nc * d", &inputs)
        .unwrap();

    let breakpoints = BreakpointRegistry::new();
    breakpoints.register("test.mv", 3);

    let mut recorder = Recorder { hits: Vec::new() };
    let mut vars = MapResolver::new()
        .with("a", 1)
        .with("b", 2)
        .with("c", 3)
        .with("d", 4);
    let result = expr.run_with_debugger(&mut vars, &breakpoints, &mut recorder);

    assert_eq!(result, Ok(Value::Int(15)));
    assert_eq!(
        recorder.hits,
        vec![("test.mv".to_string(), 3, Some(Value::Int(2)))]
    );
}
