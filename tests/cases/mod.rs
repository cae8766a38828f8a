#![allow(dead_code)]

use bumpalo::Bump;
use once_cell::sync::Lazy;
use velo::{
    CompilationOptions, ConversionError, ConversionHandler, Engine, EngineOptions, Error,
    HostValue, MapResolver, Type, Value,
};

/// One expression and the value it evaluates to, under both typing modes.
pub struct BinaryCase {
    pub source: &'static str,
    pub expected: Value<'static>,
}

fn case(source: &'static str, expected: impl Into<Value<'static>>) -> BinaryCase {
    BinaryCase {
        source,
        expected: expected.into(),
    }
}

pub static BINARY_CASES: Lazy<Vec<BinaryCase>> = Lazy::new(|| {
    vec![
        case("1 + 2", 3),
        case("10 - 4 - 3", 3),
        case("2 * 3 + 4", 10),
        case("2 + 3 * 4", 14),
        case("(2 + 3) * 4", 20),
        case("7 / 2", 3),
        case("-7 % 3", -1),
        case("2 ** 10", 1024),
        case("2 ** 3 ** 2", 512),
        case("7 / 2.0", 3.5),
        case("1 + 2L", Value::Long(3)),
        case("1.5 + 1", 2.5),
        case("1 < 2", true),
        case("2 <= 2", true),
        case("3 > 4", false),
        case("1 == 1.0", true),
        case("1 != 2", true),
        case("true && !false", true),
        case("false || 1 > 0", true),
        case("1 < 2 == true", true),
        case("6 & 3", 2),
        case("6 | 3", 7),
        case("6 ^ 3", 5),
        case("1 << 4", 16),
        case("-16 >> 2", -4),
        case("'a' + 'b'", "ab"),
        case("'n = ' + 5", "n = 5"),
        case("1 + 2 + 'x'", "3x"),
        case("'abc' < 'abd'", true),
        case("null == null", true),
        case("x = 4; x * x", 16),
    ]
});

pub fn engine_options(strong_typing: bool) -> EngineOptions {
    EngineOptions {
        default_compilation_options: CompilationOptions {
            strong_typing,
            ..CompilationOptions::default()
        },
        ..EngineOptions::default()
    }
}

/// Compile and run `source` without inputs.
pub fn run(strong_typing: bool, source: &str) -> Result<Value<'static>, Error> {
    // Leaked so that results outlive the engine.
    let arena: &'static Bump = Box::leak(Box::new(Bump::new()));
    let engine = Engine::new(arena, engine_options(strong_typing), |_, _| {});
    engine.compile(source, &[])?.run(&mut MapResolver::new())
}

#[derive(Debug, PartialEq)]
pub struct Date(pub i64);

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl HostValue for Date {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn equals(&self, other: &dyn HostValue) -> bool {
        other.as_any().downcast_ref::<Date>() == Some(self)
    }
}

/// Reads dates from `@<epoch>` strings and from epoch numbers.
pub struct DateConversion;

impl ConversionHandler for DateConversion {
    fn can_convert_from(&self, from: &Type<'_>) -> bool {
        *from == Type::Str || from.is_integral_kind()
    }

    fn convert<'a>(&self, value: &Value<'a>, to: Type<'a>) -> Result<Value<'a>, ConversionError> {
        let unsupported = || ConversionError::Unsupported {
            from: value.ty().to_string(),
            to: to.to_string(),
        };
        let epoch = match value {
            Value::Str(s) => s
                .strip_prefix('@')
                .and_then(|s| s.parse().ok())
                .ok_or_else(unsupported)?,
            other => other.to_i64().ok_or_else(unsupported)?,
        };
        Value::object(to, Date(epoch)).ok_or_else(unsupported)
    }
}
