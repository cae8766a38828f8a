// Tests with valid inputs for each rule in the grammar.

use crate::parser::{ExpressionParser, Rule};
use pest::Parser;
use pest::iterators::Pair;

fn contains_rule(pair: Pair<Rule>, target: Rule) -> bool {
    if pair.as_rule() == target {
        return true;
    }
    for inner in pair.into_inner() {
        if contains_rule(inner, target) {
            return true;
        }
    }
    false
}

macro_rules! rule_examples {
    ( $($rule:ident => [$($expr:expr),* $(,)?]),* $(,)? ) => {
        $(
            #[test]
            fn $rule() {
                let inputs = vec![$($expr),*];
                for input in inputs {
                    let result = ExpressionParser::parse(Rule::main, input)
                        .unwrap_or_else(|e| panic!("Failed to parse '{}': {}", input, e));
                    let root = result.into_iter().next().unwrap();
                    assert!(
                        contains_rule(root.clone(), Rule::$rule),
                        "Expected to find rule {:?} in parse tree for input '{}'",
                        Rule::$rule,
                        input
                    );
                }
            }
        )*
    };
}

rule_examples! {
    number => ["42", "3.14", "10L", "1.5f", "2d", "12345678901234567890I", "0.1B"],
    string => ["\"hello\"", "'world'", "'it\\'s'", "\"unicode: \\u0041\""],
    boolean => ["true", "false"],
    null => ["null", "x == null"],
    ident => ["foo", "_bar123", "$x", "nullable", "trueish"],
    assignment => ["x = 1", "x = y + 1; x", "total = 'a' + 1"],
    grouped => ["(1)", "(a + b) * c"],
    neg => ["-1", "- a", "a - -b"],
    not => ["!true", "!(a == b)"],
    add => ["1 + 2", "a * (b + c)"],
    sub => ["1 - 2"],
    mul => ["1 * 2"],
    div => ["1 / 2"],
    rem => ["7 % 2"],
    pow => ["2 ** 3"],
    eq => ["a == b"],
    neq => ["a != b"],
    lt => ["a < b"],
    gt => ["a > b"],
    le => ["a <= b"],
    ge => ["a >= b"],
    and => ["a && b"],
    or => ["a || b"],
    bit_and => ["a & b"],
    bit_or => ["a | b"],
    bit_xor => ["a ^ b"],
    shl => ["a << 2"],
    shr => ["a >> 2"],
    ushr => ["a >>> 2"],
}

#[test]
fn test_rejects_invalid_input() {
    for input in ["1 +", "(1", "x = ", "1 2", "10x", "a === b", "true = 1"] {
        assert!(
            ExpressionParser::parse(Rule::main, input).is_err(),
            "Expected '{}' to be rejected",
            input
        );
    }
}

#[test]
fn test_comments_and_separators() {
    for input in [
        "1 // trailing",
        "/* leading */ 1",
        "x = 1;\n// comment\nx",
        ";;1;;",
        "",
    ] {
        ExpressionParser::parse(Rule::main, input)
            .unwrap_or_else(|e| panic!("Failed to parse '{}': {}", input, e));
    }
}
