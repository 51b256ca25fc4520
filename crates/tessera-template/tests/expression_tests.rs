/*
 * expression_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for expression compilation, caching and evaluation.
 */

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tessera_template::{
    CompileError, Compiler, CompilerOptions, Expression, FilterApplication, FilterRegistry,
    Number, Operand, TemplateContext, TemplateError, TemplateValue,
};

fn compile(source: &str) -> Expression {
    Compiler::default()
        .compile(source)
        .unwrap_or_else(|e| panic!("failed to compile {:?}: {}", source, e))
        .expression()
        .clone()
}

/// Compile, render back to text, and return the normalized text.
fn normalize(source: &str) -> String {
    compile(source).to_string()
}

// ============================================================================
// Literals and lookups
// ============================================================================

#[test]
#[allow(clippy::approx_constant)]
fn test_number_literals() {
    assert_eq!(compile("42").operand, Operand::Number(Number::Integer(42)));
    assert_eq!(
        compile("3.14").operand,
        Operand::Number(Number::Decimal(3.14))
    );
}

#[test]
fn test_string_literals() {
    assert_eq!(compile("'hello'").operand, Operand::string("hello"));
    assert_eq!(
        compile(r"'he said \'hi\''").operand,
        Operand::string("he said 'hi'")
    );
}

#[test]
fn test_dotted_lookup() {
    assert_eq!(compile("a.b.c").operand, Operand::lookup(["a", "b", "c"]));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_filter_without_arguments() {
    assert_eq!(
        compile("name|upper"),
        Expression::new(Operand::lookup(["name"])).with_filter(FilterApplication::new("upper"))
    );
}

#[test]
fn test_filter_with_string_argument() {
    assert_eq!(
        compile("name|default:'x'"),
        Expression::new(Operand::lookup(["name"])).with_filter(FilterApplication::with_args(
            "default",
            vec![Operand::string("x")]
        ))
    );
}

#[test]
fn test_long_chain() {
    let expr = compile("post.body|default:''|escape|linebreaksbr|join:', '");
    let names: Vec<&str> = expr.filters.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["default", "escape", "linebreaksbr", "join"]);
    assert_eq!(expr.filters[3].args, vec![Operand::string(", ")]);
}

// ============================================================================
// Errors
// ============================================================================

fn compile_error(source: &str) -> CompileError {
    match Compiler::default().compile(source) {
        Err(TemplateError::Compile { error, .. }) => error,
        other => panic!("expected compile error for {:?}, got {:?}", source, other),
    }
}

#[test]
fn test_error_taxonomy() {
    assert_eq!(
        compile_error("'abc"),
        CompileError::UnterminatedStringLiteral { offset: 0 }
    );
    assert_eq!(
        compile_error("a|"),
        CompileError::EmptyFilterName { offset: 2 }
    );
    assert!(matches!(
        compile_error("3.1.4"),
        CompileError::MalformedNumber { offset: 3, .. }
    ));
    assert_eq!(
        compile_error("a b"),
        CompileError::UnexpectedTerminator {
            found: ' ',
            offset: 1
        }
    );
    assert_eq!(compile_error(""), CompileError::EmptyExpression);
}

#[test]
fn test_error_message() {
    let err = Compiler::default().compile("name|default:").unwrap_err();
    assert_eq!(
        err.to_string(),
        "in expression `name|default:`: filter 'default' expects an argument at offset 13"
    );
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_same_text_same_instance() {
    let compiler = Compiler::default();
    let first = compiler.compile("name|default:'x'").unwrap();
    let second = compiler.compile("name|default:'x'").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_different_text_different_entry() {
    let compiler = Compiler::default();
    let a = compiler.compile("a.b").unwrap();
    let b = compiler.compile("a.b ").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.expression(), b.expression());

    // Not a legal expression at all
    assert!(compiler.compile("a. b").is_err());
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_corpus() {
    let corpus = [
        "42",
        "007",
        ".5",
        "2.",
        "'hello'",
        "\"double\"",
        r"'he said \'hi\''",
        r"'back\\slash'",
        r"'keep\nescape'",
        "a.b.c",
        "items.0.name",
        "name|upper",
        "name|default:'x'",
        "name|default:\"x\"|upper",
        "text|slice:1, 3|join:', '",
        "value|default:other.value",
        "  padded|lower  ",
    ];

    for source in corpus {
        let first = compile(source);
        let rendered = first.to_string();
        let second = compile(&rendered);
        assert_eq!(first, second, "round trip of {:?} via {:?}", source, rendered);
    }
}

#[test]
fn test_normalized_text() {
    insta::assert_snapshot!(normalize("  a.b|default:\"x\"|upper "), @"a.b|default:'x'|upper");
    insta::assert_snapshot!(normalize(".5"), @"0.5");
    insta::assert_snapshot!(normalize("007"), @"7");
    insta::assert_snapshot!(normalize("2."), @"2.0");
    insta::assert_snapshot!(normalize("\"it's\""), @r"'it\'s'");
    insta::assert_snapshot!(normalize("text|slice:1, 3"), @"text|slice:1,3");
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_single_filter_argument_mode() {
    let compiler = Compiler::new(
        CompilerOptions::default().with_multiple_filter_arguments(false),
        FilterRegistry::with_builtins(),
    );

    assert!(compiler.compile("a|default:'x'").is_ok());
    assert!(matches!(
        compiler.compile("a|slice:1, 3"),
        Err(TemplateError::Compile {
            error: CompileError::UnexpectedTerminator { found: ',', .. },
            ..
        })
    ));
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_evaluate_against_json_context() {
    let ctx = TemplateContext::from_json(serde_json::json!({
        "post": {
            "title": "Hello <World>",
            "body": "line one\nline two",
            "tags": ["rust", "templates"]
        }
    }));
    let compiler = Compiler::default();

    let render = |source: &str| compiler.compile(source).unwrap().render(&ctx).unwrap();

    assert_eq!(render("post.title|escape"), "Hello &lt;World&gt;");
    assert_eq!(render("post.body|linebreaksbr"), "line one<br />line two");
    assert_eq!(render("post.tags|join:', '|upper"), "RUST, TEMPLATES");
    assert_eq!(render("post.tags.1"), "templates");
    assert_eq!(render("post.missing|default:'n/a'"), "n/a");
    assert_eq!(render("post.tags|length"), "2");
    assert_eq!(render("3.5"), "3.5");
}

#[test]
fn test_evaluate_custom_filter_with_arguments() {
    let mut filters = FilterRegistry::with_builtins();
    filters.register("wrap", |input, args| {
        let [left, right] = args else {
            return Err(format!("expects 2 arguments, got {}", args.len()));
        };
        Ok(format!("{}{}{}", left.render(), input.render(), right.render()).into())
    });
    let compiler = Compiler::new(CompilerOptions::default(), filters);
    let mut ctx = TemplateContext::new();
    ctx.insert("name", "ada");

    let compiled = compiler.compile("name|wrap:'[', ']'").unwrap();
    assert_eq!(compiled.render(&ctx).unwrap(), "[ada]");

    let compiled = compiler.compile("name|wrap:'['").unwrap();
    assert_eq!(
        compiled.evaluate(&ctx),
        Err(TemplateError::FilterFailed {
            name: "wrap".to_string(),
            message: "expects 2 arguments, got 1".to_string(),
        })
    );
    assert_eq!(
        compiler.compile("name").unwrap().evaluate(&ctx).unwrap(),
        TemplateValue::from("ada")
    );
}
