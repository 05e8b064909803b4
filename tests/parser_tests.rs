// ABOUTME: Black-box parser determinism and shape tests exercised through the public library API

use thanatos::ast::Stmt;
use thanatos::ast_printer;
use thanatos::parser::Parser;
use thanatos::scanner::Scanner;

fn parse(src: &str) -> Vec<Stmt> {
    let (tokens, lex_errors) = Scanner::new(src).scan_tokens();
    assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
    let (stmts, parse_errors) = Parser::new(tokens).parse();
    assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);
    stmts
}

#[test]
fn reparsing_a_class_hierarchy_is_byte_identical() {
    let src = "class Animal { speak() { print this.name + \" makes a sound\"; } } \
               class Dog < Animal { construct(name) { this.name = name; } speak() { super.speak(); } }";

    let first: Vec<String> = parse(src)
        .into_iter()
        .map(|stmt| format!("{:?}", stmt))
        .collect();
    let second: Vec<String> = parse(src)
        .into_iter()
        .map(|stmt| format!("{:?}", stmt))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn reparsing_an_expression_prints_identically_through_the_ast_printer() {
    let src = "print -1 + 2 * (3 - 4) / foo.bar(1, 2);";
    let print_of = |src: &str| match &parse(src)[0] {
        Stmt::Print(expr) => ast_printer::print(expr),
        other => panic!("unexpected: {:?}", other),
    };

    assert_eq!(print_of(src), print_of(src));
    assert_eq!(print_of(src), "(+ (- 1) (/ (* 2 (group (- 3 4))) (call (. foo bar) 1 2)))");
}

#[test]
fn for_loop_without_initializer_or_increment_desugars_to_bare_while() {
    let stmts = parse("for (; true;) print 1;");
    match &stmts[0] {
        Stmt::While { condition, body } => {
            assert!(matches!(condition, thanatos::ast::Expr::Literal { .. }));
            assert!(matches!(**body, Stmt::Print(_)));
        }
        other => panic!("unexpected: {:?}", other),
    }
}
