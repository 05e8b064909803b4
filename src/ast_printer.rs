// ABOUTME: Canonical parenthesized printer for expression trees, used to test parser determinism

use crate::ast::{Expr, LiteralValue};

/// Renders an expression to a canonical, fully-parenthesized string. Two
/// parses of the same source must print identically (spec.md §8 property 2)
/// — this exists to make that property checkable without depending on
/// internal node identity.
pub fn print(expr: &Expr) -> String {
    match expr {
        Expr::Literal { value, .. } => match value {
            LiteralValue::Number(n) => n.to_string(),
            LiteralValue::String(s) => format!("\"{}\"", s),
            LiteralValue::Bool(b) => b.to_string(),
            LiteralValue::Void => "void".to_string(),
        },
        Expr::Variable { name, .. } => name.lexeme.clone(),
        Expr::Assign { name, value, .. } => parenthesize("=", &[&name.lexeme, &print(value)]),
        Expr::Unary { operator, operand, .. } => parenthesize(&operator.lexeme, &[&print(operand)]),
        Expr::Binary { left, operator, right, .. } => {
            parenthesize(&operator.lexeme, &[&print(left), &print(right)])
        }
        Expr::Logical { left, operator, right, .. } => {
            parenthesize(&operator.lexeme, &[&print(left), &print(right)])
        }
        Expr::Grouping { inner, .. } => parenthesize("group", &[&print(inner)]),
        Expr::Call { callee, args, .. } => {
            let mut parts = vec![print(callee)];
            parts.extend(args.iter().map(print));
            parenthesize("call", &parts.iter().map(String::as_str).collect::<Vec<_>>())
        }
        Expr::Get { object, name, .. } => parenthesize(".", &[&print(object), &name.lexeme]),
        Expr::Set { object, name, value, .. } => {
            parenthesize("=.", &[&print(object), &name.lexeme, &print(value)])
        }
        Expr::This { .. } => "this".to_string(),
        Expr::Super { method, .. } => parenthesize("super", &[&method.lexeme]),
    }
}

fn parenthesize(name: &str, parts: &[&str]) -> String {
    let mut out = String::from("(");
    out.push_str(name);
    for part in parts {
        out.push(' ');
        out.push_str(part);
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn parse_expr(src: &str) -> Expr {
        let (tokens, _) = Scanner::new(src).scan_tokens();
        let (stmts, errors) = Parser::new(tokens).parse();
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        match stmts.into_iter().next().unwrap() {
            crate::ast::Stmt::Print(expr) | crate::ast::Stmt::Expression(expr) => expr,
            other => panic!("expected an expression statement, got {:?}", other),
        }
    }

    #[test]
    fn prints_binary_and_unary_with_full_parenthesization() {
        let expr = parse_expr("print -1 + 2 * 3;");
        assert_eq!(print(&expr), "(+ (- 1) (* 2 3))");
    }

    #[test]
    fn reparsing_identical_source_prints_identically() {
        let src = "print (1 + 2) * 3 - foo.bar;";
        let a = print(&parse_expr(src));
        let b = print(&parse_expr(src));
        assert_eq!(a, b);
    }
}
