// ABOUTME: Single pre-execution pass binding variable references to lexical scope depths

use crate::ast::{Expr, FunctionDecl, NodeId, Stmt};
use crate::error::ResolveError;
use crate::token::Token;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>,
    locals: HashMap<NodeId, usize>,
    current_function: FunctionKind,
    current_class: ClassKind,
    errors: Vec<ResolveError>,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
            errors: Vec::new(),
        }
    }

    /// Resolves a whole program, returning the `locals` side table (node id
    /// → hop distance; absent entries resolve in the global scope) and any
    /// semantic errors found. The driver halts before execution if any
    /// errors were reported (spec.md §7).
    pub fn resolve_program(mut self, statements: &[Stmt]) -> (HashMap<NodeId, usize>, Vec<ResolveError>) {
        self.resolve_stmts(statements);
        (self.locals, self.errors)
    }

    fn error(&mut self, token: &Token, message: impl Into<String>) {
        self.errors.push(ResolveError::at(token, message));
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.errors.push(ResolveError::at(name, "Already a variable with this name in this scope."));
            }
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn resolve_local(&mut self, id: NodeId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(id, depth);
                return;
            }
        }
        // Unresolved: falls through to the global (universe) environment.
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Let { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(branch) = else_branch {
                    self.resolve_stmt(branch);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Function(decl) => {
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionKind::Function);
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.error(keyword, "Can't return from top-level code.");
                }
                if let Some(value) = value {
                    if self.current_function == FunctionKind::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Class { name, superclass, methods } => {
                self.resolve_class(name, superclass.as_ref(), methods);
            }
        }
    }

    fn resolve_class(&mut self, name: &Token, superclass: Option<&Expr>, methods: &[std::rc::Rc<FunctionDecl>]) {
        let enclosing_class = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(name);
        self.define(name);

        if let Some(Expr::Variable { name: super_name, .. }) = superclass {
            if super_name.lexeme == name.lexeme {
                self.error(super_name, "A class can't inherit from itself.");
            }
            self.current_class = ClassKind::Subclass;
            self.resolve_expr(superclass.unwrap());

            self.begin_scope();
            self.scopes.last_mut().unwrap().insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes.last_mut().unwrap().insert("this".to_string(), true);

        for method in methods {
            let kind = if method.name.lexeme == "construct" {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionKind) {
        let enclosing_function = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { .. } => {}
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.error(name, "Can't read local variable in its own initializer.");
                    }
                }
                self.resolve_local(*id, name);
            }
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            Expr::Unary { operand, .. } => self.resolve_expr(operand),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Grouping { inner, .. } => self.resolve_expr(inner),
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::This { id, keyword } => {
                if self.current_class == ClassKind::None {
                    self.error(keyword, "Can't use 'this' outside of a class.");
                    return;
                }
                self.resolve_local(*id, keyword);
            }
            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassKind::None => {
                        self.error(keyword, "Can't use 'super' outside of a class.");
                        return;
                    }
                    ClassKind::Class => {
                        self.error(keyword, "Can't use 'super' in a class with no superclass.");
                        return;
                    }
                    ClassKind::Subclass => {}
                }
                self.resolve_local(*id, keyword);
            }
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn resolve(src: &str) -> (HashMap<NodeId, usize>, Vec<ResolveError>, Vec<Stmt>) {
        let (tokens, _) = Scanner::new(src).scan_tokens();
        let (stmts, parse_errors) = Parser::new(tokens).parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);
        let (locals, errors) = Resolver::new().resolve_program(&stmts);
        (locals, errors, stmts)
    }

    #[test]
    fn self_reference_in_initializer_is_an_error() {
        let (_, errors, _) = resolve("{ let a = a; }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Can't read local variable in its own initializer.");
    }

    #[test]
    fn redeclaration_in_same_scope_is_an_error() {
        let (_, errors, _) = resolve("{ let a = 1; let a = 2; }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Already a variable with this name in this scope.");
    }

    #[test]
    fn top_level_return_is_an_error() {
        let (_, errors, _) = resolve("return 1;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Can't return from top-level code.");
    }

    #[test]
    fn returning_value_from_initializer_is_an_error() {
        let (_, errors, _) = resolve("class A { construct() { return 1; } }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Can't return a value from an initializer.");
    }

    #[test]
    fn bare_return_from_initializer_is_fine() {
        let (_, errors, _) = resolve("class A { construct() { return; } }");
        assert!(errors.is_empty());
    }

    #[test]
    fn this_outside_class_is_an_error() {
        let (_, errors, _) = resolve("print this;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Can't use 'this' outside of a class.");
    }

    #[test]
    fn super_without_superclass_is_an_error() {
        let (_, errors, _) = resolve("class A { f() { super.f(); } }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Can't use 'super' in a class with no superclass.");
    }

    #[test]
    fn class_inheriting_from_itself_is_an_error() {
        let (_, errors, _) = resolve("class A < A {}");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "A class can't inherit from itself.");
    }

    #[test]
    fn nested_function_variable_distance_counts_enclosing_scopes() {
        let (locals, errors, stmts) = resolve(
            "function outer() { let a = 1; { function inner() { print a; } } }",
        );
        assert!(errors.is_empty());

        // Drill into outer's body -> block -> inner's body -> print a
        let outer_body = match &stmts[0] {
            Stmt::Function(decl) => &decl.body,
            other => panic!("unexpected: {:?}", other),
        };
        let inner_decl = match &outer_body[1] {
            Stmt::Block(inner_block) => match &inner_block[0] {
                Stmt::Function(decl) => decl.clone(),
                other => panic!("unexpected: {:?}", other),
            },
            other => panic!("unexpected: {:?}", other),
        };
        let print_expr = match &inner_decl.body[0] {
            Stmt::Print(expr) => expr,
            other => panic!("unexpected: {:?}", other),
        };
        // `a` is declared in outer's function-body scope; `inner`'s own
        // function-param scope is between it and that scope, so distance 1.
        assert_eq!(locals.get(&print_expr.id()), Some(&1));
    }

    #[test]
    fn top_level_variable_reference_is_unrecorded() {
        let (locals, errors, stmts) = resolve("let a = 1; print a;");
        assert!(errors.is_empty());
        let print_expr = match &stmts[1] {
            Stmt::Print(expr) => expr,
            other => panic!("unexpected: {:?}", other),
        };
        assert_eq!(locals.get(&print_expr.id()), None);
    }
}
