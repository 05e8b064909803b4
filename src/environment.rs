// ABOUTME: Parent-linked scope chain for variable bindings at runtime

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global (universe) environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child scope enclosed by `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Writes into *this* node, shadowing the same name in any ancestor.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks up `name` in this node, then walks ancestors.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(parent) = &self.parent {
            return parent.get(name);
        }

        Err(RuntimeError::at(name, format!("Undefined variable '{}'.", name.lexeme)))
    }

    /// Assigns in the nearest node (this one or an ancestor) that already
    /// defines `name`.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&name.lexeme) {
            self.bindings.borrow_mut().insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(parent) = &self.parent {
            return parent.assign(name, value);
        }

        Err(RuntimeError::at(name, format!("Undefined variable '{}'.", name.lexeme)))
    }

    /// Walks exactly `distance` parents, then reads `name` from that node.
    /// Used for resolver-annotated fast-path lookups; panics if the resolver
    /// recorded a distance deeper than the live environment chain, which
    /// would indicate a resolver/interpreter bug rather than a user error.
    pub fn get_at(self: &Rc<Self>, distance: usize, name: &str) -> Value {
        self.ancestor(distance)
            .bindings
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("resolver recorded binding for '{name}' not found at distance {distance}"))
    }

    /// Walks exactly `distance` parents, then writes `name` in that node.
    pub fn assign_at(self: &Rc<Self>, distance: usize, name: &str, value: Value) {
        self.ancestor(distance).bindings.borrow_mut().insert(name.to_string(), value);
    }

    fn ancestor(self: &Rc<Self>, distance: usize) -> Rc<Environment> {
        let mut env = Rc::clone(self);
        for _ in 0..distance {
            let parent = env
                .parent
                .clone()
                .unwrap_or_else(|| panic!("resolver recorded a distance deeper than the environment chain"));
            env = parent;
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::Identifier, name, None, 1)
    }

    #[test]
    fn define_and_get_in_same_scope() {
        let env = Environment::new();
        env.define("x", Value::Number(42.0));
        assert_eq!(env.get(&ident("x")).unwrap(), Value::Number(42.0));
    }

    #[test]
    fn undefined_variable_errors() {
        let env = Environment::new();
        assert!(env.get(&ident("missing")).is_err());
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));
        let child = Environment::with_parent(parent);
        child.define("x", Value::Number(2.0));
        assert_eq!(child.get(&ident("x")).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn child_sees_parent_binding() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));
        let child = Environment::with_parent(parent);
        assert_eq!(child.get(&ident("x")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assign_updates_nearest_defining_scope() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));
        let child = Environment::with_parent(parent.clone());
        child.assign(&ident("x"), Value::Number(9.0)).unwrap();
        assert_eq!(parent.get(&ident("x")).unwrap(), Value::Number(9.0));
    }

    #[test]
    fn assign_to_undefined_name_errors() {
        let env = Environment::new();
        assert!(env.assign(&ident("missing"), Value::Number(1.0)).is_err());
    }

    #[test]
    fn get_at_and_assign_at_walk_exact_distance() {
        let grandparent = Environment::new();
        grandparent.define("a", Value::Number(1.0));
        let parent = Environment::with_parent(grandparent);
        parent.define("b", Value::Number(2.0));
        let child = Environment::with_parent(parent);
        child.define("c", Value::Number(3.0));

        assert_eq!(child.get_at(0, "c"), Value::Number(3.0));
        assert_eq!(child.get_at(1, "b"), Value::Number(2.0));
        assert_eq!(child.get_at(2, "a"), Value::Number(1.0));

        child.assign_at(2, "a", Value::Number(100.0));
        assert_eq!(child.get_at(2, "a"), Value::Number(100.0));
    }
}
